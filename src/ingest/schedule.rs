//! Poll schedule
//!
//! The feed publishes once a day in its own timezone. Polling happens at a
//! fixed interval through the day, plus a few anchor times around midnight
//! when a new edition is most likely to appear. All times are wall-clock
//! times at a fixed UTC offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// Minutes in a day
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Largest UTC offset allowed, in minutes
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// When to poll the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Offset of the feed's local time from UTC (Asia/Shanghai is +480)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    /// Extra local `HH:MM` poll times
    #[serde(default = "default_anchors")]
    pub anchors: Vec<String>,

    /// Regular poll interval, aligned to local midnight
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u32,
}

fn default_utc_offset() -> i32 {
    8 * 60
}

fn default_anchors() -> Vec<String> {
    vec!["23:59".into(), "00:00".into()]
}

fn default_poll_interval() -> u32 {
    5
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
            anchors: default_anchors(),
            poll_interval_minutes: default_poll_interval(),
        }
    }
}

impl SchedulePolicy {
    /// Check the policy values
    pub fn validate(&self) -> Result<(), ArchiveError> {
        if self.poll_interval_minutes == 0 || self.poll_interval_minutes > MINUTES_PER_DAY {
            return Err(ArchiveError::Config(format!(
                "schedule.poll_interval_minutes must be between 1 and {}",
                MINUTES_PER_DAY
            )));
        }

        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ArchiveError::Config(format!(
                "schedule.utc_offset_minutes must be within ±{}",
                MAX_OFFSET_MINUTES
            )));
        }

        for anchor in &self.anchors {
            parse_anchor(anchor)?;
        }

        Ok(())
    }

    /// The fixed offset the schedule runs in
    pub fn offset(&self) -> Result<FixedOffset, ArchiveError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ArchiveError::Config(format!(
                "Invalid UTC offset: {} minutes",
                self.utc_offset_minutes
            ))
        })
    }

    /// First scheduled poll strictly after `after`
    pub fn next_run(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ArchiveError> {
        self.validate()?;
        let offset = self.offset()?;
        let local = after.with_timezone(&offset).naive_local();

        let mut next = next_interval_tick(local, self.poll_interval_minutes);
        for anchor in &self.anchors {
            let candidate = next_anchor(local, parse_anchor(anchor)?);
            if candidate < next {
                next = candidate;
            }
        }

        Ok((next - Duration::minutes(i64::from(self.utc_offset_minutes))).and_utc())
    }

    /// The next `count` scheduled polls after `after`
    pub fn upcoming(
        &self,
        after: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, ArchiveError> {
        let mut runs = Vec::with_capacity(count);
        let mut cursor = after;
        for _ in 0..count {
            cursor = self.next_run(cursor)?;
            runs.push(cursor);
        }
        Ok(runs)
    }

    /// The local date the feed considers "today" at `now`
    pub fn local_date(&self, now: DateTime<Utc>) -> Result<chrono::NaiveDate, ArchiveError> {
        Ok(now.with_timezone(&self.offset()?).date_naive())
    }
}

fn parse_anchor(anchor: &str) -> Result<NaiveTime, ArchiveError> {
    NaiveTime::parse_from_str(anchor.trim(), "%H:%M").map_err(|_| {
        ArchiveError::Config(format!(
            "schedule.anchors entry {:?} is not an HH:MM time",
            anchor
        ))
    })
}

fn next_interval_tick(local: NaiveDateTime, interval: u32) -> NaiveDateTime {
    let minute_of_day = local.hour() * 60 + local.minute();
    let next_minute = (minute_of_day / interval + 1) * interval;
    let midnight = local.date().and_time(NaiveTime::MIN);

    if next_minute >= MINUTES_PER_DAY {
        midnight + Duration::days(1)
    } else {
        midnight + Duration::minutes(i64::from(next_minute))
    }
}

fn next_anchor(local: NaiveDateTime, anchor: NaiveTime) -> NaiveDateTime {
    let today = local.date().and_time(anchor);
    if today > local {
        today
    } else {
        today + Duration::days(1)
    }
}
