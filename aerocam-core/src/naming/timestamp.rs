//! Capture timestamps embedded in filenames as `YYYY-MM-DD<sep>HH-MM-SS`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TimestampPattern {
    regex: Regex,
    timezone: Tz,
}

impl TimestampPattern {
    pub fn new(separator: char, timezone: Tz) -> Result<Self> {
        let pattern = format!(
            r"([0-9]{{4}})-([0-9]{{2}})-([0-9]{{2}}){}([0-9]{{2}})-([0-9]{{2}})-([0-9]{{2}})",
            regex::escape(&separator.to_string())
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
            timezone,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Unix timestamp of the first embedded stamp, if it names a real local
    /// time. Later stamps in the same name are never consulted.
    pub fn find(&self, filename: &str) -> Option<i64> {
        let caps = self.regex.captures(filename)?;
        let field = |idx: usize| -> Option<u32> { caps.get(idx)?.as_str().parse().ok() };

        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?);
        let time = NaiveTime::from_hms_opt(field(4)?, field(5)?, field(6)?);
        let (Some(date), Some(time)) = (date, time) else {
            debug!("Invalid embedded timestamp in {:?}", filename);
            return None;
        };

        let local = NaiveDateTime::new(date, time);
        match self.timezone.from_local_datetime(&local).earliest() {
            Some(instant) => Some(instant.timestamp()),
            None => {
                debug!(
                    "Embedded timestamp {} does not exist in {}",
                    local, self.timezone
                );
                None
            }
        }
    }
}
