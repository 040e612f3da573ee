use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::ScheduleError;

/// Serialize template times as "HH:MM" local clock time.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}

/// Recurring weekly publish times, one local time-of-day per weekday.
/// A struct field per day means a persisted template can never have gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTemplate {
    #[serde(with = "hhmm")]
    pub monday: NaiveTime,
    #[serde(with = "hhmm")]
    pub tuesday: NaiveTime,
    #[serde(with = "hhmm")]
    pub wednesday: NaiveTime,
    #[serde(with = "hhmm")]
    pub thursday: NaiveTime,
    #[serde(with = "hhmm")]
    pub friday: NaiveTime,
    #[serde(with = "hhmm")]
    pub saturday: NaiveTime,
    #[serde(with = "hhmm")]
    pub sunday: NaiveTime,
}

impl DailyTemplate {
    pub fn time_for(&self, weekday: Weekday) -> NaiveTime {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(&mut self, weekday: Weekday, time: NaiveTime) {
        match weekday {
            Weekday::Mon => self.monday = time,
            Weekday::Tue => self.tuesday = time,
            Weekday::Wed => self.wednesday = time,
            Weekday::Thu => self.thursday = time,
            Weekday::Fri => self.friday = time,
            Weekday::Sat => self.saturday = time,
            Weekday::Sun => self.sunday = time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub daily_template: DailyTemplate,
    pub videos_per_day: u32,
    pub min_interval_hours: i64,
    pub max_videos_per_week: u32,
    pub timezone: Tz,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let evening = NaiveTime::from_hms_opt(20, 0, 0).expect("valid constant time");
        let morning = NaiveTime::from_hms_opt(11, 0, 0).expect("valid constant time");
        Self {
            daily_template: DailyTemplate {
                monday: evening,
                tuesday: evening,
                wednesday: evening,
                thursday: evening,
                friday: evening,
                saturday: morning,
                sunday: morning,
            },
            videos_per_day: 1,
            min_interval_hours: 4,
            max_videos_per_week: 7,
            timezone: chrono_tz::Asia::Kolkata,
        }
    }
}

impl ScheduleConfig {
    /// Load the persisted config, writing the defaults on first run.
    pub fn load_or_default(path: &Path) -> Result<Self, ScheduleError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Full-record rewrite. Concurrent writers race last-write-wins; this is
    /// a single-operator tool and the limitation is accepted.
    pub fn save(&self, path: &Path) -> Result<(), ScheduleError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.videos_per_day < 1 {
            return Err(ScheduleError::InvalidParameter("videos_per_day"));
        }
        if self.min_interval_hours < 1 {
            return Err(ScheduleError::InvalidParameter("min_interval_hours"));
        }
        if self.max_videos_per_week < 1 {
            return Err(ScheduleError::InvalidParameter("max_videos_per_week"));
        }
        Ok(())
    }

    pub fn set_day_time(&mut self, day: &str, time: &str) -> Result<(), ScheduleError> {
        let weekday = parse_weekday(day)?;
        let parsed = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(time.to_string()))?;
        self.daily_template.set(weekday, parsed);
        Ok(())
    }

    pub fn set_timezone(&mut self, timezone: &str) -> Result<(), ScheduleError> {
        self.timezone = timezone
            .parse::<Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))?;
        Ok(())
    }

    pub fn set_min_interval(&mut self, hours: i64) -> Result<(), ScheduleError> {
        if hours < 1 {
            return Err(ScheduleError::InvalidParameter("min_interval_hours"));
        }
        self.min_interval_hours = hours;
        Ok(())
    }

    pub fn set_max_videos_per_week(&mut self, count: u32) -> Result<(), ScheduleError> {
        if count < 1 {
            return Err(ScheduleError::InvalidParameter("max_videos_per_week"));
        }
        self.max_videos_per_week = count;
        Ok(())
    }

    pub fn set_videos_per_day(&mut self, count: u32) -> Result<(), ScheduleError> {
        if count < 1 {
            return Err(ScheduleError::InvalidParameter("videos_per_day"));
        }
        self.videos_per_day = count;
        Ok(())
    }
}

pub fn parse_weekday(day: &str) -> Result<Weekday, ScheduleError> {
    match day.to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err(ScheduleError::InvalidDay(day.to_string())),
    }
}
