use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::ui::prelude::{Level, emit};

use super::config::ScheduleConfig;
use super::error::ScheduleError;
use super::reservations::{Reservation, ReservationSource};

/// Bounded look-ahead for a single slot search. Exhausting it surfaces
/// pathological configurations (template fully consumed by reservations)
/// instead of looping forever.
pub const HORIZON_DAYS: u64 = 14;

/// How long a fetched reservation listing stays fresh.
pub const CACHE_TTL_SECS: i64 = 300;

/// Shortfall tolerated by the spacing check before a warning is logged,
/// absorbing timezone and DST rounding.
const SPACING_SLACK_HOURS: f64 = 1.0;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One row of the publish plan handed to the caller. The allocator never
/// performs the upload; it only produces instants.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub video_ref: String,
    pub title: String,
    pub scheduled_instant: DateTime<Utc>,
}

/// Result of an allocation run. A failed run still carries the instants
/// placed before the failure; the caller decides whether to retry.
#[derive(Debug)]
pub struct AllocationOutcome {
    pub instants: Vec<DateTime<Utc>>,
    pub failure: Option<ScheduleError>,
}

struct CachedReservations {
    value: Vec<Reservation>,
    fetched_at: DateTime<Utc>,
}

/// Assigns publish instants from a weekly template while honoring
/// reservations already committed on the external platform.
///
/// Single allocation in flight at a time per calendar; the platform itself
/// is the only source of truth, re-queried on each cache miss.
pub struct SlotAllocator<S, C> {
    config: ScheduleConfig,
    source: S,
    clock: C,
    cache: Option<CachedReservations>,
}

impl<S: ReservationSource, C: Clock> SlotAllocator<S, C> {
    pub fn new(config: ScheduleConfig, source: S, clock: C) -> Self {
        Self {
            config,
            source,
            clock,
            cache: None,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Place `n` publish instants, starting the search at the clock's now.
    pub fn allocate(&mut self, n: usize) -> AllocationOutcome {
        let start = self.clock.now();
        self.allocate_from(start, n)
    }

    /// Place `n` publish instants with the cursor starting at `start`.
    ///
    /// After each assignment the cursor advances by the minimum interval, so
    /// the spacing invariant holds by construction. A fetch failure refuses
    /// to schedule entirely: silently ignoring reservations risks
    /// double-booking a day already committed externally.
    pub fn allocate_from(&mut self, start: DateTime<Utc>, n: usize) -> AllocationOutcome {
        let reservations = match self.reservations() {
            Ok(reservations) => reservations,
            Err(err) => {
                emit(
                    Level::Error,
                    "schedule.plan.fetch_failed",
                    &format!("Refusing to schedule without the reservation listing: {err}"),
                    None,
                );
                return AllocationOutcome {
                    instants: Vec::new(),
                    failure: Some(err),
                };
            }
        };

        let tz = self.config.timezone;
        let reserved_dates: HashSet<NaiveDate> = reservations
            .iter()
            .map(|r| r.publish_instant.with_timezone(&tz).date_naive())
            .collect();

        let mut instants = Vec::with_capacity(n);
        let mut cursor = start;
        for index in 0..n {
            match self.find_next_slot(cursor, &reserved_dates) {
                Ok(instant) => {
                    instants.push(instant);
                    cursor = instant + Duration::hours(self.config.min_interval_hours);
                }
                Err(err) => {
                    emit(
                        Level::Error,
                        "schedule.plan.slot_failed",
                        &format!("Slot {} of {}: {err}", index + 1, n),
                        None,
                    );
                    return AllocationOutcome {
                        instants,
                        failure: Some(err),
                    };
                }
            }
        }

        AllocationOutcome {
            instants,
            failure: None,
        }
    }

    /// First template instant strictly after `after` whose calendar date (in
    /// the configured timezone) holds no reservation, searching day offsets
    /// `0..HORIZON_DAYS`.
    fn find_next_slot(
        &self,
        after: DateTime<Utc>,
        reserved_dates: &HashSet<NaiveDate>,
    ) -> Result<DateTime<Utc>, ScheduleError> {
        let tz = self.config.timezone;
        let local_after = after.with_timezone(&tz);

        for offset in 0..HORIZON_DAYS {
            let date = local_after.date_naive() + Days::new(offset);
            if reserved_dates.contains(&date) {
                if crate::ui::is_debug_enabled() {
                    emit(
                        Level::Debug,
                        "schedule.plan.day_reserved",
                        &format!("Skipping {date}: already has a reservation"),
                        None,
                    );
                }
                continue;
            }

            let time = self.config.daily_template.time_for(date.weekday());
            let local = match tz.from_local_datetime(&date.and_time(time)) {
                chrono::LocalResult::Single(dt) => dt,
                chrono::LocalResult::Ambiguous(earliest, _) => earliest,
                // The template time does not exist on this date (DST gap)
                chrono::LocalResult::None => continue,
            };

            let instant = local.with_timezone(&Utc);
            if instant > after {
                return Ok(instant);
            }
        }

        Err(ScheduleError::HorizonExhausted {
            searched_from: after,
            days: HORIZON_DAYS,
        })
    }

    /// Defense-in-depth re-check of a finished schedule, independent of the
    /// allocator's construction invariants. Catches configuration drift
    /// between the template and the parameters.
    ///
    /// Past instants are ignored. A spacing shortfall is logged, not fatal;
    /// exceeding the weekly quota is a hard failure.
    pub fn validate(&self, schedule: &[DateTime<Utc>]) -> bool {
        let now = self.clock.now();
        let upcoming: Vec<DateTime<Utc>> =
            schedule.iter().copied().filter(|t| *t > now).collect();

        let min_gap = self.config.min_interval_hours as f64;
        for pair in upcoming.windows(2) {
            let gap_hours = pair[1].signed_duration_since(pair[0]).num_seconds() as f64 / 3600.0;
            if gap_hours + SPACING_SLACK_HOURS < min_gap {
                emit(
                    Level::Warn,
                    "schedule.validate.spacing",
                    &format!(
                        "Gap of {gap_hours:.1}h between {} and {} is below the {min_gap:.0}h minimum",
                        pair[0], pair[1]
                    ),
                    None,
                );
            }
        }

        let tz = self.config.timezone;
        let mut per_week: HashMap<(i32, u32), u32> = HashMap::new();
        for instant in &upcoming {
            let week = instant.with_timezone(&tz).iso_week();
            *per_week.entry((week.year(), week.week())).or_default() += 1;
        }

        let mut valid = true;
        for ((year, week), count) in per_week {
            if count > self.config.max_videos_per_week {
                emit(
                    Level::Error,
                    "schedule.validate.weekly_cap",
                    &format!(
                        "Week {year}-W{week:02} holds {count} publishes (max {})",
                        self.config.max_videos_per_week
                    ),
                    None,
                );
                valid = false;
            }
        }

        valid
    }

    /// Cached read-through of the external reservation listing. A single
    /// global cache entry; refreshed transparently once the TTL lapses.
    fn reservations(&mut self) -> Result<Vec<Reservation>, ScheduleError> {
        let now = self.clock.now();
        if let Some(cache) = &self.cache {
            if now.signed_duration_since(cache.fetched_at).num_seconds() <= CACHE_TTL_SECS {
                return Ok(cache.value.clone());
            }
        }

        let value = self.source.fetch()?;
        if crate::ui::is_debug_enabled() {
            emit(
                Level::Debug,
                "schedule.reservations.fetched",
                &format!("Fetched {} reservations", value.len()),
                None,
            );
        }
        self.cache = Some(CachedReservations {
            value: value.clone(),
            fetched_at: now,
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::reservations::StaticReservationSource;
    use chrono::NaiveTime;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct SteppingClock(Cell<DateTime<Utc>>);

    impl SteppingClock {
        fn new(start: DateTime<Utc>) -> Self {
            Self(Cell::new(start))
        }

        fn advance_secs(&self, secs: i64) {
            self.0.set(self.0.get() + Duration::seconds(secs));
        }
    }

    impl Clock for &SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    struct FailingSource;

    impl ReservationSource for FailingSource {
        fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError> {
            Err(ScheduleError::FetchUnavailable("connection refused".into()))
        }
    }

    struct CountingSource {
        calls: Rc<Cell<usize>>,
    }

    impl ReservationSource for CountingSource {
        fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    fn utc_config() -> ScheduleConfig {
        let eight_pm = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        let mut config = ScheduleConfig::default();
        config.timezone = chrono_tz::UTC;
        for day in ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"] {
            config.set_day_time(day, "20:00").unwrap();
        }
        assert_eq!(config.daily_template.monday, eight_pm);
        config
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn reservation(instant: DateTime<Utc>) -> Reservation {
        Reservation {
            id: "r".into(),
            title: "Reserved".into(),
            publish_instant: instant,
            is_published: false,
        }
    }

    #[test]
    fn seven_videos_land_on_seven_consecutive_days() {
        // Scenario: one slot per day, 4h minimum interval, no reservations
        let start = utc(2026, 1, 5, 0, 0); // a Monday
        let mut allocator = SlotAllocator::new(
            utc_config(),
            StaticReservationSource::empty(),
            FixedClock(start),
        );

        let outcome = allocator.allocate(7);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.instants.len(), 7);

        for (i, instant) in outcome.instants.iter().enumerate() {
            assert_eq!(*instant, utc(2026, 1, 5 + i as u32, 20, 0));
        }
        for pair in outcome.instants.windows(2) {
            assert!(pair[1] > pair[0], "instants must be strictly increasing");
            let gap = pair[1].signed_duration_since(pair[0]);
            assert!(gap >= Duration::hours(4));
        }
        assert!(allocator.validate(&outcome.instants));
    }

    #[test]
    fn occupied_dates_are_skipped() {
        // Scenario: tomorrow and the day after already hold reservations
        let start = utc(2026, 1, 5, 21, 0); // Monday, past today's slot
        let source = StaticReservationSource::new(vec![
            reservation(utc(2026, 1, 6, 10, 0)),
            reservation(utc(2026, 1, 7, 10, 0)),
        ]);
        let mut allocator = SlotAllocator::new(utc_config(), source, FixedClock(start));

        let outcome = allocator.allocate(3);
        assert!(outcome.failure.is_none());
        assert_eq!(outcome.instants[0], utc(2026, 1, 8, 20, 0));
        assert_eq!(outcome.instants[1], utc(2026, 1, 9, 20, 0));
        assert_eq!(outcome.instants[2], utc(2026, 1, 10, 20, 0));
    }

    #[test]
    fn allocations_never_share_a_date_with_a_reservation() {
        let start = utc(2026, 1, 5, 0, 0);
        let reserved = vec![
            reservation(utc(2026, 1, 6, 10, 0)),
            reservation(utc(2026, 1, 9, 23, 30)),
            reservation(utc(2026, 1, 12, 0, 15)),
        ];
        let reserved_dates: HashSet<NaiveDate> =
            reserved.iter().map(|r| r.publish_instant.date_naive()).collect();
        let mut allocator = SlotAllocator::new(
            utc_config(),
            StaticReservationSource::new(reserved),
            FixedClock(start),
        );

        let outcome = allocator.allocate(5);
        assert!(outcome.failure.is_none());
        for instant in &outcome.instants {
            assert!(
                !reserved_dates.contains(&instant.date_naive()),
                "{instant} double-books a reserved date"
            );
        }
    }

    #[test]
    fn template_times_convert_from_local_timezone_to_utc() {
        let mut config = utc_config();
        config.set_timezone("Asia/Kolkata").unwrap();
        let start = utc(2026, 1, 5, 0, 0); // Monday 05:30 IST
        let mut allocator =
            SlotAllocator::new(config, StaticReservationSource::empty(), FixedClock(start));

        let outcome = allocator.allocate(1);
        // 20:00 IST is 14:30 UTC
        assert_eq!(outcome.instants[0], utc(2026, 1, 5, 14, 30));
    }

    #[test]
    fn exhausted_horizon_fails_with_partial_results() {
        let start = utc(2026, 1, 5, 0, 0);
        // Every date in the search horizon is reserved
        let reserved: Vec<Reservation> = (0..HORIZON_DAYS)
            .map(|offset| reservation(utc(2026, 1, 5 + offset as u32, 10, 0)))
            .collect();
        let mut allocator = SlotAllocator::new(
            utc_config(),
            StaticReservationSource::new(reserved),
            FixedClock(start),
        );

        let outcome = allocator.allocate(2);
        assert!(outcome.instants.is_empty());
        assert!(matches!(
            outcome.failure,
            Some(ScheduleError::HorizonExhausted { days: HORIZON_DAYS, .. })
        ));
    }

    #[test]
    fn fetch_failure_refuses_to_schedule() {
        let start = utc(2026, 1, 5, 0, 0);
        let mut allocator = SlotAllocator::new(utc_config(), FailingSource, FixedClock(start));

        let outcome = allocator.allocate(3);
        assert!(outcome.instants.is_empty());
        assert!(matches!(
            outcome.failure,
            Some(ScheduleError::FetchUnavailable(_))
        ));
    }

    #[test]
    fn reservation_cache_expires_after_ttl() {
        let clock = SteppingClock::new(utc(2026, 1, 5, 0, 0));
        let calls = Rc::new(Cell::new(0));
        let source = CountingSource {
            calls: Rc::clone(&calls),
        };
        let mut allocator = SlotAllocator::new(utc_config(), source, &clock);

        allocator.allocate(1);
        allocator.allocate(1);
        assert_eq!(calls.get(), 1, "second allocation within TTL reuses cache");

        clock.advance_secs(CACHE_TTL_SECS + 1);
        allocator.allocate(1);
        assert_eq!(calls.get(), 2, "expired cache triggers a refresh");
    }

    #[test]
    fn validate_rejects_weekly_quota_violation() {
        let start = utc(2026, 1, 4, 0, 0);
        let mut config = utc_config();
        config.set_max_videos_per_week(7).unwrap();
        let allocator =
            SlotAllocator::new(config, StaticReservationSource::empty(), FixedClock(start));

        // Eight instants inside ISO week 2026-W02 (Mon Jan 5 - Sun Jan 11)
        let schedule: Vec<DateTime<Utc>> =
            (0..8).map(|i| utc(2026, 1, 5, 2 + i, 0)).collect();
        assert!(!allocator.validate(&schedule));
    }

    #[test]
    fn validate_tolerates_spacing_shortfall_as_warning() {
        let start = utc(2026, 1, 4, 0, 0);
        let allocator = SlotAllocator::new(
            utc_config(),
            StaticReservationSource::empty(),
            FixedClock(start),
        );

        // 1h apart with a 4h minimum: warned about, but not a failure
        let schedule = vec![utc(2026, 1, 5, 10, 0), utc(2026, 1, 5, 11, 0)];
        assert!(allocator.validate(&schedule));
    }

    #[test]
    fn validate_ignores_past_instants() {
        let now = utc(2026, 1, 10, 0, 0);
        let allocator = SlotAllocator::new(
            utc_config(),
            StaticReservationSource::empty(),
            FixedClock(now),
        );

        // Nine instants in one ISO week, but only seven are in the future
        let schedule: Vec<DateTime<Utc>> =
            (0..9).map(|i| utc(2026, 1, 8 + i, 20, 0)).collect();
        let in_week_two: Vec<DateTime<Utc>> = schedule
            .iter()
            .copied()
            .filter(|t| *t > now && t.iso_week().week() == 2)
            .collect();
        assert!(in_week_two.len() <= 7);
        assert!(allocator.validate(&schedule));
    }
}
