use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::common::paths::schedule_config_path;
use crate::ui::prelude::{Level, emit};

use super::allocator::{PlanEntry, SlotAllocator, SystemClock};
use super::cli::{PlanArgs, ScheduleCommands, SetCommands};
use super::config::ScheduleConfig;
use super::reservations::{HttpReservationSource, ReservationSource, StaticReservationSource};

pub fn handle_schedule_command(command: ScheduleCommands) -> Result<()> {
    match command {
        ScheduleCommands::Plan(args) => handle_plan(args),
        ScheduleCommands::Show => handle_show(),
        ScheduleCommands::Set { command } => handle_set(command),
    }
}

fn handle_plan(args: PlanArgs) -> Result<()> {
    let config = ScheduleConfig::load_or_default(&schedule_config_path()?)?;

    let source: Box<dyn ReservationSource> = match &args.endpoint {
        Some(endpoint) => Box::new(HttpReservationSource::new(endpoint.clone())?),
        None => {
            emit(
                Level::Info,
                "schedule.plan.no_endpoint",
                "No reservation endpoint configured; planning against an empty calendar",
                None,
            );
            Box::new(StaticReservationSource::empty())
        }
    };

    let mut allocator = SlotAllocator::new(config, source, SystemClock);

    let outcome = match &args.from {
        Some(raw) => {
            let start = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --from instant '{raw}' (expected RFC 3339)"))?
                .with_timezone(&Utc);
            allocator.allocate_from(start, args.count)
        }
        None => allocator.allocate(args.count),
    };

    let entries: Vec<PlanEntry> = outcome
        .instants
        .iter()
        .enumerate()
        .map(|(index, instant)| PlanEntry {
            video_ref: args
                .videos
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("video-{}", index + 1)),
            title: args
                .titles
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("Short {}", index + 1)),
            scheduled_instant: *instant,
        })
        .collect();

    let tz = allocator.config().timezone;
    for entry in &entries {
        let local = entry.scheduled_instant.with_timezone(&tz);
        emit(
            Level::Info,
            "schedule.plan.entry",
            &format!(
                "{} -> {} ({} local)",
                entry.video_ref,
                entry.scheduled_instant.format("%Y-%m-%d %H:%M UTC"),
                local.format("%a %H:%M")
            ),
            Some(json!(entry)),
        );
    }

    if !allocator.validate(&outcome.instants) {
        anyhow::bail!("Planned schedule violates the weekly publish quota");
    }

    match outcome.failure {
        Some(err) => {
            emit(
                Level::Warn,
                "schedule.plan.partial",
                &format!(
                    "Placed {} of {} requested videos before failing",
                    entries.len(),
                    args.count
                ),
                None,
            );
            Err(err.into())
        }
        None => {
            emit(
                Level::Success,
                "schedule.plan.done",
                &format!("Planned {} publishes", entries.len()),
                None,
            );
            Ok(())
        }
    }
}

fn handle_show() -> Result<()> {
    let config = ScheduleConfig::load_or_default(&schedule_config_path()?)?;

    let template = &config.daily_template;
    let days = [
        ("monday", template.monday),
        ("tuesday", template.tuesday),
        ("wednesday", template.wednesday),
        ("thursday", template.thursday),
        ("friday", template.friday),
        ("saturday", template.saturday),
        ("sunday", template.sunday),
    ];
    for (name, time) in days {
        emit(
            Level::Info,
            "schedule.show.day",
            &format!("{name:<10} {}", time.format("%H:%M")),
            Some(json!({ "day": name, "time": time.format("%H:%M").to_string() })),
        );
    }

    emit(
        Level::Info,
        "schedule.show.params",
        &format!(
            "timezone {} | {} per day | {}h minimum interval | {} per week",
            config.timezone,
            config.videos_per_day,
            config.min_interval_hours,
            config.max_videos_per_week
        ),
        Some(json!({
            "timezone": config.timezone.name(),
            "videos_per_day": config.videos_per_day,
            "min_interval_hours": config.min_interval_hours,
            "max_videos_per_week": config.max_videos_per_week,
        })),
    );

    Ok(())
}

fn handle_set(command: SetCommands) -> Result<()> {
    let path = schedule_config_path()?;
    let mut config = ScheduleConfig::load_or_default(&path)?;

    let description = match command {
        SetCommands::Day { day, time } => {
            config.set_day_time(&day, &time)?;
            format!("{day} -> {time}")
        }
        SetCommands::Timezone { timezone } => {
            config.set_timezone(&timezone)?;
            format!("timezone -> {timezone}")
        }
        SetCommands::MinInterval { hours } => {
            config.set_min_interval(hours)?;
            format!("min_interval_hours -> {hours}")
        }
        SetCommands::MaxPerWeek { count } => {
            config.set_max_videos_per_week(count)?;
            format!("max_videos_per_week -> {count}")
        }
        SetCommands::PerDay { count } => {
            config.set_videos_per_day(count)?;
            format!("videos_per_day -> {count}")
        }
    };

    config.save(&path)?;
    emit(
        Level::Success,
        "schedule.set.saved",
        &format!("Updated schedule: {description}"),
        None,
    );

    Ok(())
}
