use clap::{Args, Subcommand, ValueHint};

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleCommands {
    /// Plan publish instants for pending videos
    Plan(PlanArgs),
    /// Show the weekly template and schedule parameters
    Show,
    /// Update one field of the persisted schedule configuration
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Number of pending videos to place
    pub count: usize,

    /// Video reference for each plan entry, in order (repeatable)
    #[arg(long = "video")]
    pub videos: Vec<String>,

    /// Title for each plan entry, in order (repeatable)
    #[arg(long = "title")]
    pub titles: Vec<String>,

    /// Reservation listing endpoint; omit to plan against an empty calendar
    #[arg(long, value_hint = ValueHint::Url)]
    pub endpoint: Option<String>,

    /// Start the slot search at this instant instead of now (RFC 3339)
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SetCommands {
    /// Set the publish time for a weekday (HH:MM local time)
    Day {
        /// Day of the week (monday, tuesday, ...)
        day: String,
        /// Local time of day in HH:MM
        time: String,
    },
    /// Set the IANA timezone identifier (e.g. Asia/Kolkata)
    Timezone { timezone: String },
    /// Set the minimum hours between publishes
    MinInterval { hours: i64 },
    /// Set the weekly publish quota
    MaxPerWeek { count: u32 },
    /// Set how many videos may share one day
    PerDay { count: u32 },
}
