use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

use super::selector::SelectorParams;

#[derive(Subcommand, Debug, Clone)]
pub enum ShortsCommands {
    /// Select highlight clips from a timestamped transcript
    Select(SelectArgs),
    /// Select highlight clips and cut them out of the source video
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Timestamped transcript file (SRT)
    #[arg(value_hint = ValueHint::FilePath)]
    pub transcript: PathBuf,

    /// JSON score sidecar produced by the transcription step
    #[arg(short = 's', long = "scores", value_hint = ValueHint::FilePath)]
    pub scores: Option<PathBuf>,

    /// Case-insensitive keywords that earn a scoring bonus (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Source video file
    #[arg(value_hint = ValueHint::FilePath)]
    pub video: PathBuf,

    /// Timestamped transcript file; defaults to <videoname>.srt next to the video
    #[arg(short = 't', long = "transcript", value_hint = ValueHint::FilePath)]
    pub transcript: Option<PathBuf>,

    /// JSON score sidecar produced by the transcription step
    #[arg(short = 's', long = "scores", value_hint = ValueHint::FilePath)]
    pub scores: Option<PathBuf>,

    /// Case-insensitive keywords that earn a scoring bonus (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Output directory; defaults to shorts/ next to the video
    #[arg(short = 'o', long = "out-dir", value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Prefix for output filenames; defaults to <videoname>_short_
    #[arg(long)]
    pub prefix: Option<String>,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

/// Selection tuning knobs shared by select and render.
#[derive(Args, Debug, Clone)]
pub struct TuningArgs {
    /// Minimum clip duration in seconds
    #[arg(long, default_value_t = 15.0)]
    pub min_duration: f64,

    /// Maximum window duration in seconds
    #[arg(long, default_value_t = 20.0)]
    pub max_duration: f64,

    /// Seconds of padding applied around an accepted window
    #[arg(long, default_value_t = 2.0)]
    pub padding: f64,

    /// Maximum tolerated overlap between clips in seconds
    #[arg(long, default_value_t = 5.0)]
    pub max_overlap: f64,

    /// Seconds a clip may exceed the maximum duration before trimming
    #[arg(long, default_value_t = 5.0)]
    pub max_extension: f64,

    /// Minimum window score for acceptance; lower admits more clips
    #[arg(long, default_value_t = 0.3)]
    pub score_threshold: f64,
}

impl TuningArgs {
    pub fn to_params(&self) -> SelectorParams {
        SelectorParams {
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            padding: self.padding,
            max_overlap: self.max_overlap,
            max_extension: self.max_extension,
            score_threshold: self.score_threshold,
        }
    }
}
