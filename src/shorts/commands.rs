use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::prelude::{Level, emit};

use super::cli::{RenderArgs, SelectArgs, ShortsCommands};
use super::render::render_clips;
use super::segment::{load_scores, score_segments};
use super::selector::{CandidateClip, select_clips};
use super::srt::parse_srt;

pub fn handle_shorts_command(command: ShortsCommands) -> Result<()> {
    match command {
        ShortsCommands::Select(args) => handle_select(args),
        ShortsCommands::Render(args) => handle_render(args),
    }
}

fn handle_select(args: SelectArgs) -> Result<()> {
    let clips = run_selection(
        &args.transcript,
        args.scores.as_deref(),
        &args.keywords,
        &args.tuning,
    )?;

    if clips.is_empty() {
        emit(
            Level::Warn,
            "shorts.select.empty",
            "No clips cleared the score threshold",
            None,
        );
        return Ok(());
    }

    for (index, clip) in clips.iter().enumerate() {
        emit(
            Level::Info,
            "shorts.select.clip",
            &format!(
                "Clip {}: {} - {} (score {:.2})",
                index + 1,
                format_seconds(clip.start),
                format_seconds(clip.end),
                clip.score
            ),
            Some(json!({
                "start": clip.start,
                "end": clip.end,
                "score": clip.score,
                "text": clip.text,
            })),
        );
    }

    emit(
        Level::Success,
        "shorts.select.done",
        &format!("Selected {} clips", clips.len()),
        None,
    );

    Ok(())
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let transcript = match &args.transcript {
        Some(path) => path.clone(),
        None => args.video.with_extension("srt"),
    };

    let clips = run_selection(
        &transcript,
        args.scores.as_deref(),
        &args.keywords,
        &args.tuning,
    )?;

    if clips.is_empty() {
        emit(
            Level::Warn,
            "shorts.render.empty",
            "No clips cleared the score threshold; nothing to render",
            None,
        );
        return Ok(());
    }

    let video_stem = args
        .video
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| format!("{video_stem}_short_"));
    let out_dir: PathBuf = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .video
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("shorts"),
    };

    render_clips(&args.video, &clips, &out_dir, &prefix)?;
    Ok(())
}

fn run_selection(
    transcript: &Path,
    scores: Option<&Path>,
    keywords: &[String],
    tuning: &super::cli::TuningArgs,
) -> Result<Vec<CandidateClip>> {
    let contents = fs::read_to_string(transcript)
        .with_context(|| format!("Failed to read transcript file {}", transcript.display()))?;
    let cues = parse_srt(&contents)?;

    let sidecar = match scores {
        Some(path) => load_scores(path)?,
        None => Vec::new(),
    };

    let segments = score_segments(&cues, &sidecar);
    Ok(select_clips(&segments, &tuning.to_params(), keywords))
}

fn format_seconds(seconds: f64) -> String {
    let total_tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let whole = total_tenths / 10;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}.{}", total_tenths % 10)
}
