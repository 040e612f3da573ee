use anyhow::{Context, Result};
use duct::cmd;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::prelude::{Level, emit};

use super::selector::CandidateClip;

/// Cut each candidate clip out of the source video with ffmpeg.
///
/// Best-effort: a failed render is logged and skipped so one bad clip never
/// aborts the batch. Returns the paths that were actually created.
pub fn render_clips(
    video: &Path,
    clips: &[CandidateClip],
    output_dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create clip output directory {}",
            output_dir.display()
        )
    })?;

    let mut created = Vec::new();
    for (index, clip) in clips.iter().enumerate() {
        let output_path = output_dir.join(format!("{}{}.mp4", prefix, index + 1));
        emit(
            Level::Info,
            "shorts.render.clip",
            &format!(
                "Rendering clip {}/{}: {}",
                index + 1,
                clips.len(),
                output_path.display()
            ),
            None,
        );

        match cut_clip(video, clip, &output_path) {
            Ok(()) => created.push(output_path),
            Err(err) => {
                emit(
                    Level::Warn,
                    "shorts.render.clip_failed",
                    &format!("Skipping clip {}: {err:#}", index + 1),
                    None,
                );
            }
        }
    }

    emit(
        Level::Success,
        "shorts.render.done",
        &format!("Created {} of {} clips", created.len(), clips.len()),
        None,
    );

    Ok(created)
}

fn cut_clip(video: &Path, clip: &CandidateClip, output_path: &Path) -> Result<()> {
    let ffmpeg_args: Vec<OsString> = vec![
        OsString::from("-y"),
        OsString::from("-i"),
        video.as_os_str().to_os_string(),
        OsString::from("-ss"),
        OsString::from(format!("{:.3}", clip.start)),
        OsString::from("-to"),
        OsString::from(format!("{:.3}", clip.end)),
        OsString::from("-c:v"),
        OsString::from("libx264"),
        OsString::from("-c:a"),
        OsString::from("aac"),
        output_path.as_os_str().to_os_string(),
    ];

    cmd("ffmpeg", ffmpeg_args)
        .stdout_null()
        .stderr_null()
        .run()
        .with_context(|| {
            format!(
                "ffmpeg failed for {:.3}-{:.3} of {}",
                clip.start,
                clip.end,
                video.display()
            )
        })?;

    Ok(())
}
