use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::timeline::Interval;

use super::srt::SrtCue;

/// A transcript cue with a quality score in `[0, 1]`, ready for clip selection.
#[derive(Debug, Clone)]
pub struct ScoredSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub score: f64,
}

/// One entry of the JSON score sidecar written by the transcription step.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentScore {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sentiment {
    pub magnitude: f64,
}

const DEFAULT_CONFIDENCE: f64 = 1.0;

pub fn load_scores(path: &Path) -> Result<Vec<SegmentScore>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read score sidecar {}", path.display()))?;
    let scores: Vec<SegmentScore> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse score sidecar {}", path.display()))?;

    for entry in &scores {
        if entry.end < entry.start {
            bail!(
                "Score sidecar entry ends before it starts: {} --> {}",
                entry.start,
                entry.end
            );
        }
    }

    Ok(scores)
}

/// Attach a score to every cue by blending transcription confidence, sentiment
/// magnitude, and how well the cue duration fits the short-clip sweet spot.
///
/// Sidecar entries are matched to cues by maximum timeline overlap; cues with
/// no matching entry get the neutral defaults.
pub fn score_segments(cues: &[SrtCue], scores: &[SegmentScore]) -> Vec<ScoredSegment> {
    cues.iter()
        .map(|cue| {
            let matched = best_overlap(cue, scores);
            let confidence = matched
                .and_then(|s| s.confidence)
                .unwrap_or(DEFAULT_CONFIDENCE);
            let magnitude = matched
                .and_then(|s| s.sentiment.as_ref())
                .map(|s| s.magnitude.abs().min(1.0))
                .unwrap_or(0.0);
            let fit = duration_fit(cue.end - cue.start);

            let score = 0.5 * confidence + 0.3 * magnitude + 0.2 * fit;

            ScoredSegment {
                start: cue.start,
                end: cue.end,
                text: cue.text.clone(),
                score: score.clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn best_overlap<'a>(cue: &SrtCue, scores: &'a [SegmentScore]) -> Option<&'a SegmentScore> {
    let cue_interval = Interval::new(cue.start, cue.end);
    scores
        .iter()
        .map(|s| {
            (
                s,
                Interval::new(s.start, s.end).overlap_seconds(&cue_interval),
            )
        })
        .filter(|(_, overlap)| *overlap > 0.0)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(s, _)| s)
}

/// Peaks at 1.0 for 15-30s cues and falls off linearly to 0.0 at 0s and 60s.
fn duration_fit(duration: f64) -> f64 {
    if duration < 15.0 {
        (duration / 15.0).max(0.0)
    } else if duration <= 30.0 {
        1.0
    } else {
        ((60.0 - duration) / 30.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64) -> SrtCue {
        SrtCue {
            start,
            end,
            text: "hello".to_string(),
        }
    }

    #[test]
    fn duration_fit_peaks_in_sweet_spot() {
        assert_eq!(duration_fit(20.0), 1.0);
        assert_eq!(duration_fit(15.0), 1.0);
        assert_eq!(duration_fit(30.0), 1.0);
        assert_eq!(duration_fit(0.0), 0.0);
        assert_eq!(duration_fit(60.0), 0.0);
        assert!(duration_fit(7.5) > 0.49 && duration_fit(7.5) < 0.51);
        assert_eq!(duration_fit(90.0), 0.0);
    }

    #[test]
    fn cue_without_sidecar_gets_neutral_blend() {
        let segments = score_segments(&[cue(0.0, 20.0)], &[]);
        // confidence 1.0, magnitude 0.0, fit 1.0
        assert!((segments[0].score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn sidecar_is_matched_by_overlap() {
        let scores = vec![
            SegmentScore {
                start: 0.0,
                end: 5.0,
                confidence: Some(0.2),
                sentiment: None,
            },
            SegmentScore {
                start: 5.0,
                end: 25.0,
                confidence: Some(0.8),
                sentiment: Some(Sentiment { magnitude: 2.0 }),
            },
        ];
        let segments = score_segments(&[cue(4.0, 24.0)], &scores);
        // overlaps the second entry more: 0.5*0.8 + 0.3*1.0 + 0.2*1.0
        assert!((segments[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn score_is_clamped_to_unit_range() {
        let scores = vec![SegmentScore {
            start: 0.0,
            end: 20.0,
            confidence: Some(5.0),
            sentiment: Some(Sentiment { magnitude: 10.0 }),
        }];
        let segments = score_segments(&[cue(0.0, 20.0)], &scores);
        assert_eq!(segments[0].score, 1.0);
    }

    #[test]
    fn malformed_sidecar_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, r#"[{"start": 10.0, "end": 2.0}]"#).unwrap();
        assert!(load_scores(&path).is_err());
    }
}
