use crate::timeline::Interval;

use super::segment::ScoredSegment;

/// Tuning knobs for clip selection, all in seconds except the threshold.
#[derive(Debug, Clone)]
pub struct SelectorParams {
    pub min_duration: f64,
    pub max_duration: f64,
    pub padding: f64,
    pub max_overlap: f64,
    pub max_extension: f64,
    /// Minimum window score for acceptance; lower admits more clips.
    pub score_threshold: f64,
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            min_duration: 15.0,
            max_duration: 20.0,
            padding: 2.0,
            max_overlap: 5.0,
            max_extension: 5.0,
            score_threshold: 0.3,
        }
    }
}

/// A proposed sub-interval of the source video, ordered by start time in the
/// selector output so downstream numbering matches chronological appearance.
#[derive(Debug, Clone)]
pub struct CandidateClip {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub score: f64,
}

impl CandidateClip {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

const KEYWORD_BONUS: f64 = 0.05;
const KEYWORD_BONUS_CAP: f64 = 0.20;

/// Choose non-overlapping highlight intervals from a scored transcript.
///
/// Slides a window over the segment sequence, accepting windows whose mean
/// score (plus keyword bonus) clears the threshold, then pads, normalizes
/// duration, and suppresses near-duplicates by bounding pairwise overlap.
/// An empty or all-sub-threshold input yields an empty output, not an error.
pub fn select_clips(
    segments: &[ScoredSegment],
    params: &SelectorParams,
    keywords: &[String],
) -> Vec<CandidateClip> {
    let Some(last) = segments.last() else {
        return Vec::new();
    };
    let total_duration = last.end;
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut accepted: Vec<CandidateClip> = Vec::new();

    for i in 0..segments.len() {
        let window = grow_window(segments, i, params.max_duration);
        let score = window_score(&segments[i..=window.last_index], &lowered);
        if score <= params.score_threshold {
            continue;
        }

        let padded = Interval::new(
            window.start - params.padding,
            window.end + params.padding,
        )
        .clamp_to(0.0, total_duration);
        let normalized = normalize_duration(padded, params, total_duration);

        let too_similar = accepted.iter().any(|clip| {
            clip.interval().overlap_seconds(&normalized) > params.max_overlap
        });
        if too_similar {
            continue;
        }

        let text = segments[i..=window.last_index]
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        accepted.push(CandidateClip {
            start: normalized.start,
            end: normalized.end,
            text,
            score,
        });
    }

    synthesize_edges(&mut accepted, params, total_duration);
    accepted.sort_by(|a, b| a.start.total_cmp(&b.start));
    accepted
}

struct Window {
    start: f64,
    end: f64,
    last_index: usize,
}

/// Greedily take consecutive segments while the window stays within the
/// duration budget. The first segment is always included, even when it alone
/// exceeds the budget; normalization trims it later instead of dropping it.
fn grow_window(segments: &[ScoredSegment], first: usize, max_duration: f64) -> Window {
    let start = segments[first].start;
    let mut end = segments[first].end;
    let mut last_index = first;

    for (offset, segment) in segments[first + 1..].iter().enumerate() {
        if segment.end - start > max_duration {
            break;
        }
        end = segment.end;
        last_index = first + 1 + offset;
    }

    Window {
        start,
        end,
        last_index,
    }
}

fn window_score(window: &[ScoredSegment], keywords: &[String]) -> f64 {
    let mean = window.iter().map(|s| s.score).sum::<f64>() / window.len() as f64;

    let text = window
        .iter()
        .map(|s| s.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    let matches = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    let bonus = (matches as f64 * KEYWORD_BONUS).min(KEYWORD_BONUS_CAP);

    mean + bonus
}

/// Bring an interval into `[min_duration, max_duration + max_extension]`.
///
/// Extension comes first: grow symmetrically, and when one boundary is pinned
/// at a timeline edge push the remainder entirely to the other side. Trimming
/// then removes any excess symmetrically, keeping the clip centered.
fn normalize_duration(interval: Interval, params: &SelectorParams, total: f64) -> Interval {
    let mut start = interval.start;
    let mut end = interval.end;

    let duration = interval.duration();
    if duration < params.min_duration {
        let half = (params.min_duration - duration) / 2.0;
        start -= half;
        end += half;
        if start < 0.0 {
            end += -start;
            start = 0.0;
        }
        if end > total {
            start -= end - total;
            end = total;
            start = start.max(0.0);
        }
    }

    let duration = end - start;
    let cap = params.max_duration + params.max_extension;
    if duration > cap {
        let trim = (duration - cap) / 2.0;
        start += trim;
        end -= trim;
    }

    Interval::new(start, end)
}

/// Represent the video's edges even when nothing there scored: an uncovered
/// prefix becomes an introduction clip and an uncovered suffix a conclusion
/// clip. Only regions at least `min_duration` long are synthesized, so the
/// new clips never have to extend into their neighbors.
fn synthesize_edges(accepted: &mut Vec<CandidateClip>, params: &SelectorParams, total: f64) {
    if accepted.is_empty() {
        return;
    }

    let first_start = accepted
        .iter()
        .map(|c| c.start)
        .fold(f64::INFINITY, f64::min);
    if first_start >= params.min_duration {
        let interval = normalize_duration(
            Interval::new(0.0, first_start.min(params.max_duration)),
            params,
            total,
        );
        accepted.push(CandidateClip {
            start: interval.start,
            end: interval.end,
            text: "Video Introduction".to_string(),
            score: 0.0,
        });
    }

    let last_end = accepted
        .iter()
        .map(|c| c.end)
        .fold(f64::NEG_INFINITY, f64::max);
    if total - last_end >= params.min_duration {
        let interval = normalize_duration(
            Interval::new((total - params.max_duration).max(last_end), total),
            params,
            total,
        );
        accepted.push(CandidateClip {
            start: interval.start,
            end: interval.end,
            text: "Video Conclusion".to_string(),
            score: 0.0,
        });
    }
}
