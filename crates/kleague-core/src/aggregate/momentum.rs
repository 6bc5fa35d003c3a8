// Per-minute xT momentum between two teams.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::metrics::DerivedEvent;

/// Rolling window (in minute rows) for smoothing.
pub const SMOOTHING_WINDOW: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MomentumPoint {
    pub minute: i64,
    pub home_xt: f64,
    pub away_xt: f64,
    /// `home_xt - away_xt`, or 0 when either team is absent from the batch.
    pub diff: f64,
    /// Centered moving average of `diff`. Positive favours the home side.
    pub smoothed: f64,
}

/// One point per minute in which any event occurred, ascending.
pub fn momentum<'a, I>(events: I, home: &str, away: &str) -> Vec<MomentumPoint>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut per_minute: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
    let mut home_seen = false;
    let mut away_seen = false;

    for e in events {
        let bucket = per_minute.entry(e.minute()).or_insert((0.0, 0.0));
        if e.team() == home {
            home_seen = true;
            bucket.0 += e.xt;
        } else if e.team() == away {
            away_seen = true;
            bucket.1 += e.xt;
        }
    }

    let both = home_seen && away_seen;
    let mut points: Vec<MomentumPoint> = per_minute
        .into_iter()
        .map(|(minute, (home_xt, away_xt))| MomentumPoint {
            minute,
            home_xt,
            away_xt,
            diff: if both { home_xt - away_xt } else { 0.0 },
            smoothed: 0.0,
        })
        .collect();

    let diffs: Vec<f64> = points.iter().map(|p| p.diff).collect();
    for (point, smoothed) in points.iter_mut().zip(centered_mean(&diffs, SMOOTHING_WINDOW)) {
        point.smoothed = smoothed;
    }
    points
}

/// Centered rolling mean with a minimum of one observation; the window is
/// truncated at either end of the series.
fn centered_mean(values: &[f64], window: usize) -> Vec<f64> {
    let before = window / 2;
    let after = window - before - 1;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after + 1).min(values.len());
            super::mean(&values[lo..hi])
        })
        .collect()
}
