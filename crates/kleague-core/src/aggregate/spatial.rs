// Location-based rollups: zone histograms, attack direction, shot maps,
// defensive shape and progressive passes.

use serde::Serialize;

use crate::event::{EventKind, PitchPoint, PITCH_LENGTH, PITCH_WIDTH};
use crate::metrics::DerivedEvent;

// ---------------------------------------------------------------------------
// Zone histograms
// ---------------------------------------------------------------------------

/// A regular grid over the pitch starting at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneGrid {
    pub x_size: f64,
    pub y_size: f64,
    pub x_end: f64,
    pub y_end: f64,
}

impl ZoneGrid {
    /// Coarse 3x3 thirds used by the action-zone heat map.
    pub const ACTION_ZONES: ZoneGrid = ZoneGrid {
        x_size: 35.0,
        y_size: 22.6,
        x_end: PITCH_LENGTH,
        y_end: PITCH_WIDTH,
    };

    /// Fine 20x20 grid used to highlight zone 14.
    pub const ZONE_14: ZoneGrid = ZoneGrid {
        x_size: 5.25,
        y_size: 3.4,
        x_end: PITCH_LENGTH,
        y_end: PITCH_WIDTH,
    };

    pub fn columns(&self) -> usize {
        bin_count(self.x_end, self.x_size)
    }

    pub fn rows(&self) -> usize {
        bin_count(self.y_end, self.y_size)
    }

    /// `(column, row)` of `p`, or `None` off the grid. Points on the far
    /// edge fall in the last cell.
    pub fn cell(&self, p: PitchPoint) -> Option<(usize, usize)> {
        let col = bin_index(p.x, self.x_size, self.x_end, self.columns())?;
        let row = bin_index(p.y, self.y_size, self.y_end, self.rows())?;
        Some((col, row))
    }
}

fn bin_count(end: f64, size: f64) -> usize {
    if size <= 0.0 || !size.is_finite() {
        return 0;
    }
    ((end / size).round() as usize).max(1)
}

fn bin_index(v: f64, size: f64, end: f64, count: usize) -> Option<usize> {
    if count == 0 || !v.is_finite() || v < 0.0 || v > end {
        return None;
    }
    Some(((v / size).floor() as usize).min(count - 1))
}

/// Event counts per cell, `counts[row][column]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneHistogram {
    pub grid: ZoneGrid,
    pub counts: Vec<Vec<usize>>,
}

impl ZoneHistogram {
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Bin event start locations over `grid`.
pub fn zone_histogram<'a, I>(events: I, grid: ZoneGrid) -> ZoneHistogram
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut counts = vec![vec![0; grid.columns()]; grid.rows()];
    for e in events {
        if let Some((col, row)) = grid.cell(e.start()) {
            counts[row][col] += 1;
        }
    }
    ZoneHistogram { grid, counts }
}

/// Zone 14: the central strip just outside the opposition box.
pub const ZONE_14_X: (f64, f64) = (70.0, 87.5);
pub const ZONE_14_Y: (f64, f64) = (22.6, 45.3);

pub fn in_zone_14(p: PitchPoint) -> bool {
    (ZONE_14_X.0..=ZONE_14_X.1).contains(&p.x) && (ZONE_14_Y.0..=ZONE_14_Y.1).contains(&p.y)
}

pub fn zone_14_touches<'a, I>(events: I) -> usize
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    events.into_iter().filter(|e| in_zone_14(e.start())).count()
}

// ---------------------------------------------------------------------------
// Attack direction
// ---------------------------------------------------------------------------

/// Start of the attacking third.
pub const FINAL_THIRD_X: f64 = 70.0;
/// Channel boundaries across the width.
pub const LEFT_CHANNEL_Y: f64 = 22.6;
pub const RIGHT_CHANNEL_Y: f64 = 45.4;

/// Final-third events split by channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttackDirection {
    pub left: usize,
    pub center: usize,
    pub right: usize,
}

impl AttackDirection {
    pub fn compute<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        let mut split = AttackDirection::default();
        for e in events {
            let p = e.start();
            if p.x <= FINAL_THIRD_X {
                continue;
            }
            if p.y < LEFT_CHANNEL_Y {
                split.left += 1;
            } else if p.y <= RIGHT_CHANNEL_Y {
                split.center += 1;
            } else if p.y > RIGHT_CHANNEL_Y {
                split.right += 1;
            }
        }
        split
    }

    pub fn total(&self) -> usize {
        self.left + self.center + self.right
    }

    /// `[left, center, right]` shares of the final-third total.
    pub fn fractions(&self) -> [f64; 3] {
        let total = self.total().max(1) as f64;
        [
            self.left as f64 / total,
            self.center as f64 / total,
            self.right as f64 / total,
        ]
    }
}

// ---------------------------------------------------------------------------
// Shot map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotPoint {
    pub player: String,
    pub location: PitchPoint,
    pub xg: f64,
    pub minute: i64,
}

impl ShotPoint {
    fn from_event(e: &DerivedEvent) -> Self {
        ShotPoint {
            player: e.player().to_string(),
            location: e.start(),
            xg: e.xg,
            minute: e.minute(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShotMap {
    pub goals: Vec<ShotPoint>,
    pub misses: Vec<ShotPoint>,
}

/// `team`'s shot attempts split by whether they were scored.
pub fn shot_map<'a, I>(events: I, team: &str) -> ShotMap
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut map = ShotMap::default();
    for e in events {
        if e.team() != team || !e.kind().is_shot_attempt() {
            continue;
        }
        if e.event.is_goal() {
            map.goals.push(ShotPoint::from_event(e));
        } else {
            map.misses.push(ShotPoint::from_event(e));
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Defence
// ---------------------------------------------------------------------------

/// Depth of a team's defensive actions along x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefensiveLines {
    pub average: f64,
    pub high_press: f64,
    pub low_block: f64,
}

impl DefensiveLines {
    /// Over Recovery, Interception and Duel events. `None` without any.
    pub fn compute<'a, I>(events: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DerivedEvent>,
    {
        let mut xs: Vec<f64> = events
            .into_iter()
            .filter(|e| {
                matches!(
                    e.kind(),
                    EventKind::Recovery | EventKind::Interception | EventKind::Duel
                )
            })
            .map(|e| e.start().x)
            .collect();
        if xs.is_empty() {
            return None;
        }
        xs.sort_by(f64::total_cmp);
        Some(DefensiveLines {
            average: super::mean(&xs),
            high_press: quantile(&xs, 0.75),
            low_block: quantile(&xs, 0.25),
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefensiveActions {
    pub tackles: Vec<PitchPoint>,
    pub interceptions: Vec<PitchPoint>,
    pub recoveries: Vec<PitchPoint>,
}

pub fn defensive_actions<'a, I>(events: I, team: &str) -> DefensiveActions
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut actions = DefensiveActions::default();
    for e in events.into_iter().filter(|e| e.team() == team) {
        match e.kind() {
            EventKind::Tackle => actions.tackles.push(e.start()),
            EventKind::Interception => actions.interceptions.push(e.start()),
            EventKind::Recovery => actions.recoveries.push(e.start()),
            _ => {}
        }
    }
    actions
}

// ---------------------------------------------------------------------------
// Pass flow
// ---------------------------------------------------------------------------

/// Minimum forward gain (metres) for a pass to count as progressive.
pub const PROGRESSIVE_GAIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassArrow {
    pub player: String,
    pub start: PitchPoint,
    pub end: PitchPoint,
}

pub fn progressive_passes<'a, I>(events: I, team: &str) -> Vec<PassArrow>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    events
        .into_iter()
        .filter(|e| e.team() == team && e.kind().is_pass())
        .filter(|e| e.end().x > e.start().x + PROGRESSIVE_GAIN)
        .map(|e| PassArrow {
            player: e.player().to_string(),
            start: e.start(),
            end: e.end(),
        })
        .collect()
}
