// Per-event geometry and value metrics: distance, shot angle, xG, xT and the
// pass direction bin used by sonar charts.

use serde::Serialize;
use tracing::debug;

use crate::event::{Event, EventKind, PitchPoint, PITCH_LENGTH};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// y coordinate of the centre of the goal mouth.
pub const GOAL_CENTER_Y: f64 = 34.0;

/// Left and right posts (goal centre +/- 3.66 m).
pub const NEAR_POST_Y: f64 = 30.34;
pub const FAR_POST_Y: f64 = 37.66;

/// Nominal length of a half; second-half clocks that restart at zero are
/// shifted by this much.
pub const HALF_DURATION_SECONDS: f64 = 2700.0;

/// Hand-tuned logistic xG model coefficients.
const XG_INTERCEPT: f64 = -1.5;
const XG_DISTANCE_COEF: f64 = -0.12;
const XG_ANGLE_COEF: f64 = 2.0;

/// xT credited per metre of forward progress on a pass.
const XT_PER_METRE: f64 = 0.002;

/// Width of a pass-direction bin in degrees.
pub const ANGLE_BIN_DEGREES: f64 = 45.0;

// ---------------------------------------------------------------------------
// Derived event
// ---------------------------------------------------------------------------

/// An event with its derived columns attached. Built once by [`derive`] and
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Match-clock seconds, continuous across halves.
    pub normalized_time: f64,
    pub distance_to_goal: f64,
    /// Radians subtended by the goal mouth from the event's start point.
    pub shot_angle: f64,
    pub xg: f64,
    pub xt: f64,
    /// Direction of travel rounded to the nearest 45 degrees.
    pub pass_angle_bin: i32,
}

impl DerivedEvent {
    pub fn game_id(&self) -> &str {
        &self.event.game_id
    }

    pub fn team(&self) -> &str {
        &self.event.team
    }

    pub fn player(&self) -> &str {
        &self.event.player
    }

    pub fn kind(&self) -> &EventKind {
        &self.event.kind
    }

    pub fn start(&self) -> PitchPoint {
        self.event.start
    }

    pub fn end(&self) -> PitchPoint {
        self.event.end
    }

    /// Match minute bucket (`floor(normalized_time / 60)`).
    pub fn minute(&self) -> i64 {
        (self.normalized_time / 60.0).floor() as i64
    }
}

// ---------------------------------------------------------------------------
// Batch derivation
// ---------------------------------------------------------------------------

/// Attach derived metrics to every event. Total: the output has exactly one
/// row per input row, in the same order.
pub fn derive(events: Vec<Event>) -> Vec<DerivedEvent> {
    let derived: Vec<DerivedEvent> = events.into_iter().map(derive_event).collect();
    debug!(events = derived.len(), "derived event metrics");
    derived
}

/// Attach derived metrics to a single event.
pub fn derive_event(event: Event) -> DerivedEvent {
    let distance = distance_to_goal(event.start);
    let angle = shot_angle(event.start);
    let xg = if event.kind.is_shot_attempt() {
        expected_goals(distance, angle)
    } else {
        0.0
    };
    let xt = expected_threat(&event);

    DerivedEvent {
        normalized_time: normalized_time(event.period, event.time_seconds),
        distance_to_goal: distance,
        shot_angle: angle,
        xg,
        xt,
        pass_angle_bin: pass_angle_bin(event.start, event.end),
        event,
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Second-half events whose clock restarted at zero are moved past the
/// first half so minute buckets stay continuous.
pub fn normalized_time(period: u8, time_seconds: f64) -> f64 {
    if period == 2 && time_seconds < HALF_DURATION_SECONDS {
        time_seconds + HALF_DURATION_SECONDS
    } else {
        time_seconds
    }
}

/// Straight-line distance from `p` to the centre of the attacked goal.
pub fn distance_to_goal(p: PitchPoint) -> f64 {
    ((PITCH_LENGTH - p.x).powi(2) + (GOAL_CENTER_Y - p.y).powi(2)).sqrt()
}

/// Angular width of the goal mouth seen from `p`, in radians (always >= 0).
pub fn shot_angle(p: PitchPoint) -> f64 {
    let dx = PITCH_LENGTH - p.x;
    let a1 = (NEAR_POST_Y - p.y).atan2(dx);
    let a2 = (FAR_POST_Y - p.y).atan2(dx);
    (a1 - a2).abs()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic xG from distance (metres) and shot angle (radians).
pub fn expected_goals(distance: f64, angle: f64) -> f64 {
    sigmoid(XG_INTERCEPT + XG_DISTANCE_COEF * distance + XG_ANGLE_COEF * angle)
}

/// xT for forward passes; zero for everything else.
pub fn expected_threat(event: &Event) -> f64 {
    if event.is_forward_pass() {
        (event.end.x - event.start.x) * XT_PER_METRE
    } else {
        0.0
    }
}

/// Travel direction rounded to the nearest 45 degrees. Exact halves round
/// to the even multiple, so 22.5 degrees lands in bin 0 and 67.5 in bin 90.
pub fn pass_angle_bin(start: PitchPoint, end: PitchPoint) -> i32 {
    bin_degrees((end.y - start.y).atan2(end.x - start.x).to_degrees())
}

fn bin_degrees(degrees: f64) -> i32 {
    let bin = (degrees / ANGLE_BIN_DEGREES).round_ties_even() * ANGLE_BIN_DEGREES;
    if bin.is_finite() {
        bin as i32
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Outcome;

    fn event(kind: EventKind, start: (f64, f64), end: (f64, f64)) -> Event {
        Event {
            game_id: "1".into(),
            team: "울산".into(),
            player: "Player".into(),
            period: 1,
            time_seconds: 100.0,
            kind,
            outcome: None,
            start: PitchPoint::new(start.0, start.1),
            end: PitchPoint::new(end.0, end.1),
        }
    }

    #[test]
    fn empty_batch_derives_to_empty() {
        assert!(derive(Vec::new()).is_empty());
    }

    #[test]
    fn derive_keeps_row_count_and_order() {
        let batch = vec![
            event(EventKind::Pass, (10.0, 10.0), (20.0, 10.0)),
            event(EventKind::Shot, (90.0, 34.0), (105.0, 34.0)),
            event(EventKind::Other("Clearance".into()), (5.0, 30.0), (40.0, 30.0)),
        ];
        let derived = derive(batch.clone());
        assert_eq!(derived.len(), 3);
        for (d, e) in derived.iter().zip(batch.iter()) {
            assert_eq!(&d.event, e);
        }
    }

    #[test]
    fn second_half_clock_is_shifted() {
        assert_eq!(normalized_time(2, 120.0), 2820.0);
        assert_eq!(normalized_time(2, 2900.0), 2900.0);
        assert_eq!(normalized_time(1, 120.0), 120.0);
    }

    #[test]
    fn close_central_shot_geometry() {
        let p = PitchPoint::new(100.0, 34.0);
        assert!((distance_to_goal(p) - 5.0).abs() < 1e-9);
        // Goal mouth of 7.32 m seen from 5 m straight on.
        let expected = 2.0 * (3.66f64).atan2(5.0);
        assert!((shot_angle(p) - expected).abs() < 1e-9);
    }

    #[test]
    fn default_coordinates_give_finite_geometry() {
        let p = PitchPoint::default();
        assert!(distance_to_goal(p).is_finite());
        assert!(shot_angle(p) >= 0.0);
    }

    #[test]
    fn close_shot_beats_long_range_shot() {
        let close = derive_event(event(EventKind::Shot, (100.0, 34.0), (105.0, 34.0)));
        let far = derive_event(event(EventKind::Shot, (20.0, 5.0), (105.0, 34.0)));
        assert!(close.xg > 0.3);
        assert!(far.xg < 0.01);
        assert!(close.xg > far.xg * 10.0);
    }

    #[test]
    fn xg_only_for_shot_attempts() {
        let pass = derive_event(event(EventKind::Pass, (100.0, 34.0), (104.0, 34.0)));
        assert_eq!(pass.xg, 0.0);
        let mut goal = event(EventKind::Goal, (95.0, 30.0), (105.0, 34.0));
        goal.outcome = Some(Outcome::Goal);
        assert!(derive_event(goal).xg > 0.0);
    }

    #[test]
    fn xg_monotone_in_distance_and_angle() {
        let angle = 0.4;
        let mut prev = f64::INFINITY;
        for d in [2.0, 8.0, 16.0, 30.0, 60.0] {
            let xg = expected_goals(d, angle);
            assert!(xg <= prev);
            prev = xg;
        }
        let mut prev = 0.0;
        for a in [0.0, 0.2, 0.6, 1.2, 2.0] {
            let xg = expected_goals(15.0, a);
            assert!(xg >= prev);
            prev = xg;
        }
    }

    #[test]
    fn xt_for_forward_passes_only() {
        let forward = derive_event(event(EventKind::Pass, (30.0, 20.0), (55.0, 20.0)));
        assert!((forward.xt - 0.05).abs() < 1e-12);

        let backward = derive_event(event(EventKind::Pass, (55.0, 20.0), (30.0, 20.0)));
        assert_eq!(backward.xt, 0.0);

        let square = derive_event(event(EventKind::Pass, (40.0, 10.0), (40.0, 50.0)));
        assert_eq!(square.xt, 0.0);

        let carry = derive_event(event(EventKind::Other("Carry".into()), (30.0, 20.0), (55.0, 20.0)));
        assert_eq!(carry.xt, 0.0);
    }

    #[test]
    fn angle_bins_round_to_45_degrees() {
        let o = PitchPoint::new(50.0, 34.0);
        assert_eq!(pass_angle_bin(o, PitchPoint::new(60.0, 34.0)), 0);
        assert_eq!(pass_angle_bin(o, PitchPoint::new(60.0, 44.0)), 45);
        assert_eq!(pass_angle_bin(o, PitchPoint::new(50.0, 44.0)), 90);
        assert_eq!(pass_angle_bin(o, PitchPoint::new(40.0, 34.0)), 180);
        assert_eq!(pass_angle_bin(o, PitchPoint::new(50.0, 24.0)), -90);
        // Zero-length pass.
        assert_eq!(pass_angle_bin(o, o), 0);
    }

    #[test]
    fn angle_bin_ties_round_to_even() {
        assert_eq!(bin_degrees(22.5), 0);
        assert_eq!(bin_degrees(67.5), 90);
        assert_eq!(bin_degrees(-22.5), 0);
        assert_eq!(bin_degrees(30.0), 45);
        assert_eq!(bin_degrees(f64::NAN), 0);
    }

    #[test]
    fn minute_bucket_uses_normalized_time() {
        let mut e = event(EventKind::Pass, (10.0, 10.0), (20.0, 10.0));
        e.period = 2;
        e.time_seconds = 61.0;
        let d = derive_event(e);
        assert_eq!(d.minute(), 46);
    }
}
