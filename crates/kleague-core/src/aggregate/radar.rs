// Five-axis team comparison radar, normalized against the stronger side.

use serde::Serialize;

use crate::event::EventKind;
use crate::metrics::DerivedEvent;

pub const RADAR_AXES: [&str; 5] = ["Pass Volume", "Attack", "Physical", "Directness", "Width"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRadar {
    pub axes: [&'static str; 5],
    /// 0..=100 per axis.
    pub home: [f64; 5],
    pub away: [f64; 5],
}

/// Raw axis values: passes, shots x10, duels, forward passes, spread of
/// y x5.
fn raw_axes(events: &[&DerivedEvent]) -> [f64; 5] {
    let mut passes = 0.0;
    let mut shots = 0.0;
    let mut duels = 0.0;
    let mut forward = 0.0;
    for e in events {
        match e.kind() {
            EventKind::Pass => passes += 1.0,
            EventKind::Shot => shots += 1.0,
            EventKind::Duel => duels += 1.0,
            _ => {}
        }
        if e.event.is_forward_pass() {
            forward += 1.0;
        }
    }
    let width = sample_std(events.iter().map(|e| e.start().y));
    [passes, shots * 10.0, duels, forward, width * 5.0]
}

/// Sample standard deviation; 0 with fewer than two values.
fn sample_std(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return 0.0;
    }
    let mean = super::mean(&values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

pub fn team_radar<'a, I>(events: I, home: &str, away: &str) -> TeamRadar
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let events: Vec<&DerivedEvent> = events.into_iter().collect();
    let side = |team: &str| {
        let team_events: Vec<&DerivedEvent> =
            events.iter().copied().filter(|e| e.team() == team).collect();
        raw_axes(&team_events)
    };
    let h = side(home);
    let a = side(away);

    let mut radar = TeamRadar {
        axes: RADAR_AXES,
        home: [0.0; 5],
        away: [0.0; 5],
    };
    for i in 0..5 {
        let max = h[i].max(a[i]);
        let denom = if max > 0.0 { max } else { 1.0 };
        radar.home[i] = h[i] / denom * 100.0;
        radar.away[i] = a[i] / denom * 100.0;
    }
    radar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::testutil::Ev;

    #[test]
    fn stronger_side_scores_100() {
        let events = vec![
            Ev::pass("1", "A", "p").at(10.0, 10.0).to(30.0, 10.0).build(),
            Ev::pass("1", "A", "p").at(10.0, 50.0).to(5.0, 50.0).build(),
            Ev::pass("1", "B", "q").at(10.0, 30.0).to(20.0, 30.0).build(),
            Ev::new("1", "B", "q", EventKind::Shot).at(90.0, 30.0).build(),
            // Goals do not count towards the attack axis.
            Ev::new("1", "A", "p", EventKind::Goal).at(90.0, 30.0).build(),
        ];
        let r = team_radar(&events, "A", "B");
        assert_eq!(r.home[0], 100.0);
        assert_eq!(r.away[0], 50.0);
        assert_eq!(r.home[1], 0.0);
        assert_eq!(r.away[1], 100.0);
        assert_eq!(r.home[2], 0.0);
        assert_eq!(r.away[2], 0.0);
        assert_eq!(r.home[3], 100.0);
        assert_eq!(r.away[3], 100.0);
        assert_eq!(r.home[4], 100.0);
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let r = team_radar(std::iter::empty(), "A", "B");
        assert_eq!(r.home, [0.0; 5]);
        assert_eq!(r.away, [0.0; 5]);
    }

    #[test]
    fn std_needs_two_values() {
        assert_eq!(sample_std([3.0].into_iter()), 0.0);
        assert!((sample_std([1.0, 3.0].into_iter()) - 2f64.sqrt()).abs() < 1e-12);
    }
}
