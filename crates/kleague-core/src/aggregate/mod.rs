// Rollups over derived events. Every function here is total: an empty
// batch produces an empty or zeroed result.

pub mod momentum;
pub mod passing;
pub mod radar;
pub mod spatial;
pub mod timeline;
pub mod totals;

pub use momentum::{momentum, MomentumPoint};
pub use passing::{pass_network, pass_sonar, sonar_layout, PassNetwork, PlayerSonar, SonarLayout};
pub use radar::{team_radar, TeamRadar};
pub use spatial::{
    defensive_actions, progressive_passes, shot_map, zone_14_touches, zone_histogram,
    AttackDirection, DefensiveActions, DefensiveLines, PassArrow, ShotMap, ZoneGrid,
    ZoneHistogram,
};
pub use timeline::{cumulative_xg, form_trend, recent_game_ids, recent_window, FormPoint, XgPoint};
pub use totals::{LeagueAverages, MatchResult, MatchTotals, TeamAverages};

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::metrics::DerivedEvent;

/// Events belonging to `team`, in batch order.
pub fn for_team<'a, I>(events: I, team: &'a str) -> impl Iterator<Item = &'a DerivedEvent> + 'a
where
    I: IntoIterator<Item = &'a DerivedEvent>,
    I::IntoIter: 'a,
{
    events.into_iter().filter(move |e| e.team() == team)
}

/// Distinct game ids in first-seen order.
pub fn distinct_games<'a, I>(events: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .map(DerivedEvent::game_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Distinct team names in first-seen order.
pub fn distinct_teams<'a, I>(events: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut seen = HashSet::new();
    events
        .into_iter()
        .map(DerivedEvent::team)
        .filter(|t| seen.insert(*t))
        .collect()
}

/// Order game ids numerically when both parse, lexically otherwise.
pub fn compare_game_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Arithmetic mean; zero for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::event::{Event, EventKind, Outcome, PitchPoint};
    use crate::metrics::{derive_event, DerivedEvent};

    /// Builder for derived events in rollup tests.
    pub struct Ev(Event);

    impl Ev {
        pub fn new(game: &str, team: &str, player: &str, kind: EventKind) -> Self {
            Ev(Event {
                game_id: game.to_string(),
                team: team.to_string(),
                player: player.to_string(),
                period: 1,
                time_seconds: 0.0,
                kind,
                outcome: None,
                start: PitchPoint::default(),
                end: PitchPoint::default(),
            })
        }

        pub fn pass(game: &str, team: &str, player: &str) -> Self {
            Ev::new(game, team, player, EventKind::Pass)
        }

        pub fn at(mut self, x: f64, y: f64) -> Self {
            self.0.start = PitchPoint::new(x, y);
            self
        }

        pub fn to(mut self, x: f64, y: f64) -> Self {
            self.0.end = PitchPoint::new(x, y);
            self
        }

        pub fn time(mut self, period: u8, seconds: f64) -> Self {
            self.0.period = period;
            self.0.time_seconds = seconds;
            self
        }

        pub fn outcome(mut self, outcome: Outcome) -> Self {
            self.0.outcome = Some(outcome);
            self
        }

        pub fn build(self) -> DerivedEvent {
            derive_event(self.0)
        }
    }
}
