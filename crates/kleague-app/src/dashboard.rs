// Dashboard views handed to the visualization layer as JSON.
//
// `MatchDashboard` covers one game with both sides drawn in full;
// `RecentDashboard` covers the team's last N games. Both are composed
// purely from the core rollups.

use chrono::NaiveDate;
use serde::Serialize;

use kleague_core::absence::Absence;
use kleague_core::aggregate::{
    cumulative_xg, defensive_actions, distinct_teams, for_team, form_trend, momentum,
    pass_network, progressive_passes, recent_game_ids, recent_window, shot_map, sonar_layout,
    team_radar, zone_14_touches, zone_histogram, AttackDirection, DefensiveActions,
    DefensiveLines, FormPoint, LeagueAverages, MatchResult, MatchTotals, MomentumPoint,
    PassArrow, PassNetwork, ShotMap, SonarLayout, TeamAverages, TeamRadar, XgPoint, ZoneGrid,
    ZoneHistogram,
};
use kleague_core::config::{ManagerConfig, SelectionConfig, ViewMode};
use kleague_core::fixture::{Fixture, MatchOption};
use kleague_core::formation::Lineup;
use kleague_core::metrics::DerivedEvent;
use kleague_core::roster::PlayerMinutes;
use kleague_core::summary::MatchContext;
use kleague_core::teams::{absence_feed_names, canonical_team_key, manager_on};

use crate::dataset::Dataset;

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Spatial views of one team's events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamShape {
    pub action_zones: ZoneHistogram,
    pub zone_14_touches: usize,
    pub attack_direction: AttackDirection,
    pub attack_fractions: [f64; 3],
    pub defensive_lines: Option<DefensiveLines>,
    pub defensive_actions: DefensiveActions,
    pub shot_map: ShotMap,
    pub progressive_passes: Vec<PassArrow>,
}

impl TeamShape {
    fn compute(events: &[&DerivedEvent], team: &str) -> Self {
        let own: Vec<&DerivedEvent> = for_team(events.iter().copied(), team).collect();
        let attack_direction = AttackDirection::compute(own.iter().copied());
        TeamShape {
            action_zones: zone_histogram(own.iter().copied(), ZoneGrid::ACTION_ZONES),
            zone_14_touches: zone_14_touches(own.iter().copied()),
            attack_fractions: attack_direction.fractions(),
            attack_direction,
            defensive_lines: DefensiveLines::compute(own.iter().copied()),
            defensive_actions: defensive_actions(own.iter().copied(), team),
            shot_map: shot_map(own.iter().copied(), team),
            progressive_passes: progressive_passes(own.iter().copied(), team),
        }
    }
}

/// One side of a single match: totals, spatial views, lineup and absences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    pub team: String,
    pub totals: MatchTotals,
    pub xg_timeline: Vec<XgPoint>,
    pub shape: TeamShape,
    pub lineup: Option<Lineup>,
    pub pass_network: Option<PassNetwork>,
    pub sonar: Option<SonarLayout>,
    /// Players out on the match date. Empty without a date.
    pub absences: Vec<Absence>,
}

impl SideSummary {
    fn build(
        dataset: &Dataset,
        managers: &ManagerConfig,
        events: &[DerivedEvent],
        team: &str,
        round: Option<u32>,
        date: Option<NaiveDate>,
    ) -> Self {
        let team_key = canonical_team_key(team);
        let positions = round
            .map(|r| dataset.roster().positions_for(r, &team_key))
            .unwrap_or_default();
        let refs: Vec<&DerivedEvent> = events.iter().collect();
        let absences = date
            .map(|d| dataset.absences().on_date(absence_feed_names(managers, team), d))
            .unwrap_or_default();

        SideSummary {
            team: team.to_string(),
            totals: MatchTotals::for_team(events, team),
            xg_timeline: cumulative_xg(events, team),
            shape: TeamShape::compute(&refs, team),
            lineup: round.and_then(|r| dataset.roster().match_lineup(r, &team_key)),
            pass_network: pass_network(events, team, &positions),
            sonar: sonar_layout(events, team, &positions),
            absences,
        }
    }
}

// ---------------------------------------------------------------------------
// Single match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDashboard {
    pub game_id: String,
    pub team: String,
    pub opponent: String,
    pub fixture: Option<Fixture>,
    pub manager: Option<String>,
    pub result: MatchResult,
    pub home: SideSummary,
    pub away: SideSummary,
    pub league: LeagueAverages,
    pub momentum: Vec<MomentumPoint>,
    pub radar: TeamRadar,
    pub context: MatchContext,
}

impl MatchDashboard {
    /// `None` when the game is unknown or fewer than two teams appear in it.
    pub fn build(
        dataset: &Dataset,
        managers: &ManagerConfig,
        game_id: &str,
        team: &str,
    ) -> Option<Self> {
        let events = dataset.game_events(game_id);
        let teams = distinct_teams(&events);
        if teams.len() < 2 || !teams.contains(&team) {
            return None;
        }
        let fixture = dataset.fixture(game_id).cloned();
        let (home, away) = match &fixture {
            Some(f) if teams.contains(&f.home.as_str()) && teams.contains(&f.away.as_str()) => {
                (f.home.clone(), f.away.clone())
            }
            _ => (teams[0].to_string(), teams[1].to_string()),
        };
        let opponent = if team == home { away.clone() } else { home.clone() };
        let context = MatchContext::from_game(&events, team)?;

        let round = fixture.as_ref().and_then(|f| f.round);
        let date = fixture.as_ref().and_then(|f| f.date);
        let side = |name: &str| SideSummary::build(dataset, managers, &events, name, round, date);

        Some(MatchDashboard {
            game_id: game_id.to_string(),
            team: team.to_string(),
            manager: manager_on(managers, team, date).map(str::to_string),
            result: context.result,
            home: side(&home),
            away: side(&away),
            league: dataset.league(),
            momentum: momentum(&events, &home, &away),
            radar: team_radar(&events, &home, &away),
            context,
            fixture,
            opponent,
        })
    }

    /// The home or away side named `team`.
    pub fn side(&self, team: &str) -> Option<&SideSummary> {
        [&self.home, &self.away].into_iter().find(|s| s.team == team)
    }
}

// ---------------------------------------------------------------------------
// Recent games
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentDashboard {
    pub team: String,
    pub manager: Option<String>,
    /// Newest first.
    pub games: Vec<String>,
    pub form: Vec<FormPoint>,
    pub averages: Option<TeamAverages>,
    pub league: LeagueAverages,
    pub shape: TeamShape,
    pub best_eleven: Option<Lineup>,
    pub season_minutes: Vec<PlayerMinutes>,
    /// Season absences, most games missed first.
    pub absences: Vec<Absence>,
}

impl RecentDashboard {
    /// `None` when the team has no events.
    pub fn build(dataset: &Dataset, managers: &ManagerConfig, team: &str, n: usize) -> Option<Self> {
        let events = dataset.events();
        let window = recent_window(events, team, n);
        if window.is_empty() {
            return None;
        }
        let team_key = canonical_team_key(team);
        Some(RecentDashboard {
            team: team.to_string(),
            manager: manager_on(managers, team, None).map(str::to_string),
            games: recent_game_ids(events, team, n),
            form: form_trend(window.iter().copied()),
            averages: TeamAverages::compute(events, team),
            league: dataset.league(),
            shape: TeamShape::compute(&window, team),
            best_eleven: dataset.roster().best_eleven(&team_key),
            season_minutes: dataset.roster().season_minutes(&team_key),
            absences: dataset.absences().season(absence_feed_names(managers, team)),
        })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum View {
    Specific(Box<MatchDashboard>),
    Recent(Box<RecentDashboard>),
}

/// Everything printed for one run: selector entries plus the chosen view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardExport {
    pub team: String,
    pub teams: Vec<String>,
    pub matches: Vec<MatchOption>,
    pub view: Option<View>,
}

impl View {
    /// Build the view named by `selection`. `None` when the data cannot
    /// support it (unknown game, one-sided game, team without events).
    pub fn compose(dataset: &Dataset, managers: &ManagerConfig, selection: &SelectionConfig) -> Option<View> {
        match selection.mode {
            ViewMode::Specific => {
                let game_id = selection.match_id.as_deref()?;
                MatchDashboard::build(dataset, managers, game_id, &selection.team)
                    .map(|d| View::Specific(Box::new(d)))
            }
            ViewMode::Recent => {
                RecentDashboard::build(dataset, managers, &selection.team, selection.recent_games)
                    .map(|d| View::Recent(Box::new(d)))
            }
        }
    }

    /// Match summary for the chat persona; recent views have none.
    pub fn match_context(&self) -> Option<&MatchContext> {
        match self {
            View::Specific(d) => Some(&d.context),
            View::Recent(_) => None,
        }
    }
}

impl DashboardExport {
    pub fn compose(dataset: &Dataset, managers: &ManagerConfig, selection: &SelectionConfig) -> Self {
        DashboardExport {
            team: selection.team.clone(),
            teams: dataset.teams(),
            matches: dataset.match_options(&selection.team),
            view: View::compose(dataset, managers, selection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RawData;
    use kleague_core::absence::{parse_day_first, AbsenceKind};
    use kleague_core::config::TeamManagers;
    use kleague_core::event::{Event, EventKind, Outcome, PitchPoint};

    fn event(game: &str, team: &str, kind: EventKind, x: f64) -> Event {
        Event {
            game_id: game.into(),
            team: team.into(),
            player: format!("{team}-player"),
            period: 1,
            time_seconds: 60.0,
            outcome: (kind == EventKind::Goal).then_some(Outcome::Goal),
            kind,
            start: PitchPoint::new(x, 34.0),
            end: PitchPoint::new(x + 5.0, 34.0),
        }
    }

    fn dataset() -> Dataset {
        Dataset::initialize(RawData {
            events: vec![
                event("1", "A", EventKind::Pass, 40.0),
                event("1", "A", EventKind::Goal, 95.0),
                event("1", "B", EventKind::Shot, 80.0),
                event("2", "A", EventKind::Pass, 75.0),
                event("3", "C", EventKind::Pass, 50.0),
            ],
            ..RawData::default()
        })
    }

    fn selection(mode: ViewMode, match_id: Option<&str>) -> SelectionConfig {
        SelectionConfig {
            team: "A".into(),
            mode,
            match_id: match_id.map(str::to_string),
            recent_games: 5,
        }
    }

    #[test]
    fn match_view_uses_batch_order_without_fixture() {
        let ds = dataset();
        let dash = MatchDashboard::build(&ds, &ManagerConfig::default(), "1", "A").unwrap();
        assert_eq!(dash.home.team, "A");
        assert_eq!(dash.opponent, "B");
        assert_eq!(dash.result, MatchResult::Win);
        assert_eq!(dash.home.totals.goals, 1);
        assert_eq!(dash.away.totals.shots, 1);
        assert!(dash.home.lineup.is_none());
        assert!(dash.manager.is_none());
    }

    #[test]
    fn match_view_draws_both_sides() {
        let ds = dataset();
        let dash = MatchDashboard::build(&ds, &ManagerConfig::default(), "1", "A").unwrap();
        assert_eq!(dash.home.shape.shot_map.goals.len(), 1);
        assert!(dash.home.shape.shot_map.misses.is_empty());
        assert!(dash.away.shape.shot_map.goals.is_empty());
        assert_eq!(dash.away.shape.shot_map.misses.len(), 1);
        assert_eq!(dash.side("B").map(|s| s.team.as_str()), Some("B"));
        assert!(dash.side("C").is_none());
    }

    fn absence(team: &str, player: &str, reason: &str, games: u32, start: &str, end: &str) -> Absence {
        Absence {
            team: team.into(),
            player: player.into(),
            reason: reason.into(),
            kind: AbsenceKind::classify(reason),
            games_missed: games,
            start: parse_day_first(start),
            end: parse_day_first(end),
        }
    }

    fn managers_with_feed_names() -> ManagerConfig {
        let mut managers = ManagerConfig::default();
        for (key, feed) in [("A", "Alpha FC"), ("B", "Beta FC")] {
            managers.teams.insert(
                key.into(),
                TeamManagers {
                    manager: format!("{key}-manager"),
                    history: Vec::new(),
                    absence_names: vec![feed.into()],
                },
            );
        }
        managers
    }

    fn dated(game: &str, date: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            game_id: game.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            round: None,
            home: home.into(),
            away: away.into(),
        }
    }

    #[test]
    fn absences_follow_match_date_and_season() {
        let raw = RawData {
            events: vec![
                event("1", "A", EventKind::Pass, 40.0),
                event("1", "B", EventKind::Pass, 60.0),
            ],
            fixtures: vec![dated("1", "2024-03-05", "A", "B")],
            absences: vec![
                absence("Alpha FC", "a1", "Knee", 4, "01/03/2024", "10/03/2024"),
                absence("Alpha FC", "a2", "Red card", 1, "06/03/2024", "12/03/2024"),
                absence("Alpha FC", "a3", "ACL", 12, "01/02/2024", ""),
                absence("Beta FC", "b1", "National team", 2, "04/03/2024", "06/03/2024"),
            ],
            ..RawData::default()
        };
        let ds = Dataset::initialize(raw);
        let managers = managers_with_feed_names();

        let dash = MatchDashboard::build(&ds, &managers, "1", "A").unwrap();
        let home: Vec<&str> = dash.home.absences.iter().map(|a| a.player.as_str()).collect();
        assert_eq!(home, ["a1", "a3"]);
        assert_eq!(dash.away.absences.len(), 1);
        assert_eq!(dash.away.absences[0].kind, AbsenceKind::InternationalDuty);

        let recent = RecentDashboard::build(&ds, &managers, "A", 5).unwrap();
        let season: Vec<&str> = recent.absences.iter().map(|a| a.player.as_str()).collect();
        assert_eq!(season, ["a3", "a1", "a2"]);
    }

    #[test]
    fn match_without_date_lists_no_absences() {
        let raw = RawData {
            events: vec![
                event("1", "A", EventKind::Pass, 40.0),
                event("1", "B", EventKind::Pass, 60.0),
            ],
            absences: vec![absence("Alpha FC", "a3", "ACL", 12, "01/02/2024", "")],
            ..RawData::default()
        };
        let ds = Dataset::initialize(raw);
        let dash = MatchDashboard::build(&ds, &managers_with_feed_names(), "1", "A").unwrap();
        assert!(dash.home.absences.is_empty());
    }

    #[test]
    fn form_trend_keeps_game_id_order_over_dates() {
        // Game 20 was played before game 10.
        let raw = RawData {
            events: vec![
                event("20", "A", EventKind::Goal, 95.0),
                event("10", "A", EventKind::Pass, 40.0),
            ],
            fixtures: vec![
                dated("10", "2024-05-01", "A", "B"),
                dated("20", "2024-03-01", "B", "A"),
            ],
            ..RawData::default()
        };
        let ds = Dataset::initialize(raw);
        let dash = RecentDashboard::build(&ds, &ManagerConfig::default(), "A", 5).unwrap();
        let order: Vec<&str> = dash.form.iter().map(|f| f.game_id.as_str()).collect();
        assert_eq!(order, ["10", "20"]);
        assert_eq!(dash.form[1].goals, 1);
        assert_eq!(dash.games, ["20", "10"]);
    }

    #[test]
    fn one_sided_game_has_no_match_view() {
        let ds = dataset();
        assert!(MatchDashboard::build(&ds, &ManagerConfig::default(), "2", "A").is_none());
        assert!(MatchDashboard::build(&ds, &ManagerConfig::default(), "404", "A").is_none());
    }

    #[test]
    fn recent_view_orders_games_newest_first() {
        let ds = dataset();
        let dash = RecentDashboard::build(&ds, &ManagerConfig::default(), "A", 5).unwrap();
        assert_eq!(dash.games, ["2", "1"]);
        assert_eq!(dash.form.len(), 2);
        assert_eq!(dash.averages.unwrap().games, 2);
        assert!(dash.best_eleven.is_none());
    }

    #[test]
    fn compose_follows_selection_mode() {
        let ds = dataset();
        let managers = ManagerConfig::default();
        let specific = View::compose(&ds, &managers, &selection(ViewMode::Specific, Some("1"))).unwrap();
        assert!(specific.match_context().is_some());
        let recent = View::compose(&ds, &managers, &selection(ViewMode::Recent, None)).unwrap();
        assert!(recent.match_context().is_none());
        assert!(View::compose(&ds, &managers, &selection(ViewMode::Specific, None)).is_none());

        let json = serde_json::to_value(&recent).unwrap();
        assert_eq!(json["mode"], "recent");
    }
}
