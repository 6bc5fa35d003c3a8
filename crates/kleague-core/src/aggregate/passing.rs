// Pass sonar (direction histograms) and pass networks.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::event::PitchPoint;
use crate::formation::{infer_formation, Formation, SLOT_COUNT};
use crate::metrics::DerivedEvent;
use crate::roster::PositionTag;

// ---------------------------------------------------------------------------
// Sonar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SonarBin {
    /// Direction in degrees, a multiple of 45.
    pub angle: i32,
    pub count: usize,
    /// `count` relative to the player's busiest direction, in (0, 1].
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSonar {
    pub player: String,
    /// Ascending by angle; only directions with at least one pass.
    pub bins: Vec<SonarBin>,
}

/// Direction histogram of `player`'s passes in the batch.
pub fn pass_sonar<'a, I>(events: I, player: &str) -> PlayerSonar
where
    I: IntoIterator<Item = &'a DerivedEvent>,
{
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for e in events {
        if e.player() == player && e.kind().is_pass() {
            *counts.entry(e.pass_angle_bin).or_default() += 1;
        }
    }
    let max = counts.values().copied().max().unwrap_or(0);
    let bins = counts
        .into_iter()
        .map(|(angle, count)| SonarBin {
            angle,
            count,
            radius: count as f64 / max as f64,
        })
        .collect();
    PlayerSonar {
        player: player.to_string(),
        bins,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSonar {
    pub slot: PitchPoint,
    pub sonar: PlayerSonar,
}

/// Sonars for up to eleven players placed on formation slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SonarLayout {
    pub formation: Formation,
    /// False when no roster was available and the busiest passers were
    /// placed on the default layout.
    pub from_roster: bool,
    pub players: Vec<PlacedSonar>,
}

/// Team sonar layout for a single game. `None` when the batch spans more
/// than one game.
///
/// With a roster, starters are the team's passers not tagged Bench (players
/// missing from the roster count as Bench), ordered by line then name. With
/// an empty roster the eleven most frequent passers are used.
pub fn sonar_layout(
    events: &[DerivedEvent],
    team: &str,
    roster: &HashMap<String, PositionTag>,
) -> Option<SonarLayout> {
    if super::distinct_games(events).len() > 1 {
        return None;
    }
    let passes: Vec<&DerivedEvent> = events
        .iter()
        .filter(|e| e.team() == team && e.kind().is_pass())
        .collect();
    let passers = passer_counts(&passes);

    let (formation, from_roster, chosen) = if roster.is_empty() {
        let mut by_volume = passers;
        by_volume.sort_by(|a, b| b.1.cmp(&a.1));
        let chosen: Vec<&str> = by_volume.into_iter().map(|(p, _)| p).collect();
        (Formation::default(), false, chosen)
    } else {
        let formation = infer_formation(roster.values().copied());
        let mut starters: Vec<(&str, PositionTag)> = passers
            .iter()
            .filter_map(|(p, _)| match roster.get(*p) {
                Some(tag) if *tag != PositionTag::Bench => Some((*p, *tag)),
                _ => None,
            })
            .collect();
        starters.sort_by(|a, b| (a.1.line_order(), a.0).cmp(&(b.1.line_order(), b.0)));
        (formation, true, starters.into_iter().map(|(p, _)| p).collect())
    };

    let players = chosen
        .into_iter()
        .take(SLOT_COUNT)
        .zip(formation.slots().iter())
        .map(|(player, slot)| PlacedSonar {
            slot: *slot,
            sonar: pass_sonar(passes.iter().copied(), player),
        })
        .collect();

    Some(SonarLayout {
        formation,
        from_roster,
        players,
    })
}

/// Passers with pass counts, in first-seen order.
fn passer_counts<'a>(passes: &[&'a DerivedEvent]) -> Vec<(&'a str, usize)> {
    let mut order: Vec<(&'a str, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for e in passes {
        let player = e.player();
        match index.get(player) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(player, order.len());
                order.push((player, 1));
            }
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Pass network
// ---------------------------------------------------------------------------

/// Minimum repetitions for a passer→receiver link to be drawn.
pub const MIN_LINK_PASSES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub player: String,
    /// Mean pass origin.
    pub location: PitchPoint,
    pub passes: usize,
    pub bench: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkLink {
    pub from: String,
    pub to: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassNetwork {
    /// Sorted by player name.
    pub nodes: Vec<NetworkNode>,
    /// Sorted by (from, to).
    pub links: Vec<NetworkLink>,
}

/// Pass network of `team` for a single game. `None` when the batch spans
/// more than one game or the team made no passes.
///
/// The receiver of a pass is approximated by whoever made the team's next
/// pass in batch order.
pub fn pass_network(
    events: &[DerivedEvent],
    team: &str,
    roster: &HashMap<String, PositionTag>,
) -> Option<PassNetwork> {
    if super::distinct_games(events).len() > 1 {
        return None;
    }
    let passes: Vec<&DerivedEvent> = events
        .iter()
        .filter(|e| e.team() == team && e.kind().is_pass())
        .collect();
    if passes.is_empty() {
        return None;
    }

    let mut origins: BTreeMap<&str, (f64, f64, usize)> = BTreeMap::new();
    for e in &passes {
        let acc = origins.entry(e.player()).or_insert((0.0, 0.0, 0));
        acc.0 += e.start().x;
        acc.1 += e.start().y;
        acc.2 += 1;
    }

    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for w in passes.windows(2) {
        *pairs.entry((w[0].player(), w[1].player())).or_default() += 1;
    }

    let nodes = origins
        .into_iter()
        .map(|(player, (sx, sy, n))| NetworkNode {
            player: player.to_string(),
            location: PitchPoint::new(sx / n as f64, sy / n as f64),
            passes: n,
            bench: roster.get(player) == Some(&PositionTag::Bench),
        })
        .collect();
    let links = pairs
        .into_iter()
        .filter(|(_, count)| *count >= MIN_LINK_PASSES)
        .map(|((from, to), count)| NetworkLink {
            from: from.to_string(),
            to: to.to_string(),
            count,
        })
        .collect();

    Some(PassNetwork { nodes, links })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::testutil::Ev;

    fn pass(player: &str, dx: f64, dy: f64) -> DerivedEvent {
        Ev::pass("1", "A", player)
            .at(50.0, 34.0)
            .to(50.0 + dx, 34.0 + dy)
            .build()
    }

    #[test]
    fn sonar_radius_relative_to_busiest_direction() {
        let events = vec![
            pass("p", 10.0, 0.0),
            pass("p", 10.0, 0.0),
            pass("p", 0.0, 10.0),
            pass("q", -10.0, 0.0),
        ];
        let sonar = pass_sonar(&events, "p");
        assert_eq!(sonar.bins.len(), 2);
        assert_eq!(sonar.bins[0].angle, 0);
        assert_eq!(sonar.bins[0].radius, 1.0);
        assert_eq!(sonar.bins[1].angle, 90);
        assert_eq!(sonar.bins[1].radius, 0.5);
    }

    #[test]
    fn sonar_of_player_without_passes_is_empty() {
        assert!(pass_sonar(std::iter::empty(), "p").bins.is_empty());
    }

    #[test]
    fn sonar_layout_without_roster_uses_busiest_passers() {
        let mut events = Vec::new();
        for i in 0..13 {
            for _ in 0..=i {
                events.push(pass(&format!("P{i:02}"), 5.0, 0.0));
            }
        }
        let layout = sonar_layout(&events, "A", &HashMap::new()).unwrap();
        assert!(!layout.from_roster);
        assert_eq!(layout.formation, Formation::FourThreeThree);
        assert_eq!(layout.players.len(), 11);
        assert_eq!(layout.players[0].sonar.player, "P12");
        assert_eq!(layout.players[0].slot, PitchPoint::new(5.0, 34.0));
        assert!(layout.players.iter().all(|p| p.sonar.player != "P00"));
    }

    #[test]
    fn sonar_layout_with_roster_orders_starters_by_line() {
        let events = vec![pass("Zed", 5.0, 0.0), pass("Keeper", 5.0, 0.0), pass("Amy", 5.0, 0.0), pass("Sub", 5.0, 0.0), pass("Stranger", 5.0, 0.0)];
        let roster: HashMap<String, PositionTag> = [
            ("Zed", PositionTag::Defender),
            ("Amy", PositionTag::Forward),
            ("Keeper", PositionTag::Goalkeeper),
            ("Sub", PositionTag::Bench),
        ]
        .into_iter()
        .map(|(p, t)| (p.to_string(), t))
        .collect();
        let layout = sonar_layout(&events, "A", &roster).unwrap();
        assert!(layout.from_roster);
        let names: Vec<&str> = layout.players.iter().map(|p| p.sonar.player.as_str()).collect();
        assert_eq!(names, ["Keeper", "Zed", "Amy"]);
    }

    #[test]
    fn multi_game_batches_have_no_sonar_or_network() {
        let events = vec![pass("p", 5.0, 0.0), Ev::pass("2", "A", "p").build()];
        assert!(sonar_layout(&events, "A", &HashMap::new()).is_none());
        assert!(pass_network(&events, "A", &HashMap::new()).is_none());
    }

    #[test]
    fn network_links_need_three_repetitions() {
        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(Ev::pass("1", "A", "a").at(20.0, 20.0).build());
            events.push(Ev::pass("1", "B", "x").build());
            events.push(Ev::pass("1", "A", "b").at(40.0, 40.0).build());
        }
        let roster: HashMap<String, PositionTag> =
            [("b".to_string(), PositionTag::Bench)].into_iter().collect();
        let net = pass_network(&events, "A", &roster).unwrap();

        assert_eq!(net.nodes.len(), 2);
        assert_eq!(net.nodes[0].player, "a");
        assert_eq!(net.nodes[0].location, PitchPoint::new(20.0, 20.0));
        assert!(net.nodes[1].bench);
        // a→b three times, b→a twice.
        assert_eq!(net.links.len(), 1);
        assert_eq!((net.links[0].from.as_str(), net.links[0].to.as_str()), ("a", "b"));
        assert_eq!(net.links[0].count, 3);
    }

    #[test]
    fn network_without_passes_is_none() {
        assert!(pass_network(&[], "A", &HashMap::new()).is_none());
    }
}
