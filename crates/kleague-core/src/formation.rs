// Formation catalog, inference from position tallies, and slot assignment.

use serde::Serialize;
use std::fmt;

use crate::event::PitchPoint;
use crate::roster::PositionTag;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Number of on-pitch slots in every catalog formation.
pub const SLOT_COUNT: usize = 11;

type Slots = [PitchPoint; SLOT_COUNT];

const fn p(x: f64, y: f64) -> PitchPoint {
    PitchPoint::new(x, y)
}

const FOUR_THREE_THREE: Slots = [
    p(5.0, 34.0),
    p(25.0, 10.0),
    p(25.0, 26.0),
    p(25.0, 42.0),
    p(25.0, 58.0),
    p(50.0, 15.0),
    p(50.0, 34.0),
    p(50.0, 53.0),
    p(75.0, 15.0),
    p(75.0, 34.0),
    p(75.0, 53.0),
];

const FOUR_FOUR_TWO: Slots = [
    p(5.0, 34.0),
    p(25.0, 10.0),
    p(25.0, 26.0),
    p(25.0, 42.0),
    p(25.0, 58.0),
    p(50.0, 10.0),
    p(50.0, 26.0),
    p(50.0, 42.0),
    p(50.0, 58.0),
    p(75.0, 26.0),
    p(75.0, 42.0),
];

const FOUR_TWO_THREE_ONE: Slots = [
    p(5.0, 34.0),
    p(25.0, 10.0),
    p(25.0, 26.0),
    p(25.0, 42.0),
    p(25.0, 58.0),
    p(45.0, 26.0),
    p(45.0, 42.0),
    p(70.0, 10.0),
    p(70.0, 34.0),
    p(70.0, 58.0),
    p(90.0, 34.0),
];

const THREE_FOUR_THREE: Slots = [
    p(5.0, 34.0),
    p(25.0, 17.0),
    p(25.0, 34.0),
    p(25.0, 51.0),
    p(50.0, 10.0),
    p(50.0, 26.0),
    p(50.0, 42.0),
    p(50.0, 58.0),
    p(75.0, 15.0),
    p(75.0, 34.0),
    p(75.0, 53.0),
];

const THREE_FIVE_TWO: Slots = [
    p(5.0, 34.0),
    p(25.0, 17.0),
    p(25.0, 34.0),
    p(25.0, 51.0),
    p(50.0, 10.0),
    p(50.0, 22.0),
    p(50.0, 34.0),
    p(50.0, 46.0),
    p(50.0, 58.0),
    p(75.0, 26.0),
    p(75.0, 42.0),
];

/// A named tactical shape with fixed nominal slot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Formation {
    #[default]
    #[serde(rename = "4-3-3")]
    FourThreeThree,
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    #[serde(rename = "4-2-3-1")]
    FourTwoThreeOne,
    #[serde(rename = "3-4-3")]
    ThreeFourThree,
    #[serde(rename = "3-5-2")]
    ThreeFiveTwo,
}

impl Formation {
    pub const ALL: [Formation; 5] = [
        Formation::FourThreeThree,
        Formation::FourFourTwo,
        Formation::FourTwoThreeOne,
        Formation::ThreeFourThree,
        Formation::ThreeFiveTwo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Formation::FourThreeThree => "4-3-3",
            Formation::FourFourTwo => "4-4-2",
            Formation::FourTwoThreeOne => "4-2-3-1",
            Formation::ThreeFourThree => "3-4-3",
            Formation::ThreeFiveTwo => "3-5-2",
        }
    }

    pub fn from_label(label: &str) -> Option<Formation> {
        Formation::ALL.into_iter().find(|f| f.label() == label)
    }

    /// Slot coordinates in landscape orientation, goalkeeper first.
    pub fn slots(self) -> &'static [PitchPoint; SLOT_COUNT] {
        match self {
            Formation::FourThreeThree => &FOUR_THREE_THREE,
            Formation::FourFourTwo => &FOUR_FOUR_TWO,
            Formation::FourTwoThreeOne => &FOUR_TWO_THREE_ONE,
            Formation::ThreeFourThree => &THREE_FOUR_THREE,
            Formation::ThreeFiveTwo => &THREE_FIVE_TWO,
        }
    }

    /// Ordered decision table over the outfield tally.
    pub fn classify(tally: PositionTally) -> Formation {
        match (tally.defenders, tally.midfielders, tally.forwards) {
            (3, 5, _) => Formation::ThreeFiveTwo,
            (3, mf, _) if mf >= 4 => Formation::ThreeFourThree,
            (4, 5, 1) => Formation::FourTwoThreeOne,
            (4, 4, _) => Formation::FourFourTwo,
            _ => Formation::FourThreeThree,
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Counts of position tags among the players considered. Bench tags are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionTally {
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl PositionTally {
    pub fn from_tags<I: IntoIterator<Item = PositionTag>>(tags: I) -> Self {
        let mut tally = PositionTally::default();
        for tag in tags {
            match tag {
                PositionTag::Goalkeeper => tally.goalkeepers += 1,
                PositionTag::Defender => tally.defenders += 1,
                PositionTag::Midfielder => tally.midfielders += 1,
                PositionTag::Forward => tally.forwards += 1,
                PositionTag::Bench => {}
            }
        }
        tally
    }
}

/// Infer a formation from the tags of the involved players. An empty input
/// yields the default 4-3-3.
pub fn infer_formation<I: IntoIterator<Item = PositionTag>>(tags: I) -> Formation {
    Formation::classify(PositionTally::from_tags(tags))
}

// ---------------------------------------------------------------------------
// Slot assignment
// ---------------------------------------------------------------------------

/// One player placed on a formation slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotAssignment {
    pub player: String,
    pub position: PositionTag,
    /// Landscape coordinates (attacking towards x = 105).
    pub slot: PitchPoint,
}

impl SlotAssignment {
    /// Coordinates on the portrait pitch (attacking towards y = 105).
    pub fn portrait(&self) -> PitchPoint {
        self.slot.transposed()
    }
}

/// Place players on `formation`'s slots: goalkeeper first, then defenders,
/// midfielders and forwards, each group in the order given. Bench players
/// are skipped, players beyond the eleventh are dropped, and missing
/// players leave trailing slots empty.
pub fn assign_slots(formation: Formation, players: &[(String, PositionTag)]) -> Vec<SlotAssignment> {
    let mut ordered: Vec<&(String, PositionTag)> = players
        .iter()
        .filter(|(_, tag)| *tag != PositionTag::Bench)
        .collect();
    // Stable sort keeps caller order inside each line.
    ordered.sort_by_key(|(_, tag)| tag.line_order());

    ordered
        .into_iter()
        .zip(formation.slots().iter())
        .map(|((player, position), slot)| SlotAssignment {
            player: player.clone(),
            position: *position,
            slot: *slot,
        })
        .collect()
}

/// A formation with its players placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lineup {
    pub formation: Formation,
    pub players: Vec<SlotAssignment>,
}

impl Lineup {
    /// Infer the formation from `players` and place them on its slots.
    pub fn build(players: &[(String, PositionTag)]) -> Self {
        let formation = infer_formation(players.iter().map(|(_, tag)| *tag));
        Lineup {
            formation,
            players: assign_slots(formation, players),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
