// Plain-text match summary handed to the language model.

use serde::Serialize;
use std::fmt;

use crate::aggregate::{distinct_teams, MatchResult, MatchTotals};
use crate::metrics::DerivedEvent;

/// Context used when no single match is selected.
pub const NO_MATCH_CONTEXT: &str =
    "현재 특정 경기에 대한 데이터가 없습니다. 팀의 전반적인 철학에 대해 이야기하세요.";

/// Opponent name used when only one side appears in the data.
const UNKNOWN_OPPONENT: &str = "상대팀";

/// The figures the model may cite for one game, from `team`'s perspective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchContext {
    pub team: String,
    pub opponent: String,
    pub goals_for: usize,
    pub goals_against: usize,
    pub result: MatchResult,
    pub xg: f64,
    pub shots: usize,
}

impl MatchContext {
    /// Summarize one game's events. `None` when the batch is empty.
    pub fn from_game(events: &[DerivedEvent], team: &str) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        let opponent = distinct_teams(events)
            .into_iter()
            .find(|t| *t != team)
            .unwrap_or(UNKNOWN_OPPONENT)
            .to_string();
        let mine = MatchTotals::for_team(events, team);
        let theirs = MatchTotals::for_team(events, &opponent);
        Some(MatchContext {
            team: team.to_string(),
            result: MatchResult::from_score(mine.goals, theirs.goals),
            goals_for: mine.goals,
            goals_against: theirs.goals,
            xg: mine.xg,
            shots: mine.shots,
            opponent,
        })
    }
}

impl fmt::Display for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[경기 정보]")?;
        writeln!(f, "- 상대팀: {}", self.opponent)?;
        writeln!(
            f,
            "- 결과: {} : {} ({})",
            self.goals_for,
            self.goals_against,
            self.result.label_ko()
        )?;
        writeln!(
            f,
            "- 우리팀 기록: 득점 {}, 기대득점(xG) {:.2}, 슈팅수 {}개",
            self.goals_for, self.xg, self.shots
        )?;
        writeln!(f)?;
        writeln!(f, "[상황 설명]")?;
        writeln!(f, "이 데이터를 바탕으로 경기를 복기하거나 분석하는 투로 말하세요.")?;
        writeln!(
            f,
            "이겼다면 선수들을 칭찬하거나 겸손해하고, 졌다면 원인을 분석하거나 다음을 기약하세요."
        )?;
        write!(
            f,
            "xG(기대득점)가 높았는데 졌다면 \"운이 없었다\"거나 \"결정력이 부족했다\"고 말하세요."
        )
    }
}

/// Text for the prompt's match section.
pub fn context_text(context: Option<&MatchContext>) -> String {
    match context {
        Some(c) => c.to_string(),
        None => NO_MATCH_CONTEXT.to_string(),
    }
}
