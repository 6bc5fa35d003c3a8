// Manager-persona prompt templates.
//
// The system prompt fixes who the model plays (team, manager, date), the
// only match figures it may cite, and how that manager talks. The user
// prompt carries the recent transcript and the new question.

use chrono::NaiveDate;

use kleague_core::config::{Config, SpeechProfile};
use kleague_core::summary::{context_text, MatchContext};
use kleague_core::teams::{manager_on, speech_profile};

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Manager name used when the team is missing from the manager table.
pub const UNKNOWN_MANAGER: &str = "감독";

/// Everything the system prompt needs about the role being played.
#[derive(Debug, Clone)]
pub struct Persona {
    pub team: String,
    pub manager: String,
    pub date: Option<NaiveDate>,
    pub profile: SpeechProfile,
    /// Rendered match summary, or the "no specific match" text.
    pub match_context: String,
}

impl Persona {
    /// Resolve manager and speech profile for `team` on `date` from config.
    pub fn resolve(
        config: &Config,
        team: &str,
        date: Option<NaiveDate>,
        context: Option<&MatchContext>,
    ) -> Self {
        let managers = &config.managers;
        let manager = manager_on(managers, team, date).unwrap_or(UNKNOWN_MANAGER);
        let profile = speech_profile(managers, manager).cloned().unwrap_or_default();
        Persona {
            team: team.to_string(),
            manager: manager.to_string(),
            date,
            profile,
            match_context: context_text(context),
        }
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Manager,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::User => "사용자",
            Role::Manager => "감독",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage { role: Role::User, text: text.into() }
    }

    pub fn manager(text: impl Into<String>) -> Self {
        ChatMessage { role: Role::Manager, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn system_prompt(persona: &Persona) -> String {
    let when = persona
        .date
        .map_or_else(|| "현재".to_string(), |d| d.format("%Y년 %m월 %d일").to_string());
    let profile = &persona.profile;

    let mut out = String::new();
    out.push_str("[ROLE]\n");
    out.push_str(&format!(
        "당신은 {when} 기준 K리그1 '{}'의 감독 '{}'입니다.\n",
        persona.team, persona.manager
    ));
    out.push_str("기자 또는 팬의 질문에 감독 본인으로서 답하세요.\n\n");

    out.push_str("[MATCH DATA & CONTEXT]\n");
    out.push_str(persona.match_context.trim_end());
    out.push_str("\n\n");

    out.push_str("[SPEECH RULES]\n");
    out.push_str(&format!("- 말투 스타일: {}\n", profile.sentence_style));
    out.push_str(&format!("- 관점: {}\n", profile.perspective));
    if !profile.frequent_phrases.is_empty() {
        out.push_str(&format!("- 자주 쓰는 표현: {}\n", quoted(&profile.frequent_phrases)));
    }
    if !profile.avoid.is_empty() {
        out.push_str(&format!("- 금지 표현: {}\n", quoted(&profile.avoid)));
    }
    out.push('\n');

    out.push_str("[STRICT]\n");
    out.push_str("- 절대 AI라는 사실을 밝히지 마세요.\n");
    out.push_str("- 경기 수치는 위 [MATCH DATA & CONTEXT]에 있는 것만 인용하고, 없는 수치는 지어내지 마세요.\n");
    out.push_str("- 답변은 한국어로, 3~5문장 이내로 하세요.");
    out
}

/// Transcript window followed by the new question, ending on the manager's
/// turn so the model answers in character.
pub fn user_prompt(history: &[ChatMessage], question: &str) -> String {
    let mut out = String::new();
    if !history.is_empty() {
        out.push_str("[대화 기록]\n");
        for message in history {
            out.push_str(&format!("{}: {}\n", message.role.label(), message.text));
        }
        out.push('\n');
    }
    out.push_str("[현재 질문]\n");
    out.push_str(&format!("사용자: {question}\n감독:"));
    out
}

fn quoted(phrases: &[String]) -> String {
    phrases
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(date: Option<NaiveDate>) -> Persona {
        Persona {
            team: "울산 HD FC".into(),
            manager: "김판곤".into(),
            date,
            profile: SpeechProfile {
                sentence_style: "차분하고 단정한 어조".into(),
                perspective: "팀 전체".into(),
                frequent_phrases: vec!["원팀".into()],
                avoid: vec!["변명".into()],
            },
            match_context: "[경기 정보]\n- 상대팀: 포항 스틸러스\n".into(),
        }
    }

    #[test]
    fn system_prompt_sections() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 1);
        let prompt = system_prompt(&persona(date));
        for section in ["[ROLE]", "[MATCH DATA & CONTEXT]", "[SPEECH RULES]", "[STRICT]"] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("2024년 10월 01일 기준 K리그1 '울산 HD FC'의 감독 '김판곤'"));
        assert!(prompt.contains("- 상대팀: 포항 스틸러스"));
        assert!(prompt.contains("- 자주 쓰는 표현: \"원팀\""));
        assert!(prompt.contains("- 금지 표현: \"변명\""));
    }

    #[test]
    fn undated_persona_speaks_in_present() {
        let mut p = persona(None);
        p.profile.frequent_phrases.clear();
        let prompt = system_prompt(&p);
        assert!(prompt.contains("현재 기준"));
        assert!(!prompt.contains("자주 쓰는 표현"));
    }

    #[test]
    fn user_prompt_lists_history_then_question() {
        let history = vec![ChatMessage::user("오늘 경기 어땠나요?"), ChatMessage::manager("아쉬웠습니다.")];
        let prompt = user_prompt(&history, "다음 경기는요?");
        assert_eq!(
            prompt,
            "[대화 기록]\n사용자: 오늘 경기 어땠나요?\n감독: 아쉬웠습니다.\n\n[현재 질문]\n사용자: 다음 경기는요?\n감독:"
        );
        assert_eq!(user_prompt(&[], "안녕하세요"), "[현재 질문]\n사용자: 안녕하세요\n감독:");
    }
}
