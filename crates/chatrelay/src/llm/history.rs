//! Conversation history normalization.
//!
//! Gemini rejects conversations that open with a non-user turn or that carry
//! blank turns. [`normalize`] reshapes a client-supplied history so it always
//! satisfies both constraints.

use serde::{Deserialize, Serialize};

use super::types::{Turn, TurnRole};

/// Role of a turn in the shape Gemini expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedRole {
    User,
    Model,
}

/// A turn that has passed normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTurn {
    pub role: NormalizedRole,
    pub content: String,
}

impl From<NormalizedTurn> for Turn {
    fn from(turn: NormalizedTurn) -> Self {
        let role = match turn.role {
            NormalizedRole::User => TurnRole::User,
            NormalizedRole::Model => TurnRole::Assistant,
        };
        Turn::new(role, turn.content)
    }
}

/// Normalize a raw history.
///
/// Non-user turns become `model`, whitespace-only turns are dropped, and
/// leading `model` turns are removed. The output is empty or starts with a
/// `user` turn.
pub fn normalize(history: &[Turn]) -> Vec<NormalizedTurn> {
    history
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(|turn| NormalizedTurn {
            role: match turn.role {
                TurnRole::User => NormalizedRole::User,
                TurnRole::Assistant => NormalizedRole::Model,
            },
            content: turn.content.clone(),
        })
        .skip_while(|turn| turn.role != NormalizedRole::User)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(content: &str) -> NormalizedTurn {
        NormalizedTurn {
            role: NormalizedRole::User,
            content: content.to_string(),
        }
    }

    fn model(content: &str) -> NormalizedTurn {
        NormalizedTurn {
            role: NormalizedRole::Model,
            content: content.to_string(),
        }
    }

    fn renormalize(turns: Vec<NormalizedTurn>) -> Vec<NormalizedTurn> {
        let as_turns: Vec<Turn> = turns.into_iter().map(Turn::from).collect();
        normalize(&as_turns)
    }

    fn sample_histories() -> Vec<Vec<Turn>> {
        vec![
            vec![],
            vec![Turn::assistant("hi")],
            vec![Turn::user("   ")],
            vec![Turn::assistant("hi"), Turn::user("hello"), Turn::user("")],
            vec![
                Turn::user("\n"),
                Turn::assistant("ignored"),
                Turn::user("q1"),
                Turn::assistant("a1"),
                Turn::assistant("  "),
                Turn::user("q2"),
            ],
            vec![
                Turn::user("q1"),
                Turn::assistant("a1"),
                Turn::user("q2"),
                Turn::assistant("a2"),
            ],
        ]
    }

    #[test]
    fn drops_leading_assistant_and_blank_turns() {
        let history = vec![Turn::assistant("hi"), Turn::user("hello"), Turn::user("")];
        assert_eq!(normalize(&history), vec![user("hello")]);
    }

    #[test]
    fn empty_history_stays_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn only_non_user_or_blank_turns_yields_empty() {
        let history = vec![
            Turn::assistant("a"),
            Turn::user(" \t "),
            Turn::assistant("b"),
        ];
        assert!(normalize(&history).is_empty());
    }

    #[test]
    fn content_is_copied_verbatim() {
        let history = vec![Turn::user("  padded  text \n"), Turn::assistant("a  b")];
        assert_eq!(
            normalize(&history),
            vec![user("  padded  text \n"), model("a  b")]
        );
    }

    #[test]
    fn blank_user_turn_before_assistant_still_drops_assistant() {
        // The blank user turn is filtered first, so the assistant turn leads
        let history = vec![Turn::user(" "), Turn::assistant("a"), Turn::user("q")];
        assert_eq!(normalize(&history), vec![user("q")]);
    }

    #[test]
    fn keeps_interior_model_turns() {
        let history = vec![
            Turn::user("q1"),
            Turn::assistant("a1"),
            Turn::assistant("a1b"),
            Turn::user("q2"),
        ];
        assert_eq!(
            normalize(&history),
            vec![user("q1"), model("a1"), model("a1b"), user("q2")]
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for history in sample_histories() {
            let once = normalize(&history);
            let twice = renormalize(once.clone());
            assert_eq!(once, twice, "history: {history:?}");
        }
    }

    #[test]
    fn output_starts_with_user_and_has_no_blank_turns() {
        for history in sample_histories() {
            let out = normalize(&history);
            if let Some(first) = out.first() {
                assert_eq!(first.role, NormalizedRole::User);
            }
            assert!(out.iter().all(|t| !t.content.trim().is_empty()));
        }
    }

    #[test]
    fn role_mapping_follows_source_role() {
        let history = vec![
            Turn::user("q"),
            Turn::assistant("a"),
            Turn::new(TurnRole::from("system".to_string()), "s"),
        ];
        let roles: Vec<NormalizedRole> = normalize(&history).iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                NormalizedRole::User,
                NormalizedRole::Model,
                NormalizedRole::Model
            ]
        );
    }

    #[test]
    fn normalized_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&NormalizedRole::Model).unwrap(),
            "\"model\""
        );
        assert_eq!(
            serde_json::to_string(&NormalizedRole::User).unwrap(),
            "\"user\""
        );
    }
}
