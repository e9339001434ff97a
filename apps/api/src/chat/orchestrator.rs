//! Conversation orchestrator — one chat turn. Rebuilds the transcript
//! from the stored history on every call; nothing persists here.
//!
//! External-model failures are absorbed into the reply text. A chat turn
//! never hard-fails because of the model boundary.

use tracing::warn;

use crate::chat::personas::{system_prompt, Persona};
use crate::llm_client::{CompletionModel, TranscriptMessage};
use crate::models::enums::Sender;

/// Returned when no model client is configured. A defined degraded mode,
/// not an error.
pub const UNAVAILABLE_REPLY: &str =
    "The AI service is not configured. Please contact the administrator.";

/// First word of the apology produced when the external call fails.
const FAILURE_PREFIX: &str = "Sorry, something went wrong while generating a reply";

/// Fixed acknowledgment that follows the system instruction in the
/// synthetic leading exchange.
const ACKNOWLEDGMENT: &str = "Understood. I will help you in that role.";

/// A prior turn as stored: who said it and what was said.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub sender: Sender,
    pub content: String,
}

/// Drives one chat turn. `kid_context` is the pre-assembled grounding
/// blob (see `chat::context`); `None` skips the context section.
pub async fn respond<M: CompletionModel>(
    model: Option<&M>,
    content: &str,
    persona: Persona,
    history: &[HistoryEntry],
    kid_context: Option<&str>,
) -> String {
    let Some(model) = model else {
        return UNAVAILABLE_REPLY.to_string();
    };

    let system = system_prompt(persona, kid_context);
    let transcript = build_transcript(&system, history, content);

    match model.complete(&transcript).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("chat completion failed: {e}");
            format!("{FAILURE_PREFIX}: {e}")
        }
    }
}

/// System instruction as a synthetic leading exchange, then the stored
/// history in the external role vocabulary, then the new user message.
fn build_transcript(
    system: &str,
    history: &[HistoryEntry],
    content: &str,
) -> Vec<TranscriptMessage> {
    let mut transcript = Vec::with_capacity(history.len() + 3);
    transcript.push(TranscriptMessage::user(system));
    transcript.push(TranscriptMessage::model(ACKNOWLEDGMENT));

    for entry in history {
        transcript.push(match entry.sender {
            Sender::User => TranscriptMessage::user(entry.content.clone()),
            Sender::Assistant => TranscriptMessage::model(entry.content.clone()),
        });
    }

    transcript.push(TranscriptMessage::user(content));
    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, Role};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockModel {
        reply: Result<String, ()>,
        calls: AtomicUsize,
    }

    impl MockModel {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionModel for MockModel {
        async fn complete(&self, _: &[TranscriptMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(r) => Ok(r.clone()),
                Err(()) => Err(LlmError::Api {
                    status: 503,
                    message: "backend melted".to_string(),
                }),
            }
        }
    }

    fn history() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry {
                sender: Sender::User,
                content: "How much should she sleep?".to_string(),
            },
            HistoryEntry {
                sender: Sender::Assistant,
                content: "Around 12 hours at that age.".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_unconfigured_model_never_calls_boundary() {
        let reply = respond::<MockModel>(None, "hi", Persona::Mom, &[], None).await;
        assert_eq!(reply, UNAVAILABLE_REPLY);
    }

    #[tokio::test]
    async fn test_successful_turn_returns_model_text() {
        let model = MockModel::ok("Feed her every three hours.");
        let reply = respond(Some(&model), "hi", Persona::Doctor, &history(), None).await;
        assert_eq!(reply, "Feed her every three hours.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_becomes_apology_with_detail() {
        let model = MockModel::failing();
        let reply = respond(Some(&model), "hi", Persona::Mom, &[], None).await;
        assert!(reply.starts_with("Sorry, something went wrong"));
        assert!(reply.contains("backend melted"));
    }

    #[test]
    fn test_transcript_shape_and_role_mapping() {
        let transcript = build_transcript("SYSTEM", &history(), "and naps?");
        assert_eq!(transcript.len(), 5);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text, "SYSTEM");
        assert_eq!(transcript[1].role, Role::Model);
        assert_eq!(transcript[1].text, ACKNOWLEDGMENT);
        assert_eq!(transcript[2].role, Role::User);
        assert_eq!(transcript[3].role, Role::Model);
        assert_eq!(transcript[4].role, Role::User);
        assert_eq!(transcript[4].text, "and naps?");
    }
}
