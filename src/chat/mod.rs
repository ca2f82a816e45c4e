//! Turn controller: the glue between the interactive surface, the
//! conversation store, and the LLM provider.
//!
//! One send action is one atomic turn: validate, append the user message,
//! await the provider, append the model message. There are no intermediate
//! pending or streaming states, and the controller blocks on the call, so
//! a turn either happens completely or (on rejected input) not at all.
//!
//! Provider failures never escape: they are rendered as an `"Error: ..."`
//! reply and appended like any other model message. The conversation log
//! has no separate error channel.

use tracing::{debug, warn};

use crate::llm::LlmProvider;
use crate::session::{Attachment, Message, Session};

/// Substituted when an image is sent without any text.
pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image";

/// What a send action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input: nothing appended, no call made. The user may retry
    /// immediately.
    Rejected,
    /// User and model messages appended; the caller should re-render.
    Completed,
}

pub struct TurnController {
    provider: LlmProvider,
}

impl TurnController {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Run one turn against `session`.
    ///
    /// The reject check runs BEFORE default-prompt substitution: with no
    /// image, empty text rejects and the default never triggers. Reversing
    /// the order would silently change behavior.
    pub async fn send(
        &self,
        session: &mut Session,
        text: &str,
        image: Option<Attachment>,
    ) -> TurnOutcome {
        if text.is_empty() && image.is_none() {
            warn!("rejected turn: no text and no image");
            return TurnOutcome::Rejected;
        }

        let prompt = if text.is_empty() { DEFAULT_IMAGE_PROMPT.to_string() } else { text.to_string() };

        session.conversation.append(Message::user(prompt.clone(), image.clone()));

        // Success and failure both become plain reply text here; the log
        // has no separate error channel.
        let reply = match self.provider.generate(&prompt, image.as_ref()).await {
            Ok(response) => response.text,
            Err(e) => format!("Error: {e}"),
        };

        session.conversation.append(Message::model(reply));

        debug!(
            session_id = %session.id(),
            messages = session.conversation.len(),
            "turn completed"
        );
        TurnOutcome::Completed
    }

    /// Clear the conversation. The caller re-renders.
    pub fn clear(&self, session: &mut Session) {
        session.conversation.clear();
        debug!(session_id = %session.id(), "conversation cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::session::Role;

    fn echo_controller() -> TurnController {
        TurnController::new(LlmProvider::Dummy(DummyProvider::new()))
    }

    fn png() -> Attachment {
        Attachment {
            name: "photo.png".into(),
            mime_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn empty_input_rejected_without_mutation() {
        let controller = echo_controller();
        let mut session = Session::new();

        let outcome = controller.send(&mut session, "", None).await;

        assert_eq!(outcome, TurnOutcome::Rejected);
        assert!(session.conversation.is_empty());
    }

    #[tokio::test]
    async fn image_only_turn_uses_default_prompt() {
        let controller = echo_controller();
        let mut session = Session::new();

        let outcome = controller.send(&mut session, "", Some(png())).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        let messages = session.conversation.messages();
        assert_eq!(messages[0].text, DEFAULT_IMAGE_PROMPT);
        assert!(messages[0].image.is_some());
    }

    #[tokio::test]
    async fn provider_failure_becomes_error_reply() {
        let controller = TurnController::new(LlmProvider::Dummy(DummyProvider::failing("boom")));
        let mut session = Session::new();

        let outcome = controller.send(&mut session, "hello", None).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        let messages = session.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Model);
        assert!(messages[1].text.starts_with("Error: "));
    }

    #[tokio::test]
    async fn turn_appends_user_then_model() {
        let controller = echo_controller();
        let mut session = Session::new();

        controller.send(&mut session, "hi there", None).await;

        let messages = session.conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "hi there");
        assert_eq!(messages[1].role, Role::Model);
        assert_eq!(messages[1].text, "[echo] hi there");
        assert!(messages[1].image.is_none());
    }

    #[tokio::test]
    async fn clear_resets_conversation() {
        let controller = echo_controller();
        let mut session = Session::new();
        controller.send(&mut session, "hi", None).await;

        controller.clear(&mut session);

        assert!(session.conversation.is_empty());
    }
}
