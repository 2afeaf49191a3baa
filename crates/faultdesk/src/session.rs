use crate::agent::Agent;
use crate::assembler::Renderer;
use crate::catalog::PartsCatalog;
use crate::errors::AgentResult;
use crate::models::message::Message;

/// State of the one interactive session: the parts catalog and the
/// conversation so far. Created empty at start-up and kept until exit.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    catalog: PartsCatalog,
    messages: Vec<Message>,
}

impl SessionContext {
    pub fn new(catalog: PartsCatalog) -> Self {
        Self {
            catalog,
            messages: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &PartsCatalog {
        &self.catalog
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Run one turn: record the user message, stream the reply and record it.
    ///
    /// A failed reply records no assistant message; the error is returned so
    /// the caller can show it and the user can resubmit.
    pub async fn run_turn<R: Renderer>(
        &mut self,
        agent: &Agent,
        user_text: impl Into<String>,
        renderer: R,
    ) -> AgentResult<Message> {
        self.push(Message::user(user_text));

        match agent.reply(&self.messages, renderer).await {
            Ok(response) => {
                let message = Message::assistant(response.answer);
                self.push(message.clone());
                Ok(message)
            }
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                Err(e)
            }
        }
    }
}
