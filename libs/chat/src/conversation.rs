use crewdesk_core::{AiMessage, ChatMessage, InboundFrame};

/// Ordered conversation state as the host UI sees it.
///
/// Messages are appended strictly in the order sends and receives happen;
/// nothing reorders or deduplicates after the fact. The typing flag is true
/// from a `typing` frame (or an optimistic local send) until the next
/// assistant message or a connection reset.
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
    typing: bool,
    conversation_id: Option<i64>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    /// Applies one decoded inbound frame.
    pub fn apply(&mut self, frame: InboundFrame) {
        match frame {
            InboundFrame::Typing => self.typing = true,
            InboundFrame::Message {
                id,
                content,
                actions,
            } => {
                self.typing = false;
                self.messages.push(ChatMessage::assistant(id, content, actions));
            }
            InboundFrame::ConversationId(id) => self.conversation_id = Some(id),
            InboundFrame::Raw { content } => {
                self.typing = false;
                self.messages.push(ChatMessage::assistant(None, content, None));
            }
        }
    }

    /// Appends an outgoing user message and optimistically expects a reply.
    pub fn push_user(&mut self, content: &str) {
        self.messages.push(ChatMessage::user(content));
        self.typing = true;
    }

    /// A dropped connection always clears the typing flag.
    pub fn connection_reset(&mut self) {
        self.typing = false;
    }

    /// Replaces the list with hydrated history rows.
    pub fn load_history(&mut self, history: Vec<AiMessage>) {
        self.messages = history.into_iter().map(ChatMessage::from).collect();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
        self.typing = false;
    }
}
