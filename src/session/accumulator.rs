//! Response reassembly
//!
//! Merges response fragments until the command-complete sentinel arrives,
//! then publishes the whole response as one event.

use std::sync::Arc;

use super::SessionState;
use crate::events::EventSink;
use crate::protocol::ClassifiedResponse;

/// Per-connection reassembly buffer
///
/// Owned by the read loop; nothing else mutates it.
pub struct ReassemblyAccumulator {
    /// Output of the in-flight command so far
    buffer: String,

    /// Holds the authorized flag, shared with the connection handle
    state: Arc<SessionState>,

    /// Where completed responses and notifications go
    events: EventSink,
}

impl ReassemblyAccumulator {
    pub fn new(state: Arc<SessionState>, events: EventSink) -> Self {
        Self {
            buffer: String::new(),
            state,
            events,
        }
    }

    /// Apply one classified frame
    pub fn feed(&mut self, response: ClassifiedResponse) {
        match response {
            ClassifiedResponse::AuthSuccess => {
                if self.state.mark_authorized() {
                    tracing::info!("Authenticated");
                }
                self.events.authentication_result(true);
            }
            ClassifiedResponse::Chat(lines) => {
                if let Some(first) = lines.into_iter().next() {
                    self.events.chat_message(first);
                }
            }
            ClassifiedResponse::ResponseFragment(lines) => {
                if lines.is_empty() {
                    return;
                }
                if !self.buffer.is_empty() {
                    self.buffer.push('\n');
                }
                self.buffer.push_str(&lines.join("\n"));
            }
            ClassifiedResponse::CommandCompleteSentinel(_) => {
                let response = std::mem::take(&mut self.buffer);
                self.events.command_response(response);
            }
            ClassifiedResponse::Empty => {}
            ClassifiedResponse::Unknown => {
                tracing::warn!("Unknown packet type received");
                self.events.error("unknown packet type", None);
            }
        }
    }

    /// Text accumulated for the in-flight command
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }
}
