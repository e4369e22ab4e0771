//! Client events
//!
//! Notifications published by the read and drain loops. Everything travels
//! over one unbounded channel as a tagged [`Event`], so publishing never
//! blocks the loop that produced it and subscribers see events in the order
//! they were produced.

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::RconError;

/// Receiving side handed to subscribers
pub type EventStream = Receiver<Event>;

/// A notification from the client
#[derive(Debug, Clone)]
pub enum Event {
    /// Result of the authentication request
    AuthenticationResult { success: bool },

    /// First line of a chat broadcast
    ChatMessage(String),

    /// Full output of one command
    CommandResponse(String),

    /// Something went wrong; fatal errors also stop the loop that hit them
    Error {
        message: String,
        cause: Option<Arc<RconError>>,
    },
}

/// Publishing side of the event channel
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<Event>,
}

impl EventSink {
    /// Create a sink and the stream it feeds
    pub fn channel() -> (Self, EventStream) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }

    pub fn authentication_result(&self, success: bool) {
        self.publish(Event::AuthenticationResult { success });
    }

    pub fn chat_message(&self, text: impl Into<String>) {
        self.publish(Event::ChatMessage(text.into()));
    }

    pub fn command_response(&self, text: impl Into<String>) {
        self.publish(Event::CommandResponse(text.into()));
    }

    pub fn error(&self, message: impl Into<String>, cause: Option<RconError>) {
        self.publish(Event::Error {
            message: message.into(),
            cause: cause.map(Arc::new),
        });
    }

    /// Publish an event; dropped silently once every subscriber is gone
    pub fn publish(&self, event: Event) {
        if let Err(err) = self.sender.send(event) {
            tracing::trace!("No subscribers, dropping event: {:?}", err.into_inner());
        }
    }
}
