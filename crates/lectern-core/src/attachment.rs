//! The armed image attachment and the chat request that consumes it.

use crate::snapshot::RegionSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language that needs no explicit response instruction.
pub const DEFAULT_RESPONSE_LANGUAGE: &str = "English";

/// Holds at most one snapshot waiting to be sent with the next chat message.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSlot {
    armed: Option<RegionSnapshot>,
}

impl AttachmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a snapshot, replacing any previously armed one.
    pub fn arm(&mut self, snapshot: RegionSnapshot) {
        log::debug!("Armed region {} for the next message", snapshot.id);
        self.armed = Some(snapshot);
    }

    /// Drop the armed snapshot without sending it.
    pub fn disarm(&mut self) -> Option<RegionSnapshot> {
        self.armed.take()
    }

    /// Consume the armed snapshot. A second call returns `None`.
    pub fn take(&mut self) -> Option<RegionSnapshot> {
        self.armed.take()
    }

    pub fn armed(&self) -> Option<&RegionSnapshot> {
        self.armed.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Chat request errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatRequestError {
    #[error("Message is empty")]
    EmptyMessage,
}

/// Body of a chat call to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub response_language: String,
    /// Attached region as a data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChatRequest {
    /// Build the request for a user message, consuming the armed attachment.
    ///
    /// An empty message leaves the slot untouched.
    pub fn compose(
        message: &str,
        response_language: &str,
        slot: &mut AttachmentSlot,
    ) -> Result<Self, ChatRequestError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatRequestError::EmptyMessage);
        }

        let attachment = slot.take();
        let mut text = match &attachment {
            Some(_) => format!(
                "Question about selected area from PDF:\n\nUser question: {}",
                message
            ),
            None => message.to_string(),
        };
        if response_language != DEFAULT_RESPONSE_LANGUAGE {
            text.push_str(&format!("\n\n[Please respond in {}]", response_language));
        }

        Ok(Self {
            message: text,
            response_language: response_language.to_string(),
            image: attachment.map(|s| s.image.to_data_url()),
        })
    }
}

/// Backend answer to a chat call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub documents_used: usize,
}

impl ChatResponse {
    pub fn is_multi_document(&self) -> bool {
        self.mode == "multi-doc"
    }
}
