//! Conversation state for a single chat session.
//!
//! The [`Conversation`] is an append-only log: messages are created by
//! appending, never mutated afterwards, and destroyed only by [`clear`].
//! Insertion order is display order is chronological order.
//!
//! A [`Session`] owns exactly one conversation for the lifetime of one
//! running interaction. Nothing here persists across restarts, and there is
//! only ever one writer, so no locking is involved.
//!
//! [`clear`]: Conversation::clear

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

// ── Role ─────────────────────────────────────────────────────────────────────

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

// ── Attachment ───────────────────────────────────────────────────────────────

/// An image attached to a user message: decoded file bytes plus their MIME
/// type. The adapter boundary never sees a file path.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Original file name, kept for display only.
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    /// Load an image file. Accepted extensions: jpg, jpeg, png.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => {
                return Err(AppError::Attachment(format!(
                    "unsupported image type '{ext}' (expected jpg, jpeg or png)"
                )));
            }
        };
        let data = fs::read(path)
            .map_err(|e| AppError::Attachment(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(Self { name, mime_type: mime_type.to_string(), data })
    }
}

// ── Message ──────────────────────────────────────────────────────────────────

/// One conversation entry. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Present only on user messages that carried an image.
    pub image: Option<Attachment>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>, image: Option<Attachment>) -> Self {
        Self { role: Role::User, text: text.into(), image, timestamp: Utc::now() }
    }

    /// Model replies never carry an image.
    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into(), image: None, timestamp: Utc::now() }
    }
}

// ── Conversation ─────────────────────────────────────────────────────────────

/// Append-only message log with a clear operation. No validation, no
/// deduplication, no read filtering: the full sequence is always rendered.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// One running interaction. Explicitly scoped and passed around by the
/// caller rather than living in a process-wide global, so a second session
/// could coexist without sharing state.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    pub conversation: Conversation,
}

impl Session {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), conversation: Conversation::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
