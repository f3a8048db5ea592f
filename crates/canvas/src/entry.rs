//! The data model for wall entries as delivered by the backing store.
//!
//! Records are opaque to the canvas: it keys everything off the stable entry
//! id and never inspects the payload beyond that.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one wall entry, assigned by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        EntryId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        EntryId(id.to_string())
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        EntryId(id)
    }
}

/// Reference to a drawn signature image. Resolving it to a displayable URL
/// is the shell's concern; the canvas only carries it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

/// One visitor's contribution to a wall: display name, optional message,
/// stickers, and an optional drawn signature image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub id: EntryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stickers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

impl SignatureRecord {
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        SignatureRecord {
            id: id.into(),
            name: name.into(),
            message: None,
            stickers: Vec::new(),
            image: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_sticker(mut self, sticker: impl Into<String>) -> Self {
        self.stickers.push(sticker.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(ImageRef(image.into()));
        self
    }
}

/// The entry feed as seen from the canvas.
///
/// The external fetch may still be in flight (`Pending`), the wall may not
/// exist (`Missing`), or a concrete list may have arrived (`Ready`). The
/// first two render an empty canvas; neither is an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntrySource {
    #[default]
    Pending,
    Missing,
    Ready(Vec<SignatureRecord>),
}

impl EntrySource {
    pub fn is_ready(&self) -> bool {
        matches!(self, EntrySource::Ready(_))
    }

    /// The records to lay out. Empty until the feed is ready.
    pub fn records(&self) -> &[SignatureRecord] {
        match self {
            EntrySource::Ready(records) => records,
            _ => &[],
        }
    }
}

impl From<Option<Vec<SignatureRecord>>> for EntrySource {
    fn from(value: Option<Vec<SignatureRecord>>) -> Self {
        match value {
            Some(records) => EntrySource::Ready(records),
            None => EntrySource::Missing,
        }
    }
}
