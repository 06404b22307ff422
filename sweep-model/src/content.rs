use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::ids::ContentType;

/// Broad family a content type belongs to. Attachments (uploaded binaries)
/// follow their own publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentKind {
    #[default]
    Ordinary,
    Attachment,
}

impl ContentKind {
    /// The single status an item of this kind must have to be scanned.
    pub fn eligible_status(self) -> ItemStatus {
        match self {
            ContentKind::Ordinary => ItemStatus::Publish,
            ContentKind::Attachment => ItemStatus::Inherit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Ordinary => "ordinary",
            ContentKind::Attachment => "attachment",
        }
    }
}

impl FromStr for ContentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ordinary" => Ok(ContentKind::Ordinary),
            "attachment" => Ok(ContentKind::Attachment),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// Publication state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ItemStatus {
    Publish,
    Inherit,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Publish => "publish",
            ItemStatus::Inherit => "inherit",
            ItemStatus::Draft => "draft",
            ItemStatus::Pending => "pending",
            ItemStatus::Private => "private",
            ItemStatus::Future => "future",
            ItemStatus::Trash => "trash",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "publish" => ItemStatus::Publish,
            "inherit" => ItemStatus::Inherit,
            "draft" => ItemStatus::Draft,
            "pending" => ItemStatus::Pending,
            "private" => ItemStatus::Private,
            "future" => ItemStatus::Future,
            "trash" => ItemStatus::Trash,
            other => return Err(ModelError::UnknownStatus(other.to_string())),
        })
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content type registered with the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentTypeInfo {
    pub name: ContentType,
    /// Human readable singular label.
    pub label: String,
    pub kind: ContentKind,
    /// Public types are the default selection when callers name none.
    pub public: bool,
}

impl ContentTypeInfo {
    pub fn new(
        name: ContentType,
        label: impl Into<String>,
        kind: ContentKind,
        public: bool,
    ) -> Self {
        Self {
            name,
            label: label.into(),
            kind,
            public,
        }
    }

    pub fn eligible_status(&self) -> ItemStatus {
        self.kind.eligible_status()
    }
}
