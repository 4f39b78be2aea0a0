use serde::{Deserialize, Serialize};

/// The author of a chat fragment.
///
/// Only the assistant produces fragments, user input is rendered by the
/// chat surface itself.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The agent.
    #[default]
    Assistant,
}

/// Progress of a tool call fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// The tool call has been requested, its results are not known yet.
    Pending,
    /// Nothing more will be attached to the fragment.
    Done,
}

/// Display hints attached to a fragment.
///
/// Fragments carrying `parent_id` are rendered nested under the fragment
/// whose `id` matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Title shown above the content.
    pub title: String,
    /// Identifier other fragments nest under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier of the enclosing fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Progress of the operation this fragment describes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

impl MessageMetadata {
    /// Creates metadata with a title only.
    #[inline]
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            id: None,
            parent_id: None,
            status: None,
        }
    }

    /// Sets the identifier.
    #[inline]
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the parent identifier.
    #[inline]
    pub fn with_parent_id<S: Into<String>>(mut self, parent_id: S) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the status.
    #[inline]
    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// One unit of chat transcript content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the fragment.
    pub role: Role,
    /// Markdown content.
    pub content: String,
    /// Optional display hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    /// Creates an assistant fragment without metadata.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            metadata: None,
        }
    }

    /// Attaches metadata.
    #[inline]
    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the metadata title, if any.
    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.title.as_str())
    }

    /// Returns the identifier, if any.
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.metadata.as_ref()?.id.as_deref()
    }

    /// Returns the parent identifier, if any.
    #[inline]
    pub fn parent_id(&self) -> Option<&str> {
        self.metadata.as_ref()?.parent_id.as_deref()
    }

    /// Returns the status, if any.
    #[inline]
    pub fn status(&self) -> Option<MessageStatus> {
        self.metadata.as_ref()?.status
    }

    /// Returns `true` if this fragment re-emits the pending `earlier`
    /// fragment with nothing changed but the status, which is now done.
    pub fn is_status_patch_of(&self, earlier: &ChatMessage) -> bool {
        let (Some(this), Some(that)) = (&self.metadata, &earlier.metadata)
        else {
            return false;
        };
        this.id.is_some()
            && this.id == that.id
            && this.status == Some(MessageStatus::Done)
            && that.status == Some(MessageStatus::Pending)
            && this.title == that.title
            && this.parent_id == that.parent_id
            && self.content == earlier.content
    }
}
