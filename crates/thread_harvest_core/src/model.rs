use serde::{Deserialize, Serialize, Serializer};

/// Timestamp layout used for every persisted time field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single reply captured from the thread.
///
/// `None` in a secondary field is the explicit "unknown" marker; the extractor
/// never fails a unit because one of them is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
    pub comment_time: Option<String>,
    pub scrape_time: String,
}

/// The root post of the thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
    pub post_time: Option<String>,
    pub scrape_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub last_scroll_position: u64,
    pub last_save_time: String,
    pub raw_comment_count: usize,
}

/// Aggregate root of one harvest run.
///
/// `total_comments` is not stored: it is computed from `comments` every time
/// the conversation is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ConversationRecord")]
pub struct Conversation {
    pub channel_name: String,
    pub conversation_id: String,
    pub url: String,
    pub post: Option<Post>,
    pub comments: Vec<Comment>,
    pub scrape_start_time: String,
    pub metadata: CheckpointMetadata,
}

impl Conversation {
    pub fn total_comments(&self) -> usize {
        self.comments.len()
    }

    /// Drops every user handle, on the post and on each comment.
    pub fn redact_handles(&mut self) {
        if let Some(post) = self.post.as_mut() {
            post.user_handle = None;
        }
        for comment in &mut self.comments {
            comment.user_handle = None;
        }
    }
}

#[derive(Serialize)]
struct ConversationWire<'a> {
    channel_name: &'a str,
    conversation_id: &'a str,
    url: &'a str,
    total_comments: usize,
    scrape_start_time: &'a str,
    comments: &'a [Comment],
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<&'a Post>,
    metadata: &'a CheckpointMetadata,
}

impl Serialize for Conversation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConversationWire {
            channel_name: &self.channel_name,
            conversation_id: &self.conversation_id,
            url: &self.url,
            total_comments: self.total_comments(),
            scrape_start_time: &self.scrape_start_time,
            comments: &self.comments,
            post: self.post.as_ref(),
            metadata: &self.metadata,
        }
        .serialize(serializer)
    }
}

// Stored `total_comments` is ignored on load; it is derived again on save.
#[derive(Deserialize)]
struct ConversationRecord {
    channel_name: String,
    conversation_id: String,
    url: String,
    #[serde(default)]
    post: Option<Post>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    scrape_start_time: String,
    #[serde(default)]
    metadata: CheckpointMetadata,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            channel_name: record.channel_name,
            conversation_id: record.conversation_id,
            url: record.url,
            post: record.post,
            comments: record.comments,
            scrape_start_time: record.scrape_start_time,
            metadata: record.metadata,
        }
    }
}
