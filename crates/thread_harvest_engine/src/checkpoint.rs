use std::fs;
use std::io;
use std::path::PathBuf;

use thread_harvest_core::{Conversation, Target};

use crate::persist::{AtomicFileWriter, PersistError};

/// Durable storage for full conversation snapshots, one slot per target.
pub trait CheckpointWriter: Send + Sync {
    /// Overwrites the target's previous checkpoint with `conversation`.
    fn save(&self, conversation: &Conversation) -> Result<PathBuf, PersistError>;

    /// Previously saved conversation for `target`, if any.
    fn load(&self, target: &Target) -> Result<Option<Conversation>, PersistError>;
}

/// Pretty-printed JSON files named `{channel}_comments_{conversation_id}.json`.
#[derive(Debug, Clone)]
pub struct JsonCheckpointWriter {
    writer: AtomicFileWriter,
}

impl JsonCheckpointWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
        }
    }

    pub fn path_for(&self, channel_name: &str, conversation_id: &str) -> PathBuf {
        self.writer
            .dir()
            .join(checkpoint_filename(channel_name, conversation_id))
    }
}

impl CheckpointWriter for JsonCheckpointWriter {
    fn save(&self, conversation: &Conversation) -> Result<PathBuf, PersistError> {
        let json = serde_json::to_vec_pretty(conversation)?;
        let filename = checkpoint_filename(&conversation.channel_name, &conversation.conversation_id);
        self.writer.write(&filename, &json)
    }

    fn load(&self, target: &Target) -> Result<Option<Conversation>, PersistError> {
        let path = self.path_for(target.channel_name(), target.conversation_id());
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Windows-safe, deterministic checkpoint name.
pub fn checkpoint_filename(channel_name: &str, conversation_id: &str) -> String {
    format!(
        "{}_comments_{}.json",
        sanitize_segment(channel_name),
        sanitize_segment(conversation_id)
    )
}

fn sanitize_segment(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let trimmed = compacted.trim_matches(&['_', ' ', '.'][..]);
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.chars().take(80).collect()
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '\0'..='\u{1F}'
    )
}
