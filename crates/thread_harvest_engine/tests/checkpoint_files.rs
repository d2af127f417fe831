use std::fs;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;
use thread_harvest_core::{CheckpointMetadata, Comment, Conversation, Post, Target};
use thread_harvest_engine::{CheckpointWriter, JsonCheckpointWriter};

fn comment(n: usize, handle: Option<&str>) -> Comment {
    Comment {
        text: format!("comment {n}"),
        user_name: Some(format!("Reader {n}")),
        user_handle: handle.map(str::to_string),
        comment_time: (n % 2 == 0).then(|| "2026-03-01T10:00:00.000Z".to_string()),
        scrape_time: "2026-03-01 12:00:05".to_string(),
    }
}

fn conversation(comments: Vec<Comment>) -> Conversation {
    Conversation {
        channel_name: "the_hindu".to_string(),
        conversation_id: "1790000000000000000".to_string(),
        url: "https://x.com/the_hindu/status/1790000000000000000".to_string(),
        post: Some(Post {
            text: "Breaking news".to_string(),
            user_name: Some("The Hindu".to_string()),
            user_handle: Some("@the_hindu".to_string()),
            post_time: Some("2026-03-01T09:00:00.000Z".to_string()),
            scrape_time: "2026-03-01 12:00:01".to_string(),
        }),
        metadata: CheckpointMetadata {
            last_scroll_position: 4200,
            last_save_time: "2026-03-01 12:01:00".to_string(),
            raw_comment_count: comments.len(),
        },
        comments,
        scrape_start_time: "2026-03-01 12:00:00".to_string(),
    }
}

fn target() -> Target {
    Target::parse("https://x.com/the_hindu/status/1790000000000000000").unwrap()
}

#[test]
fn saved_checkpoint_loads_back_identical() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().to_path_buf());
    let original = conversation((0..4).map(|n| comment(n, Some("@reader"))).collect());

    let path = writer.save(&original).unwrap();
    assert_eq!(
        path.file_name().unwrap(),
        "the_hindu_comments_1790000000000000000.json"
    );

    let loaded = writer.load(&target()).unwrap().expect("checkpoint present");
    assert_eq!(loaded, original);
}

#[test]
fn total_comments_matches_stored_comments() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().to_path_buf());
    let path = writer
        .save(&conversation((0..3).map(|n| comment(n, None)).collect()))
        .unwrap();

    let json: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["total_comments"], 3);
    assert_eq!(json["comments"].as_array().unwrap().len(), 3);
    assert_eq!(json["metadata"]["last_scroll_position"], 4200);
    // Unknown values are written as explicit nulls.
    assert_eq!(json["comments"][1]["comment_time"], Value::Null);
}

#[test]
fn redacted_handles_are_absent_from_the_file() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().to_path_buf());
    let mut redacted = conversation(vec![comment(0, Some("@someone"))]);
    redacted.redact_handles();
    let path = writer.save(&redacted).unwrap();

    let json: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(json["comments"][0].get("user_handle").is_none());
    assert!(json["post"].get("user_handle").is_none());
    assert_eq!(json["comments"][0]["user_name"], "Reader 0");
}

#[test]
fn stale_total_in_file_is_ignored_on_load() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().to_path_buf());
    let path = writer
        .save(&conversation(vec![comment(0, None), comment(1, None)]))
        .unwrap();

    let mut json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["total_comments"] = Value::from(99);
    fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    let loaded = writer.load(&target()).unwrap().unwrap();
    assert_eq!(loaded.total_comments(), 2);
}

#[test]
fn missing_checkpoint_loads_as_none() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().join("never-created"));
    assert_eq!(writer.load(&target()).unwrap(), None);
}

#[test]
fn corrupt_checkpoint_is_an_error() {
    let temp = TempDir::new().unwrap();
    let writer = JsonCheckpointWriter::new(temp.path().to_path_buf());
    let path = writer.path_for("the_hindu", "1790000000000000000");
    fs::write(&path, "{ not json").unwrap();

    assert!(writer.load(&target()).is_err());
}
