use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Comment, Post};

/// Which fields decide that two captured replies are the same comment.
///
/// `TextOnly` collapses identical replies from different authors;
/// `TextAuthorTime` keeps them apart and only merges re-renders of the
/// same reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    TextOnly,
    #[default]
    TextAuthorTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Text(String),
    TextAuthorTime {
        text: String,
        user_name: Option<String>,
        time: Option<String>,
    },
}

impl IdentityPolicy {
    pub fn key_for(self, comment: &Comment) -> IdentityKey {
        self.key_from_parts(&comment.text, &comment.user_name, &comment.comment_time)
    }

    /// Key of the root post under the same policy, so a re-rendered post can
    /// be told apart from its replies.
    pub fn key_for_post(self, post: &Post) -> IdentityKey {
        self.key_from_parts(&post.text, &post.user_name, &post.post_time)
    }

    fn key_from_parts(
        self,
        text: &str,
        user_name: &Option<String>,
        time: &Option<String>,
    ) -> IdentityKey {
        let text = text.trim().to_string();
        match self {
            IdentityPolicy::TextOnly => IdentityKey::Text(text),
            IdentityPolicy::TextAuthorTime => IdentityKey::TextAuthorTime {
                text,
                user_name: user_name.clone(),
                time: time.clone(),
            },
        }
    }
}

/// Admitted comments in capture order plus the set of their identity keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DedupStore {
    policy: IdentityPolicy,
    keys: HashSet<IdentityKey>,
    comments: Vec<Comment>,
}

impl DedupStore {
    pub fn new(policy: IdentityPolicy) -> Self {
        Self {
            policy,
            keys: HashSet::new(),
            comments: Vec::new(),
        }
    }

    /// Rebuilds a store from a saved conversation. The first occurrence of a
    /// key wins, so a checkpoint written under a looser policy shrinks rather
    /// than carrying duplicates forward.
    pub fn rehydrate(policy: IdentityPolicy, comments: impl IntoIterator<Item = Comment>) -> Self {
        let mut store = Self::new(policy);
        for comment in comments {
            store.admit(comment);
        }
        store
    }

    /// Returns true when the comment was new and has been appended.
    pub fn admit(&mut self, comment: Comment) -> bool {
        let key = self.policy.key_for(&comment);
        if !self.keys.insert(key) {
            return false;
        }
        self.comments.push(comment);
        true
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}
