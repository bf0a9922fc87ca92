use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix marking identifiers that were assigned on the client.
pub const LOCAL_PREFIX: &str = "local:";

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Identifier of a post or comment.
///
/// `Remote` ids were assigned by the service and are authoritative.
/// `Local` ids were minted on the client before any round-trip happened.
/// Both serialize as a plain JSON string; local ids keep the `local:` prefix
/// so the distinction survives a trip through the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityId {
    Remote(String),
    Local(String),
}

impl EntityId {
    pub fn remote(id: impl Into<String>) -> Self {
        EntityId::Remote(id.into())
    }

    /// Mints a client-side post id from the current time and a random suffix.
    pub fn new_local_post(now_millis: i64) -> Self {
        EntityId::Local(format!("{}_{}", now_millis, random_suffix()))
    }

    /// Mints a client-side comment id: parent post id, timestamp and a random
    /// suffix, so two replies created in the same millisecond do not collide.
    pub fn new_local_comment(post_id: &EntityId, now_millis: i64) -> Self {
        EntityId::Local(format!(
            "{}_comment_{}_{}",
            post_id.as_str(),
            now_millis,
            random_suffix()
        ))
    }

    /// The bare identifier, without the local prefix.
    pub fn as_str(&self) -> &str {
        match self {
            EntityId::Remote(id) | EntityId::Local(id) => id,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, EntityId::Local(_))
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        match value.strip_prefix(LOCAL_PREFIX) {
            Some(local) => EntityId::Local(local.to_string()),
            None => EntityId::Remote(value),
        }
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::from(value.to_string())
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Remote(id) => f.write_str(id),
            EntityId::Local(id) => write!(f, "{}{}", LOCAL_PREFIX, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_strings_parse_as_remote() {
        assert_eq!(EntityId::from("3"), EntityId::remote("3"));
        assert!(!EntityId::from("3").is_local());
    }

    #[test]
    fn local_ids_keep_their_tag_through_json() {
        let id = EntityId::new_local_post(1_703_123_456_789);
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("\"local:1703123456789_"));

        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(back.is_local());
    }

    #[test]
    fn comment_ids_embed_parent_and_timestamp() {
        let parent = EntityId::remote("3");
        let a = EntityId::new_local_comment(&parent, 42);
        let b = EntityId::new_local_comment(&parent, 42);

        assert!(a.as_str().starts_with("3_comment_42_"));
        assert_eq!(a.as_str().len(), "3_comment_42_".len() + SUFFIX_LEN);
        assert_ne!(a, b);
    }
}
