use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

const SESSION_PREFIX: &str = "session";
const SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of opaque identifiers for sessions and feedback records.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// `{prefix}_{unix_millis}_{7 base-36 chars}`. Not a security credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeRandomIds;

impl IdGenerator for TimeRandomIds {
    fn next_id(&self, prefix: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{prefix}_{millis}_{suffix}")
    }
}

/// Deterministic `{prefix}_{n}` identifiers, counting from 1.
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}_{n}")
    }
}

/// Conversation identity attached to every query and feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh identity. Call once per conversation.
    pub fn create(ids: &dyn IdGenerator) -> Self {
        Self(ids.next_id(SESSION_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn time_random_ids_have_prefix_millis_and_suffix() {
        let id = TimeRandomIds.next_id("session");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn time_random_ids_do_not_collide_in_a_burst() {
        let ids: HashSet<String> = (0..1_000).map(|_| TimeRandomIds.next_id("msg")).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn sequential_ids_count_up_per_generator() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id("session"), "session_1");
        assert_eq!(ids.next_id("msg"), "msg_2");

        let other = SequentialIds::new();
        assert_eq!(other.next_id("msg"), "msg_1");
    }

    #[test]
    fn session_id_uses_session_prefix() {
        let ids = SequentialIds::new();
        let session = SessionId::create(&ids);
        assert_eq!(session.as_str(), "session_1");
        assert_eq!(session.to_string(), "session_1");
    }
}
