//! ID generation utilities.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Length of a ticket ID in hex characters.
pub const ID_LENGTH: usize = 24;

/// Generate a unique ticket ID.
///
/// The ID is the first 24 hex chars of a SHA256 over the ticket's seed
/// fields, its creation instant and a nonce. The `exists` closure checks
/// for collisions; the nonce is bumped until a free ID is found.
pub fn generate_id<F>(
    project: &str,
    title: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u64;
    loop {
        let seed = generate_id_seed(project, title, creator, created_at, nonce);
        let id = compute_id_hash(&seed);
        if !exists(&id) {
            return id;
        }
        nonce += 1;
    }
}

fn generate_id_seed(
    project: &str,
    title: &str,
    creator: &str,
    created_at: DateTime<Utc>,
    nonce: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        project,
        title,
        creator,
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LENGTH].to_string()
}

/// Check that `id` has the shape of a store-assigned ID.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let id = generate_id("apitest", "Test", "me", Utc::now(), |_| false);
        assert_eq!(id.len(), ID_LENGTH);
        assert!(is_valid_id(&id));
    }

    #[test]
    fn test_generate_id_deterministic_for_same_seed() {
        let now = Utc::now();
        let a = generate_id("p", "T", "me", now, |_| false);
        let b = generate_id("p", "T", "me", now, |_| false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_id_collision_handling() {
        let mut generated = HashSet::new();
        let now = Utc::now();
        let id1 = generate_id("p", "Test", "me", now, |id| generated.contains(id));
        generated.insert(id1.clone());
        let id2 = generate_id("p", "Test", "me", now, |id| generated.contains(id));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("5f1b2c3d4e5f6a7b8c9d0e1f"));
        assert!(!is_valid_id("5F1B2C3D4E5F6A7B8C9D0E1F"));
        assert!(!is_valid_id("not-an-id"));
        assert!(!is_valid_id("5f1b2c3d4e5f6a7b8c9d0e1"));
        assert!(!is_valid_id(""));
    }
}
