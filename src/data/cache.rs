use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::data::types::User;
use crate::leaderboard::UserLookup;

/// Users resolved from the backend, kept until their TTL runs out.
pub struct UserCache {
    cache: DashMap<String, CachedUser>,
    ttl: Duration,
}

struct CachedUser {
    user: User,
    timestamp: Instant,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    pub fn insert(&self, user: User) {
        self.cache.insert(
            user.id.clone(),
            CachedUser {
                user,
                timestamp: Instant::now(),
            },
        );
    }

    /// Get user if not expired (evict on read)
    pub fn get(&self, user_id: &str) -> Option<User> {
        let entry = self.cache.get(user_id)?;
        if entry.timestamp.elapsed() > self.ttl {
            drop(entry); // Release the read lock before removing
            self.cache.remove(user_id);
            None
        } else {
            Some(entry.user.clone())
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for UserCache {
    fn default() -> Self {
        // Group pages regenerate every minute
        Self::new(Duration::from_secs(60))
    }
}

impl UserLookup for UserCache {
    fn lookup(&self, user_id: &str) -> Option<User> {
        self.get(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user-{}", id),
            name: format!("User {}", id),
            avatar_url: None,
        }
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = UserCache::default();
        cache.insert(user("u1"));

        assert_eq!(cache.get("u1").map(|u| u.username), Some("user-u1".to_string()));
        assert!(cache.get("u2").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = UserCache::new(Duration::from_millis(200));
        cache.insert(user("u1"));

        assert!(cache.get("u1").is_some());

        thread::sleep(Duration::from_millis(300));

        // Expired entries are evicted on read
        assert!(cache.get("u1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_as_user_lookup() {
        let cache = UserCache::default();
        cache.insert(user("u1"));
        assert!(cache.lookup("u1").is_some());

        cache.clear();
        assert!(cache.lookup("u1").is_none());
    }
}
