use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Enforces a minimum spacing between calls sharing one API key.
///
/// Callers reserve a grant slot under the lock (the lock is never held
/// across an await) and then sleep until their slot arrives. Because
/// slots for one key are handed out exactly `min_delay` apart, any two
/// consecutive grants observe at least that gap regardless of how many
/// workers contend for the key.
pub struct RateLimiter {
    min_delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Blocks until at least `min_delay` has elapsed since the last
    /// grant for `key`. Cannot fail, only delay.
    pub async fn acquire(&self, key: &str) {
        let grant_at = {
            let mut slots = self
                .next_slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let at = match slots.get(key) {
                Some(prev) => (*prev + self.min_delay).max(now),
                None => now,
            };
            slots.insert(key.to_string(), at);
            at
        };

        let now = Instant::now();
        if grant_at > now {
            tokio::time::sleep(grant_at - now).await;
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }
}
