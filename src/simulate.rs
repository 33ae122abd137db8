//! Simulated workload
//!
//! A stand-in for a slow remote lookup ("fetch user by id") so the executor can
//! be exercised end to end from the command line.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Knobs for [`fetch_user_by_id`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Upper bound for the random per-item delay
    pub max_delay_ms: u64,
    /// Ids divisible by this value fail; `None` or `Some(0)` never fails
    pub fail_every: Option<u64>,
}

impl Workload {
    pub fn should_fail(&self, id: u64) -> bool {
        matches!(self.fail_every, Some(n) if n > 0 && id % n == 0)
    }
}

/// Random-ish jitter in milliseconds within [0, range).
pub(crate) fn jitter_ms(range: u64) -> u64 {
    if range == 0 {
        return 0;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_nanos(0));
    let nanos = now.subsec_nanos() as u64;
    let micros = (now.as_micros() & 0xFFFF) as u64;
    (nanos ^ (micros << 5)) % range
}

/// Pretend to look up a user, taking up to `max_delay_ms`.
pub async fn fetch_user_by_id(id: u64, workload: Workload) -> Result<User, String> {
    let delay = jitter_ms(workload.max_delay_ms);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if workload.should_fail(id) {
        return Err(format!("user {id} unavailable"));
    }

    Ok(User {
        id,
        name: format!("User {id}"),
    })
}
