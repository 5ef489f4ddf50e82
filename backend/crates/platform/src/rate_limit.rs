//! Rate Limiting Infrastructure
//!
//! Cooldown-based admission control for caller-identified operations.
//! State is in-process only and keyed by `(operation, discriminator)`.

use kernel::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Rate-limited operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    IncrementUsage,
    ToggleFavorite,
    PublishRecipe,
    SetUsername,
    UploadImage,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::IncrementUsage,
        Operation::ToggleFavorite,
        Operation::PublishRecipe,
        Operation::SetUsername,
        Operation::UploadImage,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::IncrementUsage => "INCREMENT_USAGE",
            Operation::ToggleFavorite => "TOGGLE_FAVORITE",
            Operation::PublishRecipe => "PUBLISH_RECIPE",
            Operation::SetUsername => "SET_USERNAME",
            Operation::UploadImage => "UPLOAD_IMAGE",
        }
    }

    /// Built-in cooldown for this operation
    pub const fn default_cooldown(&self) -> Duration {
        match self {
            Operation::IncrementUsage => Duration::from_secs(5),
            Operation::ToggleFavorite => Duration::from_secs(2),
            Operation::PublishRecipe => Duration::from_secs(30),
            Operation::SetUsername => Duration::from_secs(60),
            Operation::UploadImage => Duration::from_secs(10),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rate-limited operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Rate limit configuration
///
/// Fixed once handed to a [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    cooldowns: HashMap<Operation, Duration>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldowns: Operation::ALL
                .into_iter()
                .map(|op| (op, op.default_cooldown()))
                .collect(),
        }
    }
}

impl RateLimitConfig {
    /// Configuration with no limited operations
    pub fn empty() -> Self {
        Self {
            cooldowns: HashMap::new(),
        }
    }

    pub fn with_cooldown(mut self, operation: Operation, cooldown: Duration) -> Self {
        self.cooldowns.insert(operation, cooldown);
        self
    }

    pub fn cooldown(&self, operation: Operation) -> Option<Duration> {
        self.cooldowns.get(&operation).copied()
    }

    pub fn cooldown_ms(&self, operation: Operation) -> Option<i64> {
        self.cooldown(operation).map(|d| d.as_millis() as i64)
    }
}

/// Admission decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Remaining cooldown; 0 when allowed
    pub wait_ms: i64,
}

impl RateLimitDecision {
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            wait_ms: 0,
        }
    }

    pub const fn denied(wait_ms: i64) -> Self {
        Self {
            allowed: false,
            wait_ms,
        }
    }
}

/// Identifies one independent cooldown counter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub operation: Operation,
    pub discriminator: String,
}

impl RateLimitKey {
    pub fn new(operation: Operation, discriminator: &str) -> Self {
        Self {
            operation,
            discriminator: discriminator.to_string(),
        }
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.discriminator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub last_invocation_ms: i64,
    pub cooldown_ms: i64,
}

impl RateLimitEntry {
    /// Cooldown left at `now_ms`, 0 once elapsed
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.cooldown_ms - (now_ms - self.last_invocation_ms)).max(0)
    }
}

/// In-memory cooldown limiter
///
/// One instance is built at startup and shared by reference. The entry
/// table sits behind a single mutex, so check-then-record is atomic for
/// every key.
pub struct RateLimiter<C = SystemClock>
where
    C: Clock,
{
    config: RateLimitConfig,
    clock: C,
    entries: Mutex<HashMap<RateLimitKey, RateLimitEntry>>,
}

impl RateLimiter<SystemClock> {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl<C> RateLimiter<C>
where
    C: Clock,
{
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or deny, recording the invocation when admitted
    ///
    /// Operations without a configured cooldown are always admitted and
    /// leave no entry behind.
    pub fn check_and_record(&self, operation: Operation, discriminator: &str) -> RateLimitDecision {
        let Some(cooldown_ms) = self.config.cooldown_ms(operation) else {
            return RateLimitDecision::allowed();
        };

        let key = RateLimitKey::new(operation, discriminator);
        let mut entries = self.lock();
        let now = self.clock.now_ms();

        if let Some(entry) = entries.get(&key) {
            let remaining = cooldown_ms - (now - entry.last_invocation_ms);
            if remaining > 0 {
                tracing::warn!(key = %key, wait_ms = remaining, "Rate limit denied");
                return RateLimitDecision::denied(remaining);
            }
        }

        entries.insert(
            key,
            RateLimitEntry {
                last_invocation_ms: now,
                cooldown_ms,
            },
        );
        RateLimitDecision::allowed()
    }

    /// Unconditionally mark the operation as just performed
    pub fn record(&self, operation: Operation, discriminator: &str) {
        let Some(cooldown_ms) = self.config.cooldown_ms(operation) else {
            return;
        };
        let key = RateLimitKey::new(operation, discriminator);
        let mut entries = self.lock();
        let now = self.clock.now_ms();
        entries.insert(
            key,
            RateLimitEntry {
                last_invocation_ms: now,
                cooldown_ms,
            },
        );
    }

    /// Remaining cooldown without recording anything
    pub fn peek_remaining(&self, operation: Operation, discriminator: &str) -> i64 {
        let key = RateLimitKey::new(operation, discriminator);
        let entries = self.lock();
        entries
            .get(&key)
            .map(|entry| entry.remaining_ms(self.clock.now_ms()))
            .unwrap_or(0)
    }

    pub fn clear(&self, operation: Operation, discriminator: &str) {
        self.lock()
            .remove(&RateLimitKey::new(operation, discriminator));
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RateLimitKey, RateLimitEntry>> {
        // Entries stay consistent under panic: each write is a single insert/remove.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Format a remaining wait for display (`"2s"`, `"1m 5s"`, `"2m"`)
pub fn format_wait_time(wait_ms: i64) -> String {
    if wait_ms <= 0 {
        return String::new();
    }

    let seconds = (wait_ms + 999) / 1000;
    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    if remaining_seconds > 0 {
        format!("{}m {}s", minutes, remaining_seconds)
    } else {
        format!("{}m", minutes)
    }
}
