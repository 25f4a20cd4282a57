//! Locally issued session tokens.

use ring::rand::{SecureRandom, SystemRandom};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AppError;

/// Process-wide sequence so two tokens minted in the same millisecond differ
/// even if the random part collides.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Random bytes per token (hex encoded).
const RANDOM_BYTES: usize = 6;

/// Generate a token of the form `{prefix}_{unix_millis}_{sequence}_{random}`.
pub fn generate_session_token(prefix: &str) -> Result<String, AppError> {
    let millis = chrono::Utc::now().timestamp_millis();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut random = [0u8; RANDOM_BYTES];
    SystemRandom::new()
        .fill(&mut random)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System random source unavailable")))?;

    Ok(format!(
        "{}_{}_{:x}_{}",
        prefix,
        millis,
        sequence,
        hex::encode(random)
    ))
}
