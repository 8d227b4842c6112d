//! Owner token generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{LockError, Result};

/// Random bytes backing a token (128 bits).
const TOKEN_BYTES: usize = 16;

/// Generate a fresh owner token.
///
/// The token is the only proof of ownership a handle carries, so it must be
/// unguessable: 128 bits from the OS CSPRNG, encoded as URL-safe unpadded
/// base64. A failing randomness source is fatal to the acquisition call and
/// is not retried.
pub fn generate() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| LockError::TokenGeneration(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
