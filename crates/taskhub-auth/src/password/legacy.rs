//! Verification of legacy `pbkdf2-sha256` modular-crypt hashes.
//!
//! Format: `$pbkdf2-sha256$<rounds>$<salt>$<checksum>` where salt and
//! checksum use the adapted base64 alphabet (`.` in place of `+`, no
//! padding). Accounts carrying these hashes keep working until their next
//! successful login re-hashes them with Argon2.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use sha2::Sha256;
use tracing::warn;

use taskhub_core::error::AppError;

use super::scheme::PasswordScheme;

const PREFIX: &str = "$pbkdf2-sha256$";
const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct Pbkdf2Sha256Scheme;

impl Pbkdf2Sha256Scheme {
    /// Build a hash string; used to produce fixtures for existing accounts.
    pub fn encode(password: &str, salt: &[u8], rounds: u32) -> String {
        let mut checksum = [0u8; CHECKSUM_LEN];
        ::pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut checksum);
        format!(
            "{PREFIX}{rounds}${}${}",
            ab64_encode(salt),
            ab64_encode(&checksum)
        )
    }
}

impl PasswordScheme for Pbkdf2Sha256Scheme {
    fn id(&self) -> &'static str {
        "pbkdf2-sha256"
    }

    fn recognizes(&self, hash: &str) -> bool {
        hash.starts_with(PREFIX)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let Some((rounds, salt, expected)) = parse(hash) else {
            warn!("Malformed pbkdf2-sha256 password hash");
            return Ok(false);
        };

        let mut actual = [0u8; CHECKSUM_LEN];
        ::pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, rounds, &mut actual);
        Ok(constant_time_eq(&actual, &expected))
    }
}

/// Split a hash into rounds, salt and checksum.
fn parse(hash: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = hash.strip_prefix(PREFIX)?.split('$');
    let (Some(rounds), Some(salt), Some(checksum), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let rounds: u32 = rounds.parse().ok().filter(|r| *r > 0)?;
    let salt = ab64_decode(salt)?;
    let checksum = ab64_decode(checksum)?;
    (checksum.len() == CHECKSUM_LEN).then_some((rounds, salt, checksum))
}

fn ab64_encode(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes).replace('+', ".")
}

fn ab64_decode(text: &str) -> Option<Vec<u8>> {
    STANDARD_NO_PAD.decode(text.replace('.', "+")).ok()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
