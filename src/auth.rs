use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issued tokens are valid for one hour.
const TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User row UUID.
    pub sub: Uuid,
    pub user_id: String,
    pub role: String,
    pub lab_id: Option<String>,
    pub exp: u64,
}

pub fn issue_token(
    secret: &str,
    sub: Uuid,
    user_id: &str,
    role: &str,
    lab_id: Option<String>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        + TOKEN_TTL_SECS;
    let claims = Claims {
        sub,
        user_id: user_id.to_string(),
        role: role.to_string(),
        lab_id,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Six random decimal digits, never starting with zero.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    expires_at: Instant,
    verified: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum OtpCheck {
    Verified,
    Mismatch,
    Expired,
    NotFound,
}

/// Time-boxed, process-local store for password-reset codes, keyed by
/// email. Expired entries are purged on every insert in addition to the
/// freshness check at verification time, so the map cannot grow without
/// bound under abandoned reset attempts.
pub struct OtpStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, OtpEntry>>,
}

impl OtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a freshly issued code for `email`, replacing any previous one.
    pub fn issue(&self, email: &str, code: String) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            email.to_string(),
            OtpEntry {
                code,
                expires_at: now + self.ttl,
                verified: false,
            },
        );
    }

    /// Check a submitted code and, on success, mark the entry verified so a
    /// subsequent password reset is allowed. Expired entries are removed.
    pub fn verify(&self, email: &str, code: &str) -> OtpCheck {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(email) else {
            return OtpCheck::NotFound;
        };
        if entry.expires_at <= now {
            entries.remove(email);
            return OtpCheck::Expired;
        }
        if entry.code != code {
            return OtpCheck::Mismatch;
        }
        entry.verified = true;
        OtpCheck::Verified
    }

    /// Consume a verified entry. Returns false if there is no live,
    /// verified entry for `email`, in which case nothing is removed.
    pub fn take_verified(&self, email: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(email) {
            Some(entry) if entry.verified && entry.expires_at > now => {
                entries.remove(email);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_secs: u64) -> OtpStore {
        OtpStore::new(Duration::from_secs(ttl_secs))
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn verify_matching_code() {
        let store = store(600);
        store.issue("a@b.c", "123456".to_string());
        assert_eq!(store.verify("a@b.c", "123456"), OtpCheck::Verified);
    }

    #[test]
    fn verify_wrong_code_is_mismatch() {
        let store = store(600);
        store.issue("a@b.c", "123456".to_string());
        assert_eq!(store.verify("a@b.c", "654321"), OtpCheck::Mismatch);
    }

    #[test]
    fn verify_unknown_email_is_not_found() {
        let store = store(600);
        assert_eq!(store.verify("a@b.c", "123456"), OtpCheck::NotFound);
    }

    #[test]
    fn expired_code_is_rejected_and_removed() {
        let store = store(0);
        store.issue("a@b.c", "123456".to_string());
        assert_eq!(store.verify("a@b.c", "123456"), OtpCheck::Expired);
        assert_eq!(store.verify("a@b.c", "123456"), OtpCheck::NotFound);
    }

    #[test]
    fn issuing_purges_expired_entries() {
        let store = store(0);
        store.issue("stale@b.c", "111111".to_string());
        store.issue("fresh@b.c", "222222".to_string());
        assert!(!store.entries.lock().unwrap().contains_key("stale@b.c"));
    }

    #[test]
    fn reset_requires_a_verified_entry() {
        let store = store(600);
        store.issue("a@b.c", "123456".to_string());
        assert!(!store.take_verified("a@b.c"));

        store.verify("a@b.c", "123456");
        assert!(store.take_verified("a@b.c"));
        // Entry is consumed.
        assert!(!store.take_verified("a@b.c"));
    }

    #[test]
    fn token_round_trips() {
        let sub = Uuid::new_v4();
        let token = issue_token("secret", sub, "U-1", "admin", None).expect("encode failed");
        let claims = decode_token("secret", &token).expect("decode failed");
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.user_id, "U-1");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = issue_token("secret", Uuid::new_v4(), "U-1", "admin", None).unwrap();
        assert!(decode_token("other", &token).is_err());
    }
}
