use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{LoginResponse, ResourceId};

/// The signed-in identity, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub resource_id: ResourceId,
    pub email_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: i64,
    pub role_name: String,
    pub expires_in: i64,
}

impl From<LoginResponse> for Session {
    fn from(login: LoginResponse) -> Self {
        Session {
            access_token: login.access_token,
            token_type: login.token_type,
            resource_id: login.resource_id,
            email_id: login.email_id,
            first_name: login.first_name,
            last_name: login.last_name,
            role: login.role,
            role_name: login.role_name,
            expires_in: login.expires_in,
        }
    }
}

impl Session {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim().to_string();
        if name.is_empty() {
            "Guest".to_string()
        } else {
            name
        }
    }

    /// Lazy expiry check against the token's own `exp` claim. A token whose
    /// payload cannot be decoded is an error, not merely expired, so the
    /// caller can wipe the session.
    pub fn is_expired(&self, now: DateTime<Utc>) -> Result<bool, String> {
        let claims = decode_claims(&self.access_token)?;
        Ok(claims.exp < now.timestamp())
    }
}

/// The claims this client cares about. The token is decoded without
/// signature verification; the backend re-checks every request anyway.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, String> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| "malformed token: missing payload segment".to_string())?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| format!("malformed token payload: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("unreadable token claims: {}", e))
}

/// File-backed session storage. The in-memory copy is authoritative for the
/// current process; the YAML file carries it across restarts.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Option<Session>,
}

impl SessionStore {
    /// Opens the store, picking up a previously persisted session if the
    /// file exists and parses. A corrupt file counts as no session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = std::fs::read_to_string(&path)
            .ok()
            .and_then(|yaml| serde_yaml::from_str(&yaml).ok());
        SessionStore { path, current }
    }

    pub fn get(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn set(&mut self, session: Session) -> Result<(), String> {
        let yaml = serde_yaml::to_string(&session).map_err(|e| e.to_string())?;
        std::fs::write(&self.path, yaml).map_err(|e| e.to_string())?;
        self.current = Some(session);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = None;
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("failed to remove session file: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Builds an unsigned JWT-shaped token around the given claims JSON.
    fn fake_token(claims_json: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims_json.as_bytes());
        format!("{}.{}.signature", header, payload)
    }

    fn session_with_token(token: String) -> Session {
        Session {
            access_token: token,
            token_type: "Bearer".to_string(),
            resource_id: 1,
            email_id: "admin@timetrax.test".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            role: 1,
            role_name: "ADMIN".to_string(),
            expires_in: 3600,
        }
    }

    #[test]
    fn decodes_exp_claim() {
        let token = fake_token(r#"{"sub":"1","exp":1717400000}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 1_717_400_000);
        assert_eq!(claims.sub.as_deref(), Some("1"));
    }

    #[test]
    fn malformed_tokens_fail_to_decode() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.###.c").is_err());
        let garbage_payload = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(decode_claims(&garbage_payload).is_err());
    }

    #[test]
    fn expiry_is_compared_against_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let fresh = session_with_token(fake_token(&format!(
            r#"{{"exp":{}}}"#,
            now.timestamp() + 60
        )));
        let stale = session_with_token(fake_token(&format!(
            r#"{{"exp":{}}}"#,
            now.timestamp() - 60
        )));
        assert_eq!(fresh.is_expired(now), Ok(false));
        assert_eq!(stale.is_expired(now), Ok(true));
    }

    #[test]
    fn store_roundtrip_and_clear() {
        let path = std::env::temp_dir().join("timetrax-session-store-test.yaml");
        let _ = std::fs::remove_file(&path);

        let mut store = SessionStore::open(&path);
        assert!(store.get().is_none());

        let session = session_with_token(fake_token(r#"{"exp":1717400000}"#));
        store.set(session.clone()).unwrap();
        assert_eq!(store.get(), Some(&session));

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.get(), Some(&session));

        store.clear();
        assert!(store.get().is_none());
        assert!(!path.exists());
    }
}
