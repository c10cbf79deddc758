use chrono::{DateTime, Utc};

use crate::session::Session;

pub const ROLE_ADMIN: i64 = 1;
pub const ROLE_USER: i64 = 2;

/// Every signed-in role.
pub const ANY_ROLE: &[i64] = &[ROLE_ADMIN, ROLE_USER];
/// Administration screens.
pub const ADMIN_ONLY: &[i64] = &[ROLE_ADMIN];

/// Verdict for rendering a protected screen. This gate is a UX convenience;
/// the backend rejects disallowed requests on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Send the user to the login screen, optionally wiping the stored
    /// session first (expired or undecodable token).
    ToLogin { clear_session: bool },
    ToNotAuthorized,
}

/// Decides whether the current session may see a screen restricted to
/// `allowed_roles` (`None` means any signed-in user).
pub fn check(
    session: Option<&Session>,
    allowed_roles: Option<&[i64]>,
    now: DateTime<Utc>,
) -> Access {
    let session = match session {
        Some(session) => session,
        None => return Access::ToLogin { clear_session: false },
    };
    match session.is_expired(now) {
        Ok(false) => {}
        Ok(true) => {
            tracing::info!("session token expired, redirecting to login");
            return Access::ToLogin { clear_session: true };
        }
        Err(reason) => {
            tracing::warn!("session token rejected: {}", reason);
            return Access::ToLogin { clear_session: true };
        }
    }
    if let Some(roles) = allowed_roles {
        if !roles.contains(&session.role) {
            return Access::ToNotAuthorized;
        }
    }
    Access::Granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::TimeZone;

    fn session(role: i64, exp_offset: i64, now: DateTime<Utc>) -> Session {
        let payload = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"exp":{}}}"#, now.timestamp() + exp_offset).as_bytes(),
        );
        Session {
            access_token: format!("h.{}.s", payload),
            token_type: "Bearer".to_string(),
            resource_id: 5,
            email_id: "user@timetrax.test".to_string(),
            first_name: "Uma".to_string(),
            last_name: "User".to_string(),
            role,
            role_name: if role == ROLE_ADMIN { "ADMIN" } else { "USER" }.to_string(),
            expires_in: 3600,
        }
    }

    #[test]
    fn no_session_redirects_to_login_without_clearing() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        assert_eq!(
            check(None, Some(ADMIN_ONLY), now),
            Access::ToLogin { clear_session: false }
        );
    }

    #[test]
    fn expired_token_clears_session_and_redirects() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let expired = session(ROLE_ADMIN, -10, now);
        assert_eq!(
            check(Some(&expired), Some(ADMIN_ONLY), now),
            Access::ToLogin { clear_session: true }
        );
    }

    #[test]
    fn malformed_token_is_treated_like_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let mut broken = session(ROLE_ADMIN, 600, now);
        broken.access_token = "garbage".to_string();
        assert_eq!(
            check(Some(&broken), None, now),
            Access::ToLogin { clear_session: true }
        );
    }

    #[test]
    fn disallowed_role_goes_to_not_authorized() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let user = session(ROLE_USER, 600, now);
        assert_eq!(
            check(Some(&user), Some(ADMIN_ONLY), now),
            Access::ToNotAuthorized
        );
    }

    #[test]
    fn allowed_role_is_granted() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let admin = session(ROLE_ADMIN, 600, now);
        assert_eq!(check(Some(&admin), Some(ADMIN_ONLY), now), Access::Granted);
        let user = session(ROLE_USER, 600, now);
        assert_eq!(check(Some(&user), Some(ANY_ROLE), now), Access::Granted);
        assert_eq!(check(Some(&user), None, now), Access::Granted);
    }
}
