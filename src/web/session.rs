use crate::db;
use crate::domain::models::Role;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub account_id: Uuid,
    pub role: Role,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
    #[error("bad role")]
    Role,
}

pub fn sign_session(account_id: Uuid, role: Role, key: &[u8]) -> Result<String, SessionError> {
    let exp = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
    let payload = format!("{}|{}|{}", account_id, role_string(role), exp.timestamp());
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    ))
}

pub fn verify_session(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let payload_bytes = general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let pieces: Vec<&str> = payload.split('|').collect();
    if pieces.len() != 3 {
        return Err(SessionError::Invalid);
    }
    let account_id = Uuid::parse_str(pieces[0]).map_err(|_| SessionError::Invalid)?;
    let role = parse_role(pieces[1])?;
    let exp: i64 = pieces[2].parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims {
        account_id,
        role,
        exp,
    })
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                if let Some(rest) = pair.trim().strip_prefix("session=") {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

fn role_string(role: Role) -> &'static str {
    match role {
        Role::Visitor => "VISITOR",
        Role::Customer => "CUSTOMER",
        Role::Vip => "VIP",
        Role::Chef => "CHEF",
        Role::DeliveryPerson => "DELIVERY_PERSON",
        Role::Manager => "MANAGER",
    }
}

fn parse_role(raw: &str) -> Result<Role, SessionError> {
    match raw {
        "VISITOR" => Ok(Role::Visitor),
        "CUSTOMER" => Ok(Role::Customer),
        "VIP" => Ok(Role::Vip),
        "CHEF" => Ok(Role::Chef),
        "DELIVERY_PERSON" => Ok(Role::DeliveryPerson),
        "MANAGER" => Ok(Role::Manager),
        _ => Err(SessionError::Role),
    }
}

/// Authenticated caller. The account is re-read so role changes (promotion,
/// demotion) and deactivation take effect on the next request, not at the
/// next login.
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    crate::state::SharedState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared = crate::state::SharedState::from_ref(state);

        let token = extract_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;
        let claims = verify_session(&token, &shared.session_key).map_err(|e| {
            tracing::warn!("session verification failed: {e}");
            StatusCode::UNAUTHORIZED
        })?;

        let account = db::find_account_by_id(&shared.pool, claims.account_id)
            .await
            .map_err(|e| {
                tracing::warn!("account lookup failed for session: {e}");
                StatusCode::UNAUTHORIZED
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !account.is_active {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(CurrentUser {
            id: account.id,
            role: account.role,
        })
    }
}

/// Optional variant of [`CurrentUser`] for endpoints open to visitors; a
/// missing or bad token just means an anonymous caller.
pub fn optional_account_id(headers: &HeaderMap, key: &[u8]) -> Option<Uuid> {
    let token = extract_token(headers)?;
    verify_session(&token, key).ok().map(|c| c.account_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-session-key-for-unit-tests";

    #[test]
    fn sign_then_verify_round_trips() {
        let id = Uuid::new_v4();
        let token = sign_session(id, Role::Vip, KEY).unwrap();
        let claims = verify_session(&token, KEY).unwrap();
        assert_eq!(claims.account_id, id);
        assert_eq!(claims.role, Role::Vip);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign_session(Uuid::new_v4(), Role::Customer, KEY).unwrap();
        let forged = sign_session(Uuid::new_v4(), Role::Manager, KEY).unwrap();
        // graft the manager payload onto the customer signature
        let payload = forged.split('.').next().unwrap();
        let sig = token.split('.').nth(1).unwrap();
        let spliced = format!("{payload}.{sig}");
        assert!(matches!(
            verify_session(&spliced, KEY),
            Err(SessionError::Signature)
        ));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = sign_session(Uuid::new_v4(), Role::Chef, KEY).unwrap();
        assert!(verify_session(&token, b"another-key").is_err());
    }

    #[test]
    fn every_role_survives_the_round_trip() {
        for role in [
            Role::Visitor,
            Role::Customer,
            Role::Vip,
            Role::Chef,
            Role::DeliveryPerson,
            Role::Manager,
        ] {
            let token = sign_session(Uuid::new_v4(), role, KEY).unwrap();
            assert_eq!(verify_session(&token, KEY).unwrap().role, role);
        }
    }

    #[test]
    fn token_extraction_prefers_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; session=cookie-token".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer header-token".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));
    }
}
