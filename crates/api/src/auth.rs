//! Acting-identity extraction.
//!
//! Authentication itself is a collaborator outside this core: by the time
//! a request arrives here, the auth layer has resolved the caller into a
//! user id, a session key, and a role flag, carried as headers. This
//! extractor only maps those headers into a typed context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use checkout::Actor;
use common::{SessionId, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// The resolved caller: user id, cart session key, and fulfillment role.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub is_admin: bool,
}

impl AuthContext {
    /// The caller as a fulfillment actor.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_header = header_value(parts, "x-user-id").ok_or_else(|| {
            ApiError::Unauthenticated("missing x-user-id header".to_string())
        })?;
        let user_id = Uuid::parse_str(&user_header)
            .map(UserId::from_uuid)
            .map_err(|e| ApiError::BadRequest(format!("Invalid x-user-id: {e}")))?;

        // A logged-in user without an explicit session key gets a stable
        // per-user one, so the cart survives across devices.
        let session_id = header_value(parts, "x-session-id")
            .map(SessionId::new)
            .unwrap_or_else(|| SessionId::new(format!("user-{user_id}")));

        let is_admin =
            header_value(parts, "x-user-role").is_some_and(|r| r.eq_ignore_ascii_case("admin"));

        Ok(Self {
            user_id,
            session_id,
            is_admin,
        })
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthContext, ApiError> {
        let (mut parts, ()) = request.into_parts();
        AuthContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn resolves_user_session_and_role() {
        let user = Uuid::new_v4();
        let request = Request::builder()
            .header("x-user-id", user.to_string())
            .header("x-session-id", "sess-abc")
            .header("x-user-role", "admin")
            .body(())
            .unwrap();

        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx.user_id, UserId::from_uuid(user));
        assert_eq!(ctx.session_id, SessionId::new("sess-abc"));
        assert!(ctx.is_admin);
        assert!(ctx.actor().is_admin);
    }

    #[tokio::test]
    async fn falls_back_to_per_user_session() {
        let user = Uuid::new_v4();
        let request = Request::builder()
            .header("x-user-id", user.to_string())
            .body(())
            .unwrap();

        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx.session_id, SessionId::new(format!("user-{user}")));
        assert!(!ctx.is_admin);
    }

    #[tokio::test]
    async fn missing_user_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        let result = extract(request).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn malformed_user_id_is_bad_request() {
        let request = Request::builder()
            .header("x-user-id", "not-a-uuid")
            .body(())
            .unwrap();
        let result = extract(request).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
