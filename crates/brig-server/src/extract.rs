//! Request extractors: the calling actor and JSON bodies with `{"error"}`
//! rejections.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use brig_core::actor::Actor;
use brig_db::error::DatabaseError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the caller's user id.
pub const USER_HEADER: &str = "x-user-id";

/// The caller, or `None` when the request is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Option<Actor>);

impl CurrentActor {
    #[must_use]
    pub fn get(&self) -> Option<&Actor> {
        self.0.as_ref()
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for an anonymous caller.
    pub fn required(&self) -> Result<&Actor, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized(format!("{USER_HEADER} header is required")))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_HEADER) else {
            return Ok(Self(None));
        };
        let user_id = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::BadRequest(format!("{USER_HEADER} must be a user id")))?;

        let service = state.service().await;
        match service.resolve_actor(user_id).await {
            Ok(actor) => Ok(Self(Some(actor))),
            Err(DatabaseError::NotFound { .. }) => {
                Err(ApiError::Unauthorized(format!("unknown user {user_id}")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// `Json<T>` whose rejection is a 400 with an `{"error"}` body.
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}
