//! Caller identity extraction.
//!
//! Authentication is handled upstream by the marketplace API gateway, which terminates the user's session and
//! forwards the authenticated user id in the [`USER_ID_HEADER`] header. The settlement server only runs on the
//! private service network, so the header is trusted as-is. Requests without a parseable identity are rejected with
//! 401 before any handler runs.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, ServerError};

pub const USER_ID_HEADER: &str = "mes-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: i64,
}

impl FromRequest for UserClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user_claims(req))
    }
}

fn extract_user_claims(req: &HttpRequest) -> Result<UserClaims, ServerError> {
    let value = req.headers().get(USER_ID_HEADER).ok_or(AuthError::MissingIdentity)?;
    let user_id =
        value.to_str().ok().and_then(|s| s.parse::<i64>().ok()).ok_or(AuthError::InvalidIdentity)?;
    Ok(UserClaims { user_id })
}
