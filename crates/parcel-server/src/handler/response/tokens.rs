use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::service::IssuedToken;

/// A freshly issued bearer token.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreated {
    /// Signed JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: Timestamp,
}

impl From<IssuedToken> for TokenCreated {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}
