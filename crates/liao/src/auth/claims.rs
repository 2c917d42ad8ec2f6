//! JWT claims.

use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Claims carried in an issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per JWT convention.
    pub sub: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl Claims {
    /// The numeric user id this token was issued for.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parses_subject() {
        let claims = Claims {
            sub: "42".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert_eq!(claims.user_id().unwrap(), 42);

        let bad = Claims {
            sub: "not-a-number".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert!(bad.user_id().is_err());
    }
}
