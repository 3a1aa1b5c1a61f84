use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::UserRole;
use crate::errors::Error;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub user_name: String,
    pub display_name: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

impl TokenClaims {
    pub fn require_role(&self, role: UserRole) -> Result<(), Error> {
        if self.role != role {
            return Err(Error::forbidden(
                "You do not have permission to access this resource",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenClaims {{ user_id: {}, user_name: {}, role: {}, iat: {}, exp: {} }}",
            self.user_id, self.user_name, self.role, self.iat, self.exp
        )
    }
}
