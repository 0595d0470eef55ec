use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of `ASAuthorizationScopeEmail`. Native requests use the framework constant.
pub const EMAIL_SCOPE: &str = "email";
/// Value of `ASAuthorizationScopeFullName`. Native requests use the framework constant.
pub const FULL_NAME_SCOPE: &str = "full_name";

/// User information an authorization request can ask for
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "FULLNAME")]
    FullName,
}

impl Scope {
    /// Name used by the host API (`"EMAIL"`, `"FULLNAME"`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::FullName => "FULLNAME",
        }
    }

    /// Native `ASAuthorizationScope` token, as reported in [Credential::authorized_scopes](crate::Credential::authorized_scopes)
    pub fn native_token(&self) -> &'static str {
        match self {
            Self::Email => EMAIL_SCOPE,
            Self::FullName => FULL_NAME_SCOPE,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("Unsupported scope: {0}, use either EMAIL or FULLNAME")]
pub struct UnsupportedScope(pub String);

impl FromStr for Scope {
    type Err = UnsupportedScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL" => Ok(Self::Email),
            "FULLNAME" => Ok(Self::FullName),
            other => Err(UnsupportedScope(other.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
