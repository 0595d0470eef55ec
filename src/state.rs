use serde::{Deserialize, Serialize};
use tracing::error;

use crate::SignInWithAppleError;

/// Whether the user has previously authorized this app, as reported by
/// `ASAuthorizationAppleIDProvider.getCredentialState(forUserID:)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CredentialState {
    Authorized,
    NotFound,
    Revoked,
}

impl CredentialState {
    /// Map the native `ASAuthorizationAppleIDProviderCredentialState` code.
    ///
    /// Any code outside 1..=3 is an error, never a new state.
    pub fn from_code(code: i64) -> Result<Self, SignInWithAppleError> {
        match code {
            1 => Ok(Self::Authorized),
            2 => Ok(Self::NotFound),
            3 => Ok(Self::Revoked),
            other => {
                error!(code = other, "unrecognized credential state returned by the OS");
                Err(SignInWithAppleError::UnknownCredentialState(other))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "AUTHORIZED",
            Self::NotFound => "NOTFOUND",
            Self::Revoked => "REVOKED",
        }
    }
}
