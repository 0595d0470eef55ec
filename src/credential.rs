use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use tracing::warn;

/// Indicates whether the user appears to be a real person.
/// Apple recommends using this to mitigate fraud.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RealUserStatus {
    Unsupported = 0,
    Unknown = 1,
    LikelyReal = 2,
}

impl RealUserStatus {
    /// Map the native `ASUserDetectionStatus` value. Unknown values are dropped.
    pub fn from_native(status: i64) -> Option<Self> {
        match status {
            0 => Some(Self::Unsupported),
            1 => Some(Self::Unknown),
            2 => Some(Self::LikelyReal),
            other => {
                warn!(status = other, "ignoring unrecognized real user status");
                None
            }
        }
    }
}

/// The user's name, if the `FULLNAME` scope was requested and granted.
/// Mirrors `NSPersonNameComponents`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// Credential as handed over by `ASAuthorizationAppleIDCredential`
/// (or `ASPasswordCredential`, which only fills `user` and `password`).
///
/// Security artifacts are raw bytes, the way the framework returns them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NativeCredential {
    pub email: Option<String>,
    pub full_name: Option<PersonName>,
    pub real_user_status: Option<i64>,
    pub state: Option<String>,
    pub user: String,
    pub password: Option<String>,
    pub access_token: Option<Vec<u8>>,
    pub authorization_code: Option<Vec<u8>>,
    pub identity_token: Option<Vec<u8>>,
    pub authorized_scopes: Option<Vec<String>>,
}

/// Result of `authorizationController(_:didCompleteWithAuthorization:)`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NativeAuthorization {
    /// Class name of the provider that created the request
    pub provider: String,
    pub credential: Option<NativeCredential>,
}

/// Credential returned to the caller, with every security artifact decoded to text.
///
/// Absent fields are left out of the serialized form.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// The user's email address, only on the first authorization with the `EMAIL` scope.
    /// Either the real address or a private relay address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The user's name, only on the first authorization with the `FULLNAME` scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_user_status: Option<RealUserStatus>,
    /// Opaque state echoed back from the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Stable user identifier, shared across the apps of one development team.
    /// Pass it to [get_state](crate::SignInWithApple::get_state) later on.
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Short-lived code for Apple's token endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    /// JWT to send to your backend for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_scopes: Option<Vec<String>>,
}

impl From<NativeCredential> for Credential {
    fn from(native: NativeCredential) -> Self {
        Self {
            email: native.email,
            full_name: native.full_name,
            real_user_status: native.real_user_status.and_then(RealUserStatus::from_native),
            state: native.state,
            user: native.user,
            password: native.password,
            access_token: native.access_token.map(decode_text),
            authorization_code: native.authorization_code.map(decode_text),
            identity_token: native.identity_token.map(decode_text),
            authorized_scopes: native.authorized_scopes,
        }
    }
}

/// Outcome of one interactive authorization
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub provider: String,
    pub credential: Credential,
}

// Tokens are UTF-8 by contract. Their contents are not validated here.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("credential artifact is not valid UTF-8, replacing invalid sequences");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}
