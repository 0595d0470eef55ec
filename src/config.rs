use serde::{Deserialize, Serialize};

use crate::OsVersion;

/// First macOS release shipping `ASAuthorizationAppleIDProvider` (10.15).
#[cfg(target_os = "macos")]
pub const MIN_SUPPORTED_OS_VERSION: OsVersion = OsVersion::new(10, 15, 0);

/// First iOS release shipping `ASAuthorizationAppleIDProvider` (13.0).
#[cfg(not(target_os = "macos"))]
pub const MIN_SUPPORTED_OS_VERSION: OsVersion = OsVersion::new(13, 0, 0);

/// What [authorize](crate::SignInWithApple::authorize) does when another
/// authorization is still waiting for its delegate.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Fail the new call with [AuthorizationInProgress](crate::SignInWithAppleError::AuthorizationInProgress)
    #[default]
    Reject,
    /// Wait for the in-flight call to settle, then run
    Queue,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Oldest OS version reported as supported
    pub minimum_os_version: OsVersion,
    pub overlap_policy: OverlapPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_os_version: MIN_SUPPORTED_OS_VERSION,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl Config {
    pub fn minimum_os_version(mut self, minimum: OsVersion) -> Self {
        self.minimum_os_version = minimum;
        self
    }

    pub fn overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }
}
