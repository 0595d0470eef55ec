use thiserror::Error;

/// A precondition, OS-reported or protocol error
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInWithAppleError {
    /// `get_state` was called with an empty user identifier
    #[error("The 'user' parameter is mandatory")]
    MissingUser,
    /// The running OS is older than the configured minimum version
    #[error("Not supported")]
    NotSupported,
    /// Another authorization is still waiting for its delegate callback and
    /// the client is configured with [OverlapPolicy::Reject](crate::OverlapPolicy::Reject)
    #[error("An authorization request is already in progress")]
    AuthorizationInProgress,
    /// The AuthenticationServices framework reported an error. Contains its
    /// localized description verbatim.
    #[error("{0}")]
    Os(String),
    /// The credential state query returned a code this crate doesn't know about.
    /// The OS enum has grown, this crate needs an update.
    #[error("Invalid credential state: {0}, please report an issue at the plugin repository!")]
    UnknownCredentialState(i64),
    /// The controller signalled completion without handing over a credential
    #[error("auth error: no credential returned.")]
    NoCredential,
    /// The completion handle or delegate was dropped without being called
    #[error("auth error: the request was dropped before it completed.")]
    Abandoned,
}

impl SignInWithAppleError {
    /// True for errors that mean this crate is out of sync with the OS contract it wraps
    pub fn is_protocol_inconsistency(&self) -> bool {
        matches!(
            self,
            Self::UnknownCredentialState(_) | Self::NoCredential | Self::Abandoned
        )
    }
}

impl From<crate::NativeError> for SignInWithAppleError {
    fn from(value: crate::NativeError) -> Self {
        Self::Os(value.localized_description)
    }
}
