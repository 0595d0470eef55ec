//! The seam between this crate and the operating system.
//!
//! AuthenticationServices reports results through completion blocks and a
//! controller delegate. Implementations of [AuthorizationServices] hand those
//! results to the one-shot handles passed in, which resolve the future the
//! caller is awaiting. Each handle's terminal methods take `self`, so a
//! request settles at most once and only one of its outcomes can happen.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, OwnedMutexGuard};
use tracing::{debug, error};

use crate::{
    Authorization, AuthorizationRequest, CredentialState, NativeAuthorization, OsVersion,
    SignInWithAppleError,
};

/// Error reported by the OS (an `NSError`)
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NativeError {
    pub localized_description: String,
    pub domain: Option<String>,
    pub code: Option<i64>,
}

impl NativeError {
    pub fn new(localized_description: impl Into<String>) -> Self {
        Self {
            localized_description: localized_description.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.localized_description)
    }
}

/// The platform's authorization subsystem.
pub trait AuthorizationServices {
    /// Version of the running OS
    fn os_version(&self) -> OsVersion;

    /// Ask `ASAuthorizationAppleIDProvider` for the credential state of `user`.
    /// The result must be delivered through `completion`.
    fn credential_state(&self, user: &str, completion: StateCompletion);

    /// Run one `ASAuthorizationController` with `request`, reporting to `delegate`.
    fn perform_request(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate);
}

impl<S: AuthorizationServices + ?Sized> AuthorizationServices for Arc<S> {
    fn os_version(&self) -> OsVersion {
        (**self).os_version()
    }

    fn credential_state(&self, user: &str, completion: StateCompletion) {
        (**self).credential_state(user, completion)
    }

    fn perform_request(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate) {
        (**self).perform_request(request, delegate)
    }
}

impl<S: AuthorizationServices + ?Sized> AuthorizationServices for Box<S> {
    fn os_version(&self) -> OsVersion {
        (**self).os_version()
    }

    fn credential_state(&self, user: &str, completion: StateCompletion) {
        (**self).credential_state(user, completion)
    }

    fn perform_request(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate) {
        (**self).perform_request(request, delegate)
    }
}

pub(crate) type Settled<T> = oneshot::Receiver<Result<T, SignInWithAppleError>>;

fn settle<T>(tx: oneshot::Sender<Result<T, SignInWithAppleError>>, result: Result<T, SignInWithAppleError>) {
    if tx.send(result).is_err() {
        debug!("caller went away before the OS answered, dropping result");
    }
}

/// Completion handler of a credential state query
#[must_use = "the query only settles when the completion is called"]
#[derive(Debug)]
pub struct StateCompletion {
    tx: oneshot::Sender<Result<CredentialState, SignInWithAppleError>>,
}

impl StateCompletion {
    pub(crate) fn new() -> (Self, Settled<CredentialState>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// The OS answered with a raw `ASAuthorizationAppleIDProviderCredentialState`
    pub fn complete(self, code: i64) {
        settle(self.tx, CredentialState::from_code(code));
    }

    pub fn fail(self, error: NativeError) {
        debug!(error = %error, "credential state query failed");
        settle(self.tx, Err(error.into()));
    }
}

/// `ASAuthorizationControllerDelegate` of one authorization request.
///
/// Holds the client's in-flight slot until it is called or dropped, so the
/// request keeps counting as running after its caller gave up on it.
#[must_use = "the authorization only settles when the delegate is called"]
#[derive(Debug)]
pub struct AuthorizationDelegate {
    tx: oneshot::Sender<Result<Authorization, SignInWithAppleError>>,
    _in_flight: OwnedMutexGuard<()>,
}

impl AuthorizationDelegate {
    pub(crate) fn new(in_flight: OwnedMutexGuard<()>) -> (Self, Settled<Authorization>) {
        let (tx, rx) = oneshot::channel();
        let delegate = Self {
            tx,
            _in_flight: in_flight,
        };
        (delegate, rx)
    }

    /// `authorizationController(_:didCompleteWithAuthorization:)`
    pub fn did_complete_with_authorization(self, authorization: NativeAuthorization) {
        let result = match authorization.credential {
            Some(credential) => Ok(Authorization {
                provider: authorization.provider,
                credential: credential.into(),
            }),
            None => {
                error!(
                    provider = %authorization.provider,
                    "authorization completed without a credential"
                );
                Err(SignInWithAppleError::NoCredential)
            }
        };

        settle(self.tx, result);
    }

    /// `authorizationController(_:didCompleteWithError:)`
    pub fn did_complete_with_error(self, error: NativeError) {
        debug!(error = %error, domain = ?error.domain, code = ?error.code, "authorization failed");
        settle(self.tx, Err(error.into()));
    }
}

/// Wait for a handle to settle. A handle dropped unanswered is an error.
pub(crate) async fn settled<T>(rx: Settled<T>) -> Result<T, SignInWithAppleError> {
    rx.await.unwrap_or_else(|_| {
        error!("completion handler was dropped without being called");
        Err(SignInWithAppleError::Abandoned)
    })
}
