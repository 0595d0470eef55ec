//! # Sign in with Apple
//!
//! This crate drives Apple's native "Sign in with Apple" flow through the
//! [AuthenticationServices](https://developer.apple.com/documentation/authenticationservices) framework
//! and exposes it as three plain operations:
//! - [is_supported](SignInWithApple::is_supported): whether the running OS version has the API
//!   (iOS 13 and macOS 10.15 and later).
//! - [get_state](SignInWithApple::get_state): whether a user previously authorized the app, was revoked or is unknown.
//! - [authorize](SignInWithApple::authorize): present the system sign-in sheet and return the resulting
//!   [ASAuthorizationAppleIDCredential](https://developer.apple.com/documentation/authenticationservices/asauthorizationappleidcredential)
//!   converted into a serde-friendly [Credential].
//!
//! The framework reports results through completion blocks and an
//! [ASAuthorizationControllerDelegate](https://developer.apple.com/documentation/authenticationservices/asauthorizationcontrollerdelegate).
//! Each call gets its own one-shot [StateCompletion] or [AuthorizationDelegate] that settles the
//! returned future exactly once.
//!
//! This crate doesn't validate tokens, keep sessions or talk to the network. Send the
//! [identity token](Credential::identity_token) to your backend and validate it there.
//!
//! To implement Sign In with Apple:
//! - You have to have a valid, paid Apple developer account.
//! - Make sure `Sign In with Apple` Capability is enabled on your app identifier.
//! - Enable the `Sign In with Apple` Capability in Xcode as well.
//!
//! Apple will only provide the email field (and name if requested) the first time a user authorizes the app.
//! Subsequent authorization requests only yield the [user id](Credential::user) field.
//!
//! ## Usage
//!
//! ```ignore
//! use sign_in_with_apple::{AuthorizationOptions, NativeServices, Scope, SignInWithApple};
//!
//! let client = SignInWithApple::new(NativeServices::new());
//!
//! if client.is_supported() {
//!     let options = AuthorizationOptions::new().scope(Scope::Email).scope(Scope::FullName);
//!     let authorization = client.authorize(options).await?;
//!
//!     let state = client.get_state(&authorization.credential.user).await?;
//!     dbg!(state);
//! }
//! ```
//!
//! ## Overlapping requests
//!
//! Only one authorization runs at a time. By default a second [authorize](SignInWithApple::authorize)
//! while one is waiting fails with [SignInWithAppleError::AuthorizationInProgress].
//! Use [OverlapPolicy::Queue] to wait for the running one instead.
//! An authorization counts as running until the OS calls its delegate, even if the
//! future awaiting it was dropped.
//!
mod config;
mod credential;
mod error;
#[cfg(any(target_os = "ios", target_os = "macos"))]
mod native;
mod request;
mod scope;
mod services;
mod state;
mod version;

pub use config::{Config, OverlapPolicy, MIN_SUPPORTED_OS_VERSION};
pub use credential::{
    Authorization, Credential, NativeAuthorization, NativeCredential, PersonName, RealUserStatus,
};
pub use error::SignInWithAppleError;
#[cfg(any(target_os = "ios", target_os = "macos"))]
pub use native::NativeServices;
pub use request::{AuthorizationOptions, AuthorizationRequest};
pub use scope::{Scope, UnsupportedScope, EMAIL_SCOPE, FULL_NAME_SCOPE};
pub use services::{AuthorizationDelegate, AuthorizationServices, NativeError, StateCompletion};
pub use state::CredentialState;
pub use version::OsVersion;

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

#[derive(Debug)]
pub struct SignInWithApple<S> {
    services: S,
    config: Config,
    // Held by the delegate of the running authorization, not by the caller's future
    in_flight: Arc<Mutex<()>>,
}

impl<S: AuthorizationServices> SignInWithApple<S> {
    pub fn new(services: S) -> Self {
        Self::with_config(services, Config::default())
    }

    pub fn with_config(services: S, config: Config) -> Self {
        Self {
            services,
            config,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    /// True if the running OS is recent enough for Sign in with Apple
    pub fn is_supported(&self) -> bool {
        self.services
            .os_version()
            .is_at_least(&self.config.minimum_os_version)
    }

    /// Look up whether `user` (a [Credential::user] from an earlier authorization)
    /// is still authorized for this app.
    pub async fn get_state(&self, user: &str) -> Result<CredentialState, SignInWithAppleError> {
        if user.is_empty() {
            return Err(SignInWithAppleError::MissingUser);
        }

        self.ensure_supported()?;

        let (completion, rx) = StateCompletion::new();
        self.services.credential_state(user, completion);

        let state = services::settled(rx).await?;
        debug!(state = state.as_str(), "credential state query settled");

        Ok(state)
    }

    /// Present the Sign in with Apple sheet and wait for the user to finish.
    pub async fn authorize(
        &self,
        options: AuthorizationOptions,
    ) -> Result<Authorization, SignInWithAppleError> {
        self.ensure_supported()?;

        let in_flight = self.acquire_in_flight().await?;

        let request = AuthorizationRequest::from_options(&options);
        let (delegate, rx) = AuthorizationDelegate::new(in_flight);

        info!(
            user_constrained = request.user.is_some(),
            scopes = ?request.native_scopes(),
            "performing authorization request"
        );
        self.services.perform_request(request, delegate);

        services::settled(rx).await
    }

    fn ensure_supported(&self) -> Result<(), SignInWithAppleError> {
        if self.is_supported() {
            Ok(())
        } else {
            debug!(
                version = %self.services.os_version(),
                minimum = %self.config.minimum_os_version,
                "Sign in with Apple is not available"
            );
            Err(SignInWithAppleError::NotSupported)
        }
    }

    async fn acquire_in_flight(&self) -> Result<OwnedMutexGuard<()>, SignInWithAppleError> {
        let in_flight = Arc::clone(&self.in_flight);

        match self.config.overlap_policy {
            OverlapPolicy::Reject => in_flight
                .try_lock_owned()
                .map_err(|_| SignInWithAppleError::AuthorizationInProgress),
            OverlapPolicy::Queue => Ok(in_flight.lock_owned().await),
        }
    }
}
