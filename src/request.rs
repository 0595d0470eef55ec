use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Scope;

/// Options for [authorize](crate::SignInWithApple::authorize), as sent by the host:
/// `{"user": "...", "scopes": ["EMAIL", "FULLNAME"]}`.
///
/// Scope names stay plain strings so unsupported ones can be reported and skipped.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl AuthorizationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the request to a user identifier from a previous authorization
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scopes
            .get_or_insert_with(Vec::new)
            .push(scope.name().to_string());
        self
    }
}

/// The native `ASAuthorizationAppleIDRequest` to submit
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthorizationRequest {
    pub user: Option<String>,
    /// `None` leaves `requestedScopes` untouched, `Some` sets it (possibly to an empty list)
    pub requested_scopes: Option<Vec<Scope>>,
}

impl AuthorizationRequest {
    pub fn from_options(options: &AuthorizationOptions) -> Self {
        let requested_scopes = options.scopes.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|name| match name.parse::<Scope>() {
                    Ok(scope) => Some(scope),
                    Err(e) => {
                        warn!(scope = %name, "{}", e);
                        None
                    }
                })
                .collect()
        });

        Self {
            user: options.user.clone(),
            requested_scopes,
        }
    }

    /// Native tokens of the requested scopes, in request order
    pub fn native_scopes(&self) -> Vec<&'static str> {
        self.requested_scopes
            .iter()
            .flatten()
            .map(Scope::native_token)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_options_builds_a_bare_request() {
        let request = AuthorizationRequest::from_options(&AuthorizationOptions::new());
        assert_eq!(request, AuthorizationRequest::default());
        assert!(request.native_scopes().is_empty());
    }

    #[test]
    fn user_constrains_the_request() {
        let request =
            AuthorizationRequest::from_options(&AuthorizationOptions::new().user("001234.abc"));
        assert_eq!(request.user.as_deref(), Some("001234.abc"));
        assert_eq!(request.requested_scopes, None);
    }

    #[test]
    fn unsupported_scopes_are_skipped() {
        let options: AuthorizationOptions =
            serde_json::from_str(r#"{"scopes":["EMAIL","BOGUS","FULLNAME"]}"#).unwrap();
        let request = AuthorizationRequest::from_options(&options);

        assert_eq!(
            request.requested_scopes,
            Some(vec![Scope::Email, Scope::FullName])
        );
        assert_eq!(request.native_scopes(), ["email", "full_name"]);
    }

    #[test]
    fn all_unsupported_still_sets_an_empty_list() {
        let options = AuthorizationOptions {
            scopes: Some(vec!["PHONE".into()]),
            ..Default::default()
        };
        assert_eq!(
            AuthorizationRequest::from_options(&options).requested_scopes,
            Some(vec![])
        );
    }
}
