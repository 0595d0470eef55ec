mod common;

use common::{ios_client, FakeServices, StateReply};
use sign_in_with_apple::{
    Config, CredentialState, NativeError, OsVersion, SignInWithApple, SignInWithAppleError,
};

#[test]
fn support_follows_the_os_major_version() {
    for (version, supported) in [
        ("12.5.7", false),
        ("13.0", true),
        ("13.4.1", true),
        ("17.2", true),
        ("", false),
    ] {
        let client = ios_client(FakeServices::new(version));
        assert_eq!(client.is_supported(), supported, "iOS {version:?}");
    }
}

#[test]
fn macos_minimum_accepts_newer_majors() {
    let config = Config::default().minimum_os_version(OsVersion::new(10, 15, 0));

    for (version, supported) in [
        ("10.14.6", false),
        ("10.15", true),
        ("11.7.10", true),
        ("12.6", true),
    ] {
        let client = SignInWithApple::with_config(FakeServices::new(version), config.clone());
        assert_eq!(client.is_supported(), supported, "macOS {version:?}");
    }
}

#[tokio::test]
async fn macos_12_reaches_the_os() {
    let client = SignInWithApple::with_config(
        FakeServices::new("12.6").state_reply(StateReply::Code(1)),
        Config::default().minimum_os_version(OsVersion::new(10, 15, 0)),
    );

    assert_eq!(
        client.get_state("001234.abc").await,
        Ok(CredentialState::Authorized)
    );
}

#[test]
fn minimum_version_is_configurable() {
    let client = SignInWithApple::with_config(
        FakeServices::new("13.4"),
        Config::default().minimum_os_version(OsVersion::new(14, 0, 0)),
    );
    assert!(!client.is_supported());
}

#[tokio::test]
async fn maps_every_known_state() {
    for (code, expected) in [
        (1, CredentialState::Authorized),
        (2, CredentialState::NotFound),
        (3, CredentialState::Revoked),
    ] {
        let client =
            ios_client(FakeServices::new("16.1").state_reply(StateReply::Code(code)));

        assert_eq!(client.get_state("001234.abc").await, Ok(expected));
        assert_eq!(
            *client.services().queried_users.lock().unwrap(),
            ["001234.abc"]
        );
    }
}

#[tokio::test]
async fn unknown_state_asks_for_a_report() {
    let client = ios_client(FakeServices::new("16.1").state_reply(StateReply::Code(99)));

    let err = client.get_state("001234.abc").await.unwrap_err();
    assert_eq!(err, SignInWithAppleError::UnknownCredentialState(99));
    assert!(err.to_string().contains("please report an issue"));
    assert!(err.is_protocol_inconsistency());
}

#[tokio::test]
async fn os_error_message_is_passed_through() {
    let client = ios_client(FakeServices::new("16.1").state_reply(StateReply::Error(
        NativeError::new("The operation couldn’t be completed. (com.apple.AuthenticationServices.AuthorizationError error 1000.)")
            .with_code(1000),
    )));

    assert_eq!(
        client.get_state("001234.abc").await.unwrap_err().to_string(),
        "The operation couldn’t be completed. (com.apple.AuthenticationServices.AuthorizationError error 1000.)"
    );
}

#[tokio::test]
async fn empty_user_fails_before_the_os() {
    let client = ios_client(FakeServices::new("16.1"));

    let err = client.get_state("").await.unwrap_err();
    assert_eq!(err.to_string(), "The 'user' parameter is mandatory");
    assert_eq!(client.services().os_calls(), 0);
}

#[tokio::test]
async fn user_is_checked_before_support() {
    let client = ios_client(FakeServices::new("12.0"));
    assert_eq!(
        client.get_state("").await,
        Err(SignInWithAppleError::MissingUser)
    );
}

#[tokio::test]
async fn unsupported_os_fails_before_the_os() {
    let client = ios_client(FakeServices::new("12.5"));

    assert_eq!(
        client.get_state("001234.abc").await,
        Err(SignInWithAppleError::NotSupported)
    );
    assert_eq!(client.services().os_calls(), 0);
}

#[tokio::test]
async fn dropped_completion_is_abandoned() {
    let client = ios_client(FakeServices::new("16.1").state_reply(StateReply::Drop));

    assert_eq!(
        client.get_state("001234.abc").await,
        Err(SignInWithAppleError::Abandoned)
    );
}
