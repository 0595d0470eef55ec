//! [AuthorizationServices] backed by the AuthenticationServices framework.

use std::cell::{Cell, RefCell};

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::{AnyObject, ProtocolObject};
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_authentication_services::{
    ASAuthorization, ASAuthorizationAppleIDCredential, ASAuthorizationAppleIDProvider,
    ASAuthorizationAppleIDProviderCredentialState, ASAuthorizationController,
    ASAuthorizationControllerDelegate, ASAuthorizationRequest, ASAuthorizationScope,
    ASAuthorizationScopeEmail, ASAuthorizationScopeFullName, ASPasswordCredential,
};
use objc2_foundation::{
    NSArray, NSError, NSObject, NSObjectProtocol, NSPersonNameComponents, NSProcessInfo, NSString,
};
use tracing::{debug, warn};

use crate::{
    AuthorizationDelegate, AuthorizationRequest, AuthorizationServices, NativeAuthorization,
    NativeCredential, NativeError, OsVersion, PersonName, Scope, StateCompletion,
};

thread_local! {
    // The controller only holds its delegate weakly and nothing else retains
    // the controller. Both live here until the next request replaces them,
    // which can't happen before the delegate has been called or dropped.
    static IN_FLIGHT: RefCell<Option<(Retained<ASAuthorizationController>, Retained<ControllerDelegate>)>> =
        const { RefCell::new(None) };
}

struct DelegateIvars {
    delegate: Cell<Option<AuthorizationDelegate>>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "SignInWithAppleControllerDelegate"]
    #[ivars = DelegateIvars]
    struct ControllerDelegate;

    unsafe impl NSObjectProtocol for ControllerDelegate {}

    unsafe impl ASAuthorizationControllerDelegate for ControllerDelegate {
        #[unsafe(method(authorizationController:didCompleteWithAuthorization:))]
        fn did_complete_with_authorization(
            &self,
            _controller: &ASAuthorizationController,
            authorization: &ASAuthorization,
        ) {
            match self.ivars().delegate.take() {
                Some(delegate) => {
                    delegate.did_complete_with_authorization(native_authorization(authorization))
                }
                None => warn!("authorization delegate called twice, ignoring"),
            }
        }

        #[unsafe(method(authorizationController:didCompleteWithError:))]
        fn did_complete_with_error(&self, _controller: &ASAuthorizationController, error: &NSError) {
            match self.ivars().delegate.take() {
                Some(delegate) => delegate.did_complete_with_error(native_error(error)),
                None => warn!("authorization delegate called twice, ignoring"),
            }
        }
    }
);

impl ControllerDelegate {
    fn new(mtm: MainThreadMarker, delegate: AuthorizationDelegate) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(DelegateIvars {
            delegate: Cell::new(Some(delegate)),
        });
        unsafe { msg_send![super(this), init] }
    }
}

/// The real Sign in with Apple implementation.
///
/// [perform_request](AuthorizationServices::perform_request) must run on the
/// main thread, like every other AppKit/UIKit presentation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeServices;

impl NativeServices {
    pub fn new() -> Self {
        Self
    }
}

impl AuthorizationServices for NativeServices {
    fn os_version(&self) -> OsVersion {
        let version = NSProcessInfo::processInfo().operatingSystemVersion();
        let component = |value: isize| u32::try_from(value).unwrap_or(0);

        OsVersion::new(
            component(version.majorVersion),
            component(version.minorVersion),
            component(version.patchVersion),
        )
    }

    fn credential_state(&self, user: &str, completion: StateCompletion) {
        let provider = unsafe { ASAuthorizationAppleIDProvider::new() };
        let completion = Cell::new(Some(completion));

        let block = RcBlock::new(
            move |state: ASAuthorizationAppleIDProviderCredentialState, error: *mut NSError| {
                let Some(completion) = completion.take() else {
                    return;
                };

                match unsafe { error.as_ref() } {
                    Some(error) => completion.fail(native_error(error)),
                    None => completion.complete(state.0 as i64),
                }
            },
        );

        unsafe {
            provider.getCredentialStateForUserID_completion(&NSString::from_str(user), &block);
        }
    }

    fn perform_request(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate) {
        let Some(mtm) = MainThreadMarker::new() else {
            delegate.did_complete_with_error(NativeError::new(
                "Sign in with Apple must be started from the main thread",
            ));
            return;
        };

        let provider = unsafe { ASAuthorizationAppleIDProvider::new() };
        let native_request = unsafe { provider.createRequest() };

        if let Some(user) = &request.user {
            unsafe { native_request.setUser(Some(&NSString::from_str(user))) };
        }

        if let Some(requested) = &request.requested_scopes {
            let scopes: Vec<&ASAuthorizationScope> =
                requested.iter().map(|scope| native_scope(*scope)).collect();
            let scopes = NSArray::from_slice(&scopes);
            unsafe { native_request.setRequestedScopes(Some(&scopes)) };
        }

        let base: &ASAuthorizationRequest = &native_request;
        let requests = NSArray::from_slice(&[base]);

        let controller = unsafe {
            ASAuthorizationController::initWithAuthorizationRequests(
                ASAuthorizationController::alloc(mtm),
                &requests,
            )
        };
        let delegate = ControllerDelegate::new(mtm, delegate);

        unsafe {
            controller.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
            controller.performRequests();
        }

        IN_FLIGHT.with(|slot| {
            if slot.replace(Some((controller, delegate))).is_some() {
                debug!("releasing controller of the previous authorization");
            }
        });
    }
}

fn native_scope(scope: Scope) -> &'static ASAuthorizationScope {
    unsafe {
        match scope {
            Scope::Email => ASAuthorizationScopeEmail,
            Scope::FullName => ASAuthorizationScopeFullName,
        }
    }
}

fn native_error(error: &NSError) -> NativeError {
    NativeError::new(error.localizedDescription().to_string())
        .with_domain(error.domain().to_string())
        .with_code(error.code() as i64)
}

fn native_authorization(authorization: &ASAuthorization) -> NativeAuthorization {
    let provider = unsafe { authorization.provider() };
    let provider: &AnyObject = (*provider).as_ref();
    let credential = unsafe { authorization.credential() };
    let credential: &AnyObject = (*credential).as_ref();

    NativeAuthorization {
        provider: provider.class().name().to_string_lossy().into_owned(),
        credential: native_credential(credential),
    }
}

fn native_credential(credential: &AnyObject) -> Option<NativeCredential> {
    if let Some(apple_id) = credential.downcast_ref::<ASAuthorizationAppleIDCredential>() {
        return Some(unsafe { apple_id_credential(apple_id) });
    }

    if let Some(password) = credential.downcast_ref::<ASPasswordCredential>() {
        return Some(unsafe {
            NativeCredential {
                user: password.user().to_string(),
                password: Some(password.password().to_string()),
                ..Default::default()
            }
        });
    }

    warn!(
        class = %credential.class().name().to_string_lossy(),
        "unsupported credential type"
    );
    None
}

unsafe fn apple_id_credential(credential: &ASAuthorizationAppleIDCredential) -> NativeCredential {
    NativeCredential {
        email: credential.email().map(|email| email.to_string()),
        full_name: credential.fullName().map(|name| person_name(&name)),
        real_user_status: Some(credential.realUserStatus().0 as i64),
        state: credential.state().map(|state| state.to_string()),
        user: credential.user().to_string(),
        password: None,
        access_token: None,
        authorization_code: credential.authorizationCode().map(|code| code.to_vec()),
        identity_token: credential.identityToken().map(|token| token.to_vec()),
        authorized_scopes: Some(
            credential
                .authorizedScopes()
                .iter()
                .map(|scope| scope.to_string())
                .collect(),
        ),
    }
}

unsafe fn person_name(name: &NSPersonNameComponents) -> PersonName {
    let text = |value: Option<Retained<NSString>>| value.map(|value| value.to_string());

    PersonName {
        name_prefix: text(name.namePrefix()),
        given_name: text(name.givenName()),
        middle_name: text(name.middleName()),
        family_name: text(name.familyName()),
        name_suffix: text(name.nameSuffix()),
        nickname: text(name.nickname()),
    }
}
