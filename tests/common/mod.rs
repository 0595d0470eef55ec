#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sign_in_with_apple::{
    AuthorizationDelegate, AuthorizationRequest, AuthorizationServices, Config,
    NativeAuthorization, NativeError, OsVersion, SignInWithApple, StateCompletion,
};

/// Config with the iOS minimum, whatever platform the tests run on
pub fn ios_config() -> Config {
    Config::default().minimum_os_version(OsVersion::new(13, 0, 0))
}

pub fn ios_client(services: FakeServices) -> SignInWithApple<FakeServices> {
    SignInWithApple::with_config(services, ios_config())
}

/// What the fake OS does with a credential state query
#[derive(Clone)]
pub enum StateReply {
    Code(i64),
    Error(NativeError),
    Drop,
}

/// What the fake OS does with an authorization request
#[derive(Clone)]
pub enum AuthorizationReply {
    Complete(NativeAuthorization),
    Error(NativeError),
    /// Keep the delegate until the test calls [FakeServices::take_pending]
    Hold,
    Drop,
}

/// Scripted stand-in for AuthenticationServices
pub struct FakeServices {
    pub version: OsVersion,
    state_reply: StateReply,
    authorization_reply: AuthorizationReply,
    state_calls: AtomicUsize,
    pub queried_users: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<AuthorizationRequest>>,
    pending: Mutex<Vec<AuthorizationDelegate>>,
}

impl FakeServices {
    pub fn new(version: &str) -> Self {
        Self {
            version: OsVersion::parse(version),
            state_reply: StateReply::Code(1),
            authorization_reply: AuthorizationReply::Hold,
            state_calls: AtomicUsize::new(0),
            queried_users: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn state_reply(mut self, reply: StateReply) -> Self {
        self.state_reply = reply;
        self
    }

    pub fn authorization_reply(mut self, reply: AuthorizationReply) -> Self {
        self.authorization_reply = reply;
        self
    }

    /// Number of times the fake OS was contacted
    pub fn os_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst) + self.requests.lock().unwrap().len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn take_pending(&self) -> Option<AuthorizationDelegate> {
        let mut pending = self.pending.lock().unwrap();
        if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        }
    }

    /// Wait until `count` requests are held
    pub async fn wait_for_pending(&self, count: usize) {
        while self.pending_count() < count {
            tokio::task::yield_now().await;
        }
    }
}

impl AuthorizationServices for FakeServices {
    fn os_version(&self) -> OsVersion {
        self.version
    }

    fn credential_state(&self, user: &str, completion: StateCompletion) {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.queried_users.lock().unwrap().push(user.to_string());

        match self.state_reply.clone() {
            StateReply::Code(code) => completion.complete(code),
            StateReply::Error(error) => completion.fail(error),
            StateReply::Drop => drop(completion),
        }
    }

    fn perform_request(&self, request: AuthorizationRequest, delegate: AuthorizationDelegate) {
        self.requests.lock().unwrap().push(request);

        match self.authorization_reply.clone() {
            AuthorizationReply::Complete(authorization) => {
                delegate.did_complete_with_authorization(authorization)
            }
            AuthorizationReply::Error(error) => delegate.did_complete_with_error(error),
            AuthorizationReply::Hold => self.pending.lock().unwrap().push(delegate),
            AuthorizationReply::Drop => drop(delegate),
        }
    }
}

/// Log sink for asserting on `tracing` output
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Run `f` with a subscriber writing into this sink
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || sink.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
