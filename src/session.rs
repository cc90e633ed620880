use std::rc::Rc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::{
    error::ShellError,
    models::{AuthState, Identity},
    store::{Signal, Store, Subscription},
};

/// SessionSource
///
/// The capability set the shell needs from an identity provider. The shell is generic
/// over this trait and never sees a provider's wire protocol.
pub trait SessionSource {
    fn auth_state(&self) -> AuthState;
    fn on_auth_state_change(&self, callback: Box<dyn Fn(&AuthState)>) -> Subscription;
    fn redirect_to_login(&self, return_path: &str);
}

/// Characters that would end or split a query parameter value. `/` stays readable.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?');

/// Builds the login location carrying the page the user originally asked for.
pub fn login_location(login_path: &str, return_path: &str) -> String {
    if return_path.is_empty() || return_path == "/" || return_path == login_path {
        login_path.to_string()
    } else {
        let encoded = utf8_percent_encode(return_path, QUERY_VALUE);
        format!("{login_path}?redirect_url={encoded}")
    }
}

/// LocalSession
///
/// In-process session source. Starts `Unknown` and is resolved exactly once by the
/// host (`resolve`), after which `sign_in` / `sign_out` move it between the two
/// resolved states. There is deliberately no way back to `Unknown`.
///
/// Redirects go through the navigate function supplied at construction, the same way
/// a hosted identity provider is handed the router's navigate callback.
#[derive(Clone)]
pub struct LocalSession {
    state: Store<AuthState>,
    login_path: String,
    navigate: Rc<dyn Fn(&str)>,
}

impl LocalSession {
    pub fn new(login_path: &str, navigate: impl Fn(&str) + 'static) -> Self {
        Self {
            state: Store::new(AuthState::Unknown),
            login_path: login_path.to_string(),
            navigate: Rc::new(navigate),
        }
    }

    /// Delivers the first determination of who the user is.
    ///
    /// A failed determination fails closed: the session becomes `SignedOut`.
    pub fn resolve(&self, determination: Result<Option<Identity>, ShellError>) {
        let next = match determination {
            Ok(Some(identity)) => AuthState::SignedIn(identity),
            Ok(None) => AuthState::SignedOut,
            Err(error) => {
                tracing::warn!(%error, "session unresolvable, treating as signed out");
                AuthState::SignedOut
            }
        };
        self.state.set_if_changed(next);
    }

    pub fn sign_in(&self, identity: Identity) {
        self.state.set_if_changed(AuthState::SignedIn(identity));
    }

    pub fn sign_out(&self) {
        self.state.set_if_changed(AuthState::SignedOut);
    }

    pub fn state(&self) -> Signal<AuthState> {
        self.state.signal()
    }

    pub fn listener_count(&self) -> usize {
        self.state.subscriber_count()
    }
}

impl SessionSource for LocalSession {
    fn auth_state(&self) -> AuthState {
        self.state.get()
    }

    fn on_auth_state_change(&self, callback: Box<dyn Fn(&AuthState)>) -> Subscription {
        self.state.subscribe(move |state: &AuthState| callback(state))
    }

    fn redirect_to_login(&self, return_path: &str) {
        (self.navigate)(&login_location(&self.login_path, return_path));
    }
}
