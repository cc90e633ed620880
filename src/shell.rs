//! Application shell: composes layout selection, route gating, page tags and the scroll
//! signal into one `ShellView` per navigation.
//!
//! `compose` is the pure core shared with the HTTP surface. `AppShell` wraps it in a
//! serialized event loop driven by the session source, navigation state and viewport.

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::{Rc, Weak},
    time::Duration,
};

use crate::{
    config::RoutingConfig,
    error::ShellError,
    guard,
    layout::{Chrome, InstallPrompt, select_layout},
    models::{
        AuthState, ChromeFrame, Content, GuardOutcome, LayoutKind, PageId, PageTag,
        RedirectReason, RouteRequirement, ShellView,
    },
    navigation::{Navigation, normalize_path},
    page_tag::{PageTagSync, TagTarget},
    routes::RouteTable,
    session::SessionSource,
    store::{Signal, Store, Subscription},
    viewport::{ScrollSource, ScrollTracker},
};

/// Composition
///
/// Everything decided for one `(location, auth state)` pair, before any side effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub path: String,
    pub layout: LayoutKind,
    pub requirement: RouteRequirement,
    /// `None` when no route matched.
    pub page: Option<PageId>,
    pub outcome: GuardOutcome,
    pub redirect_to: Option<String>,
    pub page_tag: PageTag,
}

impl Composition {
    pub fn content(&self) -> Content {
        match (self.outcome, self.page) {
            (GuardOutcome::Render, Some(page)) => Content::Page(page),
            (GuardOutcome::Render, None) => Content::NotFound,
            (GuardOutcome::Pending, _) => Content::Loading,
            (GuardOutcome::Redirect(_), _) => Content::Redirecting,
        }
    }

    pub fn into_view(self, scrolled: bool) -> ShellView {
        ShellView {
            content: self.content(),
            chrome: ChromeFrame::for_layout(self.layout, scrolled),
            path: self.path,
            layout: self.layout,
            outcome: self.outcome,
            redirect_to: self.redirect_to,
            page_tag: self.page_tag,
        }
    }
}

/// compose
///
/// Layout first (path only), then the guard for the matched route. An unmatched path is
/// recovered locally as a public not-found page inside whatever chrome the path selects.
pub fn compose(
    routes: &RouteTable,
    config: &RoutingConfig,
    location: &str,
    auth: &AuthState,
) -> Composition {
    let path = normalize_path(location);
    let layout = select_layout(&path, &config.admin_prefix);

    let (requirement, page) = match routes.resolve(&path) {
        Ok(route) => (route.requirement, Some(route.page)),
        Err(error) => {
            tracing::debug!(%error, "rendering not-found view");
            (RouteRequirement::Public, None)
        }
    };

    let outcome = guard::evaluate(requirement, auth);
    let redirect_to = match outcome {
        GuardOutcome::Redirect(reason) => Some(guard::redirect_location(reason, &path, config)),
        _ => None,
    };

    Composition {
        page_tag: PageTag::for_path(&path),
        path,
        layout,
        requirement,
        page,
        outcome,
        redirect_to,
    }
}

/// ShellEvent
///
/// The externally driven inputs of the shell, processed strictly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    PathChanged(String),
    AuthChanged(AuthState),
    ScrollSignalChanged(bool),
    /// The host's pending-session timer fired.
    PendingTimedOut,
}

/// ShellContext
///
/// The collaborators and configuration a shell is mounted with.
pub struct ShellContext {
    pub config: RoutingConfig,
    pub routes: RouteTable,
    pub session: Rc<dyn SessionSource>,
    pub navigation: Rc<dyn Navigation>,
    pub viewport: Rc<dyn ScrollSource>,
    pub body: Rc<dyn TagTarget>,
    pub install_prompt: Box<dyn InstallPrompt>,
}

struct ShellState {
    config: RoutingConfig,
    routes: RouteTable,
    session: Rc<dyn SessionSource>,
    navigation: Rc<dyn Navigation>,
    location: String,
    auth: AuthState,
    pending_expired: bool,
    scrolled: bool,
    chrome: Chrome,
    page_tags: PageTagSync,
    view: Store<ShellView>,
}

impl ShellState {
    fn apply(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::PathChanged(location) => {
                self.location = location;
                self.reconcile();
            }
            ShellEvent::AuthChanged(AuthState::Unknown) if self.auth.is_resolved() => {
                // A resolved session never goes back to Unknown.
                tracing::warn!(current = ?self.auth, "ignoring session regression to unknown");
            }
            ShellEvent::AuthChanged(auth) => {
                self.auth = auth;
                self.reconcile();
            }
            ShellEvent::ScrollSignalChanged(scrolled) => {
                self.scrolled = scrolled;
                let mut view = self.view.get();
                view.chrome.scrolled = scrolled;
                self.view.set_if_changed(view);
            }
            ShellEvent::PendingTimedOut => {
                if !self.auth.is_resolved() {
                    let error = ShellError::SessionUnresolvable("pending timeout elapsed".to_string());
                    tracing::warn!(%error, "failing closed");
                    self.pending_expired = true;
                    self.reconcile();
                }
            }
        }
    }

    /// The auth state the guard should see. An expired pending session gates like
    /// `SignedOut` until the source actually resolves.
    fn gating_state(&self) -> AuthState {
        match self.auth {
            AuthState::Unknown if self.pending_expired => AuthState::SignedOut,
            ref auth => auth.clone(),
        }
    }

    fn reconcile(&mut self) {
        let composition = compose(&self.routes, &self.config, &self.location, &self.gating_state());

        self.chrome.enter(composition.layout);
        self.page_tags.apply(&composition.path);

        match composition.outcome {
            GuardOutcome::Render => {
                tracing::debug!(path = %composition.path, content = ?composition.content(), "render");
            }
            GuardOutcome::Pending => {
                tracing::debug!(path = %composition.path, "waiting for session");
            }
            GuardOutcome::Redirect(reason) => {
                tracing::info!(path = %composition.path, ?reason, to = ?composition.redirect_to, "redirect");
                match reason {
                    RedirectReason::SignInRequired => self.session.redirect_to_login(&composition.path),
                    RedirectReason::NotAuthorized => self.navigation.navigate(&self.config.unauthorized_path),
                }
            }
        }

        self.view.set_if_changed(composition.into_view(self.scrolled));
    }
}

struct Dispatcher {
    queue: RefCell<VecDeque<ShellEvent>>,
    state: RefCell<ShellState>,
}

impl Dispatcher {
    /// Queues `event` and drains the queue unless a drain is already running further up
    /// the stack, in which case that drain picks the event up next.
    fn post(&self, event: ShellEvent) {
        self.queue.borrow_mut().push_back(event);
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(event) => state.apply(event),
                None => break,
            }
        }
    }
}

fn post(dispatcher: &Weak<Dispatcher>, event: ShellEvent) {
    if let Some(dispatcher) = dispatcher.upgrade() {
        dispatcher.post(event);
    }
}

/// AppShell
///
/// The mounted application shell. Listeners on the session, navigation and viewport
/// are registered at mount and removed when the shell is dropped; dropping it also
/// clears every page tag it set.
pub struct AppShell {
    // Declared first so the listeners detach before the state goes away.
    listeners: Vec<Subscription>,
    dispatcher: Rc<Dispatcher>,
    view: Signal<ShellView>,
    scroll: ScrollTracker,
    pending_timeout: Option<Duration>,
}

impl AppShell {
    pub fn mount(ctx: ShellContext) -> Result<Self, ShellError> {
        ctx.routes.check_redirect_targets(&ctx.config)?;

        let ShellContext {
            config,
            routes,
            session,
            navigation,
            viewport,
            body,
            install_prompt,
        } = ctx;

        let scroll = ScrollTracker::new(config.scroll_threshold);
        let scroll_listener = scroll.attach(viewport.as_ref());

        let location = navigation.current_path();
        let auth = session.auth_state();
        let view = Store::new(
            compose(&routes, &config, &location, &auth).into_view(scroll.is_scrolled()),
        );
        let pending_timeout = config.auth_pending_timeout;

        let dispatcher = Rc::new(Dispatcher {
            queue: RefCell::new(VecDeque::new()),
            state: RefCell::new(ShellState {
                config,
                routes,
                session: Rc::clone(&session),
                navigation: Rc::clone(&navigation),
                location: location.clone(),
                auth,
                pending_expired: false,
                scrolled: scroll.is_scrolled(),
                chrome: Chrome::new(install_prompt),
                page_tags: PageTagSync::new(body),
                view: view.clone(),
            }),
        });

        let mut listeners = vec![scroll_listener];

        let weak = Rc::downgrade(&dispatcher);
        listeners.push(session.on_auth_state_change(Box::new(move |auth: &AuthState| {
            post(&weak, ShellEvent::AuthChanged(auth.clone()));
        })));

        let weak = Rc::downgrade(&dispatcher);
        listeners.push(navigation.on_path_change(Box::new(move |location: &str| {
            post(&weak, ShellEvent::PathChanged(location.to_string()));
        })));

        let weak = Rc::downgrade(&dispatcher);
        listeners.push(scroll.signal().subscribe(move |scrolled: &bool| {
            post(&weak, ShellEvent::ScrollSignalChanged(*scrolled));
        }));

        // Listeners are live before the first evaluation so a redirect issued by it
        // is observed like any other navigation.
        dispatcher.post(ShellEvent::PathChanged(location));
        tracing::info!("shell mounted");

        Ok(Self {
            listeners,
            dispatcher,
            view: view.signal(),
            scroll,
            pending_timeout,
        })
    }

    /// The currently composed view.
    pub fn view(&self) -> ShellView {
        self.view.get()
    }

    /// Observe every published view.
    pub fn views(&self) -> Signal<ShellView> {
        self.view.clone()
    }

    pub fn scroll_signal(&self) -> Signal<bool> {
        self.scroll.signal()
    }

    /// How long the host should wait before calling `expire_pending`, if the current
    /// view is pending and a timeout is configured.
    pub fn pending_timeout(&self) -> Option<Duration> {
        match self.view.get().outcome {
            GuardOutcome::Pending => self.pending_timeout,
            _ => None,
        }
    }

    /// Ends a pending wait: while the session is still `Unknown` protected routes are
    /// gated as signed out. No effect once the session has resolved.
    pub fn expire_pending(&self) {
        self.dispatcher.post(ShellEvent::PendingTimedOut);
    }

    /// Feeds one event through the same serialized path collaborators use.
    pub fn dispatch(&self, event: ShellEvent) {
        self.dispatcher.post(event);
    }
}

impl Drop for AppShell {
    fn drop(&mut self) {
        self.listeners.clear();
        tracing::info!("shell torn down");
    }
}
