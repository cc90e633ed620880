use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
};

use portal_shell::{
    AppShell, RoutingConfig, ShellContext, ShellError, ShellEvent,
    layout::InstallPrompt,
    models::{
        AuthState, Content, GuardOutcome, Identity, LayoutKind, PageId, PageTag, RedirectReason,
        Role, ShellView,
    },
    navigation::{History, Navigation},
    page_tag::BodyClassList,
    routes::RouteTable,
    session::{LocalSession, SessionSource},
    store::Subscription,
    viewport::Viewport,
};
use uuid::Uuid;

// --- Test Harness ---

struct CountingPrompt(Rc<Cell<u32>>);

impl InstallPrompt for CountingPrompt {
    fn mount(&self) {
        self.0.set(self.0.get() + 1);
    }
}

struct Harness {
    history: History,
    session: LocalSession,
    viewport: Viewport,
    body: BodyClassList,
    prompts: Rc<Cell<u32>>,
}

impl Harness {
    fn new(path: &str, config: &RoutingConfig) -> Self {
        let history = History::new(path);
        let navigator = history.clone();
        Self {
            session: LocalSession::new(&config.login_path, move |to| navigator.navigate(to)),
            history,
            viewport: Viewport::new(),
            body: BodyClassList::new(),
            prompts: Rc::new(Cell::new(0)),
        }
    }

    fn context(&self, config: &RoutingConfig) -> ShellContext {
        ShellContext {
            config: config.clone(),
            routes: RouteTable::standard(config),
            session: Rc::new(self.session.clone()),
            navigation: Rc::new(self.history.clone()),
            viewport: Rc::new(self.viewport.clone()),
            body: Rc::new(self.body.clone()),
            install_prompt: Box::new(CountingPrompt(Rc::clone(&self.prompts))),
        }
    }

    fn mount(&self, config: &RoutingConfig) -> AppShell {
        AppShell::mount(self.context(config)).expect("shell mounts")
    }
}

fn setup(path: &str) -> (Harness, AppShell) {
    let config = RoutingConfig::default();
    let harness = Harness::new(path, &config);
    let shell = harness.mount(&config);
    (harness, shell)
}

fn record(shell: &AppShell) -> (Rc<RefCell<Vec<ShellView>>>, Subscription) {
    let views = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&views);
    let subscription = shell
        .views()
        .subscribe(move |view: &ShellView| sink.borrow_mut().push(view.clone()));
    (views, subscription)
}

fn identity(role: Role) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role,
    }
}

// --- Scenarios ---

#[test]
fn test_pending_dashboard_renders_once_session_resolves() {
    let (harness, shell) = setup("/dashboard");

    let view = shell.view();
    assert_eq!(view.outcome, GuardOutcome::Pending);
    assert_eq!(view.content, Content::Loading);
    assert_eq!(view.layout, LayoutKind::Standard);
    assert_eq!(view.redirect_to, None);

    let (views, _sub) = record(&shell);
    harness.session.sign_in(identity(Role::Member));

    let outcomes: Vec<GuardOutcome> = views.borrow().iter().map(|v| v.outcome).collect();
    assert_eq!(outcomes, vec![GuardOutcome::Render]);
    assert_eq!(shell.view().content, Content::Page(PageId::Dashboard));
    assert_eq!(harness.history.entries(), vec!["/dashboard"]);
}

#[test]
fn test_signed_out_admin_request_goes_to_login() {
    let (harness, shell) = setup("/admin/users");
    assert_eq!(shell.view().layout, LayoutKind::Admin);

    let (views, _sub) = record(&shell);
    harness.session.sign_out();

    let views = views.borrow();
    assert_eq!(views.len(), 2);

    let redirecting = &views[0];
    assert_eq!(redirecting.path, "/admin/users");
    assert_eq!(redirecting.layout, LayoutKind::Admin);
    assert_eq!(redirecting.outcome, GuardOutcome::Redirect(RedirectReason::SignInRequired));
    assert_eq!(redirecting.content, Content::Redirecting);
    assert_eq!(redirecting.redirect_to.as_deref(), Some("/login?redirect_url=/admin/users"));

    let landed = &views[1];
    assert_eq!(landed.path, "/login");
    assert_eq!(landed.content, Content::Page(PageId::Login));
    assert_eq!(landed.layout, LayoutKind::Standard);
    assert_eq!(landed.page_tag, PageTag::Login);

    assert_eq!(
        harness.history.entries(),
        vec!["/admin/users", "/login?redirect_url=/admin/users"]
    );
}

#[test]
fn test_member_admin_request_goes_to_landing_page() {
    let (harness, shell) = setup("/admin/users");

    let (views, _sub) = record(&shell);
    harness.session.sign_in(identity(Role::Member));

    let views = views.borrow();
    assert_eq!(views[0].outcome, GuardOutcome::Redirect(RedirectReason::NotAuthorized));
    assert_eq!(views[0].redirect_to.as_deref(), Some("/"));
    assert_eq!(views[1].content, Content::Page(PageId::Home));
    assert_eq!(harness.history.entries(), vec!["/admin/users", "/"]);
    assert!(views.iter().all(|v| v.content != Content::Page(PageId::AdminDashboard)));
}

#[test]
fn test_admin_renders_inside_admin_shell() {
    let (harness, shell) = setup("/admin/stats");
    harness.session.sign_in(identity(Role::Admin));

    let view = shell.view();
    assert_eq!(view.content, Content::Page(PageId::AdminDashboard));
    assert!(!view.chrome.show_nav);
    assert!(!view.chrome.show_footer);
    assert_eq!(view.chrome.root_class, "app-admin");
}

#[test]
fn test_admin_check_uses_admin_chrome_with_its_own_guard() {
    let (harness, shell) = setup("/admin-check");
    assert_eq!(shell.view().layout, LayoutKind::Admin);

    harness.session.sign_in(identity(Role::Member));

    let view = shell.view();
    assert_eq!(view.outcome, GuardOutcome::Render);
    assert_eq!(view.content, Content::Page(PageId::AdminCheck));
    assert_eq!(view.layout, LayoutKind::Admin);
    assert!(!view.chrome.show_nav);
    assert!(!view.chrome.show_footer);
}

#[test]
fn test_protected_page_never_mounts_when_session_resolves_signed_out() {
    let (harness, shell) = setup("/esign");

    let (views, _sub) = record(&shell);
    harness.session.resolve(Ok(None));

    assert!(views.borrow().iter().all(|v| v.content != Content::Page(PageId::ESign)));
    assert_eq!(shell.view().content, Content::Page(PageId::Login));
}

#[test]
fn test_unresolvable_session_fails_closed() {
    let (harness, shell) = setup("/profile");

    harness
        .session
        .resolve(Err(ShellError::SessionUnresolvable("provider offline".to_string())));

    assert_eq!(harness.session.auth_state(), AuthState::SignedOut);
    assert_eq!(shell.view().content, Content::Page(PageId::Login));
    assert_eq!(harness.history.current_path(), "/login?redirect_url=/profile");
}

#[test]
fn test_logout_on_protected_page_redirects() {
    let (harness, shell) = setup("/pricing");
    harness.session.sign_in(identity(Role::Member));
    assert_eq!(shell.view().content, Content::Page(PageId::Pricing));

    harness.session.sign_out();
    assert_eq!(shell.view().path, "/login");
    assert_eq!(harness.history.current_path(), "/login?redirect_url=/pricing");
}

#[test]
fn test_pending_timeout_is_configurable_and_fails_closed() {
    let config = RoutingConfig {
        auth_pending_timeout: Some(Duration::from_secs(5)),
        ..RoutingConfig::default()
    };
    let harness = Harness::new("/dashboard", &config);
    let shell = harness.mount(&config);

    assert_eq!(shell.pending_timeout(), Some(Duration::from_secs(5)));

    shell.expire_pending();
    assert_eq!(shell.view().content, Content::Page(PageId::Login));
    assert_eq!(shell.pending_timeout(), None);

    // A late resolution still applies normally.
    harness.session.sign_in(identity(Role::Member));
    harness.history.navigate("/dashboard");
    assert_eq!(shell.view().content, Content::Page(PageId::Dashboard));
}

#[test]
fn test_no_timeout_means_pending_indefinitely() {
    let (_harness, shell) = setup("/recommendations");

    assert_eq!(shell.pending_timeout(), None);
    assert_eq!(shell.view().outcome, GuardOutcome::Pending);
}

#[test]
fn test_expire_after_resolution_has_no_effect() {
    let (harness, shell) = setup("/dashboard");
    harness.session.sign_in(identity(Role::Member));

    shell.expire_pending();
    assert_eq!(shell.view().content, Content::Page(PageId::Dashboard));
}

#[test]
fn test_resolved_session_never_regresses_to_unknown() {
    let (harness, shell) = setup("/dashboard");
    harness.session.sign_in(identity(Role::Member));
    assert_eq!(shell.view().outcome, GuardOutcome::Render);

    let (views, _sub) = record(&shell);
    shell.dispatch(ShellEvent::AuthChanged(AuthState::Unknown));

    assert!(views.borrow().is_empty());
    assert_eq!(shell.view().outcome, GuardOutcome::Render);
    assert_eq!(shell.view().content, Content::Page(PageId::Dashboard));

    // Later real transitions still apply.
    harness.session.sign_out();
    assert_eq!(shell.view().path, "/login");
}

#[test]
fn test_unknown_before_resolution_keeps_waiting() {
    let (_harness, shell) = setup("/dashboard");

    shell.dispatch(ShellEvent::AuthChanged(AuthState::Unknown));

    assert_eq!(shell.view().outcome, GuardOutcome::Pending);
}

#[test]
fn test_page_tags_follow_navigation() {
    let (harness, _shell) = setup("/");
    assert!(harness.body.contains("is-home"));

    harness.history.navigate("/login");
    assert!(harness.body.contains("is-login"));
    assert!(!harness.body.contains("is-home"));

    harness.history.navigate("/contact");
    assert!(harness.body.classes().is_empty());
}

#[test]
fn test_unmatched_route_renders_not_found() {
    let (harness, shell) = setup("/nowhere");

    let view = shell.view();
    assert_eq!(view.outcome, GuardOutcome::Render);
    assert_eq!(view.content, Content::NotFound);
    assert_eq!(view.layout, LayoutKind::Standard);
    assert_eq!(harness.history.entries(), vec!["/nowhere"]);
}

#[test]
fn test_install_prompt_mounts_once_across_navigations() {
    let (harness, _shell) = setup("/admin");
    assert_eq!(harness.prompts.get(), 0);

    for path in ["/about", "/services", "/admin/users", "/contact", "/"] {
        harness.history.navigate(path);
    }
    assert_eq!(harness.prompts.get(), 1);
}

#[test]
fn test_scroll_signal_reaches_chrome() {
    let (harness, shell) = setup("/about");

    let flips = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&flips);
    let _sub = shell
        .scroll_signal()
        .subscribe(move |scrolled: &bool| sink.borrow_mut().push(*scrolled));

    harness.viewport.scroll_to(0.0);
    harness.viewport.scroll_to(80.0);
    harness.viewport.scroll_to(95.0);

    assert_eq!(*flips.borrow(), vec![true]);
    assert!(shell.view().chrome.scrolled);
}

#[test]
fn test_teardown_releases_listeners_and_tags() {
    let (harness, shell) = setup("/");
    assert!(harness.body.contains("is-home"));
    assert_eq!(harness.viewport.listener_count(), 1);
    assert_eq!(harness.history.listener_count(), 1);
    assert_eq!(harness.session.listener_count(), 1);

    drop(shell);

    assert!(!harness.body.contains("is-home"));
    assert_eq!(harness.viewport.listener_count(), 0);
    assert_eq!(harness.history.listener_count(), 0);
    assert_eq!(harness.session.listener_count(), 0);

    // Further events reach nobody.
    harness.history.navigate("/login");
    assert!(harness.body.classes().is_empty());
}

#[test]
fn test_mount_rejects_guarded_redirect_target() {
    let config = RoutingConfig {
        login_path: "/dashboard".to_string(),
        ..RoutingConfig::default()
    };
    let harness = Harness::new("/", &config);

    let result = AppShell::mount(harness.context(&config));
    assert!(matches!(result, Err(ShellError::RedirectTargetNotPublic(path)) if path == "/dashboard"));
}
