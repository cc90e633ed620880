use crate::{
    models::{ChromeFrame, LayoutKind},
    navigation::normalize_path,
};

/// Picks the chrome for a path. Auth state is not an input: an
/// anonymous request for an admin page still gets the admin shell, and the guard
/// decides separately what goes inside it.
///
/// This is a plain string prefix test, so `/admin-check` also gets the admin shell.
/// Route matching under the prefix (`RouteDef::matches`) is segment-aware instead.
pub fn select_layout(path: &str, admin_prefix: &str) -> LayoutKind {
    if normalize_path(path).starts_with(admin_prefix) {
        LayoutKind::Admin
    } else {
        LayoutKind::Standard
    }
}

impl ChromeFrame {
    pub fn for_layout(layout: LayoutKind, scrolled: bool) -> Self {
        match layout {
            LayoutKind::Standard => Self {
                layout,
                show_nav: true,
                show_footer: true,
                scrolled,
                root_class: "app".to_string(),
                main_class: "main-content".to_string(),
            },
            LayoutKind::Admin => Self {
                layout,
                show_nav: false,
                show_footer: false,
                scrolled,
                root_class: "app-admin".to_string(),
                main_class: "main-content admin-content".to_string(),
            },
        }
    }
}

/// InstallPrompt
///
/// Standalone "install this app" widget hosted by the standard chrome.
pub trait InstallPrompt {
    fn mount(&self);
}

/// Host without an installable app shell.
pub struct NoInstallPrompt;

impl InstallPrompt for NoInstallPrompt {
    fn mount(&self) {}
}

/// Chrome
///
/// Tracks the chrome-level side effects of layout selection.
pub struct Chrome {
    prompt: Box<dyn InstallPrompt>,
    prompt_mounted: bool,
}

impl Chrome {
    pub fn new(prompt: Box<dyn InstallPrompt>) -> Self {
        Self {
            prompt,
            prompt_mounted: false,
        }
    }

    /// Called on every layout selection. The install prompt is mounted the first time
    /// the standard chrome appears and never again for the life of the application.
    pub fn enter(&mut self, layout: LayoutKind) {
        if layout == LayoutKind::Standard && !self.prompt_mounted {
            self.prompt.mount();
            self.prompt_mounted = true;
            tracing::debug!("install prompt mounted");
        }
    }

    pub fn prompt_mounted(&self) -> bool {
        self.prompt_mounted
    }
}
