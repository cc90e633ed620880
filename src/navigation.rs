use std::{cell::RefCell, rc::Rc};

use crate::store::{Store, Subscription};

/// Navigation
///
/// The consumed navigation API: where we are, how to go somewhere else, and who to
/// tell when the location changes. Locations may carry a query string
/// (`/login?redirect_url=/dashboard`); routing only ever looks at `normalize_path`.
pub trait Navigation {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
    fn on_path_change(&self, callback: Box<dyn Fn(&str)>) -> Subscription;
}

/// History
///
/// In-memory navigation state, one entry per navigation. Stands in for the browser
/// history in tests and in non-browser hosts.
#[derive(Clone)]
pub struct History {
    location: Store<String>,
    entries: Rc<RefCell<Vec<String>>>,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            location: Store::new(initial.to_string()),
            entries: Rc::new(RefCell::new(vec![initial.to_string()])),
        }
    }

    /// Every location visited so far, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Pops the current entry and returns to the previous one, if any.
    pub fn back(&self) -> bool {
        let previous = {
            let mut entries = self.entries.borrow_mut();
            if entries.len() < 2 {
                return false;
            }
            entries.pop();
            entries.last().cloned()
        };
        match previous {
            Some(location) => {
                self.location.set(location);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.location.subscriber_count()
    }
}

impl Navigation for History {
    fn current_path(&self) -> String {
        self.location.get()
    }

    fn navigate(&self, path: &str) {
        if self.location.get() == path {
            return;
        }
        tracing::trace!(to = %path, "navigate");
        self.entries.borrow_mut().push(path.to_string());
        self.location.set(path.to_string());
    }

    fn on_path_change(&self, callback: Box<dyn Fn(&str)>) -> Subscription {
        self.location.subscribe(move |location: &String| callback(location))
    }
}

/// Reduces a location to the path routing decisions are made on: query string and
/// fragment dropped, leading slash enforced, trailing slash removed (except for `/`).
pub fn normalize_path(location: &str) -> String {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// True when `path` is `base` itself or lies beneath it on a segment boundary,
/// so `/admin/users` is under `/admin` but `/admin-check` is not.
pub fn is_under(path: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return true;
    }
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
