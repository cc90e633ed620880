use std::{
    cell::RefCell,
    collections::BTreeSet,
    rc::Rc,
};

use crate::{models::PageTag, navigation::normalize_path};

impl PageTag {
    /// Every tag that maps to a class on the render target.
    pub const MANAGED: [PageTag; 3] = [PageTag::Home, PageTag::Login, PageTag::Register];

    pub fn for_path(path: &str) -> Self {
        match normalize_path(path).as_str() {
            "/" => PageTag::Home,
            "/login" => PageTag::Login,
            "/register" => PageTag::Register,
            _ => PageTag::None,
        }
    }

    pub fn class_name(self) -> Option<&'static str> {
        match self {
            PageTag::Home => Some("is-home"),
            PageTag::Login => Some("is-login"),
            PageTag::Register => Some("is-register"),
            PageTag::None => None,
        }
    }
}

/// TagTarget
///
/// Document-level element whose class list carries the page tag (the `<body>`).
pub trait TagTarget {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
}

/// In-memory class list.
#[derive(Clone, Default)]
pub struct BodyClassList {
    classes: Rc<RefCell<BTreeSet<String>>>,
}

impl BodyClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }
}

impl TagTarget for BodyClassList {
    fn add_class(&self, class: &str) {
        self.classes.borrow_mut().insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().remove(class);
    }
}

/// PageTagSync
///
/// Sole writer of the page tag. `apply` always clears before setting, so at most
/// one managed class is present and it reflects the current path only. Dropping the
/// sync clears every managed class.
pub struct PageTagSync {
    target: Rc<dyn TagTarget>,
    active: PageTag,
}

impl PageTagSync {
    pub fn new(target: Rc<dyn TagTarget>) -> Self {
        Self {
            target,
            active: PageTag::None,
        }
    }

    pub fn apply(&mut self, path: &str) -> PageTag {
        self.clear();
        let tag = PageTag::for_path(path);
        if let Some(class) = tag.class_name() {
            self.target.add_class(class);
        }
        self.active = tag;
        tag
    }

    pub fn clear(&mut self) {
        for tag in PageTag::MANAGED {
            if let Some(class) = tag.class_name() {
                self.target.remove_class(class);
            }
        }
        self.active = PageTag::None;
    }

    pub fn active(&self) -> PageTag {
        self.active
    }
}

impl Drop for PageTagSync {
    fn drop(&mut self) {
        self.clear();
    }
}
