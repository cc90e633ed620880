use crate::store::{Signal, Store, Subscription};

pub const DEFAULT_SCROLL_THRESHOLD: f64 = 50.0;

/// ScrollSource
///
/// Scroll position provider (the browser window, or `Viewport` in tests).
pub trait ScrollSource {
    fn scroll_y(&self) -> f64;
    fn on_scroll(&self, callback: Box<dyn Fn(f64)>) -> Subscription;
}

/// Viewport
///
/// In-memory scroll position. Every `scroll_to` is one scroll event, even when the
/// offset does not move.
#[derive(Clone)]
pub struct Viewport {
    offset: Store<f64>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            offset: Store::new(0.0),
        }
    }

    pub fn scroll_to(&self, y: f64) {
        self.offset.set(y);
    }

    pub fn listener_count(&self) -> usize {
        self.offset.subscriber_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSource for Viewport {
    fn scroll_y(&self) -> f64 {
        self.offset.get()
    }

    fn on_scroll(&self, callback: Box<dyn Fn(f64)>) -> Subscription {
        self.offset.subscribe(move |y: &f64| callback(*y))
    }
}

/// ScrollTracker
///
/// Sole writer of the scrolled signal. Each scroll event is folded into
/// `scroll_y > threshold`; subscribers hear about it only when that flips.
#[derive(Clone)]
pub struct ScrollTracker {
    threshold: f64,
    scrolled: Store<bool>,
}

impl ScrollTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            scrolled: Store::new(false),
        }
    }

    /// Folds one scroll event into the signal. Returns `true` if the signal flipped.
    pub fn observe(&self, scroll_y: f64) -> bool {
        let flipped = self.scrolled.set_if_changed(scroll_y > self.threshold);
        if flipped {
            tracing::trace!(scroll_y, scrolled = self.scrolled.get(), "scroll signal flipped");
        }
        flipped
    }

    /// Registers the tracker on `source` for as long as the returned subscription lives.
    pub fn attach(&self, source: &dyn ScrollSource) -> Subscription {
        self.observe(source.scroll_y());
        let tracker = self.clone();
        source.on_scroll(Box::new(move |y: f64| {
            tracker.observe(y);
        }))
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.get()
    }

    pub fn signal(&self) -> Signal<bool> {
        self.scrolled.signal()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
