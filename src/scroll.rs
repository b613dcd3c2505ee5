//! Viewport follow behavior, independent of how messages are rendered.
//!
//! The coordinator never touches a real viewport. The shell reports metrics
//! through [`ScrollCoordinator::on_user_scroll`] and, once per render tick,
//! [`ScrollCoordinator::after_render`]; the latter answers with the
//! [`ScrollCommand`] the shell should apply.

/// Distance in pixels that still counts as "at the top" or "at the bottom".
pub const SCROLL_TOLERANCE: f64 = 10.0;
/// The jump-to-bottom affordance is only offered above this message count.
pub const JUMP_TO_BOTTOM_MIN_MESSAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Metrics of a viewport scrolled all the way down.
    pub fn at_bottom(scroll_height: f64, client_height: f64) -> Self {
        Self::new((scroll_height - client_height).max(0.0), scroll_height, client_height)
    }

    fn distance_from_bottom(&self) -> f64 {
        self.scroll_height - self.client_height - self.scroll_top
    }
}

/// Position captured right before older history is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_top: f64,
    pub scroll_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// Smooth, end-aligned scroll to the newest message.
    ToBottom,
    /// Jump to an absolute offset without animation.
    SetScrollTop(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollCoordinator {
    auto_scroll: bool,
    has_scrolled_once: bool,
    at_top: bool,
    at_bottom: bool,
    captured: Option<ScrollSnapshot>,
    restore: Option<ScrollSnapshot>,
    pending_bottom: bool,
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self {
            auto_scroll: true,
            has_scrolled_once: false,
            at_top: false,
            at_bottom: true,
            captured: None,
            restore: None,
            pending_bottom: false,
        }
    }

    pub fn auto_scroll_enabled(&self) -> bool {
        self.auto_scroll
    }

    pub fn is_at_top(&self) -> bool {
        self.at_top
    }

    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }

    pub fn show_jump_to_bottom(&self, message_count: usize) -> bool {
        !self.at_bottom && message_count > JUMP_TO_BOTTOM_MIN_MESSAGES
    }

    /// Records the viewport before an older page is requested.
    pub fn capture(&mut self, metrics: ScrollMetrics) {
        self.captured = Some(ScrollSnapshot {
            scroll_top: metrics.scroll_top,
            scroll_height: metrics.scroll_height,
        });
    }

    /// Older messages were prepended: restore on the next render tick.
    pub fn commit_restore(&mut self) {
        self.restore = self.captured.take();
    }

    /// The older page brought nothing to compensate for.
    pub fn discard_capture(&mut self) {
        self.captured = None;
    }

    /// New trailing content: follow it only while auto-scroll is enabled.
    pub fn follow_new_content(&mut self) {
        if self.auto_scroll {
            self.pending_bottom = true;
        }
    }

    /// Re-arms auto-scroll and follows the newest message.
    pub fn force_follow(&mut self) {
        self.auto_scroll = true;
        self.pending_bottom = true;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
        self.pending_bottom = true;
    }

    pub fn on_user_scroll(&mut self, metrics: ScrollMetrics) {
        let distance = metrics.distance_from_bottom();

        if !self.has_scrolled_once && distance > SCROLL_TOLERANCE {
            self.has_scrolled_once = true;
            self.auto_scroll = false;
        }

        self.at_top = metrics.scroll_top <= SCROLL_TOLERANCE;
        self.at_bottom = distance.abs() < SCROLL_TOLERANCE;

        if self.at_bottom && self.has_scrolled_once {
            self.auto_scroll = true;
        }
    }

    /// Consumes the scroll work queued by the last state change.
    ///
    /// A pending restore wins over a pending follow: loading older history
    /// means the reader is looking backwards.
    pub fn after_render(&mut self, metrics: ScrollMetrics) -> Option<ScrollCommand> {
        if let Some(snapshot) = self.restore.take() {
            let delta = metrics.scroll_height - snapshot.scroll_height;
            let scroll_top = (snapshot.scroll_top + delta).max(0.0);
            self.auto_scroll = false;
            self.pending_bottom = false;
            self.at_top = scroll_top <= SCROLL_TOLERANCE;
            self.at_bottom = (metrics.scroll_height - metrics.client_height - scroll_top).abs()
                < SCROLL_TOLERANCE;
            return Some(ScrollCommand::SetScrollTop(scroll_top));
        }

        if !std::mem::take(&mut self.pending_bottom) || !self.auto_scroll {
            return None;
        }

        self.at_bottom = true;
        self.at_top = false;
        Some(ScrollCommand::ToBottom)
    }
}
