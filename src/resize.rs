use crate::foundation::core::Viewport;

/// Trailing debounce for viewport resize events.
///
/// Every event cancels the pending one and restarts the quiet period, so only the last event in
/// a burst is ever applied.
#[derive(Clone, Debug)]
pub struct ResizeCoordinator {
    quiet_ms: u64,
    pending: Option<(Viewport, u64)>,
    applied: u64,
}

impl ResizeCoordinator {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            pending: None,
            applied: 0,
        }
    }

    /// Record a resize at `now_ms`, replacing any pending one.
    pub fn on_resize(&mut self, viewport: Viewport, now_ms: u64) {
        let due = now_ms.saturating_add(self.quiet_ms);
        if self.pending.is_some() {
            tracing::trace!(?viewport, due, "resize rescheduled");
        }
        self.pending = Some((viewport, due));
    }

    /// Take the pending viewport once its quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Viewport> {
        let (viewport, due) = self.pending?;
        if now_ms < due {
            return None;
        }
        self.pending = None;
        self.applied += 1;
        Some(viewport)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many debounced resizes have been released so far.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }
}
