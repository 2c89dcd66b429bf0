use crate::config::{FrameTrigger, OverlayFade, SmoothScrollOptions};
use crate::foundation::core::unit_clamp;
use crate::scroll::marker::Marker;

/// Identifies one registration with a [`ScrollTrigger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub u32);

/// A scroll-linked binding over a trigger region.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerBinding {
    pub id: BindingId,
    /// Identifier of the trigger region element.
    pub trigger: String,
    pub start: Marker,
    pub end: Marker,
    /// Catch-up smoothing in seconds; `None` tracks scroll exactly.
    pub scrub: Option<f64>,
}

/// Progress of one binding, reported by [`ScrollTrigger::recompute`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressUpdate {
    pub binding: BindingId,
    /// Normalized progress in `[0, 1]`.
    pub progress: f64,
}

/// Eases raw wheel/touch input into a scroll offset.
pub trait ScrollSmoother {
    fn options(&self) -> SmoothScrollOptions;
    /// Advance one display tick and return the eased scroll offset.
    fn advance(&mut self, timestamp_ms: f64) -> f64;
    fn teardown(&mut self);
}

/// Observes trigger regions and reports per-binding progress.
pub trait ScrollTrigger {
    /// Must be called once before the first `bind`.
    fn register_plugin(&mut self);
    fn bind(&mut self, binding: TriggerBinding);
    fn unbind(&mut self, id: BindingId);
    /// Recompute every binding for the given scroll offset. Only bindings whose progress changed
    /// are reported.
    fn recompute(&mut self, scroll: f64, timestamp_ms: f64) -> Vec<ProgressUpdate>;
}

/// Receives opacity for secondary overlay elements.
pub trait OverlayTarget {
    fn set_opacity(&mut self, element: &str, opacity: f32);
}

const FRAME_BINDING: BindingId = BindingId(0);

struct OverlayRoute {
    id: BindingId,
    fade: OverlayFade,
    last: Option<f32>,
}

/// Wires the scroll collaborators to the frame engine.
///
/// Ticks always advance the smoother; bindings exist only between [`ScrollBridge::activate`] and
/// [`ScrollBridge::teardown`].
pub struct ScrollBridge {
    smoother: Option<Box<dyn ScrollSmoother>>,
    trigger: Option<Box<dyn ScrollTrigger>>,
    overlay_target: Option<Box<dyn OverlayTarget>>,
    trigger_element: String,
    frame_trigger: FrameTrigger,
    overlays: Vec<OverlayRoute>,
    active: bool,
    ticks: u64,
}

impl ScrollBridge {
    pub fn new(
        smoother: Box<dyn ScrollSmoother>,
        trigger: Box<dyn ScrollTrigger>,
        overlay_target: Option<Box<dyn OverlayTarget>>,
        trigger_element: impl Into<String>,
        frame_trigger: FrameTrigger,
        overlays: &[OverlayFade],
    ) -> Self {
        let overlays = if overlay_target.is_some() {
            overlays
                .iter()
                .enumerate()
                .map(|(i, fade)| OverlayRoute {
                    id: BindingId(i as u32 + 1),
                    fade: fade.clone(),
                    last: None,
                })
                .collect()
        } else {
            Vec::new()
        };
        tracing::debug!(options = ?smoother.options(), "scroll smoother attached");
        Self {
            smoother: Some(smoother),
            trigger: Some(trigger),
            overlay_target,
            trigger_element: trigger_element.into(),
            frame_trigger,
            overlays,
            active: false,
            ticks: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_torn_down(&self) -> bool {
        self.smoother.is_none()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Register the frame binding and the overlay fades. Idempotent; a no-op after teardown.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        let Some(trigger) = self.trigger.as_mut() else {
            return;
        };
        trigger.register_plugin();

        let scrub = (self.frame_trigger.scrub > 0.0).then_some(self.frame_trigger.scrub);
        trigger.bind(TriggerBinding {
            id: FRAME_BINDING,
            trigger: self.trigger_element.clone(),
            start: self.frame_trigger.start,
            end: self.frame_trigger.end,
            scrub,
        });
        for route in &self.overlays {
            trigger.bind(TriggerBinding {
                id: route.id,
                trigger: self.trigger_element.clone(),
                start: route.fade.start,
                end: route.fade.end,
                scrub: None,
            });
        }
        self.active = true;
        tracing::info!(overlays = self.overlays.len(), "scroll bindings registered");
    }

    /// One heartbeat: advance the smoother, recompute the trigger, dispatch overlay opacity.
    ///
    /// Returns the frame binding's progress if it changed on this tick.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f64> {
        let smoother = self.smoother.as_mut()?;
        let scroll = smoother.advance(timestamp_ms);
        self.ticks += 1;

        let trigger = self.trigger.as_mut()?;
        let updates = trigger.recompute(scroll, timestamp_ms);
        tracing::trace!(scroll, updates = updates.len(), "tick");

        let mut frame_progress = None;
        for update in updates {
            let p = unit_clamp(update.progress);
            if update.binding == FRAME_BINDING {
                frame_progress = Some(p);
                continue;
            }
            let Some(route) = self.overlays.iter_mut().find(|r| r.id == update.binding) else {
                continue;
            };
            let opacity = route.fade.opacity_at(p);
            if route.last == Some(opacity) {
                continue;
            }
            route.last = Some(opacity);
            if let Some(target) = self.overlay_target.as_mut() {
                target.set_opacity(&route.fade.element, opacity);
            }
        }
        frame_progress
    }

    /// Unbind everything that was bound and release the smoother. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(mut trigger) = self.trigger.take()
            && self.active
        {
            trigger.unbind(FRAME_BINDING);
            for route in &self.overlays {
                trigger.unbind(route.id);
            }
        }
        if let Some(mut smoother) = self.smoother.take() {
            smoother.teardown();
            tracing::info!("scroll bridge torn down");
        }
        self.active = false;
    }
}
