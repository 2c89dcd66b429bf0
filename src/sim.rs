//! Reference collaborators for headless drivers and tests.
//!
//! Each type is a cheap clonable handle over shared state, so a driver can keep one clone to feed
//! input or inspect calls while the engine owns another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::SmoothScrollOptions;
use crate::foundation::core::unit_clamp;
use crate::loading::ProgressIndicator;
use crate::scroll::bridge::{
    BindingId, OverlayTarget, ProgressUpdate, ScrollSmoother, ScrollTrigger, TriggerBinding,
};
use crate::scroll::marker::RegionGeometry;

#[derive(Debug)]
struct SmootherState {
    options: SmoothScrollOptions,
    current: f64,
    target: f64,
    torn_down: bool,
}

/// Eases the scroll offset toward a target by `lerp` of the remaining distance per tick.
#[derive(Clone, Debug)]
pub struct LerpSmoother {
    state: Rc<RefCell<SmootherState>>,
}

impl LerpSmoother {
    pub fn new(options: SmoothScrollOptions) -> Self {
        Self {
            state: Rc::new(RefCell::new(SmootherState {
                options,
                current: 0.0,
                target: 0.0,
                torn_down: false,
            })),
        }
    }

    /// Set the raw (un-eased) scroll target, as wheel input would.
    pub fn scroll_to(&self, target: f64) {
        self.state.borrow_mut().target = target.max(0.0);
    }

    pub fn position(&self) -> f64 {
        self.state.borrow().current
    }

    pub fn is_settled(&self) -> bool {
        let s = self.state.borrow();
        s.current == s.target
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }
}

impl ScrollSmoother for LerpSmoother {
    fn options(&self) -> SmoothScrollOptions {
        self.state.borrow().options
    }

    fn advance(&mut self, _timestamp_ms: f64) -> f64 {
        let mut s = self.state.borrow_mut();
        if s.torn_down {
            return s.current;
        }
        if s.options.smooth_wheel {
            let step = (s.target - s.current) * s.options.lerp;
            s.current += step;
            if (s.target - s.current).abs() < 0.5 {
                s.current = s.target;
            }
        } else {
            s.current = s.target;
        }
        s.current
    }

    fn teardown(&mut self) {
        self.state.borrow_mut().torn_down = true;
    }
}

#[derive(Debug)]
struct TriggerState {
    region: RegionGeometry,
    viewport_height: f64,
    plugin_registered: bool,
    bindings: Vec<TriggerBinding>,
    displayed: HashMap<BindingId, f64>,
    reported: HashMap<BindingId, f64>,
    last_timestamp: Option<f64>,
}

/// Resolves binding markers against one region and reports clamped progress.
#[derive(Clone, Debug)]
pub struct RegionTrigger {
    state: Rc<RefCell<TriggerState>>,
}

impl RegionTrigger {
    pub fn new(region: RegionGeometry, viewport_height: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(TriggerState {
                region,
                viewport_height,
                plugin_registered: false,
                bindings: Vec::new(),
                displayed: HashMap::new(),
                reported: HashMap::new(),
                last_timestamp: None,
            })),
        }
    }

    pub fn set_viewport_height(&self, viewport_height: f64) {
        self.state.borrow_mut().viewport_height = viewport_height;
    }

    pub fn plugin_registered(&self) -> bool {
        self.state.borrow().plugin_registered
    }

    pub fn bindings(&self) -> Vec<TriggerBinding> {
        self.state.borrow().bindings.clone()
    }

    /// Scroll range `(start, end)` covered by `id`, if bound.
    pub fn scroll_range(&self, id: BindingId) -> Option<(f64, f64)> {
        let s = self.state.borrow();
        let b = s.bindings.iter().find(|b| b.id == id)?;
        Some((
            b.start.resolve(s.region, s.viewport_height),
            b.end.resolve(s.region, s.viewport_height),
        ))
    }
}

fn raw_progress(start: f64, end: f64, scroll: f64) -> f64 {
    if end <= start {
        return if scroll >= end { 1.0 } else { 0.0 };
    }
    unit_clamp((scroll - start) / (end - start))
}

impl ScrollTrigger for RegionTrigger {
    fn register_plugin(&mut self) {
        self.state.borrow_mut().plugin_registered = true;
    }

    fn bind(&mut self, binding: TriggerBinding) {
        let mut s = self.state.borrow_mut();
        if !s.plugin_registered {
            tracing::warn!(id = binding.id.0, "binding registered before plugin");
        }
        s.bindings.retain(|b| b.id != binding.id);
        s.bindings.push(binding);
    }

    fn unbind(&mut self, id: BindingId) {
        let mut s = self.state.borrow_mut();
        s.bindings.retain(|b| b.id != id);
        s.displayed.remove(&id);
        s.reported.remove(&id);
    }

    fn recompute(&mut self, scroll: f64, timestamp_ms: f64) -> Vec<ProgressUpdate> {
        let mut guard = self.state.borrow_mut();
        let s = &mut *guard;
        let dt = s
            .last_timestamp
            .map_or(0.0, |last| (timestamp_ms - last).max(0.0));
        s.last_timestamp = Some(timestamp_ms);

        let mut out = Vec::new();
        for b in &s.bindings {
            let start = b.start.resolve(s.region, s.viewport_height);
            let end = b.end.resolve(s.region, s.viewport_height);
            let raw = raw_progress(start, end, scroll);

            let shown = match (b.scrub, s.displayed.get(&b.id)) {
                (Some(secs), Some(&prev)) if secs > 0.0 => {
                    let k = (dt / (secs * 1000.0)).clamp(0.0, 1.0);
                    let next = prev + (raw - prev) * k;
                    if (raw - next).abs() < 1e-4 { raw } else { next }
                }
                _ => raw,
            };
            s.displayed.insert(b.id, shown);

            if s.reported.get(&b.id) != Some(&shown) {
                s.reported.insert(b.id, shown);
                out.push(ProgressUpdate {
                    binding: b.id,
                    progress: shown,
                });
            }
        }
        out
    }
}

/// One call received by a [`RecordingIndicator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndicatorCall {
    Percentage(u8),
    Label(String),
    Hide,
}

/// Records every progress-indicator call.
#[derive(Clone, Debug, Default)]
pub struct RecordingIndicator {
    calls: Rc<RefCell<Vec<IndicatorCall>>>,
}

impl RecordingIndicator {
    pub fn calls(&self) -> Vec<IndicatorCall> {
        self.calls.borrow().clone()
    }

    pub fn percentages(&self) -> Vec<u8> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                IndicatorCall::Percentage(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn is_hidden(&self) -> bool {
        self.calls.borrow().contains(&IndicatorCall::Hide)
    }
}

impl ProgressIndicator for RecordingIndicator {
    fn set_percentage(&mut self, percent: u8) {
        self.calls.borrow_mut().push(IndicatorCall::Percentage(percent));
    }

    fn set_label_text(&mut self, text: &str) {
        self.calls
            .borrow_mut()
            .push(IndicatorCall::Label(text.to_string()));
    }

    fn hide(&mut self) {
        self.calls.borrow_mut().push(IndicatorCall::Hide);
    }
}

/// Records the latest opacity per overlay element, plus the full call log.
#[derive(Clone, Debug, Default)]
pub struct RecordingOverlays {
    calls: Rc<RefCell<Vec<(String, f32)>>>,
}

impl RecordingOverlays {
    pub fn calls(&self) -> Vec<(String, f32)> {
        self.calls.borrow().clone()
    }

    pub fn opacity_of(&self, element: &str) -> Option<f32> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(e, _)| e == element)
            .map(|(_, o)| *o)
    }
}

impl OverlayTarget for RecordingOverlays {
    fn set_opacity(&mut self, element: &str, opacity: f32) {
        self.calls.borrow_mut().push((element.to_string(), opacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::marker::Marker;

    fn binding(id: u32, scrub: Option<f64>) -> TriggerBinding {
        TriggerBinding {
            id: BindingId(id),
            trigger: "hero".to_string(),
            start: Marker::TOP_TOP,
            end: Marker::BOTTOM_BOTTOM,
            scrub,
        }
    }

    #[test]
    fn smoother_eases_toward_target() {
        let mut s = LerpSmoother::new(SmoothScrollOptions::default());
        s.scroll_to(100.0);
        let first = s.advance(0.0);
        assert!((first - 8.0).abs() < 1e-9);
        let mut t = 0.0;
        while !s.is_settled() {
            t += 16.0;
            s.advance(t);
            assert!(t < 100_000.0);
        }
        assert_eq!(s.position(), 100.0);
    }

    #[test]
    fn torn_down_smoother_stops_moving() {
        let mut s = LerpSmoother::new(SmoothScrollOptions::default());
        s.scroll_to(100.0);
        s.teardown();
        assert_eq!(s.advance(0.0), 0.0);
    }

    #[test]
    fn trigger_reports_only_changes() {
        let mut t = RegionTrigger::new(
            RegionGeometry {
                top: 0.0,
                height: 200.0,
            },
            100.0,
        );
        t.register_plugin();
        t.bind(binding(0, None));
        assert_eq!(t.scroll_range(BindingId(0)), Some((0.0, 100.0)));

        let u = t.recompute(50.0, 0.0);
        assert_eq!(u.len(), 1);
        assert_eq!(u[0].progress, 0.5);
        assert!(t.recompute(50.0, 16.0).is_empty());
        assert_eq!(t.recompute(500.0, 32.0)[0].progress, 1.0);
    }

    #[test]
    fn scrub_catches_up_over_time() {
        let mut t = RegionTrigger::new(
            RegionGeometry {
                top: 0.0,
                height: 200.0,
            },
            100.0,
        );
        t.register_plugin();
        t.bind(binding(0, Some(0.5)));
        assert_eq!(t.recompute(0.0, 0.0)[0].progress, 0.0);

        let mid = t.recompute(100.0, 250.0)[0].progress;
        assert!((mid - 0.5).abs() < 1e-9);
        let done = t.recompute(100.0, 1_000.0)[0].progress;
        assert_eq!(done, 1.0);
    }

    #[test]
    fn unbind_forgets_binding() {
        let mut t = RegionTrigger::new(
            RegionGeometry {
                top: 0.0,
                height: 200.0,
            },
            100.0,
        );
        t.register_plugin();
        t.bind(binding(3, None));
        t.unbind(BindingId(3));
        assert!(t.bindings().is_empty());
        assert!(t.recompute(10.0, 0.0).is_empty());
    }
}
