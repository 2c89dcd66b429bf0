use std::sync::Arc;
use std::time::Duration;

use crate::config::ScrubConfig;
use crate::foundation::core::Viewport;
use crate::foundation::error::ScrubResult;
use crate::frames::store::{DecodedFrame, FrameLoader, FrameStore, SettleOutcome};
use crate::loading::{LoadProgressReporter, ProgressIndicator};
use crate::render::renderer::Renderer;
use crate::render::surface::SurfaceGeometry;
use crate::resize::ResizeCoordinator;
use crate::scroll::bridge::{OverlayTarget, ScrollBridge, ScrollSmoother, ScrollTrigger};
use crate::scroll::mapper::ProgressMapper;

/// External collaborators injected into a [`ScrubEngine`].
///
/// Scroll collaborators are mandatory: an engine cannot be built until they exist. Display
/// collaborators are optional; the matching feature is simply not wired when absent.
pub struct Collaborators {
    pub smoother: Box<dyn ScrollSmoother>,
    pub trigger: Box<dyn ScrollTrigger>,
    pub indicator: Option<Box<dyn ProgressIndicator>>,
    pub overlays: Option<Box<dyn OverlayTarget>>,
}

/// Owns the frame pipeline: store, renderer, progress mapping, resize and scroll wiring.
pub struct ScrubEngine {
    store: FrameStore,
    renderer: Renderer,
    mapper: ProgressMapper,
    resize: ResizeCoordinator,
    reporter: Option<LoadProgressReporter>,
    bridge: ScrollBridge,
    torn_down: bool,
}

impl ScrubEngine {
    pub fn new(
        config: &ScrubConfig,
        viewport: Viewport,
        collaborators: Collaborators,
    ) -> ScrubResult<Self> {
        config.validate()?;

        let Collaborators {
            smoother,
            trigger,
            indicator,
            overlays,
        } = collaborators;

        let renderer = Renderer::new(viewport, config.ambient_scale)
            .with_ambient_blur(config.ambient_blur_radius, config.ambient_blur_sigma);
        let bridge = ScrollBridge::new(
            smoother,
            trigger,
            overlays,
            config.trigger_element.clone(),
            config.frame_binding,
            &config.overlays,
        );

        Ok(Self {
            store: FrameStore::new(config.frames.clone()),
            renderer,
            mapper: ProgressMapper::new(config.frames.total),
            resize: ResizeCoordinator::new(config.resize_debounce_ms),
            reporter: indicator.map(LoadProgressReporter::new),
            bridge,
            torn_down: false,
        })
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn bridge(&self) -> &ScrollBridge {
        &self.bridge
    }

    pub fn current_frame(&self) -> usize {
        self.mapper.current()
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// How many debounced resizes have recomputed the surfaces.
    pub fn resize_count(&self) -> u64 {
        self.resize.applied_count()
    }

    #[tracing::instrument(skip_all)]
    pub fn begin_load(&mut self, loader: Arc<dyn FrameLoader>) {
        self.store.begin_load(loader);
    }

    /// Apply settlements that have arrived, without blocking.
    pub fn pump_loads(&mut self) -> ScrubResult<()> {
        for outcome in self.store.pump() {
            self.handle_settled(outcome)?;
        }
        Ok(())
    }

    /// Apply a settlement delivered by a driver rather than the rayon pool.
    pub fn settle(&mut self, index: usize, result: ScrubResult<DecodedFrame>) -> ScrubResult<()> {
        let outcome = self.store.settle(index, result);
        self.handle_settled(outcome)
    }

    /// Block until every frame has settled, then run the ready transition.
    pub fn wait_until_ready(&mut self, timeout: Duration) -> ScrubResult<()> {
        for outcome in self.store.pump_until_ready(timeout)? {
            self.handle_settled(outcome)?;
        }
        Ok(())
    }

    fn handle_settled(&mut self, outcome: SettleOutcome) -> ScrubResult<()> {
        match outcome {
            SettleOutcome::Ignored => Ok(()),
            SettleOutcome::Progress(progress) => {
                if let Some(reporter) = self.reporter.as_mut() {
                    reporter.report(progress);
                }
                Ok(())
            }
            SettleOutcome::Ready(progress) => {
                if let Some(reporter) = self.reporter.as_mut() {
                    reporter.report(progress);
                }
                self.on_frames_ready()
            }
        }
    }

    fn on_frames_ready(&mut self) -> ScrubResult<()> {
        if self.torn_down {
            return Ok(());
        }
        self.renderer.draw_frame(&self.store, self.mapper.current())?;
        self.bridge.activate();
        tracing::info!(total = self.store.len(), "frame engine ready");
        Ok(())
    }

    /// Feed one progress value. Redraws only when the mapped index changes.
    pub fn set_progress(&mut self, progress: f64) -> ScrubResult<bool> {
        if !self.store.is_ready() || self.torn_down {
            return Ok(false);
        }
        match self.mapper.update(progress) {
            Some(index) => self.renderer.draw_frame(&self.store, index),
            None => Ok(false),
        }
    }

    /// Record a viewport resize; it is applied after the debounce quiet period.
    pub fn on_resize(&mut self, viewport: Viewport, now_ms: u64) {
        if self.torn_down {
            return;
        }
        self.resize.on_resize(viewport, now_ms);
    }

    /// Apply a pending resize whose quiet period has elapsed.
    pub fn poll_resize(&mut self, now_ms: u64) -> ScrubResult<Option<SurfaceGeometry>> {
        let Some(viewport) = self.resize.poll(now_ms) else {
            return Ok(None);
        };
        let geometry = self.renderer.resize(viewport);
        if self.store.is_ready() {
            self.renderer.draw_frame(&self.store, self.mapper.current())?;
        }
        Ok(Some(geometry))
    }

    /// One display refresh: debounced resize, load settlements, then the scroll heartbeat.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self, now_ms: f64) -> ScrubResult<()> {
        if self.torn_down {
            return Ok(());
        }
        self.poll_resize(now_ms.max(0.0) as u64)?;
        self.pump_loads()?;
        if let Some(progress) = self.bridge.tick(now_ms) {
            self.set_progress(progress)?;
        }
        Ok(())
    }

    /// Stop ticking, cancel pending resizes, unbind from the trigger and release the smoother.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.resize.cancel();
        self.bridge.teardown();
    }
}
