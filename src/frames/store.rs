use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::config::FrameSequenceConfig;
use crate::foundation::error::{ScrubError, ScrubResult};

/// A successfully decoded frame, straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    pub pixels: Arc<image::RgbaImage>,
}

impl DecodedFrame {
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

#[derive(Clone, Debug)]
pub enum FrameState {
    Pending,
    Ready(DecodedFrame),
    /// Settled without usable pixels. Permanent; there is no retry.
    Failed(String),
}

/// One slot of the frame sequence.
#[derive(Clone, Debug)]
pub struct Frame {
    source: String,
    state: FrameState,
}

impl Frame {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.state, FrameState::Pending)
    }

    /// Decoded pixels, or `None` while pending or after a failed decode.
    pub fn decoded(&self) -> Option<&DecodedFrame> {
        match &self.state {
            FrameState::Ready(d) => Some(d),
            FrameState::Pending | FrameState::Failed(_) => None,
        }
    }
}

/// Source of decoded frames. Implementations run on the rayon pool.
pub trait FrameLoader: Send + Sync + 'static {
    fn load(&self, source: &str) -> ScrubResult<DecodedFrame>;
}

/// Count of settled frames out of the sequence length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// `round(loaded / total * 100)`.
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_complete(self) -> bool {
        self.loaded == self.total
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
}

/// Result of handling one settlement message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Duplicate or out-of-range settlement; nothing changed.
    Ignored,
    Progress(LoadProgress),
    /// The settlement that completed the sequence. Emitted exactly once.
    Ready(LoadProgress),
}

struct Settlement {
    index: usize,
    result: ScrubResult<DecodedFrame>,
}

type ReadyCallback = Box<dyn FnOnce(&[Frame])>;

/// Owns the frame sequence and tracks load completion.
///
/// Decodes run concurrently on the rayon pool and settle in arbitrary order. Settlements are
/// only applied on the owning thread through [`FrameStore::pump`], so the completion counter
/// never races.
pub struct FrameStore {
    config: FrameSequenceConfig,
    frames: Vec<Frame>,
    loaded: usize,
    phase: LoadPhase,
    tx: Sender<Settlement>,
    rx: Receiver<Settlement>,
    on_ready: Vec<ReadyCallback>,
}

impl FrameStore {
    pub fn new(config: FrameSequenceConfig) -> Self {
        let frames = (1..=config.total)
            .map(|n| Frame {
                source: config.source_for(n),
                state: FrameState::Pending,
            })
            .collect();
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            frames,
            loaded: 0,
            phase: LoadPhase::Idle,
            tx,
            rx,
            on_ready: Vec::new(),
        }
    }

    pub fn config(&self) -> &FrameSequenceConfig {
        &self.config
    }

    /// Issue one decode request per frame. Calls after the first are ignored.
    #[tracing::instrument(skip_all, fields(total = self.frames.len()))]
    pub fn begin_load(&mut self, loader: Arc<dyn FrameLoader>) {
        if self.phase != LoadPhase::Idle {
            tracing::debug!("begin_load called again; ignoring");
            return;
        }
        self.phase = LoadPhase::Loading;

        for (index, frame) in self.frames.iter().enumerate() {
            let tx = self.tx.clone();
            let loader = Arc::clone(&loader);
            let source = frame.source.clone();
            rayon::spawn(move || {
                let result = loader.load(&source);
                // The store may already be gone; a dropped receiver is fine.
                let _ = tx.send(Settlement { index, result });
            });
        }
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded: self.loaded,
            total: self.frames.len(),
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Register a one-shot callback fired when every frame has settled.
    ///
    /// Fires immediately if the store is already ready.
    pub fn on_ready(&mut self, callback: impl FnOnce(&[Frame]) + 'static) {
        if self.is_ready() {
            callback(&self.frames);
        } else {
            self.on_ready.push(Box::new(callback));
        }
    }

    /// Apply one settlement. Success and failure count identically toward completion.
    pub fn settle(&mut self, index: usize, result: ScrubResult<DecodedFrame>) -> SettleOutcome {
        let Some(frame) = self.frames.get_mut(index) else {
            tracing::warn!(index, "settlement for out-of-range frame ignored");
            return SettleOutcome::Ignored;
        };
        if frame.is_settled() {
            tracing::warn!(index, source = %frame.source, "duplicate settlement ignored");
            return SettleOutcome::Ignored;
        }

        frame.state = match result {
            Ok(decoded) => {
                tracing::debug!(index, source = %frame.source, "frame decoded");
                FrameState::Ready(decoded)
            }
            Err(err) => {
                tracing::warn!(index, source = %frame.source, error = %err, "frame failed to decode");
                FrameState::Failed(err.to_string())
            }
        };
        self.loaded += 1;

        let progress = self.progress();
        if !progress.is_complete() {
            return SettleOutcome::Progress(progress);
        }

        self.phase = LoadPhase::Ready;
        tracing::info!(total = progress.total, "all frames settled");
        for callback in std::mem::take(&mut self.on_ready) {
            callback(&self.frames);
        }
        SettleOutcome::Ready(progress)
    }

    /// Apply every settlement that has arrived so far without blocking.
    pub fn pump(&mut self) -> Vec<SettleOutcome> {
        let mut out = Vec::new();
        while let Ok(s) = self.rx.try_recv() {
            let outcome = self.settle(s.index, s.result);
            if outcome != SettleOutcome::Ignored {
                out.push(outcome);
            }
        }
        out
    }

    /// Block until the store is ready or `timeout` elapses.
    pub fn pump_until_ready(&mut self, timeout: Duration) -> ScrubResult<Vec<SettleOutcome>> {
        let deadline = Instant::now() + timeout;
        let mut out = self.pump();
        while !self.is_ready() {
            if self.phase == LoadPhase::Idle {
                return Err(ScrubError::validation(
                    "pump_until_ready called before begin_load",
                ));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(s) => {
                    let outcome = self.settle(s.index, s.result);
                    if outcome != SettleOutcome::Ignored {
                        out.push(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let p = self.progress();
                    return Err(ScrubError::decode(format!(
                        "timed out waiting for frames ({}/{} settled)",
                        p.loaded, p.total
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ScrubError::decode("frame settlement channel closed"));
                }
            }
        }
        Ok(out)
    }
}
