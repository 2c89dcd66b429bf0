//! Framescrub plays an image-sequence animation keyed to scroll position.
//!
//! A [`FrameStore`] preloads the numbered frames concurrently, a [`ProgressMapper`] turns
//! normalized scroll progress into a frame index, and a [`Renderer`] draws that frame into a
//! contain-fit foreground surface and a cover-fit ambient surface. [`ScrubEngine`] owns the
//! pieces and is driven by explicit timestamps from a single event loop.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod frames;
pub(crate) mod loading;
pub(crate) mod render;
pub(crate) mod resize;
pub(crate) mod scroll;
/// Reference scroll and display collaborators for headless drivers.
pub mod sim;

pub use crate::config::{
    FrameSequenceConfig, FrameTrigger, OverlayFade, ScrubConfig, SmoothScrollOptions,
};
pub use crate::engine::{Collaborators, ScrubEngine};
pub use crate::foundation::core::{Rect, Size, SurfaceSize, Viewport, unit_clamp};
pub use crate::foundation::error::{ScrubError, ScrubResult};
pub use crate::frames::decode::{FsFrameLoader, decode_frame};
pub use crate::frames::store::{
    DecodedFrame, Frame, FrameLoader, FrameState, FrameStore, LoadPhase, LoadProgress,
    SettleOutcome,
};
pub use crate::loading::{LoadProgressReporter, ProgressIndicator};
pub use crate::render::blur::blur_rgba8_in_place;
pub use crate::render::fit::{FitAxis, FitMode, fit_axis, fit_rect};
pub use crate::render::renderer::Renderer;
pub use crate::render::surface::{Surface, SurfaceGeometry};
pub use crate::resize::ResizeCoordinator;
pub use crate::scroll::bridge::{
    BindingId, OverlayTarget, ProgressUpdate, ScrollBridge, ScrollSmoother, ScrollTrigger,
    TriggerBinding,
};
pub use crate::scroll::mapper::ProgressMapper;
pub use crate::scroll::marker::{Marker, RegionGeometry};
