use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ScrubError, ScrubResult};
use crate::scroll::marker::Marker;

/// Naming contract for the frame assets on disk.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameSequenceConfig {
    /// Number of frames, numbered `1..=total` on disk.
    pub total: usize,
    /// Path prefix before the zero-padded frame number.
    pub base_path: String,
    /// Suffix after the frame number, including the dot.
    pub extension: String,
    /// Minimum digit count of the frame number.
    pub pad_width: usize,
}

impl Default for FrameSequenceConfig {
    fn default() -> Self {
        Self {
            total: 242,
            base_path: "frames/frame-".to_string(),
            extension: ".jpg".to_string(),
            pad_width: 3,
        }
    }
}

impl FrameSequenceConfig {
    /// Source path of the 1-based frame `number`: `{base_path}{number:0pad}{extension}`.
    pub fn source_for(&self, number: usize) -> String {
        format!(
            "{}{:0width$}{}",
            self.base_path,
            number,
            self.extension,
            width = self.pad_width
        )
    }

    /// Rebase a relative `base_path` onto `root`. Absolute paths are left alone.
    pub fn rooted_at(&self, root: &Path) -> Self {
        let mut out = self.clone();
        if Path::new(&self.base_path).is_relative() {
            out.base_path = root.join(&self.base_path).to_string_lossy().into_owned();
        }
        out
    }
}

/// Options handed to the scroll-smoothing collaborator at construction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothScrollOptions {
    /// Fraction of the remaining distance covered per tick.
    pub lerp: f64,
    pub smooth_wheel: bool,
    pub sync_touch: bool,
}

impl Default for SmoothScrollOptions {
    fn default() -> Self {
        Self {
            lerp: 0.08,
            smooth_wheel: true,
            sync_touch: false,
        }
    }
}

/// Start/end markers plus scrub smoothing for the frame binding.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameTrigger {
    pub start: Marker,
    pub end: Marker,
    /// Seconds of catch-up smoothing the trigger applies; `0` tracks scroll exactly.
    pub scrub: f64,
}

impl Default for FrameTrigger {
    fn default() -> Self {
        Self {
            start: Marker::TOP_TOP,
            end: Marker::BOTTOM_BOTTOM,
            scrub: 0.5,
        }
    }
}

/// Linear opacity fade of a secondary element across a sub-range of the trigger region.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayFade {
    /// Element identifier passed back to the overlay target.
    pub element: String,
    pub start: Marker,
    pub end: Marker,
    #[serde(default = "one")]
    pub from: f32,
    #[serde(default)]
    pub to: f32,
}

fn one() -> f32 {
    1.0
}

impl OverlayFade {
    /// Opacity at progress `p` (already clamped to `[0, 1]`).
    pub fn opacity_at(&self, p: f64) -> f32 {
        self.from + (self.to - self.from) * p as f32
    }
}

fn default_overlays() -> Vec<OverlayFade> {
    vec![
        OverlayFade {
            element: "hero-overlay".to_string(),
            start: Marker {
                element: 0.2,
                viewport: 0.0,
            },
            end: Marker {
                element: 0.5,
                viewport: 0.0,
            },
            from: 1.0,
            to: 0.0,
        },
        OverlayFade {
            element: "hero-scroll-hint".to_string(),
            start: Marker {
                element: 0.05,
                viewport: 0.0,
            },
            end: Marker {
                element: 0.15,
                viewport: 0.0,
            },
            from: 1.0,
            to: 0.0,
        },
    ]
}

/// Top-level configuration of a scrub experience.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScrubConfig {
    pub frames: FrameSequenceConfig,
    /// Ambient surface size relative to the viewport.
    pub ambient_scale: f64,
    /// Gaussian blur radius applied to the ambient surface after each draw; `0` disables.
    pub ambient_blur_radius: u32,
    pub ambient_blur_sigma: f32,
    /// Quiet period before a resize burst is applied.
    pub resize_debounce_ms: u64,
    pub smoothing: SmoothScrollOptions,
    /// Identifier of the region whose scroll position drives playback.
    pub trigger_element: String,
    pub frame_binding: FrameTrigger,
    pub overlays: Vec<OverlayFade>,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            frames: FrameSequenceConfig::default(),
            ambient_scale: 1.1,
            ambient_blur_radius: 0,
            ambient_blur_sigma: 8.0,
            resize_debounce_ms: 200,
            smoothing: SmoothScrollOptions::default(),
            trigger_element: "hero".to_string(),
            frame_binding: FrameTrigger::default(),
            overlays: default_overlays(),
        }
    }
}

impl ScrubConfig {
    /// Read a JSON config. A relative `frames.base_path` is resolved against the file's directory.
    pub fn from_json_path(path: impl AsRef<Path>) -> ScrubResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: ScrubConfig = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ScrubError::serde(format!("parse config '{}': {e}", path.display())))?;
        cfg.validate()?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            frames: cfg.frames.rooted_at(&root),
            ..cfg
        })
    }

    pub fn validate(&self) -> ScrubResult<()> {
        if self.frames.total == 0 {
            return Err(ScrubError::validation("frames.total must be >= 1"));
        }
        if self.frames.pad_width == 0 {
            return Err(ScrubError::validation("frames.pad_width must be >= 1"));
        }
        if !self.ambient_scale.is_finite() || self.ambient_scale < 1.0 {
            return Err(ScrubError::validation(
                "ambient_scale must be finite and >= 1.0",
            ));
        }
        if self.ambient_blur_radius > 0
            && (!self.ambient_blur_sigma.is_finite() || self.ambient_blur_sigma <= 0.0)
        {
            return Err(ScrubError::validation(
                "ambient_blur_sigma must be finite and > 0 when blur is enabled",
            ));
        }
        if self.trigger_element.is_empty() {
            return Err(ScrubError::validation("trigger_element must be non-empty"));
        }
        let lerp = self.smoothing.lerp;
        if !lerp.is_finite() || lerp <= 0.0 || lerp > 1.0 {
            return Err(ScrubError::validation("smoothing.lerp must be in (0, 1]"));
        }
        if !self.frame_binding.scrub.is_finite() || self.frame_binding.scrub < 0.0 {
            return Err(ScrubError::validation(
                "frame_binding.scrub must be finite and >= 0",
            ));
        }
        for o in &self.overlays {
            if o.element.is_empty() {
                return Err(ScrubError::validation("overlay element must be non-empty"));
            }
            if !(0.0..=1.0).contains(&o.from) || !(0.0..=1.0).contains(&o.to) {
                return Err(ScrubError::validation(format!(
                    "overlay '{}' opacities must be in [0, 1]",
                    o.element
                )));
            }
        }
        Ok(())
    }
}
