use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ScrubError, ScrubResult};
use crate::frames::store::{DecodedFrame, FrameLoader};

pub fn decode_frame(bytes: &[u8]) -> ScrubResult<DecodedFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ScrubError::decode("frame has zero-area dimensions"));
    }
    Ok(DecodedFrame {
        pixels: Arc::new(rgba),
    })
}

/// Loads frames from the local filesystem, treating each source as a path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsFrameLoader;

impl FrameLoader for FsFrameLoader {
    fn load(&self, source: &str) -> ScrubResult<DecodedFrame> {
        let path = Path::new(source);
        let bytes =
            std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
        decode_frame(&bytes).map_err(|e| ScrubError::decode(format!("{source}: {e}")))
    }
}
