use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::backend::FrameRGBA;

/// Sink that writes one opaque PNG per frame, `frame_000000.png`, ... into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    bg_rgba: [u8; 4],
    cfg: Option<SinkConfig>,
    scratch: Vec<u8>,
    written: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            bg_rgba: [0, 0, 0, 255],
            cfg: None,
            scratch: Vec::new(),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written since `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the file for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> KinetexResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create '{}'", self.dir.display()))?;
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetexResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| KinetexError::evaluation("png sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KinetexError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.bg_rgba)?;
        write_png(&self.frame_path(idx), frame.width, frame.height, &self.scratch)?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> KinetexResult<()> {
        tracing::debug!(dir = %self.dir.display(), frames = self.written, "png sequence finished");
        self.cfg = None;
        Ok(())
    }
}

/// Write opaque RGBA8 pixels to a PNG file.
pub fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> KinetexResult<()> {
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("failed to write png '{}'", path.display()))?;
    Ok(())
}

/// Flatten a premultiplied frame over `bg_rgba` and save it as a PNG.
pub fn save_frame_png(path: &Path, frame: &FrameRGBA, bg_rgba: [u8; 4]) -> KinetexResult<()> {
    let mut flat = vec![0u8; frame.data.len()];
    flatten_premul_over_bg(&mut flat, &frame.data, bg_rgba)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    write_png(path, frame.width, frame.height, &flat)
}
