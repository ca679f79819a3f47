use std::path::{Path, PathBuf};

use crate::config::{OutputFormat, Quality, RenderConfig};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::png::{PngSequenceSink, save_frame_png};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::KinetexResult;
use crate::render::backend::{FrameRGBA, Rasterizer};
use crate::render::cpu::CpuRasterizer;
use crate::script::builder::SceneScript;
use crate::timeline::director::{Director, DirectorState};

/// Counters for one timeline render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames that went through the rasterizer.
    pub frames_rendered: u64,
    /// Frames that reused the previous raster because nothing visible changed.
    pub frames_elided: u64,
    /// Cues fully played.
    pub completed_cues: usize,
    /// Set when the run stopped at a cue boundary on an abort request.
    pub aborted: Option<String>,
}

/// Result of [`render_script`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutcome {
    /// The finished artifact: an MP4 file or a PNG directory.
    pub path: PathBuf,
    pub report: RunReport,
}

/// Sample the director at every frame tick of `fps`, rasterize and push frames into `sink`.
///
/// Consecutive frames with the same fingerprint reuse the previous raster. If the timeline
/// fails, the frames of every completed cue have already been pushed; the sink is finalized
/// and the error is returned.
#[tracing::instrument(skip_all, fields(fps = fps.as_f64()))]
pub fn render_timeline(
    director: &mut Director,
    fps: Fps,
    rasterizer: &mut dyn Rasterizer,
    sink: &mut dyn FrameSink,
) -> KinetexResult<RunReport> {
    let canvas = rasterizer.canvas();
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
    })?;
    let mut report = RunReport::default();
    let played = push_frames(director, fps, rasterizer, sink, &mut report);
    let ended = sink.end();
    report.completed_cues = director.completed_cues();
    played?;
    ended?;
    tracing::debug!(
        frames_total = report.frames_total,
        frames_rendered = report.frames_rendered,
        frames_elided = report.frames_elided,
        "timeline rendered"
    );
    Ok(report)
}

fn push_frames(
    director: &mut Director,
    fps: Fps,
    rasterizer: &mut dyn Rasterizer,
    sink: &mut dyn FrameSink,
    report: &mut RunReport,
) -> KinetexResult<()> {
    let duration = director.timeline().duration();
    let frames = fps.secs_to_frames_round(duration).max(1);
    let mut last: Option<(u64, FrameRGBA)> = None;

    for f in 0..frames {
        let t = fps.frames_to_secs(f);
        if let DirectorState::Aborted { .. } = director.advance_to(t)? {
            report.aborted = director.failure().map(str::to_string);
            return Ok(());
        }
        let frame = director.render_frame(t);
        let fp = frame.fingerprint()?;
        match &last {
            Some((prev, _)) if *prev == fp => report.frames_elided += 1,
            _ => {
                last = Some((fp, rasterizer.rasterize(&frame)?));
                report.frames_rendered += 1;
            }
        }
        if let Some((_, raster)) = &last {
            sink.push_frame(FrameIndex(f), raster)?;
            report.frames_total += 1;
        }
    }
    director.advance_to(duration)?;
    Ok(())
}

/// Render a script to the artifact described by `cfg` with the CPU rasterizer.
#[tracing::instrument(skip(script))]
pub fn render_script(script: SceneScript, cfg: &RenderConfig) -> KinetexResult<RenderOutcome> {
    cfg.validate()?;
    let mut director = Director::new(script);
    let mut rasterizer = CpuRasterizer::new(cfg.quality.canvas())?;
    let path = cfg.artifact_path();
    let mut sink: Box<dyn FrameSink> = match cfg.format {
        OutputFormat::Mp4 => Box::new(FfmpegSink::new(FfmpegSinkOpts::new(&path))),
        OutputFormat::Png => Box::new(PngSequenceSink::new(&path)),
    };
    let report = render_timeline(
        &mut director,
        cfg.quality.fps(),
        &mut rasterizer,
        sink.as_mut(),
    )?;
    tracing::info!(path = %path.display(), frames = report.frames_total, "artifact written");
    if cfg.preview {
        open_preview(&path);
    }
    Ok(RenderOutcome { path, report })
}

/// Render the snapshot at time `t` to a PNG file.
pub fn render_still(script: SceneScript, quality: Quality, t: f64, out: &Path) -> KinetexResult<()> {
    let mut director = Director::new(script);
    director.advance_to(t)?;
    let frame = director.render_frame(t);
    let mut rasterizer = CpuRasterizer::new(quality.canvas())?;
    let raster = rasterizer.rasterize(&frame)?;
    save_frame_png(out, &raster, [0, 0, 0, 255])
}

fn open_preview(path: &Path) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    if let Err(e) = std::process::Command::new(opener).arg(path).spawn() {
        tracing::warn!(opener, error = %e, "could not open preview");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
