use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KinetexError, KinetexResult};

/// Output resolution and frame rate preset.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// 854x480 at 15 fps.
    Low,
    /// 1280x720 at 30 fps.
    #[default]
    Medium,
    /// 1920x1080 at 60 fps.
    High,
    /// 3840x2160 at 60 fps.
    #[value(name = "four-k", alias = "4k")]
    #[serde(alias = "4k")]
    FourK,
}

impl Quality {
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Low => (854, 480),
            Self::Medium => (1280, 720),
            Self::High => (1920, 1080),
            Self::FourK => (3840, 2160),
        };
        Canvas { width, height }
    }

    pub fn fps(self) -> Fps {
        let num = match self {
            Self::Low => 15,
            Self::Medium => 30,
            Self::High | Self::FourK => 60,
        };
        Fps { num, den: 1 }
    }

    /// Directory tag, e.g. `720p30`.
    pub fn tag(self) -> String {
        format!("{}p{}", self.canvas().height, self.fps().num)
    }
}

/// Artifact container.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// H.264 MP4 through the system `ffmpeg`.
    #[default]
    Mp4,
    /// Numbered PNG files in a directory.
    Png,
}

/// Entry-point configuration: what to render and where the artifact goes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub quality: Quality,
    /// File stem of the artifact.
    pub output_name: String,
    /// Root directory; artifacts go under `<output_dir>/<quality tag>/`.
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Open the artifact with the system viewer when done.
    pub preview: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            output_name: crate::script::liquidity::SCENE_NAME.to_string(),
            output_dir: PathBuf::from("media"),
            format: OutputFormat::default(),
            preview: false,
        }
    }
}

impl RenderConfig {
    /// Parse a config from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> KinetexResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| KinetexError::validation(format!("parse render config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> KinetexResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KinetexError::validation(format!("open render config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> KinetexResult<()> {
        let name = self.output_name.trim();
        if name.is_empty() {
            return Err(KinetexError::validation("output_name must not be empty"));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(KinetexError::validation(format!(
                "output_name '{name}' must be a plain file stem"
            )));
        }
        Ok(())
    }

    /// Final artifact path: an `.mp4` file, or a directory for PNG sequences.
    pub fn artifact_path(&self) -> PathBuf {
        let dir = self.output_dir.join(self.quality.tag());
        match self.format {
            OutputFormat::Mp4 => dir.join(format!("{}.mp4", self.output_name)),
            OutputFormat::Png => dir.join(&self.output_name),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
