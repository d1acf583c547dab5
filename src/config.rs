use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::effect::Effect;
use crate::error::{CaptionError, Result};
use crate::timing::FloorReclaim;
use crate::track::Header;

/// Caption granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CaptionMode {
    /// One caption per segment.
    #[default]
    Line,
    /// One caption per word, timed proportionally within its segment.
    Word,
}

/// What happens to the first (intro) segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IntroHandling {
    /// The intro gets no caption.
    #[default]
    Skip,
    /// The intro is shown as one unwrapped caption over its whole window.
    Single,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Ass,
    Srt,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    /// Upper bound on the reported track end time, in seconds.
    pub max_duration: f64,
    pub mode: CaptionMode,
    pub intro: IntroHandling,
    /// Words per line in line mode. `None` leaves segment text unwrapped.
    pub wrap_width: Option<usize>,
    /// Shift applied to every word start in word mode, compensating for
    /// captions trailing the audio.
    pub timing_offset: f64,
    pub min_word_duration: f64,
    pub floor_reclaim: FloorReclaim,
    pub effect: Option<Effect>,
    pub header: Header,
}

impl CaptionConfig {
    pub const DEFAULT_MAX_DURATION: f64 = 60.0;
    pub const DEFAULT_WRAP_WIDTH: usize = 7;
    pub const DEFAULT_TIMING_OFFSET: f64 = -0.12;
    pub const DEFAULT_MIN_WORD_DURATION: f64 = 0.15;

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| CaptionError::io("reading caption config", e))?;
        serde_json::from_str(&data).map_err(|source| CaptionError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The style name events are rendered with.
    pub fn style_name(&self) -> &str {
        self.header.primary_style()
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            output_path: std::env::temp_dir().join("captions.ass"),
            format: OutputFormat::default(),
            max_duration: Self::DEFAULT_MAX_DURATION,
            mode: CaptionMode::default(),
            intro: IntroHandling::default(),
            wrap_width: Some(Self::DEFAULT_WRAP_WIDTH),
            timing_offset: Self::DEFAULT_TIMING_OFFSET,
            min_word_duration: Self::DEFAULT_MIN_WORD_DURATION,
            floor_reclaim: FloorReclaim::default(),
            effect: None,
            header: Header::default(),
        }
    }
}
