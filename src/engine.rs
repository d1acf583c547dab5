use std::path::PathBuf;

use tracing::{debug, info, info_span, warn, Span};

use crate::config::{CaptionConfig, CaptionMode, IntroHandling};
use crate::error::{CaptionError, Result};
use crate::layout::wrap_words;
use crate::serialiser;
use crate::timing;
use crate::track::{Event, Payload, Track};

/// Shortest window any caption is shown for, in seconds.
pub const MIN_WINDOW: f64 = 0.01;

/// Result of a successful [`CaptionEngine::generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Track end, clamped to the configured max duration.
    pub end_time: f64,
    pub path: PathBuf,
}

/// Turns narration segments and their timeline into a caption track.
///
/// `segments[i]` is shown between `timeline[i]` and `timeline[i + 1]`. The
/// first segment is the intro and is handled according to
/// [`CaptionConfig::intro`].
pub struct CaptionEngine {
    config: CaptionConfig,
    span: Span,
}

impl CaptionEngine {
    pub fn new(config: CaptionConfig) -> Self {
        Self {
            config,
            span: info_span!("captions"),
        }
    }

    /// Logs under `span` instead of the engine's own.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    /// Builds the track and writes it to the configured output path.
    pub fn generate<S: AsRef<str>>(&self, segments: &[S], timeline: &[f64]) -> Result<Rendered> {
        let track = self.build_track(segments, timeline)?;

        let _enter = self.span.enter();
        let path = self.config.output_path.clone();
        serialiser::serialise(&track, self.config.format, &path)?;
        info!(
            "Caption track with {} events written to {}",
            track.events.len(),
            path.display()
        );

        Ok(Rendered {
            end_time: track.end_time,
            path,
        })
    }

    /// Computes the track in memory without touching the filesystem.
    pub fn build_track<S: AsRef<str>>(&self, segments: &[S], timeline: &[f64]) -> Result<Track> {
        let _enter = self.span.enter();
        validate(segments.len(), timeline.len())?;

        let mut events = Vec::new();
        if self.config.intro == IntroHandling::Single {
            events.push(self.event(
                timeline[0],
                timeline[1],
                vec![segments[0].as_ref().to_string()],
            ));
        }

        for (i, segment) in segments.iter().enumerate().skip(1) {
            let (start, end) = (timeline[i], timeline[i + 1]);
            if end < start {
                warn!(
                    "Timeline runs backwards at segment {} ({} > {})",
                    i, start, end
                );
            }
            match self.config.mode {
                CaptionMode::Line => {
                    let lines = wrap_words(segment.as_ref(), self.config.wrap_width);
                    events.push(self.event(start, end, lines));
                }
                CaptionMode::Word => self.push_words(&mut events, segment.as_ref(), start, end),
            }
        }

        // `timeline` holds at least two points past validation.
        let last = timeline[timeline.len() - 1];
        let end_time = last.min(self.config.max_duration);
        debug!(
            "Built {} caption events, track ends at {:.2}s",
            events.len(),
            end_time
        );

        Ok(Track {
            header: self.config.header.clone(),
            events,
            end_time,
        })
    }

    fn push_words(&self, events: &mut Vec<Event>, segment: &str, start: f64, end: f64) {
        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.is_empty() {
            debug!("Skipping segment without words");
            return;
        }

        let durations = timing::allocate(
            &words,
            end - start,
            self.config.min_word_duration,
            self.config.floor_reclaim,
        );

        let mut cursor = start;
        for (word, duration) in words.iter().zip(durations) {
            let shifted = cursor + self.config.timing_offset;
            // Renderers cannot show anything before zero.
            let word_start = shifted.max(0.0);
            let word_end = (shifted + duration).max(word_start + MIN_WINDOW);
            events.push(Event {
                layer: 0,
                start: word_start,
                end: word_end,
                style: self.config.style_name().to_string(),
                text: Payload::new(vec![word.to_string()], self.config.effect.clone()),
            });
            cursor += duration;
        }
    }

    fn event(&self, start: f64, end: f64, lines: Vec<String>) -> Event {
        Event {
            layer: 0,
            start,
            end: end.max(start + MIN_WINDOW),
            style: self.config.style_name().to_string(),
            text: Payload::new(lines, self.config.effect.clone()),
        }
    }
}

fn validate(segment_count: usize, timeline_len: usize) -> Result<()> {
    if segment_count == 0 {
        return Err(CaptionError::invalid_input("caption list cannot be empty"));
    }
    if timeline_len < segment_count + 1 {
        return Err(CaptionError::invalid_input(format!(
            "timeline has {} points but {} segments need at least {}",
            timeline_len,
            segment_count,
            segment_count + 1
        )));
    }
    Ok(())
}
