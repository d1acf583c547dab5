//! Caption timing and rendering for narrated short videos.
//!
//! [`CaptionEngine`] turns a list of narration segments and the cumulative
//! timeline of their audio into a subtitle track, either one caption per
//! segment or one animated caption per word.

pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod layout;
pub mod parser;
pub mod serialiser;
pub mod timing;
pub mod track;

pub use config::{CaptionConfig, CaptionMode, IntroHandling, OutputFormat};
pub use effect::Effect;
pub use engine::{CaptionEngine, Rendered};
pub use error::CaptionError;
pub use serialiser::format_timestamp;
pub use timing::FloorReclaim;
pub use track::{Colour, Event, Header, Payload, Style, Track};
