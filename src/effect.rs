//! Animation directives attached to caption payloads.
//!
//! Effects are kept structured until serialisation, where they are rendered
//! as ASS override codes (`{\fad(..)}`, `\t(..)` transforms and so on).
//! Output formats without inline styling simply drop them.

use serde::Deserialize;

use crate::track::Colour;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Alpha fade in and out, in milliseconds.
    Fade { fade_in_ms: u32, fade_out_ms: u32 },
    /// Grow from `from_pct` to `peak_pct` and settle back to 100%.
    ScalePulse {
        from_pct: u32,
        peak_pct: u32,
        up_ms: u32,
        down_ms: u32,
    },
    /// Primary colour transition over `duration_ms`.
    ColorTransition {
        from: Colour,
        to: Colour,
        duration_ms: u32,
    },
    Composite { effects: Vec<Effect> },
}

impl Effect {
    /// The word-pop animation used for per-word captions.
    pub fn word_pop() -> Self {
        Effect::Composite {
            effects: vec![
                Effect::Fade {
                    fade_in_ms: 50,
                    fade_out_ms: 50,
                },
                Effect::ScalePulse {
                    from_pct: 95,
                    peak_pct: 110,
                    up_ms: 80,
                    down_ms: 80,
                },
            ],
        }
    }

    /// Override codes without the surrounding braces.
    pub fn ass_codes(&self) -> String {
        match self {
            Effect::Fade {
                fade_in_ms,
                fade_out_ms,
            } => format!("\\fad({},{})", fade_in_ms, fade_out_ms),
            Effect::ScalePulse {
                from_pct,
                peak_pct,
                up_ms,
                down_ms,
            } => format!(
                "\\fscx{from}\\fscy{from}\\t(0,{up},\\fscx{peak}\\fscy{peak})\\t({up},{settle},\\fscx100\\fscy100)",
                from = from_pct,
                peak = peak_pct,
                up = up_ms,
                settle = up_ms + down_ms,
            ),
            Effect::ColorTransition {
                from,
                to,
                duration_ms,
            } => format!(
                "\\1c{}\\t(0,{},\\1c{})",
                from.override_code(),
                duration_ms,
                to.override_code()
            ),
            Effect::Composite { effects } => effects.iter().map(Effect::ass_codes).collect(),
        }
    }

    /// The complete override block, e.g. `{\fad(100,100)}`.
    pub fn ass_block(&self) -> String {
        let codes = self.ass_codes();
        if codes.is_empty() {
            codes
        } else {
            format!("{{{}}}", codes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_block() {
        let effect = Effect::Fade {
            fade_in_ms: 120,
            fade_out_ms: 80,
        };
        assert_eq!(effect.ass_block(), "{\\fad(120,80)}");
    }

    #[test]
    fn scale_pulse_settles_at_full_size() {
        let effect = Effect::ScalePulse {
            from_pct: 95,
            peak_pct: 110,
            up_ms: 80,
            down_ms: 120,
        };
        assert_eq!(
            effect.ass_codes(),
            "\\fscx95\\fscy95\\t(0,80,\\fscx110\\fscy110)\\t(80,200,\\fscx100\\fscy100)"
        );
    }

    #[test]
    fn color_transition_uses_bgr_override_colours() {
        let effect = Effect::ColorTransition {
            from: Colour::new(0x00, 0xFF, 0xFF, 0xFF),
            to: Colour::new(0x00, 0x00, 0xFF, 0xFF),
            duration_ms: 200,
        };
        assert_eq!(
            effect.ass_codes(),
            "\\1c&HFFFFFF&\\t(0,200,\\1c&H00FFFF&)"
        );
    }

    #[test]
    fn composite_shares_one_block() {
        let block = Effect::word_pop().ass_block();
        assert!(block.starts_with("{\\fad(50,50)\\fscx95"));
        assert_eq!(block.matches('{').count(), 1);
        assert!(block.ends_with("\\fscx100\\fscy100)}"));
    }

    #[test]
    fn empty_composite_renders_nothing() {
        let effect = Effect::Composite { effects: vec![] };
        assert_eq!(effect.ass_block(), "");
    }

    #[test]
    fn deserialises_tagged_json() {
        let json = r#"{"kind": "composite", "effects": [
            {"kind": "fade", "fade_in_ms": 10, "fade_out_ms": 20},
            {"kind": "color_transition", "from": "&H00FFFFFF", "to": "&H0000FFFF", "duration_ms": 150}
        ]}"#;
        let effect: Effect = serde_json::from_str(json).unwrap();
        assert_eq!(
            effect.ass_block(),
            "{\\fad(10,20)\\1c&HFFFFFF&\\t(0,150,\\1c&H00FFFF&)}"
        );
    }
}
