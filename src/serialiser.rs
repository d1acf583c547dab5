use crate::config::OutputFormat;
use crate::error::{CaptionError, Result};
use crate::track::{Event, Header, Payload, Style, Track};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Text";

/// Writes `track` to `output`, creating missing parent directories.
///
/// The track is written to a sibling staging file which is renamed over
/// `output` once complete, so a failed write never leaves a truncated track
/// behind.
pub fn serialise<P: AsRef<Path>>(track: &Track, format: OutputFormat, output: P) -> Result<()> {
    let output = output.as_ref();
    let fail = |e: io::Error| CaptionError::write_failure(output, e);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(fail)?;
        }
    }

    let staging = staging_path(output);
    let written = write_file(&staging, track, format).and_then(|_| fs::rename(&staging, output));
    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(fail(e));
    }
    Ok(())
}

fn staging_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("captions"));
    name.push(".partial");
    output.with_file_name(name)
}

fn write_file(path: &Path, track: &Track, format: OutputFormat) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        OutputFormat::Ass => write_ass(&mut writer, track)?,
        OutputFormat::Srt => write_srt(&mut writer, track)?,
    }
    writer.flush()
}

/// Renders `track` as an ASS script.
pub fn write_ass<W: Write>(buf: &mut W, track: &Track) -> io::Result<()> {
    write_header(buf, &track.header)?;
    for (i, event) in track.events.iter().enumerate() {
        if i > 0 {
            writeln!(buf)?;
        }
        write_dialogue(buf, event)?;
    }
    Ok(())
}

fn write_header<W: Write>(buf: &mut W, header: &Header) -> io::Result<()> {
    writeln!(buf, "[Script Info]")?;
    writeln!(buf, "ScriptType: v4.00+")?;
    writeln!(buf, "PlayResX: {}", header.play_res_x)?;
    writeln!(buf, "PlayResY: {}", header.play_res_y)?;
    writeln!(buf)?;
    writeln!(buf, "[V4+ Styles]")?;
    writeln!(buf, "{}", STYLE_FORMAT)?;
    for style in &header.styles {
        write_style(buf, style)?;
    }
    writeln!(buf)?;
    writeln!(buf, "[Events]")?;
    writeln!(buf, "{}", EVENT_FORMAT)?;
    Ok(())
}

fn write_style<W: Write>(buf: &mut W, s: &Style) -> io::Result<()> {
    let flag = |b: bool| if b { 1 } else { 0 };
    writeln!(
        buf,
        "Style: {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
        s.name,
        s.font_name,
        s.font_size,
        s.primary_colour,
        s.secondary_colour,
        s.outline_colour,
        s.back_colour,
        flag(s.bold),
        flag(s.italic),
        flag(s.underline),
        flag(s.strike_out),
        s.scale_x,
        s.scale_y,
        s.spacing,
        s.angle,
        s.border_style,
        s.outline,
        s.shadow,
        s.alignment,
        s.margin_l,
        s.margin_r,
        s.margin_v,
        s.encoding
    )
}

fn write_dialogue<W: Write>(buf: &mut W, event: &Event) -> io::Result<()> {
    write!(buf, "Dialogue: {},", event.layer)?;
    write_ass_ts(buf, event.start)?;
    write!(buf, ",")?;
    write_ass_ts(buf, event.end)?;
    write!(buf, ",{},{}", event.style, ass_text(&event.text))
}

fn ass_text(payload: &Payload) -> String {
    let mut text = payload
        .effect
        .as_ref()
        .map(|e| e.ass_block())
        .unwrap_or_default();
    text.push_str(&payload.lines.join("\\N"));
    text
}

/// Renders `track` as SubRip. Animations have no SRT equivalent and are
/// dropped.
pub fn write_srt<W: Write>(buf: &mut W, track: &Track) -> io::Result<()> {
    for (i, event) in track.events.iter().enumerate() {
        writeln!(buf, "{}", i + 1)?;
        write_srt_ts(buf, event.start)?;
        write!(buf, " --> ")?;
        write_srt_ts(buf, event.end)?;
        writeln!(buf)?;
        for line in &event.text.lines {
            writeln!(buf, "{}", line)?;
        }
        writeln!(buf)?;
    }
    Ok(())
}

/// Splits `seconds` into whole seconds and the fractional remainder.
///
/// Negative and non-finite values collapse to zero. The value is quantised
/// to whole microseconds first so that e.g. `2.9999999` reads as `3`.
fn split_seconds(seconds: f64) -> (u64, f64) {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let seconds = (seconds * 1e6).round() / 1e6;
    let whole = seconds.trunc();
    (whole as u64, seconds - whole)
}

/// Formats `seconds` as `H:MM:SS.CC`, truncating to centiseconds.
pub fn format_timestamp(seconds: f64) -> String {
    let mut buf = Vec::with_capacity(10);
    // Writing into a Vec cannot fail.
    let _ = write_ass_ts(&mut buf, seconds);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_ass_ts<W: Write>(buf: &mut W, seconds: f64) -> io::Result<()> {
    let (total_secs, fraction) = split_seconds(seconds);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let centis = (fraction * 100.0) as u64;
    write!(buf, "{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

fn write_srt_ts<W: Write>(buf: &mut W, seconds: f64) -> io::Result<()> {
    let (total_secs, fraction) = split_seconds(seconds);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = (fraction * 1000.0) as u64;
    write!(buf, "{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
