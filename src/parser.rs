use crate::error::{CaptionError, Result};
use crate::track::{Colour, Event, Payload};

use nom::bytes::complete::{tag, tag_no_case, take_till, take_while, take_while1, take_while_m_n};
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{map_res, opt, rest};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::separated_list0;
use nom::number::complete::double;
use nom::sequence::terminated;
use nom::{error_position, Err, IResult};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Runs `parser` over the whole of `input`, rendering failures with context.
fn complete<'a, T>(
    input: &'a str,
    what: &str,
    parser: impl Fn(&'a str) -> ParseResult<'a, T>,
) -> Result<T> {
    match parser(input).and_then(|(rem, value)| end_of_file(rem).map(|(rem, _)| (rem, value))) {
        Ok((_, value)) => Ok(value),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            let conv = convert_error(input, err);
            Err(CaptionError::Parse(format!("Failed to parse {}:\n{}", what, conv)))
        }
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

/// Parses a timeline: seconds as decimal numbers separated by whitespace
/// and/or commas.
pub fn parse_timeline(input: &str) -> Result<Vec<f64>> {
    complete(input, "timeline", timeline)
}

/// Collects every `Dialogue:` event of an ASS track. Other lines are ignored.
pub fn parse_track(input: &str) -> Result<Vec<Event>> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    input
        .lines()
        .filter(|line| line.starts_with("Dialogue:"))
        .map(|line| complete(line, "dialogue line", dialogue))
        .collect()
}

/// Parses an ASS colour such as `&H64000000`. Six-digit colours are opaque.
pub fn parse_colour(input: &str) -> Result<Colour> {
    complete(input.trim(), "colour", colour)
}

fn end_of_file(input: &str) -> ParseResult<&str> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn timeline(input: &str) -> ParseResult<Vec<f64>> {
    let (input, _) = take_while(is_separator)(input)?;
    let (input, points) = separated_list0(take_while1(is_separator), double)(input)?;
    let (input, _) = take_while(is_separator)(input)?;
    Ok((input, points))
}

fn dialogue(input: &str) -> ParseResult<Event> {
    let (input, _) = tag("Dialogue:")(input)?;
    let (input, _) = space0(input)?;
    let (input, layer) = terminated(number, char(','))(input)?;
    let (input, start) = terminated(timestamp, char(','))(input)?;
    let (input, end) = terminated(timestamp, char(','))(input)?;
    let (input, style) = terminated(take_till(|c: char| c == ','), char(','))(input)?;
    let (input, text) = rest(input)?;

    Ok((
        input,
        Event {
            layer,
            start: start as f64 / 100.0,
            end: end as f64 / 100.0,
            style: style.trim().to_string(),
            text: Payload::new(text.split("\\N").map(String::from).collect(), None),
        },
    ))
}

/// An `H:MM:SS.CC` timestamp, in centiseconds.
fn timestamp(input: &str) -> ParseResult<u64> {
    const CS_MAX: usize = 2;
    let take_cs = || {
        map_res(
            take_while_m_n(1, CS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                // `.5` means half a second, so pad on the right.
                format!("{:0<2}", s).parse::<u64>()
            },
        )
    };
    let take_ms = || {
        map_res(
            take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
            |s: &str| s.parse::<u64>(),
        )
    };

    let (input, hours) = number(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_ms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_ms()(input)?;
    let (input, _) = tag(".")(input)?;
    let (input, cs) = take_cs()(input)?;

    Ok((
        input,
        cs + seconds * 100 + minutes * 60 * 100 + u64::from(hours) * 60 * 60 * 100,
    ))
}

fn colour(input: &str) -> ParseResult<Colour> {
    let (input, _) = tag_no_case("&H")(input)?;
    let (input, digits) = take_while_m_n(6, 8, |c: char| c.is_ascii_hexdigit())(input)?;
    if digits.len() == 7 {
        return Err(Err::Error(error_position!(digits, ErrorKind::HexDigit)));
    }
    let (input, _) = opt(char('&'))(input)?;

    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    let colour = if digits.len() == 8 {
        Colour::new(byte(0), byte(2), byte(4), byte(6))
    } else {
        Colour::new(0, byte(0), byte(2), byte(4))
    };
    Ok((input, colour))
}

fn number(input: &str) -> ParseResult<u32> {
    map_res(digit1, |s: &str| s.parse())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_read_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                let (_, cs) = timestamp(input).unwrap();

                assert_eq!(cs, expected);
            }
        )*
        }
    }

    test_read_ts! {
        test_read_ts_0: ("0:00:01.20", 120),
        test_read_ts_1: ("0:00:01.2", 120),
        test_read_ts_2: ("0:00:01.02", 102),
        test_read_ts_3: ("0:00:00.00", 0),
        test_read_ts_4: ("1:01:01.50", 366150),
        test_read_ts_5: ("1:1:1.50", 366150),
        test_read_ts_6: ("12:00:00.99", 4320099),
    }

    #[test]
    fn timestamp_requires_centiseconds() {
        assert!(timestamp("0:00:01").is_err());
        assert!(timestamp("0:00:01.").is_err());
    }

    #[test]
    fn parses_timeline_with_mixed_separators() {
        let points = parse_timeline("0.0, 1.5\n3\t4.25,\n").unwrap();
        assert_eq!(points, vec![0.0, 1.5, 3.0, 4.25]);
    }

    #[test]
    fn parses_empty_timeline() {
        assert!(parse_timeline("  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_garbage_in_timeline() {
        match parse_timeline("0.0 1.0 two") {
            Err(CaptionError::Parse(msg)) => assert!(msg.contains("timeline")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parses_dialogue_line() {
        let line = "Dialogue: 0,0:00:01.00,0:00:03.50,Dynamic,{\\fad(50,50)}Hello\\Nworld";
        let (rem, event) = dialogue(line).unwrap();
        assert!(rem.is_empty());
        assert_eq!(event.layer, 0);
        assert_eq!(event.start, 1.0);
        assert_eq!(event.end, 3.5);
        assert_eq!(event.style, "Dynamic");
        assert_eq!(event.text.lines, vec!["{\\fad(50,50)}Hello", "world"]);
    }

    #[test]
    fn dialogue_text_may_contain_commas() {
        let line = "Dialogue: 1,0:00:00.00,0:00:00.50,Pop,Wait, what?";
        let (_, event) = dialogue(line).unwrap();
        assert_eq!(event.layer, 1);
        assert_eq!(event.text.lines, vec!["Wait, what?"]);
    }

    #[test]
    fn track_skips_non_event_lines() {
        let track = "\u{FEFF}[Script Info]\r\nScriptType: v4.00+\r\n\r\n[Events]\r\n\
                     Format: Layer, Start, End, Style, Text\r\n\
                     Dialogue: 0,0:00:01.00,0:00:02.00,Dynamic,One\r\n\
                     Dialogue: 0,0:00:02.00,0:00:03.00,Dynamic,Two\r\n";
        let events = parse_track(track).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].text.lines, vec!["Two"]);
    }

    #[test]
    fn malformed_dialogue_fails_the_track() {
        let track = "Dialogue: 0,0:00:01,0:00:02.00,Dynamic,Broken";
        assert!(matches!(parse_track(track), Err(CaptionError::Parse(_))));
    }

    #[test]
    fn parses_colours() {
        assert_eq!(
            parse_colour("&H64000000").unwrap(),
            Colour::new(0x64, 0x00, 0x00, 0x00)
        );
        assert_eq!(
            parse_colour("&h00ff8000&").unwrap(),
            Colour::new(0x00, 0xFF, 0x80, 0x00)
        );
        assert_eq!(
            parse_colour("&HFFFFFF").unwrap(),
            Colour::new(0x00, 0xFF, 0xFF, 0xFF)
        );
        assert!(parse_colour("&H1234567").is_err());
        assert!(parse_colour("#FFFFFF").is_err());
    }
}
