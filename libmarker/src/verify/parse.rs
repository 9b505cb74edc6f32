use std::iter;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{digit0, one_of},
    combinator::{all_consuming, map_res, recognize},
    sequence::{pair, separated_pair},
    IResult,
};

use crate::scan::MarkerHit;

fn line_break(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\r"), tag("\n")))(input)
}

fn line(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c == '\r' || c == '\n')(input)
}

/// Splits `input` on `\r\n`, `\r` or `\n` and yields the non-empty lines with their 1-based
/// line numbers
pub(crate) fn non_empty_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = Some(input);
    iter::from_fn(move || {
        let (after, content) = line(rest?).ok()?;
        rest = if after.is_empty() {
            None
        } else {
            line_break(after).ok().map(|(next, _)| next)
        };
        Some(content)
    })
    .enumerate()
    .filter(|(_, line)| !line.is_empty())
    .map(|(i, line)| (i + 1, line))
}

// `0` or a decimal without leading zeros
fn number(input: &str) -> IResult<&str, u32> {
    map_res(
        alt((tag("0"), recognize(pair(one_of("123456789"), digit0)))),
        |d: &str| d.parse::<u32>(),
    )(input)
}

pub(crate) fn coordinate(input: &str) -> IResult<&str, MarkerHit> {
    let (input, (x, y)) = separated_pair(number, tag(", "), number)(input)?;
    Ok((input, MarkerHit::new(x, y)))
}

/// Parses a whole line of an expected output file
pub(crate) fn parse_line(line: &str) -> Option<MarkerHit> {
    all_consuming(coordinate)(line).ok().map(|(_, hit)| hit)
}
