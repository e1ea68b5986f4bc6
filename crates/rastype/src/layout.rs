//! Line breaking for wrapped rendering
//!
//! Splitting happens in two stages. Hard breaks come first: `\n`, a lone
//! `\r`, and the `\r\n` pair each end a line unconditionally. Soft
//! wrapping then chops every hard line to a pixel width using a greedy
//! fit: take as many characters as the width allows, back up to the last
//! space or tab so words stay whole, and only cut through a word when a
//! single word is wider than the whole wrap box. Measuring is injected as
//! a closure so this logic never has to know about fonts.

use std::ops::Range;

use rastype_core::WrapAlign;

/// Byte ranges of the hard lines in `text`
///
/// A trailing newline does not open an empty final line, matching how
/// terminals treat a terminated last line.
pub(crate) fn hard_lines(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(start..i);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(start..i);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() || lines.is_empty() {
        lines.push(start..bytes.len());
    }
    lines
}

/// Wraps one hard line to a width, returning byte ranges into `text`
///
/// `fit` reports how many characters of a slice fit. A `wrap_width` of
/// zero disables soft wrapping entirely. Trailing spaces and tabs are
/// trimmed from every produced segment; the whitespace a break lands on
/// is consumed and starts no line.
pub(crate) fn wrap_line<E>(
    text: &str,
    line: Range<usize>,
    wrap_width: u32,
    mut fit: impl FnMut(&str) -> Result<usize, E>,
) -> Result<Vec<Range<usize>>, E> {
    let mut segments = Vec::new();
    if wrap_width == 0 || line.is_empty() {
        segments.push(trim_end(text, line));
        return Ok(segments);
    }

    let mut start = line.start;
    while start < line.end {
        let rest = &text[start..line.end];
        let count = fit(rest)?;
        if count >= rest.chars().count() {
            segments.push(trim_end(text, start..line.end));
            break;
        }

        let fit_bytes = byte_at_char(rest, count);
        let (end_rel, next_rel) = match rest[..fit_bytes].rfind([' ', '\t']) {
            // Break at the whitespace and swallow it
            Some(ws) if ws > 0 => (ws, ws + 1),
            // No break opportunity: cut the word, but always make progress
            _ => {
                let cut = if fit_bytes > 0 {
                    fit_bytes
                } else {
                    rest.chars().next().map(char::len_utf8).unwrap_or(1)
                };
                (cut, cut)
            }
        };
        segments.push(trim_end(text, start..start + end_rel));
        start += next_rel;
    }

    if segments.is_empty() {
        segments.push(line.start..line.start);
    }
    Ok(segments)
}

/// Horizontal shift of one line inside the wrapped surface
pub(crate) fn align_offset(align: WrapAlign, surface_width: i32, line_width: i32) -> i32 {
    match align {
        WrapAlign::Left => 0,
        WrapAlign::Center => (surface_width - line_width) / 2,
        WrapAlign::Right => surface_width - line_width,
    }
}

fn trim_end(text: &str, range: Range<usize>) -> Range<usize> {
    let trimmed = text[range.clone()].trim_end_matches([' ', '\t']);
    range.start..range.start + trimmed.len()
}

fn byte_at_char(s: &str, count: usize) -> usize {
    s.char_indices().nth(count).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Fixed-width measuring: every char is one unit, `max` units fit
    fn fit_chars(max: usize) -> impl FnMut(&str) -> Result<usize, Infallible> {
        move |s| Ok(s.chars().count().min(max))
    }

    fn wrap(text: &str, width: u32, max_chars: usize) -> Vec<String> {
        hard_lines(text)
            .into_iter()
            .flat_map(|line| wrap_line(text, line, width, fit_chars(max_chars)).unwrap())
            .map(|r| text[r].to_string())
            .collect()
    }

    #[test]
    fn hard_breaks_cover_every_newline_flavor() {
        let text = "one\ntwo\rthree\r\nfour";
        let lines: Vec<_> = hard_lines(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(lines, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn trailing_newline_opens_no_extra_line() {
        let text = "alpha\n";
        let lines = hard_lines(text);
        assert_eq!(lines.len(), 1);
        assert_eq!(&text[lines[0].clone()], "alpha");

        // But an interior blank line survives
        let text = "alpha\n\nbeta";
        let lines: Vec<_> = hard_lines(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(lines, vec!["alpha", "", "beta"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(hard_lines(""), vec![0..0]);
    }

    #[test]
    fn words_wrap_at_spaces() {
        assert_eq!(wrap("the quick brown fox", 100, 10), [
            "the quick",
            "brown fox",
        ]);
    }

    #[test]
    fn long_words_break_mid_word() {
        assert_eq!(wrap("incomprehensible", 100, 6), [
            "incomp",
            "rehens",
            "ible",
        ]);
    }

    #[test]
    fn zero_width_disables_wrapping() {
        assert_eq!(wrap("left as one line", 0, 4), ["left as one line"]);
    }

    #[test]
    fn break_whitespace_is_swallowed() {
        // The space the line breaks on starts no line and trails no line
        let lines = wrap("ab  cd", 100, 5);
        assert_eq!(lines, ["ab", "cd"]);
    }

    #[test]
    fn each_segment_loses_trailing_whitespace() {
        assert_eq!(wrap("word   \nnext", 100, 20), ["word", "next"]);
    }

    #[test]
    fn always_progresses_even_when_nothing_fits() {
        // Width that fits zero chars still emits one char per line
        // instead of looping forever
        assert_eq!(wrap("abc", 1, 0), ["a", "b", "c"]);
    }

    #[test]
    fn multibyte_chars_never_split() {
        let lines = wrap("héllo wörld", 100, 6);
        assert_eq!(lines, ["héllo", "wörld"]);
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(align_offset(WrapAlign::Left, 100, 40), 0);
        assert_eq!(align_offset(WrapAlign::Center, 100, 40), 30);
        assert_eq!(align_offset(WrapAlign::Right, 100, 40), 60);
    }
}
