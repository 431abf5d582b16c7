//! `\r\n` and bare `\r` folded to `\n`.

use std::borrow::Cow;

/// `input` with every `\r\n` and bare `\r` replaced by `\n`; borrowed when
/// there is nothing to replace.
pub fn to_lf(input: &str) -> Cow<'_, str> {
    let Some(first) = input.find('\r') else {
        return Cow::Borrowed(input);
    };
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut at = Some(first);
    while let Some(cr) = at {
        out.push_str(&rest[..cr]);
        out.push('\n');
        rest = &rest[cr + 1..];
        rest = rest.strip_prefix('\n').unwrap_or(rest);
        at = rest.find('\r');
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Map a char offset in `original` to the matching offset after [`to_lf`].
///
/// Each `\r\n` pair collapses to one char. An offset between the `\r` and
/// the `\n` lands just after the collapsed newline. `None` when `position`
/// is past the end of `original`.
pub fn map_position_to_normalized(original: &str, position: usize) -> Option<usize> {
    let mut mapped = 0usize;
    let mut prev_cr = false;
    for (seen, c) in original.chars().enumerate() {
        if seen == position {
            return Some(mapped);
        }
        if !(c == '\n' && prev_cr) {
            mapped += 1;
        }
        prev_cr = c == '\r';
    }
    (original.chars().count() == position).then_some(mapped)
}
