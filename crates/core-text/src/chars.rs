//! Char-index helpers over UTF-8 strings.
//!
//! Every position exposed by this crate counts Unicode scalar values, not
//! bytes. These helpers convert between the two with an ASCII fast path.

/// Number of chars in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    if s.is_ascii() { s.len() } else { s.chars().count() }
}

/// Byte offset of char index `idx`, clamped to `s.len()`.
#[inline]
pub fn byte_offset(s: &str, idx: usize) -> usize {
    if s.is_ascii() {
        return idx.min(s.len());
    }
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// Char count of `s[..byte]`. `byte` must lie on a char boundary.
#[inline]
pub fn chars_before(s: &str, byte: usize) -> usize {
    char_len(&s[..byte])
}

/// Slice by char range `[from, to)`, clamped to the string.
pub fn slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_offset(s, from);
    let end = byte_offset(s, to.max(from));
    &s[start..end]
}

/// Everything from char index `from` on.
pub fn tail(s: &str, from: usize) -> &str {
    &s[byte_offset(s, from)..]
}

/// The first `n` chars.
pub fn head(s: &str, n: usize) -> &str {
    &s[..byte_offset(s, n)]
}

pub fn reversed(s: &str) -> String {
    s.chars().rev().collect()
}

/// `\w` in the regex sense.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_multibyte_offsets_agree() {
        assert_eq!(byte_offset("abc", 2), 2);
        assert_eq!(byte_offset("abc", 9), 3);
        assert_eq!(byte_offset("éa", 1), 2);
        assert_eq!(byte_offset("éa", 5), 3);
        assert_eq!(chars_before("éa", 2), 1);
        assert_eq!(char_len("漢字"), 2);
    }

    #[test]
    fn slicing_is_clamped() {
        assert_eq!(slice("hello", 1, 3), "el");
        assert_eq!(slice("hello", 3, 1), "");
        assert_eq!(slice("hello", 3, 99), "lo");
        assert_eq!(tail("héllo", 2), "llo");
        assert_eq!(head("héllo", 2), "hé");
        assert_eq!(reversed("abé"), "éba");
    }

    #[test]
    fn word_chars_follow_regex_class() {
        assert!(is_word_char('a'));
        assert!(is_word_char('_'));
        assert!(is_word_char('7'));
        assert!(is_word_char('é'));
        assert!(!is_word_char('-'));
        assert!(!is_word_char(' '));
    }
}
