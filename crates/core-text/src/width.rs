//! Terminal cell width of text, used for cursor column reporting.

use unicode_width::UnicodeWidthStr;

/// Display width of `s` in terminal cells.
pub fn str_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(str_width("abc"), 3);
    }

    #[test]
    fn wide_cjk() {
        assert_eq!(str_width("漢字"), 4);
        assert_eq!(str_width("a漢"), 3);
    }

    #[test]
    fn combining_acute() {
        assert_eq!(str_width("e\u{301}"), 1);
    }
}
