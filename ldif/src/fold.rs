//! Writer-side line folding (RFC 2849 section 2, "folding").

use std::io::Write;

use crate::error::{LdifError, Result};

/// Write `line` as one or more physical lines of at most `cols` characters.
///
/// The first physical line carries `cols` characters; every continuation
/// line starts with a single space followed by up to `cols - 1` characters.
/// Each physical line is terminated by `line_sep`.
pub fn fold_line(w: &mut dyn Write, line: &str, cols: usize, line_sep: &str) -> Result<()> {
    if cols < 2 {
        return Err(LdifError::InvalidColumns(cols));
    }

    // Byte offsets of every char boundary, so that slicing never splits a
    // multi-byte character.
    let bounds: Vec<usize> = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .collect();
    let nchars = bounds.len() - 1;

    if nchars <= cols {
        w.write_all(line.as_bytes())?;
        w.write_all(line_sep.as_bytes())?;
        return Ok(());
    }

    w.write_all(line[..bounds[cols]].as_bytes())?;
    w.write_all(line_sep.as_bytes())?;

    let mut pos = cols;
    while pos < nchars {
        let end = (pos + cols - 1).min(nchars);
        w.write_all(b" ")?;
        w.write_all(line[bounds[pos]..bounds[end]].as_bytes())?;
        w.write_all(line_sep.as_bytes())?;
        pos = end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fold(line: &str, cols: usize) -> String {
        let mut buf = Vec::new();
        fold_line(&mut buf, line, cols, "\n").unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn short_line_unchanged() {
        assert_eq!(fold("cn: foo", 76), "cn: foo\n");
    }

    #[test]
    fn exact_width_not_folded() {
        assert_eq!(fold("abcdef", 6), "abcdef\n");
    }

    #[test]
    fn one_over_width() {
        assert_eq!(fold("abcdefg", 6), "abcdef\n g\n");
    }

    #[test]
    fn continuation_width_is_cols_minus_one() {
        assert_eq!(fold("abcdefghijklmn", 5), "abcde\n fghi\n jklm\n n\n");
    }

    #[test]
    fn narrowest_width() {
        assert_eq!(fold("abcd", 2), "ab\n c\n d\n");
    }

    #[test]
    fn empty_line() {
        assert_eq!(fold("", 76), "\n");
    }

    #[test]
    fn crlf_separator() {
        let mut buf = Vec::new();
        fold_line(&mut buf, "abcdefg", 4, "\r\n").unwrap();
        assert_eq!(buf, b"abcd\r\n efg\r\n");
    }

    #[test]
    fn multibyte_chars_not_split() {
        assert_eq!(fold("ééééé", 3), "ééé\n éé\n");
    }

    #[rstest(cols, case(0), case(1))]
    fn rejects_too_narrow(cols: usize) {
        let mut buf = Vec::new();
        let err = fold_line(&mut buf, "abc", cols, "\n").unwrap_err();
        assert!(matches!(err, LdifError::InvalidColumns(c) if c == cols));
        assert!(buf.is_empty());
    }
}
