//! Parser-side line unfolding.
//!
//! Physical lines are read one at a time; a line starting with a single
//! space continues the previous logical line.  One physical line of
//! lookahead is kept to detect the end of a logical line.

use std::io::BufRead;

use crate::error::Result;

/// An unfolded line together with the physical line number it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub number: usize,
    pub text: Vec<u8>,
}

pub struct LineReader<R> {
    inner: R,
    /// Next physical line, already read but not yet consumed.
    pushback: Option<(usize, Vec<u8>)>,
    line_no: usize,
}

/// Strip one trailing `\r\n` or `\n`, nothing else.
fn strip_line_sep(line: &mut Vec<u8>) {
    if line.ends_with(b"\r\n") {
        line.truncate(line.len() - 2);
    } else if line.ends_with(b"\n") {
        line.truncate(line.len() - 1);
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner,
            pushback: None,
            line_no: 0,
        }
    }

    /// Number of physical lines read from the source so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    /// Read one physical line without its terminator.  `None` at EOF.
    fn read_physical(&mut self) -> Result<Option<(usize, Vec<u8>)>> {
        if let Some(line) = self.pushback.take() {
            return Ok(Some(line));
        }
        let mut buf = Vec::new();
        if self.inner.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        strip_line_sep(&mut buf);
        Ok(Some((self.line_no, buf)))
    }

    /// Read the next logical line, merging continuation lines into it.
    /// `None` at EOF.
    pub fn next_logical(&mut self) -> Result<Option<LogicalLine>> {
        let (number, mut text) = match self.read_physical()? {
            Some(line) => line,
            None => return Ok(None),
        };
        loop {
            match self.read_physical()? {
                Some((_, cont)) if cont.first() == Some(&b' ') => {
                    text.extend_from_slice(&cont[1..]);
                }
                other => {
                    self.pushback = other;
                    break;
                }
            }
        }
        Ok(Some(LogicalLine { number, text }))
    }

    /// Like `next_logical`, but skips comment lines (folded ones included).
    pub fn next_line(&mut self) -> Result<Option<LogicalLine>> {
        loop {
            match self.next_logical()? {
                Some(line) if line.text.first() == Some(&b'#') => continue,
                other => return Ok(other),
            }
        }
    }
}
