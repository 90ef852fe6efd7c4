//! Tolerant line reading for both input files.
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`, and are decoded lossily, so
//! malformed UTF-8 turns into U+FFFD instead of failing the run.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::AnnotateError;

/// Iterator over the lossily decoded lines of a reader, terminators stripped.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    // Last line ended in `\r`; a `\n` right after it belongs to that line.
    pending_cr: bool,
}

pub fn read_lines_lossy<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines { reader, buf: Vec::new(), pending_cr: false }
}

impl<R: BufRead> LossyLines<R> {
    fn take_line(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        let mut started = false;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if available.is_empty() {
                break;
            }
            if self.pending_cr {
                self.pending_cr = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            started = true;
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    let cr = available[i] == b'\r';
                    self.buf.extend_from_slice(&available[..i]);
                    self.reader.consume(i + 1);
                    self.pending_cr = cr;
                    return Some(Ok(self.take_line()));
                }
                None => {
                    let n = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(n);
                }
            }
        }
        started.then(|| Ok(self.take_line()))
    }
}

/// Lines of an opened input file, with the path kept for error reporting.
pub struct FileLines {
    path: PathBuf,
    lines: LossyLines<BufReader<File>>,
}

impl Iterator for FileLines {
    type Item = Result<String, AnnotateError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            line.map_err(|source| AnnotateError::Read { path: self.path.clone(), source })
        })
    }
}

/// Open `path` for tolerant line reading.
pub fn open_lines(path: &Path) -> Result<FileLines, AnnotateError> {
    let file = File::open(path)
        .map_err(|source| AnnotateError::Open { path: path.to_path_buf(), source })?;
    Ok(FileLines { path: path.to_path_buf(), lines: read_lines_lossy(BufReader::new(file)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8]) -> Vec<String> {
        read_lines_lossy(bytes).collect::<io::Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn splits_on_newline_and_strips_crlf() {
        assert_eq!(collect(b"a\r\nb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn lone_carriage_return_ends_a_line() {
        assert_eq!(collect(b"a\rb\n"), vec!["a", "b"]);
        assert_eq!(collect(b"a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(collect(b"x\r"), vec!["x"]);
        assert_eq!(collect(b"\r\n\n"), vec!["", ""]);
    }

    #[test]
    fn crlf_split_across_reads_is_one_terminator() {
        let reader = BufReader::with_capacity(2, &b"ab\r\ncd"[..]);
        let lines = read_lines_lossy(reader).collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(lines, vec!["ab", "cd"]);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn blank_lines_are_preserved() {
        assert_eq!(collect(b"\n\nx\n"), vec!["", "", "x"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let lines = collect(b"ok\n\xff\xfebad\n");
        assert_eq!(lines[0], "ok");
        assert_eq!(lines[1], "\u{FFFD}\u{FFFD}bad");
    }

    #[test]
    fn open_lines_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = open_lines(&missing).err().expect("missing file should fail");
        assert!(matches!(err, AnnotateError::Open { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }
}
