//! Reads text input line by line. Mappers use this to read the file they were handed.

use std::fs;
use std::io::{self, BufRead, Read};

use log::warn;

use crate::error::{MRError, Result};

pub struct LinesReader<Src: Read> {
    src: io::Lines<io::BufReader<Src>>,
    failed: bool,
}

/// Returns a LinesReader reading from the given file.
pub fn new_from_file(path: &str) -> Result<LinesReader<fs::File>> {
    fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map(new_from_read)
        .map_err(|e| MRError::Io {
            path: String::from(path),
            source: e,
        })
}

/// Returns a LinesReader reading from any source.
pub fn new_from_read<Src: Read>(src: Src) -> LinesReader<Src> {
    LinesReader {
        src: io::BufReader::new(src).lines(),
        failed: false,
    }
}

/// Iterate over the lines from a LinesReader. Lines that aren't valid UTF-8 are skipped;
/// any other read error (e.g. the source is a directory) ends the iteration.
impl<Src: Read> Iterator for LinesReader<Src> {
    type Item = String;
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.src.next() {
                None => return None,
                Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!("skipping unreadable line: {}", e);
                    continue;
                }
                Some(Err(e)) => {
                    warn!("stopped reading: {}", e);
                    self.failed = true;
                    return None;
                }
                Some(Ok(s)) => return Some(s),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "abc def").unwrap();
        writeln!(f, "hello world").unwrap();
        write!(f, "no newline").unwrap();
        f.flush().unwrap();

        let lines: Vec<String> = new_from_file(f.path().to_str().unwrap()).unwrap().collect();
        assert_eq!(lines, vec!["abc def", "hello world", "no newline"]);
    }

    #[test]
    fn test_missing_file() {
        match new_from_file("does/not/exist.txt") {
            Err(MRError::Io { path, .. }) => assert_eq!(path, "does/not/exist.txt"),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a missing file"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let input: &[u8] = b"good\n\xff\xfe\nalso good\n";
        let lines: Vec<String> = new_from_read(input).collect();
        assert_eq!(lines, vec!["good", "also good"]);
    }

    struct FailingRead;

    impl Read for FailingRead {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device gone"))
        }
    }

    #[test]
    fn test_read_error_ends_iteration() {
        let mut r = new_from_read(FailingRead);
        assert_eq!(r.next(), None);
        assert_eq!(r.next(), None);
    }

    #[test]
    fn test_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("data.d");
        std::fs::create_dir(&sub).unwrap();

        // Opening a directory works on Linux; reading it doesn't.
        if let Ok(r) = new_from_file(sub.to_str().unwrap()) {
            assert_eq!(r.count(), 0);
        }
    }
}
