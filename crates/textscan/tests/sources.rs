#![allow(missing_docs)]
//! Cursors over readers, byte buffers and files.

use std::io::{self, Cursor as IoCursor, Read, Write};

use quickcheck::QuickCheck;
use textscan::{Boundary, CharSource, Cursor, LINE_END, ReaderSource, ScanError, WORD_BREAK};

/// Hands out at most `step` bytes per read.
struct Trickle {
    bytes: Vec<u8>,
    at: usize,
    step: usize,
}

impl Trickle {
    fn new(text: &str, step: usize) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            at: 0,
            step: step.max(1),
        }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.bytes.len() - self.at);
        buf[..n].copy_from_slice(&self.bytes[self.at..self.at + n]);
        self.at += n;
        Ok(n)
    }
}

/// Fails after yielding `good` bytes.
struct Broken {
    good: IoCursor<Vec<u8>>,
}

impl Read for Broken {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.good.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away")),
            n => Ok(n),
        }
    }
}

fn words(mut cursor: Cursor) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        cursor.scan_while(&textscan::WHITE_SPACE, Boundary::Retain).unwrap();
        let word = cursor.scan_until(&WORD_BREAK, Boundary::Retain).unwrap();
        if word.is_empty() {
            return out;
        }
        out.push(word);
    }
}

#[test]
fn reader_matches_string() {
    let text = "grüße aus\tKöln 🚀\nzweite Zeile";
    let expected = words(Cursor::from_str("str", text));
    assert_eq!(expected, ["grüße", "aus", "Köln", "🚀", "zweite", "Zeile"]);
    for step in 1..=5 {
        assert_eq!(words(Cursor::from_reader("reader", Trickle::new(text, step))), expected);
    }
    assert_eq!(words(Cursor::from_bytes("bytes", text)), expected);
}

fn trickled_reads_match(text: String, step: u8) -> bool {
    let mut source = ReaderSource::new(Trickle::new(&text, usize::from(step % 7)));
    let mut got = String::new();
    while let Some(ch) = source.read_char().unwrap() {
        got.push(ch);
    }
    got == text
}

#[test]
fn split_sequences_reassemble() {
    #[cfg(not(any(miri, feature = "test-fast")))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(any(miri, feature = "test-fast"))]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(trickled_reads_match as fn(String, u8) -> bool);
}

#[test]
fn invalid_bytes_read_as_replacement() {
    let mut cursor = Cursor::from_bytes("bytes", b"a\xFFb\xE2\x82".to_vec());
    let text = cursor.scan_until(&LINE_END, Boundary::Eat).unwrap();
    assert_eq!(text, "a\u{FFFD}b\u{FFFD}");
    assert!(cursor.end_of_source());
}

#[test]
fn read_failure_names_the_source() {
    let mut cursor = Cursor::from_reader(
        "socket",
        Broken {
            good: IoCursor::new(b"ok".to_vec()),
        },
    );
    let mut read = String::new();
    let err = loop {
        match cursor.next() {
            Ok(c) => {
                assert!(!cursor.end_of_source());
                read.push(c);
            }
            Err(e) => break e,
        }
    };
    assert!("ok".starts_with(&read), "{read:?}");
    assert_eq!(cursor.index(), read.chars().count());
    assert!(matches!(err, ScanError::SourceRead { .. }), "{err:?}");
    assert_eq!(err.to_string(), "failed to read from `socket`: peer went away");
    assert!(err.bookmark().is_none());
}

#[test]
fn file_source() {
    let dir = std::env::temp_dir().join(format!("textscan-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("lines.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "first").unwrap();
    write!(file, "second").unwrap();
    drop(file);

    let mut cursor = Cursor::from_file(&path).unwrap();
    assert_eq!(cursor.label(), path.display().to_string());
    assert_eq!(cursor.next_line().unwrap(), "first");
    assert_eq!(cursor.next_line().unwrap(), "second");
    assert!(cursor.end_of_source());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_file() {
    let err = Cursor::from_file("/definitely/not/here.txt").unwrap_err();
    assert!(matches!(err, ScanError::SourceRead { .. }), "{err:?}");
    assert!(err.to_string().starts_with("failed to read from `/definitely/not/here.txt`"));
}
