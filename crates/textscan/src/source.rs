//! Pull-based character providers wrapped by a [`Cursor`](crate::Cursor).
//!
//! A source yields one `char` per call and is never rewound; all backtracking
//! happens in the cursor's history. Byte-oriented sources decode UTF-8 with
//! `bstr`, replacing each invalid sequence with U+FFFD.

use std::io::{self, Read};

use bstr::decode_utf8;

/// Something a cursor can pull characters from.
pub trait CharSource {
    /// Returns the next character, or `None` once the source is exhausted.
    ///
    /// After returning `None` once, a source is never asked again.
    fn read_char(&mut self) -> io::Result<Option<char>>;
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        (**self).read_char()
    }
}

/// Characters of an owned string.
#[derive(Debug, Clone, Default)]
pub struct StrSource {
    text: String,
    at: usize,
}

impl StrSource {
    /// Wraps `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            at: 0,
        }
    }
}

impl CharSource for StrSource {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let Some(ch) = self.text[self.at..].chars().next() else {
            return Ok(None);
        };
        self.at += ch.len_utf8();
        Ok(Some(ch))
    }
}

/// UTF-8 decoded characters of an owned byte buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteSource {
    bytes: Vec<u8>,
    at: usize,
}

impl ByteSource {
    /// Wraps `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            at: 0,
        }
    }
}

impl CharSource for ByteSource {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let (ch, size) = decode_utf8(&self.bytes[self.at..]);
        if size == 0 {
            return Ok(None);
        }
        self.at += size;
        Ok(Some(ch.unwrap_or(char::REPLACEMENT_CHARACTER)))
    }
}

const CHUNK: usize = 8 * 1024;
const MAX_UTF8: usize = 4;

/// UTF-8 decoded characters of an [`io::Read`], read in chunks.
///
/// A sequence split across two reads is reassembled before decoding: the
/// buffer is refilled whenever fewer than four bytes remain.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; CHUNK].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// Unwraps the reader. Buffered bytes not yet decoded are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn refill(&mut self) -> io::Result<()> {
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        while !self.eof && self.end < self.buf.len() {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.end += n;
                    if self.end - self.start >= MAX_UTF8 {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        if self.end - self.start < MAX_UTF8 && !self.eof {
            self.refill()?;
        }
        let (ch, size) = decode_utf8(&self.buf[self.start..self.end]);
        if size == 0 {
            return Ok(None);
        }
        self.start += size;
        Ok(Some(ch.unwrap_or(char::REPLACEMENT_CHARACTER)))
    }
}
