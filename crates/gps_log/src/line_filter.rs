use std::io::{self, BufRead};

use crate::{sentence::TIME_AND_DATE_PREFIX, RawLine};

/// Lazily reads lines from `reader`, skipping blank lines and `$GNZDA` sentences.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. The first read error is yielded
/// and ends the iteration.
pub struct LineFilter<R> {
    reader: R,
    buffer: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> LineFilter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for LineFilter<R> {
    type Item = io::Result<RawLine>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match read_terminated(&mut self.reader, &mut self.buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    let line = decode_line(&self.buffer);
                    if is_relevant(&line) {
                        return Some(Ok(RawLine::from(line)));
                    }
                }
                Err(why) => {
                    self.finished = true;
                    return Some(Err(why));
                }
            }
        }
        None
    }
}

/// Whether a line takes part in the distance calculation at all.
pub fn is_relevant(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with(TIME_AND_DATE_PREFIX)
}

/// Like [`BufRead::read_until`], but both `\n` and `\r` end a line.
///
/// A `\r\n` pair is read as a line followed by an empty one.
fn read_terminated(reader: &mut impl BufRead, buffer: &mut Vec<u8>) -> io::Result<usize> {
    let mut read = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(why) if why.kind() == io::ErrorKind::Interrupted => continue,
            Err(why) => return Err(why),
        };
        if available.is_empty() {
            return Ok(read);
        }

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                buffer.extend_from_slice(&available[..=end]);
                reader.consume(end + 1);
                return Ok(read + end + 1);
            }
            None => {
                let length = available.len();
                buffer.extend_from_slice(available);
                reader.consume(length);
                read += length;
            }
        }
    }
}

// invalid utf-8 becomes U+FFFD
fn decode_line(bytes: &[u8]) -> String {
    let bytes = match bytes.last() {
        Some(b'\n' | b'\r') => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    String::from_utf8_lossy(bytes).into_owned()
}
