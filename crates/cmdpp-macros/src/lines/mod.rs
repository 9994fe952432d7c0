// crates/cmdpp-macros/src/lines/mod.rs

use std::io::{self, BufRead};

use crate::types::LogicalLine;


/// Marker that continues a physical line onto the next one.
pub const CONTINUATION: char = ';';

/// Turns physical lines into logical lines.
///
/// Each physical line is right-trimmed. A line ending in `;` has the marker replaced by a single
/// blank and is joined with the following lines; empty lines are skipped but still counted.
/// A logical line carries the number of the last physical line that contributed to it.
pub struct LineAssembler<R> {
    reader: R,
    physical: usize,
    buffer: String,
    last_contributed: usize,
}

impl<R: BufRead> LineAssembler<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            physical: 0,
            buffer: String::new(),
            last_contributed: 0,
        }
    }

    fn take(&mut self) -> LogicalLine {
        LogicalLine {
            number: self.last_contributed,
            text: std::mem::take(&mut self.buffer),
        }
    }
}

impl<R: BufRead> Iterator for LineAssembler<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = String::new();
        loop {
            raw.clear();
            match self.reader.read_line(&mut raw) {
                Err(e) => return Some(Err(e)),
                Ok(0) => {
                    // A trailing continuation still yields its text.
                    if self.buffer.is_empty() {
                        return None;
                    }
                    let mut line = self.take();
                    line.text.truncate(line.text.trim_end().len());
                    return Some(Ok(line));
                }
                Ok(_) => {}
            }
            self.physical += 1;

            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            self.last_contributed = self.physical;
            if let Some(head) = line.strip_suffix(CONTINUATION) {
                self.buffer.push_str(head);
                self.buffer.push(' ');
                continue;
            }
            self.buffer.push_str(line);
            return Some(Ok(self.take()));
        }
    }
}
