// crates/cmdpp-macros/src/preprocessor/diagnostics.rs

use std::io::Write;

use log::warn;

/// Receives the messages of `#stdout` and `#error`.
pub trait DiagnosticSink {
    fn emit(&mut self, message: &str);
}

/// Discards everything.
impl DiagnosticSink for () {
    fn emit(&mut self, _message: &str) {}
}

impl DiagnosticSink for Vec<String> {
    fn emit(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Writes one message per line to any writer, typically stderr.
pub struct WriteSink<W: Write>(pub W);

impl<W: Write> DiagnosticSink for WriteSink<W> {
    fn emit(&mut self, message: &str) {
        if let Err(e) = writeln!(self.0, "{}", message) {
            warn!("could not write diagnostic: {}", e);
        }
    }
}
