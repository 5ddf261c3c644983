//! Character sinks for the standard streams.
//!
//! Compiled code emits output one UTF-16 code unit at a time. A sink
//! buffers code units and hands a complete line to its [`LineWriter`] when
//! it sees a line feed.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;
use tracing::info;

const LINE_FEED: u16 = 0x0A;

/// Which standard stream a sink feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl Stream {
    /// Short name, used as a log field.
    pub const fn name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Receives complete lines, without the trailing line feed.
pub trait LineWriter {
    /// Write one line
    fn write_line(&self, stream: Stream, line: &str);
}

/// Emits each line as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWriter;

impl LineWriter for TracingWriter {
    fn write_line(&self, stream: Stream, line: &str) {
        match stream {
            Stream::Stdout => info!(target: "aot::stdout", "{}", line),
            Stream::Stderr => info!(target: "aot::stderr", "{}", line),
        }
    }
}

/// Writes lines to the process's real stdout or stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioWriter;

impl LineWriter for StdioWriter {
    fn write_line(&self, stream: Stream, line: &str) {
        // Output errors have nowhere to go; the line is dropped.
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout(), "{}", line),
            Stream::Stderr => writeln!(std::io::stderr(), "{}", line),
        };
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct CaptureWriter {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CaptureWriter {
    /// Creates a writer with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer appending to `lines`.
    pub fn with_buffer(lines: Rc<RefCell<Vec<String>>>) -> Self {
        Self { lines }
    }

    /// Lines captured so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl LineWriter for CaptureWriter {
    fn write_line(&self, _stream: Stream, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Line-buffered sink for one stream.
///
/// # Examples
///
/// ```
/// use platform::{CaptureWriter, CharacterSink, Stream};
///
/// let capture = CaptureWriter::new();
/// let sink = CharacterSink::new(Stream::Stdout, capture.clone());
/// for unit in "hi\nx".encode_utf16() {
///     sink.write(unit);
/// }
/// assert_eq!(capture.lines(), vec!["hi".to_string()]);
/// assert_eq!(sink.pending(), "x");
/// ```
pub struct CharacterSink {
    stream: Stream,
    buffer: RefCell<Vec<u16>>,
    writer: Box<dyn LineWriter>,
}

impl CharacterSink {
    /// Creates a sink for `stream` writing lines to `writer`.
    pub fn new<W>(stream: Stream, writer: W) -> Self
    where
        W: LineWriter + 'static,
    {
        Self {
            stream,
            buffer: RefCell::new(Vec::new()),
            writer: Box::new(writer),
        }
    }

    /// The stream this sink feeds.
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Appends one code unit. A line feed emits the buffered line and
    /// empties the buffer.
    pub fn write(&self, code_unit: u16) {
        if code_unit != LINE_FEED {
            self.buffer.borrow_mut().push(code_unit);
            return;
        }
        let units = std::mem::take(&mut *self.buffer.borrow_mut());
        let line = String::from_utf16_lossy(&units);
        self.writer.write_line(self.stream, &line);
    }

    /// Writes every UTF-16 code unit of `text`.
    pub fn write_str(&self, text: &str) {
        for unit in text.encode_utf16() {
            self.write(unit);
        }
    }

    /// Text buffered since the last line feed.
    pub fn pending(&self) -> String {
        String::from_utf16_lossy(&self.buffer.borrow())
    }
}

impl fmt::Debug for CharacterSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterSink")
            .field("stream", &self.stream)
            .field("pending", &self.pending())
            .finish()
    }
}
