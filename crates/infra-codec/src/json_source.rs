// Streaming JSON job source
// reason: serde_json for element decoding, tokio BufReader for incremental input

use async_trait::async_trait;
use divider_core::domain::Job;
use divider_core::port::{JobSource, SourceError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::error::Category;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::trace;

/// Wire shape of one job
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJob {
    arg1: i32,
    arg2: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing read yet
    Start,
    /// After `[`, before the first element
    Open,
    /// Separator consumed, an element starts at the next token
    ElementReady,
    /// After an element, expecting `,` or `]`
    AfterElement,
    /// Closing `]` seen or the stream failed
    Closed,
}

/// Decodes a top-level JSON array of `{"arg1": .., "arg2": ..}` objects
/// one element at a time
///
/// Element-level data problems (wrong type, missing, unknown or duplicate
/// field, i32 overflow) are recoverable. Broken framing, syntax errors and
/// truncated input end the stream. Empty input yields no jobs.
pub struct JsonJobSource<R> {
    reader: BufReader<R>,
    state: State,
    offset: u64,
    pending: Option<SourceError>,
}

impl<R: AsyncRead + Unpin + Send> JsonJobSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            state: State::Start,
            offset: 0,
            pending: None,
        }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    async fn peek_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let buf = self.reader.fill_buf().await?;
        Ok(buf.first().copied())
    }

    fn consume(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    /// Next non-whitespace byte, not consumed
    async fn peek_token(&mut self) -> Result<Option<u8>, SourceError> {
        loop {
            match self.peek_byte().await? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.consume(),
                other => return Ok(other),
            }
        }
    }

    fn malformed(&self, message: impl Into<String>) -> SourceError {
        SourceError::Malformed {
            offset: self.offset,
            message: message.into(),
        }
    }

    /// Move over framing until an element is ready or the array is closed
    async fn advance(&mut self) -> Result<bool, SourceError> {
        loop {
            match self.state {
                State::Closed => return Ok(false),
                State::ElementReady => return Ok(true),
                State::Start => match self.peek_token().await? {
                    None => {
                        self.state = State::Closed;
                        return Ok(false);
                    }
                    Some(b'[') => {
                        self.consume();
                        self.state = State::Open;
                    }
                    Some(other) => {
                        return Err(self.malformed(format!(
                            "expected '[', found {}",
                            describe(other)
                        )))
                    }
                },
                State::Open => match self.peek_token().await? {
                    None => return Err(SourceError::UnexpectedEof),
                    Some(b']') => {
                        self.consume();
                        self.state = State::Closed;
                    }
                    Some(b',') => return Err(self.malformed("expected a job, found ','")),
                    Some(_) => self.state = State::ElementReady,
                },
                State::AfterElement => match self.peek_token().await? {
                    None => return Err(SourceError::UnexpectedEof),
                    Some(b']') => {
                        self.consume();
                        self.state = State::Closed;
                    }
                    Some(b',') => {
                        self.consume();
                        match self.peek_token().await? {
                            None => return Err(SourceError::UnexpectedEof),
                            Some(b']' | b',') => {
                                return Err(self.malformed("expected a job after ','"))
                            }
                            Some(_) => self.state = State::ElementReady,
                        }
                    }
                    Some(other) => {
                        return Err(self.malformed(format!(
                            "expected ',' or ']', found {}",
                            describe(other)
                        )))
                    }
                },
            }
        }
    }

    /// Raw bytes of one JSON value, tracking nesting and string escapes
    async fn read_value(&mut self) -> Result<Vec<u8>, SourceError> {
        let mut raw = Vec::new();
        let mut closers: Vec<u8> = Vec::new();
        let mut in_string = false;
        let mut escaped = false;

        loop {
            let b = self.peek_byte().await?.ok_or(SourceError::UnexpectedEof)?;

            if in_string {
                self.consume();
                raw.push(b);
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                    if closers.is_empty() {
                        return Ok(raw);
                    }
                }
                continue;
            }

            match b {
                b'"' => in_string = true,
                b'{' => closers.push(b'}'),
                b'[' => closers.push(b']'),
                b'}' | b']' if closers.is_empty() => break,
                b'}' | b']' => {
                    if closers.pop() != Some(b) {
                        return Err(self.malformed(format!("unexpected {}", describe(b))));
                    }
                    self.consume();
                    raw.push(b);
                    if closers.is_empty() {
                        return Ok(raw);
                    }
                    continue;
                }
                b',' | b' ' | b'\t' | b'\n' | b'\r' if closers.is_empty() => break,
                _ => {}
            }
            self.consume();
            raw.push(b);
        }

        // A bare scalar ended at a delimiter
        if raw.is_empty() {
            return Err(self.malformed("expected a job"));
        }
        Ok(raw)
    }

    fn fail(&mut self, err: SourceError) -> Result<(), SourceError> {
        self.state = State::Closed;
        Err(err)
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> JobSource for JsonJobSource<R> {
    async fn more(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        match self.advance().await {
            Ok(more) => more,
            Err(e) => {
                // Surfaced by the following `next` call
                self.pending = Some(e);
                true
            }
        }
    }

    async fn next(&mut self, job: &mut Job) -> Result<(), SourceError> {
        if let Some(e) = self.pending.take() {
            return self.fail(e);
        }
        match self.advance().await {
            Ok(true) => {}
            Ok(false) => return self.fail(SourceError::UnexpectedEof),
            Err(e) => return self.fail(e),
        }

        let start = self.offset;
        let raw = match self.read_value().await {
            Ok(raw) => raw,
            Err(e) => return self.fail(e),
        };
        self.state = State::AfterElement;

        // Derived struct visitors also accept sequences; only objects are jobs
        if raw.first() != Some(&b'{') {
            *job = Job::invalid();
            return match parse_element::<serde_json::Value>(&raw) {
                Ok(value) => Err(SourceError::InvalidJob(format!(
                    "expected a job object, found {}",
                    kind_of(&value)
                ))),
                Err(e) => self.fail(SourceError::Malformed {
                    offset: start,
                    message: e.to_string(),
                }),
            };
        }

        match parse_element::<RawJob>(&raw) {
            Ok(RawJob { arg1, arg2 }) => {
                trace!(offset = start, arg1, arg2, "Decoded job");
                *job = Job::new(arg1, arg2);
                Ok(())
            }
            Err(e) if e.classify() == Category::Data => {
                *job = Job::invalid();
                Err(SourceError::InvalidJob(e.to_string()))
            }
            Err(e) => self.fail(SourceError::Malformed {
                offset: start,
                message: e.to_string(),
            }),
        }
    }
}

/// Decode one element; invalid UTF-8 inside strings decodes as U+FFFD
fn parse_element<T: DeserializeOwned>(raw: &[u8]) -> serde_json::Result<T> {
    match serde_json::from_slice(raw) {
        Err(e) if e.classify() == Category::Syntax && std::str::from_utf8(raw).is_err() => {
            serde_json::from_str(&String::from_utf8_lossy(raw))
        }
        decoded => decoded,
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn describe(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("byte 0x{:02x}", b)
    }
}
