//! Line-oriented response streams shared by the HTTP backends
//!
//! Both SSE (Gemini) and NDJSON (Ollama) deliver one event per line. Bytes are
//! buffered until a full line is available so multi-byte characters split
//! across network frames are never decoded in halves.

use crate::{GenerationError, TextStream};
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use tracing::trace;

/// Parses one complete line into an optional text increment
pub(crate) type LineParser = fn(&str) -> Result<Option<String>, GenerationError>;

type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>;

struct State {
    bytes: ByteStream,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, GenerationError>>,
    parse: LineParser,
    finished: bool,
}

/// Turn an HTTP body stream into a stream of text increments
pub(crate) fn text_stream<S>(bytes: S, parse: LineParser) -> TextStream
where
    S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
{
    let state = State {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        parse,
        finished: false,
    };

    let increments = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(frame)) => {
                    state.buffer.extend_from_slice(&frame);
                    if drain_lines(&mut state.buffer, state.parse, &mut state.pending) {
                        state.finished = true;
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(GenerationError::Stream(e.to_string())), state));
                }
                None => {
                    state.finished = true;
                    // Last line may arrive without a trailing newline
                    if !state.buffer.is_empty() {
                        state.buffer.push(b'\n');
                        drain_lines(&mut state.buffer, state.parse, &mut state.pending);
                    }
                }
            }
        }
    });

    Box::pin(increments)
}

/// Parse every complete line in `buffer`; returns true once a line failed
pub(crate) fn drain_lines(
    buffer: &mut Vec<u8>,
    parse: LineParser,
    pending: &mut VecDeque<Result<String, GenerationError>>,
) -> bool {
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        match parse(line) {
            Ok(Some(text)) if !text.is_empty() => pending.push_back(Ok(text)),
            Ok(_) => trace!("line carried no text"),
            Err(e) => {
                buffer.clear();
                pending.push_back(Err(e));
                return true;
            }
        }
    }
    false
}
