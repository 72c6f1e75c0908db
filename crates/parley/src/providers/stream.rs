use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::mem;

use super::base::ChatStream;
use super::errors::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SseEvent {
    Data(String),
    Done,
}

/// Buffers server-sent event lines that are split across network chunks
///
/// Bytes are held until a full line arrives, so a multi-byte character split
/// between two chunks is decoded whole.
#[derive(Debug, Default)]
struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = parse_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    fn flush(&mut self) -> Option<SseEvent> {
        parse_line(&String::from_utf8_lossy(&mem::take(&mut self.buffer)))
    }
}

fn parse_line(line: &str) -> Option<SseEvent> {
    let data = line.trim().strip_prefix("data:")?.trim();
    match data {
        "" => None,
        "[DONE]" => Some(SseEvent::Done),
        _ => Some(SseEvent::Data(data.to_string())),
    }
}

/// Extract the text delta from one streamed chunk
fn parse_delta(data: &str) -> Result<Option<String>, ProviderError> {
    let chunk: Value = serde_json::from_str(data)?;
    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(ProviderError::new(ProviderErrorKind::Api, message));
    }
    Ok(chunk["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(String::from))
}

/// Turn an SSE response body into a stream of text deltas
///
/// The stream ends at `data: [DONE]`, at the end of the body, or after the
/// first error, which is yielded as the last item.
pub fn text_stream<S, E>(byte_stream: S) -> ChatStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ProviderError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut buffer = SseLineBuffer::default();
        let mut finished = false;

        while !finished {
            let events = match byte_stream.next().await {
                Some(Ok(bytes)) => buffer.feed(&bytes),
                Some(Err(e)) => {
                    let error: ProviderError = e.into();
                    yield Err(error);
                    break;
                }
                None => {
                    finished = true;
                    buffer.flush().into_iter().collect()
                }
            };

            for event in events {
                match event {
                    SseEvent::Done => {
                        finished = true;
                        break;
                    }
                    SseEvent::Data(data) => match parse_delta(&data) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            finished = true;
                            break;
                        }
                    },
                }
            }
        }
    })
}
