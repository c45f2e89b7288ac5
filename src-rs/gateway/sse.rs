use std::io::{BufRead, BufReader, Read};

use serde_json::Value;

const DATA_PREFIX: &str = "data:";
const DONE_TOKEN: &str = "[DONE]";

/// Incremental decoder for `data: {json}` event frames.
///
/// Yields each non-empty `choices[0].delta.content` fragment as it is read.
/// Lines without the data prefix, blank payloads, the `[DONE]` token and
/// unparsable frames are skipped; the stream ends on EOF, which is the only
/// termination the gateway actually guarantees. Dropping the iterator drops
/// the underlying reader, which for a live response closes the connection.
pub struct SseTextStream<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> SseTextStream<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
        }
    }
}

impl<R: Read> Iterator for SseTextStream<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!("stream read failed: {err}");
                    return None;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim_start();
            if payload.is_empty() || payload == DONE_TOKEN {
                continue;
            }
            // Frames are not guaranteed well-formed; a bad line is skipped,
            // not a reason to kill the whole stream.
            let frame: Value = match serde_json::from_str(payload) {
                Ok(value) => value,
                Err(_) => continue,
            };
            if let Some(delta) = frame["choices"][0]["delta"]["content"].as_str() {
                if !delta.is_empty() {
                    return Some(delta.to_string());
                }
            }
        }
    }
}
