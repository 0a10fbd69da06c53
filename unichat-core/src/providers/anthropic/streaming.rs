//! Streaming support for Anthropic responses

use super::types::{Delta, StreamEvent};
use crate::error::ProviderError;
use crate::protocol::Response;
use crate::providers::ResponseStream;
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Parse the Messages API event stream into response fragments.
///
/// Only text deltas become fragments; thinking and tool-use deltas are
/// dropped. A server error event terminates the sequence with an error.
pub(crate) fn fragment_stream(
    stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    cancel: CancellationToken,
) -> ResponseStream {
    let fragments = stream.eventsource().filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::from_str::<StreamEvent>(&event.data) {
                Ok(StreamEvent::ContentBlockDelta {
                    delta: Delta::TextDelta { text },
                }) => Some(Ok(Response::new(text))),
                Ok(StreamEvent::Error { error }) => Some(Err(ProviderError::Stream(format!(
                    "{}: {}",
                    error.error_type, error.message
                )))),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("failed to parse stream event: {e}");
                    None
                }
            },
            Err(e) => Some(Err(ProviderError::Stream(e.to_string()))),
        }
    });

    Box::pin(fragments.take_until(cancel.cancelled_owned()))
}
