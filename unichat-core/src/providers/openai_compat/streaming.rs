//! Streaming support for OpenAI-compatible responses

use super::types::CompatStreamChunk;
use crate::error::ProviderError;
use crate::protocol::Response;
use crate::providers::ResponseStream;
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Parse a Server-Sent Events body into response fragments.
///
/// Fragments are yielded strictly in emission order; cancelling the token
/// ends the sequence after the fragment currently in flight.
pub(crate) fn fragment_stream(
    stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    cancel: CancellationToken,
) -> ResponseStream {
    let fragments = stream.eventsource().filter_map(|result| async move {
        match result {
            Ok(event) => {
                // the terminal message is "data: [DONE]"
                if event.data == "[DONE]" {
                    return None;
                }

                match serde_json::from_str::<CompatStreamChunk>(&event.data) {
                    Ok(chunk) => {
                        let text: String = chunk
                            .choices
                            .into_iter()
                            .filter_map(|choice| choice.delta.content)
                            .collect();
                        if text.is_empty() {
                            None
                        } else {
                            Some(Ok(Response::new(text)))
                        }
                    }
                    Err(e) => {
                        tracing::warn!("failed to parse stream chunk: {e}");
                        None
                    }
                }
            }
            Err(e) => Some(Err(ProviderError::Stream(e.to_string()))),
        }
    });

    Box::pin(fragments.take_until(cancel.cancelled_owned()))
}
