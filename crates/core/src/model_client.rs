use std::pin::Pin;
use std::sync::Arc;

use concierge_model::{
    ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use tracing::Instrument;

type SendRequestResult = Result<ModelReply, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `Agent` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!(
                        "sending {} messages with {} tools",
                        req.messages.len(),
                        req.tools.len()
                    );
                    match fut.await {
                        Ok(reply) => {
                            trace!("got a reply: {reply:?}");
                            Ok(reply)
                        }
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ModelProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, as long as the provider is.
    #[inline]
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        (self.handler_fn)(req).await
    }
}
