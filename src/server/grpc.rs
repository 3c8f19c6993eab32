//! tonic binding of [`Handler`] to `MessagingService/requestReply`.
//!
//! Every call runs the synchronous pipeline on Tokio's blocking pool. Calls
//! share nothing but the handler itself, so concurrent requests cannot see
//! each other's state, and a slow fold never stalls the reactor.

use std::{fmt, sync::Arc};

use tonic::{Request, Response, Status};
use tracing::error;

use crate::{
    handler::{Handler, handle_request},
    headers::Envelope,
    proto::{GrpcMessage, messaging_service_server::MessagingService},
};

/// gRPC service forwarding each call to a [`Handler`].
#[derive(Clone)]
pub struct GrpcGateway {
    handler: Arc<dyn Handler>,
}

impl GrpcGateway {
    /// Serve `handler`.
    #[must_use]
    pub const fn new(handler: Arc<dyn Handler>) -> Self { Self { handler } }
}

impl fmt::Debug for GrpcGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcGateway")
            .field(
                "content_type",
                &self.handler.expected_content_type().as_str(),
            )
            .finish()
    }
}

#[tonic::async_trait]
impl MessagingService for GrpcGateway {
    async fn request_reply(
        &self,
        request: Request<GrpcMessage>,
    ) -> Result<Response<GrpcMessage>, Status> {
        let envelope = Envelope::from(request.into_inner());
        let handler = Arc::clone(&self.handler);
        let outcome =
            tokio::task::spawn_blocking(move || handle_request(handler.as_ref(), envelope)).await;
        match outcome {
            Ok(Ok(reply)) => Ok(Response::new(reply.into())),
            Ok(Err(err)) => Err(err.into()),
            Err(join_error) => {
                error!(error = %join_error, "request task aborted");
                Err(Status::internal("request handling aborted"))
            }
        }
    }
}
