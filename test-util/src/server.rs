//! In-process gateway harness.
//!
//! [`TestServer`] binds `127.0.0.1:0`, serves one handler on a background task
//! and shuts it down gracefully when stopped or dropped.

use std::{net::SocketAddr, sync::Arc};

use cli_defs::DEFAULT_FRAUD_THRESHOLD;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tonic::transport::Channel;
use tracing::debug;
use udf_gateway::{
    handler::Handler,
    proto::messaging_service_client::MessagingServiceClient,
    samples::SampleUdf,
    server::serve_listener,
};

use crate::AnyError;

/// Gateway running on a background task for the duration of a test.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    /// Serve `handler` on an ephemeral loopback port.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(handler: Arc<dyn Handler>) -> Result<Self, AnyError> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(serve_listener(listener, handler, async move {
            // A dropped sender stops the server as well.
            if rx.await.is_err() {
                debug!("test server handle dropped");
            }
        }));
        Ok(Self {
            addr,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    /// Serve one of the bundled sample UDFs with the default fraud threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start_sample(udf: SampleUdf) -> Result<Self, AnyError> {
        Self::start(udf.handler(DEFAULT_FRAUD_THRESHOLD)).await
    }

    /// Address the server listens on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr { self.addr }

    /// `http://` URI of the server, suitable for tonic clients.
    #[must_use]
    pub fn uri(&self) -> String { format!("http://{}", self.addr) }

    /// Connect a new `MessagingService` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn client(&self) -> Result<MessagingServiceClient<Channel>, AnyError> {
        Ok(MessagingServiceClient::connect(self.uri()).await?)
    }

    /// Stop the server and wait for in-flight calls to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task failed or panicked.
    pub async fn shutdown(mut self) -> Result<(), AnyError> {
        self.signal_shutdown();
        match self.task.take() {
            Some(task) => Ok(task.await??),
            None => Ok(()),
        }
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            if tx.send(()).is_err() {
                debug!(addr = %self.addr, "test server already stopped");
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) { self.signal_shutdown(); }
}
