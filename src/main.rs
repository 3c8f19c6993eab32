//! `udf-gateway` daemon entry point.

use anyhow::Result;
use udf_gateway::{server, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;
    server::run().await
}
