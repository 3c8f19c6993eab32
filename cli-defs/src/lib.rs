//! Shared CLI type definitions for udf-gateway build and runtime.
//!
//! This crate provides CLI argument and configuration types used by both the
//! `build.rs` script (for man page generation) and the runtime binary.
//! Keeping them in a separate crate keeps build-time dependencies free of the
//! gRPC stack.

// FIXME: File-wide suppressions are unavoidable here. Clap and OrthoConfig derive macros
// inject generated code throughout the module, and there is no mechanism to narrow
// the scope without restructuring the crate.
#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![allow(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]

use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

/// Default listening port of the `MessagingService` endpoint.
pub const DEFAULT_PORT: u16 = 55_554;
/// Default listening interface.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Built-in UDF served when none is configured.
pub const DEFAULT_UDF: &str = "team-score";
/// Authorization count a card must exceed to be reported by `fraud-detection`.
pub const DEFAULT_FRAUD_THRESHOLD: u64 = 5;

/// Arguments for the `send` client subcommand.
#[derive(Parser, OrthoConfig, Deserialize, Serialize, Default, Debug, Clone)]
#[ortho_config(prefix = "UDF_")]
pub struct SendArgs {
    /// Gateway URI, for example `http://127.0.0.1:55554`.
    #[arg(long)]
    pub target: Option<String>,
    /// File of JSON documents, one per line. Reads stdin when omitted.
    #[arg(long)]
    pub input: Option<String>,
    /// `multipart/json` sends one batch, `application/json` a single document.
    #[arg(long)]
    pub content_type: Option<String>,
    /// Opaque value forwarded as the `windowStartTime` header.
    #[arg(long)]
    pub window_start: Option<String>,
    /// Opaque value forwarded as the `windowEndTime` header.
    #[arg(long)]
    pub window_end: Option<String>,
}

/// CLI subcommands exposed by `udf-gateway`.
#[derive(Subcommand, Deserialize, Serialize, Debug, Clone)]
pub enum Commands {
    /// Send JSON documents to a running gateway and print the reply.
    #[command(name = "send")]
    Send(SendArgs),
}

/// Runtime configuration of the gateway daemon.
///
/// The default host `0.0.0.0` listens on all interfaces, which is what a
/// sidecar next to the streaming runtime expects.
#[derive(Args, OrthoConfig, Serialize, Deserialize, Default, Debug, Clone)]
#[ortho_config(prefix = "UDF_")]
pub struct AppConfig {
    /// Interface to bind the gRPC endpoint to.
    #[ortho_config(default = DEFAULT_HOST.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
    pub host: String,
    /// Port to bind the gRPC endpoint to.
    #[ortho_config(default = DEFAULT_PORT)]
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Built-in UDF to serve (`team-score`, `user-score`, `fraud-detection`
    /// or `uppercase`).
    #[ortho_config(default = DEFAULT_UDF.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_UDF))]
    pub udf: String,
    /// Authorization count a card must exceed before `fraud-detection`
    /// reports it.
    #[ortho_config(default = DEFAULT_FRAUD_THRESHOLD)]
    #[arg(long, default_value_t = DEFAULT_FRAUD_THRESHOLD)]
    pub fraud_threshold: u64,
}

/// Top-level CLI entry point consumed by binaries.
#[derive(Parser, Deserialize, Serialize, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Application configuration.
    #[command(flatten)]
    pub config: AppConfig,
    /// Optional subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
