//! Build script for man page generation and gRPC bindings.
//!
//! Generates a man page for the `udf-gateway` binary using `clap_mangen`. The
//! CLI definitions are imported from the `cli-defs` crate, which provides
//! stable types shared between build-time and runtime consumers.
//!
//! The `MessagingService` server and client are generated with
//! `tonic-build`'s manual builder. The message types are declared by hand in
//! `src/proto.rs`, so no `protoc` installation is needed.

use std::{env, fs, io, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;
use cli_defs::Cli;
use tonic_build::manual::{Builder, Method, Service};

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=cli-defs");
    println!("cargo::rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            // Some IDE analysis runs do not set OUT_DIR.
            return Ok(());
        }
    };

    generate_messaging_service();

    let bin_name = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "udf-gateway".into());
    let man = Man::new(Cli::command());
    let man_path = out_dir.join(format!("{bin_name}.1"));
    let mut file = fs::File::create(&man_path)?;
    man.render(&mut file)?;

    Ok(())
}

/// Emit `org.springframework.cloud.function.grpc.MessagingService.rs`.
fn generate_messaging_service() {
    let request_reply = Method::builder()
        .name("request_reply")
        .route_name("requestReply")
        .input_type("crate::proto::GrpcMessage")
        .output_type("crate::proto::GrpcMessage")
        .codec_path("tonic::codec::ProstCodec")
        .build();

    let service = Service::builder()
        .name("MessagingService")
        .package("org.springframework.cloud.function.grpc")
        .method(request_reply)
        .build();

    Builder::new().compile(&[service]);
}
