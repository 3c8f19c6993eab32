//! Administrative command handlers.
//!
//! `send` is a small client for a running gateway: it reads JSON documents,
//! one per line, frames them the way the streaming runtime would, and prints
//! every document of the reply on its own line. The request building and reply
//! decoding stay free of I/O so they can be tested without a server.

#![allow(
    clippy::print_stdout,
    reason = "intentional user output for CLI commands"
)]

use anyhow::{Context, Result, anyhow, bail};
use ortho_config::load_and_merge_subcommand_for;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use super::{Commands, SendArgs};
use crate::{
    collection::{decode_collection, encode_collection},
    content_type::{ExpectedContentType, MediaType},
    headers::{CONTENT_TYPE, Headers, WINDOW_END_TIME, WINDOW_START_TIME},
    proto::{GrpcMessage, messaging_service_client::MessagingServiceClient},
};

/// Gateway contacted when `--target` is not given.
pub const DEFAULT_TARGET: &str = "http://127.0.0.1:55554";

/// Execute an administrative command.
///
/// # Errors
///
/// Propagates failures from configuration merging, input reading or the
/// remote call.
pub async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Send(args) => {
            let merged = load_and_merge_subcommand_for::<SendArgs>(&args)?;
            run_send(&merged).await
        }
    }
}

async fn run_send(args: &SendArgs) -> Result<()> {
    let input = read_input(args.input.as_deref()).await?;
    for document in send(args, &input).await? {
        println!("{document}");
    }
    Ok(())
}

async fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read '{path}'")),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Send the JSON lines of `input` to the gateway named by `args` and return
/// the documents of every reply, in order.
///
/// # Errors
///
/// Returns an error if the input is not JSON lines, the gateway cannot be
/// reached, a call fails or a reply cannot be decoded.
pub async fn send(args: &SendArgs, input: &str) -> Result<Vec<Value>> {
    let documents = parse_json_lines(input)?;
    let content_type = requested_content_type(args.content_type.as_deref())?;
    let requests = build_requests(&documents, content_type, &window_headers(args));

    let target = args.target.as_deref().unwrap_or(DEFAULT_TARGET).to_owned();
    let mut client = MessagingServiceClient::connect(target.clone())
        .await
        .with_context(|| format!("failed to connect to {target}"))?;

    let mut replies = Vec::new();
    for request in requests {
        let reply = client
            .request_reply(request)
            .await
            .map_err(|status| anyhow!("gateway rejected the call: {status}"))?
            .into_inner();
        replies.extend(reply_documents(&reply)?);
    }
    Ok(replies)
}

/// Parse one JSON document per non-blank line.
///
/// # Errors
///
/// Returns an error naming the first line that is not JSON.
pub fn parse_json_lines(input: &str) -> Result<Vec<Value>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("line {} is not JSON", number + 1))
        })
        .collect()
}

fn requested_content_type(value: Option<&str>) -> Result<ExpectedContentType> {
    let Some(value) = value else {
        return Ok(ExpectedContentType::MultipartJson);
    };
    let media: MediaType = value
        .parse()
        .with_context(|| format!("invalid content type '{value}'"))?;
    ExpectedContentType::from_media_type(&media)
        .ok_or_else(|| anyhow!("unsupported content type '{value}'"))
}

fn window_headers(args: &SendArgs) -> Headers {
    [
        (WINDOW_START_TIME, &args.window_start),
        (WINDOW_END_TIME, &args.window_end),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|value| (name.to_owned(), value.clone())))
    .collect()
}

/// Frame `documents` as requests.
///
/// `multipart/json` yields one batch request; `application/json` one request
/// per document. `extra` headers are copied into every request.
#[must_use]
pub fn build_requests(
    documents: &[Value],
    content_type: ExpectedContentType,
    extra: &Headers,
) -> Vec<GrpcMessage> {
    let mut headers = extra.clone();
    headers.insert(CONTENT_TYPE.to_owned(), content_type.as_str().to_owned());
    match content_type {
        ExpectedContentType::MultipartJson => vec![GrpcMessage {
            payload: encode_collection(documents.iter().map(|doc| doc.to_string().into_bytes())),
            headers,
        }],
        ExpectedContentType::ApplicationJson => documents
            .iter()
            .map(|doc| GrpcMessage {
                payload: doc.to_string().into_bytes(),
                headers: headers.clone(),
            })
            .collect(),
    }
}

/// Decode the documents carried by a reply, according to its `contentType`.
///
/// # Errors
///
/// Returns an error if the reply has no usable content type or its payload
/// does not match it.
pub fn reply_documents(reply: &GrpcMessage) -> Result<Vec<Value>> {
    let Some(value) = reply.headers.get(CONTENT_TYPE) else {
        bail!("reply has no {CONTENT_TYPE} header");
    };
    match requested_content_type(Some(value.as_str()))? {
        ExpectedContentType::MultipartJson => decode_collection(&reply.payload)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_slice(item)
                    .with_context(|| format!("reply item {index} is not JSON"))
            })
            .collect(),
        ExpectedContentType::ApplicationJson => Ok(vec![
            serde_json::from_slice(&reply.payload).context("reply is not JSON")?,
        ]),
    }
}
