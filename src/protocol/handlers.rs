//! Command handlers module for the RPC gateway.
//!
//! Translates parsed commands into file service calls and service results
//! into reply lines. Each admission wait is bounded by the configured
//! acquire timeout.

use log::info;
use tokio::time::sleep;

use crate::config::LimitsConfig;
use crate::error::FileServiceError;
use crate::error::handlers::error_to_reply_code;
use crate::protocol::responses::{self, format_listing_line, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::service::FileService;

/// Dispatches a command that carries no payload to its handler.
///
/// `UPLOAD` needs its payload read off the connection first; the session
/// loop does that and calls [`handle_upload`] directly.
pub async fn handle_command(
    service: &FileService,
    limits: &LimitsConfig,
    command: &Command,
) -> CommandResult {
    match command {
        Command::LIST => handle_cmd_list(service, limits).await,
        Command::DOWNLOAD(filename) => handle_cmd_download(service, limits, filename).await,
        Command::NOOP => handle_cmd_noop(),
        Command::QUIT => handle_cmd_quit(),
        Command::INVALID(reason) => handle_cmd_invalid(reason),
        Command::UPLOAD { .. } => CommandResult {
            status: CommandStatus::Failure("Upload payload missing".into()),
            message: Some(format_response(
                responses::BAD_ARGUMENTS,
                "UPLOAD must be followed by its payload",
            )),
            data: None,
        },
        Command::UNKNOWN => handle_cmd_unknown(),
    }
}

/// Handles an UPLOAD whose payload has been read in full.
pub async fn handle_upload(
    service: &FileService,
    limits: &LimitsConfig,
    filename: &str,
    content: Vec<u8>,
) -> CommandResult {
    if filename.is_empty() {
        return handle_cmd_invalid("UPLOAD requires a filename");
    }

    match service
        .upload(filename, content, sleep(limits.acquire_timeout()))
        .await
    {
        Ok(response) => CommandResult {
            status: CommandStatus::Success,
            message: Some(format_response(
                responses::TRANSFER_COMPLETE,
                &response.message,
            )),
            data: None,
        },
        Err(e) => failure(&e),
    }
}

/// Handles the LIST command: a count line, then one line per file.
async fn handle_cmd_list(service: &FileService, limits: &LimitsConfig) -> CommandResult {
    match service.list_files(sleep(limits.acquire_timeout())).await {
        Ok(listing) => {
            let mut message = format_response(
                responses::LISTING_FOLLOWS,
                &listing.files.len().to_string(),
            );
            for file in &listing.files {
                message.push_str(&format_listing_line(
                    &file.name,
                    &file.created_at,
                    &file.updated_at,
                ));
            }
            info!("Listing {} files", listing.files.len());
            CommandResult {
                status: CommandStatus::Success,
                message: Some(message),
                data: None,
            }
        }
        Err(e) => failure(&e),
    }
}

/// Handles the DOWNLOAD command: a length line, then the raw content.
async fn handle_cmd_download(
    service: &FileService,
    limits: &LimitsConfig,
    filename: &str,
) -> CommandResult {
    match service
        .download(filename, sleep(limits.acquire_timeout()))
        .await
    {
        Ok(response) => CommandResult {
            status: CommandStatus::Success,
            message: Some(format_response(
                responses::DATA_FOLLOWS,
                &response.content.len().to_string(),
            )),
            data: Some(response.content),
        },
        Err(e) => failure(&e),
    }
}

fn handle_cmd_noop() -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(format_response(responses::OK, "OK")),
        data: None,
    }
}

/// Handles the QUIT command: signals connection close.
fn handle_cmd_quit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(format_response(responses::GOODBYE, "Goodbye")),
        data: None,
    }
}

fn handle_cmd_invalid(reason: &str) -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure(reason.to_string()),
        message: Some(format_response(responses::BAD_ARGUMENTS, reason)),
        data: None,
    }
}

fn handle_cmd_unknown() -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure("Unknown command".into()),
        message: Some(format_response(responses::SYNTAX_ERROR, "Unknown command")),
        data: None,
    }
}

fn failure(err: &FileServiceError) -> CommandResult {
    // Detail is a single line; strip anything that could break framing.
    let detail = err.to_string().replace(['\r', '\n'], " ");
    CommandResult {
        status: CommandStatus::Failure(detail.clone()),
        message: Some(format_response(error_to_reply_code(err), &detail)),
        data: None,
    }
}
