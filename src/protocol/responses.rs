//! Reply codes
//!
//! Three-digit reply codes in the style of an FTP control channel, one per
//! outcome, and helpers to format reply lines.

pub const OK: u16 = 200;
pub const DATA_FOLLOWS: u16 = 150;
pub const LISTING_FOLLOWS: u16 = 212;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
/// Overloaded: admission budget exhausted or gave up waiting
pub const SERVICE_UNAVAILABLE: u16 = 421;
/// IOFailure: storage malfunction
pub const LOCAL_ERROR: u16 = 451;
pub const SYNTAX_ERROR: u16 = 500;
pub const BAD_ARGUMENTS: u16 = 501;
/// NotFound
pub const FILE_NOT_FOUND: u16 = 550;
pub const TOO_LARGE: u16 = 552;

/// Format a reply line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format one listing line. The name goes last so it may contain `|`.
pub fn format_listing_line(name: &str, created_at: &str, updated_at: &str) -> String {
    format!("{}|{}|{}\r\n", created_at, updated_at, name)
}
