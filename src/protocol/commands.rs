//! Module `commands`
//!
//! Defines the RPC command set and its parser, plus the result structure
//! handlers return.

/// A command parsed from one request line.
///
/// Filenames are taken verbatim: everything after the separating space, up
/// to the line terminator.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `UPLOAD <len> <filename>`, followed by `len` raw bytes. The filename
    /// may be empty; the payload is still owed once the length parsed.
    UPLOAD { size: u64, filename: String },
    /// `DOWNLOAD <filename>`
    DOWNLOAD(String),
    LIST,
    NOOP,
    QUIT,
    /// A known command with missing or malformed arguments
    INVALID(String),
    UNKNOWN,
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
    /// Raw bytes written after the reply line (download content)
    pub data: Option<Vec<u8>>,
}

/// Parses one request line (with or without its line terminator).
pub fn parse_command(raw: &str) -> Command {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let (cmd, arg) = match line.split_once(' ') {
        Some((cmd, arg)) => (cmd, Some(arg)),
        None => (line, None),
    };

    match (cmd.to_ascii_uppercase().as_str(), arg) {
        ("LIST", None) => Command::LIST,
        ("NOOP", None) => Command::NOOP,
        ("QUIT", None) => Command::QUIT,
        ("DOWNLOAD", Some(filename)) if !filename.is_empty() => {
            Command::DOWNLOAD(filename.to_string())
        }
        ("DOWNLOAD", _) => Command::INVALID("DOWNLOAD requires a filename".into()),
        ("UPLOAD", Some(args)) => parse_upload(args),
        ("UPLOAD", None) => Command::INVALID("UPLOAD requires a length and a filename".into()),
        ("LIST" | "NOOP" | "QUIT", Some(_)) => {
            Command::INVALID(format!("{} takes no arguments", cmd.to_ascii_uppercase()))
        }
        _ => Command::UNKNOWN,
    }
}

fn parse_upload(args: &str) -> Command {
    let Some((size, filename)) = args.split_once(' ') else {
        return Command::INVALID("UPLOAD requires a length and a filename".into());
    };

    match size.parse::<u64>() {
        Ok(size) => Command::UPLOAD {
            size,
            filename: filename.to_string(),
        },
        Err(_) => Command::INVALID(format!("invalid upload length {:?}", size)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands_case_insensitively() {
        assert_eq!(parse_command("LIST\r\n"), Command::LIST);
        assert_eq!(parse_command("list"), Command::LIST);
        assert_eq!(parse_command("Noop\n"), Command::NOOP);
        assert_eq!(parse_command("QUIT\r\n"), Command::QUIT);
        assert_eq!(parse_command("RETR a.txt\r\n"), Command::UNKNOWN);
        assert_eq!(parse_command(""), Command::UNKNOWN);
    }

    #[test]
    fn filenames_are_verbatim() {
        assert_eq!(
            parse_command("DOWNLOAD  my file .txt\r\n"),
            Command::DOWNLOAD(" my file .txt".into())
        );
        assert_eq!(
            parse_command("UPLOAD 3 x.bin\r\n"),
            Command::UPLOAD { size: 3, filename: "x.bin".into() }
        );
        assert_eq!(
            parse_command("upload 0 a b|c\r\n"),
            Command::UPLOAD { size: 0, filename: "a b|c".into() }
        );
    }

    #[test]
    fn upload_length_is_kept_without_a_filename() {
        assert_eq!(
            parse_command("UPLOAD 4 \r\n"),
            Command::UPLOAD { size: 4, filename: String::new() }
        );
    }

    #[test]
    fn malformed_arguments_are_invalid() {
        for line in ["DOWNLOAD", "DOWNLOAD ", "UPLOAD", "UPLOAD 12", "UPLOAD x a.txt", "UPLOAD -1 a.txt", "LIST now"] {
            assert!(
                matches!(parse_command(line), Command::INVALID(_)),
                "{line:?} should be invalid"
            );
        }
    }
}
