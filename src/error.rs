use std::fmt;
use std::string::FromUtf8Error;
use std::time::Duration;

/// Failure to obtain output from the battery status command.
#[derive(Debug)]
pub enum CommandError {
    Spawn(std::io::Error),
    Io(std::io::Error),
    Timeout(Duration),
    Cancelled,
    Status(Option<i32>),
    Encoding(FromUtf8Error),
    EmptyOutput,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn status command: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Timeout(d) => write!(f, "status command timed out after {}ms", d.as_millis()),
            Self::Cancelled => write!(f, "status command cancelled"),
            Self::Status(Some(code)) => write!(f, "status command exited with code {code}"),
            Self::Status(None) => write!(f, "status command terminated by signal"),
            Self::Encoding(e) => write!(f, "status output is not valid UTF-8: {e}"),
            Self::EmptyOutput => write!(f, "status command produced no output"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) | Self::Io(e) => Some(e),
            Self::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FromUtf8Error> for CommandError {
    fn from(e: FromUtf8Error) -> Self {
        Self::Encoding(e)
    }
}

/// The status text did not contain a usable reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingPercentage,
    InvalidNumber(String),
    OutOfRange(u32),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPercentage => write!(f, "no percentage found in status output"),
            Self::InvalidNumber(s) => write!(f, "invalid percentage: {s}"),
            Self::OutOfRange(n) => write!(f, "percentage out of range: {n}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Failure while registering the app to launch at login.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
#[derive(Debug)]
pub enum LaunchError {
    NoHomeDir,
    Io(std::io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHomeDir => write!(f, "could not determine home directory"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for LaunchError {}

impl From<std::io::Error> for LaunchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure of a fire-and-forget menu action.
#[cfg(target_os = "macos")]
#[derive(Debug)]
pub enum ActionError {
    Io(std::io::Error),
    Failed(String),
}

#[cfg(target_os = "macos")]
impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Failed(msg) => write!(f, "action failed: {msg}"),
        }
    }
}

#[cfg(target_os = "macos")]
impl std::error::Error for ActionError {}

#[cfg(target_os = "macos")]
impl From<std::io::Error> for ActionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        assert_eq!(
            CommandError::Timeout(Duration::from_millis(250)).to_string(),
            "status command timed out after 250ms"
        );
        assert_eq!(
            CommandError::Status(Some(2)).to_string(),
            "status command exited with code 2"
        );
        assert_eq!(
            CommandError::EmptyOutput.to_string(),
            "status command produced no output"
        );
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(ParseError::OutOfRange(140).to_string(), "percentage out of range: 140");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: LaunchError = io.into();
        assert!(matches!(err, LaunchError::Io(_)));
    }
}
