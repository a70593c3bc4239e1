use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, nothing went wrong
/// - `Failure` (1): Command completed but some records failed to persist
/// - `Error` (2): Command failed outright (config error, unreadable store, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed, nothing went wrong.
    Success,
    /// Command completed but some records failed to persist.
    Failure,
    /// Command failed outright (config error, unreadable store, etc.).
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
