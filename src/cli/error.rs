//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Snapshot { .. } => crate::exitcode::DATAERR,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Domain(DomainError::CapacityExceeded { .. }) => {
                        crate::exitcode::UNAVAILABLE
                    }
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CliError::InvalidArgs("x".into()), crate::exitcode::USAGE)]
    #[case(
        ApplicationError::Config { message: "bad".into() }.into(),
        crate::exitcode::CONFIG
    )]
    #[case(
        ApplicationError::Domain(DomainError::SelfLoop("a".into())).into(),
        crate::exitcode::DATAERR
    )]
    #[case(
        ApplicationError::Domain(DomainError::CapacityExceeded { what: "search", limit: 1 }).into(),
        crate::exitcode::UNAVAILABLE
    )]
    #[case(
        InfraError::io("write", std::io::Error::new(std::io::ErrorKind::Other, "disk")).into(),
        crate::exitcode::IOERR
    )]
    fn given_error_when_exit_code_then_maps_to_sysexits(#[case] err: CliError, #[case] code: i32) {
        assert_eq!(err.exit_code(), code);
    }
}
