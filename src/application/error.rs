// src/application/error.rs
use crate::domain::error::DomainError;
use crate::domain::specifier::ParseSpecifierError;
use crate::infrastructure::embeddings::registry::BackendFamily;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Invalid embed specifier: {0}")]
    InvalidSpecifier(String),

    #[error(
        "support for the {} backend is not compiled into this binary. \
         Reinstall with `cargo install embr --features {}` (or `--all-features`)",
        .0.label(),
        .0.feature()
    )]
    MissingDependency(BackendFamily),

    #[error("{reason}\n{remediation}")]
    Credential { reason: String, remediation: String },

    #[error("{0} environment variable is not set")]
    MissingEnvVar(&'static str),

    #[error("{0}")]
    Other(String),
}

// Add a context method for ApplicationError
impl ApplicationError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            ApplicationError::Other(msg) => {
                ApplicationError::Other(format!("{}: {}", context.into(), msg))
            }
            ApplicationError::Domain(err) => ApplicationError::Domain(err.context(context)),
            ApplicationError::InvalidSpecifier(msg) => {
                ApplicationError::InvalidSpecifier(format!("{}: {}", context.into(), msg))
            }
            err => ApplicationError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

impl From<ParseSpecifierError> for ApplicationError {
    fn from(err: ParseSpecifierError) -> Self {
        ApplicationError::InvalidSpecifier(err.to_string())
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        ApplicationError::Domain(DomainError::Io(err))
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
