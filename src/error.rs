use crate::config::ConfigError;
use crate::file_organizer::OrganizeError;
use thiserror::Error;

/// Any error that ends an invocation.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not determine a default source directory; pass --source")]
    NoDefaultSource,
}

pub type Result<T> = std::result::Result<T, Error>;
