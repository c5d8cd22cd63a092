use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Login not completed within {}s", .0.as_secs())]
    LoginTimeout(Duration),

    #[error("Interrupted by user")]
    Interrupted,
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Browser(err.to_string())
    }
}

impl Error {
    /// Process exit status for a run that ended with this error.
    ///
    /// Only configuration problems and a login timeout fail the process.
    /// Browser and navigation errors are logged and the run ends normally.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ConfigMissing(_)
            | Error::ConfigParse(_)
            | Error::ConfigInvalid(_)
            | Error::Io(_)
            | Error::LoginTimeout(_) => 1,
            Error::Browser(_) | Error::Interrupted => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
