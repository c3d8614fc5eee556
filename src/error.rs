use std::io;

use rsbinder::error::StatusCode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),
    #[error(transparent)]
    DumpStatus(#[from] StatusCode),
    #[error("service `{0}` not exist")]
    ServiceNotExist(Box<str>),
    #[error("unexpected `{service}` dump output: {reason}")]
    Malformed { service: &'static str, reason: String },
    #[error("no label available for `{0}`")]
    LabelUnavailable(String),
    #[error("failed to open usage access settings: {0}")]
    Navigation(String),
    #[error("grant request token does not match the pending request")]
    UnknownRequest,
    #[error("invalid configuration: {0}")]
    Config(String),
}
