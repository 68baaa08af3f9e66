use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown encoding label {0:?}")]
    UnknownEncoding(String),
    #[error("could not decode {path:?} with any of: {}", tried.join(", "))]
    Undecodable { path: PathBuf, tried: Vec<String> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("the volunteer-teaching terms must be accepted")]
    TermsNotAccepted,
}
