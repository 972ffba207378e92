//! Error types for the editor

use droplet_model::ContainerKind;
use droplet_parser::ParseError;
use thiserror::Error;

/// Locations are serialized token locations counted from the document root
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("No token at location {0}")]
    InvalidLocation(usize),

    #[error("Token at location {0} does not start a container")]
    NotAContainer(usize),

    #[error("Token at location {0} is not text")]
    NotText(usize),

    #[error("Socket at location {0} already holds a block")]
    SocketFilled(usize),

    #[error("Cannot reparse a {kind} at location {location}")]
    NotReparseable { location: usize, kind: ContainerKind },
}
