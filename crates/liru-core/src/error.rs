//! Shared error type across liru crates.

use std::fmt;

use thiserror::Error;

/// Stable error classification exposed to embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The caller violated a precondition. Detected before the transport is touched.
    Usage,
    /// The shared-texture transport refused or failed the operation.
    Transport,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Usage => "USAGE_ERROR",
            ErrorCode::Transport => "TRANSPORT_ERROR",
        }
    }
}

/// Which side of the exchange a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session operation that reached the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Publish,
    Send,
    Receive,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Publish => "publish",
            Operation::Send => "send",
            Operation::Receive => "receive",
        };
        f.write_str(s)
    }
}

/// Failure reported by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFault {
    #[error("name already published: {0}")]
    NameInUse(String),
    #[error("no publisher available{}", target_suffix(.0))]
    NoPublisher(Option<String>),
    #[error("slot is not published")]
    NotPublished,
    #[error("{0}")]
    Failed(String),
}

fn target_suffix(target: &Option<String>) -> String {
    match target {
        Some(name) => format!(" (target={name})"),
        None => String::new(),
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LiruError>;

/// Unified error type used by core and session crates.
#[derive(Debug, Error)]
pub enum LiruError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} has been released")]
    Released(Role),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{op} failed: {source}")]
    Transport {
        op: Operation,
        #[source]
        source: TransportFault,
    },
}

impl LiruError {
    /// Wrap a transport fault with the operation that produced it.
    pub fn transport(op: Operation, source: TransportFault) -> Self {
        LiruError::Transport { op, source }
    }

    /// Map the error to its stable classification.
    pub fn code(&self) -> ErrorCode {
        match self {
            LiruError::InvalidArgument(_) | LiruError::Released(_) | LiruError::Config(_) => {
                ErrorCode::Usage
            }
            LiruError::Transport { .. } => ErrorCode::Transport,
        }
    }

    /// Operation that failed, for transport errors.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            LiruError::Transport { op, .. } => Some(*op),
            _ => None,
        }
    }
}
