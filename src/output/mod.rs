//! Output destinations and the fan-out registry.
//!
//! An [`Output`] accepts rendered log events through a `write` call and has a
//! three-state lifecycle: inactive -> active -> inactive. Only active outputs
//! accept writes. Destinations are registered in a [`registry::Registry`],
//! which fans every event out to all of them and aggregates per-destination
//! failures so one bad sink never blocks the healthy ones.

pub mod console;
pub mod discard;
pub mod file;
pub mod kafka;
pub mod registry;
pub mod syslog;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

pub use console::ConsoleOutput;
pub use discard::DiscardOutput;
pub use file::FileOutput;
pub use kafka::KafkaOutput;
pub use registry::Registry;
pub use syslog::SyslogOutput;

use crate::config::OutputConfig;

/// The closed set of destination types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Console,
    File,
    Syslog,
    Kafka,
    Discard,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputKind::Console => "console",
            OutputKind::File => "file",
            OutputKind::Syslog => "syslog",
            OutputKind::Kafka => "kafka",
            OutputKind::Discard => "discard",
        };
        f.write_str(s)
    }
}

/// The short identity of an output, derived deterministically from its
/// rendered configuration. Used for de-duplication and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(String);

impl OutputId {
    /// Compute the identity for a destination: a base64-encoded SHA-256 of
    /// the kind tag plus the canonical JSON rendering of its attributes.
    pub fn derive<T: Serialize + fmt::Debug>(kind: OutputKind, attrs: &T) -> Self {
        let rendered = match serde_json::to_string(attrs) {
            Ok(json) => json,
            Err(_) => format!("{attrs:?}"),
        };

        let mut hasher = Sha256::new();
        hasher.update(kind.to_string().as_bytes());
        hasher.update(rendered.as_bytes());
        OutputId(BASE64.encode(hasher.finalize()))
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for destination and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Write attempted before activation.
    #[error("output is not active")]
    NullOutput,

    /// Activate called on an already active output.
    #[error("output is already active")]
    AlreadyActive,

    /// Deactivate called on an already inactive output. Surfacing this
    /// catches double-close bugs.
    #[error("output is already inactive")]
    NotActive,

    /// An output with the same computed identity is already registered.
    #[error("duplicate output id {0}")]
    Duplicate(OutputId),

    /// The output is not present in the registry.
    #[error("output not found: {0}")]
    NotFound(OutputId),

    /// The registry has no outputs at all.
    #[error("registry is empty")]
    EmptyRegistry,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("kafka: {0}")]
    Kafka(String),

    /// Several destinations failed during one fan-out operation.
    #[error("{0} destination(s) failed: [{1}]")]
    Combined(usize, String),
}

/// Fold a list of per-destination errors into a single result: `Ok` when
/// empty, the error itself when singular, [`OutputError::Combined`] otherwise.
pub fn combine_errors(errs: Vec<OutputError>) -> Result<(), OutputError> {
    match errs.len() {
        0 => Ok(()),
        1 => Err(errs.into_iter().next().unwrap_or(OutputError::NullOutput)),
        n => {
            let joined = errs
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(OutputError::Combined(n, joined))
        }
    }
}

/// The operations every destination must support in order to be accepted by
/// the spout.
#[async_trait]
pub trait Output: Send + Sync {
    /// The short identity of this destination.
    fn id(&self) -> OutputId;

    /// The destination type.
    fn kind(&self) -> OutputKind;

    /// Acquire resources (open files, connect sockets). Called once per
    /// lifecycle; activating an active output is an error.
    async fn activate(&self) -> Result<(), OutputError>;

    /// Release resources. Deactivating an inactive output is an error, not a
    /// silent no-op.
    async fn deactivate(&self) -> Result<(), OutputError>;

    /// Write one rendered event. Returns the number of payload bytes
    /// accepted, or [`OutputError::NullOutput`] before activation.
    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError>;
}

/// Build a destination instance from its configuration. This is the single
/// table-driven construction point, keyed by the type tag.
pub fn from_config(config: &OutputConfig) -> Arc<dyn Output> {
    match config {
        OutputConfig::Console(attrs) => Arc::new(ConsoleOutput::new(attrs.clone())),
        OutputConfig::File(attrs) => Arc::new(FileOutput::new(attrs.clone())),
        OutputConfig::Syslog(attrs) => Arc::new(SyslogOutput::new(attrs.clone())),
        OutputConfig::Kafka(attrs) => Arc::new(KafkaOutput::new(attrs.clone())),
        OutputConfig::Discard(attrs) => Arc::new(DiscardOutput::new(attrs.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileAttrs;

    #[test]
    fn test_id_is_deterministic() {
        let attrs = FileAttrs {
            directory: "/tmp".into(),
            file_name: "a.log".into(),
        };
        let a = OutputId::derive(OutputKind::File, &attrs);
        let b = OutputId::derive(OutputKind::File, &attrs);
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_differs_by_kind_and_attrs() {
        let attrs = FileAttrs {
            directory: "/tmp".into(),
            file_name: "a.log".into(),
        };
        let other = FileAttrs {
            directory: "/tmp".into(),
            file_name: "b.log".into(),
        };

        assert_ne!(
            OutputId::derive(OutputKind::File, &attrs),
            OutputId::derive(OutputKind::File, &other)
        );
        assert_ne!(
            OutputId::derive(OutputKind::File, &attrs),
            OutputId::derive(OutputKind::Discard, &attrs)
        );
    }

    #[test]
    fn test_combine_errors() {
        assert!(combine_errors(vec![]).is_ok());

        let single = combine_errors(vec![OutputError::NullOutput]).unwrap_err();
        assert!(matches!(single, OutputError::NullOutput));

        let many =
            combine_errors(vec![OutputError::NullOutput, OutputError::EmptyRegistry]).unwrap_err();
        assert!(matches!(many, OutputError::Combined(2, _)));
    }
}
