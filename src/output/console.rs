//! Console destination: stdout or stderr.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::{ConsoleAttrs, ConsoleTarget};
use crate::output::{Output, OutputError, OutputId, OutputKind};

enum Stream {
    Stdout(tokio::io::Stdout),
    Stderr(tokio::io::Stderr),
}

pub struct ConsoleOutput {
    id: OutputId,
    attrs: ConsoleAttrs,
    active: AtomicBool,
    stream: Mutex<Stream>,
}

impl ConsoleOutput {
    pub fn new(attrs: ConsoleAttrs) -> Self {
        let stream = match attrs.target {
            ConsoleTarget::Stdout => Stream::Stdout(tokio::io::stdout()),
            ConsoleTarget::Stderr => Stream::Stderr(tokio::io::stderr()),
        };
        Self {
            id: OutputId::derive(OutputKind::Console, &attrs),
            attrs,
            active: AtomicBool::new(false),
            stream: Mutex::new(stream),
        }
    }

    /// The configured target stream.
    pub fn target(&self) -> ConsoleTarget {
        self.attrs.target
    }
}

#[async_trait]
impl Output for ConsoleOutput {
    fn id(&self) -> OutputId {
        self.id.clone()
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Console
    }

    async fn activate(&self) -> Result<(), OutputError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(OutputError::AlreadyActive);
        }
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), OutputError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(OutputError::NotActive);
        }
        let mut stream = self.stream.lock().await;
        match &mut *stream {
            Stream::Stdout(s) => s.flush().await?,
            Stream::Stderr(s) => s.flush().await?,
        }
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(OutputError::NullOutput);
        }

        let mut stream = self.stream.lock().await;
        match &mut *stream {
            Stream::Stdout(s) => {
                s.write_all(payload).await?;
                s.write_all(b"\n").await?;
            }
            Stream::Stderr(s) => {
                s.write_all(payload).await?;
                s.write_all(b"\n").await?;
            }
        }
        Ok(payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_before_activation_is_null() {
        let out = ConsoleOutput::new(ConsoleAttrs::default());
        let err = out.write(b"hello").await.unwrap_err();
        assert!(matches!(err, OutputError::NullOutput));
    }

    #[tokio::test]
    async fn test_lifecycle_errors() {
        let out = ConsoleOutput::new(ConsoleAttrs::default());

        out.activate().await.unwrap();
        assert!(matches!(
            out.activate().await.unwrap_err(),
            OutputError::AlreadyActive
        ));

        out.deactivate().await.unwrap();
        assert!(matches!(
            out.deactivate().await.unwrap_err(),
            OutputError::NotActive
        ));
    }
}
