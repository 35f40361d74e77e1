//! Discard destination: accepts and drops everything. Useful for measuring
//! raw generation throughput.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::DiscardAttrs;
use crate::output::{Output, OutputError, OutputId, OutputKind};

pub struct DiscardOutput {
    id: OutputId,
    active: AtomicBool,
}

impl DiscardOutput {
    pub fn new(attrs: DiscardAttrs) -> Self {
        Self {
            id: OutputId::derive(OutputKind::Discard, &attrs),
            active: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Output for DiscardOutput {
    fn id(&self) -> OutputId {
        self.id.clone()
    }

    fn kind(&self) -> OutputKind {
        OutputKind::Discard
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
        Ok(())
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(OutputError::NullOutput);
        }
        Ok(payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_swallows_writes_when_active() {
        let out = DiscardOutput::new(DiscardAttrs::default());
        out.activate().await.unwrap();
        assert_eq!(out.write(b"gone").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_write_before_activation_is_null() {
        let out = DiscardOutput::new(DiscardAttrs::default());
        assert!(matches!(
            out.write(b"x").await.unwrap_err(),
            OutputError::NullOutput
        ));
    }
}
