//! File destination: appends events to a single log file.
//!
//! Rotation and compression are left to an external log-rotation layer.

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::config::FileAttrs;
use crate::output::{Output, OutputError, OutputId, OutputKind};

pub struct FileOutput {
    id: OutputId,
    attrs: FileAttrs,
    // Some while active. Buffered; flushed on deactivation.
    writer: Mutex<Option<BufWriter<tokio::fs::File>>>,
}

impl FileOutput {
    pub fn new(attrs: FileAttrs) -> Self {
        Self {
            id: OutputId::derive(OutputKind::File, &attrs),
            attrs,
            writer: Mutex::new(None),
        }
    }

    /// The full path of the destination file.
    pub fn path(&self) -> std::path::PathBuf {
        self.attrs.directory.join(&self.attrs.file_name)
    }
}

#[async_trait]
impl Output for FileOutput {
    fn id(&self) -> OutputId {
        self.id.clone()
    }

    fn kind(&self) -> OutputKind {
        OutputKind::File
    }

    async fn activate(&self) -> Result<(), OutputError> {
        let mut writer = self.writer.lock().await;
        if writer.is_some() {
            return Err(OutputError::AlreadyActive);
        }

        tokio::fs::create_dir_all(&self.attrs.directory).await?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())
            .await?;
        *writer = Some(BufWriter::new(file));
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), OutputError> {
        let mut writer = self.writer.lock().await;
        match writer.take() {
            None => Err(OutputError::NotActive),
            Some(mut w) => {
                w.flush().await?;
                w.shutdown().await?;
                Ok(())
            }
        }
    }

    async fn write(&self, payload: &[u8]) -> Result<usize, OutputError> {
        let mut writer = self.writer.lock().await;
        match writer.as_mut() {
            None => Err(OutputError::NullOutput),
            Some(w) => {
                w.write_all(payload).await?;
                w.write_all(b"\n").await?;
                Ok(payload.len())
            }
        }
    }
}
