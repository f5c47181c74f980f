//! File transport: ordered line delivery by tailing the live data file

use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::time::sleep;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Ordered, at-least-once delivery of raw payload lines.
///
/// Offset management, acknowledgement and broker coordination stay behind
/// this seam; the consumer only ever pulls one line at a time.
#[async_trait]
pub trait Transport: Send {
    /// Next payload line, waiting until one is available.
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;
}

/// Tails the data file the producer appends to. Detects rotation by inode
/// change and reopens the new file from the beginning.
pub struct FileTailTransport {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    inode: Option<u64>,
    poll_interval: Duration,
    seek_to_end: bool,
}

impl FileTailTransport {
    /// Tail from the current end of the file (live consumption).
    pub fn new(path: PathBuf, poll_interval: Duration) -> Self {
        Self {
            path,
            reader: None,
            inode: None,
            poll_interval,
            seek_to_end: true,
        }
    }

    /// Read from the beginning of the file before following new appends.
    pub fn from_start(path: PathBuf, poll_interval: Duration) -> Self {
        Self {
            seek_to_end: false,
            ..Self::new(path, poll_interval)
        }
    }

    pub async fn open(&mut self) -> std::io::Result<()> {
        let file = File::open(&self.path).await?;
        let metadata = file.metadata().await?;

        #[cfg(unix)]
        {
            self.inode = Some(metadata.ino());
        }
        #[cfg(not(unix))]
        {
            let _ = metadata;
        }

        let mut reader = BufReader::new(file);
        if self.seek_to_end {
            reader.seek(SeekFrom::End(0)).await?;
        }
        self.reader = Some(reader);

        log::info!("📖 Tailing {}", self.path.display());
        Ok(())
    }

    async fn rotated(&self) -> std::io::Result<bool> {
        #[cfg(unix)]
        {
            let metadata = match tokio::fs::metadata(&self.path).await {
                Ok(metadata) => metadata,
                // The producer may be mid-rotation; the file will be back.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
                Err(e) => return Err(e),
            };
            Ok(self.inode.map_or(false, |old| old != metadata.ino()))
        }

        #[cfg(not(unix))]
        {
            Ok(false)
        }
    }
}

#[async_trait]
impl Transport for FileTailTransport {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if self.rotated().await? {
                log::info!("🔄 Data file rotated, reopening {}", self.path.display());
                // The rotated-in file is new content; read it from the top.
                self.seek_to_end = false;
                self.open().await?;
            }

            let reader = match self.reader.as_mut() {
                Some(reader) => reader,
                None => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "transport not opened",
                    ))
                }
            };

            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                // No new data yet.
                sleep(self.poll_interval).await;
                continue;
            }

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
}
