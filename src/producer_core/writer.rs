//! Append-only line writer for the live data file, with size-based rotation

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct StreamWriter {
    file: BufWriter<File>,
    current_size: u64,
    max_size: u64,
    base_path: PathBuf,
    max_rotations: u32,
}

impl StreamWriter {
    pub fn new(
        path: impl AsRef<Path>,
        max_size_mb: u64,
        max_rotations: u32,
    ) -> std::io::Result<Self> {
        Self::with_max_bytes(path, max_size_mb * 1024 * 1024, max_rotations)
    }

    fn with_max_bytes(
        path: impl AsRef<Path>,
        max_size: u64,
        max_rotations: u32,
    ) -> std::io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let current_size = file.metadata()?.len();

        Ok(Self {
            file: BufWriter::new(file),
            current_size,
            max_size,
            base_path: path.to_path_buf(),
            max_rotations,
        })
    }

    /// Append one line and flush so the tailing consumer sees it promptly.
    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;

        self.current_size += (line.len() + 1) as u64;
        if self.current_size >= self.max_size {
            self.rotate()?;
        }

        Ok(())
    }

    fn rotated_path(&self, index: u32) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.base_path.display(), index))
    }

    fn rotate(&mut self) -> std::io::Result<()> {
        self.file.flush()?;

        // Shift existing rotations up, dropping the oldest.
        let oldest = self.rotated_path(self.max_rotations);
        if oldest.exists() {
            std::fs::remove_file(&oldest)?;
        }

        for i in (1..self.max_rotations).rev() {
            let old_path = self.rotated_path(i);
            if old_path.exists() {
                std::fs::rename(&old_path, self.rotated_path(i + 1))?;
            }
        }

        if self.base_path.exists() {
            std::fs::rename(&self.base_path, self.rotated_path(1))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.base_path)?;
        self.file = BufWriter::new(file);
        self.current_size = 0;

        log::info!("🔄 Rotated {}", self.base_path.display());
        Ok(())
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}
