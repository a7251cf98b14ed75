//! Attachment files stored on disk, one directory per period.
//!
//! An attachment is stored at `<root>/<period>/<invoice id>_<file name>`. The
//! database keeps the path relative to the root so the root can be moved.

use std::{fs, io::ErrorKind, path::PathBuf};

use crate::{Error, invoice::InvoiceId, sanitize::sanitize_file_name};

/// The directory tree that holds attachment files.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    /// Use `root` as the attachment directory. Nothing is created until a
    /// period directory or attachment is written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the attachments of `period`.
    pub fn period_dir(&self, period: &str) -> PathBuf {
        self.root.join(period)
    }

    /// Create the attachment directory for `period` if it does not exist.
    pub fn create_period_dir(&self, period: &str) -> Result<PathBuf, Error> {
        let dir = self.period_dir(period);
        fs::create_dir_all(&dir).map_err(|error| Error::AttachmentIo(error.to_string()))?;

        Ok(dir)
    }

    /// Write the attachment for invoice `id` and return its path relative to the root.
    pub fn write(
        &self,
        period: &str,
        id: InvoiceId,
        original_file_name: &str,
        bytes: &[u8],
    ) -> Result<String, Error> {
        self.create_period_dir(period)?;

        let relative_path = format!("{period}/{}", attachment_file_name(id, original_file_name));
        let full_path = self.root.join(&relative_path);

        fs::write(&full_path, bytes).map_err(|error| Error::AttachmentIo(error.to_string()))?;
        tracing::debug!(
            "Wrote {} bytes to attachment {}",
            bytes.len(),
            full_path.display()
        );

        Ok(relative_path)
    }

    /// Read the attachment at `relative_path`.
    ///
    /// # Errors
    /// Returns [Error::AttachmentNotFound] if the file does not exist.
    pub fn read(&self, relative_path: &str) -> Result<Vec<u8>, Error> {
        fs::read(self.root.join(relative_path)).map_err(Error::from)
    }

    /// Remove the attachment at `relative_path`. A missing file is not an error.
    pub fn remove(&self, relative_path: &str) -> Result<(), Error> {
        let full_path = self.root.join(relative_path);

        match fs::remove_file(&full_path) {
            Ok(()) => {
                tracing::debug!("Removed attachment {}", full_path.display());
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "Attachment {} was already removed, ignoring",
                    full_path.display()
                );
                Ok(())
            }
            Err(error) => Err(Error::AttachmentIo(error.to_string())),
        }
    }

    /// Remove the attachment directory of `period` and everything in it.
    /// A missing directory is not an error.
    pub fn remove_period_dir(&self, period: &str) -> Result<(), Error> {
        match fs::remove_dir_all(self.period_dir(period)) {
            Err(error) if error.kind() != ErrorKind::NotFound => {
                Err(Error::AttachmentIo(error.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// The stored file name for an attachment: the invoice ID, an underscore and
/// the sanitized original file name.
pub fn attachment_file_name(id: InvoiceId, original_file_name: &str) -> String {
    format!("{id}_{}", sanitize_file_name(original_file_name))
}

/// The file name an attachment was uploaded with, i.e. the final path
/// component without the `<id>_` prefix.
pub fn original_file_name(stored_path: &str) -> &str {
    let file_name = stored_path.rsplit('/').next().unwrap_or(stored_path);

    match file_name.split_once('_') {
        Some((id, rest)) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => file_name,
    }
}
