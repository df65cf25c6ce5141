//! Image attachment staging: at most one pending image awaiting send.

use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// A picked image file, held in memory until the next send.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    /// Original file name, shown in the transcript summary.
    pub file_name: String,
    /// Mime type for the multipart upload.
    pub mime: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Read an image from disk, guessing the mime type from the extension.
    ///
    /// No validation beyond readability is performed; the backend decides
    /// what it accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_owned());
        let mime = guess_mime(&file_name).to_owned();
        Ok(Self {
            file_name,
            mime,
            data,
        })
    }
}

/// Guess an image mime type from a file name extension.
fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Holds at most one staged image between sends.
///
/// Staging a second image replaces the first. The pipeline takes the staged
/// image at send time, so a stale attachment can never reattach to a later
/// send.
#[derive(Debug, Default)]
pub struct AttachmentStaging {
    staged: Option<ImageAttachment>,
}

impl AttachmentStaging {
    /// Create an empty staging slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an image, replacing any previously staged one.
    pub fn stage(&mut self, attachment: ImageAttachment) {
        if let Some(old) = &self.staged {
            debug!("replacing staged image {}", old.file_name);
        }
        self.staged = Some(attachment);
    }

    /// Remove and return the staged image, leaving the slot empty.
    pub fn take(&mut self) -> Option<ImageAttachment> {
        self.staged.take()
    }

    /// Drop any staged image.
    pub fn clear(&mut self) {
        self.staged = None;
    }

    /// The currently staged image, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ImageAttachment> {
        self.staged.as_ref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn image(name: &str) -> ImageAttachment {
        ImageAttachment {
            file_name: name.to_owned(),
            mime: "image/png".to_owned(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn stage_replaces_previous() {
        let mut staging = AttachmentStaging::new();
        staging.stage(image("a.png"));
        staging.stage(image("b.png"));
        assert_eq!(staging.current().unwrap().file_name, "b.png");
    }

    #[test]
    fn take_empties_the_slot() {
        let mut staging = AttachmentStaging::new();
        staging.stage(image("leaf.png"));
        let taken = staging.take().unwrap();
        assert_eq!(taken.file_name, "leaf.png");
        assert!(staging.current().is_none());
        assert!(staging.take().is_none());
    }

    #[test]
    fn clear_is_unconditional() {
        let mut staging = AttachmentStaging::new();
        staging.clear();
        staging.stage(image("x.png"));
        staging.clear();
        assert!(staging.current().is_none());
    }

    #[test]
    fn mime_guess_covers_common_extensions() {
        assert_eq!(guess_mime("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime("scan.png"), "image/png");
        assert_eq!(guess_mime("clip.webp"), "image/webp");
        assert_eq!(guess_mime("unknown.bin"), "application/octet-stream");
        assert_eq!(guess_mime("noext"), "application/octet-stream");
    }
}
