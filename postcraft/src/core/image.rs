//! Generated image payloads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Binary image returned by the image stage.
///
/// Ownership passes to the caller, who may persist or display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Raw image bytes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// MIME type reported by the service (e.g. `image/png`).
    pub mime_type: String,
    /// Where the image was written, if it was persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl GeneratedImage {
    /// Creates an image that has not been persisted.
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            path: None,
        }
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    /// File extension matching the MIME type.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    /// Writes the image to `path`, replacing any previous file, and records
    /// the location.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the file cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_overwrites_and_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("image.png");

        let mut first = GeneratedImage::new(vec![1, 2, 3], "image/png");
        first.save(&path).unwrap();
        let mut second = GeneratedImage::new(vec![9], "image/png");
        second.save(&path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![9]);
        assert_eq!(second.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_extension_from_mime() {
        assert_eq!(GeneratedImage::new(vec![], "image/jpeg").extension(), "jpg");
        assert_eq!(GeneratedImage::new(vec![], "image/png").extension(), "png");
        assert_eq!(GeneratedImage::new(vec![], "application/octet-stream").extension(), "png");
    }

    #[test]
    fn test_bytes_serialize_as_base64() {
        let image = GeneratedImage::new(b"png".to_vec(), "image/png");
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["bytes"], "cG5n");

        let back: GeneratedImage = serde_json::from_value(json).unwrap();
        assert_eq!(back.bytes, b"png".to_vec());
    }
}
