use std::path::{Path, PathBuf};

use shared::{domain::ImageKind, error::ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    filename: String,
    kind: ImageKind,
    bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ImageFile {
    /// Builds an image from its file name and contents. Only PNG and JPEG
    /// are accepted; the type is guessed from the file extension.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let filename = filename.into();
        let guessed = mime_guess::from_path(&filename).first();
        let kind = guessed
            .as_ref()
            .and_then(|mime| ImageKind::from_mime(mime.essence_str()))
            .ok_or_else(|| {
                ValidationError::UnsupportedImage(
                    guessed
                        .map(|mime| mime.essence_str().to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                )
            })?;
        Ok(Self::with_kind(filename, kind, bytes))
    }

    pub fn with_kind(filename: impl Into<String>, kind: ImageKind, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ImageLoadError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Reject by name before touching the disk.
        let kind = Self::new(filename.clone(), Vec::new())?.kind;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ImageLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::with_kind(filename, kind, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Form state as edited by the user. Nothing here is checked until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub image: Option<ImageFile>,
    pub script: String,
}

impl FormInput {
    pub fn script_char_count(&self) -> usize {
        self.script.chars().count()
    }

    /// Image is checked first, then the script.
    pub fn validate(&self) -> Result<ValidatedForm, ValidationError> {
        let image = self.image.clone().ok_or(ValidationError::MissingImage)?;
        if self.script.trim().is_empty() {
            return Err(ValidationError::EmptyScript);
        }
        Ok(ValidatedForm {
            image,
            script: self.script.clone(),
        })
    }
}

/// A form that passed local validation. The script is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    image: ImageFile,
    script: String,
}

impl ValidatedForm {
    pub fn image(&self) -> &ImageFile {
        &self.image
    }

    pub fn script(&self) -> &str {
        &self.script
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
