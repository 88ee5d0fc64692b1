/// Input validation for category and variation mutations.
///
/// Everything here runs before any remote call is made.
use thiserror::Error;

use super::image::ImageFile;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for uploads.
pub const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("an image file is required")]
    MissingImage,
    #[error("image file is empty")]
    EmptyImage,
    #[error("unsupported image type `{0}`; accepted types: JPG, PNG, WebP")]
    UnsupportedImageType(String),
    #[error("image is too large ({size} bytes); max size is {max} bytes")]
    ImageTooLarge { size: usize, max: usize },
    #[error("unknown root category `{0}`")]
    UnknownRoot(String),
    #[error("unknown sub category `{0}`")]
    UnknownSub(String),
    #[error("unknown type `{category_type}` for {root} / {sub}")]
    UnknownType {
        root: String,
        sub: String,
        category_type: String,
    },
    #[error("select a root category, sub category and type first")]
    IncompleteSelection,
    #[error("select a custom category first")]
    NoCategorySelected,
}

/// Validate a category or variation name and return it trimmed.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Validate an image against the accepted MIME types and the size limit.
pub fn validate_image(file: &ImageFile) -> Result<(), ValidationError> {
    if !ACCEPTED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
        return Err(ValidationError::UnsupportedImageType(
            file.content_type.clone(),
        ));
    }
    match file.size() {
        0 => Err(ValidationError::EmptyImage),
        size if size > MAX_IMAGE_BYTES => Err(ValidationError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        }),
        _ => Ok(()),
    }
}
