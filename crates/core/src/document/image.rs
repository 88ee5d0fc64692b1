use std::fmt;

/// In-memory file handle produced by the upload form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Keeps multi-megabyte payloads out of logs.
impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Image attached to a category or variation.
///
/// `Uploaded` carries a fresh local file that still has to be stored;
/// `Persisted` refers to an object already in the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Uploaded(ImageFile),
    Persisted { url: String, storage_path: String },
}

impl ImageRef {
    pub fn persisted(url: impl Into<String>, storage_path: impl Into<String>) -> Self {
        ImageRef::Persisted {
            url: url.into(),
            storage_path: storage_path.into(),
        }
    }

    pub fn as_upload(&self) -> Option<&ImageFile> {
        match self {
            ImageRef::Uploaded(file) => Some(file),
            ImageRef::Persisted { .. } => None,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, ImageRef::Uploaded(_))
    }
}

impl From<ImageFile> for ImageRef {
    fn from(file: ImageFile) -> Self {
        ImageRef::Uploaded(file)
    }
}
