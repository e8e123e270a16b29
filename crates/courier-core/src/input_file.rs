//! File references used by send methods.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix that marks a string as a local file locator.
pub const LOCAL_FILE_PREFIX: &str = "file://";

/// Prefix of a JSON value that points at a multipart part by name.
pub const ATTACH_PREFIX: &str = "attach://";

/// A file to send.
///
/// Remote identifiers and URLs are passed to the service as plain values;
/// local paths and in-memory data are uploaded as multipart parts.
///
/// ```rust
/// use courier_core::InputFile;
///
/// assert!(matches!(InputFile::parse("AgACAgIAAxk"), InputFile::Id(_)));
/// assert!(matches!(InputFile::parse("https://example.com/cat.png"), InputFile::Url(_)));
/// assert!(InputFile::parse("file:///tmp/cat.png").is_upload());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum InputFile {
    /// A file already stored by the service.
    Id(String),
    /// An HTTP URL the service fetches itself.
    Url(String),
    /// A local file, read when the request body is built.
    Path(PathBuf),
    /// In-memory content with an explicit file name.
    Memory {
        /// Name reported for the uploaded part.
        file_name: String,
        /// File content.
        data: Bytes,
    },
}

impl InputFile {
    /// Classifies a string: `file://` prefix, then HTTP(S) URL, else remote id.
    pub fn parse(value: &str) -> Self {
        if let Some(path) = value.strip_prefix(LOCAL_FILE_PREFIX) {
            Self::Path(PathBuf::from(path))
        } else if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Id(value.to_string())
        }
    }

    /// A remote file identifier.
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// A URL for the service to download.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// A local file to upload.
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// In-memory content to upload.
    pub fn memory(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Memory {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Returns `true` if the content must be uploaded as a multipart part.
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Path(_) | Self::Memory { .. })
    }

    /// Returns `true` for an empty identifier or URL.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Id(s) | Self::Url(s) => s.is_empty(),
            Self::Path(p) => p.as_os_str().is_empty(),
            Self::Memory { .. } => false,
        }
    }

    /// The plain value sent for remote references.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::Id(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }

    /// The file name reported for an upload: the base name of a local path,
    /// or the explicit name of in-memory content.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(p) => p.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::Memory { file_name, .. } => Some(file_name.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Memory { file_name, data } => f
                .debug_struct("Memory")
                .field("file_name", file_name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

impl From<&str> for InputFile {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for InputFile {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PathBuf> for InputFile {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Remote references serialize as their string; uploads serialize as an
/// `attach://<name>` reference so that JSON-embedded media can point at a
/// supplementary part.
impl Serialize for InputFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Id(s) | Self::Url(s) => serializer.serialize_str(s),
            other => {
                let name = other.file_name().unwrap_or_default();
                serializer.serialize_str(&format!("{ATTACH_PREFIX}{name}"))
            }
        }
    }
}

/// Strings decode through [`InputFile::parse`].
impl<'de> Deserialize<'de> for InputFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_references() {
        assert_eq!(InputFile::parse("BQACAgIAAx"), InputFile::Id("BQACAgIAAx".into()));
        assert_eq!(
            InputFile::parse("http://example.com/a.jpg"),
            InputFile::Url("http://example.com/a.jpg".into())
        );
        assert_eq!(
            InputFile::parse("file:///var/data/report.pdf"),
            InputFile::Path(PathBuf::from("/var/data/report.pdf"))
        );
    }

    #[test]
    fn upload_file_name_uses_base_name() {
        let file = InputFile::path("/var/data/report.pdf");
        assert!(file.is_upload());
        assert_eq!(file.file_name().as_deref(), Some("report.pdf"));

        let mem = InputFile::memory("notes.txt", &b"hi"[..]);
        assert_eq!(mem.file_name().as_deref(), Some("notes.txt"));
        assert!(InputFile::id("abc").file_name().is_none());
    }

    #[test]
    fn serializes_references_as_strings() {
        let json = serde_json::to_string(&InputFile::url("https://x.org/a.png")).unwrap();
        assert_eq!(json, r#""https://x.org/a.png""#);

        let json = serde_json::to_string(&InputFile::memory("a.png", vec![1u8, 2])).unwrap();
        assert_eq!(json, r#""attach://a.png""#);
    }
}
