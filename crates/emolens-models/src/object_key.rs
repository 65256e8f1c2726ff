//! Object key construction for uploaded videos.

use std::fmt;
use std::path::Path;

/// Extensions accepted by the upload form.
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi"];

/// Whether a file name carries one of [`ALLOWED_VIDEO_EXTENSIONS`].
pub fn is_allowed_video(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ALLOWED_VIDEO_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Replace every whitespace character with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Normalized storage key of the form `{folder}/{file_name}`.
///
/// Never starts or ends with `/` and never contains empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Build a key from a folder and a raw file name.
    ///
    /// Only the base name of `file_name` is kept, and it is sanitized.
    /// Returns `None` when no usable file name remains.
    pub fn new(folder: &str, file_name: &str) -> Option<Self> {
        let base = base_name(file_name)?;
        let file = sanitize_file_name(base);

        let mut segments: Vec<&str> = folder
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();
        segments.push(&file);

        Some(Self(segments.join("/")))
    }

    /// Build a key for a local file path.
    pub fn for_path(folder: &str, path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::new(folder, name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name component of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Last path component of a client-supplied name, accepting either separator.
fn base_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?;
    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}
