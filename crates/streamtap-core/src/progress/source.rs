//! Upstream metadata used to infer the total length of a stream.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// What an upstream source can tell about its size.
///
/// Every method defaults to "unknown"; sources implement what they have.
pub trait SourceMetadata {
    /// Total body size announced by a protocol header (e.g. `Content-Length`).
    fn content_length(&self) -> Option<u64> {
        None
    }

    /// Content encoding applied to the body, if any. A compressed body makes
    /// `content_length` describe the wire size, not the decoded size.
    fn content_encoding(&self) -> Option<&str> {
        None
    }

    /// Backing file on disk, for a size lookup.
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<T: SourceMetadata + ?Sized> SourceMetadata for &T {
    fn content_length(&self) -> Option<u64> {
        (**self).content_length()
    }

    fn content_encoding(&self) -> Option<&str> {
        (**self).content_encoding()
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}

/// Resolve the length a source implies, or `None` if it cannot tell.
///
/// Header metadata wins over the file path. Lookup failures are logged and
/// reported as unknown.
pub fn infer_length<S: SourceMetadata + ?Sized>(source: &S) -> Option<u64> {
    if let Some(len) = source.content_length() {
        match source.content_encoding() {
            None => return Some(len),
            Some(enc) if enc.eq_ignore_ascii_case("identity") => return Some(len),
            Some(enc) => {
                tracing::debug!(encoding = enc, "ignoring content length of encoded body");
            }
        }
    }
    let path = source.path()?;
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            tracing::debug!(path = %path.display(), "size lookup failed: {}", e);
            None
        }
    }
}

/// A readable file that remembers its path, so its size can be looked up.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    path: PathBuf,
}

impl FileSource {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        Ok(Self { file, path })
    }

    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl SourceMetadata for FileSource {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Metadata-only source pointing at a path (the file is not opened).
#[derive(Debug, Clone)]
pub struct PathSource(pub PathBuf);

impl SourceMetadata for PathSource {
    fn path(&self) -> Option<&Path> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Headers {
        length: Option<u64>,
        encoding: Option<&'static str>,
    }

    impl SourceMetadata for Headers {
        fn content_length(&self) -> Option<u64> {
            self.length
        }

        fn content_encoding(&self) -> Option<&str> {
            self.encoding
        }
    }

    #[test]
    fn header_length_is_used_without_encoding() {
        let h = Headers {
            length: Some(2048),
            encoding: None,
        };
        assert_eq!(infer_length(&h), Some(2048));
        let identity = Headers {
            length: Some(10),
            encoding: Some("Identity"),
        };
        assert_eq!(infer_length(&identity), Some(10));
    }

    #[test]
    fn encoded_body_length_is_ignored() {
        let h = Headers {
            length: Some(2048),
            encoding: Some("gzip"),
        };
        assert_eq!(infer_length(&h), None);
    }

    #[test]
    fn file_source_reports_size_on_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&[7u8; 4096]).unwrap();
        f.flush().unwrap();
        let src = FileSource::open(f.path()).unwrap();
        assert_eq!(infer_length(&src), Some(4096));
    }

    #[test]
    fn missing_path_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let src = PathSource(dir.path().join("does-not-exist"));
        assert_eq!(infer_length(&src), None);
    }
}
