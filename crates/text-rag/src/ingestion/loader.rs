//! Plain-text document loading

use crate::error::{Error, Result};
use crate::types::Document;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Loads UTF-8 text files into documents
pub struct TextLoader;

impl TextLoader {
    /// Load the file at `path` as a single document.
    ///
    /// Fails if the file does not exist or is not valid UTF-8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|e| Error::encoding(path.display().to_string(), e.to_string()))?;

        let content_hash = hash_text(&content);
        let document = Document::new(path.display().to_string(), content, content_hash);

        tracing::info!(
            source = %document.source,
            chars = document.char_count(),
            "Loaded document"
        );

        Ok(vec![document])
    }

    /// Fingerprint a set of documents by hashing their content hashes.
    ///
    /// Stable across loads of the same content, regardless of load time
    /// or the random document IDs.
    pub fn fingerprint(documents: &[Document]) -> String {
        let mut hasher = Sha256::new();
        for document in documents {
            hasher.update(document.content_hash.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_utf8_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "The quick brown fox.").unwrap();

        let documents = TextLoader::load(file.path()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].content, "The quick brown fox.");
        assert!(!documents[0].content_hash.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = TextLoader::load("definitely/not/here.txt");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x41]).unwrap();

        let result = TextLoader::load(file.path());
        assert!(matches!(result, Err(Error::Encoding { .. })));
    }

    #[test]
    fn test_fingerprint_depends_on_content_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Same content.").unwrap();

        let first = TextLoader::load(file.path()).unwrap();
        let second = TextLoader::load(file.path()).unwrap();
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(
            TextLoader::fingerprint(&first),
            TextLoader::fingerprint(&second)
        );
    }
}
