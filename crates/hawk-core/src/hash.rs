//! Content hashing for registry payloads.
//!
//! A file hashes to the SHA-256 of its bytes. A directory hashes to the
//! SHA-256 over its sorted `(relative-path, file-hash)` pairs, so renames
//! and content changes both show up while iteration order does not.

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Hex SHA-256 of arbitrary bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex(&hasher.finalize())
}

/// Hex SHA-256 of a UTF-8 string.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Content hash of a file or directory payload.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.is_dir() {
        hash_dir(path)
    } else {
        hash_file(path)
    }
}

/// Truncate a full hex hash to the 8-char display form.
pub fn short_hash(full: &str) -> &str {
    &full[..full.len().min(8)]
}

fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

fn hash_dir(root: &Path) -> io::Result<String> {
    let mut entries: Vec<(String, String)> = Vec::new();
    collect_files(root, root, &mut entries)?;
    entries.sort();

    let mut hasher = Sha256::new();
    for (rel, file_hash) in &entries {
        hasher.update(rel.as_bytes());
        hasher.update(b"\0");
        hasher.update(file_hash.as_bytes());
        hasher.update(b"\n");
    }
    Ok(hex(&hasher.finalize()))
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| io::Error::other(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            out.push((rel, hash_file(&path)?));
        }
    }
    Ok(())
}

fn hex(digest: &[u8]) -> String {
    let mut s = String::with_capacity(digest.len() * 2);
    for b in digest {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_hash_is_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let h1 = content_hash(&path).unwrap();
        let h2 = content_hash(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_file_hash_changes_with_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();
        let before = content_hash(&path).unwrap();
        std::fs::write(&path, "goodbye").unwrap();
        let after = content_hash(&path).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_dir_hash_ignores_creation_order() {
        let make = |names: &[&str]| {
            let dir = tempdir().unwrap();
            for name in names {
                std::fs::write(dir.path().join(name), format!("content-{name}")).unwrap();
            }
            (content_hash(dir.path()).unwrap(), dir)
        };
        let (h1, _d1) = make(&["a.txt", "b.txt", "c.txt"]);
        let (h2, _d2) = make(&["c.txt", "a.txt", "b.txt"]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_dir_hash_sees_renames() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "same").unwrap();
        let before = content_hash(dir.path()).unwrap();
        std::fs::rename(dir.path().join("a.txt"), dir.path().join("b.txt")).unwrap();
        let after = content_hash(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_dir_hash_recurses() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("sub").join("deeper");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("x.txt"), "x").unwrap();
        let before = content_hash(dir.path()).unwrap();
        std::fs::write(nested.join("x.txt"), "y").unwrap();
        let after = content_hash(dir.path()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_short_hash() {
        let full = hash_str("anything");
        assert_eq!(short_hash(&full).len(), 8);
        assert!(full.starts_with(short_hash(&full)));
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn test_missing_path_is_error() {
        assert!(content_hash(Path::new("/nonexistent/hawk-test")).is_err());
    }
}
