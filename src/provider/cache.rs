//! On-disk cache of response bodies, keyed by request URL

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{:x}.json", digest))
    }

    /// Cached body for a URL, if present and readable
    pub fn get(&self, url: &str) -> Option<String> {
        fs::read_to_string(self.path_for(url)).ok()
    }

    pub fn put(&self, url: &str, body: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(url), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("responses"));

        let url = "https://api.jolpi.ca/ergast/f1/2024.json?limit=100";
        assert_eq!(cache.get(url), None);

        cache.put(url, r#"{"MRData":{}}"#).unwrap();
        assert_eq!(cache.get(url).as_deref(), Some(r#"{"MRData":{}}"#));
    }

    #[test]
    fn test_distinct_urls_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path());

        cache.put("https://example.test/a", "a").unwrap();
        cache.put("https://example.test/b", "b").unwrap();

        assert_eq!(cache.get("https://example.test/a").as_deref(), Some("a"));
        assert_eq!(cache.get("https://example.test/b").as_deref(), Some("b"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_file_name_is_sha256_hex() {
        let cache = ResponseCache::new("/tmp/f1");
        let path = cache.path_for("https://example.test/a");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 64 + ".json".len());
        assert!(name.trim_end_matches(".json").chars().all(|c| c.is_ascii_hexdigit()));
    }
}
