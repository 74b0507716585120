//! Fingerprints the storefront stylesheet.
//!
//! `static/css/main.css` is copied to `static/css/derived/main.<hash>.css` and
//! the hash is exposed to the crate as `CSS_HASH` for the `css_hash` filter.
//! Older fingerprinted copies are removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex digits of the SHA-256 digest kept in the file name.
const HASH_LEN: usize = 8;

struct Stylesheet {
    source: PathBuf,
    derived_dir: PathBuf,
}

impl Stylesheet {
    fn new(manifest_dir: &Path) -> Self {
        let css_dir = manifest_dir.join("static").join("css");
        Self {
            source: css_dir.join("main.css"),
            derived_dir: css_dir.join("derived"),
        }
    }

    fn fingerprint(content: &[u8]) -> String {
        let digest = format!("{:x}", Sha256::digest(content));
        digest.chars().take(HASH_LEN).collect()
    }

    /// Write the fingerprinted copy and return its hash.
    fn publish(&self) -> io::Result<String> {
        let content = fs::read(&self.source)?;
        let hash = Self::fingerprint(&content);
        let file_name = format!("main.{hash}.css");

        fs::create_dir_all(&self.derived_dir)?;
        for entry in fs::read_dir(&self.derived_dir)? {
            let path = entry?.path();
            let stale = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with("main.") && name.ends_with(".css") && name != file_name
                });
            if stale {
                fs::remove_file(&path)?;
            }
        }

        fs::write(self.derived_dir.join(&file_name), &content)?;
        Ok(hash)
    }
}

fn main() {
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let stylesheet = Stylesheet::new(&manifest_dir);

    println!("cargo:rerun-if-changed={}", stylesheet.source.display());

    let hash = stylesheet.publish().unwrap_or_else(|e| {
        println!("cargo:warning=Stylesheet not fingerprinted: {e}");
        String::new()
    });
    println!("cargo:rustc-env=CSS_HASH={hash}");
}
