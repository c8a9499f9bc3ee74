//! Streaming content hashing plus the identifier derivations built on the
//! strong hash.
//!
//! Files are read once in 1 MiB blocks; each block feeds both the fast
//! hash (xxh3-64) and the strong hash (BLAKE3).

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

/// Stored in place of both hashes by quick mode: "not yet computed".
pub const QUICK_SENTINEL: &str = "0";

const BLOCK_SIZE: usize = 1 << 20;

/// Both content hashes of one file plus the bytes consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHashes {
    pub fast: String,
    pub strong: String,
    pub bytes: u64,
}

/// Hash a file by streaming it.
pub fn hash_file(path: &Path) -> io::Result<FileHashes> {
    let file = File::open(path)?;
    hash_reader(file)
}

/// Hash everything readable from `reader`.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<FileHashes> {
    let mut fast = Xxh3::new();
    let mut strong = blake3::Hasher::new();
    let mut buf = vec![0u8; BLOCK_SIZE];
    let mut bytes = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        fast.update(&buf[..n]);
        strong.update(&buf[..n]);
        bytes += n as u64;
    }

    Ok(FileHashes {
        fast: format!("{:016x}", fast.digest()),
        strong: strong.finalize().to_hex().to_string(),
        bytes,
    })
}

/// Strong hash of an in-memory byte string.
pub fn strong_hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Transient id: strong hash of `hostname || absolute_path`.
/// Depends only on where the file is, never on what it contains.
pub fn transient_id(hostname: &str, absolute_path: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(hostname.as_bytes());
    hasher.update(absolute_path.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Fingerprint of the template source a relation was generated from.
pub fn template_fingerprint(source: &str) -> String {
    strong_hash_bytes(source.as_bytes())
}

/// Random 256-bit identifier, hex encoded.
pub fn random_id() -> String {
    let mut hasher = blake3::Hasher::new();
    for _ in 0..10 {
        hasher.update(uuid::Uuid::new_v4().as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_hash() {
        let a = hash_reader(&b"hello world"[..]).unwrap();
        let b = hash_reader(&b"hello world"[..]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bytes, 11);
        assert_eq!(a.strong.len(), 64);
        assert_eq!(a.fast.len(), 16);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data = vec![7u8; BLOCK_SIZE * 2 + 13];
        let streamed = hash_reader(&data[..]).unwrap();
        assert_eq!(streamed.strong, strong_hash_bytes(&data));
        assert_eq!(streamed.fast, format!("{:016x}", xxhash_rust::xxh3::xxh3_64(&data)));
        assert_eq!(streamed.bytes, data.len() as u64);
    }

    #[test]
    fn different_content_different_hash() {
        let a = hash_reader(&b"hello"[..]).unwrap();
        let b = hash_reader(&b"world"[..]).unwrap();
        assert_ne!(a.strong, b.strong);
        assert_ne!(a.fast, b.fast);
    }

    #[test]
    fn transient_id_ignores_nothing_but_content() {
        let a = transient_id("node1", "/data/a.txt");
        assert_eq!(a, transient_id("node1", "/data/a.txt"));
        assert_ne!(a, transient_id("node2", "/data/a.txt"));
        assert_ne!(a, transient_id("node1", "/data/b.txt"));
    }

    #[test]
    fn random_ids_differ() {
        let a = random_id();
        assert_eq!(a.len(), 64);
        assert_ne!(a, random_id());
    }

    #[test]
    fn read_failure_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }
        assert!(hash_reader(Broken).is_err());
    }
}
