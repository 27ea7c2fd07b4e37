//! Binary storage of regression trees.
//!
//! A stored tree is a 16-byte header followed by the postcard encoding of
//! the tree.
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("RTRE")
//! 4       1     Version major
//! 5       1     Version minor
//! 6       2     Reserved
//! 8       4     Payload size (bytes)
//! 12      4     CRC32 checksum of payload
//! ```
use std::{fs, path::Path};

use crate::{Node, PersistError, RegressionTree};

pub const MAGIC: &[u8; 4] = b"RTRE";
pub const CURRENT_VERSION_MAJOR: u8 = 1;
pub const CURRENT_VERSION_MINOR: u8 = 0;
pub const HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub payload_size: u32,
    pub checksum: u32,
}

impl FormatHeader {
    /// Header of `payload` at the current version.
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size: payload.len() as u32,
            checksum: crc32fast::hash(payload),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, PersistError> {
        if &buf[0..4] != MAGIC {
            return Err(PersistError::NotATree);
        }
        let (version_major, version_minor) = (buf[4], buf[5]);
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(PersistError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }
        Ok(Self {
            version_major,
            version_minor,
            payload_size: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            checksum: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }
}

/// Encodes and decodes trees in the storage format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCodec;

impl TreeCodec {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, tree: &RegressionTree) -> Result<Vec<u8>, PersistError> {
        let payload = postcard::to_stdvec(tree)?;
        let header = FormatHeader::for_payload(&payload);
        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<RegressionTree, PersistError> {
        let header: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|head| head.try_into().ok())
            .ok_or(PersistError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            })?;
        let header = FormatHeader::from_bytes(header)?;
        let expected = HEADER_SIZE + header.payload_size as usize;
        if bytes.len() < expected {
            return Err(PersistError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        let payload = &bytes[HEADER_SIZE..expected];
        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(PersistError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        let tree = postcard::from_bytes(payload)?;
        check_shape(&tree)?;
        Ok(tree)
    }

    /// Writes `tree` to `path`, replacing any previous content.
    pub fn save(&self, tree: &RegressionTree, path: impl AsRef<Path>) -> Result<(), PersistError> {
        fs::write(path, self.serialize(tree)?)?;
        Ok(())
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<RegressionTree, PersistError> {
        self.deserialize(&fs::read(path)?)
    }
}

/// Every split has one subtree per branch, numbered in order, and every
/// range is non empty.
fn check_shape(tree: &RegressionTree) -> Result<(), PersistError> {
    let root = tree.root();
    let malformed = |reason| PersistError::MalformedTree {
        id: root.id(),
        reason,
    };
    if root.begin() > root.end() {
        return Err(malformed("empty example range"));
    }
    match root {
        Node::Leaf(_) if !tree.children().is_empty() => Err(malformed("leaf with subtrees")),
        Node::Leaf(_) => Ok(()),
        Node::Split(split) => {
            if split.branches().is_empty() {
                return Err(malformed("split without branches"));
            }
            if split.branches().len() != tree.children().len() {
                return Err(malformed("branch and subtree counts differ"));
            }
            for (position, branch) in split.branches().iter().enumerate() {
                if branch.child_number() != position {
                    return Err(malformed("branches out of order"));
                }
                if branch.begin() > branch.end() {
                    return Err(malformed("empty branch range"));
                }
            }
            tree.children().iter().try_for_each(check_shape)
        }
    }
}

impl RegressionTree {
    /// Stores the tree at `path` with [`TreeCodec`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        TreeCodec::new().save(self, path)
    }

    /// Reads a tree stored with [`RegressionTree::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        TreeCodec::new().load(path)
    }
}
