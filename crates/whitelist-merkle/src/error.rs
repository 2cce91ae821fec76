/// Errors returned when constructing or querying a [`crate::Tree`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot construct a merkle tree without any leaves")]
    EmptyTree,
    #[error("leaf `0x{leaf}` is not in the merkle tree")]
    LeafNotFound { leaf: String },
    #[error("expected a digest of {expected} bytes, but got {actual} bytes")]
    InvalidDigestLength { expected: usize, actual: usize },
    #[error("the hash function returned an empty digest")]
    EmptyDigest,
}

impl Error {
    pub(crate) fn leaf_not_found(leaf: &[u8]) -> Self {
        Self::LeafNotFound {
            leaf: hex::encode(leaf),
        }
    }
}
