//! One-way hash functions used to derive leaves and combine nodes.
//!
//! The tree never hardcodes a digest algorithm: every [`crate::Tree`] and every
//! proof audit is handed a [`Hasher`]. [`Keccak256`] is what Ethereum-style
//! whitelists expect; [`Sha256`] and [`from_fn`] cover everything else.

use std::fmt;

use sha2::Digest as _;
use tiny_keccak::Hasher as _;

/// A one-way hash function mapping bytes to a digest.
///
/// A well-behaved hasher returns digests of the same length for every input.
/// The tree checks this during construction and fails with
/// [`crate::Error::InvalidDigestLength`] otherwise.
pub trait Hasher {
    /// Hashes the concatenation of all `parts`.
    ///
    /// Implementations should stream the parts into the hash state instead of
    /// allocating their concatenation.
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8>;

    /// Hashes `bytes`.
    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        self.digest_parts(&[bytes])
    }
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        (**self).digest_parts(parts)
    }
}

impl<H: Hasher + ?Sized> Hasher for Box<H> {
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        (**self).digest_parts(parts)
    }
}

/// The original (pre-NIST) Keccak-256 as used by Ethereum.
///
/// # Examples
/// ```
/// use whitelist_merkle::{
///     Hasher as _,
///     Keccak256,
/// };
/// let digest = Keccak256.digest(b"");
/// assert_eq!(
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
///     hex::encode(digest),
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keccak256;

impl Hasher for Keccak256 {
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = tiny_keccak::Keccak::v256();
        for part in parts {
            hasher.update(part);
        }
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        output.to_vec()
    }
}

/// SHA-256.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256;

impl Hasher for Sha256 {
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().to_vec()
    }
}

/// A [`Hasher`] wrapping a plain function or closure.
///
/// Construct it with [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Turns a function hashing a byte slice into a [`Hasher`].
///
/// The parts handed to [`Hasher::digest_parts`] are concatenated before
/// calling `f`.
///
/// # Examples
/// ```
/// use whitelist_merkle::{
///     hasher::from_fn,
///     Options,
///     Tree,
/// };
/// // A toy "hash" that only keeps the first byte of its input.
/// let first_byte = from_fn(|bytes: &[u8]| bytes.first().copied().into_iter().collect());
/// let tree = Tree::from_items([[7u8], [3u8]], first_byte, Options::default()).unwrap();
/// assert_eq!(&[7u8][..], tree.root());
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    FromFn(f)
}

impl<F> Hasher for FromFn<F>
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        (self.0)(&parts.concat())
    }

    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        (self.0)(bytes)
    }
}
