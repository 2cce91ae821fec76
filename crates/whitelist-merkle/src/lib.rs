//! A binary Merkle tree over whitelists, with inclusion proofs.
//!
//! The tree hashes every item of a whitelist into a leaf and then repeatedly
//! combines adjacent pairs of digests until a single digest, the root, is
//! left. The hash function is injected through the [`Hasher`] trait; the
//! crate ships [`Keccak256`] and [`Sha256`].
//!
//! # Usage and examples
//! ```
//! use whitelist_merkle::{
//!     Keccak256,
//!     Options,
//!     Tree,
//! };
//! let whitelist = ["alice", "bob", "carol"];
//! let tree = Tree::from_items(whitelist, Keccak256, Options::sorted())?;
//!
//! let proof = tree.prove_item(b"carol")?;
//! assert!(
//!     proof
//!         .audit(Keccak256)
//!         .sort_pairs(true)
//!         .with_root(tree.root())
//!         .with_item(b"carol")
//!         .perform()
//! );
//! # Ok::<(), whitelist_merkle::Error>(())
//! ```
//!
//! # Pairing rules
//! Two sibling digests `a` (left) and `b` (right) are combined into their
//! parent as
//! + `H(a || b)` by default, or
//! + `H(min(a, b) || max(a, b))` if [`Options::sort_pairs`] is set.
//!
//! Sorting pairs makes the position of a sibling irrelevant during
//! verification. If [`Options::sort_leaves`] is also set, the leaf layer is
//! sorted before the tree is built, so that the root only depends on the
//! multiset of leaves and not on the order of the whitelist.
//!
//! # Odd layers
//! If a layer has an odd number of nodes, its last node is carried up into
//! the next layer unchanged. It is never duplicated or paired with itself.
//! For five leaves the tree looks like this:
//! ```text
//!              root
//!            /      \
//!       h0123        4
//!      /     \       |
//!    h01     h23     4
//!   /  \    /  \     |
//!  0    1  2    3    4
//! ```
//! A proof for leaf `4` therefore only holds the single digest `h0123`.
//!
//! # Representation
//! Every layer is stored as one flat byte buffer of concatenated digests, from
//! the leaf layer up to the root layer. All digests in a tree have the length
//! of the first leaf digest.

pub mod audit;
mod error;
pub mod hasher;

pub use audit::{
    verify_proof,
    Audit,
    Position,
    Proof,
    Sibling,
};
pub use error::Error;
pub use hasher::{
    Hasher,
    Keccak256,
    Sha256,
};

/// Policy used when building a tree.
///
/// The default neither sorts leaves nor pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Options {
    /// Sort the leaf layer by digest before building the tree.
    pub sort_leaves: bool,
    /// Order each pair of siblings by digest before combining them.
    pub sort_pairs: bool,
}

impl Options {
    /// Sorts both leaves and pairs, making the root independent of the input order.
    #[must_use]
    pub const fn sorted() -> Self {
        Self {
            sort_leaves: true,
            sort_pairs: true,
        }
    }
}

/// Calculates `H(left || right)`, or `H(min(left, right) || max(left, right))`
/// if `sort_pairs` is set.
///
/// # Examples
/// ```
/// use whitelist_merkle::{
///     combine,
///     Sha256,
/// };
/// let a = [1u8; 32];
/// let b = [2u8; 32];
/// assert_ne!(combine(&Sha256, &b, &a, false), combine(&Sha256, &a, &b, false));
/// assert_eq!(combine(&Sha256, &b, &a, true), combine(&Sha256, &a, &b, false));
/// ```
#[must_use]
pub fn combine<H: Hasher + ?Sized>(
    hasher: &H,
    left: &[u8],
    right: &[u8],
    sort_pairs: bool,
) -> Vec<u8> {
    if sort_pairs && right < left {
        hasher.digest_parts(&[right, left])
    } else {
        hasher.digest_parts(&[left, right])
    }
}

/// An immutable Merkle tree over a non-empty list of leaves.
#[derive(Clone, Debug)]
pub struct Tree<H> {
    hasher: H,
    options: Options,
    digest_len: usize,
    layers: Vec<Vec<u8>>,
}

impl<H: Hasher> Tree<H> {
    /// Constructs a Merkle tree by hashing every item into a leaf.
    ///
    /// # Errors
    /// Returns [`Error::EmptyTree`] if `items` is empty, and
    /// [`Error::EmptyDigest`] or [`Error::InvalidDigestLength`] if `hasher`
    /// returns an empty digest or digests of differing lengths.
    ///
    /// # Examples
    /// A tree over a single item has the hash of that item as its root:
    /// ```
    /// use whitelist_merkle::{
    ///     Hasher as _,
    ///     Keccak256,
    ///     Options,
    ///     Tree,
    /// };
    /// let tree = Tree::from_items([b"hello"], Keccak256, Options::default()).unwrap();
    /// assert_eq!(Keccak256.digest(b"hello"), tree.root());
    /// ```
    pub fn from_items<I, B>(items: I, hasher: H, options: Options) -> Result<Self, Error>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let leaves: Vec<Vec<u8>> = items
            .into_iter()
            .map(|item| hasher.digest(item.as_ref()))
            .collect();
        Self::from_leaves(leaves, hasher, options)
    }

    /// Constructs a Merkle tree from leaves that are already digests.
    ///
    /// `hasher` is only used to combine nodes.
    ///
    /// # Errors
    /// Returns [`Error::EmptyTree`] if `leaves` is empty, [`Error::EmptyDigest`]
    /// if the first leaf is empty, and [`Error::InvalidDigestLength`] if any
    /// leaf or combined node differs in length from the first leaf.
    ///
    /// # Examples
    /// ```
    /// use whitelist_merkle::{
    ///     Error,
    ///     Options,
    ///     Sha256,
    ///     Tree,
    /// };
    /// let err = Tree::from_leaves([&[1u8; 32][..], &[2u8; 20][..]], Sha256, Options::default())
    ///     .unwrap_err();
    /// assert_eq!(
    ///     Error::InvalidDigestLength {
    ///         expected: 32,
    ///         actual: 20
    ///     },
    ///     err,
    /// );
    /// ```
    pub fn from_leaves<I, B>(leaves: I, hasher: H, options: Options) -> Result<Self, Error>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut leaves: Vec<B> = leaves.into_iter().collect();
        let digest_len = match leaves.first() {
            None => return Err(Error::EmptyTree),
            Some(leaf) => leaf.as_ref().len(),
        };
        if digest_len == 0 {
            return Err(Error::EmptyDigest);
        }
        if let Some(actual) = leaves
            .iter()
            .map(|leaf| leaf.as_ref().len())
            .find(|len| *len != digest_len)
        {
            return Err(Error::InvalidDigestLength {
                expected: digest_len,
                actual,
            });
        }
        if options.sort_leaves {
            leaves.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
        }
        let mut leaf_layer = Vec::with_capacity(leaves.len() * digest_len);
        for leaf in &leaves {
            leaf_layer.extend_from_slice(leaf.as_ref());
        }
        let layers = build_layers(&hasher, digest_len, options.sort_pairs, leaf_layer)?;
        Ok(Self {
            hasher,
            options,
            digest_len,
            layers,
        })
    }

    /// Returns the root hash of the Merkle tree.
    #[must_use]
    pub fn root(&self) -> &[u8] {
        self.layers.last().map_or(&[][..], Vec::as_slice)
    }

    /// Returns the root hash as a `0x`-prefixed hex string.
    #[must_use]
    pub fn root_hex(&self) -> String {
        to_prefixed_hex(self.root())
    }

    /// Returns the hasher the tree was built with.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the policy the tree was built with.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Returns the length in bytes of every digest in the tree.
    #[must_use]
    pub fn digest_len(&self) -> usize {
        self.digest_len
    }

    /// Returns the number of leaves.
    ///
    /// A tree always holds at least one leaf.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.len() / self.digest_len)
    }

    /// Returns the number of layers above the leaf layer.
    ///
    /// This is also the maximum length of a proof.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Returns the i-th leaf of the tree, after sorting if the tree sorts its leaves.
    ///
    /// Returns `None` if `i` falls outside the tree.
    #[must_use]
    pub fn leaf(&self, i: usize) -> Option<&[u8]> {
        self.node(0, i)
    }

    /// Iterates over the leaves in the order they are stored in the tree.
    pub fn leaves(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.layers
            .first()
            .map_or(&[][..], Vec::as_slice)
            .chunks_exact(self.digest_len)
    }

    /// Returns the index of the first leaf equal to `leaf`.
    #[must_use]
    pub fn position(&self, leaf: &[u8]) -> Option<usize> {
        self.leaves().position(|candidate| candidate == leaf)
    }

    /// Constructs the inclusion proof for the i-th leaf of the tree.
    ///
    /// Returns `None` if `leaf_index` is outside the tree. The proof for the
    /// only leaf of a single-leaf tree is empty.
    ///
    /// # Examples
    /// ```
    /// use whitelist_merkle::{
    ///     Options,
    ///     Sha256,
    ///     Tree,
    /// };
    /// let tree = Tree::from_items(["a", "b", "c", "d", "e"], Sha256, Options::default()).unwrap();
    /// assert_eq!(3, tree.construct_proof(0).unwrap().len());
    /// // The fifth leaf is carried up twice and is only paired at the root.
    /// assert_eq!(1, tree.construct_proof(4).unwrap().len());
    /// assert!(tree.construct_proof(5).is_none());
    /// ```
    #[must_use]
    pub fn construct_proof(&self, leaf_index: usize) -> Option<Proof> {
        if leaf_index >= self.leaf_count() {
            return None;
        }
        let mut audit_path = Vec::with_capacity(self.depth());
        let mut index = leaf_index;
        for level in 0..self.depth() {
            let (sibling_index, position) = if index % 2 == 0 {
                (index + 1, Position::Right)
            } else {
                (index - 1, Position::Left)
            };
            // a missing sibling means the node is carried up
            if let Some(digest) = self.node(level, sibling_index) {
                audit_path.push(Sibling::new(position, digest.to_vec()));
            }
            index /= 2;
        }
        Some(Proof::new(audit_path))
    }

    /// Constructs the inclusion proof for `leaf`, a digest in the leaf layer.
    ///
    /// If the leaf occurs more than once, the proof is for its first position.
    ///
    /// # Errors
    /// Returns [`Error::LeafNotFound`] if `leaf` is not in the tree.
    pub fn prove(&self, leaf: &[u8]) -> Result<Proof, Error> {
        self.position(leaf)
            .and_then(|index| self.construct_proof(index))
            .ok_or_else(|| Error::leaf_not_found(leaf))
    }

    /// Hashes `item` and constructs the inclusion proof for the resulting leaf.
    ///
    /// # Errors
    /// Returns [`Error::LeafNotFound`] if `item` is not in the tree.
    pub fn prove_item(&self, item: &[u8]) -> Result<Proof, Error> {
        self.prove(&self.hasher.digest(item))
    }

    /// Verifies `proof` for `leaf` against the root of this tree, using the
    /// tree's hasher and pairing policy.
    #[must_use]
    pub fn verify(&self, leaf: &[u8], proof: &Proof) -> bool {
        verify_proof(
            leaf,
            proof,
            self.root(),
            &self.hasher,
            self.options.sort_pairs,
        )
    }

    /// Returns the node at `index` in layer `level`, where level 0 are the leaves.
    fn node(&self, level: usize, index: usize) -> Option<&[u8]> {
        let layer = self.layers.get(level)?;
        let start = index.checked_mul(self.digest_len)?;
        layer.get(start..start.checked_add(self.digest_len)?)
    }
}

/// Builds all layers on top of `leaf_layer`, returning them leaf layer first.
fn build_layers<H: Hasher>(
    hasher: &H,
    digest_len: usize,
    sort_pairs: bool,
    leaf_layer: Vec<u8>,
) -> Result<Vec<Vec<u8>>, Error> {
    let mut layers = vec![leaf_layer];
    while let Some(current) = layers.last().filter(|layer| layer.len() > digest_len) {
        let width = current.len() / digest_len;
        let mut next = Vec::with_capacity(width.div_ceil(2) * digest_len);
        for pair in current.chunks(2 * digest_len) {
            if pair.len() == digest_len {
                next.extend_from_slice(pair);
                continue;
            }
            let (left, right) = pair.split_at(digest_len);
            let parent = combine(hasher, left, right, sort_pairs);
            if parent.len() != digest_len {
                return Err(Error::InvalidDigestLength {
                    expected: digest_len,
                    actual: parent.len(),
                });
            }
            next.extend_from_slice(&parent);
        }
        layers.push(next);
    }
    Ok(layers)
}

pub(crate) fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
