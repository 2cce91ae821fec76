//! Inclusion proofs and their verification.
//!
//! A [`Proof`] is verified through an [`Audit`], a builder that requires both
//! a leaf and a root before it can be performed:
//! ```
//! use whitelist_merkle::{
//!     Options,
//!     Sha256,
//!     Tree,
//! };
//! let tree = Tree::from_items(["a", "b", "c"], Sha256, Options::default()).unwrap();
//! let proof = tree.construct_proof(1).unwrap();
//! let audit = proof.audit(Sha256).with_leaf(tree.leaf(1).unwrap());
//! assert_eq!(tree.root(), audit.reconstruct_root());
//! assert!(audit.with_root(tree.root()).perform());
//! ```
//! Verifiers that do not hold the tree only need the leaf, the proof, the
//! root, and the hasher and pairing policy the tree was built with.

use std::slice;

use crate::{
    combine,
    to_prefixed_hex,
    Hasher,
};

/// Where a sibling sits relative to the node on the path to the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Position {
    Left,
    Right,
}

/// One step of an audit path: the digest of a sibling and its position.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sibling {
    position: Position,
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    digest: Vec<u8>,
}

impl Sibling {
    #[must_use]
    pub fn new(position: Position, digest: Vec<u8>) -> Self {
        Self {
            position,
            digest,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

/// The audit path from a leaf to the root of a tree, leaf side first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Proof {
    audit_path: Vec<Sibling>,
}

impl Proof {
    /// Creates a proof from an audit path, ordered from the leaf to the root.
    #[must_use]
    pub fn new(audit_path: Vec<Sibling>) -> Self {
        Self {
            audit_path,
        }
    }

    /// Starts an audit of this proof using `hasher` to combine nodes.
    ///
    /// Pairs are combined in the order given by each sibling's [`Position`]
    /// unless [`Audit::sort_pairs`] is set.
    pub fn audit<H: Hasher>(&self, hasher: H) -> Audit<'_, H> {
        Audit {
            proof: self,
            hasher,
            sort_pairs: false,
            leaf: NoLeaf,
            root: NoRoot,
        }
    }

    /// Returns the number of siblings in the audit path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.audit_path.len()
    }

    /// Returns `true` if the proof has no siblings, i.e. is for a single-leaf tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audit_path.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Sibling> {
        self.audit_path.iter()
    }

    #[must_use]
    pub fn siblings(&self) -> &[Sibling] {
        &self.audit_path
    }

    /// Returns the sibling digests as `0x`-prefixed hex strings, leaf side first.
    ///
    /// # Examples
    /// ```
    /// use whitelist_merkle::{
    ///     Options,
    ///     Sha256,
    ///     Tree,
    /// };
    /// let tree = Tree::from_items(["a", "b"], Sha256, Options::default()).unwrap();
    /// let proof = tree.prove_item(b"a").unwrap();
    /// assert_eq!(
    ///     vec!["0x3e23e8160039594a33894f6564e1b1348bbd7a0088d42c4acb73eeaed59c009d".to_string()],
    ///     proof.to_hex(),
    /// );
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> Vec<String> {
        self.audit_path
            .iter()
            .map(|sibling| to_prefixed_hex(sibling.digest()))
            .collect()
    }
}

impl FromIterator<Sibling> for Proof {
    fn from_iter<T: IntoIterator<Item = Sibling>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Proof {
    type IntoIter = slice::Iter<'a, Sibling>;
    type Item = &'a Sibling;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Marker for an audit that has not been given a leaf yet.
#[derive(Debug)]
pub struct NoLeaf;

/// The leaf digest an audit starts from.
#[derive(Debug)]
pub struct WithLeaf(Vec<u8>);

/// Marker for an audit that has not been given a root yet.
#[derive(Debug)]
pub struct NoRoot;

/// The root an audit compares against.
#[derive(Debug)]
pub struct WithRoot<'a>(&'a [u8]);

/// A builder to verify a [`Proof`].
///
/// Created by [`Proof::audit`]. An audit can only be performed once it has a
/// leaf (see [`Audit::with_leaf`] and [`Audit::with_item`]) and a root (see
/// [`Audit::with_root`]).
#[derive(Debug)]
pub struct Audit<'a, H, TLeaf = NoLeaf, TRoot = NoRoot> {
    proof: &'a Proof,
    hasher: H,
    sort_pairs: bool,
    leaf: TLeaf,
    root: TRoot,
}

impl<H, TLeaf, TRoot> Audit<'_, H, TLeaf, TRoot> {
    /// Sets whether sibling pairs are ordered by digest before combining.
    ///
    /// This must match the policy of the tree that produced the proof.
    #[must_use]
    pub fn sort_pairs(self, sort_pairs: bool) -> Self {
        Self {
            sort_pairs,
            ..self
        }
    }
}

impl<'a, H: Hasher, TRoot> Audit<'a, H, NoLeaf, TRoot> {
    /// Sets the leaf digest the audit starts from.
    pub fn with_leaf(self, leaf: &[u8]) -> Audit<'a, H, WithLeaf, TRoot> {
        let Self {
            proof,
            hasher,
            sort_pairs,
            root,
            ..
        } = self;
        Audit {
            proof,
            hasher,
            sort_pairs,
            leaf: WithLeaf(leaf.to_vec()),
            root,
        }
    }

    /// Hashes `item` with the audit's hasher and uses the digest as the leaf.
    pub fn with_item(self, item: &[u8]) -> Audit<'a, H, WithLeaf, TRoot> {
        let leaf = self.hasher.digest(item);
        let Self {
            proof,
            hasher,
            sort_pairs,
            root,
            ..
        } = self;
        Audit {
            proof,
            hasher,
            sort_pairs,
            leaf: WithLeaf(leaf),
            root,
        }
    }
}

impl<'a, H, TLeaf> Audit<'a, H, TLeaf, NoRoot> {
    /// Sets the root the reconstructed root is compared against.
    pub fn with_root<'b>(self, root: &'b [u8]) -> Audit<'a, H, TLeaf, WithRoot<'b>> {
        let Self {
            proof,
            hasher,
            sort_pairs,
            leaf,
            ..
        } = self;
        Audit {
            proof,
            hasher,
            sort_pairs,
            leaf,
            root: WithRoot(root),
        }
    }
}

impl<H: Hasher, TRoot> Audit<'_, H, WithLeaf, TRoot> {
    /// Folds the audit path into the leaf, returning the root it implies.
    #[must_use]
    pub fn reconstruct_root(&self) -> Vec<u8> {
        let Self {
            proof,
            hasher,
            sort_pairs,
            leaf: WithLeaf(leaf),
            ..
        } = self;
        proof.iter().fold(leaf.clone(), |node, sibling| {
            match sibling.position() {
                Position::Left => combine(hasher, sibling.digest(), &node, *sort_pairs),
                Position::Right => combine(hasher, &node, sibling.digest(), *sort_pairs),
            }
        })
    }
}

impl<H: Hasher> Audit<'_, H, WithLeaf, WithRoot<'_>> {
    /// Returns `true` if the proof reconstructs the expected root from the leaf.
    #[must_use]
    pub fn perform(&self) -> bool {
        self.reconstruct_root() == self.root.0
    }
}

/// Verifies that `proof` links `leaf` to `root`.
///
/// `hasher` and `sort_pairs` must match the tree that produced the proof.
///
/// # Examples
/// ```
/// use whitelist_merkle::{
///     verify_proof,
///     Keccak256,
///     Options,
///     Tree,
/// };
/// let tree = Tree::from_items(["a", "b", "c"], Keccak256, Options::sorted()).unwrap();
/// let leaf = tree.leaf(2).unwrap();
/// let proof = tree.prove(leaf).unwrap();
/// assert!(verify_proof(leaf, &proof, tree.root(), &Keccak256, true));
/// assert!(!verify_proof(leaf, &proof, &[0; 32], &Keccak256, true));
/// ```
#[must_use]
pub fn verify_proof<H: Hasher>(
    leaf: &[u8],
    proof: &Proof,
    root: &[u8],
    hasher: &H,
    sort_pairs: bool,
) -> bool {
    proof
        .audit(hasher)
        .sort_pairs(sort_pairs)
        .with_leaf(leaf)
        .with_root(root)
        .perform()
}
