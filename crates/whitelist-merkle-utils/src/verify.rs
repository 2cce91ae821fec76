use std::str::FromStr;

use color_eyre::eyre::{
    bail,
    eyre,
    Report,
    Result,
    WrapErr as _,
};
use tracing::{
    debug,
    instrument,
};
use whitelist_merkle::{
    verify_proof,
    Hasher as _,
    Position,
    Proof,
    Sibling,
};

use crate::{
    config::{
        Config,
        HashAlgorithm,
    },
    whitelist::encode_item,
};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// The hex encoded root the proof is checked against
    #[arg(long)]
    root: String,

    /// The hex encoded leaf digest to verify
    #[arg(long, required_unless_present = "item", conflicts_with = "item")]
    leaf: Option<String>,

    /// The whitelisted item to verify; it is hashed to obtain the leaf
    #[arg(long)]
    item: Option<String>,

    /// A hex encoded sibling digest, optionally prefixed by `left:` or
    /// `right:` (the default). Repeat for every sibling, leaf side first.
    #[arg(long = "proof", value_name = "SIBLING")]
    proof: Vec<ProofSibling>,

    /// Hash function used for leaves and nodes [default: keccak256]
    #[arg(long, value_enum)]
    hasher: Option<HashAlgorithm>,

    /// Order sibling pairs by digest before hashing them [default: true]
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    sort_pairs: Option<bool>,
}

/// A sibling digest as given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofSibling(Sibling);

impl FromStr for ProofSibling {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self> {
        let (position, digest) = match s.split_once(':') {
            Some(("left", digest)) => (Position::Left, digest),
            Some(("right", digest)) => (Position::Right, digest),
            Some((other, _)) => {
                bail!("invalid sibling position `{other}`; expected `left` or `right`")
            }
            None => (Position::Right, s),
        };
        Ok(Self(Sibling::new(position, decode_digest(digest)?)))
    }
}

/// Decodes a hex digest with an optional `0x` prefix.
fn decode_digest(s: &str) -> Result<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let digest = hex::decode(digits).wrap_err_with(|| format!("`{s}` is not a hex digest"))?;
    if digest.is_empty() {
        return Err(eyre!("digest must not be empty"));
    }
    Ok(digest)
}

/// Checks an inclusion proof against a root without access to the tree.
///
/// # Errors
///
/// Fails if an argument cannot be decoded or if the proof does not link the
/// leaf to the root.
#[instrument(skip_all)]
pub fn run(args: Args, config: &Config) -> Result<()> {
    let Args {
        root,
        leaf,
        item,
        proof,
        hasher,
        sort_pairs,
    } = args;
    let hasher = hasher.unwrap_or(config.hasher).hasher();
    let sort_pairs = sort_pairs.unwrap_or(config.sort_pairs);

    let root = decode_digest(&root).wrap_err("failed decoding root")?;
    let leaf = match (leaf, item) {
        (Some(leaf), _) => decode_digest(&leaf).wrap_err("failed decoding leaf")?,
        (None, Some(item)) => hasher.digest(&encode_item(&item)),
        (None, None) => bail!("either a leaf or an item is required"),
    };
    let proof: Proof = proof.into_iter().map(|ProofSibling(sibling)| sibling).collect();
    debug!(siblings = proof.len(), sort_pairs, "verifying proof");

    if !verify_proof(&leaf, &proof, &root, &hasher, sort_pairs) {
        bail!(
            "proof does not link leaf `0x{}` to root `0x{}`",
            hex::encode(&leaf),
            hex::encode(&root)
        );
    }
    println!("valid");
    Ok(())
}
