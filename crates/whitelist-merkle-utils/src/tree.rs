use std::path::PathBuf;

use color_eyre::eyre::{
    eyre,
    Result,
    WrapErr as _,
};
use serde::Serialize;
use tracing::{
    debug,
    info,
    instrument,
};
use whitelist_merkle::{
    Hasher,
    Position,
    Sibling,
    Tree,
};

use crate::{
    config::{
        Config,
        Overrides,
    },
    whitelist::{
        encode_item,
        Whitelist,
    },
};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to a JSON file holding an array of whitelisted items
    #[arg(long, short, value_name = "PATH")]
    whitelist: PathBuf,

    /// Position in the whitelist of the item to construct a proof for
    #[arg(long, conflicts_with = "item")]
    index: Option<usize>,

    /// Whitelisted item to construct a proof for
    #[arg(long)]
    item: Option<String>,

    #[command(flatten)]
    overrides: Overrides,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// The root of a whitelist's Merkle tree and, if requested, an inclusion proof.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub root: String,
    #[serde(flatten)]
    pub inclusion: Option<Inclusion>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Inclusion {
    /// The item as written in the whitelist, before hashing.
    pub item: String,
    pub leaf: String,
    pub proof: Vec<String>,
    pub positions: Vec<Position>,
}

impl Report {
    /// Computes the report for `item`, or just the root if `item` is `None`.
    ///
    /// # Errors
    /// Fails if `item` is not in the tree.
    pub fn new<H: Hasher>(tree: &Tree<H>, item: Option<&str>) -> Result<Self> {
        let inclusion = item
            .map(|item| {
                let bytes = encode_item(item);
                let leaf = tree.hasher().digest(&bytes);
                let proof = tree
                    .prove(&leaf)
                    .wrap_err_with(|| format!("failed constructing proof for item `{item}`"))?;
                debug!(item, siblings = proof.len(), "constructed inclusion proof");
                Ok::<_, color_eyre::eyre::Report>(Inclusion {
                    item: item.to_string(),
                    leaf: format!("0x{}", hex::encode(&leaf)),
                    proof: proof.to_hex(),
                    positions: proof.iter().map(Sibling::position).collect(),
                })
            })
            .transpose()?;
        Ok(Self {
            root: tree.root_hex(),
            inclusion,
        })
    }

    /// Renders the report as lines of `key: value`.
    ///
    /// Proofs of trees that do not sort pairs carry each sibling's position
    /// as a `left:` or `right:` prefix, as accepted by `verify`.
    fn to_text(&self, sort_pairs: bool) -> Result<String> {
        let Some(inclusion) = &self.inclusion else {
            return Ok(format!("root: {}\n", self.root));
        };
        let siblings: Vec<String> = if sort_pairs {
            inclusion.proof.clone()
        } else {
            inclusion
                .proof
                .iter()
                .zip(&inclusion.positions)
                .map(|(digest, position)| match position {
                    Position::Left => format!("left:{digest}"),
                    Position::Right => format!("right:{digest}"),
                })
                .collect()
        };
        let proof = serde_json::to_string(&siblings).wrap_err("failed serializing proof")?;
        Ok(format!(
            "root: {}\nleaf before hash: {}\nleaf: {}\nproof: {proof}\n",
            self.root, inclusion.item, inclusion.leaf
        ))
    }

    fn print(&self, json: bool, sort_pairs: bool) -> Result<()> {
        if json {
            let out = serde_json::to_string_pretty(self).wrap_err("failed serializing report")?;
            println!("{out}");
        } else {
            print!("{}", self.to_text(sort_pairs)?);
        }
        Ok(())
    }
}

/// Builds the Merkle tree of a whitelist and prints its root, optionally
/// together with the inclusion proof of one item.
///
/// # Errors
///
/// Fails if the whitelist cannot be read, is empty, or if the selected item
/// is not part of it.
#[instrument(skip_all, fields(whitelist = %args.whitelist.display()))]
pub fn run(args: Args, config: &Config) -> Result<()> {
    let Args {
        whitelist: path,
        index,
        item,
        overrides,
        json,
    } = args;
    let config = config.clone().with_overrides(&overrides);
    let whitelist = Whitelist::from_path(&path)?;
    let tree = whitelist.tree(config.hasher.hasher(), config.options())?;
    info!(
        leaves = tree.leaf_count(),
        depth = tree.depth(),
        hasher = %config.hasher,
        root = %tree.root_hex(),
        "constructed merkle tree"
    );

    let item = match (index, item.as_deref()) {
        (Some(index), _) => Some(whitelist.get(index).ok_or_else(|| {
            eyre!(
                "index {index} is out of range for a whitelist of {} items",
                whitelist.len()
            )
        })?),
        (None, item) => item,
    };
    Report::new(&tree, item)?.print(json, config.sort_pairs)
}
