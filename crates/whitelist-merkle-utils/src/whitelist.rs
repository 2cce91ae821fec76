use std::{
    borrow::Cow,
    fs::File,
    io::BufReader,
    path::Path,
};

use color_eyre::eyre::{
    Result,
    WrapErr as _,
};
use serde::Deserialize;
use whitelist_merkle::{
    Hasher,
    Options,
    Tree,
};

/// A list of whitelisted items, read from a JSON array of strings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Whitelist {
    items: Vec<String>,
}

impl Whitelist {
    /// Reads a whitelist from the JSON file at `path`.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or is not a JSON array of strings.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .wrap_err_with(|| format!("failed to open whitelist file `{}`", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .wrap_err("failed deserializing whitelist; expected a JSON array of strings")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Builds a Merkle tree with one leaf per item, see [`encode_item`].
    ///
    /// # Errors
    /// Fails if the whitelist is empty or the tree cannot be constructed.
    pub fn tree<H: Hasher>(&self, hasher: H, options: Options) -> Result<Tree<H>> {
        Tree::from_items(
            self.items.iter().map(|item| encode_item(item)),
            hasher,
            options,
        )
        .wrap_err("failed constructing merkle tree from whitelist")
    }
}

impl FromIterator<String> for Whitelist {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Returns the bytes an item is hashed as.
///
/// Items written as `0x`-prefixed hex (such as Ethereum addresses) are decoded
/// into the bytes they represent, with odd-length hex left-padded by a zero
/// nibble. Every other item is hashed as its UTF-8 bytes.
#[must_use]
pub fn encode_item(item: &str) -> Cow<'_, [u8]> {
    if let Some(digits) = item.strip_prefix("0x") {
        if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            let padded = if digits.len() % 2 == 1 {
                Cow::Owned(format!("0{digits}"))
            } else {
                Cow::Borrowed(digits)
            };
            if let Ok(bytes) = hex::decode(&*padded) {
                return Cow::Owned(bytes);
            }
        }
    }
    Cow::Borrowed(item.as_bytes())
}
