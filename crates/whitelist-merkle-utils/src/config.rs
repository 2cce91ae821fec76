//! Configuration read from the environment.
//!
//! Values are layered: built-in defaults, then `RUST_LOG` (for the `log`
//! field only), then every variable prefixed with [`PREFIX`]. Command line
//! flags are applied on top by the individual commands.

use std::fmt;

use figment::{
    providers::{
        Env,
        Serialized,
    },
    Figment,
};
use serde::{
    Deserialize,
    Serialize,
};
use whitelist_merkle::{
    Hasher,
    Keccak256,
    Options,
    Sha256,
};

pub const PREFIX: &str = "WHITELIST_MERKLE_";

/// The hash functions selectable at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Keccak256,
    Sha256,
}

impl HashAlgorithm {
    #[must_use]
    pub fn hasher(self) -> Box<dyn Hasher> {
        match self {
            Self::Keccak256 => Box::new(Keccak256),
            Self::Sha256 => Box::new(Sha256),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keccak256 => f.write_str("keccak256"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log filter directives for `tracing-subscriber`.
    pub log: String,
    pub hasher: HashAlgorithm,
    pub sort_leaves: bool,
    pub sort_pairs: bool,
}

impl Default for Config {
    /// Mirrors the whitelist tooling this crate replaces: Keccak-256 with
    /// sorted leaves and sorted pairs.
    fn default() -> Self {
        Self {
            log: "info".to_string(),
            hasher: HashAlgorithm::Keccak256,
            sort_leaves: true,
            sort_pairs: true,
        }
    }
}

impl Config {
    /// Reads the config from the environment.
    ///
    /// # Errors
    /// Fails if a variable cannot be parsed, or if an unknown variable carries [`PREFIX`].
    pub fn get() -> Result<Self, figment::Error> {
        Self::get_with_prefix(PREFIX)
    }

    pub(crate) fn get_with_prefix(prefix: &str) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("RUST_").split("_").only(&["log"]))
            .merge(Env::prefixed(prefix))
            .extract()
    }

    /// Applies command line overrides to the config.
    #[must_use]
    pub fn with_overrides(self, overrides: &Overrides) -> Self {
        Self {
            hasher: overrides.hasher.unwrap_or(self.hasher),
            sort_leaves: overrides.sort_leaves.unwrap_or(self.sort_leaves),
            sort_pairs: overrides.sort_pairs.unwrap_or(self.sort_pairs),
            ..self
        }
    }

    #[must_use]
    pub fn options(&self) -> Options {
        Options {
            sort_leaves: self.sort_leaves,
            sort_pairs: self.sort_pairs,
        }
    }
}

/// Command line flags overriding the tree settings of [`Config`].
#[derive(clap::Args, Clone, Debug, Default)]
pub struct Overrides {
    /// Hash function used for leaves and nodes [default: keccak256]
    #[arg(long, value_enum)]
    pub hasher: Option<HashAlgorithm>,

    /// Sort the leaves by digest before building the tree [default: true]
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub sort_leaves: Option<bool>,

    /// Order sibling pairs by digest before hashing them [default: true]
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub sort_pairs: Option<bool>,
}
