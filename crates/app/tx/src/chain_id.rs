//! Chain identifiers of the form `{name}_{eip155}-{version}`, e.g. `haqq_11235-1`.

use std::fmt;
use std::str::FromStr;

use tollgate_core::{ante_err, AnteError, AnteResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainId {
    pub name: String,
    pub eip155: u64,
    pub version: u64,
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}-{}", self.name, self.eip155, self.version)
    }
}

impl FromStr for ChainId {
    type Err = AnteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chain_id(s)
    }
}

fn positive_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

/// Parse a chain id, returning its EIP-155 number.
///
/// The name is one or more lowercase ASCII letters; both numbers are
/// positive without leading zeros.
pub fn parse_chain_id(chain_id: &str) -> AnteResult<ChainId> {
    let invalid = || ante_err!(InvalidChainId, "chain-id '{chain_id}' cannot be parsed");

    let (name, rest) = chain_id.split_once('_').ok_or_else(invalid)?;
    let (eip155, version) = rest.split_once('-').ok_or_else(invalid)?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(invalid());
    }

    Ok(ChainId {
        name: name.to_string(),
        eip155: positive_number(eip155).ok_or_else(invalid)?,
        version: positive_number(version).ok_or_else(invalid)?,
    })
}
