//! Identifiers and label selections that address structural components.
//!
//! Integer indices carried by [`AtomIdentifier`] and [`ResidueIdentifier`] are dense keys
//! assigned after heterogeneity resolution and assembly expansion; they are unique within
//! one [`Structure`](super::structure::Structure). Label-based handles
//! ([`ChainIdentifier`], [`LabelSelection`]) follow mmCIF `label_*` naming and stay stable
//! across re-reads of the same entry.

use super::types::ResidueType;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;

/// Operator label given to chains that are not replicated by any assembly generator.
pub const IDENTITY_OPERATOR: &str = "1";

/// Case-normalized entry identifier, e.g. `1abc`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureIdentifier(SmolStr);

impl StructureIdentifier {
    pub fn new(id: &str) -> Self {
        Self(SmolStr::new(id.trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StructureIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomIdentifier {
    pub name: SmolStr,
    pub index: usize,
}

impl AtomIdentifier {
    pub fn new(name: &str, index: usize) -> Self {
        Self {
            name: SmolStr::new(name),
            index,
        }
    }
}

/// Residue type, biological numbering, and the dense structure-wide index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueIdentifier {
    pub residue_type: ResidueType,
    pub seq_id: i32,
    pub index: usize,
}

impl ResidueIdentifier {
    pub fn new(residue_type: ResidueType, seq_id: i32, index: usize) -> Self {
        Self {
            residue_type,
            seq_id,
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainIdentifier {
    pub label_asym_id: SmolStr,
    pub operator: SmolStr,
}

impl ChainIdentifier {
    pub fn new(label_asym_id: &str, operator: &str) -> Self {
        Self {
            label_asym_id: SmolStr::new(label_asym_id),
            operator: SmolStr::new(operator),
        }
    }
}

impl fmt::Display for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.label_asym_id, self.operator)
    }
}

/// Addresses one residue instance: chain label, operator label, and sequence position.
///
/// The textual form `A_1_42` (chain, operator, position) is accepted by [`FromStr`] and
/// produced by [`Display`](fmt::Display). Operator labels may contain `x` for composed
/// operators (`1x61`) but never underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelSelection {
    pub label_asym_id: SmolStr,
    pub operator: SmolStr,
    pub seq_id: i32,
}

impl LabelSelection {
    pub fn new(label_asym_id: &str, operator: &str, seq_id: i32) -> Self {
        Self {
            label_asym_id: SmolStr::new(label_asym_id),
            operator: SmolStr::new(operator),
            seq_id,
        }
    }

    pub fn chain(&self) -> ChainIdentifier {
        ChainIdentifier {
            label_asym_id: self.label_asym_id.clone(),
            operator: self.operator.clone(),
        }
    }

    pub fn matches(&self, chain: &ChainIdentifier, seq_id: i32) -> bool {
        self.seq_id == seq_id
            && self.label_asym_id == chain.label_asym_id
            && self.operator == chain.operator
    }
}

impl fmt::Display for LabelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.label_asym_id, self.operator, self.seq_id)
    }
}

impl FromStr for LabelSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().rsplitn(3, '_');
        let seq = parts.next();
        let operator = parts.next();
        let chain = parts.next();
        match (chain, operator, seq) {
            (Some(chain), Some(operator), Some(seq)) if !chain.is_empty() => {
                let seq_id = seq
                    .parse::<i32>()
                    .map_err(|_| format!("Invalid sequence position in selection: {}", s))?;
                Ok(LabelSelection::new(chain, operator, seq_id))
            }
            _ => Err(format!(
                "Invalid label selection '{}': expected CHAIN_OPERATOR_POSITION",
                s
            )),
        }
    }
}
