//! Raw, unresolved records extracted from a deposited coordinate file.
//!
//! These mirror the file content row by row: alternate locations, competing residue
//! candidates, and operator expressions are kept verbatim for [`assembly`](super::assembly)
//! to resolve.

use crate::model::transform::Transformation;
use crate::model::types::Point;
use smol_str::SmolStr;

/// One `_atom_site` row that survived the reader's row filters.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub model: i32,
    pub label_asym_id: SmolStr,
    pub seq_id: i32,
    pub comp_id: SmolStr,
    pub atom_name: SmolStr,
    pub alt_id: Option<SmolStr>,
    pub element: SmolStr,
    /// Operator label of coordinates that were written already assembly-expanded.
    pub operator: Option<SmolStr>,
    pub pos: Point,
}

/// One `_pdbx_struct_oper_list` row.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDeclaration {
    pub id: SmolStr,
    pub transformation: Transformation,
}

/// One `_pdbx_struct_assembly_gen` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyGenerator {
    pub assembly_id: SmolStr,
    pub oper_expression: String,
    pub asym_ids: Vec<SmolStr>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStructure {
    /// Model number of the first coordinate row, if any row was read.
    pub first_model: Option<i32>,
    pub atoms: Vec<AtomRecord>,
    pub operators: Vec<OperatorDeclaration>,
    pub generators: Vec<AssemblyGenerator>,
}

impl RawStructure {
    pub fn operator(&self, id: &str) -> Option<&OperatorDeclaration> {
        self.operators.iter().find(|op| op.id == id)
    }

    /// Whether the coordinates carry operator labels and need no assembly expansion.
    pub fn is_expanded(&self) -> bool {
        self.atoms.iter().any(|a| a.operator.is_some())
    }

    /// Generators of the first declared assembly, in declaration order.
    pub fn first_assembly(&self) -> impl Iterator<Item = &AssemblyGenerator> {
        let first = self.generators.first().map(|g| g.assembly_id.clone());
        self.generators
            .iter()
            .filter(move |g| Some(&g.assembly_id) == first.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(assembly_id: &str, expression: &str, chains: &[&str]) -> AssemblyGenerator {
        AssemblyGenerator {
            assembly_id: SmolStr::new(assembly_id),
            oper_expression: expression.to_string(),
            asym_ids: chains.iter().map(|c| SmolStr::new(c)).collect(),
        }
    }

    #[test]
    fn first_assembly_keeps_only_generators_of_first_id() {
        let raw = RawStructure {
            generators: vec![
                generator("1", "1", &["A"]),
                generator("2", "1", &["B"]),
                generator("1", "2", &["C"]),
            ],
            ..RawStructure::default()
        };

        let chains: Vec<_> = raw
            .first_assembly()
            .flat_map(|g| g.asym_ids.iter().map(|c| c.as_str()))
            .collect();
        assert_eq!(chains, vec!["A", "C"]);
    }

    #[test]
    fn operator_lookup_by_id() {
        let raw = RawStructure {
            operators: vec![OperatorDeclaration {
                id: SmolStr::new("P"),
                transformation: Transformation::identity(),
            }],
            ..RawStructure::default()
        };

        assert!(raw.operator("P").is_some());
        assert!(raw.operator("1").is_none());
    }
}
