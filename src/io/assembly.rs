//! Resolution of raw records into a canonical, symmetry-expanded [`Structure`].
//!
//! Alternate locations collapse to the first row seen per atom name, competing residue
//! candidates at one sequence position collapse to the first candidate seen, and the first
//! declared biological assembly is expanded by materializing one [`Chain`] per
//! (chain label, operator label) pair. Chains that no generator lists keep their
//! asymmetric-unit coordinates under the implicit identity operator `"1"`.
//!
//! Records that already carry operator labels describe an expanded structure, such as one
//! written by [`write_mmcif_structure`](crate::io::write_mmcif_structure). Their chains are
//! taken as they are, in first-seen order, with the declared operator transformation
//! recorded but not applied.

use crate::io::context::IoContext;
use crate::io::error::Error;
use crate::io::records::RawStructure;
use crate::model::{
    atom::Atom,
    chain::Chain,
    identifier::{
        AtomIdentifier, ChainIdentifier, IDENTITY_OPERATOR, LabelSelection, ResidueIdentifier,
        StructureIdentifier,
    },
    residue::Residue,
    structure::Structure,
    transform::Transformation,
    types::Point,
};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

const FORMAT: &str = "mmCIF";

/// The atoms of the residue-type candidate that claimed a sequence position first.
struct Candidate {
    comp_id: SmolStr,
    atoms: Vec<(SmolStr, Point)>,
}

struct AsymChain {
    label: SmolStr,
    residues: Vec<(i32, Candidate)>,
    positions: HashMap<i32, usize>,
}

impl AsymChain {
    fn new(label: SmolStr) -> Self {
        Self {
            label,
            residues: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

struct Replica {
    chain: usize,
    operator: SmolStr,
    transformation: Transformation,
    /// Coordinates already sit at their transformed position.
    placed: bool,
}

/// Builds the canonical structure from raw records.
///
/// When `selection` is given, only residues addressed by one of its entries are emitted
/// and chains left without residues are dropped. Residue and atom indices are assigned
/// sequentially over what is finally emitted.
pub fn build(
    id: StructureIdentifier,
    raw: RawStructure,
    context: &IoContext,
    selection: Option<&[LabelSelection]>,
) -> Result<Structure, Error> {
    if let Some(model) = raw.first_model.filter(|&m| m != 1) {
        return Err(Error::unsupported_model_numbering(id, model));
    }

    let replicas = if raw.is_expanded() {
        placed_replicas(&raw)
    } else {
        expand_assembly(&raw, &asym_labels(&raw))?
    };
    let chains = resolve_chains(raw);
    let selected: Option<HashSet<&LabelSelection>> = selection.map(|s| s.iter().collect());

    let mut residue_index = 0;
    let mut atom_index = 0;
    let mut emitted = Vec::new();

    for replica in replicas {
        let asym = &chains[replica.chain];
        let mut residues = Vec::new();

        for (seq_id, candidate) in &asym.residues {
            if let Some(selected) = &selected {
                let key = LabelSelection {
                    label_asym_id: asym.label.clone(),
                    operator: replica.operator.clone(),
                    seq_id: *seq_id,
                };
                if !selected.contains(&key) {
                    continue;
                }
            }

            let atoms = candidate
                .atoms
                .iter()
                .map(|(name, pos)| {
                    let pos = if replica.placed {
                        *pos
                    } else {
                        replica.transformation.apply(pos)
                    };
                    let atom = Atom::new(AtomIdentifier::new(name, atom_index), pos);
                    atom_index += 1;
                    atom
                })
                .collect();

            residues.push(Residue::new(
                ResidueIdentifier::new(
                    context.classify_residue(&candidate.comp_id),
                    *seq_id,
                    residue_index,
                ),
                atoms,
                replica.transformation,
            ));
            residue_index += 1;
        }

        if !residues.is_empty() {
            emitted.push(Chain::new(
                ChainIdentifier::new(&asym.label, &replica.operator),
                residues,
            ));
        }
    }

    Ok(Structure::new(id, emitted))
}

/// Chain labels of the asymmetric unit in first-seen order.
fn asym_labels(raw: &RawStructure) -> Vec<SmolStr> {
    let mut seen = HashSet::new();
    raw.atoms
        .iter()
        .filter(|a| seen.insert(a.label_asym_id.clone()))
        .map(|a| a.label_asym_id.clone())
        .collect()
}

/// One replica per already-expanded chain, in the order [`resolve_chains`] creates them.
///
/// Unlabelled chains and undeclared operators fall back to the identity.
fn placed_replicas(raw: &RawStructure) -> Vec<Replica> {
    let mut seen = HashSet::new();
    raw.atoms
        .iter()
        .filter(|a| seen.insert((&a.label_asym_id, &a.operator)))
        .enumerate()
        .map(|(chain, a)| {
            let operator = a
                .operator
                .clone()
                .unwrap_or_else(|| SmolStr::new(IDENTITY_OPERATOR));
            let transformation = raw
                .operator(&operator)
                .map_or_else(Transformation::identity, |op| op.transformation);
            Replica {
                chain,
                operator,
                transformation,
                placed: true,
            }
        })
        .collect()
}

/// Groups records into chains keyed by chain label and, for expanded input, operator label.
fn resolve_chains(raw: RawStructure) -> Vec<AsymChain> {
    let mut chains: Vec<AsymChain> = Vec::new();
    let mut lookup: HashMap<(SmolStr, Option<SmolStr>), usize> = HashMap::new();

    for record in raw.atoms {
        let key = (record.label_asym_id.clone(), record.operator.clone());
        let chain_idx = *lookup.entry(key).or_insert_with(|| {
            chains.push(AsymChain::new(record.label_asym_id.clone()));
            chains.len() - 1
        });
        let chain = &mut chains[chain_idx];

        let residue_idx = match chain.positions.get(&record.seq_id) {
            Some(&idx) => idx,
            None => {
                chain.residues.push((
                    record.seq_id,
                    Candidate {
                        comp_id: record.comp_id.clone(),
                        atoms: Vec::new(),
                    },
                ));
                chain.positions.insert(record.seq_id, chain.residues.len() - 1);
                chain.residues.len() - 1
            }
        };

        let candidate = &mut chain.residues[residue_idx].1;
        if candidate.comp_id != record.comp_id {
            continue;
        }
        if candidate.atoms.iter().any(|(name, _)| *name == record.atom_name) {
            continue;
        }
        candidate.atoms.push((record.atom_name, record.pos));
    }

    chains
}

fn expand_assembly(raw: &RawStructure, labels: &[SmolStr]) -> Result<Vec<Replica>, Error> {
    let chain_position: HashMap<&SmolStr, usize> =
        labels.iter().enumerate().map(|(i, l)| (l, i)).collect();

    let mut replicas = Vec::new();
    let mut seen: HashSet<(usize, SmolStr)> = HashSet::new();
    let mut listed: HashSet<&SmolStr> = HashSet::new();

    for generator in raw.first_assembly() {
        let operators = expand_expression(&generator.oper_expression, raw)?;
        for (operator, transformation) in operators {
            for asym_id in &generator.asym_ids {
                listed.insert(asym_id);
                let Some(&chain) = chain_position.get(asym_id) else {
                    continue;
                };
                if seen.insert((chain, operator.clone())) {
                    replicas.push(Replica {
                        chain,
                        operator: operator.clone(),
                        transformation,
                        placed: false,
                    });
                }
            }
        }
    }

    for (chain, label) in labels.iter().enumerate() {
        if !listed.contains(label) && seen.insert((chain, SmolStr::new(IDENTITY_OPERATOR))) {
            replicas.push(Replica {
                chain,
                operator: SmolStr::new(IDENTITY_OPERATOR),
                transformation: Transformation::identity(),
                placed: false,
            });
        }
    }

    Ok(replicas)
}

/// Expands an operator expression into labelled, composed transformations.
///
/// Products of parenthesised groups apply the right-most operator first, so `(1-2)(3)`
/// yields `1x3` = T1 ∘ T3 and `2x3` = T2 ∘ T3.
fn expand_expression(
    expression: &str,
    raw: &RawStructure,
) -> Result<Vec<(SmolStr, Transformation)>, Error> {
    let groups = parse_expression(expression).map_err(|details| {
        Error::inconsistent_data(
            FORMAT,
            None,
            format!("invalid operator expression '{expression}': {details}"),
        )
    })?;

    let mut product: Vec<(String, Transformation)> =
        vec![(String::new(), Transformation::identity())];
    for group in groups {
        let mut next = Vec::with_capacity(product.len() * group.len());
        for (label, transformation) in &product {
            for id in &group {
                let operator = raw.operator(id).ok_or_else(|| {
                    Error::inconsistent_data(
                        FORMAT,
                        None,
                        format!("assembly references undeclared operator '{id}'"),
                    )
                })?;
                let label = if label.is_empty() {
                    id.clone()
                } else {
                    format!("{label}x{id}")
                };
                next.push((label, transformation.compose(&operator.transformation)));
            }
        }
        product = next;
    }

    Ok(product
        .into_iter()
        .map(|(label, t)| (SmolStr::new(label), t))
        .collect())
}

fn parse_expression(expression: &str) -> Result<Vec<Vec<String>>, String> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err("empty expression".to_string());
    }
    if !expression.contains('(') {
        return Ok(vec![parse_list(expression)?]);
    }

    let mut groups = Vec::new();
    let mut rest = expression;
    while !rest.is_empty() {
        let Some(open) = rest.strip_prefix('(') else {
            return Err(format!("unexpected text '{rest}'"));
        };
        let Some(close) = open.find(')') else {
            return Err("unbalanced parenthesis".to_string());
        };
        groups.push(parse_list(&open[..close])?);
        rest = open[close + 1..].trim_start();
    }
    Ok(groups)
}

fn parse_list(list: &str) -> Result<Vec<String>, String> {
    let mut ids = Vec::new();
    for item in list.split(',').map(str::trim) {
        if item.is_empty() {
            return Err("empty operator id".to_string());
        }
        let range = item.split_once('-').and_then(|(lo, hi)| {
            let lo = lo.trim().parse::<i64>().ok()?;
            let hi = hi.trim().parse::<i64>().ok()?;
            Some((lo, hi))
        });
        match range {
            Some((lo, hi)) if lo <= hi => ids.extend((lo..=hi).map(|i| i.to_string())),
            Some(_) => return Err(format!("descending range '{item}'")),
            None => ids.push(item.to_string()),
        }
    }
    Ok(ids)
}
