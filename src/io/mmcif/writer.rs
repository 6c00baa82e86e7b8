//! mmCIF writer for canonical, assembly-expanded structures.
//!
//! The serializer emits a `data_` header, a `_pdbx_struct_oper_list` loop with the operator
//! of every chain, and an `_atom_site` loop in emission order. Each atom row carries its
//! chain's operator label in `_atom_site.pdbx_struct_oper_list_id`, so reading the output
//! back reproduces the same chains, residue indices, and atom indices without expanding the
//! assembly a second time.

use crate::io::error::Error;
use crate::model::{
    atom::Atom, chain::Chain, residue::Residue, structure::Structure,
    transform::Transformation,
};
use std::io::Write;

const ATOM_SITE_COLUMNS: [&str; 11] = [
    "group_PDB",
    "id",
    "label_atom_id",
    "label_comp_id",
    "label_asym_id",
    "label_seq_id",
    "pdbx_struct_oper_list_id",
    "Cartn_x",
    "Cartn_y",
    "Cartn_z",
    "pdbx_PDB_model_num",
];

/// Serializes a [`Structure`] into mmCIF with coordinates rounded to `precision` decimals.
///
/// Atoms carry no element in the model, so `_atom_site.type_symbol` is omitted; readers then
/// keep every written row. Residues are labelled with the code of their normalized
/// [`ResidueType`](crate::model::types::ResidueType).
///
/// # Errors
///
/// Returns [`Error::Io`] when the destination rejects a write.
pub fn write_structure<W: Write>(
    writer: W,
    structure: &Structure,
    precision: usize,
) -> Result<(), Error> {
    let mut ctx = WriterContext::new(writer, precision);

    ctx.write_header(structure)?;

    ctx.write_operators(structure)?;

    ctx.write_atoms(structure)?;

    ctx.writer.flush().map_err(io_error)
}

fn io_error(e: std::io::Error) -> Error {
    Error::from_io(e, None)
}

/// Stateful helper that tracks atom numbering and writes mmCIF sections.
struct WriterContext<W> {
    writer: W,
    precision: usize,
    current_atom_id: usize,
}

impl<W: Write> WriterContext<W> {
    fn new(writer: W, precision: usize) -> Self {
        Self {
            writer,
            precision,
            current_atom_id: 1,
        }
    }

    fn write_header(&mut self, structure: &Structure) -> Result<(), Error> {
        let name = structure.id.as_str().to_ascii_uppercase();
        writeln!(self.writer, "data_{name}")
            .and_then(|_| writeln!(self.writer, "#"))
            .map_err(io_error)
    }

    /// Writes one `_pdbx_struct_oper_list` row per distinct chain operator.
    ///
    /// Matrix entries use the shortest representation that parses back to the same `f64`,
    /// so identity operators stay exact.
    fn write_operators(&mut self, structure: &Structure) -> Result<(), Error> {
        let operators = chain_operators(structure);
        if operators.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "loop_").map_err(io_error)?;
        writeln!(self.writer, "_pdbx_struct_oper_list.id").map_err(io_error)?;
        for i in 1..=3 {
            for j in 1..=3 {
                writeln!(self.writer, "_pdbx_struct_oper_list.matrix[{i}][{j}]")
                    .map_err(io_error)?;
            }
            writeln!(self.writer, "_pdbx_struct_oper_list.vector[{i}]").map_err(io_error)?;
        }

        for (id, transformation) in operators {
            let matrix = transformation.matrix();
            let mut row = quote_string(id);
            for i in 0..3 {
                for j in 0..4 {
                    row.push(' ');
                    row.push_str(&matrix[(i, j)].to_string());
                }
            }
            writeln!(self.writer, "{row}").map_err(io_error)?;
        }
        writeln!(self.writer, "#").map_err(io_error)
    }

    fn write_atoms(&mut self, structure: &Structure) -> Result<(), Error> {
        writeln!(self.writer, "loop_").map_err(io_error)?;
        for column in ATOM_SITE_COLUMNS {
            writeln!(self.writer, "_atom_site.{column}").map_err(io_error)?;
        }

        for chain in structure.iter_chains() {
            for residue in chain.iter_residues() {
                for atom in residue.iter_atoms() {
                    self.write_atom_record(chain, residue, atom)?;
                    self.current_atom_id += 1;
                }
            }
        }
        writeln!(self.writer, "#").map_err(io_error)
    }

    fn write_atom_record(
        &mut self,
        chain: &Chain,
        residue: &Residue,
        atom: &Atom,
    ) -> Result<(), Error> {
        let residue_type = residue.residue_type();
        let group_pdb = if residue_type.is_protein() || residue_type.is_nucleic() {
            "ATOM"
        } else {
            "HETATM"
        };

        writeln!(
            self.writer,
            "{group_pdb} {atom_id} {atom_name} {comp_id} {asym_id} {seq_id} {operator} {x:.prec$} {y:.prec$} {z:.prec$} 1",
            atom_id = self.current_atom_id,
            atom_name = quote_string(atom.name()),
            comp_id = residue_type.code(),
            asym_id = quote_string(&chain.id.label_asym_id),
            seq_id = residue.seq_id(),
            operator = quote_string(&chain.id.operator),
            x = atom.pos.x,
            y = atom.pos.y,
            z = atom.pos.z,
            prec = self.precision,
        )
        .map_err(io_error)
    }
}

/// Operator label and transformation of every chain, first occurrence wins.
fn chain_operators(structure: &Structure) -> Vec<(&str, Transformation)> {
    let mut operators: Vec<(&str, Transformation)> = Vec::new();
    for chain in structure.iter_chains() {
        let Some(residue) = chain.residues().first() else {
            continue;
        };
        let id = chain.id.operator.as_str();
        if operators.iter().all(|(seen, _)| *seen != id) {
            operators.push((id, residue.transformation));
        }
    }
    operators
}

/// Wraps strings containing whitespace or quotes with CIF-safe quoting.
///
/// Empty strings become `?`, single quotes trigger double-quote wrapping, and all other
/// cases fall back to single quotes.
fn quote_string(s: &str) -> String {
    if s.is_empty() {
        return "?".to_string();
    }
    if !s.contains(char::is_whitespace) && !s.contains('\'') && !s.contains('"') {
        return s.to_string();
    }
    if s.contains('\'') && !s.contains('"') {
        return format!("\"{s}\"");
    }
    format!("'{s}'")
}
