use crate::io::error::Error;
use crate::io::records::{AssemblyGenerator, AtomRecord, OperatorDeclaration, RawStructure};
use crate::model::transform::Transformation;
use crate::model::types::Point;
use nalgebra::{Matrix3, Vector3};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::io::BufRead;
use std::str::FromStr;

const FORMAT: &str = "mmCIF";

const ATOM_SITE: &str = "_atom_site.";
const OPER_LIST: &str = "_pdbx_struct_oper_list.";
const ASSEMBLY_GEN: &str = "_pdbx_struct_assembly_gen.";

#[derive(Debug, Clone)]
struct Token {
    text: String,
    quoted: bool,
    line: usize,
}

impl Token {
    fn is_tag(&self) -> bool {
        !self.quoted && self.text.starts_with('_')
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.text.eq_ignore_ascii_case(keyword)
    }

    fn is_data_block(&self) -> bool {
        !self.quoted && self.text.to_ascii_lowercase().starts_with("data_")
    }
}

#[derive(Default)]
struct AtomSiteIndices {
    label_atom_id: Option<usize>,
    auth_atom_id: Option<usize>,
    label_comp_id: Option<usize>,
    auth_comp_id: Option<usize>,
    label_asym_id: Option<usize>,
    auth_asym_id: Option<usize>,
    label_seq_id: Option<usize>,
    label_alt_id: Option<usize>,
    type_symbol: Option<usize>,
    cartn_x: Option<usize>,
    cartn_y: Option<usize>,
    cartn_z: Option<usize>,
    model_num: Option<usize>,
    oper_id: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    AtomSite,
    OperList,
    AssemblyGen,
    Other,
}

enum ParserState {
    Base,
    InLoopHeader,
    InLoop(LoopKind),
}

type Row = HashMap<String, String>;

struct Parser {
    state: ParserState,
    headers: Vec<String>,
    row: Vec<Token>,
    atom_indices: AtomSiteIndices,
    pending_tag: Option<String>,
    oper_rows: Vec<Row>,
    gen_rows: Vec<Row>,
    single_oper: Row,
    single_gen: Row,
    blocks_seen: usize,
    raw: RawStructure,
}

/// Reads the first data block of an mmCIF stream into unresolved records.
///
/// Only `_atom_site`, `_pdbx_struct_oper_list`, and `_pdbx_struct_assembly_gen` are
/// interpreted; both the looped and the single-row key/value layouts are accepted.
/// Coordinate rows are filtered to the first model, polymer positions (`label_seq_id`
/// present), and non-hydrogen atoms. Everything from the second `data_` header on is
/// ignored.
///
/// An `_atom_site.pdbx_struct_oper_list_id` column marks coordinates that are already
/// assembly-expanded, as produced by
/// [`write_mmcif_structure`](crate::io::write_mmcif_structure); its value is kept on each
/// [`AtomRecord`].
pub fn read<R: BufRead>(reader: R) -> Result<RawStructure, Error> {
    let mut parser = Parser::new();
    tokenize(reader, |token| parser.feed(token))?;
    parser.finish()
}

fn tokenize<R: BufRead>(
    reader: R,
    mut sink: impl FnMut(Token) -> Result<(), Error>,
) -> Result<(), Error> {
    let mut text_field: Option<(usize, String)> = None;
    let mut line_num = 0;

    for line in reader.lines() {
        line_num += 1;
        let line = line.map_err(|e| Error::from_io(e, None))?;

        if let Some((start, mut text)) = text_field.take() {
            if let Some(rest) = line.strip_prefix(';') {
                sink(Token {
                    text: text.trim().to_string(),
                    quoted: true,
                    line: start,
                })?;
                for token in split_tokens(rest.trim()) {
                    sink(Token { line: line_num, ..token })?;
                }
            } else {
                text.push('\n');
                text.push_str(&line);
                text_field = Some((start, text));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix(';') {
            text_field = Some((line_num, rest.to_string()));
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        for token in split_tokens(trimmed) {
            sink(Token { line: line_num, ..token })?;
        }
    }

    if let Some((start, _)) = text_field {
        return Err(Error::parse(
            FORMAT,
            None,
            start,
            "Unterminated semicolon text field",
        ));
    }
    Ok(())
}

fn split_tokens(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match in_quote {
            Some(q) => {
                if c == q && chars.peek().is_none_or(|n| n.is_whitespace()) {
                    in_quote = None;
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        quoted: true,
                        line: 0,
                    });
                } else {
                    current.push(c);
                }
            }
            None => {
                if c.is_whitespace() {
                    if !current.is_empty() {
                        tokens.push(Token {
                            text: std::mem::take(&mut current),
                            quoted: false,
                            line: 0,
                        });
                    }
                } else if c == '#' && current.is_empty() {
                    break;
                } else if (c == '\'' || c == '"') && current.is_empty() {
                    in_quote = Some(c);
                } else {
                    current.push(c);
                }
            }
        }
    }
    if !current.is_empty() || in_quote.is_some() {
        tokens.push(Token {
            text: current,
            quoted: in_quote.is_some(),
            line: 0,
        });
    }
    tokens
}

impl Parser {
    fn new() -> Self {
        Self {
            state: ParserState::Base,
            headers: Vec::new(),
            row: Vec::new(),
            atom_indices: AtomSiteIndices::default(),
            pending_tag: None,
            oper_rows: Vec::new(),
            gen_rows: Vec::new(),
            single_oper: Row::new(),
            single_gen: Row::new(),
            blocks_seen: 0,
            raw: RawStructure::default(),
        }
    }

    fn feed(&mut self, token: Token) -> Result<(), Error> {
        if self.blocks_seen > 1 {
            return Ok(());
        }
        match self.state {
            ParserState::Base => self.feed_base(token),
            ParserState::InLoopHeader => {
                if token.is_tag() {
                    self.headers.push(token.text);
                    Ok(())
                } else {
                    let kind = loop_kind(&self.headers);
                    if kind == LoopKind::AtomSite {
                        self.atom_indices = map_atom_site_indices(&self.headers);
                    }
                    self.state = ParserState::InLoop(kind);
                    self.row.clear();
                    self.feed(token)
                }
            }
            ParserState::InLoop(kind) => {
                if token.is_tag() || token.is_keyword("loop_") || token.is_data_block() {
                    self.close_loop(token.line)?;
                    self.state = ParserState::Base;
                    return self.feed_base(token);
                }
                self.row.push(token);
                if self.row.len() == self.headers.len() {
                    let row = std::mem::take(&mut self.row);
                    self.dispatch_row(kind, row)?;
                }
                Ok(())
            }
        }
    }

    fn feed_base(&mut self, token: Token) -> Result<(), Error> {
        if token.is_data_block() {
            self.blocks_seen += 1;
            self.pending_tag = None;
        } else if token.is_keyword("loop_") {
            self.pending_tag = None;
            self.headers.clear();
            self.state = ParserState::InLoopHeader;
        } else if token.is_tag() {
            self.pending_tag = Some(token.text);
        } else if let Some(tag) = self.pending_tag.take() {
            if let Some(field) = tag.strip_prefix(OPER_LIST) {
                self.single_oper.insert(field.to_string(), token.text);
            } else if let Some(field) = tag.strip_prefix(ASSEMBLY_GEN) {
                self.single_gen.insert(field.to_string(), token.text);
            }
        }
        Ok(())
    }

    fn close_loop(&mut self, line: usize) -> Result<(), Error> {
        if !self.row.is_empty() {
            return Err(Error::parse(
                FORMAT,
                None,
                line,
                format!(
                    "Loop row has {} values but {} columns are declared",
                    self.row.len(),
                    self.headers.len()
                ),
            ));
        }
        Ok(())
    }

    fn dispatch_row(&mut self, kind: LoopKind, row: Vec<Token>) -> Result<(), Error> {
        match kind {
            LoopKind::AtomSite => process_atom_row(&row, &self.atom_indices, &mut self.raw),
            LoopKind::OperList => {
                self.oper_rows.push(keyed_row(&self.headers, OPER_LIST, row));
                Ok(())
            }
            LoopKind::AssemblyGen => {
                self.gen_rows.push(keyed_row(&self.headers, ASSEMBLY_GEN, row));
                Ok(())
            }
            LoopKind::Other => Ok(()),
        }
    }

    fn finish(mut self) -> Result<RawStructure, Error> {
        if let ParserState::InLoop(_) = self.state {
            self.close_loop(0)?;
        }

        if !self.single_oper.is_empty() {
            self.oper_rows.push(std::mem::take(&mut self.single_oper));
        }
        if !self.single_gen.is_empty() {
            self.gen_rows.push(std::mem::take(&mut self.single_gen));
        }

        for row in &self.oper_rows {
            self.raw.operators.push(operator_from_row(row)?);
        }
        for row in &self.gen_rows {
            self.raw.generators.push(generator_from_row(row)?);
        }

        Ok(self.raw)
    }
}

fn loop_kind(headers: &[String]) -> LoopKind {
    match headers.first() {
        Some(h) if h.starts_with(ATOM_SITE) => LoopKind::AtomSite,
        Some(h) if h.starts_with(OPER_LIST) => LoopKind::OperList,
        Some(h) if h.starts_with(ASSEMBLY_GEN) => LoopKind::AssemblyGen,
        _ => LoopKind::Other,
    }
}

fn keyed_row(headers: &[String], category: &str, row: Vec<Token>) -> Row {
    headers
        .iter()
        .zip(row)
        .filter_map(|(h, t)| h.strip_prefix(category).map(|f| (f.to_string(), t.text)))
        .collect()
}

fn map_atom_site_indices(headers: &[String]) -> AtomSiteIndices {
    let mut indices = AtomSiteIndices::default();
    for (i, header) in headers.iter().enumerate() {
        match header.as_str() {
            "_atom_site.label_atom_id" => indices.label_atom_id = Some(i),
            "_atom_site.auth_atom_id" => indices.auth_atom_id = Some(i),
            "_atom_site.label_comp_id" => indices.label_comp_id = Some(i),
            "_atom_site.auth_comp_id" => indices.auth_comp_id = Some(i),
            "_atom_site.label_asym_id" => indices.label_asym_id = Some(i),
            "_atom_site.auth_asym_id" => indices.auth_asym_id = Some(i),
            "_atom_site.label_seq_id" => indices.label_seq_id = Some(i),
            "_atom_site.label_alt_id" => indices.label_alt_id = Some(i),
            "_atom_site.type_symbol" => indices.type_symbol = Some(i),
            "_atom_site.Cartn_x" => indices.cartn_x = Some(i),
            "_atom_site.Cartn_y" => indices.cartn_y = Some(i),
            "_atom_site.Cartn_z" => indices.cartn_z = Some(i),
            "_atom_site.pdbx_PDB_model_num" => indices.model_num = Some(i),
            "_atom_site.pdbx_struct_oper_list_id" => indices.oper_id = Some(i),
            _ => {}
        }
    }
    indices
}

fn is_null(value: &str) -> bool {
    matches!(value, "." | "?")
}

fn required(idx: Option<usize>, column: &str, line_num: usize) -> Result<usize, Error> {
    idx.ok_or_else(|| {
        Error::parse(
            FORMAT,
            None,
            line_num,
            format!("_atom_site loop is missing the {column} column"),
        )
    })
}

fn parse_coordinate(value: &str, axis: &str, line_num: usize) -> Result<f64, Error> {
    f64::from_str(value).map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_num,
            format!("Invalid {axis} coordinate"),
        )
    })
}

fn process_atom_row(
    row: &[Token],
    indices: &AtomSiteIndices,
    raw: &mut RawStructure,
) -> Result<(), Error> {
    let line_num = row.first().map_or(0, |t| t.line);
    let value = |idx: usize| row[idx].text.as_str();
    let optional = |idx: Option<usize>| idx.map(|i| row[i].text.as_str());

    let model = match optional(indices.model_num) {
        Some(m) if !is_null(m) => m.parse::<i32>().map_err(|_| {
            Error::parse(FORMAT, None, line_num, format!("Invalid model number '{m}'"))
        })?,
        _ => 1,
    };
    let first_model = *raw.first_model.get_or_insert(model);
    if model != first_model {
        return Ok(());
    }

    let seq_idx = required(indices.label_seq_id, "label_seq_id", line_num)?;
    let seq_str = value(seq_idx);
    if is_null(seq_str) {
        return Ok(());
    }
    let seq_id = seq_str.parse::<i32>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_num,
            format!("Invalid sequence position '{seq_str}'"),
        )
    })?;

    let element = optional(indices.type_symbol)
        .filter(|e| !is_null(e))
        .unwrap_or("");
    if element.eq_ignore_ascii_case("H") || element.eq_ignore_ascii_case("D") {
        return Ok(());
    }

    let atom_idx = required(
        indices.label_atom_id.or(indices.auth_atom_id),
        "label_atom_id",
        line_num,
    )?;
    let comp_idx = required(
        indices.label_comp_id.or(indices.auth_comp_id),
        "label_comp_id",
        line_num,
    )?;
    let asym_idx = required(
        indices.label_asym_id.or(indices.auth_asym_id),
        "label_asym_id",
        line_num,
    )?;
    let x_idx = required(indices.cartn_x, "Cartn_x", line_num)?;
    let y_idx = required(indices.cartn_y, "Cartn_y", line_num)?;
    let z_idx = required(indices.cartn_z, "Cartn_z", line_num)?;

    let (x_str, y_str, z_str) = (value(x_idx), value(y_idx), value(z_idx));
    if is_null(x_str) || is_null(y_str) || is_null(z_str) {
        return Ok(());
    }
    let pos = Point::new(
        parse_coordinate(x_str, "X", line_num)?,
        parse_coordinate(y_str, "Y", line_num)?,
        parse_coordinate(z_str, "Z", line_num)?,
    );

    let alt_id = optional(indices.label_alt_id)
        .filter(|a| !is_null(a))
        .map(SmolStr::new);
    let operator = optional(indices.oper_id)
        .filter(|o| !is_null(o))
        .map(SmolStr::new);

    raw.atoms.push(AtomRecord {
        model,
        label_asym_id: SmolStr::new(value(asym_idx)),
        seq_id,
        comp_id: SmolStr::new(value(comp_idx)),
        atom_name: SmolStr::new(value(atom_idx)),
        alt_id,
        element: SmolStr::new(element),
        operator,
        pos,
    });

    Ok(())
}

fn row_value<'a>(row: &'a Row, category: &str, field: &str) -> Result<&'a str, Error> {
    row.get(field)
        .map(String::as_str)
        .filter(|v| !is_null(v))
        .ok_or_else(|| {
            Error::inconsistent_data(
                FORMAT,
                None,
                format!("{category} row is missing '{field}'"),
            )
        })
}

fn operator_from_row(row: &Row) -> Result<OperatorDeclaration, Error> {
    let category = "_pdbx_struct_oper_list";
    let id = row_value(row, category, "id")?;

    let number = |field: String| -> Result<f64, Error> {
        let text = row_value(row, category, &field)?;
        f64::from_str(text).map_err(|_| {
            Error::inconsistent_data(
                FORMAT,
                None,
                format!("operator '{id}' has a non-numeric '{field}': {text}"),
            )
        })
    };

    let mut rotation = Matrix3::zeros();
    let mut translation = Vector3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            rotation[(i, j)] = number(format!("matrix[{}][{}]", i + 1, j + 1))?;
        }
        translation[i] = number(format!("vector[{}]", i + 1))?;
    }

    Ok(OperatorDeclaration {
        id: SmolStr::new(id),
        transformation: Transformation::from_parts(rotation, translation),
    })
}

fn generator_from_row(row: &Row) -> Result<AssemblyGenerator, Error> {
    let category = "_pdbx_struct_assembly_gen";
    let assembly_id = row_value(row, category, "assembly_id")?;
    let oper_expression = row_value(row, category, "oper_expression")?;
    let asym_ids = row_value(row, category, "asym_id_list")?
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(SmolStr::new)
        .collect();

    Ok(AssemblyGenerator {
        assembly_id: SmolStr::new(assembly_id),
        oper_expression: oper_expression.split_whitespace().collect(),
        asym_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "data_TEST
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.pdbx_PDB_model_num
";

    fn parse(body: &str) -> RawStructure {
        read(Cursor::new(format!("{HEADER}{body}"))).unwrap()
    }

    #[test]
    fn read_collects_atom_rows_with_label_fields() {
        let raw = parse(
            "ATOM 1 N N . ALA A 1 11.104 6.134 -6.504 1
ATOM 2 C CA . ALA A 1 11.639 6.071 -5.147 1
",
        );

        assert_eq!(raw.first_model, Some(1));
        assert_eq!(raw.atoms.len(), 2);
        let ca = &raw.atoms[1];
        assert_eq!(ca.label_asym_id, "A");
        assert_eq!(ca.comp_id, "ALA");
        assert_eq!(ca.atom_name, "CA");
        assert_eq!(ca.seq_id, 1);
        assert_eq!(ca.alt_id, None);
        assert!((ca.pos.x - 11.639).abs() < 1e-9);
    }

    #[test]
    fn read_keeps_alternate_location_labels() {
        let raw = parse(
            "ATOM 1 C CA A SER A 5 1.0 2.0 3.0 1
ATOM 2 C CA B SER A 5 1.5 2.5 3.5 1
",
        );

        assert_eq!(raw.atoms.len(), 2);
        assert_eq!(raw.atoms[0].alt_id.as_deref(), Some("A"));
        assert_eq!(raw.atoms[1].alt_id.as_deref(), Some("B"));
    }

    #[test]
    fn read_skips_hydrogens_and_non_polymer_rows() {
        let raw = parse(
            "ATOM 1 C CA . GLY A 1 0.0 0.0 0.0 1
ATOM 2 H H . GLY A 1 0.0 0.0 1.0 1
ATOM 3 D D . GLY A 1 0.0 1.0 0.0 1
HETATM 4 O O . HOH B . 5.0 5.0 5.0 1
",
        );

        assert_eq!(raw.atoms.len(), 1);
        assert_eq!(raw.atoms[0].atom_name, "CA");
    }

    #[test]
    fn read_keeps_only_first_model_rows() {
        let raw = parse(
            "ATOM 1 C CA . GLY A 1 0.0 0.0 0.0 2
ATOM 2 C CA . GLY A 2 1.0 0.0 0.0 2
ATOM 3 C CA . GLY A 1 9.0 9.0 9.0 3
",
        );

        assert_eq!(raw.first_model, Some(2));
        assert_eq!(raw.atoms.len(), 2);
        assert!(raw.atoms.iter().all(|a| a.model == 2));
    }

    #[test]
    fn read_handles_quoted_atom_names() {
        let raw = parse("ATOM 1 C \"C4'\" . A R 1 0.0 0.0 0.0 1\n");
        assert_eq!(raw.atoms[0].atom_name, "C4'");
    }

    #[test]
    fn read_reports_invalid_coordinates_with_line_number() {
        let err = read(Cursor::new(format!(
            "{HEADER}ATOM 1 C CA . GLY A 1 abc 0.0 0.0 1\n"
        )))
        .unwrap_err();

        match err {
            Error::Parse { line_number, .. } => assert_eq!(line_number, 16),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_rejects_truncated_loop_rows() {
        let result = read(Cursor::new(format!(
            "{HEADER}ATOM 1 C CA . GLY A 1 0.0 0.0\n#\nloop_\n_other.id\n1\n"
        )));
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn read_parses_looped_operators_spanning_lines() {
        let raw = read(Cursor::new(
            "data_TEST
loop_
_pdbx_struct_oper_list.id
_pdbx_struct_oper_list.type
_pdbx_struct_oper_list.matrix[1][1]
_pdbx_struct_oper_list.matrix[1][2]
_pdbx_struct_oper_list.matrix[1][3]
_pdbx_struct_oper_list.vector[1]
_pdbx_struct_oper_list.matrix[2][1]
_pdbx_struct_oper_list.matrix[2][2]
_pdbx_struct_oper_list.matrix[2][3]
_pdbx_struct_oper_list.vector[2]
_pdbx_struct_oper_list.matrix[3][1]
_pdbx_struct_oper_list.matrix[3][2]
_pdbx_struct_oper_list.matrix[3][3]
_pdbx_struct_oper_list.vector[3]
1 'identity operation' 1 0 0 0 0 1 0 0 0 0 1 0
2 'crystal symmetry operation'
-1 0 0 10.0 0 -1 0 0.0 0 0 1 0.0
",
        ))
        .unwrap();

        assert_eq!(raw.operators.len(), 2);
        assert!(raw.operators[0].transformation.is_identity());
        let moved = raw.operators[1]
            .transformation
            .apply(&Point::new(1.0, 2.0, 3.0));
        assert!((moved - Point::new(9.0, -2.0, 3.0)).norm() < 1e-9);
    }

    #[test]
    fn read_parses_single_row_key_value_categories() {
        let raw = read(Cursor::new(
            "data_TEST
_pdbx_struct_assembly_gen.assembly_id       1
_pdbx_struct_assembly_gen.oper_expression   '(1-2)'
_pdbx_struct_assembly_gen.asym_id_list      A,B,C
#
_pdbx_struct_oper_list.id                   1
_pdbx_struct_oper_list.type                 'identity operation'
_pdbx_struct_oper_list.name                 1_555
_pdbx_struct_oper_list.matrix[1][1]         1.0000000000
_pdbx_struct_oper_list.matrix[1][2]         0.0000000000
_pdbx_struct_oper_list.matrix[1][3]         0.0000000000
_pdbx_struct_oper_list.vector[1]            0.0000000000
_pdbx_struct_oper_list.matrix[2][1]         0.0000000000
_pdbx_struct_oper_list.matrix[2][2]         1.0000000000
_pdbx_struct_oper_list.matrix[2][3]         0.0000000000
_pdbx_struct_oper_list.vector[2]            0.0000000000
_pdbx_struct_oper_list.matrix[3][1]         0.0000000000
_pdbx_struct_oper_list.matrix[3][2]         0.0000000000
_pdbx_struct_oper_list.matrix[3][3]         1.0000000000
_pdbx_struct_oper_list.vector[3]            0.0000000000
",
        ))
        .unwrap();

        assert_eq!(raw.generators.len(), 1);
        assert_eq!(raw.generators[0].oper_expression, "(1-2)");
        assert_eq!(raw.generators[0].asym_ids, vec!["A", "B", "C"]);
        assert_eq!(raw.operators.len(), 1);
    }

    #[test]
    fn read_accepts_semicolon_text_fields() {
        let raw = read(Cursor::new(
            "data_TEST
loop_
_pdbx_struct_assembly_gen.assembly_id
_pdbx_struct_assembly_gen.oper_expression
_pdbx_struct_assembly_gen.asym_id_list
1
;(1-60)
(61-88)
;
A,B
",
        ))
        .unwrap();

        assert_eq!(raw.generators[0].oper_expression, "(1-60)(61-88)");
        assert_eq!(raw.generators[0].asym_ids, vec!["A", "B"]);
    }

    #[test]
    fn read_reports_operator_with_missing_matrix_entry() {
        let result = read(Cursor::new(
            "data_TEST
_pdbx_struct_oper_list.id 1
_pdbx_struct_oper_list.matrix[1][1] 1.0
",
        ));
        assert!(matches!(result, Err(Error::InconsistentData { .. })));
    }

    #[test]
    fn read_stops_at_the_second_data_block() {
        let raw = read(Cursor::new(format!(
            "{HEADER}ATOM 1 C CA . GLY A 1 0.0 0.0 0.0 1
{HEADER}ATOM 1 C CA . GLY B 1 9.0 9.0 9.0 1
ATOM 2 C CA . GLY B 2 9.5 9.0 9.0 1
"
        )))
        .unwrap();

        assert_eq!(raw.atoms.len(), 1);
        assert_eq!(raw.atoms[0].label_asym_id, "A");
    }

    #[test]
    fn read_ignores_operators_declared_in_later_blocks() {
        let raw = read(Cursor::new(
            "data_FIRST
_pdbx_struct_assembly_gen.assembly_id 1
_pdbx_struct_assembly_gen.oper_expression 1
_pdbx_struct_assembly_gen.asym_id_list A
data_SECOND
_pdbx_struct_assembly_gen.assembly_id 2
_pdbx_struct_assembly_gen.oper_expression 2
_pdbx_struct_assembly_gen.asym_id_list B
",
        ))
        .unwrap();

        assert_eq!(raw.generators.len(), 1);
        assert_eq!(raw.generators[0].asym_ids, vec!["A"]);
    }

    #[test]
    fn read_keeps_expanded_operator_labels() {
        let raw = read(Cursor::new(
            "data_TEST
loop_
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_struct_oper_list_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
C CA GLY A 1 1 0.0 0.0 0.0
C CA GLY A 1 1x3 9.0 0.0 0.0
C CA GLY B 1 . 1.0 0.0 0.0
",
        ))
        .unwrap();

        let operators: Vec<_> = raw.atoms.iter().map(|a| a.operator.as_deref()).collect();
        assert_eq!(operators, vec![Some("1"), Some("1x3"), None]);
    }

    #[test]
    fn read_of_empty_stream_yields_empty_records() {
        let raw = read(Cursor::new("")).unwrap();
        assert_eq!(raw, RawStructure::default());
    }
}
