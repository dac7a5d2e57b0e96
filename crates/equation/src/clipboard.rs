//! Clipboard interchange
//!
//! A copied selection travels as an `EquationFragment` XML document with its
//! own compact format list, plus a LaTeX rendering for targets that cannot
//! read the structural form. Pasting parses the fragment detached, merges
//! its formats into the destination table and rewrites its ids before
//! anything touches the live tree.

use crate::error::EquationResult;
use crate::format::{FormatId, FormatTable, TextFormat};
use crate::latex::{row_to_latex, LatexWriter};
use crate::row::Row;
use crate::xml_parser::parse_fragment;
use crate::xml_writer::fragment_to_xml;
use std::collections::{BTreeSet, HashMap};

/// Representations of one copied selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardData {
    /// Structural form, readable by [`import_fragment`]
    pub xml: String,
    pub latex: String,
}

/// Serialize a fragment for the clipboard
pub fn export_fragment(
    fragment: &Row,
    formats: &FormatTable,
    latex: &dyn LatexWriter,
) -> EquationResult<ClipboardData> {
    let (compact, local_formats) = compact_formats(fragment, formats);
    Ok(ClipboardData {
        xml: fragment_to_xml(&compact, &local_formats)?,
        latex: row_to_latex(fragment, latex),
    })
}

/// Parse a clipboard fragment and rewrite its format ids against `formats`.
///
/// Formats the destination lacks are appended to it. On error the table is
/// left untouched.
pub fn import_fragment(xml: &str, formats: &mut FormatTable) -> EquationResult<Row> {
    let parsed = parse_fragment(xml)?;
    let mapping = formats.merge_formats(&parsed.formats);
    let mut row = parsed.row;
    row.remap_formats(&mut |id| mapping[id.0]);
    Ok(row)
}

/// Copy of `fragment` whose ids index a list of only the formats it uses
fn compact_formats(fragment: &Row, formats: &FormatTable) -> (Row, Vec<TextFormat>) {
    let mut used = BTreeSet::new();
    fragment.collect_formats(&mut used);

    let mut local = Vec::with_capacity(used.len());
    let mut mapping = HashMap::with_capacity(used.len());
    for id in used {
        mapping.insert(id, FormatId(local.len()));
        local.push(formats.get(id).clone());
    }

    let mut compact = fragment.clone();
    compact.remap_formats(&mut |id| mapping.get(&id).copied().unwrap_or(id));
    (compact, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{Construct, ConstructKind, ScriptType};
    use crate::format::Color;
    use crate::latex::DefaultLatexWriter;
    use text_engine::{FontType, FontWeight};

    #[test]
    fn test_export_keeps_only_used_formats() {
        let mut formats = FormatTable::new();
        let base = formats.intern(TextFormat::new(20.0, FontType::StixGeneral));
        let _unused = formats.format_id_for_new_color(base, Color::RED);
        let bold = formats.format_id_for_new_weight(base, FontWeight::Bold);

        let mut row = Row::new(20.0, 0, base);
        row.insert_text(0, "ab", bold);
        let data = export_fragment(&row, &formats, &DefaultLatexWriter).unwrap();

        assert_eq!(data.latex, "ab");
        assert_eq!(data.xml.matches("<Format ").count(), 2);
    }

    #[test]
    fn test_import_merges_formats() {
        let mut source = FormatTable::new();
        let base = source.intern(TextFormat::new(20.0, FontType::StixGeneral));
        let red = source.format_id_for_new_color(base, Color::RED);
        let mut row = Row::new(20.0, 0, base);
        row.insert_text(0, "x", red);
        let script = ConstructKind::Script(ScriptType::Sub);
        let mut sub = Construct::new(script, 20.0, 0, base, &mut source);
        let sub_format = sub.slot(0).unwrap().line(0).default_format();
        sub.slot_mut(0).unwrap().line_mut(0).insert_text(0, "2", sub_format);
        row.insert_construct(1, sub);
        let data = export_fragment(&row, &source, &DefaultLatexWriter).unwrap();

        // Destination knows the base format only, at a different index
        let mut destination = FormatTable::new();
        destination.intern(TextFormat::new(14.0, FontType::Arial));
        let dest_base = destination.intern(TextFormat::new(20.0, FontType::StixGeneral));

        let pasted = import_fragment(&data.xml, &mut destination).unwrap();
        assert_eq!(destination.len(), 4);
        assert_eq!(pasted.default_format(), dest_base);

        let mut used = BTreeSet::new();
        pasted.collect_formats(&mut used);
        for id in used {
            assert!(id.0 < destination.len());
        }
        match &pasted.items()[0] {
            crate::row::RowItem::Text(run) => {
                assert_eq!(destination.get(run.formats()[0]).color, Color::RED);
            }
            _ => panic!("expected a text run first"),
        }
    }

    #[test]
    fn test_import_error_leaves_table_untouched() {
        let mut formats = FormatTable::new();
        formats.intern(TextFormat::new(20.0, FontType::StixGeneral));
        assert!(import_fragment("<EquationFragment><Nope/>", &mut formats).is_err());
        assert_eq!(formats.len(), 1);
    }
}
