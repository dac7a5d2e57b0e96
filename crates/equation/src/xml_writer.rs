//! XML Writer - serialize equation documents and clipboard fragments
//!
//! Every node becomes an element named after its type. Constructs carry an
//! empty `parameters` element with their discriminating values as
//! attributes, followed by one `RowContainer` per slot. Text runs store
//! their characters and one format index per character; the formats
//! themselves are listed once, in a `Formats` element at the top.

use crate::construct::Construct;
use crate::container::RowContainer;
use crate::error::{EquationError, EquationResult};
use crate::format::{FormatId, TextFormat};
use crate::row::{Row, RowItem, TextRun};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Version attribute of the document element
pub const FORMAT_VERSION: &str = "1.0";

pub(crate) const ROOT_TAG: &str = "EquationRoot";
pub(crate) const FRAGMENT_TAG: &str = "EquationFragment";
pub(crate) const FORMATS_TAG: &str = "Formats";
pub(crate) const FORMAT_TAG: &str = "Format";
pub(crate) const CONTAINER_TAG: &str = "RowContainer";
pub(crate) const ROW_TAG: &str = "Row";
pub(crate) const TEXT_TAG: &str = "Text";
pub(crate) const PARAMETERS_TAG: &str = "parameters";

/// Writer for equation XML
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    /// Write a whole document: format list and body
    pub fn write_document(
        &mut self,
        body: &RowContainer,
        formats: &[TextFormat],
    ) -> EquationResult<()> {
        let mut root = BytesStart::new(ROOT_TAG);
        root.push_attribute(("version", FORMAT_VERSION));
        self.write(Event::Start(root))?;
        self.write_formats(formats)?;
        self.write_container(body)?;
        self.end_element(ROOT_TAG)
    }

    /// Write a clipboard fragment: format list and one row
    pub fn write_fragment(&mut self, row: &Row, formats: &[TextFormat]) -> EquationResult<()> {
        let mut root = BytesStart::new(FRAGMENT_TAG);
        root.push_attribute(("version", FORMAT_VERSION));
        root.push_attribute(("fontSize", row.font_size().to_string().as_str()));
        root.push_attribute(("subLevel", row.sub_level().to_string().as_str()));
        self.write(Event::Start(root))?;
        self.write_formats(formats)?;
        self.write_row(row)?;
        self.end_element(FRAGMENT_TAG)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_formats(&mut self, formats: &[TextFormat]) -> EquationResult<()> {
        self.write(Event::Start(BytesStart::new(FORMATS_TAG)))?;
        for format in formats {
            let mut elem = BytesStart::new(FORMAT_TAG);
            elem.push_attribute(("fontSize", format.font_size.to_string().as_str()));
            elem.push_attribute(("fontType", format.font_type.as_str()));
            elem.push_attribute(("fontStyle", format.font_style.to_string().as_str()));
            elem.push_attribute(("fontWeight", format.font_weight.to_string().as_str()));
            elem.push_attribute(("color", format.color.to_hex().as_str()));
            elem.push_attribute(("underline", bool_attr(format.underline)));
            self.write(Event::Empty(elem))?;
        }
        self.end_element(FORMATS_TAG)
    }

    fn write_container(&mut self, container: &RowContainer) -> EquationResult<()> {
        let mut elem = BytesStart::new(CONTAINER_TAG);
        elem.push_attribute(("fontSize", container.font_size().to_string().as_str()));
        elem.push_attribute(("subLevel", container.sub_level().to_string().as_str()));
        self.write(Event::Start(elem))?;
        for line in container.lines() {
            self.write_row(line)?;
        }
        self.end_element(CONTAINER_TAG)
    }

    fn write_row(&mut self, row: &Row) -> EquationResult<()> {
        let mut elem = BytesStart::new(ROW_TAG);
        elem.push_attribute(("defaultFormat", row.default_format().to_string().as_str()));
        self.write(Event::Start(elem))?;
        for item in row.items() {
            match item {
                RowItem::Text(run) => self.write_text(run)?,
                RowItem::Construct(construct) => self.write_construct(construct)?,
            }
        }
        self.end_element(ROW_TAG)
    }

    fn write_text(&mut self, run: &TextRun) -> EquationResult<()> {
        let mut elem = BytesStart::new(TEXT_TAG);
        elem.push_attribute(("value", run.text().as_str()));
        elem.push_attribute(("formats", format_list(run.formats()).as_str()));
        self.write(Event::Empty(elem))
    }

    fn write_construct(&mut self, construct: &Construct) -> EquationResult<()> {
        let tag = construct.type_name();
        self.write(Event::Start(BytesStart::new(tag)))?;

        let mut parameters = BytesStart::new(PARAMETERS_TAG);
        for (key, value) in construct.kind().params() {
            parameters.push_attribute((key, value.as_str()));
        }
        self.write(Event::Empty(parameters))?;

        for slot in construct.slots() {
            self.write_container(slot)?;
        }
        self.end_element(tag)
    }

    fn end_element(&mut self, tag: &str) -> EquationResult<()> {
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn write(&mut self, event: Event<'_>) -> EquationResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| EquationError::Serialize(e.to_string()))
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Space separated format indices
fn format_list(formats: &[FormatId]) -> String {
    formats
        .iter()
        .map(|id| id.0.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize a document to an XML string
pub fn to_xml(body: &RowContainer, formats: &[TextFormat]) -> EquationResult<String> {
    let mut writer = XmlWriter::new(Vec::new());
    writer.write_document(body, formats)?;
    String::from_utf8(writer.into_inner()).map_err(|e| EquationError::Serialize(e.to_string()))
}

/// Serialize a clipboard fragment to an XML string
pub fn fragment_to_xml(row: &Row, formats: &[TextFormat]) -> EquationResult<String> {
    let mut writer = XmlWriter::new(Vec::new());
    writer.write_fragment(row, formats)?;
    String::from_utf8(writer.into_inner()).map_err(|e| EquationError::Serialize(e.to_string()))
}
