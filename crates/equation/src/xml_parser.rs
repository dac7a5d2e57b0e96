//! XML Parser - read equation documents and clipboard fragments
//!
//! Parsing always builds a detached tree. Nothing is attached to a live
//! document until the whole input has been read and validated, so a
//! malformed file leaves the editor untouched.

use crate::construct::{Construct, ConstructKind};
use crate::container::RowContainer;
use crate::error::{EquationError, EquationResult};
use crate::format::{Color, FormatId, TextFormat};
use crate::row::{Row, RowItem, TextRun};
use crate::xml_writer::{
    CONTAINER_TAG, FORMATS_TAG, FORMAT_TAG, FRAGMENT_TAG, PARAMETERS_TAG, ROOT_TAG, ROW_TAG,
    TEXT_TAG,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use text_engine::{FontStyle, FontType, FontWeight};

/// A parsed document, not yet attached to an editor
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub body: RowContainer,
    pub formats: Vec<TextFormat>,
}

/// A parsed clipboard fragment. Its format ids index `formats`.
#[derive(Debug, Clone)]
pub struct ParsedFragment {
    pub row: Row,
    pub formats: Vec<TextFormat>,
}

/// Parse a document from an XML string
pub fn parse_document(xml: &str) -> EquationResult<ParsedDocument> {
    XmlParser::new(xml).parse_document()
}

/// Parse a clipboard fragment from an XML string
pub fn parse_fragment(xml: &str) -> EquationResult<ParsedFragment> {
    XmlParser::new(xml).parse_fragment()
}

type Attributes = HashMap<String, String>;

/// Element events with their names and attributes decoded
#[derive(Debug)]
enum Token {
    Start(String, Attributes),
    Empty(String, Attributes),
    End(String),
    Eof,
}

/// Recursive descent parser over equation XML
pub struct XmlParser<'a> {
    reader: Reader<&'a [u8]>,
    format_count: usize,
}

impl<'a> XmlParser<'a> {
    pub fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            format_count: 0,
        }
    }

    pub fn parse_document(&mut self) -> EquationResult<ParsedDocument> {
        let attrs = self.expect_start(ROOT_TAG)?;
        check_version(&attrs)?;
        let formats = self.parse_formats()?;

        let body = match self.next_token()? {
            Token::Start(name, attrs) if name == CONTAINER_TAG => self.parse_container(&attrs)?,
            other => return Err(unexpected(other, CONTAINER_TAG)),
        };
        self.expect_end(ROOT_TAG)?;
        Ok(ParsedDocument { body, formats })
    }

    pub fn parse_fragment(&mut self) -> EquationResult<ParsedFragment> {
        let attrs = self.expect_start(FRAGMENT_TAG)?;
        check_version(&attrs)?;
        let font_size: f32 = parse_attr(&attrs, "fontSize", FRAGMENT_TAG)?;
        let sub_level: u32 = parse_attr(&attrs, "subLevel", FRAGMENT_TAG)?;
        let formats = self.parse_formats()?;

        let row = match self.next_token()? {
            Token::Start(name, attrs) if name == ROW_TAG => {
                self.parse_row(&attrs, font_size, sub_level, false)?
            }
            Token::Empty(name, attrs) if name == ROW_TAG => {
                self.parse_row(&attrs, font_size, sub_level, true)?
            }
            other => return Err(unexpected(other, ROW_TAG)),
        };
        self.expect_end(FRAGMENT_TAG)?;
        Ok(ParsedFragment { row, formats })
    }

    // =========================================================================
    // Elements
    // =========================================================================

    fn parse_formats(&mut self) -> EquationResult<Vec<TextFormat>> {
        let mut formats = Vec::new();
        match self.next_token()? {
            Token::Empty(name, _) if name == FORMATS_TAG => {}
            Token::Start(name, _) if name == FORMATS_TAG => loop {
                match self.next_token()? {
                    Token::Empty(name, attrs) if name == FORMAT_TAG => {
                        formats.push(parse_format(&attrs)?);
                    }
                    Token::End(name) if name == FORMATS_TAG => break,
                    other => return Err(unexpected(other, FORMAT_TAG)),
                }
            },
            other => return Err(unexpected(other, FORMATS_TAG)),
        }
        self.format_count = formats.len();
        Ok(formats)
    }

    fn parse_container(&mut self, attrs: &Attributes) -> EquationResult<RowContainer> {
        let font_size: f32 = parse_attr(attrs, "fontSize", CONTAINER_TAG)?;
        let sub_level: u32 = parse_attr(attrs, "subLevel", CONTAINER_TAG)?;

        let mut lines = Vec::new();
        loop {
            match self.next_token()? {
                Token::Start(name, attrs) if name == ROW_TAG => {
                    lines.push(self.parse_row(&attrs, font_size, sub_level, false)?);
                }
                Token::Empty(name, attrs) if name == ROW_TAG => {
                    lines.push(self.parse_row(&attrs, font_size, sub_level, true)?);
                }
                Token::End(name) if name == CONTAINER_TAG => break,
                other => return Err(unexpected(other, ROW_TAG)),
            }
        }

        if lines.is_empty() {
            return Err(EquationError::Deserialize(
                "RowContainer without rows".to_string(),
            ));
        }
        Ok(RowContainer::from_lines(lines, font_size, sub_level))
    }

    fn parse_row(
        &mut self,
        attrs: &Attributes,
        font_size: f32,
        sub_level: u32,
        empty: bool,
    ) -> EquationResult<Row> {
        let default_format = self.format_id(parse_attr(attrs, "defaultFormat", ROW_TAG)?)?;
        let mut items = Vec::new();

        while !empty {
            match self.next_token()? {
                Token::Empty(name, attrs) if name == TEXT_TAG => {
                    items.push(RowItem::Text(self.parse_text(&attrs)?));
                }
                Token::Start(name, attrs) if name == TEXT_TAG => {
                    items.push(RowItem::Text(self.parse_text(&attrs)?));
                    self.expect_end(TEXT_TAG)?;
                }
                Token::Start(name, _) if ConstructKind::is_type_name(&name) => {
                    let construct = self.parse_construct(&name, font_size, sub_level)?;
                    items.push(RowItem::Construct(Box::new(construct)));
                }
                Token::End(name) if name == ROW_TAG => break,
                other => return Err(unexpected(other, TEXT_TAG)),
            }
        }

        Ok(Row::from_items(items, font_size, sub_level, default_format))
    }

    fn parse_text(&self, attrs: &Attributes) -> EquationResult<TextRun> {
        let chars: Vec<char> = attr(attrs, "value", TEXT_TAG)?.chars().collect();
        let formats = attr(attrs, "formats", TEXT_TAG)?
            .split_whitespace()
            .map(|index| {
                let index = index.parse::<usize>().map_err(|e| {
                    EquationError::Deserialize(format!("bad format index {:?}: {}", index, e))
                })?;
                self.format_id(index)
            })
            .collect::<EquationResult<Vec<_>>>()?;

        if chars.len() != formats.len() {
            return Err(EquationError::Deserialize(format!(
                "Text has {} characters but {} formats",
                chars.len(),
                formats.len()
            )));
        }
        Ok(TextRun::from_parts(chars, formats))
    }

    fn parse_construct(
        &mut self,
        name: &str,
        font_size: f32,
        sub_level: u32,
    ) -> EquationResult<Construct> {
        let params = match self.next_token()? {
            Token::Empty(tag, attrs) if tag == PARAMETERS_TAG => attrs,
            Token::Start(tag, attrs) if tag == PARAMETERS_TAG => {
                self.expect_end(PARAMETERS_TAG)?;
                attrs
            }
            other => return Err(unexpected(other, PARAMETERS_TAG)),
        };
        let kind = ConstructKind::from_params(name, &params)?;

        let mut slots = Vec::new();
        loop {
            match self.next_token()? {
                Token::Start(tag, attrs) if tag == CONTAINER_TAG => {
                    slots.push(self.parse_container(&attrs)?);
                }
                Token::End(tag) if tag == name => break,
                other => return Err(unexpected(other, CONTAINER_TAG)),
            }
        }

        Construct::from_slots(kind, font_size, sub_level, slots)
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn next_token(&mut self) -> EquationResult<Token> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => return Ok(Token::Start(element_name(e), attributes(e)?)),
                Event::Empty(ref e) => return Ok(Token::Empty(element_name(e), attributes(e)?)),
                Event::End(ref e) => {
                    return Ok(Token::End(local_name_from_bytes(e.name().as_ref())));
                }
                Event::Eof => return Ok(Token::Eof),
                _ => {}
            }
        }
    }

    fn expect_start(&mut self, tag: &str) -> EquationResult<Attributes> {
        match self.next_token()? {
            Token::Start(name, attrs) if name == tag => Ok(attrs),
            other => Err(unexpected(other, tag)),
        }
    }

    fn expect_end(&mut self, tag: &str) -> EquationResult<()> {
        match self.next_token()? {
            Token::End(name) if name == tag => Ok(()),
            other => Err(unexpected(other, tag)),
        }
    }

    fn format_id(&self, index: usize) -> EquationResult<FormatId> {
        if index < self.format_count {
            Ok(FormatId(index))
        } else {
            Err(EquationError::Deserialize(format!(
                "format index {} out of range ({} formats)",
                index, self.format_count
            )))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn unexpected(token: Token, wanted: &str) -> EquationError {
    match token {
        Token::Start(name, _) | Token::Empty(name, _) => {
            if is_known_tag(&name) {
                EquationError::Deserialize(format!("expected {}, found {}", wanted, name))
            } else {
                EquationError::UnknownElement(name)
            }
        }
        Token::End(name) => {
            EquationError::Deserialize(format!("expected {}, found end of {}", wanted, name))
        }
        Token::Eof => EquationError::Deserialize(format!(
            "unexpected end of document, expected {}",
            wanted
        )),
    }
}

fn is_known_tag(name: &str) -> bool {
    [
        ROOT_TAG,
        FRAGMENT_TAG,
        FORMATS_TAG,
        FORMAT_TAG,
        CONTAINER_TAG,
        ROW_TAG,
        TEXT_TAG,
        PARAMETERS_TAG,
    ]
    .contains(&name)
        || ConstructKind::is_type_name(name)
}

fn check_version(attrs: &Attributes) -> EquationResult<()> {
    match attrs.get("version") {
        Some(version) if !version.starts_with("1.") => Err(EquationError::Deserialize(format!(
            "unsupported document version {}",
            version
        ))),
        _ => Ok(()),
    }
}

fn parse_format(attrs: &Attributes) -> EquationResult<TextFormat> {
    let font_size: f32 = parse_attr(attrs, "fontSize", FORMAT_TAG)?;
    let font_type: FontType = attr(attrs, "fontType", FORMAT_TAG)?.parse()?;
    let font_style: FontStyle = attr(attrs, "fontStyle", FORMAT_TAG)?.parse()?;
    let font_weight: FontWeight = attr(attrs, "fontWeight", FORMAT_TAG)?.parse()?;
    let color_value = attr(attrs, "color", FORMAT_TAG)?;
    let color = Color::from_hex(color_value)
        .ok_or_else(|| EquationError::Deserialize(format!("bad color {:?}", color_value)))?;
    let underline = match attr(attrs, "underline", FORMAT_TAG)? {
        "true" => true,
        "false" => false,
        other => {
            return Err(EquationError::Deserialize(format!(
                "bad underline flag {:?}",
                other
            )))
        }
    };

    Ok(TextFormat::new(font_size, font_type)
        .with_style(font_style)
        .with_weight(font_weight)
        .with_color(color)
        .with_underline(underline))
}

fn attr<'m>(attrs: &'m Attributes, key: &str, element: &str) -> EquationResult<&'m str> {
    attrs
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| EquationError::Deserialize(format!("{} is missing {}", element, key)))
}

fn parse_attr<T>(attrs: &Attributes, key: &str, element: &str) -> EquationResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = attr(attrs, key, element)?;
    value.parse().map_err(|e| {
        EquationError::Deserialize(format!("{}.{} = {:?}: {}", element, key, value, e))
    })
}

fn element_name(e: &BytesStart<'_>) -> String {
    local_name_from_bytes(e.name().as_ref())
}

fn attributes(e: &BytesStart<'_>) -> EquationResult<Attributes> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|e| EquationError::Deserialize(format!("attribute {}: {}", key, e)))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}

fn local_name_from_bytes(name: &[u8]) -> String {
    let name_str = String::from_utf8_lossy(name);
    match name_str.find(':') {
        Some(pos) => name_str[pos + 1..].to_string(),
        None => name_str.to_string(),
    }
}
