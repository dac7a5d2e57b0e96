//! Equation Crate - Interactive equation editor core
//!
//! This crate maintains a tree of nested math constructs and everything
//! needed to edit it in place:
//! - Rows of text runs and embedded constructs, grouped into multi-line containers
//! - Construct families (fractions, roots, brackets, scripts, matrices, decorations, arrows)
//! - Layout by baseline alignment (`ref_y`) on top of an external measurement service
//! - Caret navigation and selection negotiated level by level through the tree
//! - A deduplicated text format table
//! - Undo/redo through a per-document action log
//! - XML documents, clipboard fragments and LaTeX export
//! - A display list of render primitives

pub mod action;
pub mod clipboard;
pub mod construct;
pub mod container;
pub mod error;
pub mod format;
pub mod geometry;
pub mod latex;
pub mod layout;
pub mod leaf;
pub mod navigation;
pub mod path;
pub mod render;
pub mod root;
pub mod row;
pub mod settings;
pub mod xml_parser;
pub mod xml_writer;

pub use action::{EditKind, EquationAction};
pub use clipboard::{export_fragment, import_fragment, ClipboardData};
pub use construct::{Construct, ConstructKind};
pub use container::RowContainer;
pub use error::*;
pub use format::{Color, FormatId, FormatTable, TextFormat};
pub use geometry::{BoxExtent, Geometry, Point, Rect, Size};
pub use latex::{container_to_latex, row_to_latex, DefaultLatexWriter, LatexWriter};
pub use navigation::{Key, KeyEvent};
pub use render::{RenderConfig, RenderOutput, RenderPrimitive, Renderer};
pub use root::{Document, EquationRoot};
pub use row::{Row, RowItem, TextRun};
pub use settings::{EditorSettings, MatrixDefaults};
pub use xml_parser::{parse_document, parse_fragment};
pub use xml_writer::{fragment_to_xml, to_xml};
