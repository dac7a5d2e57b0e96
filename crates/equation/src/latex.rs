//! LaTeX export
//!
//! The traversal lives here and follows the same parent/child recursion as
//! layout; what each construct turns into is decided by a [`LatexWriter`].
//! [`DefaultLatexWriter`] covers every construct family with amsmath and
//! mathtools commands.

use crate::construct::{
    ArrowKind, BracketSign, CompositePosition, ConstructKind, Decoration, DecorationPosition,
    DivisionStyle, HorizontalBracketSign, HorizontalPosition, LimitPlacement, RadicalType,
    ScriptType, SignCompositeType, SignKind,
};
use crate::container::RowContainer;
use crate::row::{Row, RowItem};

/// Turns text runs and constructs into LaTeX
pub trait LatexWriter {
    /// LaTeX for a run of characters
    fn text(&self, text: &str) -> String;

    /// LaTeX for a construct, given the LaTeX of its slots in slot order.
    /// Empty slots arrive as empty strings.
    fn construct(&self, kind: &ConstructKind, slots: &[String]) -> String;
}

/// Serialize a container, one line per `\\`
pub fn container_to_latex(container: &RowContainer, writer: &dyn LatexWriter) -> String {
    container
        .lines()
        .iter()
        .map(|line| row_to_latex(line, writer))
        .collect::<Vec<_>>()
        .join(" \\\\ ")
}

pub fn row_to_latex(row: &Row, writer: &dyn LatexWriter) -> String {
    let mut out = String::new();
    for item in row.items() {
        match item {
            RowItem::Text(run) => {
                if !run.is_empty() {
                    push_separated(&mut out, &writer.text(&run.text()));
                }
            }
            RowItem::Construct(construct) => {
                let slots: Vec<String> = construct
                    .slots()
                    .iter()
                    .map(|slot| container_to_latex(slot, writer))
                    .collect();
                push_separated(&mut out, &writer.construct(construct.kind(), &slots));
            }
        }
    }
    out
}

/// Append, keeping a trailing command word apart from a following letter
fn push_separated(out: &mut String, next: &str) {
    if ends_with_command_word(out) && next.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.push(' ');
    }
    out.push_str(next);
}

fn ends_with_command_word(text: &str) -> bool {
    let word_start = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    word_start.len() < text.len() && word_start.ends_with('\\')
}

// =============================================================================
// Default writer
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLatexWriter;

impl LatexWriter for DefaultLatexWriter {
    fn text(&self, text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            match char_command(ch) {
                Some(command) => push_separated(&mut out, command),
                None => {
                    let mut buf = [0u8; 4];
                    push_separated(&mut out, ch.encode_utf8(&mut buf));
                }
            }
        }
        out
    }

    fn construct(&self, kind: &ConstructKind, slots: &[String]) -> String {
        let slot = |index: usize| slots.get(index).map(String::as_str).unwrap_or("");
        match kind {
            ConstructKind::Division(t) => {
                let (num, den) = (slot(0), slot(1));
                match t.style {
                    DivisionStyle::Horizontal => format!("{{{}}}/{{{}}}", num, den),
                    DivisionStyle::NoBar => {
                        format!("\\genfrac{{}}{{}}{{0pt}}{{}}{{{}}}{{{}}}", num, den)
                    }
                    // LaTeX has no double rule fraction
                    DivisionStyle::Regular | DivisionStyle::DoubleBar => {
                        let command = if t.small { "\\tfrac" } else { "\\frac" };
                        format!("{}{{{}}}{{{}}}", command, num, den)
                    }
                }
            }
            ConstructKind::Radical(t) => {
                let inside = slot(RadicalType::INSIDE);
                match t {
                    RadicalType::NRoot if !slot(RadicalType::INDEX).is_empty() => {
                        format!("\\sqrt[{}]{{{}}}", slot(RadicalType::INDEX), inside)
                    }
                    _ => format!("\\sqrt{{{}}}", inside),
                }
            }
            ConstructKind::Bracket(t) => format!(
                "\\left{} {} \\right{}",
                t.left.map_or(".", |sign| delimiter(sign, true)),
                slot(0),
                t.right.map_or(".", |sign| delimiter(sign, false)),
            ),
            ConstructKind::HorizontalBracket(t) => {
                let (command, script) = match (t.sign, t.position) {
                    (HorizontalBracketSign::Curly, HorizontalPosition::Top) => ("\\overbrace", '^'),
                    (HorizontalBracketSign::Curly, HorizontalPosition::Bottom) => {
                        ("\\underbrace", '_')
                    }
                    (HorizontalBracketSign::Square, HorizontalPosition::Top) => {
                        ("\\overbracket", '^')
                    }
                    (HorizontalBracketSign::Square, HorizontalPosition::Bottom) => {
                        ("\\underbracket", '_')
                    }
                };
                let mut out = format!("{}{{{}}}", command, slot(0));
                push_script(&mut out, script, slot(1));
                out
            }
            ConstructKind::Composite(t) => {
                let main = slot(0);
                let bottom = t.bottom_slot().map_or("", slot);
                let top = t.top_slot().map_or("", slot);
                if t.big {
                    let mut out = format!("\\mathop{{{}}}\\limits", main);
                    push_script(&mut out, '_', bottom);
                    push_script(&mut out, '^', top);
                    return out;
                }
                match t.position {
                    CompositePosition::Bottom => format!("\\underset{{{}}}{{{}}}", bottom, main),
                    CompositePosition::Top => format!("\\overset{{{}}}{{{}}}", top, main),
                    CompositePosition::BottomTop => {
                        format!("\\overset{{{}}}{{\\underset{{{}}}{{{}}}}}", top, bottom, main)
                    }
                }
            }
            ConstructKind::SignComposite(t) => {
                let mut out = sign_command(t.sign).to_string();
                if t.limits != LimitPlacement::None {
                    push_script(&mut out, '_', slot(SignCompositeType::LOWER));
                }
                if t.limits == LimitPlacement::LowerUpper {
                    push_script(&mut out, '^', slot(SignCompositeType::UPPER));
                }
                out.push_str(&format!("{{{}}}", slot(SignCompositeType::MAIN)));
                out
            }
            ConstructKind::Script(t) => match t {
                ScriptType::Sub => format!("_{{{}}}", slot(0)),
                ScriptType::Super => format!("^{{{}}}", slot(0)),
                ScriptType::SubSuper => {
                    format!("_{{{}}}^{{{}}}", slot(ScriptType::SUB), slot(ScriptType::SUPER))
                }
            },
            ConstructKind::Matrix(t) => {
                let rows: Vec<String> = (0..t.rows)
                    .map(|r| {
                        (0..t.columns)
                            .map(|c| slot(t.cell(r, c)))
                            .collect::<Vec<_>>()
                            .join(" & ")
                    })
                    .collect();
                format!("\\begin{{matrix}}{}\\end{{matrix}}", rows.join(" \\\\ "))
            }
            ConstructKind::Box(_) => format!("\\boxed{{{}}}", slot(0)),
            ConstructKind::Decorated(t) => {
                let inside = slot(0);
                match (t.decoration, t.effective_position()) {
                    (Decoration::Cross, _) => format!("\\xcancel{{{}}}", inside),
                    (Decoration::StrikeThrough, _) | (_, DecorationPosition::Middle) => {
                        format!("\\cancel{{{}}}", inside)
                    }
                    (Decoration::DoubleBar, DecorationPosition::Top) => {
                        format!("\\overline{{\\overline{{{}}}}}", inside)
                    }
                    (Decoration::DoubleBar, DecorationPosition::Bottom) => {
                        format!("\\underline{{\\underline{{{}}}}}", inside)
                    }
                    (decoration, DecorationPosition::Top) => {
                        format!("{}{{{}}}", top_accent(decoration), inside)
                    }
                    (decoration, DecorationPosition::Bottom) => {
                        format!("{}{{{}}}", bottom_accent(decoration), inside)
                    }
                }
            }
            ConstructKind::Arrow(t) => {
                let command = match t.arrow {
                    ArrowKind::Right => "\\xrightarrow",
                    ArrowKind::Left => "\\xleftarrow",
                    ArrowKind::DoubleHeaded => "\\xleftrightarrow",
                    ArrowKind::RightDouble => "\\xRightarrow",
                    ArrowKind::LeftDouble => "\\xLeftarrow",
                };
                let top = t.top_slot().map_or("", slot);
                let bottom = t.bottom_slot().map_or("", slot);
                if bottom.is_empty() {
                    format!("{}{{{}}}", command, top)
                } else {
                    format!("{}[{}]{{{}}}", command, bottom, top)
                }
            }
        }
    }
}

/// `_{x}` or `^{x}`, omitted when empty
fn push_script(out: &mut String, script: char, content: &str) {
    if !content.is_empty() {
        out.push(script);
        out.push('{');
        out.push_str(content);
        out.push('}');
    }
}

fn delimiter(sign: BracketSign, left: bool) -> &'static str {
    match (sign, left) {
        (BracketSign::Round, true) => "(",
        (BracketSign::Round, false) => ")",
        (BracketSign::Square, true) => "[",
        (BracketSign::Square, false) => "]",
        (BracketSign::Curly, true) => "\\{",
        (BracketSign::Curly, false) => "\\}",
        (BracketSign::Angle, true) => "\\langle",
        (BracketSign::Angle, false) => "\\rangle",
        (BracketSign::Bar, _) => "|",
        (BracketSign::DoubleBar, _) => "\\|",
        (BracketSign::Ceiling, true) => "\\lceil",
        (BracketSign::Ceiling, false) => "\\rceil",
        (BracketSign::Floor, true) => "\\lfloor",
        (BracketSign::Floor, false) => "\\rfloor",
    }
}

fn sign_command(sign: SignKind) -> &'static str {
    match sign {
        SignKind::Sum => "\\sum",
        SignKind::Product => "\\prod",
        SignKind::Coproduct => "\\coprod",
        SignKind::Intersection => "\\bigcap",
        SignKind::Union => "\\bigcup",
        SignKind::Integral => "\\int",
        SignKind::DoubleIntegral => "\\iint",
        SignKind::TripleIntegral => "\\iiint",
        SignKind::ContourIntegral => "\\oint",
        SignKind::SurfaceIntegral => "\\oiint",
        SignKind::VolumeIntegral => "\\oiiint",
    }
}

fn top_accent(decoration: Decoration) -> &'static str {
    match decoration {
        Decoration::Bar | Decoration::DoubleBar => "\\overline",
        Decoration::Tilde => "\\widetilde",
        Decoration::Hat => "\\widehat",
        Decoration::Parenthesis => "\\overparen",
        Decoration::RightArrow => "\\overrightarrow",
        Decoration::LeftArrow => "\\overleftarrow",
        Decoration::DoubleArrow => "\\overleftrightarrow",
        Decoration::Cross => "\\xcancel",
        Decoration::StrikeThrough => "\\cancel",
    }
}

fn bottom_accent(decoration: Decoration) -> &'static str {
    match decoration {
        Decoration::Bar | Decoration::DoubleBar => "\\underline",
        Decoration::Tilde => "\\utilde",
        Decoration::Hat => "\\underhat",
        Decoration::Parenthesis => "\\underparen",
        Decoration::RightArrow => "\\underrightarrow",
        Decoration::LeftArrow => "\\underleftarrow",
        Decoration::DoubleArrow => "\\underleftrightarrow",
        Decoration::Cross => "\\xcancel",
        Decoration::StrikeThrough => "\\cancel",
    }
}

/// Command for characters that cannot appear literally
fn char_command(ch: char) -> Option<&'static str> {
    Some(match ch {
        '{' => "\\{",
        '}' => "\\}",
        '\\' => "\\backslash",
        '#' => "\\#",
        '$' => "\\$",
        '%' => "\\%",
        '&' => "\\&",
        '_' => "\\_",
        '^' => "\\wedge",
        '~' => "\\sim",
        ' ' => "\\ ",
        '\u{2212}' => "-",
        '\u{00D7}' => "\\times",
        '\u{00F7}' => "\\div",
        '\u{00B1}' => "\\pm",
        '\u{2213}' => "\\mp",
        '\u{00B7}' | '\u{22C5}' => "\\cdot",
        '\u{2264}' => "\\leq",
        '\u{2265}' => "\\geq",
        '\u{2260}' => "\\neq",
        '\u{2248}' => "\\approx",
        '\u{2261}' => "\\equiv",
        '\u{221D}' => "\\propto",
        '\u{221E}' => "\\infty",
        '\u{2202}' => "\\partial",
        '\u{2207}' => "\\nabla",
        '\u{2192}' => "\\to",
        '\u{2190}' => "\\leftarrow",
        '\u{21D2}' => "\\Rightarrow",
        '\u{21D4}' => "\\Leftrightarrow",
        '\u{2208}' => "\\in",
        '\u{2209}' => "\\notin",
        '\u{2282}' => "\\subset",
        '\u{2286}' => "\\subseteq",
        '\u{222A}' => "\\cup",
        '\u{2229}' => "\\cap",
        '\u{2205}' => "\\emptyset",
        '\u{2200}' => "\\forall",
        '\u{2203}' => "\\exists",
        '\u{00AC}' => "\\neg",
        '\u{2227}' => "\\land",
        '\u{2228}' => "\\lor",
        '\u{2026}' => "\\ldots",
        '\u{22EF}' => "\\cdots",
        '\u{03B1}' => "\\alpha",
        '\u{03B2}' => "\\beta",
        '\u{03B3}' => "\\gamma",
        '\u{03B4}' => "\\delta",
        '\u{03B5}' => "\\epsilon",
        '\u{03B6}' => "\\zeta",
        '\u{03B7}' => "\\eta",
        '\u{03B8}' => "\\theta",
        '\u{03B9}' => "\\iota",
        '\u{03BA}' => "\\kappa",
        '\u{03BB}' => "\\lambda",
        '\u{03BC}' => "\\mu",
        '\u{03BD}' => "\\nu",
        '\u{03BE}' => "\\xi",
        '\u{03C0}' => "\\pi",
        '\u{03C1}' => "\\rho",
        '\u{03C3}' => "\\sigma",
        '\u{03C4}' => "\\tau",
        '\u{03C5}' => "\\upsilon",
        '\u{03C6}' => "\\phi",
        '\u{03C7}' => "\\chi",
        '\u{03C8}' => "\\psi",
        '\u{03C9}' => "\\omega",
        '\u{0393}' => "\\Gamma",
        '\u{0394}' => "\\Delta",
        '\u{0398}' => "\\Theta",
        '\u{039B}' => "\\Lambda",
        '\u{039E}' => "\\Xi",
        '\u{03A0}' => "\\Pi",
        '\u{03A3}' => "\\Sigma",
        '\u{03A6}' => "\\Phi",
        '\u{03A8}' => "\\Psi",
        '\u{03A9}' => "\\Omega",
        _ => return None,
    })
}
