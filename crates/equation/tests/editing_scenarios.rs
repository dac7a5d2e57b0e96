//! Integration tests for editing through the equation root
//!
//! These tests drive an [`EquationRoot`] the way a UI would (typing, inserting
//! constructs, arrow keys, clipboard) and check layout, LaTeX output, undo
//! state and the format table afterwards.

use equation::construct::{
    ArrowKind, ArrowPosition, ArrowType, BoxType, BracketSign, BracketType, CompositePosition,
    CompositeType, DecoratedType, Decoration, DecorationPosition, DivisionStyle, DivisionType,
    HorizontalBracketSign,
    HorizontalBracketType, HorizontalPosition, LimitPlacement, MatrixType, RadicalType, ScriptType,
    SignCompositeType, SignKind,
};
use equation::geometry::MathFontMetrics;
use equation::{Color, ConstructKind, EquationRoot, Key, KeyEvent, RowItem};
use text_engine::{ApproxMeasurer, FontWeight};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn new_root() -> EquationRoot {
    init_tracing();
    EquationRoot::new(Box::new(ApproxMeasurer::new()))
}

fn all_kinds() -> Vec<ConstructKind> {
    vec![
        ConstructKind::Division(DivisionType::new(DivisionStyle::Regular, false)),
        ConstructKind::Division(DivisionType::new(DivisionStyle::Horizontal, true)),
        ConstructKind::Radical(RadicalType::SquareRoot),
        ConstructKind::Radical(RadicalType::NRoot),
        ConstructKind::Bracket(BracketType::both(BracketSign::Round)),
        ConstructKind::Bracket(BracketType::new(Some(BracketSign::Curly), None)),
        ConstructKind::HorizontalBracket(HorizontalBracketType::new(
            HorizontalBracketSign::Curly,
            HorizontalPosition::Bottom,
        )),
        ConstructKind::Composite(CompositeType::new(CompositePosition::BottomTop, true)),
        ConstructKind::SignComposite(SignCompositeType::new(
            SignKind::Sum,
            LimitPlacement::LowerUpper,
        )),
        ConstructKind::SignComposite(SignCompositeType::new(
            SignKind::Integral,
            LimitPlacement::LowerUpper,
        )),
        ConstructKind::Script(ScriptType::Sub),
        ConstructKind::Script(ScriptType::SubSuper),
        ConstructKind::Matrix(MatrixType::new(2, 3)),
        ConstructKind::Box(BoxType::All),
        ConstructKind::Decorated(DecoratedType::new(Decoration::Hat, DecorationPosition::Top)),
        ConstructKind::Decorated(DecoratedType::new(Decoration::Cross, DecorationPosition::Middle)),
        ConstructKind::Arrow(ArrowType::new(ArrowKind::Right, ArrowPosition::BottomAndTop)),
    ]
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_siblings_share_a_baseline() {
    for kind in all_kinds() {
        let mut root = new_root();
        root.type_text("a");
        root.insert_construct(kind);
        root.type_text("xy");

        let row = root.body().line(0);
        let baseline = row.geometry().baseline();
        for item in row.items() {
            let g = item.geometry();
            assert!(
                (g.top + g.ref_y - baseline).abs() < 1e-3,
                "{} item off the row baseline",
                kind.type_name()
            );
        }
    }
}

#[test]
fn test_square_root_with_subscript() {
    let mut root = new_root();
    root.insert_construct(ConstructKind::Radical(RadicalType::SquareRoot));
    root.type_text("x+1");
    assert!(root.consume_key(KeyEvent::new(Key::Right)));
    root.insert_construct(ConstructKind::Script(ScriptType::Sub));
    root.type_text("2");

    let row = root.body().line(0);
    let radical = match row.construct(1) {
        Some(construct) => construct,
        None => panic!("expected the radical at item 1"),
    };
    assert_eq!(radical.type_name(), "Radical");
    assert_eq!(row.construct(3).map(|c| c.type_name()), Some("Script"));

    let inside = radical.slots()[RadicalType::INSIDE].geometry();
    let g = radical.geometry();
    let metrics = MathFontMetrics::for_size(20.0);
    let extra = metrics.radical_gap + metrics.rule_thickness;
    assert!(g.height >= inside.height + extra - 1e-3);
    assert!((g.ref_y - (inside.ref_y + extra)).abs() < 1e-3);

    assert_eq!(root.to_latex(), "\\sqrt{x+1}_{2}");
}

#[test]
fn test_render_covers_every_construct() {
    let mut root = new_root();
    for kind in all_kinds() {
        root.insert_construct(kind);
        root.type_text("1");
        // Walk out of the construct; nesting the next one is fine too
        for _ in 0..12 {
            if root.body().active_row().active_item().is_none() {
                break;
            }
            root.consume_key(KeyEvent::new(Key::End));
            root.consume_key(KeyEvent::new(Key::Right));
        }
    }
    let output = root.render();
    assert!(output
        .primitives
        .iter()
        .any(|p| matches!(p, equation::RenderPrimitive::Text { text, .. } if text == "1")));
    assert!(output.bounds.width() > 0.0);
}

// =============================================================================
// Undo
// =============================================================================

#[test]
fn test_matrix_insert_then_undo() {
    let mut root = new_root();
    root.insert_construct(ConstructKind::Matrix(MatrixType::new(2, 2)));
    assert_eq!(root.body().line(0).constructs().count(), 1);

    assert!(root.undo());
    assert_eq!(root.body().line(0).constructs().count(), 0);
    assert!(!root.can_undo());
    assert!(root.can_redo());
}

#[test]
fn test_typing_inside_construct_undoes_in_order() {
    let mut root = new_root();
    let fraction = DivisionType::new(DivisionStyle::Regular, false);
    root.insert_construct(ConstructKind::Division(fraction));
    root.type_text("1");
    assert!(root.consume_key(KeyEvent::new(Key::Down)));
    root.type_text("2");
    assert_eq!(root.to_latex(), "\\frac{1}{2}");

    assert!(root.undo());
    assert_eq!(root.to_latex(), "\\frac{1}{}");
    assert!(root.undo());
    assert!(root.undo());
    assert_eq!(root.to_latex(), "");

    while root.redo() {}
    assert_eq!(root.to_latex(), "\\frac{1}{2}");
}

// =============================================================================
// Clipboard
// =============================================================================

#[test]
fn test_paste_merges_formats() {
    let mut source = new_root();
    source.type_text("abc");
    source.select(1, 2).unwrap();
    assert!(source.set_color(Color::RED));
    source.select(2, 3).unwrap();
    assert!(source.set_font_weight(FontWeight::Bold));
    source.select_all();
    let data = match source.copy().unwrap() {
        Some(data) => data,
        None => panic!("selection should copy"),
    };

    let mut target = new_root();
    target.type_text("q");
    target.select(0, 1).unwrap();
    assert!(target.set_color(Color::RED));
    assert_eq!(target.formats().len(), 2);

    target.set_caret(1).unwrap();
    target.paste(&data).unwrap();
    assert_eq!(target.formats().len(), 3);
    assert_eq!(target.body().text(), "qabc");

    let run = match &target.body().line(0).items()[0] {
        RowItem::Text(run) => run.clone(),
        RowItem::Construct(_) => panic!("expected a text run"),
    };
    let formats = target.formats();
    let pasted: Vec<_> = run.formats()[1..].iter().map(|id| formats.get(*id).clone()).collect();
    assert_eq!(pasted[0].color, Color::BLACK);
    assert_eq!(pasted[1].color, Color::RED);
    assert_eq!(pasted[2].font_weight, FontWeight::Bold);
    assert_eq!(run.formats()[0], run.formats()[2]);
}

#[test]
fn test_paste_replaces_selection_as_one_step() {
    let mut source = new_root();
    source.insert_construct(ConstructKind::Script(ScriptType::Super));
    source.type_text("n");
    source.consume_key(KeyEvent::new(Key::Right));
    source.select_all();
    let data = source.copy().unwrap().unwrap();

    let mut target = new_root();
    target.type_text("xyz");
    target.select(1, 2).unwrap();
    target.paste(&data).unwrap();
    assert_eq!(target.to_latex(), "x^{n}z");

    assert!(target.undo());
    assert_eq!(target.to_latex(), "xyz");
    assert_eq!(target.caret_row().selection(), Some((1, 2)));
}

#[test]
fn test_paste_into_script_rescales() {
    let mut source = new_root();
    source.type_text("k");
    source.select_all();
    let data = source.copy().unwrap().unwrap();

    let mut target = new_root();
    target.insert_construct(ConstructKind::Script(ScriptType::Sub));
    target.paste(&data).unwrap();

    let slot_row = target.caret_row();
    let size = slot_row.font_size();
    assert!(size < 20.0);
    let run = match &slot_row.items()[0] {
        RowItem::Text(run) => run.clone(),
        RowItem::Construct(_) => panic!("expected a text run"),
    };
    assert!((target.formats().get(run.formats()[0]).font_size - size).abs() < 0.05);
}
