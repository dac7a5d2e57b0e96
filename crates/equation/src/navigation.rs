//! Navigation - key and click negotiation across the node tree
//!
//! Exactly one row in the tree holds the caret. It is found by following the
//! active pointers from the body container: active line, then the row's
//! active construct (if any), then that construct's active slot, and so on.
//!
//! A key event is offered to the deepest node of that chain first. Each
//! level answers with an [`Outcome`]: it either handled the event, moved
//! focus to one of its own children, or passed the event up to its parent.
//! An event that bubbles out of the body container is discarded.

use crate::construct::Construct;
use crate::container::RowContainer;
use crate::geometry::Point;
use crate::row::Row;

/// Keys the navigation protocol understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Backspace,
    Delete,
    Enter,
}

/// A key press with its modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Answer of one level of the tree to an offered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event was consumed here
    Handled,
    /// Focus moved to the child with this index (line, item or slot)
    TransferTo(usize),
    /// Not for this level; offer it to the parent
    Bubble,
}

impl Outcome {
    pub fn is_bubble(&self) -> bool {
        matches!(self, Outcome::Bubble)
    }
}

/// Vertical direction of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// Where the caret lands when focus enters a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry {
    Start,
    End,
    /// Coming from above or below, keeping the caret's x position
    AtX(f32, VerticalDirection),
}

impl Entry {
    /// Entry matching a transfer caused by `key`
    pub fn for_key(key: Key, caret_x: f32) -> Self {
        match key {
            Key::Left => Entry::End,
            Key::Up => Entry::AtX(caret_x, VerticalDirection::Up),
            Key::Down => Entry::AtX(caret_x, VerticalDirection::Down),
            _ => Entry::Start,
        }
    }
}

/// A node on the active chain
pub enum NodeMut<'a> {
    Container(&'a mut RowContainer),
    Row(&'a mut Row),
    Construct(&'a mut Construct),
}

/// Depth of the caret row on the active chain; the body container is depth 0
pub fn active_depth(body: &RowContainer) -> usize {
    let mut depth = 1;
    let mut row = body.active_row();
    while let Some(construct) = row.active_construct() {
        row = construct.active_slot().active_row();
        depth += 3;
    }
    depth
}

/// The row holding the caret
pub fn caret_row(body: &RowContainer) -> &Row {
    let mut row = body.active_row();
    while let Some(construct) = row.active_construct() {
        row = construct.active_slot().active_row();
    }
    row
}

/// Mutable access to the caret row
pub fn caret_row_mut(body: &mut RowContainer) -> &mut Row {
    let mut row = body.active_row_mut();
    while row.active_construct().is_some() {
        row = match row.active_construct_mut() {
            Some(construct) => construct.active_slot_mut().active_row_mut(),
            None => unreachable!("active construct vanished"),
        };
    }
    row
}

/// The node at `depth` on the active chain
pub fn node_at_depth(body: &mut RowContainer, depth: usize) -> NodeMut<'_> {
    let mut container = body;
    let mut remaining = depth;
    loop {
        if remaining == 0 {
            return NodeMut::Container(container);
        }
        let row = container.active_row_mut();
        if remaining == 1 {
            return NodeMut::Row(row);
        }
        let construct = match row.active_construct_mut() {
            Some(construct) => construct,
            None => panic!("active chain ends before depth {}", depth),
        };
        if remaining == 2 {
            return NodeMut::Construct(construct);
        }
        container = construct.active_slot_mut();
        remaining -= 3;
    }
}

/// Offer a navigation key to the active chain, deepest node first.
///
/// Returns false when no level claimed the event.
pub fn consume_key(body: &mut RowContainer, event: KeyEvent) -> bool {
    let deepest = active_depth(body);
    let caret_x = caret_row(body).caret_location().x;

    for depth in (0..=deepest).rev() {
        let from_child = depth != deepest;
        let outcome = match node_at_depth(body, depth) {
            NodeMut::Container(container) => container.handle_key(event, caret_x),
            NodeMut::Row(row) => row.handle_key(event, from_child),
            NodeMut::Construct(construct) => construct.handle_key(event, caret_x),
        };
        tracing::trace!(depth, ?event, ?outcome, "navigation");
        if !outcome.is_bubble() {
            return true;
        }
    }
    tracing::trace!(?event, "navigation event discarded");
    false
}

/// Put the caret at a clicked point. Returns false for clicks outside the body.
pub fn consume_mouse_click(body: &mut RowContainer, point: Point) -> bool {
    if !body.geometry().contains(point) {
        return false;
    }
    body.consume_mouse_click(point);
    true
}
