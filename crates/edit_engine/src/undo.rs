//! Undo/redo log with grouped actions
//!
//! The log keeps two stacks of actions. Adding an action invalidates the redo
//! history. Undo and redo move one logical group from one stack to the other,
//! replaying each member through an [`ActionExecutor`] and flipping its
//! direction flag. A group is the top action plus the `further_undo_count`
//! actions beneath it.

use crate::{EditError, Result};

/// Default number of actions kept on the undo stack
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// A recorded, reversible edit
pub trait UndoAction {
    /// Number of actions below this one that undo and redo with it
    fn further_undo_count(&self) -> usize;

    fn set_further_undo_count(&mut self, count: usize);

    /// True when replaying the action reverses it, false when it reapplies it
    fn undo_flag(&self) -> bool;

    fn set_undo_flag(&mut self, flag: bool);

    /// Short name for logging
    fn name(&self) -> &'static str {
        "action"
    }
}

/// Applies recorded actions.
///
/// `process_undo` reverses the action when its undo flag is set and
/// reapplies it otherwise. It must not fail: a replay that cannot be carried
/// out means the history and the document disagree, which is a bug.
pub trait ActionExecutor<A> {
    fn process_undo(&mut self, action: &A);
}

/// Availability change reported to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStateChange {
    CanUndo(bool),
    CanRedo(bool),
}

type Listener = Box<dyn FnMut(UndoStateChange)>;

/// Two-stack undo history
pub struct UndoLog<A> {
    /// Actions that can be undone, most recent last
    undo_stack: Vec<A>,
    /// Actions that can be redone, most recently undone last
    redo_stack: Vec<A>,
    /// Maximum number of undo entries
    max_entries: usize,
    /// Set by callers that must not be recorded (document loading)
    disabled: bool,
    /// Set while a group is being replayed
    replaying: bool,
    listeners: Vec<Listener>,
}

impl<A: UndoAction> UndoLog<A> {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }

    /// Create with a custom undo stack limit
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            disabled: false,
            replaying: false,
            listeners: Vec::new(),
        }
    }

    /// Register a callback for undo/redo availability changes
    pub fn on_state_change(&mut self, listener: impl FnMut(UndoStateChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Record an action.
    ///
    /// Ignored while disabled or while a replay is running.
    pub fn add(&mut self, mut action: A) {
        if self.disabled || self.replaying {
            tracing::trace!(action = action.name(), "undo recording suppressed");
            return;
        }

        let before = self.availability();
        action.set_undo_flag(true);
        self.redo_stack.clear();
        self.undo_stack.push(action);
        self.enforce_limit();
        self.notify(before);
    }

    /// Group the most recent action with the `count` actions below it
    pub fn change_undo_count_of_last_action(&mut self, count: usize) {
        if let Some(last) = self.undo_stack.last_mut() {
            last.set_further_undo_count(count);
        }
    }

    /// Undo the most recent group. Returns false when there was nothing to undo.
    pub fn undo<E: ActionExecutor<A>>(&mut self, executor: &mut E) -> bool {
        self.replay(executor, true)
    }

    /// Redo the most recently undone group. Returns false when there was nothing to redo.
    pub fn redo<E: ActionExecutor<A>>(&mut self, executor: &mut E) -> bool {
        self.replay(executor, false)
    }

    /// Undo, reporting an empty stack as an error
    pub fn try_undo<E: ActionExecutor<A>>(&mut self, executor: &mut E) -> Result<()> {
        if self.undo(executor) {
            Ok(())
        } else {
            Err(EditError::UndoStackEmpty)
        }
    }

    /// Redo, reporting an empty stack as an error
    pub fn try_redo<E: ActionExecutor<A>>(&mut self, executor: &mut E) -> Result<()> {
        if self.redo(executor) {
            Ok(())
        } else {
            Err(EditError::RedoStackEmpty)
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The action the next undo would start with
    pub fn last_action(&self) -> Option<&A> {
        self.undo_stack.last()
    }

    /// Stop or resume recording
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// True while a group is being replayed
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        let before = self.availability();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify(before);
    }

    fn replay<E: ActionExecutor<A>>(&mut self, executor: &mut E, undoing: bool) -> bool {
        let before = self.availability();
        let source = if undoing {
            &mut self.undo_stack
        } else {
            &mut self.redo_stack
        };

        let Some(first) = source.pop() else {
            return false;
        };
        let further = first.further_undo_count();
        let mut group = vec![first];
        for _ in 0..further {
            match source.pop() {
                Some(action) => group.push(action),
                None => break,
            }
        }

        tracing::debug!(
            action = group[0].name(),
            group_size = group.len(),
            direction = if undoing { "undo" } else { "redo" },
            "replaying undo group"
        );

        self.replaying = true;
        for action in &mut group {
            executor.process_undo(action);
            let flag = action.undo_flag();
            action.set_undo_flag(!flag);
        }
        self.replaying = false;

        // The group lands in reverse order; the new top carries the count.
        let size = group.len();
        let target = if undoing {
            &mut self.redo_stack
        } else {
            &mut self.undo_stack
        };
        for (index, mut action) in group.into_iter().enumerate() {
            let count = if index + 1 == size { size - 1 } else { 0 };
            action.set_further_undo_count(count);
            target.push(action);
        }

        self.notify(before);
        true
    }

    /// Drop whole groups from the bottom until the stack fits. The newest
    /// group is kept even when it alone is over the limit.
    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.max_entries {
            let bottom = self.bottom_group_len();
            if bottom == self.undo_stack.len() {
                break;
            }
            self.undo_stack.drain(..bottom);
        }
    }

    fn bottom_group_len(&self) -> usize {
        let mut end = self.undo_stack.len();
        let mut size = 0;
        while end > 0 {
            size = (self.undo_stack[end - 1].further_undo_count() + 1).min(end);
            end -= size;
        }
        size
    }

    fn availability(&self) -> (bool, bool) {
        (self.can_undo(), self.can_redo())
    }

    fn notify(&mut self, before: (bool, bool)) {
        let (can_undo, can_redo) = self.availability();
        let mut changes = Vec::new();
        if before.0 != can_undo {
            changes.push(UndoStateChange::CanUndo(can_undo));
        }
        if before.1 != can_redo {
            changes.push(UndoStateChange::CanRedo(can_redo));
        }
        for change in changes {
            for listener in &mut self.listeners {
                listener(change);
            }
        }
    }
}

impl<A: UndoAction> Default for UndoLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    struct Push {
        value: i32,
        further: usize,
        undo_flag: bool,
    }

    impl Push {
        fn new(value: i32) -> Self {
            Self {
                value,
                further: 0,
                undo_flag: true,
            }
        }
    }

    impl UndoAction for Push {
        fn further_undo_count(&self) -> usize {
            self.further
        }

        fn set_further_undo_count(&mut self, count: usize) {
            self.further = count;
        }

        fn undo_flag(&self) -> bool {
            self.undo_flag
        }

        fn set_undo_flag(&mut self, flag: bool) {
            self.undo_flag = flag;
        }
    }

    /// A list of numbers edited by pushing values
    #[derive(Default)]
    struct Numbers {
        values: Vec<i32>,
    }

    impl ActionExecutor<Push> for Numbers {
        fn process_undo(&mut self, action: &Push) {
            if action.undo_flag() {
                assert_eq!(self.values.pop(), Some(action.value));
            } else {
                self.values.push(action.value);
            }
        }
    }

    fn apply(log: &mut UndoLog<Push>, numbers: &mut Numbers, value: i32) {
        numbers.values.push(value);
        log.add(Push::new(value));
    }

    #[test]
    fn test_undo_redo_single() {
        let mut log = UndoLog::new();
        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        apply(&mut log, &mut numbers, 2);

        assert!(log.undo(&mut numbers));
        assert_eq!(numbers.values, vec![1]);
        assert!(log.can_redo());

        assert!(log.redo(&mut numbers));
        assert_eq!(numbers.values, vec![1, 2]);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut log: UndoLog<Push> = UndoLog::new();
        let mut numbers = Numbers::default();
        assert!(!log.undo(&mut numbers));
        assert!(!log.redo(&mut numbers));
        assert_eq!(log.try_undo(&mut numbers), Err(EditError::UndoStackEmpty));
        assert_eq!(log.try_redo(&mut numbers), Err(EditError::RedoStackEmpty));
    }

    #[test]
    fn test_add_clears_redo() {
        let mut log = UndoLog::new();
        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        log.undo(&mut numbers);
        assert!(log.can_redo());

        apply(&mut log, &mut numbers, 5);
        assert!(!log.can_redo());
        assert_eq!(log.undo_len(), 1);
    }

    #[test]
    fn test_grouped_undo_and_redo() {
        let mut log = UndoLog::new();
        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        apply(&mut log, &mut numbers, 2);
        apply(&mut log, &mut numbers, 3);
        log.change_undo_count_of_last_action(1);

        log.undo(&mut numbers);
        assert_eq!(numbers.values, vec![1]);
        assert_eq!(log.redo_len(), 2);

        log.redo(&mut numbers);
        assert_eq!(numbers.values, vec![1, 2, 3]);

        // The group survives a second round trip
        log.undo(&mut numbers);
        assert_eq!(numbers.values, vec![1]);
        log.undo(&mut numbers);
        assert!(numbers.values.is_empty());
        assert!(!log.can_undo());
    }

    #[test]
    fn test_disabled_log_records_nothing() {
        let mut log = UndoLog::new();
        log.set_enabled(false);
        log.add(Push::new(1));
        assert!(!log.can_undo());

        log.set_enabled(true);
        log.add(Push::new(1));
        assert!(log.can_undo());
    }

    #[test]
    fn test_state_change_notifications() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = UndoLog::new();
        let sink = Rc::clone(&seen);
        log.on_state_change(move |change| sink.borrow_mut().push(change));

        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        apply(&mut log, &mut numbers, 2);
        log.undo(&mut numbers);
        log.undo(&mut numbers);

        assert_eq!(
            *seen.borrow(),
            vec![
                UndoStateChange::CanUndo(true),
                UndoStateChange::CanRedo(true),
                UndoStateChange::CanUndo(false),
            ]
        );
    }

    #[test]
    fn test_limit_drops_oldest_group() {
        let mut log = UndoLog::with_limit(3);
        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        apply(&mut log, &mut numbers, 2);
        log.change_undo_count_of_last_action(1);
        apply(&mut log, &mut numbers, 3);
        apply(&mut log, &mut numbers, 4);

        // The [1, 2] group is evicted as a whole
        assert_eq!(log.undo_len(), 2);
        log.undo(&mut numbers);
        log.undo(&mut numbers);
        assert_eq!(numbers.values, vec![1, 2]);
        assert!(!log.can_undo());
    }

    #[test]
    fn test_newest_group_survives_limit() {
        let mut log = UndoLog::with_limit(0);
        let mut numbers = Numbers::default();
        apply(&mut log, &mut numbers, 1);
        assert!(log.can_undo());

        apply(&mut log, &mut numbers, 2);
        assert_eq!(log.undo_len(), 1);
        assert!(log.undo(&mut numbers));
        assert_eq!(numbers.values, vec![1]);
        assert!(!log.can_undo());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn undo_all_then_redo_all_restores(values in proptest::collection::vec(-50i32..50, 0..30)) {
                let mut log = UndoLog::new();
                let mut numbers = Numbers::default();
                for value in &values {
                    apply(&mut log, &mut numbers, *value);
                }

                while log.undo(&mut numbers) {}
                prop_assert!(numbers.values.is_empty());

                while log.redo(&mut numbers) {}
                prop_assert_eq!(&numbers.values, &values);
            }
        }
    }
}
