//! # Transition Table
//!
//! Maps a record's (type, action) pair to the ordered steps applied to it.
//! An edit is the composite `Remove → Install`; the record is retired once,
//! after the last step.

use bridge_types::{EntityKind, QueueAction};

/// Single side effect applied to a record's entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Drop the cache record and its schedule membership.
    Remove,
    /// Write the cache record, joining the schedule set when local.
    Install,
    /// Push the entity to the sink.
    Publish,
}

/// Transition selected for a queue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Remove,
    Replace,
    Install,
    Publish,
}

impl Transition {
    /// Look up the transition. `None` for pairs with no behavior
    /// (a reaction has nothing to publish).
    pub fn select(kind: EntityKind, action: QueueAction) -> Option<Self> {
        match (kind, action) {
            (_, QueueAction::Delete) => Some(Transition::Remove),
            (_, QueueAction::Edit) => Some(Transition::Replace),
            (_, QueueAction::Create) => Some(Transition::Install),
            (EntityKind::Monitor, QueueAction::Sink) => Some(Transition::Publish),
            (EntityKind::Reaction, QueueAction::Sink) => None,
        }
    }

    pub fn steps(self) -> &'static [Step] {
        match self {
            Transition::Remove => &[Step::Remove],
            Transition::Replace => &[Step::Remove, Step::Install],
            Transition::Install => &[Step::Install],
            Transition::Publish => &[Step::Publish],
        }
    }

    /// Whether the transition ends with a fresh cache record.
    pub fn installs(self) -> bool {
        self.steps().last() == Some(&Step::Install)
    }
}
