//! Function-pointer finite state machine engine for roam execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌───────────┬───────────┬──────────┬───────────────────┐    │
//! │  │ StateId   │ on_enter  │ on_exit  │ on_update         │    │
//! │  ├───────────┼───────────┼──────────┼───────────────────┤    │
//! │  │ Idle      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │    │
//! │  │ Roaming   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │    │
//! │  │ Verifying │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  │ Connected │ fn(ctx)   │ -        │ fn(ctx)->Option<> │    │
//! │  │ Failed    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │    │
//! │  └───────────┴───────────┴──────────┴───────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut RoamContext`, which
//! holds the station handle, the request and the progress so far.

pub mod context;
pub mod states;

use context::RoamContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every state a roam can be in.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Roaming = 1,
    Verifying = 2,
    Connected = 3,
    Failed = 4,
}

impl StateId {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `StateId`.  Out-of-range indices assert in
    /// debug builds and map to `Failed` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Roaming,
            2 => Self::Verifying,
            3 => Self::Connected,
            4 => Self::Failed,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Failed
            }
        }
    }

    /// No transitions leave a terminal state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut RoamContext<'_>);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut RoamContext<'_>) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the visited path; the [`RoamContext`] is
/// threaded through every handler call by the caller.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    /// Every state entered, starting with the initial one.
    visited: Vec<StateId>,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            visited: vec![initial],
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut RoamContext<'_>) {
        info!(
            "roam to {}: starting in {}",
            ctx.target(),
            self.table[self.current].name
        );
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick: run `on_update` for the current state and
    /// follow the transition it asks for, if any.
    pub fn tick(&mut self, ctx: &mut RoamContext<'_>) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Jump to `next` regardless of what `on_update` would return.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut RoamContext<'_>) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn visited(&self) -> &[StateId] {
        &self.visited
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut RoamContext<'_>) {
        let next_idx = next_id as usize;

        info!(
            "roam to {}: {} -> {}",
            ctx.target(),
            self.table[self.current].name,
            self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.visited.push(next_id);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
