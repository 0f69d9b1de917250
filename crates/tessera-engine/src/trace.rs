//! Trace events emitted while the engine searches.

use tessera_core::Move;

/// One event of the search trace, in the order the engine produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// The engine entered a new node.
    NodeCreated,
    /// `mv` became the best move found so far at `level`.
    ///
    /// `level` is 1 at the root ply. The first move searched at a node is
    /// always marked; later moves are marked only when they improve on it.
    BestMoveSoFar {
        /// Ply of the node whose best move changed, 1 at the root.
        level: u8,
        /// The move now considered best at that node.
        mv: Move,
        /// Backed-up search score for the side that played `mv`.
        raw_score: i32,
        /// Material balance after `mv`, for the side that played it.
        material_delta: i32,
        /// Board control balance after `mv`, for the side that played it.
        board_control_delta: i32,
    },
}

/// The event log of one engine invocation.
///
/// `NodeCreated` events only feed the node counter; everything else is kept
/// in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    events: Vec<TraceEvent>,
    nodes: u64,
}

impl Trace {
    /// An empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace holding exactly `events`.
    pub fn from_events(events: Vec<TraceEvent>) -> Self {
        let mut trace = Self::new();
        for event in events {
            trace.record(event);
        }
        trace
    }

    /// Append one event.
    pub fn record(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::NodeCreated => self.nodes += 1,
            TraceEvent::BestMoveSoFar { .. } => self.events.push(event),
        }
    }

    /// Retained events in chronological order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of nodes created.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Whether any best-move event was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
