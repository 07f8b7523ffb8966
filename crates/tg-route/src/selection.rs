//! Two-click origin/destination selection over grid cells.
//!
//! ```text
//!            click X                 click Y ≠ X
//!   Empty ───────────► Origin(X) ─────────────────► Pair(X, Y)
//!     ▲                   │                             │
//!     └───── click X ─────┘        click Z: Origin(Z) ◄─┘
//! ```

use tg_core::{CellId, LonLat};
use tg_grid::GridFeature;

/// A selected grid cell and the point routed from / to (its centre).
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedCell {
    pub id:    CellId,
    pub point: LonLat,
}

impl SelectedCell {
    pub fn from_feature(feature: &GridFeature) -> Self {
        Self { id: feature.id.clone(), point: feature.center() }
    }
}

/// What a click did to the selection.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionEvent {
    /// A new origin is set; any previous pair is gone.
    OriginSet(SelectedCell),
    /// The origin was clicked again and is now deselected.
    Cleared,
    /// The pair is complete.
    Completed { origin: SelectedCell, destination: SelectedCell },
}

#[derive(Clone, Debug, Default, PartialEq)]
enum State {
    #[default]
    Empty,
    Origin(SelectedCell),
    Pair(SelectedCell, SelectedCell),
}

#[derive(Clone, Debug, Default)]
pub struct PointSelection {
    state: State,
}

impl PointSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, cell: SelectedCell) -> SelectionEvent {
        let state = std::mem::take(&mut self.state);
        let (next, event) = match state {
            State::Origin(origin) if origin.id == cell.id => (State::Empty, SelectionEvent::Cleared),
            State::Origin(origin) => {
                let event = SelectionEvent::Completed { origin: origin.clone(), destination: cell.clone() };
                (State::Pair(origin, cell), event)
            }
            State::Empty | State::Pair(..) => {
                (State::Origin(cell.clone()), SelectionEvent::OriginSet(cell))
            }
        };
        self.state = next;
        event
    }

    pub fn clear(&mut self) {
        self.state = State::Empty;
    }

    pub fn origin(&self) -> Option<&SelectedCell> {
        match &self.state {
            State::Empty => None,
            State::Origin(o) | State::Pair(o, _) => Some(o),
        }
    }

    pub fn destination(&self) -> Option<&SelectedCell> {
        match &self.state {
            State::Pair(_, d) => Some(d),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Pair(..))
    }
}
