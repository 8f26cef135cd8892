//! Drag-to-select state machine for region capture.

use crate::coords::{ContainerPoint, SelectionRect};
use crate::error::SelectionRejected;
use crate::overlay::OverlayDescriptor;

/// Default minimum selection width and height, in container pixels.
pub const MIN_SELECTION_SIZE: f64 = 10.0;

/// Current state of the selector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectorState {
    /// Waiting for a pointer press.
    #[default]
    Idle,
    /// A drag is in progress.
    Dragging {
        /// Where the pointer went down.
        start: ContainerPoint,
        /// Latest pointer position.
        current: ContainerPoint,
    },
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// The drag produced a usable rectangle.
    Committed(SelectionRect),
    /// The drag was too small and has been discarded.
    Cancelled(SelectionRejected),
    /// No drag was in progress.
    Ignored,
}

/// Pointer-driven region selector.
///
/// Committed and cancelled drags both return the selector to
/// [`SelectorState::Idle`] with no overlay.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    enabled: bool,
    state: SelectorState,
    min_size: f64,
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new(MIN_SELECTION_SIZE)
    }
}

impl RegionSelector {
    pub fn new(min_size: f64) -> Self {
        Self {
            enabled: false,
            state: SelectorState::Idle,
            min_size,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectorState::Dragging { .. })
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Make the selector respond to pointer input. Always starts clean.
    pub fn enter_selection_mode(&mut self) {
        self.enabled = true;
        self.state = SelectorState::Idle;
    }

    /// Stop responding to pointer input.
    ///
    /// Returns true if an in-progress drag was cancelled.
    pub fn exit_selection_mode(&mut self) -> bool {
        let cancelled = self.cancel();
        self.enabled = false;
        cancelled
    }

    /// Abandon an in-progress drag, keeping selection mode as it is.
    ///
    /// Returns true if there was a drag to cancel.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = SelectorState::Idle;
        was_dragging
    }

    /// Begin a drag. Ignored unless selection mode is on and no drag is active.
    pub fn pointer_down(&mut self, position: ContainerPoint) -> bool {
        if !self.enabled || self.is_dragging() {
            return false;
        }
        self.state = SelectorState::Dragging {
            start: position,
            current: position,
        };
        true
    }

    /// Track the pointer during a drag and return the updated overlay.
    pub fn pointer_move(&mut self, position: ContainerPoint) -> Option<OverlayDescriptor> {
        if let SelectorState::Dragging { current, .. } = &mut self.state {
            *current = position;
        }
        self.overlay()
    }

    /// Finish a drag.
    pub fn pointer_up(&mut self, position: ContainerPoint) -> SelectionOutcome {
        let SelectorState::Dragging { start, .. } = self.state else {
            return SelectionOutcome::Ignored;
        };
        self.state = SelectorState::Idle;

        let rect = SelectionRect::from_corners(start, position);
        if rect.width < self.min_size || rect.height < self.min_size {
            log::debug!(
                "Selection {:.0}x{:.0} below threshold, discarded",
                rect.width,
                rect.height
            );
            return SelectionOutcome::Cancelled(SelectionRejected {
                width: rect.width,
                height: rect.height,
                min: self.min_size,
            });
        }
        SelectionOutcome::Committed(rect)
    }

    /// Transient rubber-band overlay, present only while dragging.
    pub fn overlay(&self) -> Option<OverlayDescriptor> {
        match self.state {
            SelectorState::Dragging { start, current } => Some(OverlayDescriptor::selection_box(
                SelectionRect::from_corners(start, current),
            )),
            SelectorState::Idle => None,
        }
    }
}
