// input.rs — drag lifecycle: pointer events to horizontal deltas

/// Rectangle (in physical pixels) where a press may start a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRegion {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl InteractionRegion {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        last_x: f64,
    },
}

impl DragPhase {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragPhase::Dragging { .. })
    }

    /// Transition table.
    ///
    /// | state    | event                 | next               | delta          |
    /// |----------|-----------------------|--------------------|----------------|
    /// | Idle     | Press inside region   | Dragging { x }     | -              |
    /// | Idle     | anything else         | Idle               | -              |
    /// | Dragging | Move inside region    | Dragging { x }     | `last_x - x`   |
    /// | Dragging | Move outside region   | Idle               | -              |
    /// | Dragging | Release / Leave       | Idle               | -              |
    /// | Dragging | Press inside region   | Dragging { x }     | -              |
    ///
    /// Moving the pointer right yields a negative delta.
    pub fn on_event(self, event: PointerEvent, region: &InteractionRegion) -> (DragPhase, Option<f64>) {
        match (self, event) {
            (_, PointerEvent::Press { x, y }) if region.contains(x, y) => {
                (DragPhase::Dragging { last_x: x }, None)
            }
            (DragPhase::Dragging { last_x }, PointerEvent::Move { x, y }) => {
                if region.contains(x, y) {
                    (DragPhase::Dragging { last_x: x }, Some(last_x - x))
                } else {
                    (DragPhase::Idle, None)
                }
            }
            (DragPhase::Dragging { .. }, PointerEvent::Release | PointerEvent::Leave) => {
                (DragPhase::Idle, None)
            }
            (phase, _) => (phase, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> InteractionRegion {
        InteractionRegion::from_size(800.0, 600.0)
    }

    fn feed(events: &[PointerEvent]) -> (DragPhase, Vec<f64>) {
        let region = region();
        let mut phase = DragPhase::Idle;
        let mut deltas = Vec::new();
        for &event in events {
            let (next, delta) = phase.on_event(event, &region);
            phase = next;
            deltas.extend(delta);
        }
        (phase, deltas)
    }

    #[test]
    fn move_without_press_is_ignored() {
        let (phase, deltas) = feed(&[
            PointerEvent::Move { x: 10.0, y: 10.0 },
            PointerEvent::Move { x: 50.0, y: 10.0 },
        ]);
        assert_eq!(phase, DragPhase::Idle);
        assert!(deltas.is_empty());
    }

    #[test]
    fn drag_emits_previous_minus_current() {
        let (phase, deltas) = feed(&[
            PointerEvent::Press { x: 100.0, y: 100.0 },
            PointerEvent::Move { x: 110.0, y: 100.0 },
            PointerEvent::Move { x: 105.0, y: 300.0 },
        ]);
        assert_eq!(phase, DragPhase::Dragging { last_x: 105.0 });
        assert_eq!(deltas, vec![-10.0, 5.0]);
        assert!(phase.is_dragging());
    }

    #[test]
    fn release_ends_the_session() {
        let (phase, deltas) = feed(&[
            PointerEvent::Press { x: 100.0, y: 100.0 },
            PointerEvent::Move { x: 90.0, y: 100.0 },
            PointerEvent::Release,
            PointerEvent::Move { x: 10.0, y: 100.0 },
        ]);
        assert_eq!(phase, DragPhase::Idle);
        assert_eq!(deltas, vec![10.0]);
    }

    #[test]
    fn leaving_requires_a_fresh_press() {
        let (phase, deltas) = feed(&[
            PointerEvent::Press { x: 100.0, y: 100.0 },
            PointerEvent::Leave,
            PointerEvent::Move { x: 120.0, y: 100.0 },
            PointerEvent::Press { x: 200.0, y: 100.0 },
            PointerEvent::Move { x: 190.0, y: 100.0 },
        ]);
        assert_eq!(phase, DragPhase::Dragging { last_x: 190.0 });
        assert_eq!(deltas, vec![10.0]);
    }

    #[test]
    fn moving_out_of_the_region_disengages() {
        let (phase, deltas) = feed(&[
            PointerEvent::Press { x: 100.0, y: 100.0 },
            PointerEvent::Move { x: 900.0, y: 100.0 },
            PointerEvent::Move { x: 100.0, y: 100.0 },
        ]);
        assert_eq!(phase, DragPhase::Idle);
        assert!(deltas.is_empty());
    }

    #[test]
    fn press_outside_the_region_does_not_engage() {
        let (phase, deltas) = feed(&[
            PointerEvent::Press { x: 100.0, y: 700.0 },
            PointerEvent::Move { x: 50.0, y: 100.0 },
        ]);
        assert_eq!(phase, DragPhase::Idle);
        assert!(deltas.is_empty());
    }

    #[test]
    fn release_while_idle_is_a_no_op() {
        let (phase, _) = feed(&[PointerEvent::Release, PointerEvent::Leave]);
        assert_eq!(phase, DragPhase::Idle);
    }
}
