// viewer.rs — interaction state threaded through every update

use crate::accumulator::AngleAccumulator;
use crate::input::{DragPhase, InteractionRegion, PointerEvent};
use crate::mapper::{resolve_view, slot_width, OffsetPolicy, ResolvedView};
use std::num::NonZeroUsize;

/// Everything the drag → view pipeline needs, as one value.
///
/// Each update consumes the state and hands back the next one, together with
/// the view to apply when the rotation changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub drag: DragPhase,
    pub rotation: AngleAccumulator,
    pub image_count: NonZeroUsize,
    pub offset_policy: OffsetPolicy,
}

impl ViewerState {
    pub fn new(image_count: NonZeroUsize, sensitivity: f64, offset_policy: OffsetPolicy) -> Self {
        Self {
            drag: DragPhase::Idle,
            rotation: AngleAccumulator::new(sensitivity),
            image_count,
            offset_policy,
        }
    }

    pub fn resolved(&self) -> ResolvedView {
        resolve_view(self.rotation.angle(), self.image_count, self.offset_policy)
    }

    pub fn on_pointer(
        mut self,
        event: PointerEvent,
        region: &InteractionRegion,
    ) -> (Self, Option<ResolvedView>) {
        let (drag, delta) = self.drag.on_event(event, region);
        self.drag = drag;
        match delta {
            Some(delta) => {
                self.rotation.accumulate(delta);
                let view = self.resolved();
                (self, Some(view))
            }
            None => (self, None),
        }
    }

    /// Rotate by whole slots, as if the pointer had been dragged that far.
    pub fn step_slots(mut self, slots: i32) -> (Self, Option<ResolvedView>) {
        let sensitivity = self.rotation.sensitivity();
        if sensitivity == 0.0 || slots == 0 {
            return (self, None);
        }
        let delta = slots as f64 * slot_width(self.image_count) / sensitivity;
        self.rotation.accumulate(delta);
        let view = self.resolved();
        (self, Some(view))
    }

    pub fn reset(mut self) -> (Self, ResolvedView) {
        self.drag = DragPhase::Idle;
        self.rotation.reset();
        let view = self.resolved();
        (self, view)
    }

    pub fn with_policy(mut self, policy: OffsetPolicy) -> (Self, ResolvedView) {
        self.offset_policy = policy;
        let view = self.resolved();
        (self, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::TAU;

    fn state() -> ViewerState {
        ViewerState::new(NonZeroUsize::new(36).unwrap(), 0.008, OffsetPolicy::Centered)
    }

    fn region() -> InteractionRegion {
        InteractionRegion::from_size(1280.0, 720.0)
    }

    #[test]
    fn moves_outside_a_session_change_nothing() {
        let before = state();
        let (after, view) = before.on_pointer(PointerEvent::Move { x: 300.0, y: 10.0 }, &region());
        assert_eq!(after, before);
        assert!(view.is_none());
    }

    #[test]
    fn drag_left_advances_the_image() {
        let s = state();
        let (s, _) = s.on_pointer(PointerEvent::Press { x: 600.0, y: 300.0 }, &region());
        // 0.008 rad/px and a ~0.1745 rad slot: 10 px stays on image 0, 20 px does not
        let (s, view) = s.on_pointer(PointerEvent::Move { x: 590.0, y: 300.0 }, &region());
        assert_eq!(view.unwrap().image_index, 0);
        let (_, view) = s.on_pointer(PointerEvent::Move { x: 580.0, y: 300.0 }, &region());
        assert_eq!(view.unwrap().image_index, 1);
    }

    #[test]
    fn angle_survives_between_sessions() {
        let r = region();
        let s = state();
        let (s, _) = s.on_pointer(PointerEvent::Press { x: 500.0, y: 300.0 }, &r);
        let (s, _) = s.on_pointer(PointerEvent::Move { x: 450.0, y: 300.0 }, &r);
        let (s, _) = s.on_pointer(PointerEvent::Release, &r);
        assert_abs_diff_eq!(s.rotation.angle(), 0.4, epsilon = 1e-12);
        let (s, view) = s.on_pointer(PointerEvent::Move { x: 0.0, y: 300.0 }, &r);
        assert!(view.is_none());
        assert_abs_diff_eq!(s.rotation.angle(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn full_turn_of_drag_returns_to_the_start_image() {
        let r = region();
        let sensitivity = 0.008;
        let total = TAU / sensitivity;
        let start = state();
        let (mut s, _) = start.on_pointer(PointerEvent::Press { x: 1000.0, y: 300.0 }, &r);
        let steps = 10;
        let mut x = 1000.0;
        let mut last = None;
        for _ in 0..steps {
            x -= total / steps as f64;
            let (next, view) = s.on_pointer(PointerEvent::Move { x, y: 300.0 }, &r);
            s = next;
            last = view;
        }
        assert_eq!(last.unwrap().image_index, start.resolved().image_index);
    }

    #[test]
    fn stepping_moves_one_slot_at_a_time() {
        let (s, view) = state().step_slots(1);
        assert_eq!(view.unwrap().image_index, 1);
        let (s, view) = s.step_slots(-2);
        assert_eq!(view.unwrap().image_index, 35);
        let (_, view) = s.step_slots(0);
        assert!(view.is_none());
    }

    #[test]
    fn switching_policy_keeps_the_image_and_moves_the_offset_at_the_wrap() {
        let slot = TAU / 36.0;
        // a fifth of a slot short of a full turn to the right
        let px = -(0.2 * slot) / 0.008;
        let s = state();
        let (s, _) = s.on_pointer(PointerEvent::Press { x: 600.0, y: 300.0 }, &region());
        let (s, centered) = s.on_pointer(PointerEvent::Move { x: 600.0 - px, y: 300.0 }, &region());
        let centered = centered.unwrap();
        assert_eq!(centered.image_index, 0);
        assert_abs_diff_eq!(centered.offset_angle, -0.2 * slot, epsilon = 1e-9);

        let (s, raw) = s.with_policy(OffsetPolicy::Raw);
        assert_eq!(s.offset_policy, OffsetPolicy::Raw);
        assert_eq!(raw.image_index, centered.image_index);
        assert_abs_diff_eq!(raw.offset_angle, TAU - 0.2 * slot, epsilon = 1e-9);
        assert_abs_diff_eq!(s.rotation.angle(), -0.2 * slot, epsilon = 1e-12);

        let (_, back) = s.with_policy(OffsetPolicy::Centered);
        assert_eq!(back, centered);
    }

    #[test]
    fn reset_returns_to_the_front_view() {
        let (s, _) = state().step_slots(7);
        let (s, view) = s.reset();
        assert_eq!(view, ResolvedView::FRONT);
        assert_eq!(s.rotation.angle(), 0.0);
    }
}
