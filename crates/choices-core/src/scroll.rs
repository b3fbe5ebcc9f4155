//! Keeping the highlighted choice in view.
//!
//! The host drives a frame loop; each frame it asks the [`ScrollAnimator`] for the next scroll
//! offset. A list owns at most one running animation. Retargeting replaces it and hands out a new
//! [`AnimationHandle`], so frames still scheduled for the old target see
//! [`ScrollStep::Cancelled`] and stop instead of fighting the new animation.

use crate::highlight::Direction;

/// Vertical extent of a rendered entry, relative to the top of its scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntryBox {
    /// Distance from the container's content top.
    pub offset_top: f64,
    /// Rendered height.
    pub height: f64,
}

/// Scroll container metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    /// Current scroll offset.
    pub scroll_top: f64,
    /// Visible height.
    pub viewport_height: f64,
}

impl ScrollGeometry {
    /// Whether `entry` is fully visible on the side we are moving towards.
    pub fn is_in_view(&self, entry: EntryBox, direction: Direction) -> bool {
        match direction {
            Direction::Down => {
                self.scroll_top + self.viewport_height >= entry.offset_top + entry.height
            }
            Direction::Up => entry.offset_top >= self.scroll_top,
        }
    }

    /// Scroll offset that brings `entry` into view when moving in `direction`.
    pub fn end_point(&self, entry: EntryBox, direction: Direction) -> f64 {
        match direction {
            Direction::Down => (entry.offset_top + entry.height - self.viewport_height).max(0.0),
            Direction::Up => entry.offset_top.max(0.0),
        }
    }
}

/// Identifies one animation started by [`ScrollAnimator::scroll_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

/// Result of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollStep {
    /// Apply this offset and schedule another frame.
    Continue(f64),
    /// Apply this offset; the animation is done.
    Finished(f64),
    /// The handle no longer owns the list. Do nothing.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    handle: AnimationHandle,
    end_point: f64,
}

/// Per-list scroll animation slot.
#[derive(Debug, Default)]
pub struct ScrollAnimator {
    current: Option<Animation>,
    next_handle: u64,
}

const EASING_STRENGTH: f64 = 4.0;

impl ScrollAnimator {
    /// Create an idle animator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scrolling towards `end_point`, cancelling any animation in flight.
    pub fn scroll_to(&mut self, end_point: f64) -> AnimationHandle {
        self.next_handle += 1;
        let handle = AnimationHandle(self.next_handle);
        if let Some(previous) = self.current.replace(Animation { handle, end_point }) {
            log::trace!(
                target: "choices_core::scroll",
                "retarget {:.1} -> {end_point:.1}",
                previous.end_point
            );
        }
        handle
    }

    /// Bring `entry` into view if it is not already. Returns the handle of the new animation.
    pub fn reveal(
        &mut self,
        geometry: ScrollGeometry,
        entry: EntryBox,
        direction: Direction,
    ) -> Option<AnimationHandle> {
        if geometry.is_in_view(entry, direction) {
            return None;
        }
        Some(self.scroll_to(geometry.end_point(entry, direction)))
    }

    /// Advance the animation owned by `handle` from the current `scroll_top`.
    ///
    /// Each frame covers a quarter of the remaining distance, and at least one unit.
    pub fn step(&mut self, handle: AnimationHandle, scroll_top: f64) -> ScrollStep {
        let Some(animation) = self.current.filter(|animation| animation.handle == handle) else {
            return ScrollStep::Cancelled;
        };

        let remaining = animation.end_point - scroll_top;
        let distance = (remaining.abs() / EASING_STRENGTH).max(1.0);
        if distance >= remaining.abs() {
            self.current = None;
            return ScrollStep::Finished(animation.end_point);
        }
        ScrollStep::Continue(scroll_top + distance.copysign(remaining))
    }

    /// Stop the running animation, if any.
    pub fn cancel(&mut self) {
        self.current = None;
    }

    /// Whether an animation is in flight.
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }
}
