//! Frame-synchronized coalescing of pointer samples.
//!
//! A gesture pushes samples as fast as the pointer produces them. The emitter
//! merges them into a single pending value and asks for one frame; when the
//! frame arrives the merged value is emitted once. Pointer-up flushes whatever
//! is left so the terminal state is never dropped.

/// Values that can be merged between emissions.
pub trait Accumulate: Default {
    fn merge(&mut self, sample: Self);
    fn is_zero(&self) -> bool;
}

/// Last-value-wins wrapper for absolute samples (positions, bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latest<T>(pub Option<T>);

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Latest<T> {
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Accumulate for Latest<T> {
    fn merge(&mut self, sample: Self) {
        if sample.0.is_some() {
            self.0 = sample.0;
        }
    }

    fn is_zero(&self) -> bool {
        self.0.is_none()
    }
}

/// Something that will call back once on the next display frame.
pub trait FrameScheduler {
    fn request_frame(&self);
}

#[derive(Debug, Default)]
pub struct DeltaEmitter<T> {
    pending: T,
    in_flight: bool,
}

impl<T: Accumulate> DeltaEmitter<T> {
    pub fn new() -> Self {
        Self {
            pending: T::default(),
            in_flight: false,
        }
    }

    /// Merges a sample. Schedules at most one frame per emission window.
    pub fn push(&mut self, sample: T, scheduler: &impl FrameScheduler) {
        self.pending.merge(sample);
        if !self.in_flight {
            self.in_flight = true;
            scheduler.request_frame();
        }
    }

    /// Frame callback. Late frames, arriving after `finish`, are ignored.
    pub fn on_frame(&mut self) -> Option<T> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        self.take()
    }

    /// Pointer-up. Returns the terminal value, if any, and resets.
    pub fn finish(&mut self) -> Option<T> {
        self.in_flight = false;
        self.take()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    fn take(&mut self) -> Option<T> {
        if self.pending.is_zero() {
            self.pending = T::default();
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::gesture::MoveDelta;

    #[derive(Default)]
    pub(crate) struct CountingScheduler {
        pub requests: Cell<usize>,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    fn mv(x: i32, y: i32) -> MoveDelta {
        MoveDelta { x, y }
    }

    #[test]
    fn samples_between_frames_coalesce_into_one_emission() {
        let scheduler = CountingScheduler::default();
        let mut emitter = DeltaEmitter::new();

        for _ in 0..10 {
            emitter.push(mv(2, -1), &scheduler);
        }

        assert_eq!(scheduler.requests.get(), 1);
        assert_eq!(emitter.on_frame(), Some(mv(20, -10)));
        assert_eq!(emitter.on_frame(), None);
    }

    #[test]
    fn drag_scenario_flushes_terminal_delta_on_release() {
        let scheduler = CountingScheduler::default();
        let mut emitter = DeltaEmitter::new();
        let mut emitted = Vec::new();

        // t=2, 5, 14 then the frame at t=16
        emitter.push(mv(3, 3), &scheduler);
        emitter.push(mv(3, 3), &scheduler);
        emitter.push(mv(4, 4), &scheduler);
        emitted.extend(emitter.on_frame());

        // t=20, pointer-up at t=21 before the next frame
        emitter.push(mv(1, 1), &scheduler);
        emitted.extend(emitter.finish());

        // the frame that was requested at t=20 arrives late
        emitted.extend(emitter.on_frame());

        assert_eq!(emitted, vec![mv(10, 10), mv(1, 1)]);
        assert_eq!(scheduler.requests.get(), 2);
    }

    #[test]
    fn finish_without_pending_emits_nothing() {
        let scheduler = CountingScheduler::default();
        let mut emitter = DeltaEmitter::<MoveDelta>::new();
        assert_eq!(emitter.finish(), None);

        emitter.push(mv(1, 0), &scheduler);
        emitter.push(mv(-1, 0), &scheduler);
        assert_eq!(emitter.finish(), None);
        assert!(!emitter.is_in_flight());
    }

    #[test]
    fn latest_keeps_last_sample() {
        let scheduler = CountingScheduler::default();
        let mut emitter = DeltaEmitter::new();
        emitter.push(Latest::new(1), &scheduler);
        emitter.push(Latest::new(7), &scheduler);
        assert_eq!(emitter.on_frame().and_then(Latest::into_inner), Some(7));
    }
}
