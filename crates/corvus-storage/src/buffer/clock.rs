//! Second-chance clock replacement.
//!
//! The clock algorithm approximates LRU with a single bit per frame:
//!
//! 1. A re-access of a tracked frame sets its reference bit
//! 2. The clock hand sweeps the slots looking for eviction candidates
//! 3. A candidate with the bit set gets it cleared and is passed over once
//! 4. A candidate with the bit clear is the victim
//!
//! The sweep always terminates: when at least one frame is evictable, every
//! unsuccessful visit either skips a slot or clears a bit, so within two
//! revolutions some evictable slot is reached with its bit clear.

use parking_lot::Mutex;

use super::frame::FrameId;
use super::replacer::Replacer;

#[derive(Debug, Clone, Copy)]
struct Slot {
    frame_id: Option<FrameId>,
    pinned: bool,
    referenced: bool,
}

impl Slot {
    const EMPTY: Self = Self {
        frame_id: None,
        pinned: false,
        referenced: false,
    };

    fn is_evictable(&self) -> bool {
        self.frame_id.is_some() && !self.pinned
    }
}

struct ClockState {
    slots: Vec<Slot>,
    hand: usize,
}

impl ClockState {
    fn find(&mut self, frame_id: FrameId) -> Option<&mut Slot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.frame_id == Some(frame_id))
    }

    fn register(&mut self, frame_id: FrameId, pinned: bool) {
        let slot = self.slots.iter_mut().find(|slot| slot.frame_id.is_none());
        debug_assert!(slot.is_some(), "clock replacer capacity exceeded");
        if let Some(slot) = slot {
            *slot = Slot {
                frame_id: Some(frame_id),
                pinned,
                referenced: false,
            };
        }
    }
}

/// Clock (second chance) replacement policy.
///
/// One slot per possible frame. The reference bit records a *re-access*: it
/// is set when a frame the policy already tracks gets pinned again, so a
/// page that was touched twice survives one extra sweep over a page that
/// was only brought in and dropped.
pub struct ClockReplacer {
    state: Mutex<ClockState>,
}

impl ClockReplacer {
    /// Creates a replacer with capacity for `num_frames` frames.
    pub fn new(num_frames: usize) -> Self {
        Self {
            state: Mutex::new(ClockState {
                slots: vec![Slot::EMPTY; num_frames],
                hand: 0,
            }),
        }
    }
}

impl Replacer for ClockReplacer {
    fn pin(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        match state.find(frame_id) {
            Some(slot) => {
                slot.pinned = true;
                slot.referenced = true;
            }
            None => state.register(frame_id, true),
        }
    }

    fn unpin(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        match state.find(frame_id) {
            Some(slot) => slot.pinned = false,
            None => state.register(frame_id, false),
        }
    }

    fn victim(&self) -> Option<FrameId> {
        let mut state = self.state.lock();
        if !state.slots.iter().any(Slot::is_evictable) {
            return None;
        }

        let num_slots = state.slots.len();
        loop {
            let idx = state.hand;
            state.hand = (idx + 1) % num_slots;

            let slot = &mut state.slots[idx];
            if !slot.is_evictable() {
                continue;
            }
            if slot.referenced {
                slot.referenced = false;
                continue;
            }

            let frame_id = slot.frame_id;
            *slot = Slot::EMPTY;
            return frame_id;
        }
    }

    fn remove(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        if let Some(slot) = state.find(frame_id) {
            *slot = Slot::EMPTY;
        }
    }

    fn len(&self) -> usize {
        self.state
            .lock()
            .slots
            .iter()
            .filter(|slot| slot.is_evictable())
            .count()
    }
}

impl std::fmt::Debug for ClockReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ClockReplacer")
            .field("capacity", &state.slots.len())
            .field("hand", &state.hand)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: usize) -> FrameId {
        FrameId::new(id)
    }

    #[test]
    fn test_empty_has_no_victim() {
        let replacer = ClockReplacer::new(4);
        assert_eq!(replacer.len(), 0);
        assert!(replacer.is_empty());
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_unpin_registers_evictable() {
        let replacer = ClockReplacer::new(4);
        replacer.unpin(frame(1));
        assert_eq!(replacer.len(), 1);

        assert_eq!(replacer.victim(), Some(frame(1)));
        // The victim is deregistered.
        assert_eq!(replacer.len(), 0);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_pin_registers_not_evictable() {
        let replacer = ClockReplacer::new(4);
        replacer.pin(frame(0));
        assert_eq!(replacer.len(), 0);
        assert_eq!(replacer.victim(), None);

        replacer.unpin(frame(0));
        assert_eq!(replacer.len(), 1);
        assert_eq!(replacer.victim(), Some(frame(0)));
    }

    #[test]
    fn test_victim_skips_pinned() {
        let replacer = ClockReplacer::new(4);
        replacer.pin(frame(0));
        replacer.unpin(frame(1));

        assert_eq!(replacer.victim(), Some(frame(1)));
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_second_chance() {
        let replacer = ClockReplacer::new(2);
        // Both frames brought in and released; neither re-accessed yet.
        replacer.pin(frame(0));
        replacer.pin(frame(1));
        replacer.unpin(frame(0));
        replacer.unpin(frame(1));

        // Frame 0 is touched again: its reference bit is now set.
        replacer.pin(frame(0));
        replacer.unpin(frame(0));

        // The sweep starts at frame 0, spares it once, and takes frame 1.
        assert_eq!(replacer.victim(), Some(frame(1)));
        // With the bit spent, frame 0 is next.
        assert_eq!(replacer.victim(), Some(frame(0)));
    }

    #[test]
    fn test_all_referenced_still_terminates() {
        let replacer = ClockReplacer::new(3);
        for id in 0..3 {
            replacer.pin(frame(id));
            replacer.unpin(frame(id));
            // Touch each one so every reference bit is set.
            replacer.pin(frame(id));
            replacer.unpin(frame(id));
        }

        // A full revolution clears all bits, then the hand wraps to slot 0.
        assert_eq!(replacer.victim(), Some(frame(0)));
    }

    #[test]
    fn test_hand_resumes_after_victim() {
        let replacer = ClockReplacer::new(3);
        for id in 0..3 {
            replacer.unpin(frame(id));
        }

        assert_eq!(replacer.victim(), Some(frame(0)));

        // Frame 0 comes back (first empty slot is its old one); the hand
        // has moved on, so the next victim is frame 1, not frame 0 again.
        replacer.unpin(frame(0));
        assert_eq!(replacer.victim(), Some(frame(1)));
        assert_eq!(replacer.victim(), Some(frame(2)));
        assert_eq!(replacer.victim(), Some(frame(0)));
    }

    #[test]
    fn test_pin_after_unpin_blocks_eviction() {
        let replacer = ClockReplacer::new(2);
        replacer.unpin(frame(0));
        replacer.pin(frame(0));
        assert_eq!(replacer.len(), 0);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_remove() {
        let replacer = ClockReplacer::new(4);
        replacer.unpin(frame(0));
        replacer.unpin(frame(1));

        replacer.remove(frame(0));
        assert_eq!(replacer.len(), 1);
        assert_eq!(replacer.victim(), Some(frame(1)));

        // Removing an unknown frame is a no-op.
        replacer.remove(frame(9));
        assert_eq!(replacer.len(), 0);
    }
}
