//! Left/right alternation shared by high knees and mountain climbers. One
//! repetition is a raise on one side followed by a raise on the other.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlternationPhase {
    #[default]
    Ready,
    FirstRaised(Side),
    FirstLowered(Side),
    SecondRaised(Side),
}

impl AlternationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            AlternationPhase::Ready => "ready",
            AlternationPhase::FirstRaised(_) => "first_raised",
            AlternationPhase::FirstLowered(_) => "first_lowered",
            AlternationPhase::SecondRaised(_) => "second_raised",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternationEvent {
    Waiting,
    Raised(Side),
    Holding(Side),
    Lowered(Side),
    /// The first side came up again instead of the other one
    SameSide(Side),
    BothRaised,
    /// Both sides have been raised in turn
    Completed,
}

#[derive(Debug, Default)]
pub struct AlternationTracker {
    phase: AlternationPhase,
}

impl AlternationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AlternationPhase {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = AlternationPhase::Ready;
    }

    pub fn observe(&mut self, left_up: bool, right_up: bool) -> AlternationEvent {
        let raised = match (left_up, right_up) {
            (true, true) => return AlternationEvent::BothRaised,
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            (false, false) => None,
        };

        let (next, event) = match (self.phase, raised) {
            (AlternationPhase::Ready, None) => (self.phase, AlternationEvent::Waiting),
            (AlternationPhase::Ready, Some(side)) => {
                (AlternationPhase::FirstRaised(side), AlternationEvent::Raised(side))
            }

            (AlternationPhase::FirstRaised(first), None) => {
                (AlternationPhase::FirstLowered(first), AlternationEvent::Lowered(first))
            }
            (AlternationPhase::FirstRaised(first), Some(side)) if side == first => {
                (self.phase, AlternationEvent::Holding(side))
            }

            (AlternationPhase::FirstLowered(_), None) => (self.phase, AlternationEvent::Waiting),
            (AlternationPhase::FirstLowered(first), Some(side)) if side == first => {
                (AlternationPhase::FirstRaised(side), AlternationEvent::SameSide(side))
            }

            (AlternationPhase::FirstRaised(_), Some(side))
            | (AlternationPhase::FirstLowered(_), Some(side)) => {
                (AlternationPhase::SecondRaised(side), AlternationEvent::Completed)
            }

            (AlternationPhase::SecondRaised(second), None) => {
                (AlternationPhase::Ready, AlternationEvent::Lowered(second))
            }
            (AlternationPhase::SecondRaised(second), Some(side)) if side == second => {
                (self.phase, AlternationEvent::Holding(side))
            }
            (AlternationPhase::SecondRaised(_), Some(side)) => {
                (AlternationPhase::FirstRaised(side), AlternationEvent::Raised(side))
            }
        };

        self.phase = next;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_then_right_completes_once() {
        let mut tracker = AlternationTracker::new();
        assert_eq!(tracker.observe(false, false), AlternationEvent::Waiting);
        assert_eq!(tracker.observe(true, false), AlternationEvent::Raised(Side::Left));
        assert_eq!(tracker.observe(true, false), AlternationEvent::Holding(Side::Left));
        assert_eq!(tracker.observe(false, false), AlternationEvent::Lowered(Side::Left));
        assert_eq!(tracker.observe(false, true), AlternationEvent::Completed);
        assert_eq!(tracker.observe(false, true), AlternationEvent::Holding(Side::Right));
        assert_eq!(tracker.observe(false, false), AlternationEvent::Lowered(Side::Right));
        assert_eq!(tracker.phase(), AlternationPhase::Ready);
    }

    #[test]
    fn direct_switch_counts() {
        let mut tracker = AlternationTracker::new();
        tracker.observe(false, true);
        assert_eq!(tracker.observe(true, false), AlternationEvent::Completed);
        // switching back starts the next repetition rather than completing it
        assert_eq!(tracker.observe(false, true), AlternationEvent::Raised(Side::Right));
        assert_eq!(tracker.observe(true, false), AlternationEvent::Completed);
    }

    #[test]
    fn same_side_twice_does_not_count() {
        let mut tracker = AlternationTracker::new();
        tracker.observe(true, false);
        tracker.observe(false, false);
        assert_eq!(tracker.observe(true, false), AlternationEvent::SameSide(Side::Left));
        assert_eq!(tracker.phase(), AlternationPhase::FirstRaised(Side::Left));
    }

    #[test]
    fn both_raised_leaves_phase_alone() {
        let mut tracker = AlternationTracker::new();
        tracker.observe(true, false);
        assert_eq!(tracker.observe(true, true), AlternationEvent::BothRaised);
        assert_eq!(tracker.phase(), AlternationPhase::FirstRaised(Side::Left));
        tracker.reset();
        assert_eq!(tracker.phase(), AlternationPhase::Ready);
    }
}
