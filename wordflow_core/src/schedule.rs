//! Deferred round transitions on a virtual clock

use std::time::Duration;

/// Pause after an answer so the result stays visible
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Pause after a quiz kind or study mode switch
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Identity of one presented round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoundId(pub u64);

impl RoundId {
    pub fn next(self) -> RoundId {
        RoundId(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    Answered,
    KindChanged,
    ModeChanged,
}

impl AdvanceCause {
    pub fn delay(&self) -> Duration {
        match self {
            AdvanceCause::Answered => ADVANCE_DELAY,
            AdvanceCause::KindChanged | AdvanceCause::ModeChanged => SETTLE_DELAY,
        }
    }
}

/// A pending "load the next word" tied to the round that requested it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub round: RoundId,
    pub due: Duration,
    pub cause: AdvanceCause,
}

/// Holds at most one pending advance; scheduling again replaces it
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    pending: Option<ScheduledAdvance>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> Option<&ScheduledAdvance> {
        self.pending.as_ref()
    }

    pub fn schedule(&mut self, round: RoundId, cause: AdvanceCause) -> ScheduledAdvance {
        let advance = ScheduledAdvance {
            round,
            due: self.now + cause.delay(),
            cause,
        };
        if let Some(previous) = self.pending.replace(advance) {
            log::debug!(
                "Replaced pending {:?} advance for round {}",
                previous.cause,
                previous.round.0
            );
        }
        advance
    }

    pub fn cancel(&mut self) -> Option<ScheduledAdvance> {
        self.pending.take()
    }

    /// Move the clock forward and hand back the pending advance once it is due
    pub fn advance(&mut self, elapsed: Duration) -> Option<ScheduledAdvance> {
        self.now += elapsed;
        match self.pending {
            Some(advance) if advance.due <= self.now => self.pending.take(),
            _ => None,
        }
    }
}
