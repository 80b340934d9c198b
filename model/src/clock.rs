use std::time::Duration;

/// Identifies one scheduled tick. A host holding a stale token can't fire a newer tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickToken(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingTick {
    pub token: TickToken,
    pub due: Duration,
}

/// A single-threaded virtual clock holding at most one pending single-shot tick. Time only moves
/// when the host says so.
#[derive(Debug, Default)]
pub(crate) struct TickClock {
    now: Duration,
    pending: Option<PendingTick>,
    next_token: u64,
}

impl TickClock {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> Option<PendingTick> {
        self.pending
    }

    /// Replaces whatever was pending.
    pub fn schedule(&mut self, delay: Duration) -> TickToken {
        if let Some(old) = self.cancel() {
            trace!("Tick {:?} replaced before it fired", old);
        }
        let token = TickToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(PendingTick {
            token,
            due: self.now.saturating_add(delay),
        });
        token
    }

    pub fn cancel(&mut self) -> Option<TickToken> {
        self.pending.take().map(|tick| tick.token)
    }

    /// Takes the pending tick if it's due by `until`, moving the clock to the moment it fires.
    pub fn pop_due(&mut self, until: Duration) -> Option<PendingTick> {
        match self.pending {
            Some(tick) if tick.due <= until => {
                self.pending = None;
                self.now = self.now.max(tick.due);
                Some(tick)
            }
            _ => None,
        }
    }

    /// Takes the pending tick only if it matches the token, regardless of the time.
    pub fn take(&mut self, token: TickToken) -> Option<PendingTick> {
        match self.pending {
            Some(tick) if tick.token == token => {
                self.pending = None;
                self.now = self.now.max(tick.due);
                Some(tick)
            }
            _ => None,
        }
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub fn time_until_tick(&self) -> Option<Duration> {
        self.pending
            .map(|tick| tick.due.saturating_sub(self.now))
    }
}
