//! Per-source lifecycle

use std::fmt;

/// Lifecycle state of one source during a run
///
/// `Created -> Connecting -> SinksConnecting -> Running -> Done`, strictly in
/// that order; any failure leaves the source in the state it failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Created,
    Connecting,
    SinksConnecting,
    Running,
    Done,
}

impl SourceState {
    /// The state that follows this one, `None` once done
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Connecting),
            Self::Connecting => Some(Self::SinksConnecting),
            Self::SinksConnecting => Some(Self::Running),
            Self::Running => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Step to the next state; `Done` stays `Done`
    pub fn advance(&mut self) {
        if let Some(next) = self.next() {
            *self = next;
        }
    }
}

impl fmt::Display for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Connecting => "connecting",
            Self::SinksConnecting => "sinks_connecting",
            Self::Running => "running",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
