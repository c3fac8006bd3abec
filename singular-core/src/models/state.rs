use super::error::SensorError;

/// Lifecycle of one device session.
///
/// ```text
/// uninitialized → active → stopped
///        └─────────────────↗ (start failed)
/// ```
///
/// `Stopped` is terminal: switching devices builds a new session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Active,
    /// Carries the error that halted the session, `None` on an explicit stop.
    Stopped(Option<SensorError>),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    pub fn error(&self) -> Option<&SensorError> {
        match self {
            Self::Stopped(Some(e)) => Some(e),
            _ => None,
        }
    }

    /// Short name used in console lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UninitializedState",
            Self::Active => "ActiveState",
            Self::Stopped(_) => "StoppedState",
        }
    }
}
