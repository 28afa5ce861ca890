use core::str::FromStr;

use serde::{Deserialize, Serialize};

use smartstore_core::DomainError;

/// Delivery status lifecycle.
///
/// `Preparing` is the single initial state (older records call it
/// "pending"); `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[serde(alias = "pending")]
    Preparing,
    InProgress,
    Completed,
    Failed,
}

use DeliveryStatus::{Completed, Failed, InProgress, Preparing};

/// Allowed transitions, one row per state.
pub const TRANSITIONS: [(DeliveryStatus, &[DeliveryStatus]); 4] = [
    (Preparing, &[InProgress, Failed]),
    (InProgress, &[Completed, Failed]),
    (Completed, &[]),
    (Failed, &[]),
];

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [Preparing, InProgress, Completed, Failed];

    /// States reachable from `self` in one step.
    pub fn allowed_next(self) -> &'static [DeliveryStatus] {
        TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, next)| *next)
            .unwrap_or(&[])
    }

    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Still moving or about to move.
    pub fn is_active(self) -> bool {
        matches!(self, Preparing | InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Preparing => "preparing",
            InProgress => "in_progress",
            Completed => "completed",
            Failed => "failed",
        }
    }
}

impl core::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preparing" | "pending" => Ok(Preparing),
            "in_progress" => Ok(InProgress),
            "completed" => Ok(Completed),
            "failed" => Ok(Failed),
            other => Err(DomainError::validation(format!(
                "unknown delivery status '{other}'"
            ))),
        }
    }
}
