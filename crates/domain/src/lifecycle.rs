use serde::{Deserialize, Serialize};

/// Lifecycle of role and permission records.
///
/// Records are never deleted once created; deactivation is the only
/// removal mechanism and can be reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Record participates in authorization decisions.
    Active,
    /// Record is kept for history but ignored by every decision.
    Deactivated,
}

impl LifecycleState {
    /// Maps the persisted `is_active` flag to a lifecycle state.
    #[must_use]
    pub fn from_active_flag(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Deactivated
        }
    }

    /// Returns whether the record participates in decisions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns a stable storage value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deactivated => "deactivated",
        }
    }
}
