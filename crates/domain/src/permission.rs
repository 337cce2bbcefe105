use std::fmt::{Display, Formatter};
use std::str::FromStr;

use liftgate_core::{AppError, AppResult, Guard, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::normalize_description;
use crate::{LifecycleState, RbacName};

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a random permission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a permission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Reach of a permission over gym resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Applies to every resource of the category.
    Global,
    /// Applies only to resources owned by the acting user.
    Own,
}

impl PermissionScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Own => "own",
        }
    }
}

impl FromStr for PermissionScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "global" => Ok(Self::Global),
            "own" => Ok(Self::Own),
            _ => Err(AppError::Validation(format!(
                "unknown permission scope '{value}'"
            ))),
        }
    }
}

/// Named atomic capability scoped to one guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    id: PermissionId,
    guard: Guard,
    name: RbacName,
    display_name: NonEmptyString,
    description: Option<String>,
    category: Option<String>,
    scope: PermissionScope,
    state: LifecycleState,
}

impl Permission {
    /// Creates a new active permission.
    #[must_use]
    pub fn new(
        id: PermissionId,
        guard: Guard,
        name: RbacName,
        display_name: NonEmptyString,
        category: Option<String>,
        scope: PermissionScope,
    ) -> Self {
        Self {
            id,
            guard,
            name,
            display_name,
            description: None,
            category: normalize_description(category),
            scope,
            state: LifecycleState::Active,
        }
    }

    /// Attaches a description while building a permission.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = normalize_description(description);
        self
    }

    /// Overrides the lifecycle state while rehydrating from storage.
    #[must_use]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = state;
        self
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the guard owning this permission.
    #[must_use]
    pub fn guard(&self) -> Guard {
        self.guard
    }

    /// Returns the machine name.
    #[must_use]
    pub fn name(&self) -> &RbacName {
        &self.name
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the optional grouping category (`subscriptions`, `banners`).
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the permission scope.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        self.scope
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns whether the permission participates in decisions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Renames the permission.
    pub fn rename(&mut self, name: RbacName) {
        self.name = name;
    }

    /// Updates the descriptive attributes.
    pub fn update_details(
        &mut self,
        display_name: Option<NonEmptyString>,
        description: Option<String>,
        category: Option<String>,
        scope: Option<PermissionScope>,
    ) {
        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(description) = description {
            self.description = normalize_description(Some(description));
        }
        if let Some(category) = category {
            self.category = normalize_description(Some(category));
        }
        if let Some(scope) = scope {
            self.scope = scope;
        }
    }

    /// Moves the permission to the deactivated state.
    pub fn deactivate(&mut self) {
        self.state = LifecycleState::Deactivated;
    }

    /// Moves the permission back to the active state.
    pub fn activate(&mut self) {
        self.state = LifecycleState::Active;
    }

    /// Fails when the permission cannot be linked to a role of `guard`.
    pub fn ensure_guard(&self, guard: Guard) -> AppResult<()> {
        if self.guard != guard {
            return Err(AppError::InvalidState(format!(
                "permission '{}' belongs to guard '{}' and cannot be linked in guard '{guard}'",
                self.name, self.guard
            )));
        }

        Ok(())
    }
}
