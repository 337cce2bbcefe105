use std::fmt::{Display, Formatter};

use liftgate_core::{AppError, AppResult, Guard, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LifecycleState, RbacName};

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
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

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role names reserved by the system in every guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Owns the whole gym installation; the only role allowed to change roles.
    SuperAdmin,
    /// Manages catalog, members and content.
    Admin,
    /// Manages member subscriptions.
    Trainer,
    /// Regular gym member.
    User,
}

impl SystemRole {
    /// Returns the reserved role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Trainer => "trainer",
            Self::User => "user",
        }
    }

    /// Returns a human-readable label used when the role is bootstrapped.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Administrator",
            Self::Admin => "Administrator",
            Self::Trainer => "Trainer",
            Self::User => "Member",
        }
    }

    /// Returns all reserved roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SuperAdmin,
            SystemRole::Admin,
            SystemRole::Trainer,
            SystemRole::User,
        ];

        ALL
    }

    /// Resolves a role name to its reserved counterpart, if any.
    #[must_use]
    pub fn from_name(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
    }
}

/// Named capability bundle scoped to one guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: RoleId,
    guard: Guard,
    name: RbacName,
    display_name: NonEmptyString,
    description: Option<String>,
    state: LifecycleState,
}

impl Role {
    /// Creates a new active role.
    #[must_use]
    pub fn new(
        id: RoleId,
        guard: Guard,
        name: RbacName,
        display_name: NonEmptyString,
        description: Option<String>,
    ) -> Self {
        Self::from_parts(
            id,
            guard,
            name,
            display_name,
            description,
            LifecycleState::Active,
        )
    }

    /// Rehydrates a role from storage.
    #[must_use]
    pub fn from_parts(
        id: RoleId,
        guard: Guard,
        name: RbacName,
        display_name: NonEmptyString,
        description: Option<String>,
        state: LifecycleState,
    ) -> Self {
        Self {
            id,
            guard,
            name,
            display_name,
            description: normalize_description(description),
            state,
        }
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the guard owning this role.
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

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns whether the role participates in decisions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Returns the reserved role this record represents, if any.
    #[must_use]
    pub fn system_role(&self) -> Option<SystemRole> {
        SystemRole::from_name(self.name.as_str())
    }

    /// Returns whether the role carries a reserved name.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.system_role().is_some()
    }

    /// Renames the role. Reserved roles keep their names.
    pub fn rename(&mut self, name: RbacName) -> AppResult<()> {
        self.ensure_editable()?;

        if name == self.name {
            return Ok(());
        }

        if self.is_protected() {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be renamed",
                self.name
            )));
        }

        self.name = name;
        Ok(())
    }

    /// Updates the display attributes.
    pub fn update_details(
        &mut self,
        display_name: Option<NonEmptyString>,
        description: Option<String>,
    ) -> AppResult<()> {
        self.ensure_editable()?;

        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(description) = description {
            self.description = normalize_description(Some(description));
        }

        Ok(())
    }

    /// Moves the role to the deactivated state.
    pub fn deactivate(&mut self) -> AppResult<()> {
        if let Some(system_role) = self.system_role() {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be deactivated",
                system_role.as_str()
            )));
        }

        self.state = LifecycleState::Deactivated;
        Ok(())
    }

    /// Moves the role back to the active state.
    pub fn activate(&mut self) -> AppResult<()> {
        self.ensure_editable()?;
        self.state = LifecycleState::Active;
        Ok(())
    }

    fn ensure_editable(&self) -> AppResult<()> {
        if self.system_role() == Some(SystemRole::SuperAdmin) {
            return Err(AppError::Forbidden(
                "system role 'super_admin' cannot be edited".to_owned(),
            ));
        }

        Ok(())
    }
}

pub(crate) fn normalize_description(value: Option<String>) -> Option<String> {
    value
        .map(|description| description.trim().to_owned())
        .filter(|description| !description.is_empty())
}
