use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, UserId};

/// Authorization domain a role or permission row belongs to.
///
/// Every name lookup is qualified by a guard. The same role name may exist
/// once per guard, and each definition carries its own grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Cookie-session authenticated browser traffic.
    Web,
    /// Bearer-token authenticated API clients (mobile app).
    Api,
}

impl Guard {
    /// Returns the stable storage value for this guard.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Api => "api",
        }
    }

    /// Returns every known guard.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Guard] = &[Guard::Web, Guard::Api];

        ALL
    }

    /// Parses a transport value into a guard.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Guard {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "web" => Ok(Self::Web),
            "api" => Ok(Self::Api),
            _ => Err(AppError::Validation(format!("unknown guard '{value}'"))),
        }
    }
}

impl Display for Guard {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Authenticated caller as seen by the authorization core.
///
/// The guard is fixed by how the caller authenticated and is never
/// inferred later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
    guard: Guard,
}

impl UserIdentity {
    /// Creates an identity from authentication data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: Option<String>,
        guard: Guard,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
            guard,
        }
    }

    /// Returns the authenticated user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the guard implied by the credential type.
    #[must_use]
    pub fn guard(&self) -> Guard {
        self.guard
    }
}
