use std::fmt::{Display, Formatter};

use liftgate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum length of a role or permission name.
pub const RBAC_NAME_MAX_LENGTH: usize = 125;

/// Machine name of a role or permission (`super_admin`, `subscriptions.manage`).
///
/// Names start with a lowercase ASCII letter and contain only lowercase
/// letters, digits, `_`, `.` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RbacName(String);

impl RbacName {
    /// Creates a validated name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        }

        if trimmed.len() > RBAC_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "name must not exceed {RBAC_NAME_MAX_LENGTH} characters"
            )));
        }

        if !trimmed.starts_with(|character: char| character.is_ascii_lowercase()) {
            return Err(AppError::Validation(format!(
                "name '{trimmed}' must start with a lowercase letter"
            )));
        }

        if let Some(invalid) = trimmed.chars().find(|character| {
            !(character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || matches!(character, '_' | '.' | '-'))
        }) {
            return Err(AppError::Validation(format!(
                "name '{trimmed}' contains invalid character '{invalid}'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RbacName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<RbacName> for String {
    fn from(value: RbacName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{RBAC_NAME_MAX_LENGTH, RbacName};

    #[test]
    fn dotted_permission_names_are_accepted() {
        assert!(RbacName::new("subscriptions.manage").is_ok());
        assert!(RbacName::new("super_admin").is_ok());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let name = RbacName::new("  trainer ");
        assert!(matches!(name, Ok(value) if value.as_str() == "trainer"));
    }

    #[test]
    fn uppercase_and_leading_digits_are_rejected() {
        assert!(RbacName::new("Admin").is_err());
        assert!(RbacName::new("1admin").is_err());
        assert!(RbacName::new("roles manage").is_err());
    }

    proptest! {
        #[test]
        fn generated_valid_names_parse(value in "[a-z][a-z0-9_.-]{0,60}") {
            let parsed = RbacName::new(value.clone());
            prop_assert!(parsed.is_ok());
            prop_assert_eq!(parsed.map(String::from).unwrap_or_default(), value);
        }

        #[test]
        fn names_with_uppercase_are_rejected(prefix in "[a-z]{1,10}", upper in "[A-Z]{1,5}") {
            let value = format!("{prefix}{upper}");
            prop_assert!(RbacName::new(value).is_err());
        }

        #[test]
        fn overlong_names_are_rejected(extra in 1usize..50) {
            let value = "a".repeat(RBAC_NAME_MAX_LENGTH + extra);
            prop_assert!(RbacName::new(value).is_err());
        }
    }
}
