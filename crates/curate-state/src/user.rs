//! Users and roles.
//!
//! Authentication is out of scope: a [`User`] is an asserted identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a curation user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May upload and edit records.
    Uploader,
    /// May also approve records.
    Approver,
}

/// A permission-checked workflow action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Upload or edit a record.
    Upload,
    /// Approve a pending record.
    Approve,
}

impl Role {
    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploader => "uploader",
            Self::Approver => "approver",
        }
    }

    /// Whether the role allows `action`.
    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::Upload => true,
            Action::Approve => self == Self::Approver,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploader" => Ok(Self::Uploader),
            "approver" => Ok(Self::Approver),
            other => Err(format!("unknown role: {other:?} (expected uploader or approver)")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Approve => f.write_str("approve"),
        }
    }
}

/// A curation user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Role.
    pub role: Role,
}

impl User {
    /// Construct a user.
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Whether the user's role allows `action`.
    pub fn has_permission(&self, action: Action) -> bool {
        self.role.allows(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions() {
        let uploader = User::new("ana", Role::Uploader);
        let approver = User::new("bo", Role::Approver);
        assert!(uploader.has_permission(Action::Upload));
        assert!(!uploader.has_permission(Action::Approve));
        assert!(approver.has_permission(Action::Upload));
        assert!(approver.has_permission(Action::Approve));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("approver".parse::<Role>().unwrap(), Role::Approver);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Uploader.to_string(), "uploader");
    }
}
