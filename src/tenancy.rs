//! Tenant and workspace scoping shared by every bounded context.
//!
//! Every persisted row belongs to exactly one [`WorkspaceScope`]. Store ports
//! take the scope as a required argument, so a lookup that omits it cannot be
//! expressed.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing tenancy values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenancyError {
    /// The tenant identifier is empty after trimming.
    #[error("tenant identifier must not be blank")]
    BlankTenantId,

    /// The workspace identifier is empty after trimming.
    #[error("workspace identifier must not be blank")]
    BlankWorkspaceId,

    /// The user identifier is empty after trimming.
    #[error("user identifier must not be blank")]
    BlankUserId,
}

macro_rules! opaque_identifier {
    ($(#[$meta:meta])* $name:ident, $blank:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns a [`TenancyError`] when the value is blank.
            pub fn new(value: impl Into<String>) -> Result<Self, TenancyError> {
                let raw = value.into();
                if raw.trim().is_empty() {
                    return Err(TenancyError::$blank);
                }
                Ok(Self(raw))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TenancyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_identifier!(
    /// Opaque tenant identifier supplied by the caller.
    TenantId,
    BlankTenantId
);

opaque_identifier!(
    /// Opaque workspace identifier, unique within a tenant.
    WorkspaceId,
    BlankWorkspaceId
);

opaque_identifier!(
    /// Opaque reference to a user. Tasks hold it without owning the user.
    UserId,
    BlankUserId
);

/// The tenant and workspace pair that scopes every lookup and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceScope {
    tenant_id: TenantId,
    workspace_id: WorkspaceId,
}

impl WorkspaceScope {
    /// Creates a scope from validated identifiers.
    #[must_use]
    pub const fn new(tenant_id: TenantId, workspace_id: WorkspaceId) -> Self {
        Self {
            tenant_id,
            workspace_id,
        }
    }

    /// Creates a scope from raw identifier strings.
    ///
    /// # Errors
    ///
    /// Returns [`TenancyError`] when either identifier is blank.
    pub fn from_parts(
        tenant_id: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Result<Self, TenancyError> {
        Ok(Self::new(
            TenantId::new(tenant_id)?,
            WorkspaceId::new(workspace_id)?,
        ))
    }

    /// Returns the tenant identifier.
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub const fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Splits the scope into its identifiers.
    #[must_use]
    pub fn into_parts(self) -> (TenantId, WorkspaceId) {
        (self.tenant_id, self.workspace_id)
    }
}

impl fmt::Display for WorkspaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.workspace_id)
    }
}

/// Caller role supplied alongside each request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// No role was supplied or the supplied role was not recognised.
    #[default]
    Unspecified,
    /// Regular agent working on tasks.
    Agent,
    /// Manager allowed to assign tasks.
    Manager,
}

impl UserRole {
    /// Parses a role name case-insensitively.
    ///
    /// Unrecognised names map to [`UserRole::Unspecified`]; the validation
    /// layer decides whether that is acceptable for a given action.
    #[must_use]
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "AGENT" => Self::Agent,
            "MANAGER" => Self::Manager,
            _ => Self::Unspecified,
        }
    }

    /// Returns the canonical role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Agent => "AGENT",
            Self::Manager => "MANAGER",
        }
    }

    /// Returns `true` for any recognised role.
    #[must_use]
    pub const fn is_specified(self) -> bool {
        !matches!(self, Self::Unspecified)
    }

    /// Returns `true` when the role may assign tasks.
    #[must_use]
    pub const fn can_assign_tasks(self) -> bool {
        matches!(self, Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
