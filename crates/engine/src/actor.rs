//! The authenticated caller of an engine operation.
//!
//! Every operation that branches on role receives an [`Actor`] explicitly;
//! the engine keeps no session state of its own.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages agents, customers and debits.
    Admin,
    /// Records collections for the customers assigned to them.
    Agent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            other => Err(EngineError::InvalidRole(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    user_id: String,
    role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn agent(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Agent)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrips_through_storage_string() {
        for role in [Role::Admin, Role::Agent] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(matches!(
            Role::try_from("owner"),
            Err(EngineError::InvalidRole(_))
        ));
    }

    #[test]
    fn constructors_set_role() {
        assert!(Actor::admin("root").is_admin());
        let agent = Actor::agent("ravi");
        assert!(!agent.is_admin());
        assert_eq!(agent.user_id(), "ravi");
    }
}
