use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{Actor, EngineError, ResultEngine, Role, customers, transactions, users};

use super::Engine;

/// Rejects any actor that is not an administrator.
pub(super) fn require_admin(actor: &Actor, action: &str) -> ResultEngine<()> {
    if !actor.is_admin() {
        return Err(EngineError::Forbidden(format!(
            "only administrators can {action}"
        )));
    }
    Ok(())
}

impl Engine {
    /// Loads a customer visible to `actor`.
    ///
    /// Administrators see every customer; agents only the ones assigned to
    /// them. Invisible customers are reported as missing, not forbidden.
    pub(super) async fn require_customer_read(
        &self,
        db: &DatabaseTransaction,
        actor: &Actor,
        customer_id: i64,
    ) -> ResultEngine<customers::Model> {
        let model = customers::Entity::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("customer not exists".to_string()))?;

        match actor.role() {
            Role::Admin => Ok(model),
            Role::Agent if model.agent_id.as_deref() == Some(actor.user_id()) => Ok(model),
            Role::Agent => Err(EngineError::KeyNotFound("customer not exists".to_string())),
        }
    }

    /// Loads a transaction for an administrator write.
    pub(super) async fn require_transaction_write(
        &self,
        db: &DatabaseTransaction,
        actor: &Actor,
        transaction_id: i64,
    ) -> ResultEngine<transactions::Model> {
        require_admin(actor, "change transactions")?;
        transactions::Entity::find_by_id(transaction_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }

    /// Ensures `username` is an existing, active agent.
    pub(super) async fn require_agent(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        let user = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("agent not exists".to_string()))?;
        if Role::try_from(user.role.as_str())? != Role::Agent {
            return Err(EngineError::InvalidRole(format!(
                "{username} is not an agent"
            )));
        }
        if !user.active {
            return Err(EngineError::InvalidRole(format!(
                "{username} is not active"
            )));
        }
        Ok(user)
    }
}
