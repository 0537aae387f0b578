use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Actor, EngineError, ResultEngine, Role, User, users,
    util::{normalize_required_name, normalize_username},
};

use super::{Engine, access::require_admin, with_tx};

/// Input for creating a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl Engine {
    /// Creates a user with the given role.
    ///
    /// This is the bootstrap path (admin CLI) and performs no authorization;
    /// request handlers go through [`Engine::create_agent`].
    pub async fn create_user(
        &self,
        user: NewUser,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let username = normalize_username(&user.username)?;
        let display_name = normalize_required_name(&user.display_name, "display")?;
        if user.password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::new_active_model(
                username.clone(),
                user.password,
                display_name,
                role,
                created_at,
            )
            .insert(&db_tx)
            .await?;
            tracing::info!(username = %username, role = role.as_str(), "user created");
            User::try_from(model)
        })
    }

    /// Provisions a new agent account.
    pub async fn create_agent(
        &self,
        actor: &Actor,
        user: NewUser,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<User> {
        require_admin(actor, "create agents")?;
        self.create_user(user, Role::Agent, created_at).await
    }

    /// Lists every agent (active or not), ordered by username.
    pub async fn list_agents(&self, actor: &Actor) -> ResultEngine<Vec<User>> {
        require_admin(actor, "list agents")?;
        let models = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Agent.as_str()))
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Marks an agent inactive; it can no longer authenticate.
    ///
    /// Customers stay assigned so their history keeps its collector.
    pub async fn deactivate_agent(&self, actor: &Actor, username: &str) -> ResultEngine<()> {
        require_admin(actor, "deactivate agents")?;
        let username = normalize_username(username)?;
        with_tx!(self, |db_tx| {
            let user = self.require_agent(&db_tx, &username).await?;
            let mut active: users::ActiveModel = user.into();
            active.active = ActiveValue::Set(false);
            active.update(&db_tx).await?;
            tracing::info!(username = %username, "agent deactivated");
            Ok(())
        })
    }

    /// Checks credentials and returns the caller's [`Actor`].
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Actor> {
        let username = normalize_username(username).map_err(|_| EngineError::Unauthorized)?;
        let user = users::Entity::find_by_id(username)
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthorized)?;

        if user.password != password || !user.active {
            return Err(EngineError::Unauthorized);
        }
        let role = Role::try_from(user.role.as_str())?;
        Ok(Actor::new(user.username, role))
    }
}
