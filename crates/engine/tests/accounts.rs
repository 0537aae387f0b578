use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Actor, CustomerUpdate, Engine, EngineError, Money, NewCustomer, NewPosting, NewUser, Role,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password, display_name, role, active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            "root".into(),
            "secret".into(),
            "Root".into(),
            "admin".into(),
            true.into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn new_agent(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "pw".to_string(),
        display_name: format!("Agent {username}"),
    }
}

#[tokio::test]
async fn admin_provisions_and_lists_agents() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");

    engine
        .create_agent(&admin, new_agent("  Meena "), Utc::now())
        .await
        .unwrap();
    engine
        .create_agent(&admin, new_agent("arjun"), Utc::now())
        .await
        .unwrap();

    let agents = engine.list_agents(&admin).await.unwrap();
    let names: Vec<&str> = agents.iter().map(|a| a.username.as_str()).collect();
    assert_eq!(names, ["arjun", "meena"]);
    assert!(agents.iter().all(|a| a.role == Role::Agent && a.active));

    let err = engine
        .create_agent(&admin, new_agent("arjun"), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("arjun".to_string()));
}

#[tokio::test]
async fn agents_cannot_manage_accounts() {
    let (engine, _db) = engine_with_db().await;
    let agent = Actor::agent("meena");

    let err = engine
        .create_agent(&agent, new_agent("arjun"), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("only administrators can create agents".to_string())
    );
    assert!(matches!(
        engine.list_agents(&agent).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn authenticate_checks_password_and_activity() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");

    let actor = engine.authenticate("root", "secret").await.unwrap();
    assert_eq!(actor, Actor::admin("root"));
    assert_eq!(
        engine.authenticate("root", "wrong").await,
        Err(EngineError::Unauthorized)
    );
    assert_eq!(
        engine.authenticate("ghost", "secret").await,
        Err(EngineError::Unauthorized)
    );

    engine
        .create_agent(&admin, new_agent("meena"), Utc::now())
        .await
        .unwrap();
    assert_eq!(
        engine.authenticate("Meena", "pw").await.unwrap(),
        Actor::agent("meena")
    );

    engine.deactivate_agent(&admin, "meena").await.unwrap();
    assert_eq!(
        engine.authenticate("meena", "pw").await,
        Err(EngineError::Unauthorized)
    );
}

#[tokio::test]
async fn customers_are_scoped_to_their_agent() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");
    for name in ["meena", "arjun"] {
        engine
            .create_agent(&admin, new_agent(name), Utc::now())
            .await
            .unwrap();
    }

    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    for (name, agent) in [("Zoya", "meena"), ("Anil", "meena"), ("Bala", "arjun")] {
        engine
            .create_customer(
                &admin,
                NewCustomer {
                    name: name.to_string(),
                    agent_id: Some(agent.to_string()),
                    ..NewCustomer::default()
                },
                created_at,
            )
            .await
            .unwrap();
    }

    let all = engine.list_customers(&admin).await.unwrap();
    assert_eq!(all.len(), 3);

    let mine = engine.list_customers(&Actor::agent("meena")).await.unwrap();
    let names: Vec<&str> = mine.iter().map(|c| c.customer.name.as_str()).collect();
    assert_eq!(names, ["Anil", "Zoya"]);
}

#[tokio::test]
async fn customer_needs_an_active_agent() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");

    let err = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Kiran".to_string(),
                agent_id: Some("nobody".to_string()),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("agent not exists".to_string()));

    let err = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Kiran".to_string(),
                agent_id: Some("root".to_string()),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRole(_)));

    let err = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "   ".to_string(),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn list_balance_includes_opening_and_postings() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");

    let customer = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Devi".to_string(),
                opening_balance: Money::new(-5_000),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    let untouched = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Esha".to_string(),
                opening_balance: Money::new(1_200),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

    for amount in [2_000, 1_500] {
        engine
            .record_collection(
                &admin,
                NewPosting {
                    customer_id: customer.id,
                    amount: Money::new(amount),
                    note: None,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();
    }

    let listed = engine.list_customers(&admin).await.unwrap();
    let devi = listed.iter().find(|c| c.customer.id == customer.id).unwrap();
    assert_eq!(devi.balance, Money::new(-1_500));
    let esha = listed.iter().find(|c| c.customer.id == untouched.id).unwrap();
    assert_eq!(esha.balance, Money::new(1_200));
}

#[tokio::test]
async fn update_and_delete_customer() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");
    engine
        .create_agent(&admin, new_agent("meena"), Utc::now())
        .await
        .unwrap();

    let customer = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Farah".to_string(),
                phone: Some("98450 00000".to_string()),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();

    let updated = engine
        .update_customer(
            &admin,
            customer.id,
            CustomerUpdate {
                phone: Some(None),
                agent_id: Some(Some("meena".to_string())),
                opening_balance: Some(Money::new(300)),
                ..CustomerUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Farah");
    assert_eq!(updated.phone, None);
    assert_eq!(updated.agent_id.as_deref(), Some("meena"));
    assert_eq!(updated.opening_balance, Money::new(300));

    engine
        .record_collection(
            &Actor::agent("meena"),
            NewPosting {
                customer_id: customer.id,
                amount: Money::new(100),
                note: Some("first visit".to_string()),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_customer(&Actor::agent("meena"), customer.id).await,
        Err(EngineError::Forbidden(_))
    ));
    engine.delete_customer(&admin, customer.id).await.unwrap();
    assert_eq!(
        engine.customer(&admin, customer.id).await,
        Err(EngineError::KeyNotFound("customer not exists".to_string()))
    );
    assert!(engine
        .recent_transactions(&admin, 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn opening_balance_beyond_limit_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let admin = Actor::admin("root");

    let err = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Gita".to_string(),
                opening_balance: Money::new(i64::MIN),
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let customer = engine
        .create_customer(
            &admin,
            NewCustomer {
                name: "Gita".to_string(),
                opening_balance: -Money::LIMIT,
                ..NewCustomer::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    let err = engine
        .update_customer(
            &admin,
            customer.id,
            CustomerUpdate {
                opening_balance: Some(Money::new(i64::MAX)),
                ..CustomerUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}
