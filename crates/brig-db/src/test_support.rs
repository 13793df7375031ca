//! Shared test utilities for brig-db tests.

pub(crate) mod helpers {
    use brig_config::BrigConfig;
    use brig_core::actor::Actor;
    use brig_core::entities::{NewProject, NewUser, Project, User};
    use chrono::NaiveDate;

    use crate::BrigDb;
    use crate::service::BrigService;

    /// In-memory service with the default configuration.
    pub async fn test_service() -> BrigService {
        test_service_with(&BrigConfig::default()).await
    }

    pub async fn test_service_with(config: &BrigConfig) -> BrigService {
        let db = BrigDb::open_local(":memory:").await.unwrap();
        BrigService::from_db(db, config)
    }

    /// Create a user and return it as an actor.
    pub async fn seed_actor(svc: &BrigService, username: &str) -> (User, Actor) {
        let user = svc.create_user(None, NewUser::new(username)).await.unwrap();
        let actor = Actor::new(user.id, user.username.clone());
        (user, actor)
    }

    pub async fn seed_project(svc: &BrigService, actor: Option<&Actor>, name: &str) -> Project {
        svc.create_project(
            actor,
            NewProject::new(
                name,
                "Acme",
                1_000_000.0,
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ),
        )
        .await
        .unwrap()
    }

    pub async fn count_rows(svc: &BrigService, table: &str) -> i64 {
        let mut rows = svc
            .db()
            .conn()
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}
