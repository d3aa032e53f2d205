use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use homeserve_api::{
    config::AppConfig,
    db,
    entities::{category, city, service, user},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory DB
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", homeserve_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Issue a JSON request against the in-process router.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = if let Some(body) = body {
            builder = builder.header("content-type", "application/json");
            builder
                .body(Body::from(body.to_string()))
                .expect("failed to build request")
        } else {
            builder.body(Body::empty()).expect("failed to build request")
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Seed a user row.
    pub async fn seed_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        let model = user::ActiveModel {
            id: Set(id),
            username: Set(format!("user-{}", &id.to_string()[..8])),
            phone: Set(format!("+91{}", &id.simple().to_string()[..10])),
            email: Set(format!("{}@example.com", &id.to_string()[..8])),
            created_at: Set(Utc::now()),
        };
        model
            .insert(&*self.state.db)
            .await
            .expect("failed to seed user");
        id
    }

    /// Seed a city row.
    #[allow(dead_code)]
    pub async fn seed_city(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let model = city::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
        };
        model
            .insert(&*self.state.db)
            .await
            .expect("failed to seed city");
        id
    }

    /// Seed a category row.
    pub async fn seed_category(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let model = category::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
        };
        model
            .insert(&*self.state.db)
            .await
            .expect("failed to seed category");
        id
    }

    /// Seed a catalog service row under the given category.
    pub async fn seed_service(&self, category_id: Uuid, name: &str, price: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        let model = service::ActiveModel {
            id: Set(id),
            category_id: Set(category_id),
            name: Set(name.to_string()),
            price: Set(price),
            duration: Set("2 hrs".to_string()),
            description: Set(format!("{} service", name)),
        };
        model
            .insert(&*self.state.db)
            .await
            .expect("failed to seed service");
        id
    }
}
