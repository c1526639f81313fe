use crate::bootstrap::connect_and_migrate;
use crate::config::AppConfig;
use crate::game_management::rules::DEFAULT_TARGET_POINTS;
use crate::jwt::Claims;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::DatabaseConnection;
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub const TEST_AUTH_SECRET: &str = "test-secret";
pub const TEST_ADMIN_EMAIL: &str = "admin@example.com";

pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,coinche_backend=info"));
        // Another subscriber may already be installed by the binary under test
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// Configuration used by tests: fixed secret, one admin email, in-memory database
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        auth_secret: TEST_AUTH_SECRET.to_string(),
        admin_emails: vec![TEST_ADMIN_EMAIL.to_string()],
        default_target_points: DEFAULT_TARGET_POINTS,
        is_production: false,
    }
}

/// Test-only JWT helper that issues a signed JWT using the same algorithm and claims as production
pub fn test_issue_token(sub: &str, email: &str, name: Option<&str>, ttl_seconds: i64) -> String {
    let now = chrono::Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now.timestamp() + ttl_seconds) as usize;

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        name: name.map(str::to_string),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_AUTH_SECRET.as_ref()),
    )
    .expect("Failed to encode JWT token for test")
}

/// Fresh migrated in-memory database, one per call
pub async fn test_bootstrap() -> DatabaseConnection {
    init_tracing_for_tests();
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory database should migrate")
}
