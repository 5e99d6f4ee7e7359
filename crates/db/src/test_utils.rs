//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases.

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER")
                .unwrap_or_else(|_| "foodgram_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "foodgram_test".to_string()),
            database: std::env::var("TEST_DB_NAME")
                .unwrap_or_else(|_| "foodgram_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// Get URL for connecting to postgres database (for creating test DB).
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated test database, optionally created just for one test.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect with custom configuration and run migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self { conn, config })
    }

    /// Create a unique, migrated test database (for parallel tests).
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("foodgram_test_{}", &unique_suffix[..8]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;

        let create_db = format!("CREATE DATABASE \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, create_db))
            .await?;

        postgres_conn.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Created unique test database");

        Ok(Self { conn, config })
    }

    /// Drop the test database. Consumes self to close the connection first.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        self.conn.close().await?;

        let postgres_conn = Database::connect(&self.config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            self.config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok();

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", self.config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;

        postgres_conn.close().await?;

        info!(database = %self.config.database, "Dropped test database");
        Ok(())
    }
}
