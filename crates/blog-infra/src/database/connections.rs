use std::time::Duration;

#[cfg(feature = "postgres")]
use std::sync::Arc;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr, Schema};

#[cfg(feature = "postgres")]
use super::entity::{post, user};

/// Configuration for the site database (`DATABASE_URI`).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Pooled connection to the site database, shared by the repositories.
#[cfg(feature = "postgres")]
pub struct DatabaseConnections {
    pub main: Arc<DbConn>,
}

#[cfg(feature = "postgres")]
impl DatabaseConnections {
    /// Open the connection pool.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!(
            "Database connected (pool: {}..{})",
            config.min_connections,
            config.max_connections
        );

        Ok(Self {
            main: Arc::new(main),
        })
    }

    /// Create the `users` and `posts` tables if they do not exist yet.
    /// `users` goes first: `posts.user_id` references it.
    pub async fn create_schema(&self) -> Result<(), DbErr> {
        let backend = self.main.get_database_backend();
        let schema = Schema::new(backend);

        let mut users = schema.create_table_from_entity(user::Entity);
        users.if_not_exists();
        self.main.execute(backend.build(&users)).await?;

        let mut posts = schema.create_table_from_entity(post::Entity);
        posts.if_not_exists();
        self.main.execute(backend.build(&posts)).await?;

        tracing::info!("Database schema ready");
        Ok(())
    }
}
