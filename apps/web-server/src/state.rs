//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use actix_web::rt;

use blog_core::ports::{Cache, PasswordService, PostRepository, TokenService, UserRepository};
use blog_infra::auth::{Argon2PasswordService, JwtSessionTokenService, SessionTokenConfig};
use blog_infra::cache::InMemoryCache;
use blog_infra::database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use blog_infra::database::{
    DatabaseConnections, DbErr, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;
use crate::views::Views;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[cfg(feature = "postgres")]
    #[error("database: {0}")]
    Database(#[from] DbErr),

    #[error("templates: {0}")]
    Templates(#[from] tera::Error),
}

/// Request-handling settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WebSettings {
    pub csrf_enabled: bool,
    pub cookie_secure: bool,
    pub session_lifetime: Duration,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub tokens: Arc<dyn TokenService>,
    /// Server-side session records, `session:<id>` -> user id.
    pub sessions: Arc<dyn Cache>,
    pub views: Arc<Views>,
    pub settings: Arc<WebSettings>,
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

fn in_memory_repositories() -> Repositories {
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new(users.clone()));
    (users, posts)
}

impl AppState {
    /// Build the state, connecting to `DATABASE_URI` when it is set.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        #[cfg(feature = "postgres")]
        let repos: Repositories = match &config.database {
            Some(db_config) => {
                let db = DatabaseConnections::init(db_config).await?;
                db.create_schema().await?;
                (
                    Arc::new(PostgresUserRepository::shared(db.main.clone())),
                    Arc::new(PostgresPostRepository::shared(db.main.clone())),
                )
            }
            None => {
                tracing::warn!("DATABASE_URI not set. Running without database (in-memory mode).");
                in_memory_repositories()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos: Repositories = {
            if config.database.is_some() {
                tracing::warn!("Built without postgres feature - ignoring DATABASE_URI");
            }
            in_memory_repositories()
        };

        let sessions = Arc::new(InMemoryCache::new());
        spawn_session_sweeper(sessions.clone());

        let state = Self::assemble(config, repos, sessions)?;
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// State backed entirely by in-memory storage.
    #[cfg(test)]
    pub fn in_memory(config: &AppConfig) -> Result<Self, StartupError> {
        Self::assemble(
            config,
            in_memory_repositories(),
            Arc::new(InMemoryCache::new()),
        )
    }

    fn assemble(
        config: &AppConfig,
        (users, posts): Repositories,
        sessions: Arc<InMemoryCache>,
    ) -> Result<Self, StartupError> {
        let tokens = JwtSessionTokenService::new(SessionTokenConfig {
            secret: config.session.secret.clone(),
            lifetime_hours: config.session.lifetime_hours,
            ..SessionTokenConfig::default()
        });

        let lifetime_secs = u64::try_from(tokens.lifetime_seconds()).unwrap_or(0);

        Ok(Self {
            users,
            posts,
            passwords: Arc::new(Argon2PasswordService::new()),
            tokens: Arc::new(tokens),
            sessions,
            views: Arc::new(Views::new()?),
            settings: Arc::new(WebSettings {
                csrf_enabled: config.csrf_enabled,
                cookie_secure: config.session.cookie_secure,
                session_lifetime: Duration::from_secs(lifetime_secs),
            }),
        })
    }
}

/// Periodically drop expired session records so abandoned sessions do not
/// accumulate.
fn spawn_session_sweeper(sessions: Arc<InMemoryCache>) {
    rt::spawn(async move {
        let mut ticker = rt::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Purged expired sessions");
            }
        }
    });
}
