//! Application configuration loaded from environment variables.

use std::env;

use blog_infra::database::DatabaseConfig;

const DEFAULT_SECRET: &str = "change-me-in-production";

/// Accepted range for `SESSION_LIFETIME_HOURS`: one hour to one year.
const LIFETIME_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=24 * 365;

/// Session cookie and token settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Signing key for session tokens (`SECRET_KEY`).
    pub secret: String,
    pub lifetime_hours: i64,
    /// Mark cookies `Secure` (HTTPS only).
    pub cookie_secure: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the site on in-memory storage.
    pub database: Option<DatabaseConfig>,
    pub session: SessionSettings,
    pub csrf_enabled: bool,
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

/// Keep the session lifetime inside [`LIFETIME_HOURS_RANGE`]. A zero or
/// negative lifetime would expire every session at once.
fn clamp_lifetime_hours(hours: i64) -> i64 {
    let clamped = hours.clamp(*LIFETIME_HOURS_RANGE.start(), *LIFETIME_HOURS_RANGE.end());
    if clamped != hours {
        tracing::warn!(
            requested = hours,
            used = clamped,
            "SESSION_LIFETIME_HOURS out of range"
        );
    }
    clamped
}

fn is_production() -> bool {
    env::var("RUST_ENV")
        .map(|v| v == "production" || v == "prod")
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URI").ok().map(|url| DatabaseConfig {
            max_connections: parsed("DB_MAX_CONNECTIONS", 10),
            min_connections: parsed("DB_MIN_CONNECTIONS", 1),
            ..DatabaseConfig::new(url)
        });

        let secret = env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
        if secret == DEFAULT_SECRET {
            if is_production() {
                tracing::error!(
                    "SECURITY: Using default SECRET_KEY in production! Set SECRET_KEY environment variable."
                );
            } else {
                tracing::warn!("Using default SECRET_KEY. Set SECRET_KEY for production use.");
            }
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 5000),
            database,
            session: SessionSettings {
                secret,
                lifetime_hours: clamp_lifetime_hours(parsed("SESSION_LIFETIME_HOURS", 24)),
                cookie_secure: flag("SESSION_COOKIE_SECURE", false),
            },
            csrf_enabled: flag("CSRF_ENABLED", true),
        }
    }

    /// In-memory storage, CSRF off, fixed secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database: None,
            session: SessionSettings {
                secret: "test-secret-key".to_string(),
                lifetime_hours: 1,
                cookie_secure: false,
            },
            csrf_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_in_range_is_kept() {
        assert_eq!(clamp_lifetime_hours(24), 24);
        assert_eq!(clamp_lifetime_hours(1), 1);
    }

    #[test]
    fn test_lifetime_out_of_range_is_clamped() {
        assert_eq!(clamp_lifetime_hours(0), 1);
        assert_eq!(clamp_lifetime_hours(-5), 1);
        assert_eq!(clamp_lifetime_hours(i64::MAX), 24 * 365);
    }
}
