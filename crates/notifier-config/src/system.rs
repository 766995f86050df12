//! Notifier configuration parsing.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use notifier_core::SelectionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://notifier@127.0.0.1:5432/notifier".to_string(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Settings for one scheduling pass and the trigger cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Width of a time bucket in minutes.
    pub bucket_minutes: u32,
    /// Time between passes in `serve` mode.
    pub interval: Duration,
    /// Tenants loaded concurrently.
    pub concurrency: usize,
    /// Deadline for each store query.
    pub query_timeout: Duration,
    /// Deadline for each enqueue.
    pub enqueue_timeout: Duration,
    /// Offset of the deployment's local time from UTC, for time-of-day.
    pub utc_offset_minutes: i32,
    pub selection: SelectionPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 1,
            interval: Duration::from_secs(60),
            concurrency: 8,
            query_timeout: Duration::from_millis(5000),
            enqueue_timeout: Duration::from_millis(2000),
            utc_offset_minutes: 0,
            selection: SelectionPolicy::Uniform,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            id: "worker-1".to_string(),
            poll_interval: Duration::from_millis(1000),
            error_backoff: Duration::from_millis(5000),
        }
    }
}

impl NotifierConfig {
    /// Connections for the scheduler's query pool. Every tenant in flight
    /// runs its trending and eligibility queries side by side, so the pool
    /// never drops below two connections per concurrent tenant.
    pub fn scheduler_pool_size(&self) -> u32 {
        let per_tenant = u32::try_from(self.scheduler.concurrency)
            .unwrap_or(u32::MAX)
            .saturating_mul(2);
        self.database.max_connections.max(per_tenant)
    }
}

/// Read and parse a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<NotifierConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from KDL text. Missing nodes fall back to defaults.
pub fn parse_config(kdl: &str) -> ConfigResult<NotifierConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = NotifierConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "database" => parse_database(node, &mut config.database)?,
            "scheduler" => parse_scheduler(node, &mut config.scheduler)?,
            "worker" => parse_worker(node, &mut config.worker)?,
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn parse_database(node: &KdlNode, db: &mut DatabaseConfig) -> ConfigResult<()> {
    if let Some(url) = get_string_prop(node, "url") {
        db.url = url;
    }
    if let Some(n) = get_int_prop(node, "max-connections") {
        db.max_connections = positive("database max-connections", n)?;
    }
    if let Some(n) = get_int_prop(node, "connect-timeout-secs") {
        db.connect_timeout = Duration::from_secs(positive("database connect-timeout-secs", n)?);
    }
    if db.url.is_empty() {
        return Err(ConfigError::MissingField("database url".to_string()));
    }
    Ok(())
}

fn parse_scheduler(node: &KdlNode, sched: &mut SchedulerConfig) -> ConfigResult<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        let name = child.name().value();
        let field = format!("scheduler {name}");
        match name {
            "bucket-minutes" => {
                sched.bucket_minutes = positive(&field, require_int(child, &field)?)?;
            }
            "interval-secs" => {
                sched.interval = Duration::from_secs(positive(&field, require_int(child, &field)?)?);
            }
            "concurrency" => {
                sched.concurrency = positive(&field, require_int(child, &field)?)?;
            }
            "query-timeout-ms" => {
                sched.query_timeout =
                    Duration::from_millis(positive(&field, require_int(child, &field)?)?);
            }
            "enqueue-timeout-ms" => {
                sched.enqueue_timeout =
                    Duration::from_millis(positive(&field, require_int(child, &field)?)?);
            }
            "utc-offset-minutes" => {
                let minutes = require_int(child, &field)?;
                if minutes <= -1440 || minutes >= 1440 {
                    return Err(ConfigError::InvalidValue {
                        field,
                        message: format!("{minutes} is not within a day"),
                    });
                }
                sched.utc_offset_minutes = minutes as i32;
            }
            "selection" => {
                let policy = get_first_string_arg(child)
                    .ok_or_else(|| ConfigError::MissingField(field.clone()))?;
                sched.selection = policy.parse().map_err(|e: notifier_core::Error| {
                    ConfigError::InvalidValue {
                        field,
                        message: e.to_string(),
                    }
                })?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_worker(node: &KdlNode, worker: &mut WorkerConfig) -> ConfigResult<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        let name = child.name().value();
        let field = format!("worker {name}");
        match name {
            "id" => {
                worker.id = get_first_string_arg(child)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| ConfigError::MissingField(field))?;
            }
            "poll-interval-ms" => {
                worker.poll_interval =
                    Duration::from_millis(positive(&field, require_int(child, &field)?)?);
            }
            "error-backoff-ms" => {
                worker.error_backoff =
                    Duration::from_millis(positive(&field, require_int(child, &field)?)?);
            }
            _ => {}
        }
    }
    Ok(())
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_first_int_arg(node: &KdlNode) -> Option<i128> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_int_prop(node: &KdlNode, name: &str) -> Option<i128> {
    node.get(name).and_then(|v| v.as_integer())
}

fn require_int(node: &KdlNode, field: &str) -> ConfigResult<i128> {
    get_first_int_arg(node).ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        message: "expected an integer".to_string(),
    })
}

fn positive<T: TryFrom<i128>>(field: &str, value: i128) -> ConfigResult<T> {
    if value <= 0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("must be positive, got {value}"),
        });
    }
    T::try_from(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("{value} is out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let kdl = r#"
            database url="postgres://n@db:5432/n" max-connections=4 connect-timeout-secs=2

            scheduler {
                bucket-minutes 1
                interval-secs 30
                concurrency 16
                query-timeout-ms 750
                enqueue-timeout-ms 250
                utc-offset-minutes 330
                selection "rank-weighted"
            }

            worker {
                id "worker-7"
                poll-interval-ms 200
                error-backoff-ms 900
            }
        "#;

        let config = parse_config(kdl).unwrap();
        assert_eq!(config.database.url, "postgres://n@db:5432/n");
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.database.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.scheduler.interval, Duration::from_secs(30));
        assert_eq!(config.scheduler.concurrency, 16);
        assert_eq!(config.scheduler.query_timeout, Duration::from_millis(750));
        assert_eq!(config.scheduler.enqueue_timeout, Duration::from_millis(250));
        assert_eq!(config.scheduler.utc_offset_minutes, 330);
        assert_eq!(config.scheduler.selection, SelectionPolicy::RankWeighted);
        assert_eq!(config.worker.id, "worker-7");
        assert_eq!(config.worker.poll_interval, Duration::from_millis(200));
        assert_eq!(config.worker.error_backoff, Duration::from_millis(900));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.scheduler.bucket_minutes, 1);
        assert_eq!(config.scheduler.interval, Duration::from_secs(60));
        assert_eq!(config.scheduler.selection, SelectionPolicy::Uniform);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_reject_zero_concurrency() {
        let kdl = r#"
            scheduler {
                concurrency 0
            }
        "#;
        assert!(matches!(
            parse_config(kdl).unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_reject_unknown_selection() {
        let kdl = r#"
            scheduler {
                selection "top-only"
            }
        "#;
        assert!(matches!(
            parse_config(kdl).unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_reject_offset_beyond_a_day() {
        let kdl = r#"
            scheduler {
                utc-offset-minutes 1440
            }
        "#;
        assert!(parse_config(kdl).is_err());
    }

    #[test]
    fn test_scheduler_pool_covers_concurrent_tenants() {
        let mut config = NotifierConfig::default();
        assert_eq!(config.scheduler_pool_size(), 16);

        config.scheduler.concurrency = 2;
        assert_eq!(config.scheduler_pool_size(), 10);

        config.database.max_connections = 40;
        config.scheduler.concurrency = 32;
        assert_eq!(config.scheduler_pool_size(), 64);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_config("scheduler {").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
