//! Shared application state.

use calltrail_audit::{AuditSink, Interceptor, create_sink};
use calltrail_core::AppConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::service::{StudentService, default_tags};
use crate::student::{MemoryStudentRepository, PgStudentRepository, StudentRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    students: StudentService,
}

impl AppState {
    /// Create state from already-built parts.
    pub fn new(config: AppConfig, students: StudentService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, students }),
        }
    }

    /// Connect to the database (when enabled), run migrations, and wire the
    /// audit sink and student service from configuration.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = if config.database.enabled {
            Some(connect(&config).await?)
        } else {
            tracing::warn!("Database disabled, students are kept in memory");
            None
        };

        let sink = create_sink(&config.audit, pool.clone())?;
        let interceptor = build_interceptor(&config, sink);

        let repo: Arc<dyn StudentRepository> = match pool {
            Some(pool) => Arc::new(PgStudentRepository::new(pool)),
            None => Arc::new(MemoryStudentRepository::new()),
        };

        tracing::info!(
            audit_enabled = interceptor.is_enabled(),
            sink = ?config.audit.sink,
            "Audit interceptor ready"
        );

        let students = StudentService::new(repo, interceptor);
        Ok(Self::new(config, students))
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn students(&self) -> &StudentService {
        &self.inner.students
    }
}

/// Interceptor from config, falling back to the built-in student tags when
/// `audit.methods` is empty.
pub fn build_interceptor(config: &AppConfig, sink: Arc<dyn AuditSink>) -> Interceptor {
    let interceptor = Interceptor::from_config(&config.audit, sink);
    if config.audit.methods.is_empty() {
        interceptor.with_policy(Arc::new(default_tags()))
    } else {
        interceptor
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.connection_string())
        .await?;

    // Migrations (creates sys_log + student)
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
