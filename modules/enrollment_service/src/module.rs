//! Module declaration and lifecycle
//!
//! The host application owns the database connection and the HTTP server;
//! this type turns a connection into repositories, the domain service, the
//! native client and the REST router.

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::AssociationApi;
use crate::domain::{Repositories, Service, TracingEventPublisher};
use crate::infra::storage::repositories::{
    SeaOrmActivityRepository, SeaOrmAttendanceRepository, SeaOrmEnrollmentRepository,
    SeaOrmFeeRepository, SeaOrmSlotRepository, SeaOrmStudentRepository,
};
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Enrollment service module
pub struct EnrollmentServiceModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for EnrollmentServiceModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            service: RwLock::new(None),
        }
    }
}

impl EnrollmentServiceModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            service: RwLock::new(None),
        }
    }

    /// Build repositories and the domain service over `db`
    pub fn init(&self, db: Arc<DatabaseConnection>) -> Result<Arc<Service>> {
        let repos = Repositories {
            students: Arc::new(SeaOrmStudentRepository::new(db.clone())),
            activities: Arc::new(SeaOrmActivityRepository::new(db.clone())),
            slots: Arc::new(SeaOrmSlotRepository::new(db.clone())),
            enrollments: Arc::new(SeaOrmEnrollmentRepository::new(db.clone())),
            attendance: Arc::new(SeaOrmAttendanceRepository::new(db.clone())),
            fees: Arc::new(SeaOrmFeeRepository::new(db)),
        };

        let config = self.config.read().clone();
        let service = Arc::new(Service::new(
            repos,
            Arc::new(TracingEventPublisher),
            config,
        ));
        *self.service.write() = Some(service.clone());

        tracing::info!("Enrollment service initialized");
        Ok(service)
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Enrollment service migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client over the initialized service
    pub fn client(&self) -> Result<Arc<dyn AssociationApi>> {
        Ok(Arc::new(NativeClient::new(self.service()?)))
    }

    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;
        tracing::info!("Registering enrollment service REST routes");
        Ok(crate::api::rest::routes::register_routes(router, service))
    }
}
