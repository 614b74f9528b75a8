pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Applicant, Application, Benefit, Household, NewApplicant, NewApplication, NewBenefit,
    NewScheme, Scheme, SchemeBundle,
};

pub use memory::MemoryStores;
pub use postgres::{PgApplicantStore, PgApplicationStore, PgHouseholdStore, PgSchemeStore};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database manager error: {0}")]
    Pool(#[from] DatabaseError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

#[async_trait]
pub trait ApplicantStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Applicant>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Applicant>, StoreError>;
    async fn find_by_household(&self, household_id: Uuid) -> Result<Vec<Applicant>, StoreError>;
    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, StoreError>;
}

#[async_trait]
pub trait HouseholdStore: Send + Sync {
    async fn create(&self, id: Option<Uuid>) -> Result<Household, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Household>, StoreError>;
}

/// Scheme access always returns bundles so callers never see a scheme
/// without the benefits it grants.
#[async_trait]
pub trait SchemeStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SchemeBundle>, StoreError>;

    /// All schemes in creation order. Evaluation order follows this order.
    async fn find_all(&self) -> Result<Vec<SchemeBundle>, StoreError>;

    async fn insert(&self, scheme: NewScheme) -> Result<Scheme, StoreError>;
    async fn insert_benefit(&self, benefit: NewBenefit) -> Result<Benefit, StoreError>;

    /// Replace the stored rule payload. `None` clears it.
    async fn update_rule(&self, scheme_id: Uuid, payload: Option<String>) -> Result<Scheme, StoreError>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Upsert by (applicant, scheme) so re-evaluation refreshes the outcome.
    async fn record(&self, application: NewApplication) -> Result<Application, StoreError>;
    async fn find_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, StoreError>;
}

/// Bundle of store handles injected into services and CLI commands.
#[derive(Clone)]
pub struct Stores {
    pub applicants: Arc<dyn ApplicantStore>,
    pub households: Arc<dyn HouseholdStore>,
    pub schemes: Arc<dyn SchemeStore>,
    pub applications: Arc<dyn ApplicationStore>,
}

impl Stores {
    /// Postgres-backed stores over the primary database pool.
    pub async fn postgres() -> Result<Self, StoreError> {
        let pool = DatabaseManager::primary_pool().await?;
        Ok(Self::postgres_with(pool))
    }

    pub fn postgres_with(pool: PgPool) -> Self {
        Self {
            applicants: Arc::new(PgApplicantStore::new(pool.clone())),
            households: Arc::new(PgHouseholdStore::new(pool.clone())),
            schemes: Arc::new(PgSchemeStore::new(pool.clone())),
            applications: Arc::new(PgApplicationStore::new(pool)),
        }
    }

    /// In-memory stores for tests and dry runs.
    pub fn memory() -> Self {
        MemoryStores::new().into_stores()
    }
}
