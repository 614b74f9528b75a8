use async_trait::async_trait;
use futures::future::try_join_all;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::config::config;
use crate::database::models::{
    Applicant, Application, Benefit, Household, NewApplicant, NewApplication, NewBenefit,
    NewScheme, Scheme, SchemeBundle,
};
use crate::database::stores::{
    ApplicantStore, ApplicationStore, HouseholdStore, SchemeStore, StoreError,
};

const APPLICANT_COLUMNS: &str = "id, household_id, employment_status_id, marital_status_id, \
     gender_id, name, email, mobile_no, birth_date, created_at, updated_at";

const SCHEME_COLUMNS: &str = "id, name, description, eligibility_criteria, created_at, updated_at";

const BENEFIT_COLUMNS: &str = "id, scheme_id, name, amount, description, created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, applicant_id, scheme_id, outcome, created_at, updated_at";

pub struct PgApplicantStore {
    pool: PgPool,
}

impl PgApplicantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantStore for PgApplicantStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Applicant>, StoreError> {
        let applicant = sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(applicant)
    }

    async fn find_all(&self) -> Result<Vec<Applicant>, StoreError> {
        let applicants = sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(applicants)
    }

    async fn find_by_household(&self, household_id: Uuid) -> Result<Vec<Applicant>, StoreError> {
        let applicants = sqlx::query_as::<_, Applicant>(&format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants WHERE household_id = $1 ORDER BY created_at, id"
        ))
        .bind(household_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applicants)
    }

    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, StoreError> {
        let id = applicant.id.unwrap_or_else(Uuid::new_v4);
        let inserted = sqlx::query_as::<_, Applicant>(&format!(
            "INSERT INTO applicants \
                 (id, household_id, employment_status_id, marital_status_id, gender_id, \
                  name, email, mobile_no, birth_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now()) \
             RETURNING {APPLICANT_COLUMNS}"
        ))
        .bind(id)
        .bind(applicant.household_id)
        .bind(applicant.employment_status_id)
        .bind(applicant.marital_status_id)
        .bind(applicant.gender_id)
        .bind(&applicant.name)
        .bind(&applicant.email)
        .bind(&applicant.mobile_no)
        .bind(applicant.birth_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }
}

pub struct PgHouseholdStore {
    pool: PgPool,
}

impl PgHouseholdStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HouseholdStore for PgHouseholdStore {
    async fn create(&self, id: Option<Uuid>) -> Result<Household, StoreError> {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let household = sqlx::query_as::<_, Household>(
            "INSERT INTO households (id, created_at, updated_at) \
             VALUES ($1, now(), now()) \
             RETURNING id, created_at, updated_at",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(household)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Household>, StoreError> {
        let household = sqlx::query_as::<_, Household>(
            "SELECT id, created_at, updated_at FROM households WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(household)
    }
}

pub struct PgSchemeStore {
    pool: PgPool,
}

impl PgSchemeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn benefits_of(&self, scheme_id: Uuid) -> Result<Vec<Benefit>, StoreError> {
        let benefits = sqlx::query_as::<_, Benefit>(&format!(
            "SELECT {BENEFIT_COLUMNS} FROM benefits WHERE scheme_id = $1 ORDER BY created_at, id"
        ))
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(benefits)
    }

    async fn bundle(&self, scheme: Scheme) -> Result<SchemeBundle, StoreError> {
        let benefits = self.benefits_of(scheme.id).await?;
        Ok(SchemeBundle { scheme, benefits })
    }
}

#[async_trait]
impl SchemeStore for PgSchemeStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SchemeBundle>, StoreError> {
        let scheme = sqlx::query_as::<_, Scheme>(&format!(
            "SELECT {SCHEME_COLUMNS} FROM schemes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match scheme {
            Some(scheme) => Ok(Some(self.bundle(scheme).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<SchemeBundle>, StoreError> {
        if config().database.enable_query_logging {
            debug!("Loading all schemes with benefits");
        }

        let schemes = sqlx::query_as::<_, Scheme>(&format!(
            "SELECT {SCHEME_COLUMNS} FROM schemes ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        try_join_all(schemes.into_iter().map(|scheme| self.bundle(scheme))).await
    }

    async fn insert(&self, scheme: NewScheme) -> Result<Scheme, StoreError> {
        let id = scheme.id.unwrap_or_else(Uuid::new_v4);
        let inserted = sqlx::query_as::<_, Scheme>(&format!(
            "INSERT INTO schemes (id, name, description, eligibility_criteria, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, now(), now()) \
             RETURNING {SCHEME_COLUMNS}"
        ))
        .bind(id)
        .bind(&scheme.name)
        .bind(&scheme.description)
        .bind(&scheme.eligibility_criteria)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn insert_benefit(&self, benefit: NewBenefit) -> Result<Benefit, StoreError> {
        let id = benefit.id.unwrap_or_else(Uuid::new_v4);
        let inserted = sqlx::query_as::<_, Benefit>(&format!(
            "INSERT INTO benefits (id, scheme_id, name, amount, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) \
             RETURNING {BENEFIT_COLUMNS}"
        ))
        .bind(id)
        .bind(benefit.scheme_id)
        .bind(&benefit.name)
        .bind(benefit.amount)
        .bind(&benefit.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn update_rule(&self, scheme_id: Uuid, payload: Option<String>) -> Result<Scheme, StoreError> {
        let updated = sqlx::query_as::<_, Scheme>(&format!(
            "UPDATE schemes SET eligibility_criteria = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {SCHEME_COLUMNS}"
        ))
        .bind(scheme_id)
        .bind(&payload)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| StoreError::not_found("scheme", scheme_id))
    }
}

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn record(&self, application: NewApplication) -> Result<Application, StoreError> {
        if config().database.enable_query_logging {
            debug!(
                "Recording outcome {} for applicant {} / scheme {}",
                application.outcome, application.applicant_id, application.scheme_id
            );
        }

        let id = application.id.unwrap_or_else(Uuid::new_v4);
        let recorded = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (id, applicant_id, scheme_id, outcome, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, now(), now()) \
             ON CONFLICT (applicant_id, scheme_id) \
             DO UPDATE SET outcome = EXCLUDED.outcome, updated_at = now() \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(application.applicant_id)
        .bind(application.scheme_id)
        .bind(&application.outcome)
        .fetch_one(&self.pool)
        .await?;

        Ok(recorded)
    }

    async fn find_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, StoreError> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE applicant_id = $1 ORDER BY created_at, id"
        ))
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }
}
