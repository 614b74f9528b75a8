use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    Applicant, Application, Benefit, Household, NewApplicant, NewApplication, NewBenefit,
    NewScheme, Scheme, SchemeBundle,
};
use crate::database::stores::{
    ApplicantStore, ApplicationStore, HouseholdStore, SchemeStore, StoreError, Stores,
};

/// In-memory store backend. Rows live in insertion order so evaluation
/// order is as deterministic as the Postgres backend's.
#[derive(Clone, Default)]
pub struct MemoryStores {
    applicants: Arc<RwLock<Vec<Applicant>>>,
    households: Arc<RwLock<Vec<Household>>>,
    schemes: Arc<RwLock<Vec<Scheme>>>,
    benefits: Arc<RwLock<Vec<Benefit>>>,
    applications: Arc<RwLock<Vec<Application>>>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split one shared backend into the injectable store handles.
    pub fn into_stores(self) -> Stores {
        Stores {
            applicants: Arc::new(self.clone()),
            households: Arc::new(self.clone()),
            schemes: Arc::new(self.clone()),
            applications: Arc::new(self),
        }
    }

    async fn bundle(&self, scheme: Scheme) -> SchemeBundle {
        let benefits = self
            .benefits
            .read()
            .await
            .iter()
            .filter(|b| b.scheme_id == scheme.id)
            .cloned()
            .collect();
        SchemeBundle { scheme, benefits }
    }
}

#[async_trait]
impl ApplicantStore for MemoryStores {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Applicant>, StoreError> {
        Ok(self.applicants.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Applicant>, StoreError> {
        Ok(self.applicants.read().await.clone())
    }

    async fn find_by_household(&self, household_id: Uuid) -> Result<Vec<Applicant>, StoreError> {
        Ok(self
            .applicants
            .read()
            .await
            .iter()
            .filter(|a| a.household_id == Some(household_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, applicant: NewApplicant) -> Result<Applicant, StoreError> {
        let now = Utc::now();
        let row = Applicant {
            id: applicant.id.unwrap_or_else(Uuid::new_v4),
            household_id: applicant.household_id,
            employment_status_id: applicant.employment_status_id,
            marital_status_id: applicant.marital_status_id,
            gender_id: applicant.gender_id,
            name: applicant.name,
            email: applicant.email,
            mobile_no: applicant.mobile_no,
            birth_date: applicant.birth_date,
            created_at: now,
            updated_at: now,
        };
        self.applicants.write().await.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl HouseholdStore for MemoryStores {
    async fn create(&self, id: Option<Uuid>) -> Result<Household, StoreError> {
        let now = Utc::now();
        let row = Household {
            id: id.unwrap_or_else(Uuid::new_v4),
            created_at: now,
            updated_at: now,
        };
        self.households.write().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Household>, StoreError> {
        Ok(self.households.read().await.iter().find(|h| h.id == id).cloned())
    }
}

#[async_trait]
impl SchemeStore for MemoryStores {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SchemeBundle>, StoreError> {
        let scheme = self.schemes.read().await.iter().find(|s| s.id == id).cloned();
        match scheme {
            Some(scheme) => Ok(Some(self.bundle(scheme).await)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<SchemeBundle>, StoreError> {
        let schemes = self.schemes.read().await.clone();
        let mut bundles = Vec::with_capacity(schemes.len());
        for scheme in schemes {
            bundles.push(self.bundle(scheme).await);
        }
        Ok(bundles)
    }

    async fn insert(&self, scheme: NewScheme) -> Result<Scheme, StoreError> {
        let now = Utc::now();
        let row = Scheme {
            id: scheme.id.unwrap_or_else(Uuid::new_v4),
            name: scheme.name,
            description: scheme.description,
            eligibility_criteria: scheme.eligibility_criteria,
            created_at: now,
            updated_at: now,
        };
        self.schemes.write().await.push(row.clone());
        Ok(row)
    }

    async fn insert_benefit(&self, benefit: NewBenefit) -> Result<Benefit, StoreError> {
        let scheme_exists = self
            .schemes
            .read()
            .await
            .iter()
            .any(|s| s.id == benefit.scheme_id);
        if !scheme_exists {
            return Err(StoreError::not_found("scheme", benefit.scheme_id));
        }

        let now = Utc::now();
        let row = Benefit {
            id: benefit.id.unwrap_or_else(Uuid::new_v4),
            scheme_id: benefit.scheme_id,
            name: benefit.name,
            amount: benefit.amount,
            description: benefit.description,
            created_at: now,
            updated_at: now,
        };
        self.benefits.write().await.push(row.clone());
        Ok(row)
    }

    async fn update_rule(&self, scheme_id: Uuid, payload: Option<String>) -> Result<Scheme, StoreError> {
        let mut schemes = self.schemes.write().await;
        let scheme = schemes
            .iter_mut()
            .find(|s| s.id == scheme_id)
            .ok_or_else(|| StoreError::not_found("scheme", scheme_id))?;

        scheme.eligibility_criteria = payload;
        scheme.updated_at = Utc::now();
        Ok(scheme.clone())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStores {
    async fn record(&self, application: NewApplication) -> Result<Application, StoreError> {
        let mut applications = self.applications.write().await;
        if let Some(existing) = applications
            .iter_mut()
            .find(|a| a.applicant_id == application.applicant_id && a.scheme_id == application.scheme_id)
        {
            existing.outcome = application.outcome;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let row = Application {
            id: application.id.unwrap_or_else(Uuid::new_v4),
            applicant_id: application.applicant_id,
            scheme_id: application.scheme_id,
            outcome: application.outcome,
            created_at: now,
            updated_at: now,
        };
        applications.push(row.clone());
        Ok(row)
    }

    async fn find_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Application;

    #[tokio::test]
    async fn record_upserts_by_applicant_and_scheme() {
        let stores = MemoryStores::new();
        let applicant_id = Uuid::new_v4();
        let scheme_id = Uuid::new_v4();

        let first = stores
            .record(NewApplication {
                id: None,
                applicant_id,
                scheme_id,
                outcome: Application::OUTCOME_NOT_ELIGIBLE.to_string(),
            })
            .await
            .unwrap();

        let second = stores
            .record(NewApplication {
                id: None,
                applicant_id,
                scheme_id,
                outcome: Application::OUTCOME_ELIGIBLE.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.outcome, Application::OUTCOME_ELIGIBLE);
        assert_eq!(stores.find_by_applicant(applicant_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rule_requires_existing_scheme() {
        let stores = MemoryStores::new();
        let missing = Uuid::new_v4();
        let err = stores.update_rule(missing, None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "scheme", .. }));
    }

    #[tokio::test]
    async fn benefits_require_existing_scheme() {
        let stores = MemoryStores::new();
        let err = stores
            .insert_benefit(NewBenefit {
                id: None,
                scheme_id: Uuid::new_v4(),
                name: "CPF Medisave Top-up".to_string(),
                amount: None,
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "scheme", .. }));
    }
}
