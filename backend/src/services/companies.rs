//! Company account service: registration, session issuance, profile updates
//!
//! These flows need a live store; they are covered by the integration suite
//! under `backend/tests`.

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{CompanyPatch, CompanyRepository, NewCompany};
use crate::services::is_unique_violation;
use campusbridge_shared::types::{CompanyProfile, SignupCompanyRequest, UpdateCompanyRequest};
use campusbridge_shared::validation::{normalize_email, validate_email, validate_password};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Company service
pub struct CompanyService;

impl CompanyService {
    /// Register a new company account, returning the sanitized profile
    pub async fn sign_up(
        pool: &PgPool,
        req: SignupCompanyRequest,
    ) -> Result<CompanyProfile, ApiError> {
        let email = normalize_email(&req.email);
        validate_email(&email).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;
        if req.company_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "Company name cannot be empty".to_string(),
            ));
        }

        if let Some(confirm) = &req.confirm_password {
            if confirm != &req.password {
                return Err(ApiError::PasswordMismatch);
            }
        }

        if CompanyRepository::email_exists(pool, &email).await? {
            return Err(ApiError::EmailInUse);
        }

        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let created = CompanyRepository::create(
            pool,
            NewCompany {
                email,
                password_hash,
                company_name: req.company_name,
                industry: req.industry,
                website: req.website,
                description: req.description,
                contact_person_name: req.contact_person_name,
                phone: req.phone,
                company_size: req.company_size,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::EmailInUse
            } else {
                ApiError::Database(e)
            }
        })?;

        info!(company = %created.id, "company account created");
        Ok(created.sanitized())
    }

    /// Authenticate credentials and mint a token from the sanitized profile
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<(String, CompanyProfile), ApiError> {
        let email = normalize_email(email);

        let Some(record) = CompanyRepository::find_by_email(pool, &email).await? else {
            debug!(%email, "login failed: no such company");
            return Err(ApiError::InvalidCredentials);
        };

        let valid = PasswordService::verify_async(password.to_string(), record.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            debug!(company = %record.id, "login failed: wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let profile = record.sanitized();
        let token = tokens
            .sign(&profile)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

        info!(company = %profile.id, "company logged in");
        Ok((token, profile))
    }

    /// Update a company profile. Email changes are re-checked for
    /// uniqueness; password changes are re-hashed.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        req: UpdateCompanyRequest,
    ) -> Result<CompanyProfile, ApiError> {
        let Some(existing) = CompanyRepository::find_by_id(pool, id).await? else {
            return Err(ApiError::NotFound("Company not found".to_string()));
        };

        let email = match req.email {
            Some(raw) => {
                let email = normalize_email(&raw);
                validate_email(&email).map_err(ApiError::Validation)?;
                if email != existing.email
                    && CompanyRepository::email_exists(pool, &email).await?
                {
                    return Err(ApiError::EmailInUse);
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match req.password {
            Some(password) => {
                validate_password(&password).map_err(ApiError::Validation)?;
                Some(
                    PasswordService::hash_async(password)
                        .await
                        .map_err(ApiError::Internal)?,
                )
            }
            None => None,
        };

        let updated = CompanyRepository::update(
            pool,
            id,
            CompanyPatch {
                email,
                password_hash,
                company_name: req.company_name,
                industry: req.industry,
                website: req.website,
                description: req.description,
                contact_person_name: req.contact_person_name,
                phone: req.phone,
                company_size: req.company_size,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::EmailInUse
            } else {
                ApiError::Database(e)
            }
        })?;

        info!(company = %updated.id, "company profile updated");
        Ok(updated.sanitized())
    }
}
