//! Student account service: registration, session issuance, profile updates
//!
//! Login deliberately returns one `InvalidCredentials` error for unknown
//! email and wrong password alike; the distinction only exists in logs.
//!
//! These flows need a live store; they are covered by the integration suite
//! under `backend/tests`.

use crate::auth::{PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{NewStudent, StudentPatch, StudentRepository};
use crate::services::is_unique_violation;
use campusbridge_shared::types::{SignupStudentRequest, StudentProfile, UpdateStudentRequest};
use campusbridge_shared::validation::{
    normalize_email, validate_email, validate_graduation_year, validate_password,
};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

/// Student service
pub struct StudentService;

impl StudentService {
    /// Register a new student account, returning the sanitized profile.
    ///
    /// The email pre-check gives a friendly conflict error; the unique index
    /// catches the concurrent-signup race and maps to the same error.
    pub async fn sign_up(
        pool: &PgPool,
        req: SignupStudentRequest,
    ) -> Result<StudentProfile, ApiError> {
        let email = normalize_email(&req.email);
        validate_email(&email).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;
        if let Some(year) = &req.graduation_year {
            validate_graduation_year(year).map_err(ApiError::Validation)?;
        }

        if let Some(confirm) = &req.confirm_password {
            if confirm != &req.password {
                return Err(ApiError::PasswordMismatch);
            }
        }

        if StudentRepository::email_exists(pool, &email).await? {
            return Err(ApiError::EmailInUse);
        }

        // CPU-expensive by design; runs on the blocking pool
        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let created = StudentRepository::create(
            pool,
            NewStudent {
                email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                university: req.university,
                major: req.major,
                graduation_year: req.graduation_year,
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

        info!(student = %created.id, "student account created");
        Ok(created.sanitized())
    }

    /// Authenticate credentials and mint a token from the sanitized profile.
    /// Cookie transport is the route layer's decision, not this one's.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<(String, StudentProfile), ApiError> {
        let email = normalize_email(email);

        let Some(record) = StudentRepository::find_by_email(pool, &email).await? else {
            debug!(%email, "login failed: no such student");
            return Err(ApiError::InvalidCredentials);
        };

        let valid = PasswordService::verify_async(password.to_string(), record.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            debug!(student = %record.id, "login failed: wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let profile = record.sanitized();
        let token = tokens
            .sign(&profile)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

        info!(student = %profile.id, "student logged in");
        Ok((token, profile))
    }

    /// Update a student profile. Email changes are re-checked for
    /// uniqueness; password changes are re-hashed.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        req: UpdateStudentRequest,
    ) -> Result<StudentProfile, ApiError> {
        let Some(existing) = StudentRepository::find_by_id(pool, id).await? else {
            return Err(ApiError::NotFound("Student not found".to_string()));
        };

        let email = match req.email {
            Some(raw) => {
                let email = normalize_email(&raw);
                validate_email(&email).map_err(ApiError::Validation)?;
                if email != existing.email
                    && StudentRepository::email_exists(pool, &email).await?
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

        if let Some(year) = &req.graduation_year {
            validate_graduation_year(year).map_err(ApiError::Validation)?;
        }

        let updated = StudentRepository::update(
            pool,
            id,
            StudentPatch {
                email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                university: req.university,
                major: req.major,
                graduation_year: req.graduation_year,
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

        info!(student = %updated.id, "student profile updated");
        Ok(updated.sanitized())
    }
}
