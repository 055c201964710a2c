//! Company account repository

use campusbridge_shared::types::{CompanyProfile, Role};
use campusbridge_shared::validation::normalize_email;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Company row, the only company type that carries the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyRecord {
    /// Strip the hash, producing the outward-facing profile
    pub fn sanitized(self) -> CompanyProfile {
        CompanyProfile {
            id: self.id,
            email: self.email,
            role: Role::Company,
            company_name: self.company_name,
            industry: self.industry,
            website: self.website,
            description: self.description,
            contact_person_name: self.contact_person_name,
            phone: self.phone,
            company_size: self.company_size,
            created_at: self.created_at,
        }
    }
}

/// Input for creating a company
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub email: String,
    pub password_hash: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct CompanyPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub contact_person_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
}

/// Company repository over the shared pool
pub struct CompanyRepository;

impl CompanyRepository {
    /// Find by email, normalizing the key to match storage normalization
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<CompanyRecord>, sqlx::Error> {
        sqlx::query_as::<_, CompanyRecord>(
            r#"
            SELECT id, email, password_hash, company_name, industry, website,
                   description, contact_person_name, phone, company_size,
                   created_at, updated_at
            FROM companies
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<CompanyRecord>, sqlx::Error> {
        sqlx::query_as::<_, CompanyRecord>(
            r#"
            SELECT id, email, password_hash, company_name, industry, website,
                   description, contact_person_name, phone, company_size,
                   created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a new company; the unique email index is the concurrency
    /// backstop, callers map the unique violation.
    pub async fn create(pool: &PgPool, new: NewCompany) -> Result<CompanyRecord, sqlx::Error> {
        sqlx::query_as::<_, CompanyRecord>(
            r#"
            INSERT INTO companies
                (email, password_hash, company_name, industry, website,
                 description, contact_person_name, phone, company_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, email, password_hash, company_name, industry, website,
                      description, contact_person_name, phone, company_size,
                      created_at, updated_at
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.company_name)
        .bind(new.industry)
        .bind(new.website)
        .bind(new.description)
        .bind(new.contact_person_name)
        .bind(new.phone)
        .bind(new.company_size)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: CompanyPatch,
    ) -> Result<CompanyRecord, sqlx::Error> {
        sqlx::query_as::<_, CompanyRecord>(
            r#"
            UPDATE companies SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                company_name = COALESCE($4, company_name),
                industry = COALESCE($5, industry),
                website = COALESCE($6, website),
                description = COALESCE($7, description),
                contact_person_name = COALESCE($8, contact_person_name),
                phone = COALESCE($9, phone),
                company_size = COALESCE($10, company_size),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, company_name, industry, website,
                      description, contact_person_name, phone, company_size,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.company_name)
        .bind(patch.industry)
        .bind(patch.website)
        .bind(patch.description)
        .bind(patch.contact_person_name)
        .bind(patch.phone)
        .bind(patch.company_size)
        .fetch_one(pool)
        .await
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)"#,
        )
        .bind(normalize_email(email))
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_strips_hash() {
        let record = CompanyRecord {
            id: Uuid::new_v4(),
            email: "jobs@acme.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            company_name: "Acme".to_string(),
            industry: Some("Manufacturing".to_string()),
            website: None,
            description: None,
            contact_person_name: None,
            phone: None,
            company_size: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let profile = record.sanitized();
        assert_eq!(profile.role, Role::Company);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());
    }
}
