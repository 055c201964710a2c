//! Student account repository

use campusbridge_shared::types::{Role, StudentProfile};
use campusbridge_shared::validation::normalize_email;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Student row. The only type that carries the password hash; it never
/// crosses the service boundary unsanitized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Strip the hash, producing the outward-facing profile
    pub fn sanitized(self) -> StudentProfile {
        StudentProfile {
            id: self.id,
            email: self.email,
            role: Role::Student,
            first_name: self.first_name,
            last_name: self.last_name,
            university: self.university,
            major: self.major,
            graduation_year: self.graduation_year,
            created_at: self.created_at,
        }
    }
}

/// Input for creating a student
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub university: Option<String>,
    pub major: Option<String>,
    pub graduation_year: Option<String>,
}

/// Student repository over the shared pool
pub struct StudentRepository;

impl StudentRepository {
    /// Find by email. The key is normalized here so lookups always match
    /// storage normalization.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<StudentRecord>, sqlx::Error> {
        sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   university, major, graduation_year, created_at, updated_at
            FROM students
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
    ) -> Result<Option<StudentRecord>, sqlx::Error> {
        sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   university, major, graduation_year, created_at, updated_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a new student. The unique index on email is the source of
    /// truth under concurrent signups; callers map the unique violation.
    pub async fn create(pool: &PgPool, new: NewStudent) -> Result<StudentRecord, sqlx::Error> {
        sqlx::query_as::<_, StudentRecord>(
            r#"
            INSERT INTO students
                (email, password_hash, first_name, last_name, university, major, graduation_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, first_name, last_name,
                      university, major, graduation_year, created_at, updated_at
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.university)
        .bind(new.major)
        .bind(new.graduation_year)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: StudentPatch,
    ) -> Result<StudentRecord, sqlx::Error> {
        sqlx::query_as::<_, StudentRecord>(
            r#"
            UPDATE students SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                university = COALESCE($6, university),
                major = COALESCE($7, major),
                graduation_year = COALESCE($8, graduation_year),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name,
                      university, major, graduation_year, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.university)
        .bind(patch.major)
        .bind(patch.graduation_year)
        .fetch_one(pool)
        .await
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM students WHERE email = $1)"#,
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
        let record = StudentRecord {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            university: None,
            major: None,
            graduation_year: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let profile = record.sanitized();
        assert_eq!(profile.role, Role::Student);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());
    }
}
