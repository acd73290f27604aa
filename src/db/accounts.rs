//! Admin account persistence.
//!
//! Secrets are stored as Argon2id PHC strings, so the salt and cost
//! parameters travel with the hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AccountError;

/// A stored admin account.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub password_hash: String,
    pub disabled: bool,
}

impl AdminAccount {
    /// Check a candidate secret against the stored hash. A hash that does
    /// not parse never verifies.
    pub fn verify(&self, secret: &str) -> bool {
        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Stored password hash is malformed: {}", e);
                return false;
            }
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Argon2id hash of a secret with a fresh random salt, as a PHC string.
pub fn hash_secret(secret: &str) -> Result<String, AccountError> {
    let salt =
        SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes()).map_err(AccountError::Hash)?;
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(AccountError::Hash)?;
    Ok(hash.to_string())
}

/// Repository for admin accounts.
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an account by its (case-insensitive) email.
    pub async fn find(&self, email: &str) -> Result<Option<AdminAccount>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT password_hash, disabled FROM admins WHERE email = ?",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let disabled: i32 = row.get("disabled");
            AdminAccount {
                password_hash: row.get("password_hash"),
                disabled: disabled != 0,
            }
        }))
    }

    /// Create the account unless it already exists. Returns whether a row
    /// was inserted.
    pub async fn ensure(&self, email: &str, secret: &str) -> Result<bool, AccountError> {
        let hash = hash_secret(secret)?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO admins (email, password_hash, disabled, created_at) VALUES (?, ?, 0, ?)",
        )
        .bind(normalize_email(email))
        .bind(&hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[cfg(test)]
    pub async fn set_disabled(&self, email: &str, disabled: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE admins SET disabled = ? WHERE email = ?")
            .bind(disabled as i32)
            .bind(normalize_email(email))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[test]
    fn test_hash_is_salted_phc_string() {
        let first = hash_secret("pw").unwrap();
        let second = hash_secret("pw").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);

        let account = AdminAccount {
            password_hash: second,
            disabled: false,
        };
        assert!(account.verify("pw"));
        assert!(!account.verify("pw "));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let account = AdminAccount {
            password_hash: "not-a-phc-string".to_string(),
            disabled: false,
        };
        assert!(!account.verify("not-a-phc-string"));
        assert!(!account.verify(""));
    }

    #[tokio::test]
    async fn test_ensure_and_verify() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("a.sqlite")).await.unwrap();
        let repo = AccountRepository::new(pool);

        assert!(repo.ensure("Admin@School.org", "s3cret").await.unwrap());
        assert!(!repo.ensure("admin@school.org", "other").await.unwrap());

        let account = repo.find("ADMIN@school.org").await.unwrap().unwrap();
        assert!(account.verify("s3cret"));
        assert!(!account.verify("other"));
        assert!(!account.disabled);

        repo.set_disabled("admin@school.org", true).await.unwrap();
        assert!(repo.find("admin@school.org").await.unwrap().unwrap().disabled);
    }
}
