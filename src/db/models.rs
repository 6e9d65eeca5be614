use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

/// A registered account as stored in the credential store. The password hash
/// never leaves this module except through `UserResponse`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
        }
    }
}

impl User {
    /// Look up a user by already-normalized (lowercased) email.
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new user. The unique index on `email` rejects duplicates with
    /// a database-level constraint error.
    pub async fn insert(
        pool: &DbPool,
        firstname: &str,
        lastname: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, firstname, lastname, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(firstname)
        .bind(lastname)
        .bind(email)
        .bind(password_hash)
        .bind(&created_at)
        .execute(pool)
        .await?;

        Ok(User {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn test_pool() -> Database {
        let db = Database::new("sqlite::memory:");
        db.pool().await.expect("in-memory pool");
        db
    }

    #[tokio::test]
    async fn test_insert_and_find_by_email() {
        let db = test_pool().await;
        let pool = db.pool().await.unwrap();

        let user = User::insert(pool, "Alice", "Smith", "alice@example.com", "hash")
            .await
            .unwrap();
        assert!(!user.id.is_empty());

        let found = User::find_by_email(pool, "alice@example.com")
            .await
            .unwrap()
            .expect("user present");
        assert_eq!(found.id, user.id);
        assert_eq!(found.firstname, "Alice");
    }

    #[tokio::test]
    async fn test_find_by_unknown_email_is_none() {
        let db = test_pool().await;
        let pool = db.pool().await.unwrap();

        let found = User::find_by_email(pool, "nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_unique_index() {
        let db = test_pool().await;
        let pool = db.pool().await.unwrap();

        User::insert(pool, "Alice", "Smith", "alice@example.com", "hash")
            .await
            .unwrap();
        let err = User::insert(pool, "Alicia", "Smythe", "alice@example.com", "hash")
            .await
            .unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => {
                assert!(db_err.message().contains("UNIQUE constraint failed"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_public_view_omits_hash() {
        let db = test_pool().await;
        let pool = db.pool().await.unwrap();

        let user = User::insert(pool, "Alice", "Smith", "alice@example.com", "hash")
            .await
            .unwrap();
        let view = UserResponse::from(user);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }
}
