//! Newsletter subscriber repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use frechnel_core::{Email, SubscriberId};

use super::RepositoryError;
use crate::models::Subscriber;

/// Repository for newsletter subscriber operations.
pub struct SubscriberRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: SubscriberId,
    email: String,
    subscribed_at: DateTime<Utc>,
}

impl SubscriberRow {
    fn into_subscriber(self) -> Result<Subscriber, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Subscriber {
            id: self.id,
            email,
            subscribed_at: self.subscribed_at,
        })
    }
}

impl<'a> SubscriberRepository<'a> {
    /// Create a new subscriber repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all subscribers, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            "SELECT id, email, subscribed_at FROM newsletter_subscriber \
             ORDER BY subscribed_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(SubscriberRow::into_subscriber)
            .collect()
    }

    /// Subscribe an email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already subscribed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email) -> Result<Subscriber, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            "INSERT INTO newsletter_subscriber (email) VALUES ($1) \
             RETURNING id, email, subscribed_at",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already subscribed".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_subscriber()
    }
}
