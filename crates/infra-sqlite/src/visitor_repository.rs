// SQLite VisitorRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use jumpqueue_core::domain::Visitor;
use jumpqueue_core::error::Result;
use jumpqueue_core::port::{VisitorCriteria, VisitorRepository};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqliteVisitorRepository {
    pool: SqlitePool,
}

impl SqliteVisitorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorRepository for SqliteVisitorRepository {
    async fn find(&self, criteria: &VisitorCriteria) -> Result<Vec<Visitor>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM visitors WHERE 1 = 1");

        if let Some(token) = &criteria.token {
            qb.push(" AND token = ").push_bind(token.clone());
        }
        if let Some(identificator) = &criteria.identificator {
            qb.push(" AND identificator = ")
                .push_bind(identificator.clone());
        }
        if let Some(email) = &criteria.email {
            qb.push(" AND email = ").push_bind(email.clone());
        }
        if let Some(phone) = &criteria.phone {
            qb.push(" AND phone = ").push_bind(phone.clone());
        }
        qb.push(" ORDER BY created_at ASC, rowid ASC");

        let rows = qb
            .build_query_as::<VisitorRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(VisitorRow::into_visitor).collect())
    }

    async fn save(&self, visitor: &Visitor) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visitors (
                id, queue_id, token, name, email, phone,
                identificator, validated, consent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                queue_id = excluded.queue_id,
                token = excluded.token,
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                identificator = excluded.identificator,
                validated = excluded.validated,
                consent = excluded.consent
            "#,
        )
        .bind(&visitor.id)
        .bind(&visitor.queue_id)
        .bind(&visitor.token)
        .bind(&visitor.name)
        .bind(&visitor.email)
        .bind(&visitor.phone)
        .bind(&visitor.identificator)
        .bind(visitor.validated)
        .bind(visitor.consent)
        .bind(visitor.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VisitorRow {
    id: String,
    queue_id: String,
    token: Option<String>,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    identificator: String,
    validated: i32, // SQLite boolean as integer
    consent: i32,   // SQLite boolean as integer
    created_at: i64,
}

impl VisitorRow {
    fn into_visitor(self) -> Visitor {
        Visitor {
            id: self.id,
            queue_id: self.queue_id,
            token: self.token,
            name: self.name,
            email: self.email,
            phone: self.phone,
            identificator: self.identificator,
            validated: self.validated != 0,
            consent: self.consent != 0,
            created_at: self.created_at,
        }
    }
}
