//! Member repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use domain_circulation::{Member, MemberPatch};

use crate::error::DatabaseError;

/// A row of the `members` table
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub member_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.member_id.into(),
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Repository for the `members` table
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, member: &Member) -> Result<MemberRow, DatabaseError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO members (member_id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING member_id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(Uuid::from(member.id))
        .bind(&member.name)
        .bind(&member.email)
        .bind(member.phone.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get(&self, member_id: Uuid) -> Result<Option<MemberRow>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::find(&mut *conn, member_id).await
    }

    /// Lists all members in creation order
    pub async fn list(&self) -> Result<Vec<MemberRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, name, email, phone, created_at, updated_at
            FROM members
            ORDER BY created_at, member_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Applies a patch in a single statement
    ///
    /// `phone` is only touched when the patch says so, which lets a patch
    /// clear it to NULL.
    pub async fn update(
        &self,
        member_id: Uuid,
        patch: &MemberPatch,
    ) -> Result<Option<MemberRow>, DatabaseError> {
        let (set_phone, phone) = match &patch.phone {
            Some(phone) => (true, phone.as_deref()),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            UPDATE members
            SET name       = COALESCE($2, name),
                email      = COALESCE($3, email),
                phone      = CASE WHEN $4 THEN $5 ELSE phone END,
                updated_at = now()
            WHERE member_id = $1
            RETURNING member_id, name, email, phone, created_at, updated_at
            "#,
        )
        .bind(member_id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(set_phone)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete(&self, member_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM members WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reads a member on the given connection
    pub async fn find(
        conn: &mut PgConnection,
        member_id: Uuid,
    ) -> Result<Option<MemberRow>, DatabaseError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT member_id, name, email, phone, created_at, updated_at
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }
}
