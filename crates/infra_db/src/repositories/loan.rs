//! Loan repository
//!
//! Loans are inserted and closed only inside a session; the pool-backed
//! methods are read-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use domain_circulation::Loan;

use crate::error::DatabaseError;

/// A row of the `loans` table
#[derive(Debug, Clone, FromRow)]
pub struct LoanRow {
    pub loan_id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine: Decimal,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            id: row.loan_id.into(),
            book_id: row.book_id.into(),
            member_id: row.member_id.into(),
            borrowed_at: row.borrowed_at,
            due_at: row.due_at,
            returned_at: row.returned_at,
            fine: row.fine,
        }
    }
}

/// Repository for the `loans` table
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, loan_id: Uuid) -> Result<Option<LoanRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT loan_id, book_id, member_id, borrowed_at, due_at, returned_at, fine
            FROM loans
            WHERE loan_id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists all loans in borrow order
    pub async fn list(&self) -> Result<Vec<LoanRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT loan_id, book_id, member_id, borrowed_at, due_at, returned_at, fine
            FROM loans
            ORDER BY borrowed_at, loan_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Reads a loan and holds its row lock until the transaction ends
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        loan_id: Uuid,
    ) -> Result<Option<LoanRow>, DatabaseError> {
        let row = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT loan_id, book_id, member_id, borrowed_at, due_at, returned_at, fine
            FROM loans
            WHERE loan_id = $1
            FOR UPDATE
            "#,
        )
        .bind(loan_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    pub async fn insert(conn: &mut PgConnection, loan: &Loan) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO loans (loan_id, book_id, member_id, borrowed_at, due_at, returned_at, fine)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(loan.id))
        .bind(Uuid::from(loan.book_id))
        .bind(Uuid::from(loan.member_id))
        .bind(loan.borrowed_at)
        .bind(loan.due_at)
        .bind(loan.returned_at)
        .bind(loan.fine)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Records the return of an open loan
    ///
    /// Guarded on `returned_at IS NULL`: closing an already closed loan
    /// affects no row and fails with `DuplicateEntry`.
    pub async fn close(
        conn: &mut PgConnection,
        loan_id: Uuid,
        returned_at: DateTime<Utc>,
        fine: Decimal,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET returned_at = $2, fine = $3
            WHERE loan_id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(loan_id)
        .bind(returned_at)
        .bind(fine)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::DuplicateEntry(format!(
                "loan {} is already closed or missing",
                loan_id
            )));
        }
        Ok(())
    }
}
