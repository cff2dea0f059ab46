//! [`SqliteStore`], the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use anubis_core::{
  Submission, Verdict,
  store::{SubmissionQuery, SubmissionStore, VerdictFilter},
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Error, Result,
  encode::{SUBMISSION_COLUMNS, SubmissionRow, encode_verdict},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Anubis submission store backed by a single SQLite file.
///
/// Clones share the same background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Which verdict column an update touches.
#[derive(Clone, Copy)]
enum VerdictColumn {
  Community,
  Local,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_verdict(
    &self,
    column: VerdictColumn,
    submission_id: &str,
    verdict: Verdict,
  ) -> Result<()> {
    let sql = match column {
      VerdictColumn::Community => {
        "UPDATE submissions SET verdict = ?2 WHERE submission_id = ?1"
      }
      VerdictColumn::Local => {
        "UPDATE submissions SET local_verdict = ?2 WHERE submission_id = ?1"
      }
    };
    let id = submission_id.to_owned();
    let symbol = verdict.symbol();

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id, symbol])?))
      .await?;

    if changed == 0 {
      return Err(Error::SubmissionNotFound(submission_id.to_owned()));
    }

    tracing::debug!(submission_id, verdict = symbol, "verdict updated");
    Ok(())
  }
}

/// Build the `WHERE` clause and its bound values for a query.
fn filter_clause(query: &SubmissionQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec![];
  let mut values: Vec<Value> = vec![];

  match query.verdict {
    Some(VerdictFilter::Pending) => conds.push("verdict IS NULL"),
    Some(VerdictFilter::Judged) => conds.push("verdict IS NOT NULL"),
    Some(VerdictFilter::Is(v)) => {
      conds.push("verdict = ?");
      values.push(Value::Text(v.symbol().to_owned()));
    }
    None => {}
  }

  if let Some(after) = &query.after_id {
    conds.push("submission_id > ?");
    values.push(Value::Text(after.clone()));
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, values)
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, submission: Submission) -> Result<bool> {
    let verdict = encode_verdict(submission.verdict);
    let local_verdict = encode_verdict(submission.local_verdict);
    let id = submission.submission_id.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO submissions (
             submission_id, title, body, created_utc, verdict, local_verdict
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            submission.submission_id,
            submission.title,
            submission.body,
            submission.created_utc,
            verdict,
            local_verdict,
          ],
        )?)
      })
      .await?;

    let inserted = changed > 0;
    tracing::trace!(submission_id = %id, inserted, "insert");
    Ok(inserted)
  }

  async fn update_verdict(&self, submission_id: &str, verdict: Verdict) -> Result<()> {
    self
      .set_verdict(VerdictColumn::Community, submission_id, verdict)
      .await
  }

  async fn update_local_verdict(
    &self,
    submission_id: &str,
    verdict: Verdict,
  ) -> Result<()> {
    self
      .set_verdict(VerdictColumn::Local, submission_id, verdict)
      .await
  }

  async fn get(&self, submission_id: &str) -> Result<Option<Submission>> {
    let id = submission_id.to_owned();

    let row: Option<SubmissionRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = ?1"
              ),
              rusqlite::params![id],
              SubmissionRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    row.map(SubmissionRow::into_submission).transpose()
  }

  async fn list(&self, query: &SubmissionQuery) -> Result<Vec<Submission>> {
    let (where_clause, mut values) = filter_clause(query);
    let limit_clause = match query.limit {
      Some(limit) => {
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        "LIMIT ?"
      }
      None => "",
    };

    let rows: Vec<SubmissionRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SUBMISSION_COLUMNS}
           FROM submissions
           {where_clause}
           ORDER BY submission_id
           {limit_clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), SubmissionRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(SubmissionRow::into_submission).collect()
  }

  async fn count(&self, query: &SubmissionQuery) -> Result<u64> {
    let (where_clause, values) = filter_clause(query);

    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM submissions {where_clause}");
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(values), |row| {
          row.get(0)
        })?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }
}
