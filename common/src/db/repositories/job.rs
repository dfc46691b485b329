// Job repository implementation
// Create, search, detail read, partial update, and delete for jobs

use super::first_row;
use super::queries::{company_queries, job_queries};
use crate::db::executor::{from_row, QueryExecutor, SqlValue};
use crate::db::sql::{compose_job_filter, ColumnMap, SetClause, SqlParams};
use crate::db::DbPool;
use crate::errors::{DatabaseError, RepositoryError};
use crate::models::{Company, Job, JobDetail, JobFilter, JobSummary, JobUpdate, NewJob};
use std::sync::Arc;
use tracing::instrument;

/// Repository for job-related database operations
#[derive(Clone)]
pub struct JobRepository {
    executor: Arc<dyn QueryExecutor>,
}

impl JobRepository {
    /// Create a new JobRepository on top of any query executor
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Create a JobRepository backed by the PostgreSQL pool
    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(Arc::new(pool))
    }

    /// Create a new job and return it with its generated id.
    ///
    /// An unknown company handle surfaces as `DatabaseError::ForeignKeyViolation`.
    #[instrument(skip(self, job), fields(company_handle = %job.company_handle))]
    pub async fn create(&self, job: &NewJob) -> Result<Job, RepositoryError> {
        let mut params = SqlParams::new();
        let values = [
            params.push(job.title.as_str()),
            params.push(job.salary),
            params.push(SqlValue::numeric(job.equity.clone())),
            params.push(job.company_handle.as_str()),
        ]
        .join(", ");

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ({})
             RETURNING {}",
            values,
            job_queries::RETURNING_COLUMNS
        );

        let rows = self.executor.query(&sql, params.into_values()).await?;
        let row = first_row(rows)
            .ok_or_else(|| DatabaseError::QueryFailed("INSERT returned no row".to_string()))?;
        let created: Job = from_row(row)?;

        tracing::info!(job_id = created.id, title = %created.title, "Job created");
        Ok(created)
    }

    /// List jobs matching `filter`, ordered by title
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &JobFilter) -> Result<Vec<JobSummary>, RepositoryError> {
        let (where_sql, params) = compose_job_filter(filter).into_parts();

        let mut sql = String::from(job_queries::SUMMARY_SELECT);
        if let Some(where_sql) = where_sql {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        sql.push_str(" ORDER BY title");

        let rows = self.executor.query(&sql, params).await?;
        let jobs = rows
            .into_iter()
            .map(from_row)
            .collect::<Result<Vec<JobSummary>, _>>()?;

        tracing::debug!(count = jobs.len(), "Found jobs with filter");
        Ok(jobs)
    }

    /// Get a job with its company nested.
    ///
    /// The company comes from a second, independent lookup. If it has vanished
    /// in the meantime the job is still returned, with `company: None`.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<JobDetail, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE id = $1",
            job_queries::RETURNING_COLUMNS
        );
        let rows = self.executor.query(&sql, vec![SqlValue::from(id)]).await?;
        let job: Job = match first_row(rows) {
            Some(row) => from_row(row)?,
            None => return Err(RepositoryError::not_found("job", id)),
        };

        let sql = format!(
            "SELECT {} FROM companies WHERE handle = $1",
            company_queries::SELECT_ALL_COLUMNS
        );
        let rows = self
            .executor
            .query(&sql, vec![SqlValue::from(job.company_handle.as_str())])
            .await?;
        let company: Option<Company> = first_row(rows).map(from_row).transpose()?;

        if company.is_none() {
            tracing::warn!(
                job_id = job.id,
                company_handle = %job.company_handle,
                "Company for job not found"
            );
        }

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// Apply a partial update to a job
    ///
    /// # Errors
    /// - `RepositoryError::EmptyUpdate` if `data` sets no field; nothing is sent to the store
    /// - `RepositoryError::NotFound` if no job has this id
    #[instrument(skip(self, data))]
    pub async fn update(&self, id: i32, data: JobUpdate) -> Result<Job, RepositoryError> {
        let (set_sql, mut params) =
            SetClause::compose(data.into_changes(), ColumnMap::IDENTITY)?.into_parts();
        let id_placeholder = params.push(id);

        let sql = format!(
            "UPDATE jobs
             SET {}
             WHERE id = {}
             RETURNING {}",
            set_sql,
            id_placeholder,
            job_queries::RETURNING_COLUMNS
        );

        let rows = self.executor.query(&sql, params.into_values()).await?;
        let job: Job = match first_row(rows) {
            Some(row) => from_row(row)?,
            None => return Err(RepositoryError::not_found("job", id)),
        };

        tracing::info!(job_id = job.id, "Job updated");
        Ok(job)
    }

    /// Delete a job
    ///
    /// # Errors
    /// `RepositoryError::NotFound` if the delete matched no row
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let rows = self
            .executor
            .query(
                "DELETE FROM jobs WHERE id = $1 RETURNING id",
                vec![SqlValue::from(id)],
            )
            .await?;

        if rows.is_empty() {
            return Err(RepositoryError::not_found("job", id));
        }

        tracing::info!(job_id = id, "Job deleted");
        Ok(())
    }
}
