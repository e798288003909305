use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::models::candidate::CandidateStatus;
use crate::models::interview::{InterviewFeedback, InterviewStatus};
use crate::models::requirement::RequirementStatus;
use crate::models::ticket::TicketStatus;
use crate::store::{
    CandidateStore, Envelope, InterviewFilter, InterviewStore, InterviewerStore, NewCandidate,
    NewInterview, NewInterviewer, NewRequirement, NewTicket, RequirementPatch, RequirementStore,
    TicketFilter, TicketStore,
};

type SqlResult<T> = std::result::Result<T, sqlx::Error>;

/// Record store backed by PostgreSQL. Rows are returned as `to_jsonb(row)`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_one_json(&self, sql: &str, id: &str) -> SqlResult<Option<JsonValue>> {
        sqlx::query_scalar::<_, JsonValue>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn complete_in_tx(
        &self,
        id: &str,
        feedback: &InterviewFeedback,
        expected: Vec<String>,
    ) -> SqlResult<Option<JsonValue>> {
        let feedback_json = serde_json::to_value(feedback)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE interviews AS i
            SET status = 'completed',
                feedback = $2,
                interviewer_notes = $3,
                updated_at = NOW()
            WHERE i.id = $1
              AND i.status = ANY($4)
              AND i.feedback IS NULL
            RETURNING to_jsonb(i)
            "#,
        )
        .bind(id)
        .bind(&feedback_json)
        .bind(&feedback.comments)
        .bind(&expected)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO evaluations (interview_id, score, feedback)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(feedback.rating)
        .bind(&feedback.comments)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn insert_candidates_in_tx(&self, rows: Vec<NewCandidate>) -> SqlResult<Vec<JsonValue>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let record = sqlx::query_scalar::<_, JsonValue>(
                r#"
                INSERT INTO candidates AS c (full_name, email, resume_url, skills, status, requirement_id)
                VALUES ($1, $2, $3, $4, 'new', $5)
                RETURNING to_jsonb(c)
                "#,
            )
            .bind(&row.full_name)
            .bind(&row.email)
            .bind(&row.resume_url)
            .bind(&row.skills)
            .bind(&row.requirement_id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(record);
        }
        tx.commit().await?;
        Ok(created)
    }
}

/// Ticket row joined with the title of its requirement.
const TICKET_JSON: &str =
    "to_jsonb(t) || jsonb_build_object('requirement_title', r.title)";

fn storage_values<T: Copy>(statuses: &[T], f: fn(T) -> &'static str) -> Vec<String> {
    statuses.iter().map(|s| f(*s).to_string()).collect()
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn insert_interview(&self, row: NewInterview) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            INSERT INTO interviews AS i (candidate_id, interviewer_id, requirement_id, scheduled_at, status, reschedule_count)
            VALUES ($1, $2, $3, $4, 'scheduled', 0)
            RETURNING to_jsonb(i)
            "#,
        )
        .bind(&row.candidate_id)
        .bind(&row.interviewer_id)
        .bind(&row.requirement_id)
        .bind(row.scheduled_at)
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn fetch_interview(&self, id: &str) -> Envelope<JsonValue> {
        self.fetch_one_json("SELECT to_jsonb(i) FROM interviews i WHERE i.id = $1", id)
            .await
            .into()
    }

    async fn list_interviews(&self, filter: &InterviewFilter) -> Envelope<Vec<JsonValue>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push(format!("i.status = ${}", args.len() + 1));
            args.push(status.as_storage().to_string());
        }
        if let Some(interviewer_id) = &filter.interviewer_id {
            filters.push(format!("i.interviewer_id = ${}", args.len() + 1));
            args.push(interviewer_id.clone());
        }
        if let Some(candidate_id) = &filter.candidate_id {
            filters.push(format!("i.candidate_id = ${}", args.len() + 1));
            args.push(candidate_id.clone());
        }
        if let Some(requirement_id) = &filter.requirement_id {
            filters.push(format!("i.requirement_id = ${}", args.len() + 1));
            args.push(requirement_id.clone());
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let query = format!(
            "SELECT to_jsonb(i) FROM interviews i {} ORDER BY i.scheduled_at ASC, i.created_at ASC",
            where_clause
        );

        let mut statement = sqlx::query_scalar::<_, JsonValue>(&query);
        for value in &args {
            statement = statement.bind(value);
        }
        statement.fetch_all(&self.pool).await.map(Some).into()
    }

    async fn set_interview_status(
        &self,
        id: &str,
        status: InterviewStatus,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE interviews AS i
            SET status = $2, updated_at = NOW()
            WHERE i.id = $1 AND i.status = ANY($3)
            RETURNING to_jsonb(i)
            "#,
        )
        .bind(id)
        .bind(status.as_storage())
        .bind(storage_values(expected, InterviewStatus::as_storage))
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn reschedule_interview(
        &self,
        id: &str,
        scheduled_at: DateTime<Utc>,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE interviews AS i
            SET scheduled_at = $2,
                status = 'rescheduled',
                reschedule_count = i.reschedule_count + 1,
                updated_at = NOW()
            WHERE i.id = $1 AND i.status = ANY($3)
            RETURNING to_jsonb(i)
            "#,
        )
        .bind(id)
        .bind(scheduled_at)
        .bind(storage_values(expected, InterviewStatus::as_storage))
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn complete_with_feedback(
        &self,
        id: &str,
        feedback: &InterviewFeedback,
        expected: &[InterviewStatus],
    ) -> Envelope<JsonValue> {
        self.complete_in_tx(id, feedback, storage_values(expected, InterviewStatus::as_storage))
            .await
            .into()
    }

    async fn fetch_evaluation(&self, interview_id: &str) -> Envelope<JsonValue> {
        self.fetch_one_json(
            "SELECT to_jsonb(e) FROM evaluations e WHERE e.interview_id = $1",
            interview_id,
        )
        .await
        .into()
    }
}

#[async_trait]
impl RequirementStore for PgStore {
    async fn insert_requirement(&self, row: NewRequirement) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            INSERT INTO requirements AS r (
                title, description, skills, number_of_positions, years_of_experience,
                price_per_interview, status, raised_by, company_id
            ) VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8)
            RETURNING to_jsonb(r)
            "#,
        )
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.skills)
        .bind(row.number_of_positions)
        .bind(row.years_of_experience)
        .bind(row.price_per_interview)
        .bind(&row.raised_by)
        .bind(&row.company_id)
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn fetch_requirement(&self, id: &str) -> Envelope<JsonValue> {
        self.fetch_one_json("SELECT to_jsonb(r) FROM requirements r WHERE r.id = $1", id)
            .await
            .into()
    }

    async fn list_requirements(
        &self,
        status: Option<RequirementStatus>,
    ) -> Envelope<Vec<JsonValue>> {
        let result = match status {
            Some(status) => {
                sqlx::query_scalar::<_, JsonValue>(
                    "SELECT to_jsonb(r) FROM requirements r WHERE r.status = $1 ORDER BY r.created_at DESC",
                )
                .bind(status.as_storage())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, JsonValue>(
                    "SELECT to_jsonb(r) FROM requirements r ORDER BY r.created_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        };
        result.map(Some).into()
    }

    async fn update_requirement(&self, id: &str, patch: &RequirementPatch) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE requirements AS r
            SET
                title = COALESCE($2, r.title),
                description = COALESCE($3, r.description),
                skills = COALESCE($4, r.skills),
                number_of_positions = COALESCE($5, r.number_of_positions),
                years_of_experience = COALESCE($6, r.years_of_experience),
                price_per_interview = COALESCE($7, r.price_per_interview),
                updated_at = NOW()
            WHERE r.id = $1
            RETURNING to_jsonb(r)
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.skills)
        .bind(patch.number_of_positions)
        .bind(patch.years_of_experience)
        .bind(patch.price_per_interview)
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn set_requirement_status(
        &self,
        id: &str,
        status: RequirementStatus,
        expected: &[RequirementStatus],
    ) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE requirements AS r
            SET status = $2, updated_at = NOW()
            WHERE r.id = $1 AND r.status = ANY($3)
            RETURNING to_jsonb(r)
            "#,
        )
        .bind(id)
        .bind(status.as_storage())
        .bind(storage_values(expected, RequirementStatus::as_storage))
        .fetch_optional(&self.pool)
        .await
        .into()
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn insert_candidates(&self, rows: Vec<NewCandidate>) -> Envelope<Vec<JsonValue>> {
        self.insert_candidates_in_tx(rows).await.map(Some).into()
    }

    async fn fetch_candidate(&self, id: &str) -> Envelope<JsonValue> {
        self.fetch_one_json("SELECT to_jsonb(c) FROM candidates c WHERE c.id = $1", id)
            .await
            .into()
    }

    async fn list_candidates(&self, requirement_id: Option<&str>) -> Envelope<Vec<JsonValue>> {
        let result = match requirement_id {
            Some(requirement_id) => {
                sqlx::query_scalar::<_, JsonValue>(
                    "SELECT to_jsonb(c) FROM candidates c WHERE c.requirement_id = $1 ORDER BY c.created_at DESC",
                )
                .bind(requirement_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, JsonValue>(
                    "SELECT to_jsonb(c) FROM candidates c ORDER BY c.created_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        };
        result.map(Some).into()
    }

    async fn set_candidate_status(
        &self,
        id: &str,
        status: CandidateStatus,
    ) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            UPDATE candidates AS c
            SET status = $2, updated_at = NOW()
            WHERE c.id = $1
            RETURNING to_jsonb(c)
            "#,
        )
        .bind(id)
        .bind(status.as_storage())
        .fetch_optional(&self.pool)
        .await
        .into()
    }
}

#[async_trait]
impl InterviewerStore for PgStore {
    async fn insert_interviewer(&self, row: NewInterviewer) -> Envelope<JsonValue> {
        sqlx::query_scalar::<_, JsonValue>(
            r#"
            INSERT INTO interviewers AS iv (name, email, skills, years_of_experience)
            VALUES ($1, $2, $3, $4)
            RETURNING to_jsonb(iv)
            "#,
        )
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.skills)
        .bind(row.years_of_experience)
        .fetch_optional(&self.pool)
        .await
        .into()
    }

    async fn fetch_interviewer(&self, id: &str) -> Envelope<JsonValue> {
        self.fetch_one_json("SELECT to_jsonb(iv) FROM interviewers iv WHERE iv.id = $1", id)
            .await
            .into()
    }

    async fn list_interviewers(&self) -> Envelope<Vec<JsonValue>> {
        sqlx::query_scalar::<_, JsonValue>(
            "SELECT to_jsonb(iv) FROM interviewers iv ORDER BY iv.name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map(Some)
        .into()
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, row: NewTicket) -> Envelope<JsonValue> {
        let query = format!(
            r#"
            WITH t AS (
                INSERT INTO tickets (requirement_id, company_id, raised_by, status)
                VALUES ($1, $2, $3, 'pending')
                RETURNING *
            )
            SELECT {} FROM t LEFT JOIN requirements r ON r.id = t.requirement_id
            "#,
            TICKET_JSON
        );
        sqlx::query_scalar::<_, JsonValue>(&query)
            .bind(&row.requirement_id)
            .bind(&row.company_id)
            .bind(&row.raised_by)
            .fetch_optional(&self.pool)
            .await
            .into()
    }

    async fn fetch_ticket(&self, id: &str) -> Envelope<JsonValue> {
        let query = format!(
            "SELECT {} FROM tickets t LEFT JOIN requirements r ON r.id = t.requirement_id WHERE t.id = $1",
            TICKET_JSON
        );
        self.fetch_one_json(&query, id).await.into()
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Envelope<Vec<JsonValue>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            filters.push(format!("t.status = ${}", args.len() + 1));
            args.push(status.as_storage().to_string());
        }
        if let Some(company_id) = &filter.company_id {
            filters.push(format!("t.company_id = ${}", args.len() + 1));
            args.push(company_id.clone());
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM tickets t LEFT JOIN requirements r ON r.id = t.requirement_id {} ORDER BY t.created_at DESC",
            TICKET_JSON, where_clause
        );

        let mut statement = sqlx::query_scalar::<_, JsonValue>(&query);
        for value in &args {
            statement = statement.bind(value);
        }
        statement.fetch_all(&self.pool).await.map(Some).into()
    }

    async fn set_ticket_status(
        &self,
        id: &str,
        status: TicketStatus,
        expected: &[TicketStatus],
        reason: Option<String>,
    ) -> Envelope<JsonValue> {
        let query = format!(
            r#"
            WITH t AS (
                UPDATE tickets
                SET status = $2,
                    escalation_reason = COALESCE($4, escalation_reason),
                    updated_at = NOW()
                WHERE id = $1 AND status = ANY($3)
                RETURNING *
            )
            SELECT {} FROM t LEFT JOIN requirements r ON r.id = t.requirement_id
            "#,
            TICKET_JSON
        );
        sqlx::query_scalar::<_, JsonValue>(&query)
            .bind(id)
            .bind(status.as_storage())
            .bind(storage_values(expected, TicketStatus::as_storage))
            .bind(reason)
            .fetch_optional(&self.pool)
            .await
            .into()
    }
}
