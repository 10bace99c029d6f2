use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AdvisoryError, Result};
use crate::models::{
    Diagnostic, HospitalProfile, RecommendationRecord, RecommendationResult, StoredSubmission,
};

/// Stores a profile submission and its recommendation as one linked pair.
///
/// Both rows are written inside a single transaction, so a failed
/// recommendation insert leaves no orphaned diagnostic row behind. Rows are
/// append-only; there is no update path.
#[derive(Clone)]
pub struct PersistenceAdapter {
    pool: PgPool,
}

impl PersistenceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn store(
        &self,
        user_id: &str,
        profile: &HospitalProfile,
        result: &RecommendationResult,
    ) -> Result<StoredSubmission> {
        if user_id.trim().is_empty() {
            return Err(AdvisoryError::Unauthorized);
        }

        let recommendations_json = serde_json::to_value(&result.recommendations)
            .map_err(|e| AdvisoryError::LlmResponseParse(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let diagnostic_id: Uuid = sqlx::query_scalar(
            "INSERT INTO diagnostics \
             (user_id, hospital_name, hospital_size, specialties, ar_mr_experience, needs_assessment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(&profile.hospital_name)
        .bind(profile.hospital_size)
        .bind(&profile.specialties)
        .bind(profile.ar_mr_experience)
        .bind(&profile.needs_assessment)
        .fetch_one(&mut *tx)
        .await?;

        let recommendation_id: Uuid = match sqlx::query_scalar(
            "INSERT INTO recommendations (diagnostic_id, summary, recommendations, roadmap) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(diagnostic_id)
        .bind(&result.summary)
        .bind(&recommendations_json)
        .bind(&result.roadmap)
        .fetch_one(&mut *tx)
        .await
        {
            Ok(id) => id,
            Err(e) => {
                // Rolling back discards the diagnostic row as well; the
                // rollback outcome does not change the reported error.
                error!(error = %e, %diagnostic_id, "recommendation insert failed, rolling back");
                let _ = tx.rollback().await;
                return Err(AdvisoryError::Database(e));
            }
        };

        tx.commit().await?;

        info!(%diagnostic_id, %recommendation_id, user = user_id, "submission stored");

        Ok(StoredSubmission {
            diagnostic_id,
            recommendation_id,
        })
    }

    pub async fn get_diagnostic(&self, id: Uuid) -> Result<Option<Diagnostic>> {
        let diagnostic = sqlx::query_as::<_, Diagnostic>(
            "SELECT id, user_id, hospital_name, hospital_size, specialties, \
             ar_mr_experience, needs_assessment, created_at \
             FROM diagnostics WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(diagnostic)
    }

    pub async fn get_recommendation(
        &self,
        diagnostic_id: Uuid,
    ) -> Result<Option<RecommendationRecord>> {
        let record = sqlx::query_as::<_, RecommendationRecord>(
            "SELECT id, diagnostic_id, summary, recommendations, roadmap, created_at \
             FROM recommendations WHERE diagnostic_id = $1",
        )
        .bind(diagnostic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn diagnostics_count_for_user(&self, user_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM diagnostics WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
