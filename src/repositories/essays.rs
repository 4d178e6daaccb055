use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Essay;
use crate::db::types::CorrectionType;

const COLUMNS: &str = "\
    id, author_id, correction_type, theme, text, image_url, correction_text, \
    score, created_at, updated_at";

pub(crate) struct CreateEssay<'a> {
    pub id: &'a str,
    pub author_id: &'a str,
    pub correction_type: CorrectionType,
    pub theme: &'a str,
    pub text: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub correction_text: &'a str,
    pub score: Option<i32>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateEssay<'_>) -> Result<Essay, sqlx::Error> {
    sqlx::query_as::<_, Essay>(&format!(
        "INSERT INTO essays (
            id, author_id, correction_type, theme, text, image_url,
            correction_text, score, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.author_id)
    .bind(params.correction_type)
    .bind(params.theme)
    .bind(params.text)
    .bind(params.image_url)
    .bind(params.correction_text)
    .bind(params.score)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_author(
    pool: &PgPool,
    author_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Essay>, sqlx::Error> {
    sqlx::query_as::<_, Essay>(&format!(
        "SELECT {COLUMNS}
         FROM essays
         WHERE author_id = $1
         ORDER BY created_at DESC
         OFFSET $2 LIMIT $3",
    ))
    .bind(author_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_for_author(
    pool: &PgPool,
    essay_id: &str,
    author_id: &str,
) -> Result<Option<Essay>, sqlx::Error> {
    sqlx::query_as::<_, Essay>(&format!(
        "SELECT {COLUMNS} FROM essays WHERE id = $1 AND author_id = $2",
    ))
    .bind(essay_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ScoredEssay {
    pub(crate) score: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Scored essays only, oldest first; the progress report's input series.
pub(crate) async fn scored_history(
    pool: &PgPool,
    author_id: &str,
) -> Result<Vec<ScoredEssay>, sqlx::Error> {
    sqlx::query_as::<_, ScoredEssay>(
        "SELECT score, created_at
         FROM essays
         WHERE author_id = $1 AND score IS NOT NULL
         ORDER BY created_at ASC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_author(pool: &PgPool, author_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM essays WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
}
