use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::header,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_image_upload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::CorrectionType;
use crate::repositories;
use crate::schemas::essay::{EssayResponse, GradeEssayRequest, GradeEssayResponse};
use crate::services::grading::InlineImage;
use crate::services::rubric::{self, IMAGE_SUBMISSION_NOTE};
use crate::services::score_extraction::extract_score;
use crate::services::submission::{self, ImageUpload, Submission};

/// Max grading calls per user per window; the backend call is paid.
const GRADING_RATE_LIMIT: u64 = 5;
/// Rate limit window in seconds.
const GRADING_RATE_WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Deserialize)]
pub(crate) struct ListEssaysQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    50
}

pub(crate) fn router(state: &AppState) -> Router<AppState> {
    let max_body_bytes =
        (state.settings().storage().max_upload_size_mb as usize).saturating_mul(1024 * 1024)
            + 64 * 1024;

    Router::new()
        .route("/grade", post(grade_essay).route_layer(DefaultBodyLimit::max(max_body_bytes)))
        .route("/", get(list_essays))
        .route("/:essay_id", get(get_essay))
}

/// The essay-correction pipeline: resolve the submission, build the rubric
/// prompt, upload the scan when present, call the grading backend once,
/// extract the score and persist the result. Any failure before persistence
/// aborts the whole pipeline; no partial record is written.
async fn grade_essay(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<GradeEssayResponse>, ApiError> {
    let (payload, image) = read_grade_request(&state, request).await?;

    let submission = submission::resolve(&payload.theme, payload.text.as_deref(), image)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rate_key = format!("rl:grade:{}", user.id);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, GRADING_RATE_LIMIT, GRADING_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many grading requests, try again later"));
    }

    let theme = payload.theme.trim();
    let prompt = match &submission {
        Submission::Text { text } => rubric::build_prompt(payload.correction_type, theme, text),
        Submission::Image { .. } => {
            rubric::build_prompt(payload.correction_type, theme, IMAGE_SUBMISSION_NOTE)
        }
    };

    let essay_id = Uuid::new_v4().to_string();

    // Upload before grading: a failed upload must not burn a paid backend call.
    let image_url = match &submission {
        Submission::Text { .. } => None,
        Submission::Image { bytes, mime_type, filename } => {
            let storage = state.storage().ok_or_else(|| {
                ApiError::ServiceUnavailable(
                    "Image uploads are not available; submit the typed essay instead.".to_string(),
                )
            })?;

            let key = format!("essays/{}/{}_{}", user.id, essay_id, sanitized_filename(filename));
            storage
                .upload_bytes(&key, mime_type, bytes.clone())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to upload essay image"))?;

            Some(storage.public_url(&key))
        }
    };

    let inline_image = match &submission {
        Submission::Text { .. } => None,
        Submission::Image { bytes, mime_type, .. } => {
            Some(InlineImage { bytes, mime_type })
        }
    };

    let correction_text = state
        .grading()
        .grade(&prompt, inline_image)
        .await
        .map_err(|e| ApiError::internal(e, "Grading backend is unavailable"))?;

    let extraction = extract_score(&correction_text);
    metrics::counter!(
        "essay_gradings_total",
        "outcome" => if extraction.score.is_some() { "scored" } else { "unscored" }
    )
    .increment(1);

    let essay = repositories::essays::create(
        state.db(),
        repositories::essays::CreateEssay {
            id: &essay_id,
            author_id: &user.id,
            correction_type: payload.correction_type,
            theme,
            text: match &submission {
                Submission::Text { text } => Some(text),
                Submission::Image { .. } => None,
            },
            image_url: image_url.as_deref(),
            correction_text: &correction_text,
            score: extraction.score,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store grading result"))?;

    tracing::info!(
        essay_id = %essay.id,
        author_id = %user.id,
        correction_type = ?essay.correction_type,
        score = ?extraction.score,
        matched_pattern = ?extraction.pattern,
        "Essay graded"
    );

    Ok(Json(GradeEssayResponse {
        id: essay.id,
        correction_text: essay.correction_text,
        extracted_score: essay.score,
        image_url: essay.image_url,
    }))
}

async fn list_essays(
    Query(params): Query<ListEssaysQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EssayResponse>>, ApiError> {
    let limit = params.limit.clamp(1, 100);
    let skip = params.skip.max(0);

    let essays = repositories::essays::list_by_author(state.db(), &user.id, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list essays"))?;

    Ok(Json(essays.into_iter().map(EssayResponse::from_db).collect()))
}

async fn get_essay(
    Path(essay_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<EssayResponse>, ApiError> {
    let essay = repositories::essays::find_for_author(state.db(), &essay_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load essay"))?
        .ok_or_else(|| ApiError::NotFound("Essay not found".to_string()))?;

    Ok(Json(EssayResponse::from_db(essay)))
}

/// Accepts either a JSON body or a multipart form (`file` carrying the scan).
async fn read_grade_request(
    state: &AppState,
    request: Request,
) -> Result<(GradeEssayRequest, Option<ImageUpload>), ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?;
        read_multipart(state, multipart).await
    } else {
        let Json(payload) = Json::<GradeEssayRequest>::from_request(request, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
        Ok((payload, None))
    }
}

async fn read_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(GradeEssayRequest, Option<ImageUpload>), ApiError> {
    let mut correction_type: Option<CorrectionType> = None;
    let mut theme: Option<String> = None;
    let mut text: Option<String> = None;
    let mut image: Option<ImageUpload> = None;
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "correction_type" | "correctionType" | "tipoCorrecao" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid correction type".to_string()))?;
                correction_type = Some(
                    serde_json::from_value(serde_json::Value::String(value))
                        .unwrap_or(CorrectionType::Generic),
                );
            }
            "theme" | "tema" => {
                theme = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::BadRequest("Invalid theme".to_string()))?,
                );
            }
            "text" | "texto" => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::BadRequest("Invalid essay text".to_string()))?,
                );
            }
            "file" | "imagem" => {
                let filename = field.file_name().unwrap_or("redacao.jpg").to_string();
                let mime_type =
                    field.content_type().unwrap_or("application/octet-stream").to_string();

                validate_image_upload(
                    &filename,
                    &mime_type,
                    &state.settings().storage().allowed_image_extensions,
                )?;

                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    let next_size = bytes.len() as u64 + chunk.len() as u64;
                    if next_size > max_bytes {
                        return Err(ApiError::BadRequest(format!(
                            "File size exceeds {}MB limit",
                            state.settings().storage().max_upload_size_mb
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                image = Some(ImageUpload { bytes, mime_type, filename });
            }
            _ => {}
        }
    }

    let correction_type = correction_type
        .ok_or_else(|| ApiError::BadRequest("correction_type is required".to_string()))?;
    let theme = theme.ok_or_else(|| ApiError::BadRequest("theme is required".to_string()))?;

    Ok((GradeEssayRequest { correction_type, theme, text }, image))
}

fn sanitized_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}
