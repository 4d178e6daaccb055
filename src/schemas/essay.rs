use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Essay;
use crate::db::types::CorrectionType;

/// JSON body of the grading endpoint. The multipart path fills the same
/// fields from form parts before resolving the submission.
#[derive(Debug, Deserialize)]
pub(crate) struct GradeEssayRequest {
    #[serde(alias = "correctionType", alias = "tipoCorrecao")]
    pub(crate) correction_type: CorrectionType,
    #[serde(alias = "tema")]
    pub(crate) theme: String,
    #[serde(default)]
    #[serde(alias = "texto")]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeEssayResponse {
    pub(crate) id: String,
    pub(crate) correction_text: String,
    pub(crate) extracted_score: Option<i32>,
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EssayResponse {
    pub(crate) id: String,
    pub(crate) author_id: String,
    pub(crate) correction_type: CorrectionType,
    pub(crate) theme: String,
    pub(crate) text: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) correction_text: String,
    pub(crate) score: Option<i32>,
    pub(crate) created_at: String,
}

impl EssayResponse {
    pub(crate) fn from_db(essay: Essay) -> Self {
        Self {
            id: essay.id,
            author_id: essay.author_id,
            correction_type: essay.correction_type,
            theme: essay.theme,
            text: essay.text,
            image_url: essay.image_url,
            correction_text: essay.correction_text,
            score: essay.score,
            created_at: format_primitive(essay.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GradeEssayRequest;
    use crate::db::types::CorrectionType;

    #[test]
    fn request_accepts_camel_case_and_portuguese_aliases() {
        let parsed: GradeEssayRequest = serde_json::from_value(serde_json::json!({
            "correctionType": "enem",
            "tema": "Tema",
            "texto": "Texto",
        }))
        .expect("aliases");

        assert_eq!(parsed.correction_type, CorrectionType::Enem);
        assert_eq!(parsed.theme, "Tema");
        assert_eq!(parsed.text.as_deref(), Some("Texto"));
    }

    #[test]
    fn unknown_correction_type_still_deserializes() {
        let parsed: GradeEssayRequest = serde_json::from_value(serde_json::json!({
            "correction_type": "ime-ita",
            "theme": "Tema",
        }))
        .expect("fallback");

        assert_eq!(parsed.correction_type, CorrectionType::Generic);
        assert!(parsed.text.is_none());
    }
}
