use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Reviewer,
}

/// Grading standard applied to an essay. Unknown values sent by clients fall
/// back to the generic rubric instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "correctiontype", rename_all = "lowercase")]
pub(crate) enum CorrectionType {
    Enem,
    Concursos,
    Fuvest,
    #[serde(other)]
    Generic,
}
