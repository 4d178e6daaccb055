use thiserror::Error;

/// A resolved essay delivery: typed text or a scanned image, never both.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Submission {
    Text { text: String },
    Image { bytes: Vec<u8>, mime_type: String, filename: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum SubmissionError {
    #[error("missing-input: send the typed essay or an image of it")]
    MissingInput,
    #[error("conflicting-input: send either the typed essay or the image, not both")]
    ConflictingInput,
    #[error("missing-theme: the essay theme is required")]
    MissingTheme,
}

#[derive(Debug, Clone)]
pub(crate) struct ImageUpload {
    pub(crate) bytes: Vec<u8>,
    pub(crate) mime_type: String,
    pub(crate) filename: String,
}

/// Enforces the text-XOR-image contract. Blank text counts as absent; an
/// empty upload counts as absent. Pure, no side effects.
pub(crate) fn resolve(
    theme: &str,
    text: Option<&str>,
    image: Option<ImageUpload>,
) -> Result<Submission, SubmissionError> {
    if theme.trim().is_empty() {
        return Err(SubmissionError::MissingTheme);
    }

    let text = text.map(str::trim).filter(|value| !value.is_empty());
    let image = image.filter(|upload| !upload.bytes.is_empty());

    match (text, image) {
        (Some(_), Some(_)) => Err(SubmissionError::ConflictingInput),
        (None, None) => Err(SubmissionError::MissingInput),
        (Some(text), None) => Ok(Submission::Text { text: text.to_string() }),
        (None, Some(upload)) => Ok(Submission::Image {
            bytes: upload.bytes,
            mime_type: upload.mime_type,
            filename: upload.filename,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageUpload {
        ImageUpload {
            bytes: vec![0xFF, 0xD8, 0xFF],
            mime_type: "image/jpeg".to_string(),
            filename: "redacao.jpg".to_string(),
        }
    }

    #[test]
    fn typed_text_resolves_to_text_submission() {
        let submission = resolve("Tema livre", Some("  Minha redação.  "), None).expect("text");
        assert_eq!(submission, Submission::Text { text: "Minha redação.".to_string() });
    }

    #[test]
    fn image_resolves_to_image_submission() {
        let submission = resolve("Tema livre", None, Some(image())).expect("image");
        match submission {
            Submission::Image { mime_type, filename, bytes } => {
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(filename, "redacao.jpg");
                assert!(!bytes.is_empty());
            }
            other => panic!("expected image submission, got {other:?}"),
        }
    }

    #[test]
    fn neither_input_is_rejected() {
        assert_eq!(resolve("Tema", None, None), Err(SubmissionError::MissingInput));
    }

    #[test]
    fn blank_text_counts_as_absent() {
        assert_eq!(resolve("Tema", Some("   \n "), None), Err(SubmissionError::MissingInput));
    }

    #[test]
    fn both_inputs_are_rejected() {
        assert_eq!(
            resolve("Tema", Some("texto digitado"), Some(image())),
            Err(SubmissionError::ConflictingInput)
        );
    }

    #[test]
    fn blank_text_plus_image_is_an_image_submission() {
        let submission = resolve("Tema", Some("  "), Some(image())).expect("image wins");
        assert!(matches!(submission, Submission::Image { .. }));
    }

    #[test]
    fn blank_theme_is_rejected() {
        assert_eq!(resolve("  ", Some("texto"), None), Err(SubmissionError::MissingTheme));
    }
}
