//! Field checks run before any state transition.

use std::borrow::Cow;

use url::Url;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

use super::models::{PostImage, Translated};

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// A failure on one field, for checks made while decoding a request.
pub(crate) fn single(field: &'static str, code: &'static str, message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, field_error(code, message));
    errors
}

pub(crate) fn require_text(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, field_error("blank", "must not be blank"));
    }
}

pub(crate) fn require_translated(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &Translated<String>,
) {
    require_text(errors, field, &value.base);
}


pub(crate) fn optional_url(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        if Url::parse(value).is_err() {
            errors.add(field, field_error("url", "must be an absolute url"));
        }
    }
}

pub(crate) fn optional_email(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>) {
    if let Some(value) = value {
        if !value.validate_email() {
            errors.add(field, field_error("email", "must be a valid email address"));
        }
    }
}

pub(crate) fn date_order(errors: &mut ValidationErrors, ordered: bool) {
    if !ordered {
        errors.add(
            "end_date",
            field_error("date_order", "must not precede the start date"),
        );
    }
}

pub(crate) fn image(errors: &mut ValidationErrors, value: &Option<PostImage>) {
    match value {
        Some(PostImage::Url(url)) if Url::parse(url).is_err() => {
            errors.add("image", field_error("url", "must be an absolute url"));
        }
        Some(PostImage::Bytes(bytes)) if !infer::is_image(bytes) => {
            errors.add("image", field_error("image", "is not a recognized image format"));
        }
        _ => {}
    }
}

/// Blank optional text is treated as absent.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Like [`finish`], but also requires a club selection and yields it.
pub(crate) fn finish_with_selection<T>(
    mut errors: ValidationErrors,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ValidationErrors> {
    match value {
        Some(value) => finish(errors).map(|()| value),
        None => {
            errors.add(field, field_error("required", "a club must be selected"));
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_whitespace() {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", "   \n\t");
        require_text(&mut errors, "content", "ok");
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(!fields.contains_key("content"));
    }

    #[test]
    fn test_optional_checks_skip_absent_values() {
        let mut errors = ValidationErrors::new();
        optional_url(&mut errors, "website", &None);
        optional_email(&mut errors, "email", &None);
        assert!(finish(errors).is_ok());
    }

    #[test]
    fn test_invalid_links_and_email_are_reported_per_field() {
        let mut errors = ValidationErrors::new();
        optional_url(&mut errors, "website", &Some("not a url".to_string()));
        optional_email(&mut errors, "email", &Some("nobody".to_string()));
        let errors = finish(errors).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("website"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_image_bytes_must_be_an_image() {
        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let mut errors = ValidationErrors::new();
        image(&mut errors, &Some(PostImage::Bytes(png_header)));
        assert!(errors.is_empty());

        image(&mut errors, &Some(PostImage::Bytes(b"plain text".to_vec())));
        assert!(errors.field_errors().contains_key("image"));
    }

    #[test]
    fn test_finish_with_selection() {
        assert_eq!(finish_with_selection(ValidationErrors::new(), "club_id", Some(7)).unwrap(), 7);

        let errors = finish_with_selection::<u8>(ValidationErrors::new(), "club_id", None).unwrap_err();
        assert!(errors.field_errors().contains_key("club_id"));

        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", "");
        let errors = finish_with_selection::<u8>(errors, "club_id", None).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("club_id"));

        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", "");
        assert!(finish_with_selection(errors, "club_id", Some(7)).is_err());
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(blank_to_none(None), None);
    }
}
