//! Validated form input for posts and comments.

use uuid::Uuid;

use super::error::DomainError;

pub const MAX_POST_TEXT_CHARS: usize = 10_000;
pub const MAX_COMMENT_TEXT_CHARS: usize = 2_000;

/// Submitted post form, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

/// Post form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidPostInput {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl PostInput {
    pub fn validate(self) -> Result<ValidPostInput, DomainError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(DomainError::validation("post text must not be empty"));
        }
        if text.chars().count() > MAX_POST_TEXT_CHARS {
            return Err(DomainError::validation(format!(
                "post text exceeds {MAX_POST_TEXT_CHARS} characters"
            )));
        }
        let image = self
            .image
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(ValidPostInput {
            text,
            group_id: self.group_id,
            image,
        })
    }
}

pub fn validate_comment_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("comment text must not be empty"));
    }
    if text.chars().count() > MAX_COMMENT_TEXT_CHARS {
        return Err(DomainError::validation(format!(
            "comment text exceeds {MAX_COMMENT_TEXT_CHARS} characters"
        )));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_input_trims_and_accepts_text() {
        let input = PostInput {
            text: "  hello world  ".to_string(),
            group_id: None,
            image: None,
        };
        let valid = input.validate().expect("valid input");
        assert_eq!(valid.text, "hello world");
    }

    #[test]
    fn post_input_rejects_blank_text() {
        let input = PostInput {
            text: "   ".to_string(),
            group_id: None,
            image: None,
        };
        assert!(matches!(
            input.validate(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn post_input_drops_empty_image_reference() {
        let input = PostInput {
            text: "text".to_string(),
            group_id: None,
            image: Some("   ".to_string()),
        };
        let valid = input.validate().expect("valid input");
        assert!(valid.image.is_none());
    }

    #[test]
    fn comment_text_rejects_blank() {
        assert!(validate_comment_text("  ").is_err());
        assert_eq!(validate_comment_text(" ok ").expect("valid"), "ok");
    }
}
