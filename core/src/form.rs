//! Creation form and its mapping onto the store payload.
//!
//! The mapping is fixed: the category input is upper-cased and wrapped as a
//! single tag (commas are not split), the date is stamped at submission in
//! RFC 3339 with millisecond precision, and every post gets the same cover
//! image.

use chrono::{DateTime, SecondsFormat, Utc};
use validator::{Validate, ValidationError};

use crate::error::FormError;
use crate::types::NewPost;

/// Cover image stamped on every post created through the form.
pub const COVER_IMAGE_PLACEHOLDER: &str =
    "https://images.pexels.com/photos/6801648/pexels-photo-6801648.jpeg";

const REQUIRED_FIELDS: [&str; 3] = ["title", "category", "content"];

/// Raw values as typed into the creation form.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub category: String,
    #[validate(length(min = 1), custom(function = "not_blank"))]
    pub content: String,
    pub description: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl PostForm {
    pub fn new(title: &str, category: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            description: None,
        }
    }

    /// Validate and map onto the create payload, stamping `now` as the date.
    pub fn into_new_post(self, now: DateTime<Utc>) -> Result<NewPost, FormError> {
        if let Err(errors) = self.validate() {
            let fields = errors.field_errors();
            let missing = REQUIRED_FIELDS
                .iter()
                .filter(|name| fields.contains_key(**name))
                .map(|name| name.to_string())
                .collect();
            return Err(FormError::Invalid(missing));
        }

        Ok(NewPost {
            title: self.title,
            category: vec![self.category.to_uppercase()],
            description: self.description,
            content: self.content,
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            cover_image: COVER_IMAGE_PLACEHOLDER.to_string(),
        })
    }
}
