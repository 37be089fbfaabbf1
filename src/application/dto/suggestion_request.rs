// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::models::link_suggestion::LinkSuggestion;
use crate::domain::models::search_config::SearchConfig;

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuggestLinksRequestDto {
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 3, message = "At most 3 keywords are allowed"))]
    pub keywords: Vec<String>,
    // Falls back to the server-side search credentials when absent
    pub search_config: Option<SearchConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestLinksResponseDto {
    pub suggestions: Vec<LinkSuggestion>,
}

fn validate_not_blank(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Content cannot be empty".into());
        return Err(err);
    }
    Ok(())
}
