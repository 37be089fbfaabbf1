// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::services::website_context::WebsiteSummary;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct WebsiteContextRequestDto {
    #[validate(length(min = 1, max = 20, message = "Between 1 and 20 urls are required"))]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebsiteContextResponseDto {
    pub summaries: Vec<WebsiteSummary>,
}
