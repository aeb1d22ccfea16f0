use chrono::{TimeZone, Utc};

use crate::models::{GenerationResult, LogoMetadata, LogoSize, Quality, Style};

pub(crate) fn sample_result(company: &str) -> GenerationResult {
    let slug: String = company
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    GenerationResult {
        url: format!("https://images.example.com/{slug}.png"),
        revised_prompt: Some(format!("A revised logo for {company}")),
        metadata: LogoMetadata {
            id: format!("logo_{slug}0123456789"),
            created_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
            company: company.to_string(),
            original_prompt: "bold new idea".to_string(),
            final_prompt: format!("Bold, striking logo of {company}, bold new idea"),
            style: Some(Style::Bold),
            industry: None,
            size: LogoSize::Square,
            quality: Quality::Standard,
            cost: Quality::Standard.cost_usd(),
            template_id: None,
        },
        local_path: None,
        cached: false,
    }
}

/// A 1x1 PNG, base64 encoded.
pub(crate) const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

pub(crate) fn tiny_png_data_url() -> String {
    format!("data:image/png;base64,{TINY_PNG_BASE64}")
}
