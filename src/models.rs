use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ParseEnumError;

/// Deserializes through `FromStr`, so JSON input accepts the same spellings as
/// CSV and the command line.
fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_from_str(deserializer)
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let needle = value.trim().to_lowercase().replace(['_', ' '], "-");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str() == needle)
                    .ok_or_else(|| ParseEnumError {
                        kind: $kind,
                        value: value.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|candidate| candidate.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

labelled_enum!(
    /// Visual style of a logo.
    Style, "style" {
        Minimalist => "minimalist",
        Modern => "modern",
        Vintage => "vintage",
        Playful => "playful",
        Elegant => "elegant",
        Bold => "bold",
        Geometric => "geometric",
        HandDrawn => "hand-drawn",
        Abstract => "abstract",
        Corporate => "corporate",
        Tech => "tech",
        Organic => "organic",
        Luxury => "luxury",
        Retro => "retro",
        Flat => "flat",
        Gradient => "gradient",
    }
);

labelled_enum!(
    /// Business sector a logo is meant for.
    Industry, "industry" {
        Technology => "technology",
        Healthcare => "healthcare",
        Finance => "finance",
        Education => "education",
        Retail => "retail",
        FoodBeverage => "food-beverage",
        RealEstate => "real-estate",
        Entertainment => "entertainment",
        Sports => "sports",
        Travel => "travel",
        Automotive => "automotive",
        Fashion => "fashion",
        Nonprofit => "nonprofit",
    }
);

labelled_enum!(
    Quality, "quality" {
        Standard => "standard",
        Hd => "hd",
    }
);

impl Default for Quality {
    fn default() -> Self {
        Self::Standard
    }
}

impl Quality {
    /// Price in USD of one generated image at this quality.
    pub fn cost_usd(self) -> f64 {
        match self {
            Quality::Standard => 0.07,
            Quality::Hd => 0.19,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LogoSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1792x1024")]
    Landscape,
    #[serde(rename = "1024x1792")]
    Portrait,
}

impl LogoSize {
    pub const ALL: &'static [LogoSize] =
        &[LogoSize::Square, LogoSize::Landscape, LogoSize::Portrait];

    pub fn as_str(self) -> &'static str {
        match self {
            LogoSize::Square => "1024x1024",
            LogoSize::Landscape => "1792x1024",
            LogoSize::Portrait => "1024x1792",
        }
    }
}

impl fmt::Display for LogoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogoSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

impl FromStr for LogoSize {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "1024x1024" | "square" => Ok(LogoSize::Square),
            "1792x1024" | "landscape" => Ok(LogoSize::Landscape),
            "1024x1792" | "portrait" => Ok(LogoSize::Portrait),
            _ => Err(ParseEnumError {
                kind: "size",
                value: value.to_string(),
                expected: "1024x1024, 1792x1024, 1024x1792".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub company: String,
    #[serde(alias = "description")]
    pub prompt: String,
    #[serde(default)]
    pub style: Option<Style>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default, deserialize_with = "deserialize_colors")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub size: Option<LogoSize>,
    #[serde(default)]
    pub quality: Option<Quality>,
}

impl GenerationRequest {
    pub fn new(company: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            prompt: prompt.into(),
            style: None,
            industry: None,
            colors: Vec::new(),
            size: None,
            quality: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_industry(mut self, industry: Industry) -> Self {
        self.industry = Some(industry);
        self
    }

    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_size(mut self, size: LogoSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Returns a copy of this request with every field set in `options` taking precedence.
    pub fn overlay(&self, options: &GenerationOptions) -> GenerationRequest {
        GenerationRequest {
            company: self.company.clone(),
            prompt: self.prompt.clone(),
            style: options.style.or(self.style),
            industry: options.industry.or(self.industry),
            colors: options
                .colors
                .clone()
                .unwrap_or_else(|| self.colors.clone()),
            size: options.size.or(self.size),
            quality: options.quality.or(self.quality),
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.company.trim().is_empty() {
            return Err(crate::error::LogoError::validation("company name is required"));
        }
        if self.prompt.trim().is_empty() {
            return Err(crate::error::LogoError::validation(format!(
                "prompt is required for '{}'",
                self.company
            )));
        }
        Ok(())
    }

    pub fn effective_size(&self) -> LogoSize {
        self.size.unwrap_or_default()
    }

    pub fn effective_quality(&self) -> Quality {
        self.quality.unwrap_or_default()
    }
}

/// Call-time overrides layered on top of a [`GenerationRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub style: Option<Style>,
    pub industry: Option<Industry>,
    pub colors: Option<Vec<String>>,
    pub size: Option<LogoSize>,
    pub quality: Option<Quality>,
    pub template_id: Option<String>,
    pub negative_prompts: Vec<String>,
    pub custom_elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub company: String,
    pub original_prompt: String,
    pub final_prompt: String,
    pub style: Option<Style>,
    pub industry: Option<Industry>,
    pub size: LogoSize,
    pub quality: Quality,
    pub cost: f64,
    #[serde(default)]
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub url: String,
    #[serde(default)]
    pub revised_prompt: Option<String>,
    pub metadata: LogoMetadata,
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Served from the result cache rather than generated by this call.
    #[serde(skip)]
    pub cached: bool,
}

impl GenerationResult {
    pub fn cost(&self) -> f64 {
        self.metadata.cost
    }
}

/// Splits a color list written as `red;blue` (or `red, blue`) into its items.
pub fn split_colors(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(|color| color.trim().trim_matches('"').trim())
        .filter(|color| !color.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_colors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Colors {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Colors>::deserialize(deserializer)? {
        Some(Colors::List(colors)) => colors
            .into_iter()
            .map(|color| color.trim().to_string())
            .filter(|color| !color.is_empty())
            .collect(),
        Some(Colors::Joined(raw)) => split_colors(&raw),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_loosely() {
        assert_eq!("Hand Drawn".parse::<Style>().unwrap(), Style::HandDrawn);
        assert_eq!("hand_drawn".parse::<Style>().unwrap(), Style::HandDrawn);
        assert_eq!(" minimalist ".parse::<Style>().unwrap(), Style::Minimalist);
        assert!("baroque".parse::<Style>().is_err());
        assert_eq!(Style::ALL.len(), 16);
        assert_eq!(Industry::ALL.len(), 13);
    }

    #[test]
    fn size_accepts_dimensions_and_names() {
        assert_eq!("1792x1024".parse::<LogoSize>().unwrap(), LogoSize::Landscape);
        assert_eq!("portrait".parse::<LogoSize>().unwrap(), LogoSize::Portrait);
        assert!("512x512".parse::<LogoSize>().is_err());
    }

    #[test]
    fn cost_table() {
        assert_eq!(Quality::Standard.cost_usd(), 0.07);
        assert_eq!(Quality::Hd.cost_usd(), 0.19);
    }

    #[test]
    fn overlay_prefers_option_values() {
        let request = GenerationRequest::new("Acme", "rockets")
            .with_style(Style::Bold)
            .with_colors(["red"]);
        let options = GenerationOptions {
            style: Some(Style::Elegant),
            quality: Some(Quality::Hd),
            ..Default::default()
        };
        let merged = request.overlay(&options);
        assert_eq!(merged.style, Some(Style::Elegant));
        assert_eq!(merged.colors, vec!["red".to_string()]);
        assert_eq!(merged.effective_quality(), Quality::Hd);
        assert_eq!(merged.effective_size(), LogoSize::Square);
    }

    #[test]
    fn request_deserializes_description_alias_and_joined_colors() {
        let request: GenerationRequest = serde_json::from_value(serde_json::json!({
            "company": "Acme",
            "description": "rocket fuel",
            "style": "hand-drawn",
            "colors": "red; blue",
            "size": "1024x1792",
            "quality": "hd"
        }))
        .unwrap();
        assert_eq!(request.prompt, "rocket fuel");
        assert_eq!(request.style, Some(Style::HandDrawn));
        assert_eq!(request.colors, vec!["red", "blue"]);
        assert_eq!(request.size, Some(LogoSize::Portrait));
        assert_eq!(request.quality, Some(Quality::Hd));
    }

    #[test]
    fn json_accepts_the_same_spellings_as_from_str() {
        let request: GenerationRequest = serde_json::from_value(serde_json::json!({
            "company": "Acme",
            "prompt": "x",
            "style": "Hand Drawn",
            "industry": "Food_Beverage",
            "size": "square",
            "quality": " HD "
        }))
        .unwrap();
        assert_eq!(request.style, Some(Style::HandDrawn));
        assert_eq!(request.industry, Some(Industry::FoodBeverage));
        assert_eq!(request.size, Some(LogoSize::Square));
        assert_eq!(request.quality, Some(Quality::Hd));

        assert_eq!(serde_json::to_value(Style::HandDrawn).unwrap(), "hand-drawn");
        assert_eq!(serde_json::to_value(LogoSize::Landscape).unwrap(), "1792x1024");
        let err = serde_json::from_str::<Style>(r#""baroque""#).unwrap_err();
        assert!(err.to_string().contains("unknown style 'baroque'"));
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(GenerationRequest::new(" ", "x").validate().is_err());
        assert!(GenerationRequest::new("Acme", "  ").validate().is_err());
        assert!(GenerationRequest::new("Acme", "x").validate().is_ok());
    }
}
