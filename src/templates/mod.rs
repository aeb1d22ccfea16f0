pub mod catalog;
pub mod engine;

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::error::{LogoError, Result};
use crate::models::Industry;

pub use engine::PromptEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Minimal,
    Corporate,
    Creative,
    IndustrySpecific,
}

impl TemplateCategory {
    pub const ALL: &'static [TemplateCategory] = &[
        TemplateCategory::Minimal,
        TemplateCategory::Corporate,
        TemplateCategory::Creative,
        TemplateCategory::IndustrySpecific,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateCategory::Minimal => "minimal",
            TemplateCategory::Corporate => "corporate",
            TemplateCategory::Creative => "creative",
            TemplateCategory::IndustrySpecific => "industry-specific",
        }
    }
}

impl std::str::FromStr for TemplateCategory {
    type Err = crate::error::ParseEnumError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| crate::error::ParseEnumError {
                kind: "category",
                value: value.to_string(),
                expected: "minimal, corporate, creative, industry-specific".to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Low,
    Medium,
    High,
}

/// A named placeholder inside a template's base prompt, written `{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Company,
    Prompt,
    Style,
    Industry,
    PrimaryColor,
    SecondaryColor,
    Palette,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Company => "company",
            Slot::Prompt => "prompt",
            Slot::Style => "style",
            Slot::Industry => "industry",
            Slot::PrimaryColor => "primary_color",
            Slot::SecondaryColor => "secondary_color",
            Slot::Palette => "palette",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        match name {
            "company" => Some(Slot::Company),
            "prompt" => Some(Slot::Prompt),
            "style" => Some(Slot::Style),
            "industry" => Some(Slot::Industry),
            "primary_color" => Some(Slot::PrimaryColor),
            "secondary_color" => Some(Slot::SecondaryColor),
            "palette" => Some(Slot::Palette),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Slot(Slot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: u32,
    pub category: TemplateCategory,
    pub complexity: Complexity,
    pub base_prompt: &'static str,
    pub negative_prompts: &'static [&'static str],
    pub required_params: &'static [Slot],
    pub optional_params: &'static [Slot],
    /// Empty means the template fits every industry.
    pub industries: &'static [Industry],
    pub examples: &'static [&'static str],
    pub cost_tier: CostTier,
}

impl ProfessionalTemplate {
    /// Splits the base prompt into literal text and slots. Unknown or
    /// unterminated placeholders are errors.
    pub fn segments(&self) -> Result<Vec<Segment<'static>>> {
        let mut segments = Vec::new();
        let mut rest = self.base_prompt;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Text(&rest[..open]));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                LogoError::validation(format!(
                    "template '{}' has an unterminated placeholder",
                    self.id
                ))
            })?;
            let name = &after[..close];
            let slot = Slot::from_name(name).ok_or_else(|| {
                LogoError::validation(format!(
                    "template '{}' uses unknown placeholder {{{}}}",
                    self.id, name
                ))
            })?;
            segments.push(Segment::Slot(slot));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }
        Ok(segments)
    }

    pub fn slots(&self) -> Result<Vec<Slot>> {
        Ok(self
            .segments()?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Slot(slot) => Some(slot),
                Segment::Text(_) => None,
            })
            .collect())
    }

    pub fn fits_industry(&self, industry: Industry) -> bool {
        self.industries.is_empty() || self.industries.contains(&industry)
    }
}

/// Immutable set of templates indexed by id.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<ProfessionalTemplate>,
    index: HashMap<&'static str, usize>,
}

static BUILTIN: LazyLock<TemplateLibrary> =
    LazyLock::new(|| TemplateLibrary::indexed(catalog::builtin_templates()));

impl TemplateLibrary {
    /// Builds a library, rejecting duplicate ids and malformed base prompts.
    pub fn new(templates: Vec<ProfessionalTemplate>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for template in &templates {
            if !seen.insert(template.id) {
                return Err(LogoError::validation(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }
            let slots = template.slots()?;
            if let Some(missing) = template
                .required_params
                .iter()
                .find(|required| !slots.contains(required))
            {
                return Err(LogoError::validation(format!(
                    "template '{}' requires {{{}}} but never uses it",
                    template.id,
                    missing.name()
                )));
            }
        }
        Ok(Self::indexed(templates))
    }

    fn indexed(templates: Vec<ProfessionalTemplate>) -> Self {
        let index = templates
            .iter()
            .enumerate()
            .map(|(position, template)| (template.id, position))
            .collect();
        Self { templates, index }
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> &'static TemplateLibrary {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&ProfessionalTemplate> {
        self.index.get(id).map(|position| &self.templates[*position])
    }

    pub fn all(&self) -> &[ProfessionalTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn by_category(&self, category: TemplateCategory) -> Vec<&ProfessionalTemplate> {
        self.templates
            .iter()
            .filter(|template| template.category == category)
            .collect()
    }

    pub fn by_industry(&self, industry: Industry) -> Vec<&ProfessionalTemplate> {
        self.templates
            .iter()
            .filter(|template| template.fits_industry(industry))
            .collect()
    }

    pub fn by_complexity(&self, complexity: Complexity) -> Vec<&ProfessionalTemplate> {
        self.templates
            .iter()
            .filter(|template| template.complexity == complexity)
            .collect()
    }
}
