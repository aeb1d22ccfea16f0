use tracing::debug;

use super::{ProfessionalTemplate, Segment, Slot, TemplateLibrary, catalog};
use crate::error::{LogoError, Result};
use crate::models::{GenerationOptions, GenerationRequest, Industry, Style};

const TECHNICAL_REQUIREMENTS: &str =
    "vector graphics, clean lines, scalable design, professional quality";
const BACKGROUND_CLAUSE: &str = "on white background";
const DEFAULT_STYLE_PHRASE: &str = "Professional";

const FALLBACK_STYLE: &str = "professional";
const FALLBACK_INDUSTRY: &str = "business";
const FALLBACK_PRIMARY: &str = "brand";
const FALLBACK_SECONDARY: &str = "complementary";
const FALLBACK_PALETTE: &str = "a harmonious brand palette";

pub fn style_phrase(style: Option<Style>) -> &'static str {
    let Some(style) = style else {
        return DEFAULT_STYLE_PHRASE;
    };
    match style {
        Style::Minimalist => "Minimalist, clean",
        Style::Modern => "Modern, sleek",
        Style::Vintage => "Vintage, classic",
        Style::Playful => "Playful, fun",
        Style::Elegant => "Elegant, sophisticated",
        Style::Bold => "Bold, striking",
        Style::Geometric => "Geometric, precise",
        Style::HandDrawn => "Hand-drawn, artisanal",
        Style::Abstract => "Abstract, artistic",
        Style::Corporate => "Corporate, professional",
        Style::Tech => "Tech-forward, futuristic",
        Style::Organic => "Organic, natural",
        Style::Luxury => "Luxurious, premium",
        Style::Retro => "Retro, nostalgic",
        Style::Flat => "Flat design, simple",
        Style::Gradient => "Vibrant gradient",
    }
}

/// `red`, `red and blue`, `red, blue and green`.
pub fn join_colors(colors: &[String]) -> String {
    match colors {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn technical_clause(colors: &[String]) -> String {
    match colors.len() {
        0 => TECHNICAL_REQUIREMENTS.to_string(),
        1 => format!("{TECHNICAL_REQUIREMENTS}, using {} color", colors[0]),
        _ => format!("{TECHNICAL_REQUIREMENTS}, using {} colors", join_colors(colors)),
    }
}

fn modifier_clause<'a>(negatives: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for negative in negatives {
        let negative = negative.trim();
        if !negative.is_empty() && !seen.contains(&negative) {
            seen.push(negative);
        }
    }
    seen.iter()
        .map(|negative| format!("--{negative}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn industry_label(industry: Option<Industry>) -> String {
    industry
        .map(|industry| industry.as_str().replace('-', " "))
        .unwrap_or_else(|| FALLBACK_INDUSTRY.to_string())
}

/// Values for each template slot, derived from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotValues {
    pub company: String,
    pub prompt: String,
    pub style: String,
    pub industry: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub palette: String,
}

impl SlotValues {
    pub fn from_request(request: &GenerationRequest) -> Self {
        let primary = request.colors.first().cloned();
        let secondary = request.colors.get(1).cloned().or_else(|| primary.clone());
        Self {
            company: request.company.trim().to_string(),
            prompt: request.prompt.trim().to_string(),
            style: request
                .style
                .map(|style| style.as_str().replace('-', " "))
                .unwrap_or_else(|| FALLBACK_STYLE.to_string()),
            industry: industry_label(request.industry),
            primary_color: primary.unwrap_or_else(|| FALLBACK_PRIMARY.to_string()),
            secondary_color: secondary.unwrap_or_else(|| FALLBACK_SECONDARY.to_string()),
            palette: if request.colors.is_empty() {
                FALLBACK_PALETTE.to_string()
            } else {
                format!("{} palette", join_colors(&request.colors))
            },
        }
    }

    pub fn value(&self, slot: Slot) -> &str {
        match slot {
            Slot::Company => &self.company,
            Slot::Prompt => &self.prompt,
            Slot::Style => &self.style,
            Slot::Industry => &self.industry,
            Slot::PrimaryColor => &self.primary_color,
            Slot::SecondaryColor => &self.secondary_color,
            Slot::Palette => &self.palette,
        }
    }
}

/// Turns a request into the final text prompt sent to the image API.
#[derive(Debug, Clone, Copy)]
pub struct PromptEngine<'a> {
    library: &'a TemplateLibrary,
}

impl Default for PromptEngine<'static> {
    fn default() -> Self {
        Self::new(TemplateLibrary::builtin())
    }
}

impl<'a> PromptEngine<'a> {
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &'a TemplateLibrary {
        self.library
    }

    /// Builds the prompt for an already overlaid request. A template id in
    /// `options` selects the template path; otherwise the free-form path.
    pub fn build(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<String> {
        let prompt = match options.template_id.as_deref() {
            Some(id) => {
                let template = self
                    .library
                    .get(id)
                    .ok_or_else(|| LogoError::TemplateNotFound { id: id.to_string() })?;
                self.from_template(template, request, options)?
            }
            None => self.compose(request, options),
        };
        debug!("built prompt for {}: {}", request.company, prompt);
        Ok(prompt)
    }

    /// Overlays `options`, validates and renders, exactly as generation would,
    /// without touching the network or the cache.
    pub fn preview(
        &self,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<String> {
        let request = request.overlay(options);
        request.validate()?;
        self.build(&request, options)
    }

    /// Free-form composition: style phrase, subject, technical clause,
    /// background, then `--` modifiers.
    pub fn compose(&self, request: &GenerationRequest, options: &GenerationOptions) -> String {
        let mut parts = vec![format!(
            "{} logo of {}, {}",
            style_phrase(request.style),
            request.company.trim(),
            request.prompt.trim()
        )];
        if let Some(elements) = custom_elements_clause(options) {
            parts.push(elements);
        }
        parts.push(technical_clause(&request.colors));
        parts.push(BACKGROUND_CLAUSE.to_string());

        let modifiers = modifier_clause(
            catalog::default_negative_prompts()
                .iter()
                .copied()
                .chain(options.negative_prompts.iter().map(String::as_str)),
        );
        format!("{} {}", parts.join(", "), modifiers)
    }

    pub fn from_template(
        &self,
        template: &ProfessionalTemplate,
        request: &GenerationRequest,
        options: &GenerationOptions,
    ) -> Result<String> {
        let values = SlotValues::from_request(request);
        let mut body = String::with_capacity(template.base_prompt.len() + 64);
        for segment in template.segments()? {
            match segment {
                Segment::Text(text) => body.push_str(text),
                Segment::Slot(slot) => body.push_str(values.value(slot)),
            }
        }

        let mut parts = vec![body];
        if let Some(elements) = custom_elements_clause(options) {
            parts.push(elements);
        }
        parts.push(technical_clause(&request.colors));

        let modifiers = modifier_clause(
            template
                .negative_prompts
                .iter()
                .copied()
                .chain(options.negative_prompts.iter().map(String::as_str)),
        );
        if modifiers.is_empty() {
            Ok(parts.join(", "))
        } else {
            Ok(format!("{} {}", parts.join(", "), modifiers))
        }
    }
}

fn custom_elements_clause(options: &GenerationOptions) -> Option<String> {
    let elements: Vec<String> = options
        .custom_elements
        .iter()
        .map(|element| element.trim().to_string())
        .filter(|element| !element.is_empty())
        .collect();
    if elements.is_empty() {
        None
    } else {
        Some(format!("incorporating {}", join_colors(&elements)))
    }
}
