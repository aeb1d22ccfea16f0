use super::{Complexity, CostTier, ProfessionalTemplate, Slot, TemplateCategory};
use crate::models::Industry;

const BASE_NEGATIVES: &[&str] = &[
    "no text",
    "no watermark",
    "no blurry edges",
    "no photorealistic rendering",
];
const CORE: &[Slot] = &[Slot::Company, Slot::Prompt];
const STYLE_AND_INDUSTRY: &[Slot] = &[Slot::Style, Slot::Industry];
const COLOR_SLOTS: &[Slot] = &[Slot::PrimaryColor, Slot::SecondaryColor, Slot::Palette];

pub fn builtin_templates() -> Vec<ProfessionalTemplate> {
    let mut templates = minimal();
    templates.extend(corporate());
    templates.extend(creative());
    templates.extend(industry_specific());
    templates
}

fn minimal() -> Vec<ProfessionalTemplate> {
    vec![
        ProfessionalTemplate {
            id: "minimal-wordmark",
            name: "Minimal Wordmark",
            description: "Typography-led mark built from the company name alone",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Simple,
            base_prompt: "Minimalist wordmark logo spelling {company}, {prompt}, refined sans-serif lettering in {primary_color}, generous negative space",
            negative_prompts: &["no icons", "no gradients", "no clutter"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor],
            industries: &[],
            examples: &["Law firm name set in thin capitals", "Studio name with custom kerning"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "minimal-lettermark",
            name: "Minimal Lettermark",
            description: "Single initial or monogram reduced to its essential strokes",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Simple,
            base_prompt: "Minimal lettermark logo using the initials of {company}, {prompt}, single weight strokes, {primary_color} on white",
            negative_prompts: &["no full words", "no ornaments", "no shadows"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor],
            industries: &[],
            examples: &["Monogram for a boutique consultancy", "Initial mark for an app icon"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "minimal-line-icon",
            name: "Line Icon",
            description: "Continuous line drawing icon paired with a small wordmark",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Simple,
            base_prompt: "Single continuous line icon logo for {company}, {prompt}, thin uniform stroke in {primary_color}, {style} feel",
            negative_prompts: &["no fills", "no thick outlines", "no shading"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::PrimaryColor],
            industries: &[],
            examples: &["Coffee cup drawn in one line", "Mountain outline for an outdoor brand"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "minimal-geometric-mark",
            name: "Geometric Mark",
            description: "Abstract symbol composed from basic geometric primitives",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Moderate,
            base_prompt: "Minimal geometric logo mark for {company}, {prompt}, built from circles, squares and triangles, {primary_color} and {secondary_color}",
            negative_prompts: &["no organic shapes", "no textures", "no 3d effects"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[],
            examples: &["Interlocking squares for an architecture office"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "minimal-negative-space",
            name: "Negative Space",
            description: "Mark that hides a second image in its negative space",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Complex,
            base_prompt: "Clever negative space logo for {company}, {prompt}, hidden secondary shape revealed by the gaps, solid {primary_color} silhouette",
            negative_prompts: &["no outlines", "no gradients", "no extra elements"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor],
            industries: &[],
            examples: &["Arrow hidden between two letters", "Bird shape inside a leaf"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "minimal-emblem-dot",
            name: "Dot Emblem",
            description: "Tiny emblem built around a single accent dot",
            version: 1,
            category: TemplateCategory::Minimal,
            complexity: Complexity::Simple,
            base_prompt: "Minimal logo for {company} with a single accent dot, {prompt}, monochrome with {primary_color} accent, {style} balance",
            negative_prompts: &["no busy details", "no multiple accents"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::Style],
            industries: &[],
            examples: &["Period after a short brand name"],
            cost_tier: CostTier::Low,
        },
    ]
}

fn corporate() -> Vec<ProfessionalTemplate> {
    vec![
        ProfessionalTemplate {
            id: "corporate-shield",
            name: "Corporate Shield",
            description: "Shield emblem signalling trust and stability",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Moderate,
            base_prompt: "Professional shield emblem logo for {company}, {prompt}, {industry} sector, strong symmetrical form in {palette}",
            negative_prompts: &["no cartoon elements", "no playful fonts"],
            required_params: CORE,
            optional_params: &[Slot::Industry, Slot::Palette],
            industries: &[Industry::Finance, Industry::RealEstate, Industry::Automotive],
            examples: &["Insurance group crest", "Private bank emblem"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "corporate-monogram",
            name: "Executive Monogram",
            description: "Interlaced initials for established firms",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Moderate,
            base_prompt: "Executive monogram logo for {company}, {prompt}, interlaced serif initials, {primary_color} with {secondary_color} detailing",
            negative_prompts: &["no script fonts", "no bright neon"],
            required_params: CORE,
            optional_params: COLOR_SLOTS,
            industries: &[],
            examples: &["Partners' initials for an accounting firm"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "corporate-global",
            name: "Global Network",
            description: "Globe or network motif for international companies",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Complex,
            base_prompt: "Corporate logo for {company} featuring an abstract globe of connected nodes, {prompt}, {style} execution, {palette}",
            negative_prompts: &["no realistic earth", "no maps", "no flags"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[Industry::Technology, Industry::Finance, Industry::Travel],
            examples: &["Logistics network operator", "International payments platform"],
            cost_tier: CostTier::High,
        },
        ProfessionalTemplate {
            id: "corporate-stacked-bars",
            name: "Growth Bars",
            description: "Ascending bars conveying growth and performance",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Simple,
            base_prompt: "Corporate logo for {company} with ascending bar shapes, {prompt}, confident {primary_color} tones",
            negative_prompts: &["no charts with axes", "no numbers"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor],
            industries: &[Industry::Finance],
            examples: &["Investment advisory brand"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "corporate-consulting",
            name: "Consulting Mark",
            description: "Understated symbol and wordmark lockup for advisory firms",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Moderate,
            base_prompt: "Understated consulting firm logo for {company}, {prompt}, symbol and wordmark lockup, {style} restraint, {primary_color}",
            negative_prompts: &["no illustrations", "no mascots"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::PrimaryColor],
            industries: &[],
            examples: &["Strategy boutique", "HR advisory practice"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "corporate-architecture",
            name: "Structural",
            description: "Architectural forms for construction and property brands",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Moderate,
            base_prompt: "Structural logo for {company} inspired by building outlines, {prompt}, {industry} market, {primary_color} and {secondary_color}",
            negative_prompts: &["no photographs of buildings", "no clutter"],
            required_params: CORE,
            optional_params: &[Slot::Industry, Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[Industry::RealEstate],
            examples: &["Residential developer", "Commercial property manager"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "corporate-tech-badge",
            name: "Enterprise Tech Badge",
            description: "Compact badge for enterprise software vendors",
            version: 1,
            category: TemplateCategory::Corporate,
            complexity: Complexity::Simple,
            base_prompt: "Enterprise software logo badge for {company}, {prompt}, rounded square container, {palette}",
            negative_prompts: &["no circuit clichés", "no binary code"],
            required_params: CORE,
            optional_params: &[Slot::Palette],
            industries: &[Industry::Technology],
            examples: &["B2B analytics suite", "Cloud security vendor"],
            cost_tier: CostTier::Low,
        },
    ]
}

fn creative() -> Vec<ProfessionalTemplate> {
    vec![
        ProfessionalTemplate {
            id: "creative-mascot",
            name: "Mascot",
            description: "Friendly character mascot carrying the brand personality",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Complex,
            base_prompt: "Friendly mascot character logo for {company}, {prompt}, expressive {style} illustration, {palette}",
            negative_prompts: &["no scary expressions", "no realistic anatomy"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[
                Industry::FoodBeverage,
                Industry::Sports,
                Industry::Entertainment,
                Industry::Retail,
            ],
            examples: &["Fox mascot for a delivery app", "Chef character for a bakery"],
            cost_tier: CostTier::High,
        },
        ProfessionalTemplate {
            id: "creative-hand-lettered",
            name: "Hand Lettered",
            description: "Custom brush lettering with artisanal character",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Moderate,
            base_prompt: "Hand-lettered brush script logo for {company}, {prompt}, lively strokes in {primary_color}",
            negative_prompts: &["no digital fonts", "no perfect geometry"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor],
            industries: &[],
            examples: &["Craft brewery", "Handmade jewelry shop"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "creative-gradient-orb",
            name: "Gradient Orb",
            description: "Glowing gradient form for modern digital brands",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Moderate,
            base_prompt: "Vibrant gradient orb logo for {company}, {prompt}, smooth blend from {primary_color} to {secondary_color}",
            negative_prompts: &["no hard edges", "no flat fills"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[Industry::Technology, Industry::Entertainment],
            examples: &["Music streaming startup", "AI assistant product"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "creative-vintage-badge",
            name: "Vintage Badge",
            description: "Retro circular badge with banner and established date",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Complex,
            base_prompt: "Vintage circular badge logo for {company}, {prompt}, ribbon banner and distressed texture, {style} mood, {palette}",
            negative_prompts: &["no modern gradients", "no glossy effects"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[Industry::FoodBeverage, Industry::Fashion, Industry::Automotive],
            examples: &["Barber shop seal", "Motorcycle garage patch"],
            cost_tier: CostTier::High,
        },
        ProfessionalTemplate {
            id: "creative-abstract-flow",
            name: "Abstract Flow",
            description: "Fluid abstract shapes suggesting movement",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Moderate,
            base_prompt: "Abstract flowing logo for {company}, {prompt}, ribbon-like curves in motion, {palette}",
            negative_prompts: &["no literal objects", "no straight lines"],
            required_params: CORE,
            optional_params: &[Slot::Palette],
            industries: &[],
            examples: &["Dance studio", "Wellness retreat"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "creative-pixel",
            name: "Pixel Art",
            description: "Pixel-grid mark with a playful retro-gaming feel",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Simple,
            base_prompt: "Pixel art logo for {company}, {prompt}, crisp square pixels, {primary_color} and {secondary_color}",
            negative_prompts: &["no anti-aliasing", "no smooth curves"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[Industry::Entertainment, Industry::Technology],
            examples: &["Indie game studio", "Retro arcade bar"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "creative-origami",
            name: "Origami Fold",
            description: "Faceted paper-fold construction",
            version: 1,
            category: TemplateCategory::Creative,
            complexity: Complexity::Complex,
            base_prompt: "Origami folded paper logo for {company}, {prompt}, faceted planes with subtle light, {style} craft, {palette}",
            negative_prompts: &["no photographs", "no crumpled paper"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[],
            examples: &["Paper crane for a travel agency", "Folded fox for a kids' brand"],
            cost_tier: CostTier::High,
        },
    ]
}

fn industry_specific() -> Vec<ProfessionalTemplate> {
    vec![
        ProfessionalTemplate {
            id: "tech-startup",
            name: "Tech Startup",
            description: "Forward-looking mark for software and hardware startups",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Moderate,
            base_prompt: "Modern {industry} startup logo for {company}, {prompt}, {style} symbol suggesting innovation, {palette}",
            negative_prompts: &["no light bulbs", "no rocket clichés"],
            required_params: CORE,
            optional_params: STYLE_AND_INDUSTRY,
            industries: &[Industry::Technology],
            examples: &["Developer tools company", "IoT hardware maker"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "healthcare-care",
            name: "Healthcare Care",
            description: "Calm, trustworthy mark for clinics and health services",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Moderate,
            base_prompt: "Caring healthcare logo for {company}, {prompt}, gentle rounded forms suggesting protection, {primary_color} and {secondary_color}",
            negative_prompts: &["no blood", "no syringes", "no red cross symbol"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[Industry::Healthcare],
            examples: &["Family clinic", "Telehealth service"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "finance-trust",
            name: "Financial Trust",
            description: "Stable, conservative mark for financial institutions",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Simple,
            base_prompt: "Trustworthy financial services logo for {company}, {prompt}, solid balanced symbol, {palette}",
            negative_prompts: &["no dollar signs", "no coins", "no piggy banks"],
            required_params: CORE,
            optional_params: &[Slot::Palette],
            industries: &[Industry::Finance],
            examples: &["Credit union", "Wealth management firm"],
            cost_tier: CostTier::Low,
        },
        ProfessionalTemplate {
            id: "education-growth",
            name: "Learning Growth",
            description: "Books, paths and growth motifs for education brands",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Moderate,
            base_prompt: "Inspiring education logo for {company}, {prompt}, open book or growing path motif, {style} and approachable, {palette}",
            negative_prompts: &["no graduation cap clichés", "no apples"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[Industry::Education, Industry::Nonprofit],
            examples: &["Online tutoring platform", "Community literacy charity"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "food-artisan",
            name: "Artisan Food",
            description: "Warm, appetising marks for restaurants and food makers",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Moderate,
            base_prompt: "Appetising artisan food logo for {company}, {prompt}, warm inviting illustration, {primary_color} with {secondary_color} accents",
            negative_prompts: &["no photographs of food", "no cutlery clichés"],
            required_params: CORE,
            optional_params: &[Slot::PrimaryColor, Slot::SecondaryColor],
            industries: &[Industry::FoodBeverage, Industry::Retail],
            examples: &["Sourdough bakery", "Farm-to-table bistro"],
            cost_tier: CostTier::Medium,
        },
        ProfessionalTemplate {
            id: "sports-dynamic",
            name: "Dynamic Sports",
            description: "Energetic, angular mark for teams and fitness brands",
            version: 1,
            category: TemplateCategory::IndustrySpecific,
            complexity: Complexity::Complex,
            base_prompt: "Dynamic sports logo for {company}, {prompt}, aggressive angles and motion lines, {style} energy, {palette}",
            negative_prompts: &["no static poses", "no thin delicate lines"],
            required_params: CORE,
            optional_params: &[Slot::Style, Slot::Palette],
            industries: &[Industry::Sports, Industry::Fashion],
            examples: &["Amateur football club", "Fitness apparel label"],
            cost_tier: CostTier::High,
        },
    ]
}

/// Negative phrases shared by free-form prompts.
pub fn default_negative_prompts() -> &'static [&'static str] {
    BASE_NEGATIVES
}
