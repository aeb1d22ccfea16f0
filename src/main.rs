use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logo_forge::{
    batch::{self, BatchJob, BatchRunner},
    config::AppConfig,
    downloader::Downloader,
    generator::{LogoGenerator, LogoService},
    models::{
        GenerationOptions, GenerationRequest, Industry, LogoSize, Quality, Style, split_colors,
    },
    openai::OpenAiImageClient,
    templates::{PromptEngine, TemplateCategory, TemplateLibrary},
};

#[derive(Parser, Debug)]
#[command(name = "logo-forge")]
#[command(about = "Generate logos from plain-language descriptions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a single logo
    Generate(GenerateArgs),

    /// Generate logos for every row of a JSON or CSV file
    Batch(BatchArgs),

    /// Browse the built-in prompt templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Inspect or prune the result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Args, Debug)]
struct PromptArgs {
    /// Template id, see `templates list`
    #[arg(short, long)]
    template: Option<String>,

    /// Extra things to avoid, e.g. --negative "no gradients"
    #[arg(long = "negative")]
    negatives: Vec<String>,

    /// Elements the logo should incorporate
    #[arg(long = "element")]
    elements: Vec<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(short, long)]
    company: String,

    /// What the logo should convey
    #[arg(short, long, alias = "description")]
    prompt: String,

    #[arg(short, long)]
    style: Option<Style>,

    #[arg(short, long)]
    industry: Option<Industry>,

    /// Comma or semicolon separated color list
    #[arg(long)]
    colors: Option<String>,

    /// 1024x1024, 1792x1024 or 1024x1792
    #[arg(long)]
    size: Option<LogoSize>,

    #[arg(short, long)]
    quality: Option<Quality>,

    #[command(flatten)]
    prompt_args: PromptArgs,

    /// Output directory, defaults to LOGO_OUTPUT_DIR
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    iteration: Option<u32>,

    /// Print the image URL without saving the file
    #[arg(long)]
    no_download: bool,

    /// Show the final prompt without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON array or CSV file with company and prompt columns
    file: PathBuf,

    /// Parallel generations, defaults to LOGO_CONCURRENCY
    #[arg(long)]
    concurrency: Option<usize>,

    #[command(flatten)]
    prompt_args: PromptArgs,

    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    iteration: Option<u32>,

    /// Recorded with the iteration in iterations.json
    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    quiet: bool,

    /// Show the final prompts without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    List {
        #[arg(long)]
        category: Option<TemplateCategory>,

        #[arg(long)]
        industry: Option<Industry>,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    Stats,
    Clear,
    Cleanup,
}

impl PromptArgs {
    fn options(&self) -> GenerationOptions {
        GenerationOptions {
            template_id: self.template.clone(),
            negative_prompts: self.negatives.clone(),
            custom_elements: self.elements.clone(),
            ..Default::default()
        }
    }
}

fn build_generator(config: &AppConfig) -> Result<LogoGenerator<OpenAiImageClient>> {
    let client = config.image_client()?;
    let generator = LogoGenerator::new(client).with_retry(config.retry_policy());
    Ok(match config.cache_store() {
        Some(cache) => generator.with_cache(cache),
        None => generator,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(&config, args).await,
        Commands::Batch(args) => run_batch(&config, args).await,
        Commands::Templates { command } => templates(command),
        Commands::Cache { command } => cache(&config, command).await,
    }
}

async fn generate(config: &AppConfig, args: GenerateArgs) -> Result<()> {
    let request = GenerationRequest {
        company: args.company,
        prompt: args.prompt,
        style: args.style,
        industry: args.industry,
        colors: args.colors.as_deref().map(split_colors).unwrap_or_default(),
        size: args.size,
        quality: args.quality,
    };
    let options = args.prompt_args.options();

    if args.dry_run {
        println!("{}", PromptEngine::default().preview(&request, &options)?);
        return Ok(());
    }

    let generator = build_generator(config)?;
    let mut result = generator.generate(&request, &options).await?;
    if !args.no_download {
        let output = args.output.unwrap_or_else(|| config.output_dir.clone());
        let path = Downloader::new()
            .download(&result, &output, args.iteration)
            .await?;
        result.local_path = Some(path);
    }

    println!("id:     {}", result.metadata.id);
    if result.cached {
        println!("cost:   $0.00 (cached)");
    } else {
        println!("cost:   ${:.2}", result.cost());
    }
    println!("prompt: {}", result.metadata.final_prompt);
    match &result.local_path {
        Some(path) => println!("saved:  {}", path.display()),
        None => println!("url:    {}", result.url),
    }
    Ok(())
}

async fn run_batch(config: &AppConfig, args: BatchArgs) -> Result<()> {
    let requests = batch::load_batch_file(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    if requests.is_empty() {
        bail!("{} contains no usable rows", args.file.display());
    }

    let mut job = BatchJob::new(requests)
        .with_options(args.prompt_args.options())
        .with_concurrency(args.concurrency.unwrap_or(config.concurrency))
        .with_output_dir(args.output.unwrap_or_else(|| config.output_dir.clone()))
        .quiet(args.quiet);
    job.iteration = args.iteration;
    job.description = args.description;

    if args.dry_run {
        for (index, (request, prompt)) in batch::preview(&PromptEngine::default(), &job)
            .into_iter()
            .enumerate()
        {
            match prompt {
                Ok(prompt) => println!("{}. {}: {}", index + 1, request.company, prompt),
                Err(err) => println!("{}. {}: error: {}", index + 1, request.company, err),
            }
        }
        return Ok(());
    }

    let runner = BatchRunner::new(build_generator(config)?);
    let outcome = runner.run(&job).await;
    for failure in &outcome.failed {
        println!("failed: {}: {}", failure.request.company, failure.error);
    }
    println!(
        "{}/{} succeeded ({} cached), total cost ${:.2}, {:.1}s",
        outcome.stats.successful,
        outcome.stats.total,
        outcome.stats.cached,
        outcome.stats.total_cost,
        outcome.stats.duration.as_secs_f64()
    );
    if let Some(path) = &outcome.manifest_path {
        println!("manifest: {}", path.display());
    }
    if outcome.stats.successful == 0 {
        bail!("every request in the batch failed");
    }
    Ok(())
}

fn templates(command: TemplateCommands) -> Result<()> {
    let library = TemplateLibrary::builtin();
    match command {
        TemplateCommands::List { category, industry } => {
            let selected = library.all().iter().filter(|template| {
                category.is_none_or(|category| template.category == category)
                    && industry.is_none_or(|industry| template.fits_industry(industry))
            });
            for template in selected {
                println!(
                    "{:<24} {:<18} {}",
                    template.id,
                    template.category.as_str(),
                    template.description
                );
            }
        }
        TemplateCommands::Show { id } => {
            let Some(template) = library.get(&id) else {
                bail!("no template named '{id}', see `logo-forge templates list`");
            };
            println!("{}", serde_json::to_string_pretty(template)?);
        }
    }
    Ok(())
}

async fn cache(config: &AppConfig, command: CacheCommands) -> Result<()> {
    let store = logo_forge::cache::CacheStore::new(config.cache_config());
    match command {
        CacheCommands::Stats => {
            let stats = store.stats().await?;
            println!("dir:     {}", store.dir().display());
            println!("entries: {}", stats.file_entries);
            println!("size:    {:.2} MB", stats.total_size_bytes as f64 / (1024.0 * 1024.0));
        }
        CacheCommands::Clear => {
            let removed = store.clear().await?;
            println!("removed {removed} cached results");
        }
        CacheCommands::Cleanup => {
            let report = store.cleanup().await?;
            println!(
                "removed {} expired, evicted {}, {} bytes remain",
                report.expired_removed, report.evicted, report.remaining_bytes
            );
        }
    }
    Ok(())
}
