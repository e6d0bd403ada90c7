//! Command-line front end for postcraft.

use anyhow::{bail, Context, Result};
use clap::Parser;
use postcraft::config::{ApiKey, PostcraftConfig};
use postcraft::context::RunContext;
use postcraft::core::StageName;
use postcraft::errors::ConfigError;
use postcraft::observability::{init_tracing, LogFormat};
use postcraft::pipeline::PostBundle;
use postcraft::session::PostSession;
use postcraft::text::markdown_to_plain_text;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "postcraft", version)]
#[command(about = "Write a social-media post and image about a topic", long_about = None)]
struct Cli {
    /// Topic of the post
    topic: String,

    /// API key for the generation service
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Where to save the generated image
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the image in memory only
    #[arg(long, conflicts_with = "output")]
    no_save: bool,

    /// Per-stage timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Print the final post as plain text without Markdown
    #[arg(long, conflicts_with = "json")]
    plain: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let mut config = PostcraftConfig::from_env()?;
    if let Some(seconds) = cli.timeout {
        if !(seconds.is_finite() && seconds > 0.0) {
            bail!("--timeout must be a positive number of seconds");
        }
        config = config.with_stage_timeout(seconds);
    }
    if cli.no_save {
        config = config.with_image_output_path(None);
    } else if let Some(path) = cli.output.clone() {
        config = config.with_image_output_path(Some(path));
    }

    let key = match ApiKey::resolve(cli.api_key.as_deref(), |var| std::env::var(var).ok()) {
        Ok(key) => key,
        Err(ConfigError::MissingApiKey) => prompt_for_key()?,
        Err(err) => return Err(err.into()),
    };

    let session = PostSession::connect(&config, key).await?;

    let progress = |stage: Option<StageName>, percent: u8| match stage {
        Some(stage) => eprintln!("[{percent:>3}%] {}", stage.activity()),
        None => eprintln!("[{percent:>3}%] Done"),
    };
    let run = session.generate(&cli.topic, &progress).await?;

    if cli.json {
        let bundle = PostBundle::from_run(&run).context("run finished without all outputs")?;
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else if cli.plain {
        println!("{}", markdown_to_plain_text(run.final_text().unwrap_or_default()));
    } else {
        print_sections(&run);
    }
    Ok(())
}

fn prompt_for_key() -> Result<ApiKey> {
    if !io::stdin().is_terminal() {
        return Err(ConfigError::MissingApiKey.into());
    }
    eprint!("API key: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(ApiKey::new(line)?)
}

fn print_sections(run: &RunContext) {
    let section = |title: &str, body: Option<&str>| {
        println!("== {title} ==");
        println!("{}\n", body.unwrap_or_default().trim_end());
    };

    section("Found items", run.found_items());
    section("Post plan", run.outline());
    section("Draft", run.draft());
    section("Review", run.review());
    section("Final post", run.final_text());
    section("Image description", run.image_description());

    println!("== Image ==");
    match run.image() {
        Some(image) => match &image.path {
            Some(path) => println!("Saved {} bytes to {}", image.byte_count(), path.display()),
            None => println!("Generated {} bytes (not saved)", image.byte_count()),
        },
        None => println!("No image was generated."),
    }
}
