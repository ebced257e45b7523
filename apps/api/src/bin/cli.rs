//! `newsmeme "Your news headline"` — runs the meme pipeline once and prints the result.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use newsmeme::config::Config;
use newsmeme::llm_client::LlmClient;
use newsmeme::meme::generator::{generate_meme, MemeScript};
use newsmeme::meme::handlers::USAGE_HINT;
use newsmeme::meme::templates::TemplateRegistry;
use newsmeme::meme::url::MemegenUrlBuilder;

#[derive(Debug, Parser)]
#[command(
    name = "newsmeme",
    about = "Turn a news headline into a meme image URL",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Headline words, joined with spaces
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    headline: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(headline) = headline_from_args(&cli.headline) else {
        print!("{}", usage());
        return Ok(());
    };

    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries only the result.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let llm = LlmClient::with_base_url(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    )?;
    let registry = TemplateRegistry::builtin();
    let urls = MemegenUrlBuilder::new(&config.memegen_base_url);

    let mut rng = StdRng::from_entropy();
    let script = generate_meme(&llm, &registry, &headline, &mut rng).await?;

    print!("{}", render_report(&script, &urls.script_url(&script)));
    Ok(())
}

/// Joins the positional words; `None` when nothing but whitespace was given.
fn headline_from_args(args: &[String]) -> Option<String> {
    let headline = args.join(" ").trim().to_string();
    (!headline.is_empty()).then_some(headline)
}

fn render_report(script: &MemeScript, url: &str) -> String {
    format!(
        "Template: {}\nLines: {:?}\nURL: {}\n",
        script.template, script.lines, url
    )
}

fn usage() -> String {
    format!(
        "Usage:\n  API: newsmeme-api  (then GET {USAGE_HINT})\n  CLI: newsmeme \"Your news headline\"\n"
    )
}
