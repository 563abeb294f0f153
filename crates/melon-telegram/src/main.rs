//! Melon Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx cargo run -p melon-telegram
//! ```

use clap::Parser;
use melon_core::{config, Settings};
use melon_telegram::MelonBot;
use tracing_subscriber::EnvFilter;

/// Melon catalog bot - search, details and scheduled update digests
#[derive(Parser, Debug)]
#[command(name = "melon-bot")]
#[command(about = "Telegram bot for the Melon media catalog")]
struct Args {
    /// Override the catalog backend URL
    #[arg(long, env = "MELON_BASE_URL")]
    base_url: Option<String>,

    /// Disable scheduled pushes regardless of configuration
    #[arg(long)]
    no_push: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Env files first so clap sees MELON_BASE_URL from them too.
    let loaded = config::load_env_files();

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "melon_telegram=info,melon_runtime=info,melon_core=info,teloxide=warn",
        1 => "melon_telegram=debug,melon_runtime=debug,melon_core=debug,teloxide=info",
        2 => "melon_telegram=trace,melon_runtime=trace,melon_core=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    for path in &loaded {
        tracing::debug!(path = %path.display(), "Loaded env file");
    }

    let mut settings = Settings::from_env()?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if args.no_push {
        settings.push.enabled = false;
    }

    let bot = MelonBot::new(settings.clone())?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n🍈 Melon Catalog Bot");
            println!("   Bot: @{}", username);
            println!("   Catalog: {}", settings.base_url);
            println!(
                "   Push: {}",
                if settings.push.is_active() { "scheduled" } else { "off" }
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n   Press Ctrl+C to stop\n");

    bot.run().await?;

    Ok(())
}
