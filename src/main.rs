//! CLI entry point for postmill

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postmill::commands::new::NewPost;
use postmill::Postmill;

#[derive(Parser)]
#[command(name = "postmill")]
#[command(version)]
#[command(about = "Turn markdown documents into sanitized, listable blog posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts or tags
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Page of the post listing
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show a single post
    Show {
        /// Slug of the post
        slug: String,

        /// Print the full post as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Publication date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Render one document to sanitized HTML
    Preview {
        /// Path to the markdown file
        file: PathBuf,
    },

    /// Print the syntax highlighting stylesheet
    Css,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postmill=debug,info"
    } else {
        "postmill=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List { r#type, page } => {
            let site = Postmill::new(&base_dir)?;
            postmill::commands::list::run(&site, &r#type, page).await?;
        }

        Commands::Show { slug, json } => {
            let site = Postmill::new(&base_dir)?;
            postmill::commands::show::run(&site, &slug, json).await?;
        }

        Commands::New {
            title,
            tags,
            description,
            date,
        } => {
            let site = Postmill::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            let options = NewPost {
                title: &title,
                tags: tags.as_deref(),
                description: description.as_deref(),
                date,
            };
            postmill::commands::new::run(&site, &options)?;
        }

        Commands::Preview { file } => {
            let site = Postmill::new(&base_dir)?;
            let file = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            postmill::commands::preview::run(&site, &file)?;
        }

        Commands::Css => {
            let site = Postmill::new(&base_dir)?;
            postmill::commands::css::run(&site)?;
        }

        Commands::Version => {
            println!("postmill version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
