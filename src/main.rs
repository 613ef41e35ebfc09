//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::index::PostFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Load, search and serve markdown blog posts", long_about = None)]
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
    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category of the new post
        #[arg(long)]
        category: String,

        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List site information
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Search posts by text, category and tags
    Search {
        /// Text to look for in titles, excerpts, bodies and tags
        #[arg(default_value = "")]
        query: String,

        /// Only posts in this category
        #[arg(long)]
        category: Option<String>,

        /// Only posts carrying any of these tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Show a post with its table of contents and related posts
    Show {
        slug: String,

        /// Print the rendered HTML body instead
        #[arg(long)]
        html: bool,
    },

    /// Start the JSON query server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Reload posts when source files change
        #[arg(short, long)]
        watch: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New {
            title,
            category,
            tags,
        } => {
            let site = folio::Folio::new(&base_dir)?;
            let path = site.new_post(&title, &category, &tags)?;
            println!("Created: {}", path.display());
        }

        Commands::List { r#type } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type).await?;
        }

        Commands::Search {
            query,
            category,
            tags,
        } => {
            let site = folio::Folio::new(&base_dir)?;
            let filter = PostFilter {
                query: Some(query),
                category,
                tags,
            };
            folio::commands::search::run(&site, &filter).await?;
        }

        Commands::Show { slug, html } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::show::run(&site, &slug, html).await?;
        }

        Commands::Server { port, ip, watch } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, &ip, port, watch).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
