//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::content::Category;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Kris")]
#[command(version)]
#[command(about = "A portfolio site generator for project case studies and journey posts", long_about = None)]
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
    /// Initialize a new portfolio site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new project or journey post
    New {
        /// Category of the new item (projects, journey)
        category: Category,

        /// Title of the new item
        title: String,
    },

    /// List content, newest first
    List {
        /// Category to list (defaults to both)
        category: Option<Category>,
    },

    /// Print one item's front matter and body
    Show {
        /// Category of the item (projects, journey)
        category: Category,

        /// Slug of the item
        slug: String,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug { "folio=debug,info" } else { "folio=info" };

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
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized portfolio site in {:?}", target_dir);
        }

        Commands::New { category, title } => {
            let site = folio::Folio::new(&base_dir)?;
            let path = folio::commands::new::create_item(&site, category, &title)?;
            println!("Created: {:?}", path);
        }

        Commands::List { category } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&site, category)?;
        }

        Commands::Show { category, slug } => {
            let site = folio::Folio::new(&base_dir)?;
            folio::commands::show::run(&site, category, &slug)?;
        }

        Commands::Generate { watch } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Generating static files...");

            site.generate()?;
            println!("Generated successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                folio::commands::generate::watch(&site).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = folio::Folio::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
