use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webby_reader::api::ApiError;
use webby_reader::{ApiClient, App, BookmarkFile, Config, Document};

#[derive(Parser)]
#[command(name = "webby-reader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server URL (remembered for later runs)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token for this run only
    #[arg(long, env = "WEBBY_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the reader on a book
    Read {
        /// Book id on the server
        book_id: String,
    },
    /// List books in the server library
    List {
        /// Only show books matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print a book's table of contents
    Toc {
        /// Book id on the server
        book_id: String,
    },
    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.url {
        config.server_url = url;
        config.save()?;
    }
    let token = cli.token.or_else(|| config.token.clone());
    let client = ApiClient::new(config.base_url(), token)
        .with_context(|| format!("Cannot use server {}", config.server_url))?;

    match cli.command {
        Commands::Read { book_id } => {
            let title = match client.get_book(&book_id).await {
                Ok(book) => book.title,
                Err(e) if e.requires_reauth() => return Err(login_error(e)),
                Err(e) => {
                    warn!("Failed to fetch book details: {}", e);
                    book_id.clone()
                }
            };
            let bookmarks = BookmarkFile::open()?;
            let app = App::new(config, client, bookmarks, Document::new(book_id, title))?;
            app.run().await?;
        }
        Commands::List { search } => {
            let books = client.list_books(search.as_deref()).await.map_err(login_error)?;
            if books.is_empty() {
                println!("No books found");
            }
            for book in books {
                if book.author.is_empty() {
                    println!("{}  {}", book.id, book.title);
                } else {
                    println!("{}  {} by {}", book.id, book.title, book.author);
                }
            }
        }
        Commands::Toc { book_id } => {
            let chapters = client.get_toc(&book_id).await.map_err(login_error)?;
            for chapter in chapters {
                println!("{:>4}. {}", chapter.index + 1, chapter.title);
            }
        }
        Commands::Config => {
            println!("Config file:  {}", Config::config_path()?.display());
            println!("Data dir:     {}", Config::data_dir()?.display());
            println!("Bookmarks:    {}", BookmarkFile::open()?.path().display());
            println!("Server:       {}", config.server_url);
            match (&config.username, config.is_authenticated()) {
                (Some(user), true) => println!("Logged in:    {}", user),
                (None, true) => println!("Logged in:    yes"),
                (_, false) => println!("Logged in:    no"),
            }
            println!("Theme:        {}", config.theme);
            println!("Text scale:   {:.0}%", config.text_scale() * 100.0);
        }
    }

    Ok(())
}

/// Point the user at the token options when the server refuses them
fn login_error(err: ApiError) -> anyhow::Error {
    if err.requires_reauth() {
        anyhow!("{err}\nPass --token or set WEBBY_TOKEN to log in")
    } else {
        err.into()
    }
}

/// Log to a file in the data directory; the terminal belongs to the reader
fn init_logging() {
    let log_file = Config::data_dir().ok().and_then(|dir| {
        std::fs::create_dir_all(&dir).ok()?;
        OpenOptions::new().create(true).append(true).open(dir.join("webby-reader.log")).ok()
    });

    let (writer, ansi) = match log_file {
        Some(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webby_reader=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .init();
}
