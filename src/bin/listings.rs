use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use listings::{ListingPatch, NewListing, RecordStore, SortSpec, StoreConfig};

#[derive(Parser)]
#[command(name = "listings", version, about = "Marketplace listing store")]
struct Cli {
    /// Directory holding items.csv and users.csv
    #[arg(long, global = true, conflicts_with = "config")]
    data_dir: Option<PathBuf>,

    /// JSON store configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a username to the registry
    Register { username: String },
    /// List a new product and print its id
    Create {
        username: String,
        title: String,
        description: String,
        price: u64,
        category: String,
    },
    /// Show one listing
    Get { username: String, id: u64 },
    /// Replace some fields of a listing
    Update {
        username: String,
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<u64>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a listing
    Delete { username: String, id: u64 },
    /// Listings of a user in one category, optionally sorted
    Category {
        username: String,
        category: String,
        /// price | time
        #[arg(requires = "sort_dir")]
        sort_key: Option<String>,
        /// asc | desc
        sort_dir: Option<String>,
    },
    /// The category a user lists most in
    TopCategory { username: String },
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match (cli.data_dir, cli.config) {
        (Some(dir), _) => StoreConfig::in_dir(dir),
        (None, Some(path)) => StoreConfig::from_json_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        (None, None) => StoreConfig::default(),
    };
    log::debug!("using listings file {}", config.listings_path.display());
    let store = RecordStore::open(config);
    let mut out = io::BufWriter::new(io::stdout());

    match cli.command {
        Commands::Register { username } => {
            store.register(&username)?;
            writeln!(out, "Success")?;
        }
        Commands::Create {
            username,
            title,
            description,
            price,
            category,
        } => {
            let listing = store.create(NewListing {
                owner: username,
                title,
                description,
                price,
                category,
            })?;
            writeln!(out, "{}", listing.id)?;
        }
        Commands::Get { username, id } => {
            let listing = store.get(&username, id)?;
            writeln!(
                out,
                "{}|{}|{}|{}|{}|{}",
                listing.title,
                listing.description,
                listing.price,
                listing.created_at,
                listing.category,
                listing.owner
            )?;
        }
        Commands::Update {
            username,
            id,
            title,
            description,
            price,
            category,
        } => {
            let patch = ListingPatch {
                title,
                description,
                price,
                category,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update for listing {id}");
            }
            store.update(&username, id, &patch)?;
            writeln!(out, "Item updated")?;
        }
        Commands::Delete { username, id } => {
            store.delete(&username, id)?;
            writeln!(out, "Success")?;
        }
        Commands::Category {
            username,
            category,
            sort_key,
            sort_dir,
        } => {
            let sort = match (sort_key, sort_dir) {
                (Some(key), Some(dir)) => Some(SortSpec::parse(&key, &dir)?),
                _ => None,
            };
            for projection in store.by_category(&username, &category, sort)? {
                writeln!(out, "{projection}")?;
            }
        }
        Commands::TopCategory { username } => {
            writeln!(out, "{}", store.top_category(&username)?)?;
        }
    }
    out.flush()?;
    Ok(())
}
