use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use yappr_core::{
    hash_positions,
    identifier::decode_base58,
    platform::decode_block_documents,
    store::{load_or_empty, save},
    BlockStatusCache, BlockStatusSeeder, BloomFilter, DocumentBlockLookup, FileFilterStore,
    FilterStore, Identifier, StoredFilter, YapprConfig,
};

#[derive(Parser)]
#[command(name = "yappr", about = "Yappr block-filter tooling")]
struct Cli {
    /// JSON config (cache TTL, seeder batching)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    Init {
        #[arg(long)]
        dir: PathBuf,
    },

    /// Add base58 identifiers to a filter (created if missing)
    Add {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long = "id", num_args = 1.., value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },

    Check {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long = "id", num_args = 1.., value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },

    /// Union several stored filters into a new key
    Merge {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        into: String,
        #[arg(long, num_args = 1.., value_delimiter = ',', required = true)]
        from: Vec<String>,
    },

    Info {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        key: String,
    },

    Export {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        key: String,
    },

    Import {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        key: String,
        #[arg(long)]
        base64: String,
        #[arg(long, default_value_t = 0)]
        items: u64,
    },

    /// Print the bit positions an identifier maps to
    Positions {
        #[arg(long)]
        id: String,
    },

    /// Resolve block status for candidates against platform block documents
    Seed {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        viewer: Identifier,
        /// JSON file with block documents (array or {"documents": [...]})
        #[arg(long)]
        docs: PathBuf,
        /// Stored filter used as pre-check
        #[arg(long)]
        key: Option<String>,
        #[arg(long = "id", num_args = 1.., value_delimiter = ',', required = true)]
        ids: Vec<Identifier>,
    },
}

fn open_store(dir: &Path) -> Result<FileFilterStore> {
    FileFilterStore::open(dir).with_context(|| format!("open store {}", dir.display()))
}

fn load_existing(store: &FileFilterStore, key: &str) -> Result<BloomFilter> {
    let rec = store
        .get(key)?
        .ok_or_else(|| anyhow!("no filter stored under {key:?}"))?;
    Ok(rec.into_filter()?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(p) => YapprConfig::load(p).with_context(|| format!("load config {}", p.display()))?,
        None => YapprConfig::default(),
    };

    match cli.cmd {
        Cmd::Init { dir } => {
            open_store(&dir)?;
            println!("init: {}", dir.display());
        }
        Cmd::Add { dir, key, ids } => {
            let mut store = open_store(&dir)?;
            let mut f = load_or_empty(&store, &key)?;
            for id in &ids {
                f.add(id).with_context(|| format!("add {id}"))?;
            }
            save(&mut store, &key, &f)?;
            info!(key = %key, added = ids.len(), "filter updated");
            println!("added {} -> {key} (items={})", ids.len(), f.item_count());
        }
        Cmd::Check { dir, key, ids } => {
            let store = open_store(&dir)?;
            let f = load_or_empty(&store, &key)?;
            for id in &ids {
                let hit = f.might_contain(id)?;
                println!("{id} {}", if hit { "maybe" } else { "absent" });
            }
        }
        Cmd::Merge { dir, into, from } => {
            let mut store = open_store(&dir)?;
            let mut parts = Vec::with_capacity(from.len());
            for k in &from {
                parts.push(load_existing(&store, k)?);
            }
            let merged = BloomFilter::merge_all(&parts);
            save(&mut store, &into, &merged)?;
            println!("merged {} filters -> {into} (items={})", parts.len(), merged.item_count());
        }
        Cmd::Info { dir, key } => {
            let store = open_store(&dir)?;
            let f = load_existing(&store, &key)?;
            let digest = Sha256::digest(f.serialize());
            println!("key      : {key}");
            println!("bytes    : {}", BloomFilter::SIZE_BYTES);
            println!("items    : {}", f.item_count());
            println!("empty    : {}", f.is_empty());
            println!("fill     : {:.4}", f.fill_ratio());
            println!("est. fpr : {:.6}", f.estimate_false_positive_rate());
            println!("sha256   : {}", hex::encode(digest));
        }
        Cmd::Export { dir, key } => {
            let store = open_store(&dir)?;
            let rec = store
                .get(&key)?
                .ok_or_else(|| anyhow!("no filter stored under {key:?}"))?;
            println!("{}", rec.encoded);
        }
        Cmd::Import { dir, key, base64, items } => {
            let mut store = open_store(&dir)?;
            let f = yappr_core::from_base64(&base64, items).context("decode base64 filter")?;
            store.put(&key, &StoredFilter::from_filter(&f))?;
            println!("imported -> {key} (items={items})");
        }
        Cmd::Positions { id } => {
            let bytes = decode_base58(&id)?;
            let pos: Vec<String> = hash_positions(&bytes).iter().map(u32::to_string).collect();
            println!("{}", pos.join(" "));
        }
        Cmd::Seed { dir, viewer, docs, key, ids } => {
            let raw = fs::read_to_string(&docs)
                .with_context(|| format!("read documents {}", docs.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let lookup = DocumentBlockLookup::new(decode_block_documents(&value)?);

            let filter = match &key {
                // a missing pre-check filter must not read as "nothing blocked"
                Some(k) => Some(load_existing(&open_store(&dir)?, k)?),
                None => None,
            };
            let seeder = BlockStatusSeeder::new(
                lookup,
                BlockStatusCache::handle(&config.cache),
                config.seeder.clone(),
            );
            let report = seeder.resolve(&viewer, filter.as_ref(), &ids)?;
            info!(?report, "seeded");
            for id in &ids {
                let status = match seeder.status(&viewer, id) {
                    Some(true) => "blocked",
                    Some(false) => "clear",
                    None => "unknown",
                };
                println!("{id} {status}");
            }
        }
    }
    Ok(())
}
