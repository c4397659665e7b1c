//! `ringplan` binary.
//!
//! Reads `ringplan.toml` (or the path given with `--config`), opens the
//! SQLite store, and compiles ring groups into their dialplans.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use ringplan_cli::{CliConfig, seed::SeedFile};
use ringplan_core::store::PbxStore;
use ringplan_dialplan::RingGroupCompiler;
use ringplan_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Ring group dialplan compiler")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ringplan.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Compile one ring group and print its dialplan id.
  Compile {
    #[arg(long)]
    ring_group: Uuid,
  },
  /// Compile every ring group in a domain.
  CompileDomain {
    #[arg(long)]
    domain: Uuid,
  },
  /// Print a stored dialplan's XML.
  Show {
    #[arg(long)]
    dialplan: Uuid,
  },
  /// Print the call-time bridge command for a ring group, with follow-me
  /// chains expanded.
  Bridge {
    #[arg(long)]
    ring_group: Uuid,
  },
  /// Load a JSON fixture into the store.
  Seed {
    #[arg(long)]
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let cfg = CliConfig::load(&cli.config).context("failed to read config file")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let store = Arc::new(store);
  let compiler = RingGroupCompiler::new(Arc::clone(&store), cfg.compiler_options());

  match cli.command {
    Command::Compile { ring_group } => {
      match compiler
        .compile_by_id(ring_group)
        .await
        .with_context(|| format!("failed to compile ring group {ring_group}"))?
      {
        Some(dialplan_id) => println!("{dialplan_id}"),
        None => bail!("ring group {ring_group} not found"),
      }
    }
    Command::CompileDomain { domain } => {
      let compiled = compiler
        .compile_domain(domain)
        .await
        .with_context(|| format!("failed to compile domain {domain}"))?;
      for (ring_group_id, dialplan_id) in compiled {
        println!("{ring_group_id} {dialplan_id}");
      }
    }
    Command::Show { dialplan } => {
      let Some(dp) = store
        .get_dialplan(dialplan)
        .await
        .context("failed to read dialplan")?
      else {
        bail!("dialplan {dialplan} not found");
      };
      println!("{}", dp.xml);
    }
    Command::Bridge { ring_group } => {
      let Some(rg) = store
        .get_ring_group(ring_group)
        .await
        .context("failed to read ring group")?
      else {
        bail!("ring group {ring_group} not found");
      };
      let command = compiler
        .bridge_command(&rg)
        .await
        .context("failed to build bridge command")?;
      println!("{command}");
    }
    Command::Seed { file } => {
      let src = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {file:?}"))?;
      let seed = SeedFile::from_json(&src)
        .with_context(|| format!("failed to parse {file:?}"))?;
      seed.apply(&store).await.context("failed to seed store")?;
    }
  }

  Ok(())
}
