//! Inspect and maintain persisted registration state on disk.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use registration::RegistrationSettings;
use registration::domain::ports::KeyValueStore;
use registration::domain::{
    BankDirectory, BranchCodeResolver, DEFAULT_DRAFT_DEBOUNCE, DraftSnapshotCache, RegistrationRole,
    StorageKey,
};
use registration::outbound::FileStore;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `registration-store` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "registration-store",
    about = "Inspect and clear persisted registration drafts, overrides and accounts",
    version
)]
struct CliArgs {
    /// Store directory. Falls back to `ADDEX_STORAGE_DIR`, then `.addex-storage`.
    #[arg(long = "storage-dir", value_name = "path")]
    storage_dir: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List the bank directory with default branch codes.
    Banks,
    /// Print the branch code assigned when `bank` is selected.
    BranchCode {
        /// Exact bank name.
        bank: String,
    },
    /// Remember `code` as the branch code for `bank`.
    SetOverride {
        /// Exact bank name.
        bank: String,
        /// Branch code to assign.
        code: String,
    },
    /// Forget the stored branch code override for `bank`.
    ClearOverride {
        /// Exact bank name.
        bank: String,
    },
    /// Print the saved draft for a role.
    ShowDraft {
        /// `customer`, `vendor` or `admin`.
        role: RegistrationRole,
    },
    /// Delete the saved draft for a role.
    ClearDraft {
        /// `customer`, `vendor` or `admin`.
        role: RegistrationRole,
    },
    /// Print the finalized account record for a role.
    ShowAccount {
        /// `customer`, `vendor` or `admin`.
        role: RegistrationRole,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let root = storage_root(&args)?;
    let store = Arc::new(FileStore::open(&root).map_err(|error| {
        io::Error::other(format!("open store directory '{root}': {error}"))
    })?);
    info!(%root, "opened registration store");

    let mut stdout = io::stdout().lock();
    run(&args.command, store, &mut stdout)
}

/// Resolve the store directory: `--storage-dir`, then the loaded settings.
fn storage_root(args: &CliArgs) -> io::Result<Utf8PathBuf> {
    if let Some(dir) = &args.storage_dir {
        return Ok(dir.clone());
    }
    let settings = RegistrationSettings::load_from_iter([OsString::from("registration-store")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    Ok(settings.storage_dir())
}

fn run(command: &Command, store: Arc<dyn KeyValueStore>, out: &mut impl Write) -> io::Result<()> {
    match command {
        Command::Banks => list_banks(out),
        Command::BranchCode { bank } => {
            let code = BranchCodeResolver::built_in(store).resolve_branch_code(bank);
            if code.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("bank '{bank}' is not in the bank directory"),
                ));
            }
            writeln!(out, "{code}")
        }
        Command::SetOverride { bank, code } => {
            BranchCodeResolver::built_in(store)
                .record_override(bank, code)
                .map_err(io::Error::other)?;
            writeln!(out, "override recorded for {bank}")
        }
        Command::ClearOverride { bank } => {
            BranchCodeResolver::built_in(store)
                .clear_override(bank)
                .map_err(io::Error::other)?;
            writeln!(out, "override cleared for {bank}")
        }
        Command::ShowDraft { role } => {
            let cache = DraftSnapshotCache::new(store, DEFAULT_DRAFT_DEBOUNCE);
            match cache.load_draft(*role) {
                Some(form) => {
                    let pretty = form
                        .to_value()
                        .and_then(|value| serde_json::to_string_pretty(&value))
                        .map_err(io::Error::other)?;
                    writeln!(out, "{pretty}")
                }
                None => writeln!(out, "no draft saved for {role}"),
            }
        }
        Command::ClearDraft { role } => {
            let mut cache = DraftSnapshotCache::new(store, DEFAULT_DRAFT_DEBOUNCE);
            cache.clear_draft(*role);
            writeln!(out, "draft cleared for {role}")
        }
        Command::ShowAccount { role } => show_account(store.as_ref(), *role, out),
    }
}

fn list_banks(out: &mut impl Write) -> io::Result<()> {
    for bank in BankDirectory::built_in().list_banks() {
        writeln!(out, "{}\t{}", bank.name, bank.default_branch_code)?;
        for branch in &bank.branches {
            writeln!(out, "  {}\t{}\t{}", branch.code, branch.name, branch.location)?;
        }
    }
    Ok(())
}

fn show_account(
    store: &dyn KeyValueStore,
    role: RegistrationRole,
    out: &mut impl Write,
) -> io::Result<()> {
    let key = StorageKey::FinalizedAccount(role);
    let raw = store.get(&key).map_err(io::Error::other)?;
    let Some(raw) = raw else {
        return writeln!(out, "no account registered for {role}");
    };
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|error| {
        io::Error::new(io::ErrorKind::InvalidData, format!("corrupt record '{key}': {error}"))
    })?;
    let pretty = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
    writeln!(out, "{pretty}")
}
