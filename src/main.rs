//! stagetree - Stage, mirror and verify directory trees.
//!
//! Usage:
//!   stagetree copy SRC DST        Mirror a directory tree
//!   stagetree delete PATH         Delete a directory tree or a file
//!   stagetree list [ROOT]         List files or directories recursively
//!   stagetree checksum FILE...    Print content checksums
//!   stagetree verify SRC DST      Compare a mirror against its source
//!   stagetree stage MANIFEST      Run every mirror job in a manifest
//!   stagetree --help              Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use stagetree_analyze::{ChecksumConfig, Checksummer, MirrorReport, MirrorVerifier};
use stagetree_core::{MirrorOptions, StageManifest};
use stagetree_ops::{FileOps, TreeMirror};
use stagetree_scan::{ListKind, TreeWalker};

#[derive(Parser)]
#[command(
    name = "stagetree",
    version,
    about = "Stage, mirror and verify directory trees",
    long_about = "stagetree copies directory trees into staging areas, skipping \
                  ignored paths, and checks that the result matches its source.\n\n\
                  Set STAGETREE_LOG to control log output (e.g. STAGETREE_LOG=debug)."
)]
struct Cli {
    /// Log debug output (overridden by STAGETREE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy a directory tree, skipping ignored paths
    Copy {
        /// Source directory
        source: PathBuf,

        /// Destination directory (created if absent)
        destination: PathBuf,

        /// Skip any path containing this substring (repeatable)
        #[arg(short, long = "ignore", value_name = "SUBSTRING")]
        ignore: Vec<String>,

        /// Delete the destination before copying
        #[arg(short, long)]
        clean: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a directory tree, or a single file with --file
    Delete {
        /// Path to delete
        path: PathBuf,

        /// Delete a regular file instead of a directory
        #[arg(long)]
        file: bool,
    },

    /// List everything beneath a directory
    List {
        /// Root directory
        #[arg(default_value = ".")]
        root: PathBuf,

        /// List directories instead of files
        #[arg(short, long)]
        directories: bool,

        /// Print paths relative to the root
        #[arg(short, long)]
        relative: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the BLAKE3 checksum of each file
    Checksum {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Bytes read per digest update
        #[arg(long, default_value = "1024")]
        chunk_size: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compare a mirrored tree against its source
    Verify {
        /// Source directory
        source: PathBuf,

        /// Mirrored directory
        destination: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the mirror jobs listed in a TOML manifest
    Stage {
        /// Manifest file
        #[arg(default_value = "stagetree.toml")]
        manifest: PathBuf,

        /// Verify each job after copying
        #[arg(long)]
        verify: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Copy {
            source,
            destination,
            ignore,
            clean,
            format,
        } => {
            let options = MirrorOptions { ignore, clean };
            run_copy(&source, &destination, &options, format)?;
        }
        Command::Delete { path, file } => {
            run_delete(&path, file)?;
        }
        Command::List {
            root,
            directories,
            relative,
            format,
        } => {
            let kind = if directories {
                ListKind::Directories
            } else {
                ListKind::Files
            };
            run_list(&root, kind, relative, format)?;
        }
        Command::Checksum {
            files,
            chunk_size,
            format,
        } => {
            run_checksum(&files, chunk_size, format)?;
        }
        Command::Verify {
            source,
            destination,
            format,
        } => {
            run_verify(&source, &destination, format)?;
        }
        Command::Stage { manifest, verify } => {
            run_stage(&manifest, verify)?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber filtered by `STAGETREE_LOG`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("STAGETREE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Mirror one tree and print the summary.
fn run_copy(
    source: &Path,
    destination: &Path,
    options: &MirrorOptions,
    format: OutputFormat,
) -> Result<()> {
    eprintln!("Copying {} to {}...", source.display(), destination.display());

    let summary = TreeMirror::new()
        .mirror(source, destination, options)
        .wrap_err("Copy failed")?;

    match format {
        OutputFormat::Text => println!("{summary}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

/// Delete a tree or a single file.
fn run_delete(path: &Path, file: bool) -> Result<()> {
    let ops = FileOps::new();
    if file {
        ops.delete_file(path).wrap_err("Delete failed")?;
    } else {
        ops.delete_directory(path).wrap_err("Delete failed")?;
    }
    Ok(())
}

/// Print a recursive listing, one path per line.
fn run_list(root: &Path, kind: ListKind, relative: bool, format: OutputFormat) -> Result<()> {
    let walker = TreeWalker::new();
    let paths = match (relative, kind) {
        (true, kind) => walker.list_relative(root, kind),
        (false, ListKind::Files) => walker.list_files_recursive(root),
        (false, ListKind::Directories) => walker.list_directories_recursive(root),
    };

    match format {
        OutputFormat::Text => {
            for path in &paths {
                println!("{}", path.display());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&paths)?),
    }
    Ok(())
}

/// Hash each file; fails after printing the rest if any file could not be read.
fn run_checksum(files: &[PathBuf], chunk_size: usize, format: OutputFormat) -> Result<()> {
    let config = ChecksumConfig::builder()
        .chunk_size(chunk_size)
        .build()
        .wrap_err("Invalid checksum settings")?;
    let checksummer = Checksummer::with_config(config);

    let mut results = Vec::with_capacity(files.len());
    let mut failures = 0usize;
    for file in files {
        match checksummer.checksum_hex(file) {
            Ok(hex) => results.push((file, hex)),
            Err(_) => failures += 1,
        }
    }

    match format {
        OutputFormat::Text => {
            for (file, hex) in &results {
                println!("{hex}  {}", file.display());
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = results
                .iter()
                .map(|(file, hex)| serde_json::json!({ "path": file, "checksum": hex }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    if failures > 0 {
        bail!("{failures} file(s) could not be hashed");
    }
    Ok(())
}

/// Compare two trees and fail if they differ.
fn run_verify(source: &Path, destination: &Path, format: OutputFormat) -> Result<()> {
    let report = MirrorVerifier::new()
        .verify(source, destination)
        .wrap_err("Verification failed")?;

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if !report.is_identical() {
        bail!(
            "{} differs from {}",
            destination.display(),
            source.display()
        );
    }
    Ok(())
}

/// Run every job in the manifest in order, stopping at the first failure.
fn run_stage(manifest_path: &Path, verify: bool) -> Result<()> {
    let manifest = StageManifest::load(manifest_path)
        .wrap_err_with(|| format!("Could not load {}", manifest_path.display()))?;

    if manifest.mirror.is_empty() {
        eprintln!("No mirror jobs in {}", manifest_path.display());
        return Ok(());
    }

    let mirror = TreeMirror::new();
    let verifier = MirrorVerifier::new();
    let total = manifest.mirror.len();
    tracing::debug!(manifest = %manifest_path.display(), jobs = total, "Loaded stage manifest");

    for (index, job) in manifest.mirror.iter().enumerate() {
        eprintln!(
            "[{}/{}] {} -> {}",
            index + 1,
            total,
            job.source.display(),
            job.destination.display()
        );

        let summary = mirror
            .mirror(&job.source, &job.destination, &job.options())
            .wrap_err_with(|| format!("Mirror job {} failed", index + 1))?;
        println!("{summary}");

        if verify {
            let report = verifier
                .verify(&job.source, &job.destination)
                .wrap_err_with(|| format!("Verifying job {} failed", index + 1))?;
            // Ignored entries are expected to be missing.
            if !report.extra.is_empty() || !report.mismatched.is_empty() {
                print_report(&report);
                bail!("Mirror job {} did not reproduce its source", index + 1);
            }
        }
    }

    Ok(())
}

fn print_report(report: &MirrorReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" {} entries compared", report.files_compared);
    println!(
        " {} missing, {} extra, {} mismatched",
        report.missing.len(),
        report.extra.len(),
        report.mismatched.len()
    );
    println!("{}", "─".repeat(60));

    for path in &report.missing {
        println!("  - {}", path.display());
    }
    for path in &report.extra {
        println!("  + {}", path.display());
    }
    for path in &report.mismatched {
        println!("  ~ {}", path.display());
    }
}
