//! Prints the Argon2 hash line of a kdbx database for offline password recovery

use anyhow::Result;
use clap::{Parser, ValueEnum};
use kdbx_hashline::format::{FormatOptions, Grammar, VersionEncoding};
use kdbx_hashline::{format_hash_line, utils, ParseOptions};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    /// `$keepass$` line ending in the header hash and HMAC
    Legacy,
    /// `$keepass$` line ending in the full header and HMAC
    Module,
}

impl From<Target> for Grammar {
    fn from(target: Target) -> Grammar {
        match target {
            Target::Legacy => Grammar::Legacy,
            Target::Module => Grammar::Module,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Provide a .kdbx database
    in_kdbx: PathBuf,
    /// Hash line grammar to print
    #[arg(short, long, value_enum, default_value_t = Target::Module)]
    grammar: Target,
    /// Name to put before the hash, defaults to the file name without extension
    #[arg(short, long)]
    label: Option<String>,
    /// Write the Argon2 version in hex rather than decimal
    #[arg(long)]
    hex_version: bool,
    /// Fail if the stored header hash does not match the header
    #[arg(long)]
    verify_header_hash: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let parse_options = ParseOptions {
        verify_header_hash: args.verify_header_hash,
    };
    let header = kdbx_hashline::open(&args.in_kdbx, parse_options)?;

    let mut format_options = FormatOptions::for_grammar(args.grammar.into());
    if args.hex_version {
        format_options.version_encoding = VersionEncoding::Hex;
    }
    let label = args
        .label
        .unwrap_or_else(|| utils::label_from_path(&args.in_kdbx));

    println!(
        "{}",
        format_hash_line(&header, &header.kdf_params, &label, &format_options)
    );
    Ok(())
}
