//! Prints the parsed header of a kdbx database
//!
//! Primarily for investigating the kdbx format.

use anyhow::Result;
use clap::Parser;
use kdbx_hashline::{Argon2Parameters, ParseOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Provide a .kdbx database
    in_kdbx: PathBuf,
}

fn print_kdf(params: &Argon2Parameters) {
    println!("KDF: Argon2 ({})", params.kdf_uuid());
    println!("\tVariant: {:?}", params.algorithm.variant());
    println!("\tVersion: {:#x}", params.version);
    println!("\tLanes: {}", params.parallelism);
    println!(
        "\tMemory: {} bytes ({}kib)",
        params.memory_bytes,
        params.memory_bytes / 1024
    );
    println!("\tIterations: {}", params.iterations);
    println!("\tSalt: {}", hex::encode(&params.salt));
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
    let header = kdbx_hashline::open(&args.in_kdbx, ParseOptions::default())?;

    println!(
        "Signature: {:#010x} {:#010x}{}",
        header.signature1,
        header.signature2,
        if header.has_keepass_signature() {
            ""
        } else {
            " (unexpected)"
        }
    );
    println!("Version: {}.{}", header.major_version, header.minor_version);
    match header.cipher() {
        Some(cipher) => println!("Cipher: {:?}", cipher),
        None => println!("Cipher: {} (not a UUID)", hex::encode(&header.cipher_id)),
    }
    println!("Compression: {:?}", header.compression());
    print_kdf(&header.kdf_params);
    println!("Master Seed: {}", hex::encode(&header.master_seed));
    println!("Encryption IV: {}", hex::encode(&header.encryption_iv));
    println!("Header Length: {} bytes", header.header_end_offset());
    println!("Header Hash: {}", hex::encode(header.header_hash_sha256));
    println!("Header HMAC: {}", hex::encode(header.header_hmac_sha256));
    println!("Other headers: {:?}", header.other_headers);
    Ok(())
}
