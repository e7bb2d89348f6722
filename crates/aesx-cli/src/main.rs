//! Command-line interface for `aesx-core`.

#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use aesx_core::{
    cbc_transform_in_place, cfb128_transform_in_place, ecb_transform, run_vectors, Block,
    Context, Direction, BLOCK_SIZE,
};
use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// AES block cipher CLI.
#[derive(Parser)]
#[command(
    name = "aesx",
    version,
    author,
    about = "AES-128/192/256 in ECB, CBC and CFB128 modes"
)]
struct Cli {
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by the file-processing commands.
#[derive(Args)]
struct FileArgs {
    /// AES key as 32, 48 or 64 hex characters.
    #[arg(long, value_name = "HEX")]
    key_hex: String,
    /// Decrypt instead of encrypt.
    #[arg(long, default_value_t = false)]
    decrypt: bool,
    /// Input file.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Output file.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a file block by block in ECB mode (length must be a multiple of 16).
    Ecb {
        #[command(flatten)]
        files: FileArgs,
    },
    /// Process a file in CBC mode (length must be a multiple of 16).
    Cbc {
        #[command(flatten)]
        files: FileArgs,
        /// Initialization vector as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
    },
    /// Process a file of any length in CFB128 mode.
    Cfb128 {
        #[command(flatten)]
        files: FileArgs,
        /// Initialization vector as 32 hex characters.
        #[arg(long, value_name = "HEX")]
        iv_hex: String,
    },
    /// Run the built-in known-answer vectors.
    Selftest {
        /// Print the outcome of every vector.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Run a local demo: random key and IV, encrypt random data, decrypt back.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    match cli.command {
        Commands::Ecb { files } => cmd_ecb(&files),
        Commands::Cbc { files, iv_hex } => cmd_cbc(&files, &iv_hex),
        Commands::Cfb128 { files, iv_hex } => cmd_cfb128(&files, &iv_hex),
        Commands::Selftest { verbose } => cmd_selftest(verbose),
        Commands::Demo { seed } => cmd_demo(seed),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}

fn direction_of(files: &FileArgs) -> Direction {
    if files.decrypt {
        Direction::Decrypt
    } else {
        Direction::Encrypt
    }
}

fn cmd_ecb(files: &FileArgs) -> Result<()> {
    let direction = direction_of(files);
    let key = parse_key_hex(&files.key_hex)?;
    let ctx = Context::new(direction, &key).context("schedule key")?;
    let mut data = read_input(&files.input)?;
    ecb_buffer(&ctx, direction, &mut data)?;
    write_output(&files.output, &data)?;
    info!(mode = "ecb", %direction, bytes = data.len(), "done");
    Ok(())
}

fn cmd_cbc(files: &FileArgs, iv_hex: &str) -> Result<()> {
    let direction = direction_of(files);
    let key = parse_key_hex(&files.key_hex)?;
    let ctx = Context::new(direction, &key).context("schedule key")?;
    let mut iv = parse_iv_hex(iv_hex)?;
    let mut data = read_input(&files.input)?;
    cbc_transform_in_place(&ctx, direction, &mut iv, &mut data).context("CBC transform")?;
    write_output(&files.output, &data)?;
    info!(mode = "cbc", %direction, bytes = data.len(), next_iv = %hex::encode(iv), "done");
    Ok(())
}

fn cmd_cfb128(files: &FileArgs, iv_hex: &str) -> Result<()> {
    let direction = direction_of(files);
    // CFB runs the forward cipher whichever way the data flows.
    let key = parse_key_hex(&files.key_hex)?;
    let ctx = Context::schedule_encrypt(&key).context("schedule key")?;
    let mut iv = parse_iv_hex(iv_hex)?;
    let mut offset = 0usize;
    let mut data = read_input(&files.input)?;
    cfb128_transform_in_place(&ctx, direction, &mut offset, &mut iv, &mut data)
        .context("CFB128 transform")?;
    write_output(&files.output, &data)?;
    info!(mode = "cfb128", %direction, bytes = data.len(), offset, "done");
    Ok(())
}

fn cmd_selftest(verbose: bool) -> Result<()> {
    let report = run_vectors(verbose);
    if verbose {
        for outcome in &report.outcomes {
            println!("  {}", outcome);
        }
    }
    let (passed, failed) = (report.passed(), report.failed());
    println!("self-test: {passed} passed, {failed} failed");
    if !report.is_success() {
        bail!("AES self-test failed");
    }
    Ok(())
}

fn cmd_demo(seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut key = [0u8; 32];
    rng.fill_bytes(&mut key);
    let mut iv = [0u8; BLOCK_SIZE];
    rng.fill_bytes(&mut iv);

    let enc = Context::schedule_encrypt(&key)?;
    let dec = Context::schedule_decrypt(&key)?;

    let mut plaintext = vec![0u8; 3 * BLOCK_SIZE];
    rng.fill_bytes(&mut plaintext);
    println!("demo key: {}", hex::encode(key));
    println!("iv: {}", hex::encode(iv));
    println!("plaintext: {}", hex::encode(&plaintext));

    let mut cbc = plaintext.clone();
    let mut chain = iv;
    cbc_transform_in_place(&enc, Direction::Encrypt, &mut chain, &mut cbc)?;
    println!("cbc ciphertext: {}", hex::encode(&cbc));
    let mut chain = iv;
    cbc_transform_in_place(&dec, Direction::Decrypt, &mut chain, &mut cbc)?;
    if cbc != plaintext {
        bail!("CBC demo roundtrip failed");
    }

    // An odd length shows CFB128 needs no padding.
    let mut cfb = plaintext[..41].to_vec();
    let (mut chain, mut offset) = (iv, 0usize);
    cfb128_transform_in_place(&enc, Direction::Encrypt, &mut offset, &mut chain, &mut cfb)?;
    println!("cfb128 ciphertext: {}", hex::encode(&cfb));
    debug!(offset, "cfb128 stream offset after encryption");
    let (mut chain, mut offset) = (iv, 0usize);
    cfb128_transform_in_place(&enc, Direction::Decrypt, &mut offset, &mut chain, &mut cfb)?;
    if cfb != plaintext[..41] {
        bail!("CFB128 demo roundtrip failed");
    }

    println!("demo roundtrips succeeded");
    Ok(())
}

fn ecb_buffer(ctx: &Context, direction: Direction, data: &mut [u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        bail!("input length must be a multiple of {} bytes", BLOCK_SIZE);
    }
    for chunk in data.chunks_exact_mut(BLOCK_SIZE) {
        let mut block: Block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        chunk.copy_from_slice(&ecb_transform(ctx, direction, &block));
    }
    Ok(())
}

fn parse_key_hex(hex_str: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(hex_str.trim()).context("decode key hex")?;
    if !matches!(bytes.len(), 16 | 24 | 32) {
        bail!("AES key must be 16, 24 or 32 bytes (32, 48 or 64 hex characters)");
    }
    Ok(bytes)
}

fn parse_iv_hex(hex_str: &str) -> Result<Block> {
    let bytes = hex::decode(hex_str.trim()).context("decode IV hex")?;
    if bytes.len() != BLOCK_SIZE {
        bail!("IV must be 16 bytes (32 hex characters)");
    }
    let mut iv = [0u8; BLOCK_SIZE];
    iv.copy_from_slice(&bytes);
    Ok(iv)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("write {}", path.display()))
}

fn seeded_rng(seed: Option<u64>) -> impl RngCore + CryptoRng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => ChaCha20Rng::from_entropy(),
    }
}
