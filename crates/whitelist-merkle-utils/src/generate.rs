use std::{
    fs::File,
    io::BufWriter,
    ops::RangeInclusive,
    path::PathBuf,
};

use color_eyre::eyre::{
    ensure,
    Result,
    WrapErr as _,
};
use rand::Rng;
use tracing::{
    info,
    instrument,
};
use whitelist_merkle::{
    Hasher as _,
    Keccak256,
};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Number of hashes to generate
    #[arg(long, short = 'n', default_value_t = 128)]
    count: usize,

    /// Path to output file
    #[arg(long, short, value_name = "PATH", default_value = "random_hashes.json")]
    output: PathBuf,

    /// Smallest random number that is hashed
    #[arg(long, default_value_t = 1)]
    min: u64,

    /// Largest random number that is hashed
    #[arg(long, default_value_t = 100_000)]
    max: u64,
}

/// Writes a JSON array of `count` Keccak-256 hashes of random numbers to a
/// file, for use as a test whitelist.
///
/// # Errors
///
/// Fails if `min` exceeds `max` or if the output file cannot be written.
#[instrument(skip_all, fields(output = %args.output.display(), count = args.count))]
pub fn run(args: Args) -> Result<()> {
    let Args {
        count,
        output,
        min,
        max,
    } = args;
    ensure!(min <= max, "`--min` ({min}) must not exceed `--max` ({max})");

    let hashes = random_hashes(&mut rand::thread_rng(), count, min..=max);
    let file = File::create(&output)
        .wrap_err_with(|| format!("failed to create output file `{}`", output.display()))?;
    serde_json::to_writer(BufWriter::new(file), &hashes)
        .wrap_err("failed writing hashes to output file")?;
    info!("wrote random hashes");

    println!(
        "File {} has been created and filled with {count} random hashes.",
        output.display()
    );
    Ok(())
}

/// Hashes the decimal representation of `count` numbers drawn from `range`.
fn random_hashes<R: Rng>(rng: &mut R, count: usize, range: RangeInclusive<u64>) -> Vec<String> {
    (0..count)
        .map(|_| {
            let number = rng.gen_range(range.clone());
            format!("0x{}", hex::encode(Keccak256.digest(number.to_string().as_bytes())))
        })
        .collect()
}
