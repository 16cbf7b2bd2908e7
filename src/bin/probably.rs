use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{error, info};
use probably::cardinality::{Cardinality, HyperLogLog};
use probably::ingest::{FieldReader, IngestConfig, DEFAULT_FIELD};
use probably::password::{classify, classify_keyed};
use probably::set_membership::BloomFilter;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Bloom filter password screening and HyperLogLog distinct counts", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Screen candidate passwords against already used ones.
    Passwords {
        /// Passwords to screen, in order.
        candidates: Vec<String>,
        /// Number of bits of the filter.
        #[arg(long, default_value_t = 1000)]
        size: usize,
        /// Number of hash functions.
        #[arg(long, default_value_t = 3)]
        hashes: usize,
        /// Comma-separated passwords already in use.
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "password123,admin123,qwerty123"
        )]
        existing: Vec<String>,
        /// Report each distinct password once, with its last status.
        #[arg(long)]
        keyed: bool,
    },
    /// Compare exact and HyperLogLog distinct counts of a log field.
    Cardinality {
        /// Newline-delimited JSON log.
        log: PathBuf,
        /// Base-2 logarithm of the number of registers.
        #[arg(short, long, default_value_t = 14)]
        precision: u32,
        /// Record field to count.
        #[arg(short, long, default_value = DEFAULT_FIELD)]
        field: String,
    },
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{e:?}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Passwords {
            candidates,
            size,
            hashes,
            existing,
            keyed,
        } => passwords(&candidates, size, hashes, &existing, keyed),
        Command::Cardinality {
            log,
            precision,
            field,
        } => cardinality(&IngestConfig::new(log).with_field(field), precision),
    }
}

fn passwords(
    candidates: &[String],
    size: usize,
    hashes: usize,
    existing: &[String],
    keyed: bool,
) -> Result<()> {
    let mut filter = BloomFilter::new(size, hashes).context("cannot build the Bloom filter")?;
    let seeded = seed(&mut filter, existing);
    info!(
        "{seeded} passwords in use, expected false positive rate {:.2e}",
        filter.false_positive_rate(seeded)
    );

    let results = if keyed {
        classify_keyed(&mut filter, candidates)
    } else {
        classify(&mut filter, candidates)
    };
    for (password, status) in results {
        println!("Password '{password}' - {status}.");
    }
    Ok(())
}

/// Records the non-empty `existing` passwords, returning how many there were.
fn seed(filter: &mut BloomFilter, existing: &[String]) -> usize {
    let mut seeded = 0;
    for password in existing.iter().filter(|p| !p.is_empty()) {
        filter.insert(password);
        seeded += 1;
    }
    seeded
}

fn cardinality(config: &IngestConfig, precision: u32) -> Result<()> {
    let mut reader = FieldReader::open(config)
        .with_context(|| format!("cannot open log {}", config.path.display()))?;
    let mut hll = HyperLogLog::new(precision).context("cannot build the HyperLogLog")?;

    let values: Vec<String> = reader.by_ref().collect();
    reader
        .finish()
        .with_context(|| format!("cannot read {}", config.path.display()))?;
    info!(
        "loaded {} values, skipped {} lines",
        values.len(),
        reader.skipped()
    );

    let start = Instant::now();
    let mut exact: HashSet<String> = HashSet::new();
    for value in &values {
        Cardinality::insert(&mut exact, value);
    }
    let exact_count = exact.count();
    let exact_elapsed = start.elapsed().as_secs_f64();

    let start = Instant::now();
    for value in &values {
        hll.insert(value);
    }
    let estimate = hll.estimate();
    let hll_elapsed = start.elapsed().as_secs_f64();

    println!();
    println!("{:25}{:>18}{:>14}", "", "Exact", "HyperLogLog");
    println!("{:25}{:>18.0}{:>14.0}", "Unique elements", exact_count, estimate);
    println!("{:25}{:>18.4}{:>14.4}", "Elapsed (s)", exact_elapsed, hll_elapsed);
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_skips_empty() {
        let mut filter = BloomFilter::new(1000, 3).unwrap();
        let existing = ["admin123", "", "qwerty123", ""].map(String::from);

        assert_eq!(seed(&mut filter, &existing), 2);
        assert!(filter.contains("admin123"));
        assert!(filter.contains("qwerty123"));
        assert_eq!(filter.count_ones(), 6);
    }

    #[test]
    fn test_cardinality_missing_log() {
        let config = IngestConfig::new("/nonexistent/access.log");
        let err = cardinality(&config, 14).unwrap_err();
        assert!(err.to_string().starts_with("cannot open log"));
    }
}
