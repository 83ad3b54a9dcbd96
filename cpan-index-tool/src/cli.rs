// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::trust_anchor_gen::{parse_armored_key, render_trust_anchor},
    clap::{Arg, ArgMatches, Command},
    cpan_index::{
        checksums::read_checksums,
        error::CpanIndexError,
        io::Compression,
        packages::{PackagesIndexOptions, PackagesIndexReader, DEFAULT_QUEUE_CAPACITY},
        trust_anchor::TrustAnchor,
    },
    futures::StreamExt,
    log::{info, LevelFilter},
    std::io::Write,
    thiserror::Error,
};

const PACKAGES_JSON_ABOUT: &str = "\
Convert a packages index to JSON.

Reads a `02packages.details.txt.gz` file and prints a JSON array with one
object per entry, one entry per line. Each object has `package`, `version`,
and `path` keys.

Entries are printed as they are parsed. If a malformed line is encountered,
the array is terminated, the error is printed to stderr, and the process exits
with a non-zero status.

Files not ending in `.gz` are assumed to be uncompressed.
";

const CHECKSUMS_JSON_ABOUT: &str = "\
Verify a CHECKSUMS file and print it as JSON.

The PGP cleartext signature of the file is verified before its content is
parsed. By default, the signature must come from the PAUSE key embedded in
this program. Use `--key` to trust other keys instead.

The output is a JSON object mapping filenames to objects with `md5`, `mtime`,
`sha256`, `size`, and `isdir` keys.
";

const GENERATE_TRUST_ANCHOR_ABOUT: &str = "\
Generate Rust source embedding a PGP public key.

Reads an ASCII armored public key file (as produced by `gpg --export --armor`)
containing a single primary key able to produce signatures. Writes a Rust
source file defining the key's public key packets as constant byte arrays.

The output replaces `cpan-index/src/pause_key.rs` when PAUSE rotates keys.
";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("argument parsing error: {0:?}")]
    Clap(#[from] clap::Error),

    #[error("{0}")]
    CpanIndex(#[from] CpanIndexError),

    #[error("PGP error: {0:?}")]
    Pgp(#[from] pgp::errors::Error),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("formatting error: {0:?}")]
    Fmt(#[from] std::fmt::Error),

    #[error("trust anchor error: {0}")]
    TrustAnchor(String),

    #[error("invalid sub-command: {0}")]
    InvalidSubCommand(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

pub async fn run_cli() -> Result<()> {
    let default_queue_capacity = format!("{}", DEFAULT_QUEUE_CAPACITY);

    let app = Command::new("CPAN Index Tool")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gregory Szorc <gregory.szorc@gmail.com>")
        .about("Verify and inspect CPAN index files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        );

    let app = app.subcommand(
        Command::new("checksums-json")
            .about("Verify a CHECKSUMS file and print it as JSON")
            .long_about(CHECKSUMS_JSON_ABOUT)
            .arg(
                Arg::new("key")
                    .long("key")
                    .takes_value(true)
                    .multiple_occurrences(true)
                    .allow_invalid_utf8(true)
                    .help("Path to an armored public key to trust instead of the PAUSE key"),
            )
            .arg(
                Arg::new("path")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path to CHECKSUMS file"),
            ),
    );

    let app = app.subcommand(
        Command::new("generate-trust-anchor")
            .about("Generate Rust source embedding a PGP public key")
            .long_about(GENERATE_TRUST_ANCHOR_ABOUT)
            .arg(
                Arg::new("input")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path to armored public key file"),
            )
            .arg(
                Arg::new("output")
                    .required(true)
                    .allow_invalid_utf8(true)
                    .help("Path of Rust source file to write"),
            ),
    );

    let app = app.subcommand(
        Command::new("packages-header")
            .about("Print the header of a packages index as JSON")
            .arg(
                Arg::new("path")
                    .required(true)
                    .help("Path to 02packages.details.txt.gz file"),
            ),
    );

    let mut app = app.subcommand(
        Command::new("packages-json")
            .about("Convert a packages index to JSON")
            .long_about(PACKAGES_JSON_ABOUT)
            .arg(
                Arg::new("queue-capacity")
                    .long("queue-capacity")
                    .takes_value(true)
                    .default_value(&default_queue_capacity)
                    .help("Number of parsed entries to buffer ahead of output"),
            )
            .arg(
                Arg::new("enforce-line-count")
                    .long("enforce-line-count")
                    .help("Fail if the number of entries differs from the Line-Count header"),
            )
            .arg(
                Arg::new("path")
                    .required(true)
                    .help("Path to 02packages.details.txt.gz file"),
            ),
    );

    let matches = app.clone().get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    match matches.subcommand() {
        Some(("checksums-json", args)) => command_checksums_json(args).await,
        Some(("generate-trust-anchor", args)) => command_generate_trust_anchor(args).await,
        Some(("packages-header", args)) => command_packages_header(args).await,
        Some(("packages-json", args)) => command_packages_json(args).await,
        Some((command, _)) => Err(ToolError::InvalidSubCommand(command.to_string())),
        None => {
            app.print_help()?;
            Ok(())
        }
    }
}

async fn command_checksums_json(args: &ArgMatches) -> Result<()> {
    let path = args
        .value_of_os("path")
        .expect("path argument is required");

    let anchor = if let Some(values) = args.values_of_os("key") {
        let mut armored = vec![];
        for key_path in values {
            armored.push(tokio::fs::read_to_string(key_path).await?);
        }

        TrustAnchor::from_armored(armored.iter().map(|s| s.as_str()))?
    } else {
        TrustAnchor::pause()?
    };

    let data = tokio::fs::read(path).await?;
    let checksums = read_checksums(data.as_slice(), &anchor)?;

    println!("{}", serde_json::to_string_pretty(&checksums)?);

    Ok(())
}

async fn command_generate_trust_anchor(args: &ArgMatches) -> Result<()> {
    let input = args
        .value_of_os("input")
        .expect("input argument is required");
    let output = args
        .value_of_os("output")
        .expect("output argument is required");

    let key = parse_armored_key(&tokio::fs::read_to_string(input).await?)?;
    let source = render_trust_anchor(&[key])?;

    tokio::fs::write(output, source.as_bytes()).await?;
    info!("wrote {}", output.to_string_lossy());

    Ok(())
}

fn packages_options(path: &str) -> PackagesIndexOptions {
    PackagesIndexOptions {
        compression: Compression::from_path(path),
        ..Default::default()
    }
}

async fn command_packages_header(args: &ArgMatches) -> Result<()> {
    let path = args.value_of("path").expect("path argument is required");

    let data = tokio::fs::read(path).await?;
    let (header, entries) = PackagesIndexReader::new(packages_options(path))
        .open(futures::io::Cursor::new(data))
        .await?;
    entries.cancel().await;

    println!("{}", serde_json::to_string_pretty(&header.as_multi_map())?);

    Ok(())
}

async fn command_packages_json(args: &ArgMatches) -> Result<()> {
    let path = args.value_of("path").expect("path argument is required");

    let options = PackagesIndexOptions {
        queue_capacity: args.value_of_t::<usize>("queue-capacity")?,
        enforce_line_count: args.is_present("enforce-line-count"),
        ..packages_options(path)
    };

    let data = tokio::fs::read(path).await?;
    let (_, mut entries) = PackagesIndexReader::new(options)
        .open(futures::io::Cursor::new(data))
        .await?;

    let mut stdout = std::io::stdout();
    let mut separator = "[\n";
    let mut failure = None;

    while let Some(entry) = entries.next().await {
        match entry {
            Ok(entry) => {
                stdout.write_all(separator.as_bytes())?;
                separator = ",\n";
                serde_json::to_writer(&mut stdout, &entry)?;
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if separator == "[\n" {
        stdout.write_all(b"[")?;
    }
    stdout.write_all(b"\n]\n")?;
    stdout.flush()?;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
