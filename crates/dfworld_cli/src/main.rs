use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dfworld_core::core_api::{SaveFile, SaveKind};
use dfworld_render::{
    JsonStyle, render_chunks_json, render_chunks_text, render_header_json, render_header_text,
    render_summary_json, render_summary_text,
};
use serde_json::Value as JsonValue;
use tracing::{debug, metadata::LevelFilter};
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    /// world.sav: a world with an active fortress
    Fortress,
    /// world.dat: the world alone
    World,
}

impl From<KindArg> for SaveKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Fortress => SaveKind::FortressActive,
            KindArg::World => SaveKind::WorldOnly,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decompress a compressed save file.
    ///
    /// Writes INFILE's decompressed equivalent to OUTFILE: the same header with
    /// the compression flag cleared, followed by every chunk inflated.
    Decompress {
        #[arg(value_name = "INFILE")]
        input: PathBuf,
        #[arg(value_name = "OUTFILE")]
        output: PathBuf,
        /// Save kind, when the extension is neither .sav nor .dat.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Get information about a world.
    Info {
        #[arg(value_name = "WORLDFILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// Save kind, when the extension is neither .sav nor .dat.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// List the compressed chunks of a save file.
    Chunks {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Print the save header.
    Header {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

/// dfworld is tar for Dwarf Fortress save files.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Decompress {
            input,
            output,
            kind,
        } => decompress(&input, &output, kind),
        Command::Info { path, json, kind } => info(&path, json, kind),
        Command::Chunks { path, json, kind } => chunks(&path, json, kind),
        Command::Header { path, json, kind } => header(&path, json, kind),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: cannot set default tracing subscriber");
    }
}

fn open_or_exit(path: &Path, kind: Option<KindArg>) -> SaveFile<std::io::BufReader<File>> {
    SaveFile::open_path(path, kind.map(SaveKind::from)).unwrap_or_else(|e| {
        eprintln!("Unable to open input file {}: {e}", path.display());
        process::exit(1);
    })
}

fn decompress(input: &Path, output: &Path, kind: Option<KindArg>) {
    let mut save = open_or_exit(input, kind);
    if !save.header().is_compressed {
        eprintln!(
            "Input file {} is already decompressed; exiting.",
            input.display()
        );
        process::exit(1);
    }

    let file = File::create(output).unwrap_or_else(|e| {
        eprintln!("Unable to open output file {}: {e}", output.display());
        process::exit(1);
    });
    let mut writer = BufWriter::new(file);

    let result = save
        .decompress_to(&mut writer)
        .map_err(|e| e.to_string())
        .and_then(|written| {
            writer.flush().map_err(|e| e.to_string())?;
            Ok(written)
        });
    match result {
        Ok(written) => {
            debug!(written, output = %output.display(), "wrote decompressed save");
            save.close();
        }
        Err(e) => {
            drop(writer);
            let _ = fs::remove_file(output);
            eprintln!("Error decompressing {}: {e}", input.display());
            process::exit(1);
        }
    }
}

fn info(path: &Path, json: bool, kind: Option<KindArg>) {
    let mut save = open_or_exit(path, kind);
    let summary = save.summary().unwrap_or_else(|e| {
        eprintln!("Error reading save file: {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    });
    save.close();

    if json {
        print_json(&render_summary_json(&summary, JsonStyle::CanonicalV1));
        return;
    }
    print!("{}", render_summary_text(&summary));
}

fn chunks(path: &Path, json: bool, kind: Option<KindArg>) {
    let mut save = open_or_exit(path, kind);
    let spans = save.chunks().unwrap_or_else(|e| {
        eprintln!("Error listing chunks of {}: {e}", path.display());
        process::exit(1);
    });
    save.close();

    if json {
        print_json(&render_chunks_json(&spans, JsonStyle::CanonicalV1));
        return;
    }
    print!("{}", render_chunks_text(&spans));
}

fn header(path: &Path, json: bool, kind: Option<KindArg>) {
    let save = open_or_exit(path, kind);
    let header = save.header();
    let kind = save.kind();
    save.close();

    if json {
        print_json(&render_header_json(&header, kind, JsonStyle::CanonicalV1));
        return;
    }
    print!("{}", render_header_text(&header, kind));
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
