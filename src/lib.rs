//! acqxfer: microscope acquisition metadata transcoder.
//!
//! acqxfer moves acquisition metadata between an acquisition server's
//! object graph and a standardized interchange document, in both
//! directions. Export walks a server image and produces the document's
//! image, instrument and ROI records; import recreates instruments on the
//! server and attaches the document's metadata to existing server images.
//!
//! # Modules
//!
//! - [`source`]: Server-side entity graph
//! - [`interchange`]: Interchange document model and JSON I/O
//! - [`export`]: Source graph to interchange document
//! - [`import`]: Interchange document to source graph
//! - [`session`]: Access to the server's persistent store
//! - [`report`]: Soft skips and upsert decisions made during one operation
//! - [`error`]: Error types for acqxfer operations

pub mod container;
pub mod error;
pub mod export;
pub mod ids;
pub mod import;
pub mod interchange;
pub mod layout;
pub mod points;
pub mod report;
pub mod session;
pub mod source;
pub mod units;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::TranscodeError;

use crate::export::ExportOptions;
use crate::ids::SourceId;
use crate::import::ImportOptions;
use crate::interchange::{io_json, Document};
use crate::layout::ImagePlacement;
use crate::report::TranscodeReport;
use crate::session::{MemorySession, Session};

/// The acqxfer CLI application.
#[derive(Parser)]
#[command(name = "acqxfer")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log per-entity progress (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export server images into an interchange document.
    Export(ExportArgs),
    /// Import an interchange document onto existing server images.
    Import(ImportArgs),
    /// Compute (or perform) the on-disk layout of exported pixel files.
    Place(PlaceArgs),
    /// Merge an image's server metadata into a JSON image container.
    Merge(MergeArgs),
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Source graph snapshot (JSON).
    #[arg(long, env = "ACQXFER_GRAPH")]
    graph: PathBuf,

    /// Server image identifiers to export.
    #[arg(long = "image", required = true, value_delimiter = ',')]
    images: Vec<u64>,

    /// Interchange document to write.
    #[arg(short, long)]
    output: PathBuf,

    /// Update the output document in place instead of starting a new one.
    #[arg(long)]
    update: bool,

    /// Leave ROIs out of the document.
    #[arg(long)]
    no_rois: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the import subcommand.
#[derive(clap::Args)]
struct ImportArgs {
    /// Interchange document to import.
    #[arg(long, env = "ACQXFER_DOCUMENT")]
    document: PathBuf,

    /// Source graph snapshot (JSON); rewritten after a successful import.
    #[arg(long, env = "ACQXFER_GRAPH")]
    graph: PathBuf,

    /// Server images to attach to, one per document image, in order.
    #[arg(long = "target", value_delimiter = ',')]
    targets: Vec<u64>,

    /// Do not create server ROIs.
    #[arg(long)]
    no_rois: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the place subcommand.
#[derive(clap::Args)]
struct PlaceArgs {
    /// JSON array of image placements.
    placements: PathBuf,

    /// Folder holding staged `<image>.tiff` files. Without it, only the
    /// destination paths are printed.
    #[arg(long, requires = "dest")]
    staging: Option<PathBuf>,

    /// Output folder the layout is created under.
    #[arg(long)]
    dest: Option<PathBuf>,
}

/// Arguments for the merge subcommand.
#[derive(clap::Args)]
struct MergeArgs {
    /// Source graph snapshot (JSON).
    #[arg(long, env = "ACQXFER_GRAPH")]
    graph: PathBuf,

    /// Server image whose metadata is merged.
    #[arg(long)]
    image: u64,

    /// JSON container to rewrite.
    #[arg(long)]
    container: PathBuf,
}

/// Run the acqxfer CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TranscodeError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Import(args)) => run_import(args),
        Some(Commands::Place(args)) => run_place(args),
        Some(Commands::Merge(args)) => run_merge(args),
        None => {
            println!("acqxfer {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Microscope acquisition metadata transcoder.");
            println!();
            println!("Run 'acqxfer --help' for usage information.");
            Ok(())
        }
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with
/// `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A logger may already be installed when run() is called from tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Execute the export subcommand.
fn run_export(args: ExportArgs) -> Result<(), TranscodeError> {
    let session = MemorySession::from_file(&args.graph)?;
    let mut document = if args.update && args.output.exists() {
        io_json::read_document_json(&args.output)?
    } else {
        Document::default()
    };

    let options = ExportOptions {
        include_rois: !args.no_rois,
    };
    let mut report = TranscodeReport::new("export");
    for id in args.images {
        let image: source::Image = session.load(SourceId(id))?;
        export::export_image(&session, &image, &mut document, &options, &mut report)?;
    }

    io_json::write_document_json(&args.output, &document)?;
    print_report(&report, &args.report)
}

/// Execute the import subcommand.
fn run_import(args: ImportArgs) -> Result<(), TranscodeError> {
    let document = io_json::read_document_json(&args.document)?;
    let mut session = MemorySession::from_file(&args.graph)?;
    let targets: Vec<SourceId> = args.targets.into_iter().map(SourceId).collect();

    let options = ImportOptions {
        include_rois: !args.no_rois,
    };
    let mut report = TranscodeReport::new("import");
    import::import_document(&mut session, &document, &targets, &options, &mut report)?;

    session.save_file(&args.graph)?;
    print_report(&report, &args.report)
}

/// Execute the place subcommand.
fn run_place(args: PlaceArgs) -> Result<(), TranscodeError> {
    let raw = fs::read_to_string(&args.placements)?;
    let placements: Vec<ImagePlacement> =
        serde_json::from_str(&raw).map_err(|e| TranscodeError::InvalidData {
            field: "placements",
            value: e.to_string(),
        })?;

    match (args.staging, args.dest) {
        (Some(staging), Some(dest)) => {
            for path in layout::move_into_layout(&placements, &staging, &dest)? {
                println!("{}", path.display());
            }
        }
        _ => {
            for (image, path) in layout::destination_paths(&placements) {
                println!("{image}\t{}", path.display());
            }
        }
    }
    Ok(())
}

/// Execute the merge subcommand.
fn run_merge(args: MergeArgs) -> Result<(), TranscodeError> {
    let session = MemorySession::from_file(&args.graph)?;
    let image: source::Image = session.load(SourceId(args.image))?;
    let mut container = container::JsonContainer::open(&args.container)?;
    container::merge_into_container(&session, &image, &mut container)?;
    println!(
        "Merged image {} into {}",
        args.image,
        args.container.display()
    );
    Ok(())
}

fn print_report(report: &TranscodeReport, format: &str) -> Result<(), TranscodeError> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(report).map_err(|e| {
                TranscodeError::InvalidData {
                    field: "report",
                    value: e.to_string(),
                }
            })?;
            println!("{json}");
        }
        _ => print!("{report}"),
    }
    Ok(())
}
