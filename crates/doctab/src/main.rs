#![allow(unused)]

use clap::Parser;
use outline::{ExtractOptions, MarginSpec, PdfSource, Variant, POINTS_PER_CM};

use crate::prelude::*;
use crate::prelude::{eprintln, println};

mod output;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn numbered, outline-structured PDFs into tabular section records"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DOCTAB_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Extract heading-structured records from a PDF
    Extract(ExtractArgs),

    /// Auto-detect header/footer crop heights
    Margins(MarginsArgs),

    /// Print document metadata
    Info(InfoArgs),
}

#[derive(Debug, clap::Args)]
pub struct ExtractArgs {
    /// Path to the PDF file
    path: std::path::PathBuf,

    /// Treat every numbered line as one flat heading type and keep the
    /// numbering in the title column
    #[arg(long)]
    flat: bool,

    /// Fixed header crop in centimeters
    #[arg(long, conflicts_with = "auto_margins")]
    top_cm: Option<f32>,

    /// Fixed footer crop in centimeters
    #[arg(long, conflicts_with = "auto_margins")]
    bottom_cm: Option<f32>,

    /// Detect header/footer heights from the first pages
    #[arg(long)]
    auto_margins: bool,

    /// Number of pages sampled by margin auto-detection
    #[arg(long, default_value_t = 5)]
    sample_pages: usize,

    /// Write records to a CSV file instead of stdout
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// Stdout format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Table,
    Csv,
}

#[derive(Debug, clap::Args)]
pub struct MarginsArgs {
    /// Path to the PDF file
    path: std::path::PathBuf,

    /// Number of pages to sample
    #[arg(long, default_value_t = 5)]
    sample_pages: usize,
}

#[derive(Debug, clap::Args)]
pub struct InfoArgs {
    /// Path to the PDF file
    path: std::path::PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Extract(args) => run_extract(args, app.global),
        SubCommands::Margins(args) => run_margins(args, app.global),
        SubCommands::Info(args) => run_info(args, app.global),
    }
}

fn run_extract(args: ExtractArgs, _global: Global) -> Result<()> {
    let variant = if args.flat {
        Variant::SingleLevel
    } else {
        Variant::Multilevel
    };

    let margins = if args.auto_margins {
        MarginSpec::Auto
    } else if args.top_cm.is_some() || args.bottom_cm.is_some() {
        MarginSpec::Fixed {
            top: args.top_cm.unwrap_or(0.0) * POINTS_PER_CM,
            bottom: args.bottom_cm.unwrap_or(0.0) * POINTS_PER_CM,
        }
    } else {
        MarginSpec::None
    };

    let opts = ExtractOptions {
        variant,
        margins,
        sample_pages: args.sample_pages,
        ..Default::default()
    };

    let source = PdfSource::open(&args.path).map_err(|e| eyre!(e))?;
    let records = outline::extract(&source, &opts).map_err(|e| eyre!(e))?;

    if let Some(path) = args.output {
        std::fs::write(&path, output::to_csv(&records, variant))?;
        eprintln!("wrote {} records to {}", records.len(), path.display());
        return Ok(());
    }

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        Format::Table => output::render_table(&records, variant).printstd(),
        Format::Csv => print!("{}", output::to_csv(&records, variant)),
    }
    Ok(())
}

fn run_margins(args: MarginsArgs, _global: Global) -> Result<()> {
    let source = PdfSource::open(&args.path).map_err(|e| eyre!(e))?;
    let margins =
        outline::detect_margins(&source, args.sample_pages, 150.0).map_err(|e| eyre!(e))?;

    println!(
        "top: {:.1}pt ({:.2}cm)  bottom: {:.1}pt ({:.2}cm)",
        margins.top,
        margins.top / POINTS_PER_CM,
        margins.bottom,
        margins.bottom / POINTS_PER_CM,
    );
    Ok(())
}

fn run_info(args: InfoArgs, _global: Global) -> Result<()> {
    let source = PdfSource::open(&args.path).map_err(|e| eyre!(e))?;
    println!("{}", serde_json::to_string_pretty(source.info())?);
    Ok(())
}
