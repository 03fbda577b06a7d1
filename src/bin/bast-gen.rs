//! BAST Generator CLI tool
//!
//! A command-line tool for generating BAST (Berita Acara Serah Terima)
//! delivery-receipt PDFs from shipment spreadsheets.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use bast_gen::date::{
    now_in_offset, parse_date_input, parse_time_input, parse_utc_offset, DEFAULT_UTC_OFFSET,
};
use bast_gen::header::ShipmentHeader;
use bast_gen::layout::{ColumnSizing, PageBreaking, PageNumbering};
use bast_gen::pdf::{extract_metadata, render_receipt, RenderOptions};
use bast_gen::table::ParcelTable;
use bast_gen::validate::{ensure_header, total_parcels, validate_table, NumericPolicy};

/// BAST Generator - delivery-receipt PDFs from shipment spreadsheets
#[derive(Parser)]
#[command(name = "bast-gen")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Generate a receipt from a CSV manifest (date/time default to now, UTC+7)
    bast-gen generate manifest.csv --warehouse WH-A --courier \"ABC Express\" --driver John --police B1234XYZ

    # Explicit date/time, fixed 50-row pages, open the result
    bast-gen generate manifest.xlsx --warehouse WH-A --courier JNE --driver Budi --police B9876ABC \\
        --date 2025-11-20 --time 14:30 --chunk-rows 50 --open

    # Validate a manifest without generating anything
    bast-gen check manifest.csv --strict

    # Inspect a generated receipt
    bast-gen info WH-A_JNE_B9876ABC_20251120_143000_+0700.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a delivery-receipt PDF from a shipment table
    Generate {
        /// Uploaded table: .csv, .xlsx, or .xls (first sheet)
        input: PathBuf,

        /// Warehouse name
        #[arg(long)]
        warehouse: String,

        /// Courier name
        #[arg(long)]
        courier: String,

        /// Driver name
        #[arg(long)]
        driver: String,

        /// Police plate number
        #[arg(long)]
        police: String,

        /// Shipment date (e.g. "2025-11-20" or "20/11/2025"); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Shipment time (e.g. "14:30" or "14:30:05"); defaults to now
        #[arg(long)]
        time: Option<String>,

        /// UTC offset for timestamps and the filename (e.g. "+07:00")
        #[arg(long, default_value = DEFAULT_UTC_OFFSET)]
        utc_offset: String,

        /// Output PDF path; defaults to the standard receipt filename
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the default-named output file
        #[arg(long, conflicts_with = "output")]
        out_dir: Option<PathBuf>,

        /// Reject non-numeric parcel counts instead of coercing them to zero
        #[arg(long)]
        strict: bool,

        /// Size table columns by their longest text instead of evenly
        #[arg(long)]
        auto_width: bool,

        /// Stamp footers from a row-count estimate in a single pass
        /// (faster, may miscount when cells wrap)
        #[arg(long)]
        estimate_pages: bool,

        /// Break the table after every N rows instead of flowing to fit
        #[arg(long, value_name = "N")]
        chunk_rows: Option<usize>,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Validate a shipment table and report the parcel total
    Check {
        /// Uploaded table: .csv, .xlsx, or .xls (first sheet)
        input: PathBuf,

        /// Reject non-numeric parcel counts instead of coercing them to zero
        #[arg(long)]
        strict: bool,
    },

    /// Show information about a generated PDF
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            warehouse,
            courier,
            driver,
            police,
            date,
            time,
            utc_offset,
            output,
            out_dir,
            strict,
            auto_width,
            estimate_pages,
            chunk_rows,
            open,
        } => cmd_generate(GenerateArgs {
            input,
            warehouse,
            courier,
            driver,
            police,
            date,
            time,
            utc_offset,
            output,
            out_dir,
            strict,
            auto_width,
            estimate_pages,
            chunk_rows,
            open,
        }),
        Commands::Check { input, strict } => cmd_check(input, strict),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

struct GenerateArgs {
    input: PathBuf,
    warehouse: String,
    courier: String,
    driver: String,
    police: String,
    date: Option<String>,
    time: Option<String>,
    utc_offset: String,
    output: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    strict: bool,
    auto_width: bool,
    estimate_pages: bool,
    chunk_rows: Option<usize>,
    open: bool,
}

fn policy_for(strict: bool) -> NumericPolicy {
    if strict {
        NumericPolicy::Strict
    } else {
        NumericPolicy::Coerce
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let offset = parse_utc_offset(&args.utc_offset)?;
    let (default_date, default_time) = now_in_offset(offset);

    let date = match args.date.as_deref() {
        Some(expr) => parse_date_input(expr)?,
        None => default_date,
    };
    let time = match args.time.as_deref() {
        Some(expr) => parse_time_input(expr)?,
        None => default_time,
    };

    let header = ShipmentHeader {
        date,
        time,
        warehouse: args.warehouse,
        courier: args.courier,
        driver: args.driver,
        police: args.police,
        offset,
    };

    ensure_header(&header).context("please fill in all header fields first")?;

    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }

    let table = ParcelTable::from_path(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let policy = policy_for(args.strict);
    let issues = validate_table(&table, policy);
    if !issues.is_empty() {
        eprintln!("Validation failed:");
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        bail!("the uploaded file did not pass validation");
    }

    let total = total_parcels(&table);
    eprintln!("File valid: {} rows, {} koli total", table.rows.len(), total);

    let options = RenderOptions {
        policy,
        sizing: if args.auto_width {
            ColumnSizing::auto()
        } else {
            ColumnSizing::Even
        },
        numbering: if args.estimate_pages {
            PageNumbering::SinglePassEstimate
        } else {
            PageNumbering::TwoPassExact
        },
        breaking: match args.chunk_rows {
            Some(n) => PageBreaking::FixedChunk(n),
            None => PageBreaking::Flow,
        },
    };

    // All-or-nothing: the buffer only exists if every page finalized
    let buffer = render_receipt(&header, &table, &options)?;

    let output = match (args.output, args.out_dir) {
        (Some(path), _) => path,
        (None, Some(dir)) => dir.join(header.output_filename()),
        (None, None) => PathBuf::from(header.output_filename()),
    };
    std::fs::write(&output, buffer)
        .with_context(|| format!("failed to write {}", output.display()))?;

    eprintln!("Receipt written to: {}", output.display());

    if args.open {
        open_file(&output)?;
    }

    Ok(())
}

fn cmd_check(input: PathBuf, strict: bool) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("input file not found: {}", input.display());
    }

    let table = ParcelTable::from_path(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let issues = validate_table(&table, policy_for(strict));
    if !issues.is_empty() {
        eprintln!("Validation failed:");
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        bail!("the uploaded file did not pass validation");
    }

    println!("File valid!");
    println!("Rows: {}", table.rows.len());
    println!("Total koli: {}", total_parcels(&table));

    Ok(())
}

fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);
    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }

    Ok(())
}

/// Open a file with the system default application
fn open_file(path: &PathBuf) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}
