//! AMS segment performance report.
//!
//! Reads a shipment workbook, classifies rows into the three business
//! segments and prints volume, pieces, revenue and OTP for the target
//! month, with top-account rankings per segment.
//!
//! Run: ./target/release/ams_otp_report <workbook.xlsx> [--month 9] [--year 2024] [--json]

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ams_otp_report::aggregate::ReportOptions;
use ams_otp_report::classify::AccountClassifier;
use ams_otp_report::models::{ReportBundle, SegmentResult};
use ams_otp_report::report::build_report;
use ams_otp_report::workbook::WorkbookReader;

#[derive(Parser, Debug)]
#[command(name = "ams_otp_report", about = "Segment OTP and volume report for AMS shipments")]
struct Args {
    /// Workbook to analyze: an .xlsx file, or a directory of per-sheet CSVs
    workbook: std::path::PathBuf,

    /// Target calendar month (1-12)
    #[arg(long, default_value_t = 9)]
    month: u32,

    /// Scope metrics to this year; defaults to the most recent year with
    /// data in the target month
    #[arg(long)]
    year: Option<i32>,

    /// Accounts per ranking
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Emit the report bundle as JSON instead of the terminal report
    #[arg(long)]
    json: bool,
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("{p:.1}%"),
        None => "n/a".to_string(),
    }
}

fn print_segment(seg: &SegmentResult) {
    println!("\n{} ({})", seg.segment.name().to_uppercase(), seg.segment.label());
    println!("{}", "-".repeat(70));
    match seg.year {
        Some(y) => println!("  Scope: month {} of {} (years with data: {:?})", seg.month, y, seg.available_years),
        None => println!("  Scope: month {} (no delivery data in this month)", seg.month),
    }
    println!(
        "  Volume: {:>8}    Pieces: {:>10.0}    Revenue: ${:>12.2}",
        seg.volume, seg.pieces, seg.revenue
    );
    println!(
        "  Gross OTP: {:>6}    Net OTP: {:>6}    (valid {} / controllable {})",
        fmt_pct(seg.otp.gross_pct),
        fmt_pct(seg.otp.net_pct),
        seg.otp.breakdown.valid,
        seg.otp.breakdown.controllable
    );

    if !seg.top_by_volume.is_empty() {
        println!("\n  Top accounts by volume");
        for acc in &seg.top_by_volume {
            let bar = "#".repeat(acc.shipments.min(40) as usize);
            println!("    {:<45} {:>5}  {}", acc.name, acc.shipments, bar);
        }
    }
    if !seg.top_by_revenue.is_empty() {
        println!("\n  Top accounts by revenue");
        for acc in &seg.top_by_revenue {
            println!("    {:<45} ${:>12.2}", acc.name, acc.revenue);
        }
    }
}

fn print_report(bundle: &ReportBundle) {
    println!("\n{}", "=".repeat(70));
    println!("                AMS SEGMENT PERFORMANCE REPORT");
    println!("{}", "=".repeat(70));

    print_segment(&bundle.radiopharma);
    print_segment(&bundle.life_sciences);
    print_segment(&bundle.aviation);

    println!("\nOVERALL (all three segments)");
    println!("{}", "-".repeat(70));
    println!(
        "  Volume: {:>8}    Pieces: {:>10.0}    Revenue: ${:>12.2}",
        bundle.totals.volume, bundle.totals.pieces, bundle.totals.revenue
    );

    if !bundle.unclassified.is_empty() {
        println!("\nUNCLASSIFIED ACCOUNTS (diagnostic)");
        println!("{}", "-".repeat(70));
        for acc in bundle.unclassified.iter().take(15) {
            let flag = if acc.ambiguous { "  [matches both taxonomies]" } else { "" };
            println!("    {:<45} {:>5}{}", acc.name, acc.shipments, flag);
        }
        if bundle.unclassified.len() > 15 {
            println!("    ... and {} more", bundle.unclassified.len() - 15);
        }
    }

    println!("\n{}\n", "=".repeat(70));
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();

    info!("Reading workbook {:?}", args.workbook);
    let mut reader = WorkbookReader::open(&args.workbook)?;

    let opts = ReportOptions { month: args.month, year: args.year, top_n: args.top };
    let classifier = AccountClassifier::default();
    let bundle = build_report(&mut reader, &classifier, &opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_report(&bundle);
    }

    Ok(())
}
