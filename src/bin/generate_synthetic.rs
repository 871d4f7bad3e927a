//! Synthetic workbook generator for the AMS segment report.
//!
//! Writes a directory of per-sheet CSV files (AMS, Americas International
//! Desk, Aviation SVC) that exercises every classification and
//! controllability branch: allow-listed radiopharma accounts, keyword
//! healthcare and aviation accounts, unclassifiable names, off-hub rows,
//! text dates, Excel day-serials and the non-controllable QC causes.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --rows <N>       Rows per sheet (default: 200)
//!   --year <YYYY>    Year the target month falls in (default: 2024)
//!   --month <M>      Target month (default: 9)
//!   --seed <N>       Random seed for reproducibility (optional)
//!   --output <DIR>   Output directory (default: data/synthetic)

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::info;

use ams_otp_report::workbook::{SHEET_AMERICAS, SHEET_AMS, SHEET_AVIATION};

#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic AMS shipment workbook as per-sheet CSVs")]
struct Args {
    /// Rows per sheet
    #[arg(long, default_value_t = 200)]
    rows: usize,

    /// Year the target month falls in
    #[arg(long, default_value_t = 2024)]
    year: i32,

    /// Target month (1-12)
    #[arg(long, default_value_t = 9)]
    month: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = "data/synthetic")]
    output: PathBuf,
}

const RP_POOL: [&str; 5] = [
    "Marken Ltd",
    "QIAGEN GmbH Weekly",
    "Fisher Clinical Services",
    "Patheon Biologics BV",
    "Tosoh Europe",
];

const HEALTHCARE_POOL: [&str; 5] = [
    "Acme Diagnostics BV",
    "Leiden Clinical Labs",
    "Nordic BioSamples AS",
    "Royal Hospital Supplies",
    "Rhine Pharma Trading",
];

const AVIATION_POOL: [&str; 5] = [
    "Lufthansa Cargo",
    "Heathrow Courier Services",
    "Skyline Freight Partners",
    "Atlas Aerospace Parts",
    "Polar Express Forwarding",
];

const OTHER_POOL: [&str; 4] = [
    "Van Dam Furniture",
    "Tulip Trading Co",
    "Rotterdam Steelworks",
    "Zuid Textiles BV",
];

const QC_POOL: [&str; 7] = [
    "",
    "",
    "",
    "Customs Hold",
    "Del Agt late pickup",
    "W/House congestion",
    "Severe weather at hub",
];

const STATIONS: [&str; 6] = ["AMS", "JFK", "LHR", "FRA", "ORD", "NRT"];

struct RowGen<'a> {
    rng: &'a mut StdRng,
    year: i32,
    month: u32,
}

impl RowGen<'_> {
    fn station_pair(&mut self) -> (String, String) {
        // Most rows touch the hub; some deliberately do not, so the office
        // filter has something to drop.
        let other = STATIONS[1..].choose(self.rng).copied().unwrap_or("JFK");
        match self.rng.gen_range(0..10) {
            0 => ("FRA".to_string(), other.to_string()),
            n if n % 2 == 0 => ("AMS".to_string(), other.to_string()),
            _ => (other.to_string(), "AMS".to_string()),
        }
    }

    fn timestamps(&mut self) -> (String, String) {
        // Mostly the target month of the target year, with some spill into
        // the previous year and adjacent months.
        let (year, month) = match self.rng.gen_range(0..10) {
            0 => (self.year - 1, self.month),
            1 => (self.year, if self.month == 1 { 12 } else { self.month - 1 }),
            _ => (self.year, self.month),
        };
        let day = self.rng.gen_range(1..=28);
        let hour = self.rng.gen_range(6..=20);
        let target = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap_or_default();
        // Deliveries cluster around the target: early, on the dot, or late.
        let offset = Duration::minutes(self.rng.gen_range(-180i64..=240));
        let pod = target + offset;

        // A slice of rows stores dates as Excel day-serials instead of text.
        let as_serial = self.rng.gen_range(0..10) == 0;
        let render = |dt: chrono::NaiveDateTime| -> String {
            if as_serial {
                let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap_or_default();
                let days = (dt - epoch).num_seconds() as f64 / 86_400.0;
                format!("{days:.6}")
            } else {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        };
        (render(pod), render(target))
    }

    fn row(&mut self, account: &str) -> Vec<String> {
        let (dep, arr) = self.station_pair();
        let (pod, qdt) = self.timestamps();
        // UPD DEL set on a minority of rows; QDT is the usual target.
        let upd = if self.rng.gen_range(0..5) == 0 { qdt.clone() } else { String::new() };
        let pieces = self.rng.gen_range(1..=12).to_string();
        let charges = format!("{:.2}", self.rng.gen_range(40.0..2500.0));
        let qc = QC_POOL.choose(self.rng).copied().unwrap_or("").to_string();
        // A few rows miss the POD entirely (delivery not confirmed).
        let pod = if self.rng.gen_range(0..20) == 0 { String::new() } else { pod };
        vec![account.to_string(), pieces, charges, dep, arr, pod, upd, qdt, qc]
    }
}

fn write_sheet(
    dir: &Path,
    sheet: &str,
    rows: usize,
    pools: &[&[&str]],
    gen: &mut RowGen<'_>,
) -> Result<()> {
    let path = dir.join(format!("{sheet}.csv"));
    let mut writer = WriterBuilder::new().from_path(&path)?;
    writer.write_record([
        "ACCT NM", "PIECES", "TOTAL CHARGES", "DEP", "ARR", "POD DATE/TIME", "UPD DEL", "QDT", "QC",
    ])?;
    for _ in 0..rows {
        let pool = pools.choose(gen.rng).copied().unwrap_or(&OTHER_POOL[..]);
        let account = pool.choose(gen.rng).copied().unwrap_or("Tulip Trading Co");
        writer.write_record(gen.row(account))?;
    }
    writer.flush()?;
    info!(sheet, rows, path = %path.display(), "sheet written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.output)?;
    let mut gen = RowGen { rng: &mut rng, year: args.year, month: args.month };

    write_sheet(
        &args.output,
        SHEET_AMS,
        args.rows,
        &[&RP_POOL[..], &HEALTHCARE_POOL[..], &AVIATION_POOL[..], &OTHER_POOL[..]],
        &mut gen,
    )?;
    write_sheet(
        &args.output,
        SHEET_AMERICAS,
        args.rows,
        &[&HEALTHCARE_POOL[..], &AVIATION_POOL[..], &OTHER_POOL[..]],
        &mut gen,
    )?;
    write_sheet(
        &args.output,
        SHEET_AVIATION,
        args.rows / 2,
        &[&AVIATION_POOL[..], &OTHER_POOL[..]],
        &mut gen,
    )?;

    info!("synthetic workbook ready at {}", args.output.display());
    println!("Generated synthetic sheets in {}", args.output.display());
    println!("Analyze with: cargo run --bin ams_otp_report -- {} --month {} --year {}",
             args.output.display(), args.month, args.year);

    Ok(())
}
