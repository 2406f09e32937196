use anyhow::{Context, Result};
use chrono::Local;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use warehouse_stock::{
    ingest, location_csv_filename, pdf_filename, render_pdf, report_timestamp, rows_to_csv,
    ReportError, AGGREGATE_CSV_FILENAME,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: warehouse-stock <ledger.csv> [output-dir]");
        eprintln!("       Aggregates sellable stock by location and MSKU,");
        eprintln!("       then writes CSV exports and a PDF report.");
        std::process::exit(2);
    }

    let input = Path::new(&args[1]);
    let out_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    run_report(input, &out_dir)
}

fn run_report(input: &Path, out_dir: &Path) -> Result<()> {
    println!("📦 Warehouse Stock Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Ingest the ledger
    println!("\n📂 Reading {}...", input.display());
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

    let aggregate = match ingest(&bytes) {
        Ok(aggregate) => aggregate,
        Err(ReportError::NoSellableRows) => {
            println!("\n⚠️  No SELLABLE items found. Nothing to report.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Summary metrics
    let summary = aggregate.summary();
    println!("✓ Parsed {} aggregated rows", aggregate.rows().len());
    println!("\n📊 Summary");
    println!("   Warehouses:         {}", summary.warehouses);
    println!("   Unique MSKUs:       {}", summary.unique_mskus);
    println!("   Total Sellable Qty: {}", summary.total_sellable);

    println!("\n🏬 Warehouses by sellable total");
    for total in aggregate.location_totals() {
        println!("   {:<30} {}", total.location, total.total);
    }

    // 3. Write artifacts
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    println!("\n💾 Writing exports to {}...", out_dir.display());

    let aggregate_csv = rows_to_csv(aggregate.rows())?;
    let aggregate_path = out_dir.join(AGGREGATE_CSV_FILENAME);
    fs::write(&aggregate_path, aggregate_csv)
        .with_context(|| format!("failed to write {}", aggregate_path.display()))?;
    println!("✓ {}", aggregate_path.display());

    for total in aggregate.location_totals() {
        let rows = aggregate.location_rows(&total.location);
        let path = out_dir.join(location_csv_filename(&total.location));
        fs::write(&path, rows_to_csv(&rows)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("✓ {}", path.display());
    }

    let now = Local::now();
    let pdf_bytes = render_pdf(&aggregate, &report_timestamp(now))?;
    let pdf_path = out_dir.join(pdf_filename(now));
    fs::write(&pdf_path, pdf_bytes)
        .with_context(|| format!("failed to write {}", pdf_path.display()))?;
    println!("✓ {}", pdf_path.display());

    println!("\n✅ Report complete");
    Ok(())
}
