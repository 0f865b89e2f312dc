use anyhow::{Context, Result};
use ledger_core::{Cell, LedgerConfig, NormalizedLedger};
use ledger_ingest::{Normalizer, load_and_normalize, read_processed, read_source, write_monthly_files};
use ledger_report::{AnnualReport, SheetSink, publish, write_annual_report};
use std::path::Path;

use crate::dry_run::DryRunSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub upload: bool,
    pub dry_run: bool,
    pub year: Option<i32>,
}

/// Where stage [4] sends the tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadTarget {
    DryRun,
    Spreadsheet,
    /// Real upload asked for, but the binary has no Google client.
    Simulated,
}

impl UploadTarget {
    fn select(dry_run: bool) -> Self {
        if dry_run {
            UploadTarget::DryRun
        } else if cfg!(feature = "gsheets") {
            UploadTarget::Spreadsheet
        } else {
            UploadTarget::Simulated
        }
    }

    fn notice(self) -> Option<&'static str> {
        match self {
            UploadTarget::DryRun => Some("(dry run: nothing is written to the spreadsheet)"),
            UploadTarget::Spreadsheet => None,
            UploadTarget::Simulated => Some(
                "! built without the `gsheets` feature: uploads are simulated, nothing is written to the spreadsheet",
            ),
        }
    }
}

fn rule() {
    println!("{}", "=".repeat(50));
}

/// Normalize, write the enabled local files, then upload.
pub async fn run(config: &LedgerConfig, opts: RunOptions) -> Result<()> {
    rule();
    println!("Household ledger processing");
    rule();

    println!("\n[1] Parsing {}...", config.source.path.display());
    let ledger = load_and_normalize(config)
        .with_context(|| format!("processing {}", config.source.path.display()))?;
    println!("✓ Parsed {} records", ledger.len());
    println!("✓ Members: {}", ledger.participants.join(", "));
    if config.output.write_processed {
        println!("✓ Saved {}", config.output.processed_path().display());
    }
    if config.output.write_monthly {
        let months = write_monthly_files(&ledger, config).context("writing monthly files")?;
        println!("✓ Saved {} monthly files", months.len());
    }

    println!("\n[2] Building annual report...");
    let annual = build_annual_rows(&ledger, config, opts.year)?;
    if let Some((year, rows)) = &annual {
        println!("✓ Annual report for {year} ({} rows)", rows.len());
        if config.output.write_annual_report {
            let path = config.output.annual_path(*year);
            write_annual_report(&path, rows)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("✓ Saved {}", path.display());
        }
    } else {
        println!("(no records, annual report skipped)");
    }

    if !opts.upload {
        return Ok(());
    }

    println!("\n[3] Connecting to spreadsheet '{}'...", config.sheets.document);
    let annual_rows = annual.as_ref().map(|(_, rows)| rows.as_slice());
    let target = UploadTarget::select(opts.dry_run);
    if let Some(notice) = target.notice() {
        println!("{notice}");
    }
    if target == UploadTarget::Spreadsheet {
        upload_remote(&ledger, annual_rows, config).await?;
    } else {
        let mut sink = DryRunSink::new(&config.sheets.document);
        upload(&mut sink, &ledger, annual_rows, config).await?;
    }

    println!();
    rule();
    println!("✓ All done");
    rule();
    Ok(())
}

#[cfg(feature = "gsheets")]
async fn upload_remote(
    ledger: &NormalizedLedger,
    annual_rows: Option<&[Vec<Cell>]>,
    config: &LedgerConfig,
) -> Result<()> {
    let mut sink = crate::google_sheets::GoogleSheetsSink::connect(
        &config.sheets.credentials,
        &config.sheets.document,
    )
    .await
    .context("connecting to Google Sheets")?;
    println!("✓ Authenticated");
    upload(&mut sink, ledger, annual_rows, config).await
}

#[cfg(not(feature = "gsheets"))]
async fn upload_remote(
    _ledger: &NormalizedLedger,
    _annual_rows: Option<&[Vec<Cell>]>,
    _config: &LedgerConfig,
) -> Result<()> {
    anyhow::bail!("spreadsheet uploads need a build with the `gsheets` feature")
}

async fn upload<S: SheetSink>(
    sink: &mut S,
    ledger: &NormalizedLedger,
    annual_rows: Option<&[Vec<Cell>]>,
    config: &LedgerConfig,
) -> Result<()> {
    println!("\n[4] Uploading monthly tabs and annual report...");
    let summary = publish(sink, ledger, annual_rows, config)
        .await
        .context("uploading to spreadsheet")?;
    for (tab, rows) in &summary.tabs {
        println!("✓ {tab}: {rows} rows");
    }
    Ok(())
}

/// `None` when there is nothing to report on and no year was asked for.
fn build_annual_rows(
    ledger: &NormalizedLedger,
    config: &LedgerConfig,
    year: Option<i32>,
) -> Result<Option<(i32, Vec<Vec<Cell>>)>> {
    if ledger.is_empty() && year.is_none() {
        return Ok(None);
    }
    let report = AnnualReport::build(ledger, year).context("building annual report")?;
    Ok(Some((report.year, report.to_rows(&config.labels))))
}

/// Print the annual report table without writing anything.
pub fn print_report(config: &LedgerConfig, year: Option<i32>, from_processed: Option<&Path>) -> Result<()> {
    let ledger = match from_processed {
        Some(path) => read_processed(path, config)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let table = read_source(&config.source.path)
                .with_context(|| format!("reading {}", config.source.path.display()))?;
            Normalizer::new(config)?.normalize(&table)?
        }
    };

    let report = AnnualReport::build(&ledger, year).context("building annual report")?;
    println!("# Annual report {}\n", report.year);
    for row in report.to_rows(&config.labels) {
        let line: Vec<String> = row.iter().map(Cell::to_string).collect();
        println!("{}", line.join("\t").trim_end());
    }
    Ok(())
}
