mod error;
mod formats;
mod html;
mod parser;
mod scan;
mod walker;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::CipError;
use crate::formats::{EbookFormat, FileKind};
use crate::parser::{AuthorLinePolicy, CipRecord, ParsePolicy};
use crate::scan::ScanWindows;
use crate::walker::WalkedFile;

#[derive(Parser)]
#[command(name = "cip_scan", about = "Extract CIP catalog records from Chinese ebook files")]
struct Cli {
    /// Ebook file or directory to scan
    path: PathBuf,
    /// Emit records as JSON instead of the text report
    #[arg(long)]
    json: bool,
    /// Max files to process
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Override the per-format front probe window
    #[arg(long)]
    front_window: Option<usize>,
    /// Override the per-format back probe window
    #[arg(long)]
    back_window: Option<usize>,
    /// Fail a file when no author line is found instead of keeping the partial record
    #[arg(long)]
    strict_author: bool,
    /// Always split publisher/date from the line after the title, even when
    /// the title line carries a dash
    #[arg(long)]
    no_dash_reuse: bool,
}

#[derive(Clone, Copy)]
struct ScanOptions {
    policy: ParsePolicy,
    front_window: Option<usize>,
    back_window: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let options = ScanOptions {
        policy: ParsePolicy {
            author_line: if cli.strict_author {
                AuthorLinePolicy::HardFail
            } else {
                AuthorLinePolicy::SoftSuccess
            },
            always_advance_for_publisher: cli.no_dash_reuse,
        },
        front_window: cli.front_window,
        back_window: cli.back_window,
    };

    let mut files = walker::collect_files(&cli.path)?;
    if let Some(limit) = cli.limit {
        files.truncate(limit);
    }
    if files.is_empty() {
        println!("No files found under {}", cli.path.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let outcomes: Vec<(&WalkedFile, FileOutcome)> = files
        .par_iter()
        .map(|file| {
            let outcome = process_file(file, options);
            pb.inc(1);
            (file, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = ScanCounts::default();
    let mut records: Vec<(&Path, CipRecord)> = Vec::new();
    for (file, outcome) in outcomes {
        match outcome {
            FileOutcome::Parsed(record) => {
                counts.parsed += 1;
                records.push((&file.path, record));
            }
            FileOutcome::NoCipPage => counts.no_cip += 1,
            FileOutcome::ParseFailed => counts.parse_failed += 1,
            FileOutcome::ReadFailed => counts.read_failed += 1,
            FileOutcome::Ignored => counts.ignored += 1,
            FileOutcome::Unsupported => counts.unsupported += 1,
        }
    }

    if cli.json {
        let items: Vec<serde_json::Value> = records
            .iter()
            .map(|(path, record)| {
                serde_json::json!({ "file": path.display().to_string(), "record": record })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (path, record) in &records {
            print_record(path, record);
        }
    }
    counts.print();

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

enum FileOutcome {
    Parsed(CipRecord),
    NoCipPage,
    ParseFailed,
    ReadFailed,
    Ignored,
    Unsupported,
}

#[derive(Default)]
struct ScanCounts {
    parsed: usize,
    no_cip: usize,
    parse_failed: usize,
    read_failed: usize,
    ignored: usize,
    unsupported: usize,
}

impl ScanCounts {
    fn print(&self) {
        println!(
            "{} parsed, {} without CIP page, {} parse failures, {} read failures, {} ignored, {} unsupported.",
            self.parsed, self.no_cip, self.parse_failed, self.read_failed, self.ignored, self.unsupported,
        );
    }
}

fn process_file(file: &WalkedFile, options: ScanOptions) -> FileOutcome {
    match file.kind {
        FileKind::Ignored => FileOutcome::Ignored,
        FileKind::Unsupported => FileOutcome::Unsupported,
        FileKind::Ebook(format) => match scan_file(&file.path, format, options) {
            Ok(Some(record)) => FileOutcome::Parsed(record),
            Ok(None) => {
                debug!("no CIP page in {}", file.path.display());
                FileOutcome::NoCipPage
            }
            Err(CipError::Parse(err)) => {
                warn!("CIP parse failed for {}: {}", file.path.display(), err);
                FileOutcome::ParseFailed
            }
            Err(CipError::Format(err)) => {
                warn!("could not read {}: {}", file.path.display(), err);
                FileOutcome::ReadFailed
            }
        },
    }
}

/// Open one ebook, probe its scan windows for the CIP page and extract the
/// record from it. `Ok(None)` is the normal "this book has no CIP page"
/// outcome.
fn scan_file(
    path: &Path,
    format: EbookFormat,
    options: ScanOptions,
) -> Result<Option<CipRecord>, CipError> {
    let mut source = formats::open(path, format)?;
    let pages = source.pages();
    let html_pages = source.html_pages();
    let defaults = source.scan_windows();
    let windows = ScanWindows::new(
        options.front_window.unwrap_or(defaults.front),
        options.back_window.unwrap_or(defaults.back),
    );

    let located = scan::locate_cip_page(pages, windows, |p| source.read_page(p), parser::is_cip_page);
    let Some((page, text)) = located else {
        return Ok(None);
    };
    debug!("CIP page at index {} of {}", page, path.display());

    let record = if html_pages {
        parser::parse_cip_from_html(&text, options.policy)?
    } else {
        parser::parse_cip_from_text(&text, options.policy)?
    };
    Ok(Some(record))
}

fn print_record(path: &Path, record: &CipRecord) {
    println!("== {}", path.display());
    println!("   title:      {}", record.title);
    if !record.original_title.is_empty() {
        println!("   original:   {}", record.original_title);
    }
    if !record.authors.is_empty() {
        println!("   authors:    {}", record.authors.join("; "));
    }
    println!("   publisher:  {}", record.publisher);
    println!("   pubdate:    {}", record.pubdate);
    println!("   isbn:       {}", record.isbn);
    if !record.category_id.is_empty() {
        println!("   category:   {}", record.category_id);
    }
    if !record.cip_id.is_empty() {
        println!("   cip id:     {}", record.cip_id);
    }
    if !record.price.is_empty() {
        println!("   price:      {}", record.price);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
