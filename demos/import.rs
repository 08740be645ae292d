extern crate argparse;
extern crate html2doc;
use argparse::{ArgumentParser, Store, StoreOption};
use html2doc::config::{self, RootSelector};
use html2doc::ingest::batch::{ImportOptions, ImportRecord, Importer};
use html2doc::Error;
use std::path::Path;
use std::time::Duration;

/// Treat each record's URL as a path under `base`.
fn read_page(base: &Path, url: &str) -> html2doc::Result<String> {
    let path = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    std::fs::read_to_string(base.join(path)).map_err(|e| Error::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn main() {
    env_logger::init();

    let mut records_file = String::new();
    let mut base = String::from(".");
    let mut delay_ms: u64 = 1000;
    let mut root_class: Option<String> = None;

    {
        let mut ap = ArgumentParser::new();
        ap.refer(&mut records_file)
            .add_argument(
                "records",
                Store,
                "JSON file holding a list of {url, metadata} records",
            )
            .required();
        ap.refer(&mut base).add_option(
            &["-b", "--base"],
            Store,
            "Directory the page URLs are resolved against (default .)",
        );
        ap.refer(&mut delay_ms).add_option(
            &["-d", "--delay"],
            Store,
            "Milliseconds to wait between pages (default 1000)",
        );
        ap.refer(&mut root_class).add_option(
            &["--root-class"],
            StoreOption,
            "Class of the pages' content region",
        );
        ap.parse_args_or_exit();
    }

    let records: Vec<ImportRecord> = match std::fs::read_to_string(&records_file)
        .map_err(Error::from)
        .and_then(|json| serde_json::from_str(&json).map_err(Error::from))
    {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{}: {}", records_file, e);
            std::process::exit(1);
        }
    };

    let mut conf = config::ingest();
    if let Some(class) = root_class {
        conf = conf.content_root(RootSelector::Class(class));
    }
    let base = Path::new(&base);
    let report = Importer::new(|url: &str| read_page(base, url))
        .with_config(conf)
        .with_options(ImportOptions {
            delay: Duration::from_millis(delay_ms),
        })
        .run(&records);

    println!(
        "{}",
        serde_json::to_string_pretty(&report.articles).expect("articles serialize")
    );
    eprintln!(
        "imported {}, failed {}, skipped {}",
        report.imported(),
        report.failed(),
        report.skipped()
    );
    for slug in &report.needs_review {
        eprintln!("needs review (no content): {}", slug);
    }
    for failure in &report.failures {
        eprintln!("failed: {}: {}", failure.url, failure.message);
    }
}
