extern crate argparse;
extern crate html2doc;
use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};
use html2doc::analyze;
use html2doc::config::{self, MarkMode, RootSelector};
use html2doc::schema::Document;
use std::io;
use std::io::{Read, Write};

fn ingest<R: io::Read>(input: R, root_class: Option<String>, nested: bool) -> html2doc::Result<String> {
    let mut conf = config::ingest();
    if let Some(class) = root_class {
        conf = conf.content_root(RootSelector::Class(class));
    }
    if nested {
        conf = conf.mark_mode(MarkMode::Nested);
    }
    let doc = conf.document_from_read(input)?;
    log::info!(
        "{} blocks, {} words, about {} min",
        doc.content.len(),
        analyze::count_words(&doc),
        analyze::estimate_reading_time(&doc)
    );
    Ok(doc.to_json())
}

fn render<R: io::Read>(mut input: R, class: String) -> html2doc::Result<String> {
    let mut json = String::new();
    input.read_to_string(&mut json)?;
    // Validate strictly so problems are reported, then render leniently.
    if let Err(e) = Document::from_json(&json) {
        log::warn!("{}", e);
    }
    let class = if class.is_empty() { None } else { Some(class.as_str()) };
    Ok(html2doc::render_json(&json, class))
}

fn main() {
    env_logger::init();

    let mut infile: Option<String> = None;
    let mut outfile: Option<String> = None;
    let mut root_class: Option<String> = None;
    let mut class = String::new();
    let mut do_render = false;
    let mut nested = false;

    {
        let mut ap = ArgumentParser::new();
        ap.refer(&mut infile).add_argument(
            "infile",
            StoreOption,
            "Input file (default is standard input)",
        );
        ap.refer(&mut outfile).add_option(
            &["-o", "--output"],
            StoreOption,
            "Output file (default is standard output)",
        );
        ap.refer(&mut do_render).add_option(
            &["-r", "--render"],
            StoreTrue,
            "Render a JSON document to HTML instead of ingesting HTML",
        );
        ap.refer(&mut root_class).add_option(
            &["--root-class"],
            StoreOption,
            "Class of the page's content region",
        );
        ap.refer(&mut nested).add_option(
            &["--nested-marks"],
            StoreTrue,
            "Accumulate marks through nested formatting tags",
        );
        ap.refer(&mut class).add_option(
            &["-c", "--class"],
            Store,
            "CSS class for the wrapping <div> when rendering",
        );
        ap.parse_args_or_exit();
    }

    let translate = |input: &mut dyn io::Read| {
        if do_render {
            render(input, class.clone())
        } else {
            ingest(input, root_class.clone(), nested)
        }
    };

    let result = match infile {
        None => translate(&mut io::stdin().lock()),
        Some(ref name) => match std::fs::File::open(name) {
            Ok(mut file) => translate(&mut file),
            Err(e) => Err(e.into()),
        },
    };
    let data = match result {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match outfile {
        None => {
            println!("{}", data);
        }
        Some(name) => {
            let mut file = std::fs::File::create(name).expect("Tried to create file");
            write!(file, "{}", data).unwrap();
        }
    };
}
