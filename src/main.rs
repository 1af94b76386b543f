use chrono::Local;
use clap::Parser;
use quire::{DocumentBuilder, DocumentOptions, Graphics, NameTree, PageSize, PdfError, Value};
use std::fs;
use std::path::PathBuf;

/// Writes a small demo PDF: one diagonal stroke per page and a name tree of
/// page destinations.
#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Write a demo PDF document")]
struct Cli {
    /// Where to write the PDF
    output: PathBuf,

    /// Number of pages to generate
    #[arg(long, default_value = "3")]
    pages: usize,

    /// Page size name (Letter, Legal, A3, A4, A5, Tabloid)
    #[arg(long, default_value = "Letter")]
    page_size: PageSize,

    /// Keep page content streams uncompressed
    #[arg(long)]
    no_compress: bool,

    /// Keep unreachable objects in the output
    #[arg(long)]
    no_compact: bool,

    /// JSON object merged into the document information dictionary
    #[arg(long, value_name = "FILE")]
    info_json: Option<PathBuf>,
}

fn main() -> Result<(), PdfError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = DocumentOptions {
        page_size: cli.page_size,
        compress: !cli.no_compress,
        compact: !cli.no_compact,
        ..DocumentOptions::default()
    };
    if let Some(path) = &cli.info_json {
        options.info = serde_json::from_str(&fs::read_to_string(path)?)?;
    }
    log::debug!("Document options: {:?}", options);

    let mut doc = DocumentBuilder::from_options(options)
        .info("Producer", "quire")
        .info("CreationDate", Local::now())
        .build();
    if cli.pages > 0 {
        doc.attach_name_tree("Dests", NameTree::new(8)?)?;
    }

    for number in 1..=cli.pages {
        let page = doc.start_new_page()?;
        let (width, height) = page.size().dimensions_pt();
        doc.stroke_line((0.0, 0.0), (width, height))?;
        doc.add_name(
            "Dests",
            format!("page-{:04}", number),
            Value::Array(vec![page.dictionary().into(), Value::name("Fit")]),
        )?;
    }

    doc.render_file(&cli.output)?;
    println!(
        "Wrote {} page(s), {} object(s) to {}",
        doc.page_count(),
        doc.store().size(),
        cli.output.display()
    );
    Ok(())
}
