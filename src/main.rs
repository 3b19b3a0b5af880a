//! shiori - list the chapters of an EPUB

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shiori::{Book, ChapterStrategy, ClassifierConfig, ReadOptions};

#[derive(Parser)]
#[command(name = "shiori")]
#[command(version, about = "Split an EPUB into readable chapters", long_about = None)]
#[command(after_help = "EXAMPLES:
    shiori book.epub                 List chapters
    shiori --json book.epub          Print the whole book as JSON
    shiori --toc book.epub           Split at table of contents entries
    shiori --locale de book.epub     Only recognise German chapter words")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Print the book (chapters, markup, cover) as JSON
    #[arg(long)]
    json: bool,

    /// Split chapters at table of contents entries instead of headings
    #[arg(long)]
    toc: bool,

    /// Skip loading the cover image
    #[arg(long)]
    no_cover: bool,

    /// Restrict chapter words to these locales (en, es, fr, it, de)
    #[arg(long = "locale", value_name = "TOKEN")]
    locales: Vec<String>,

    /// Extra short word that never marks a chapter
    #[arg(long = "stop-word", value_name = "WORD")]
    stop_words: Vec<String>,

    /// Show debug diagnostics
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = read_options(cli).map_err(|e| e.to_string())?;
    let book = shiori::open_book_with(&cli.input, &options).map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&book).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_summary(&cli.input, &book);
    }
    Ok(())
}

fn read_options(cli: &Cli) -> shiori::Result<ReadOptions> {
    let mut config = if cli.locales.is_empty() {
        ClassifierConfig::default()
    } else {
        let locales: Vec<&str> = cli.locales.iter().map(String::as_str).collect();
        ClassifierConfig::for_locales(&locales)
    };
    for word in &cli.stop_words {
        config = config.with_stop_word(word.as_str());
    }

    let mut options = ReadOptions::default().with_classifier(config.build()?);
    if cli.no_cover {
        options = options.without_cover();
    }
    if cli.toc {
        options = options.with_strategy(ChapterStrategy::TableOfContents);
    }
    Ok(options)
}

fn print_summary(path: &str, book: &Book) {
    println!("File: {path}");
    println!("Title: {}", book.title);
    println!("Cover: {}", if book.cover.is_some() { "yes" } else { "no" });
    println!("Chapters: {}", book.chapters.len());
    for chapter in &book.chapters {
        println!(
            "  {}\t{}\t({} chars)",
            chapter.id,
            chapter.title,
            chapter.char_count()
        );
    }
}
