//! mets-overlay - inspect METS structure and ALTO chapter areas

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mets_overlay::feed::{LayoutSource, PageFeed};
use mets_overlay::{
    AreaOptions, ChapterAreaContainer, StructureModel, chapter_ranges, read_structure,
};

#[derive(Parser)]
#[command(name = "mets-overlay")]
#[command(version, about = "Inspect METS structure and ALTO chapter areas", long_about = None)]
#[command(after_help = "EXAMPLES:
    mets-overlay tree mets.xml              Show the chapter tree
    mets-overlay ranges mets.xml log_3      Pages of chapter log_3, e.g. 3-7,9
    mets-overlay areas mets.xml --json      Chapter rectangles for every page")]
struct Cli {
    /// More log output (repeat for more); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chapter tree
    Tree {
        #[arg(value_name = "METS")]
        mets: PathBuf,

        /// Print JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },
    /// Print the page ranges of a chapter and its descendants
    Ranges {
        #[arg(value_name = "METS")]
        mets: PathBuf,

        #[arg(value_name = "CHAPTER_ID")]
        chapter: String,
    },
    /// Compute chapter highlight rectangles from the ALTO files
    Areas {
        #[arg(value_name = "METS")]
        mets: PathBuf,

        /// Directory ALTO hrefs are resolved against (default: the METS file's directory)
        #[arg(long, value_name = "DIR")]
        alto_dir: Option<PathBuf>,

        /// Only this page (primary image href)
        #[arg(long, value_name = "HREF")]
        page: Option<String>,

        /// Padding around chapter boxes as a fraction of the page height
        #[arg(long, default_value_t = AreaOptions::default().padding_ratio)]
        padding: f64,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Command::Tree { mets, json } => show_tree(&mets, json),
        Command::Ranges { mets, chapter } => show_ranges(&mets, &chapter),
        Command::Areas {
            mets,
            alto_dir,
            page,
            padding,
            json,
        } => show_areas(&mets, alto_dir, page.as_deref(), padding, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_model(path: &Path) -> Result<StructureModel, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    read_structure(&bytes).map_err(|e| format!("could not build document structure: {e}"))
}

fn show_tree(path: &Path, json: bool) -> Result<(), String> {
    let model = load_model(path)?;

    if json {
        let out = serde_json::to_string_pretty(&model.to_tree()).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for idx in model.chapters_in_order() {
        let chapter = model.chapter(idx);
        let depth = model.ancestors(idx).count();
        let pages = chapter_ranges(&model, idx);
        println!(
            "{}{} [{}] {}{}",
            "  ".repeat(depth),
            chapter.id,
            chapter.kind,
            chapter.label,
            if pages.is_empty() {
                String::new()
            } else {
                format!(" (pages {pages})")
            }
        );
    }
    println!("Pages: {}", model.images().len());

    Ok(())
}

fn show_ranges(path: &Path, chapter_id: &str) -> Result<(), String> {
    let model = load_model(path)?;
    let chapter = model
        .chapter_by_id(chapter_id)
        .ok_or_else(|| format!("no chapter with id `{chapter_id}`"))?;
    println!("{}", chapter_ranges(&model, chapter));
    Ok(())
}

/// Reads ALTO files from a directory.
struct DirSource {
    root: PathBuf,
}

impl LayoutSource for DirSource {
    fn fetch(&self, alto_href: &str) -> mets_overlay::Result<Vec<u8>> {
        Ok(std::fs::read(self.root.join(alto_href))?)
    }
}

fn show_areas(
    path: &Path,
    alto_dir: Option<PathBuf>,
    only_page: Option<&str>,
    padding: f64,
    json: bool,
) -> Result<(), String> {
    let model = load_model(path)?;
    let mut areas =
        ChapterAreaContainer::with_options(&model, AreaOptions::default().with_padding_ratio(padding));

    let source = DirSource {
        root: alto_dir.unwrap_or_else(|| {
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        }),
    };

    let pages: Vec<_> = model
        .images()
        .iter()
        .filter(|img| only_page.is_none_or(|p| p == img.href))
        .filter_map(|img| Some((img.href.as_str(), img.text_layout_href()?)))
        .collect();

    let feed = PageFeed::new();
    let sender = feed.sender();
    for &(page_id, alto_href) in &pages {
        sender.fetch_and_send(&source, page_id, alto_href);
    }
    let applied = feed.drain_into(&mut areas);
    log::info!("applied {applied} of {} pages", pages.len());

    if json {
        let out: Vec<_> = pages
            .iter()
            .map(|&(page_id, _)| {
                let chapters: Vec<_> = areas
                    .page_areas(page_id)
                    .into_iter()
                    .map(|(chapter, rects)| serde_json::json!({ "chapter": chapter, "rects": rects }))
                    .collect();
                serde_json::json!({ "page": page_id, "chapters": chapters })
            })
            .collect();
        let out = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for &(page_id, _) in &pages {
        println!("{page_id}");
        for (chapter, rects) in areas.page_areas(page_id) {
            for r in rects {
                println!(
                    "  {chapter}: x={:.1} y={:.1} w={:.1} h={:.1}",
                    r.x, r.y, r.width, r.height
                );
            }
        }
    }

    Ok(())
}
