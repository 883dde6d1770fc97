//! # mets-overlay
//!
//! Document structure and chapter highlight geometry for digital-library
//! page viewers.
//!
//! ## Features
//!
//! - Build a chapter tree, page list and link tables from METS
//! - Read ALTO text layouts into positioned elements
//! - Compute non-overlapping per-page highlight rectangles for chapters
//! - Compact page range expressions for chapter export and printing
//!
//! ## Quick Start
//!
//! ```no_run
//! use mets_overlay::{AltoLayout, ChapterAreaContainer, chapter_ranges, read_structure};
//!
//! # fn main() -> mets_overlay::Result<()> {
//! let model = read_structure(&std::fs::read("mets.xml")?)?;
//! let mut areas = ChapterAreaContainer::new(&model);
//!
//! for image in model.images() {
//!     if let Some(href) = image.text_layout_href() {
//!         let layout = AltoLayout::from_bytes(&std::fs::read(href)?)?;
//!         areas.add_page(&image.href, href, &layout);
//!     }
//! }
//!
//! let root = model.root();
//! println!("{}: pages {}", model.chapter(root).label, chapter_ranges(&model, root));
//! # Ok(())
//! # }
//! ```

pub mod alto;
pub mod areas;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod mets;
pub mod model;
pub mod overlay;
pub mod ranges;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use alto::{AltoElement, AltoLayout};
pub use areas::{AreaOptions, ChapterAreaContainer};
pub use error::{Error, Result};
pub use geometry::Rect;
pub use mets::{StructureModelBuilder, StructureOptions, read_structure, read_structure_with};
pub use model::{ChapterIdx, ImageIdx, StructureChapter, StructureImage, StructureModel};
pub use overlay::{AreaPainter, AreaStyle, ChapterOverlay};
pub use ranges::{chapter_ranges, parse_ranges};
