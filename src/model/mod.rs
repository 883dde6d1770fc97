//! Core data model for document structure.
//!
//! This module contains:
//! - Logical sections ([`StructureChapter`]) with their blocklists
//! - Physical pages ([`StructureImage`]) with primary and secondary hrefs
//! - The finished [`StructureModel`] holding both plus their link tables

mod chapter;
mod image;
mod structure;

pub use chapter::{Additional, BLOCKLIST_KEY, BlockRef, ChapterIdx, StructureChapter};
pub use image::{ImageIdx, StructureImage, href_kind};
pub use structure::{Ancestors, ChapterNode, Descendants, StructureModel};
