//! METS structural metadata.
//!
//! Reading happens in two steps: [`MetsDocument`] collects the struct maps,
//! file groups and struct links as declared, then [`StructureModelBuilder`]
//! resolves them into a [`StructureModel`](crate::model::StructureModel).

mod builder;
mod document;

pub use builder::{StructureModelBuilder, StructureOptions};
pub use document::{
    Area, FileGroup, LogicalDiv, MetsDocument, MetsFile, PhysicalPage, StructLink,
};

use crate::error::Result;
use crate::model::StructureModel;

/// Parse METS bytes and build a structure model with default options.
pub fn read_structure(bytes: &[u8]) -> Result<StructureModel> {
    read_structure_with(bytes, StructureOptions::default())
}

/// Parse METS bytes and build a structure model.
pub fn read_structure_with(bytes: &[u8], options: StructureOptions) -> Result<StructureModel> {
    let doc = MetsDocument::from_bytes(bytes)?;
    StructureModelBuilder::new(options).build(&doc)
}
