//! Logical sections of a document.

use std::collections::BTreeMap;

/// Index of a chapter in its model's chapter arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChapterIdx(pub u32);

impl ChapterIdx {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Key under which a chapter's blocklist is stored in its additional data.
pub const BLOCKLIST_KEY: &str = "blocklist";

/// One range of text elements on one page that belongs to a chapter.
///
/// `href` is the resolved text-layout href of the page; `from_id` and
/// `to_id` are element ids inside that layout, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlockRef {
    /// METS `FILEID` the range was declared against.
    pub file_id: String,
    pub href: String,
    pub from_id: String,
    pub to_id: String,
}

/// Extra data attached to a chapter by the reader that produced it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Additional {
    Blocklist(Vec<BlockRef>),
    Text(String),
}

/// A logical section (`mets:div` of the logical struct map).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructureChapter {
    pub id: String,
    /// Section type, e.g. `chapter`, `volume`, `article`.
    pub kind: String,
    pub label: String,
    pub parent: Option<ChapterIdx>,
    pub children: Vec<ChapterIdx>,
    pub additional: BTreeMap<String, Additional>,
}

impl StructureChapter {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: label.into(),
            parent: None,
            children: Vec::new(),
            additional: BTreeMap::new(),
        }
    }

    /// Ranges of text elements belonging to this chapter, in document order.
    pub fn blocklist(&self) -> &[BlockRef] {
        match self.additional.get(BLOCKLIST_KEY) {
            Some(Additional::Blocklist(blocks)) => blocks,
            _ => &[],
        }
    }

    pub(crate) fn push_block(&mut self, block: BlockRef) {
        let entry = self
            .additional
            .entry(BLOCKLIST_KEY.to_string())
            .or_insert_with(|| Additional::Blocklist(Vec::new()));
        if let Additional::Blocklist(blocks) = entry {
            blocks.push(block);
        }
    }

    /// Blocklist entries that target the given text-layout href.
    pub fn blocks_for_href<'a>(&'a self, href: &'a str) -> impl Iterator<Item = &'a BlockRef> + 'a {
        self.blocklist().iter().filter(move |b| b.href == href)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
