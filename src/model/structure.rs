//! The finished structure model: chapter tree, image list and link tables.

use std::collections::HashMap;

use super::chapter::{ChapterIdx, StructureChapter};
use super::image::{ImageIdx, StructureImage};

/// Chapter tree, image list and the link tables between them.
///
/// Built by [`crate::mets::StructureModelBuilder`]. Chapters live in an
/// arena addressed by [`ChapterIdx`]; images are in display order and
/// `images()[i].order == i + 1`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructureModel {
    chapters: Vec<StructureChapter>,
    root: ChapterIdx,
    images: Vec<StructureImage>,
    #[cfg_attr(feature = "serde", serde(skip))]
    chapter_by_id: HashMap<String, ChapterIdx>,
    chapter_to_image: HashMap<ChapterIdx, ImageIdx>,
    /// Parallel to `images`: the chapter owning each image.
    image_to_chapter: Vec<ChapterIdx>,
    #[cfg_attr(feature = "serde", serde(skip))]
    image_by_href: HashMap<String, ImageIdx>,
    text_content_present: bool,
}

impl StructureModel {
    pub(crate) fn from_parts(
        chapters: Vec<StructureChapter>,
        chapter_by_id: HashMap<String, ChapterIdx>,
        root: ChapterIdx,
        images: Vec<StructureImage>,
        chapter_to_image: HashMap<ChapterIdx, ImageIdx>,
        image_to_chapter: Vec<ChapterIdx>,
    ) -> Self {
        let image_by_href = images
            .iter()
            .enumerate()
            .map(|(i, img)| (img.href.clone(), ImageIdx(i as u32)))
            .collect();
        let text_content_present = images.iter().any(|img| img.text_layout_href().is_some());

        Self {
            chapters,
            root,
            images,
            chapter_by_id,
            chapter_to_image,
            image_to_chapter,
            image_by_href,
            text_content_present,
        }
    }

    // --- Chapters ---

    pub fn root(&self) -> ChapterIdx {
        self.root
    }

    pub fn chapter(&self, idx: ChapterIdx) -> &StructureChapter {
        &self.chapters[idx.index()]
    }

    pub fn chapter_by_id(&self, id: &str) -> Option<ChapterIdx> {
        self.chapter_by_id.get(id).copied()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn children(&self, idx: ChapterIdx) -> &[ChapterIdx] {
        &self.chapter(idx).children
    }

    pub fn parent(&self, idx: ChapterIdx) -> Option<ChapterIdx> {
        self.chapter(idx).parent
    }

    /// Parent chain from the direct parent up to the root.
    pub fn ancestors(&self, idx: ChapterIdx) -> Ancestors<'_> {
        Ancestors {
            model: self,
            next: self.parent(idx),
        }
    }

    /// `idx` itself followed by all its descendants, in pre-order.
    pub fn descendants(&self, idx: ChapterIdx) -> Descendants<'_> {
        Descendants {
            model: self,
            stack: vec![idx],
        }
    }

    /// True when `idx` is `ancestor` or lies beneath it.
    pub fn is_descendant_of(&self, idx: ChapterIdx, ancestor: ChapterIdx) -> bool {
        idx == ancestor || self.ancestors(idx).any(|a| a == ancestor)
    }

    /// Every chapter in pre-order, starting with the root.
    pub fn chapters_in_order(&self) -> Descendants<'_> {
        self.descendants(self.root)
    }

    // --- Images ---

    pub fn images(&self) -> &[StructureImage] {
        &self.images
    }

    pub fn image(&self, idx: ImageIdx) -> &StructureImage {
        &self.images[idx.index()]
    }

    pub fn image_by_href(&self, href: &str) -> Option<ImageIdx> {
        self.image_by_href.get(href).copied()
    }

    /// Image with the given 1-based order.
    pub fn image_by_order(&self, order: u32) -> Option<ImageIdx> {
        let index = order.checked_sub(1)? as usize;
        (index < self.images.len()).then_some(ImageIdx(index as u32))
    }

    /// Whether any page has a text layout.
    pub fn text_content_present(&self) -> bool {
        self.text_content_present
    }

    // --- Links ---

    /// The image shown for a chapter (thumbnails, "go to chapter").
    pub fn representative_image(&self, chapter: ChapterIdx) -> Option<ImageIdx> {
        self.chapter_to_image.get(&chapter).copied()
    }

    /// Chapters that have a representative image.
    pub fn chapters_with_image(&self) -> impl Iterator<Item = ChapterIdx> + '_ {
        self.chapters_in_order()
            .filter(|c| self.chapter_to_image.contains_key(c))
    }

    /// The most specific chapter linking to an image.
    pub fn owning_chapter(&self, image: ImageIdx) -> ChapterIdx {
        self.image_to_chapter[image.index()]
    }

    /// Chapters whose text appears on the image's page according to their
    /// blocklists, in pre-order.
    pub fn chapters_for_image(&self, image: ImageIdx) -> Vec<ChapterIdx> {
        let Some(href) = self.image(image).text_layout_href() else {
            return Vec::new();
        };
        self.chapters_in_order()
            .filter(|&c| self.chapter(c).blocks_for_href(href).next().is_some())
            .collect()
    }

    /// Nested view of the chapter tree for pickers and JSON output.
    pub fn to_tree(&self) -> ChapterNode {
        self.node(self.root)
    }

    fn node(&self, idx: ChapterIdx) -> ChapterNode {
        let chapter = self.chapter(idx);
        ChapterNode {
            id: chapter.id.clone(),
            kind: chapter.kind.clone(),
            label: chapter.label.clone(),
            image: self
                .representative_image(idx)
                .map(|img| self.image(img).href.clone()),
            children: chapter.children.iter().map(|&c| self.node(c)).collect(),
        }
    }
}

/// Owned, nested copy of one chapter and its subtree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChapterNode {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub label: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub image: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<ChapterNode>,
}

/// Iterator over a chapter's parent chain.
pub struct Ancestors<'a> {
    model: &'a StructureModel,
    next: Option<ChapterIdx>,
}

impl Iterator for Ancestors<'_> {
    type Item = ChapterIdx;

    fn next(&mut self) -> Option<ChapterIdx> {
        let current = self.next?;
        self.next = self.model.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    model: &'a StructureModel,
    stack: Vec<ChapterIdx>,
}

impl Iterator for Descendants<'_> {
    type Item = ChapterIdx;

    fn next(&mut self) -> Option<ChapterIdx> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.model.children(current).iter().rev().copied());
        Some(current)
    }
}
