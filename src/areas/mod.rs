//! Chapter highlight areas over page images.
//!
//! [`ChapterAreaContainer`] owns, for every chapter, the rectangles that
//! highlight its text on each page. Pages are added one at a time as their
//! text layouts arrive; each [`add_page`](ChapterAreaContainer::add_page)
//! computes raw rectangles from the chapters' blocklists, cuts overlapping
//! chapters apart and drops pieces that no longer cover any text.

mod resolve;

use std::collections::{HashMap, HashSet};

use crate::alto::AltoLayout;
use crate::geometry::Rect;
use crate::model::{BlockRef, StructureModel};

use resolve::{prune_empty, resolve_overlaps};

/// Tuning for highlight geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOptions {
    /// Padding around each chapter's box, as a fraction of the page height.
    pub padding_ratio: f64,
    /// Upper bound on rectangle differences per page.
    pub max_resolution_steps: usize,
}

impl Default for AreaOptions {
    fn default() -> Self {
        Self {
            padding_ratio: 0.004,
            max_resolution_steps: 4096,
        }
    }
}

impl AreaOptions {
    pub fn with_padding_ratio(mut self, ratio: f64) -> Self {
        self.padding_ratio = ratio;
        self
    }

    pub fn with_max_resolution_steps(mut self, steps: usize) -> Self {
        self.max_resolution_steps = steps;
        self
    }
}

/// Highlight geometry of one chapter on one page.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageAreas {
    pub rects: Vec<Rect>,
    /// Blocklist entries the rectangles were derived from.
    pub blocks: Vec<BlockRef>,
}

/// A chapter's blocklist and its per-page highlight geometry.
#[derive(Debug, Clone, Default)]
pub struct AltoChapter {
    pub id: String,
    blocklist: Vec<BlockRef>,
    /// Keyed by page id.
    pages: HashMap<String, PageAreas>,
}

impl AltoChapter {
    fn new(id: &str, blocklist: &[BlockRef]) -> Self {
        Self {
            id: id.to_string(),
            blocklist: blocklist.to_vec(),
            pages: HashMap::new(),
        }
    }

    pub fn blocklist(&self) -> &[BlockRef] {
        &self.blocklist
    }

    pub fn page(&self, page_id: &str) -> Option<&PageAreas> {
        self.pages.get(page_id)
    }

    /// Ids of the pages this chapter has geometry for.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}

/// Per-chapter highlight rectangles for every page added so far.
///
/// Page ids are the hrefs of the pages' primary images.
#[derive(Debug, Clone, Default)]
pub struct ChapterAreaContainer {
    options: AreaOptions,
    chapters: HashMap<String, AltoChapter>,
    /// Chapters whose blocklists touch a page, in tree pre-order.
    page_chapters: HashMap<String, Vec<String>>,
    processed: HashSet<String>,
}

impl ChapterAreaContainer {
    pub fn new(model: &StructureModel) -> Self {
        Self::with_options(model, AreaOptions::default())
    }

    pub fn with_options(model: &StructureModel, options: AreaOptions) -> Self {
        let chapters: HashMap<String, AltoChapter> = model
            .chapters_in_order()
            .map(|idx| {
                let chapter = model.chapter(idx);
                (chapter.id.clone(), AltoChapter::new(&chapter.id, chapter.blocklist()))
            })
            .collect();

        let linked: Vec<_> = model.chapters_with_image().collect();
        let mut page_chapters: HashMap<String, Vec<String>> = HashMap::new();
        for image in model.images() {
            let Some(href) = image.text_layout_href() else {
                continue;
            };
            let present: Vec<String> = linked
                .iter()
                .map(|&idx| model.chapter(idx))
                .filter(|chapter| chapter.blocks_for_href(href).next().is_some())
                .map(|chapter| chapter.id.clone())
                .collect();
            if !present.is_empty() {
                page_chapters.insert(image.href.clone(), present);
            }
        }

        Self {
            options,
            chapters,
            page_chapters,
            processed: HashSet::new(),
        }
    }

    pub fn options(&self) -> &AreaOptions {
        &self.options
    }

    /// Merge a page's text layout into the chapters present on it.
    ///
    /// Returns `false` without touching anything when the page was already
    /// added, so duplicate or late deliveries are harmless.
    pub fn add_page(&mut self, page_id: &str, alto_href: &str, layout: &AltoLayout) -> bool {
        if !self.processed.insert(page_id.to_string()) {
            log::debug!("page `{page_id}` already added");
            return false;
        }
        let Some(present) = self.page_chapters.get(page_id) else {
            return true;
        };

        let padding = layout.page_height * self.options.padding_ratio;
        let mut rects: Vec<Vec<Rect>> = Vec::with_capacity(present.len());
        let mut content: Vec<Vec<Rect>> = Vec::with_capacity(present.len());
        let mut blocks: Vec<Vec<BlockRef>> = Vec::with_capacity(present.len());

        for id in present {
            let chapter = &self.chapters[id];
            let mut matched = Vec::new();
            let mut used = Vec::new();
            for block in chapter.blocklist.iter().filter(|b| b.href == alto_href) {
                match layout.range(&block.from_id, &block.to_id) {
                    Some(elements) => {
                        matched.extend(elements.iter().map(|e| e.rect));
                        used.push(block.clone());
                    }
                    None => log::debug!(
                        "chapter `{id}`: range {}..{} not in `{alto_href}`",
                        block.from_id,
                        block.to_id
                    ),
                }
            }

            let raw = Rect::bounding(&matched).map(|r| r.padded(padding));
            rects.push(raw.into_iter().collect());
            content.push(matched);
            blocks.push(used);
        }

        if !resolve_overlaps(&mut rects, self.options.max_resolution_steps) {
            log::warn!("page `{page_id}`: overlap resolution incomplete");
        }

        let ids = present.clone();
        for (((id, mut rects), content), blocks) in ids.into_iter().zip(rects).zip(content).zip(blocks) {
            prune_empty(&mut rects, &content);
            if let Some(chapter) = self.chapters.get_mut(&id) {
                chapter
                    .pages
                    .insert(page_id.to_string(), PageAreas { rects, blocks });
            }
        }

        true
    }

    pub fn is_page_processed(&self, page_id: &str) -> bool {
        self.processed.contains(page_id)
    }

    /// Whether any chapter has text on the page.
    pub fn has_chapters(&self, page_id: &str) -> bool {
        self.page_chapters.contains_key(page_id)
    }

    /// Ids of the chapters with text on a page, outermost first.
    pub fn chapters_on_page(&self, page_id: &str) -> &[String] {
        self.page_chapters
            .get(page_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&AltoChapter> {
        self.chapters.get(chapter_id)
    }

    /// Final rectangles of a chapter on a page; empty until the page is added.
    pub fn chapter_areas(&self, chapter_id: &str, page_id: &str) -> &[Rect] {
        self.chapters
            .get(chapter_id)
            .and_then(|c| c.pages.get(page_id))
            .map(|p| p.rects.as_slice())
            .unwrap_or(&[])
    }

    /// Every chapter's rectangles on a page, outermost chapter first.
    pub fn page_areas(&self, page_id: &str) -> Vec<(&str, &[Rect])> {
        self.chapters_on_page(page_id)
            .iter()
            .map(|id| (id.as_str(), self.chapter_areas(id, page_id)))
            .collect()
    }

    /// Innermost chapter whose highlight contains the point.
    pub fn chapter_at(&self, page_id: &str, x: f64, y: f64) -> Option<&str> {
        self.chapters_on_page(page_id)
            .iter()
            .rev()
            .find(|id| {
                self.chapter_areas(id, page_id)
                    .iter()
                    .any(|r| r.contains_point(x, y))
            })
            .map(String::as_str)
    }

    /// Blocklist entries of a chapter that target a text-layout href.
    ///
    /// Unknown chapters yield an empty list.
    pub fn blocklist_of_chapter_and_alto_href(&self, chapter_id: &str, href: &str) -> Vec<&BlockRef> {
        self.chapters
            .get(chapter_id)
            .map(|c| c.blocklist.iter().filter(|b| b.href == href).collect())
            .unwrap_or_default()
    }
}
