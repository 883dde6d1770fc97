//! Selection and highlight state for the chapter overlay.
//!
//! Pointer and selection handlers talk to the overlay only through
//! [`ChapterOverlay::set_chapter`], [`ChapterOverlay::set_highlight_chapter`]
//! and the geometry queries; drawing goes through an [`AreaPainter`].

use crate::areas::ChapterAreaContainer;
use crate::geometry::Rect;

/// How a chapter's area is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AreaStyle {
    /// The chapter the reader selected.
    Selected,
    /// The chapter under the pointer.
    Highlighted,
    /// Any other chapter on the page.
    Outline,
}

/// Receives the rectangles to draw for a page.
pub trait AreaPainter {
    fn draw_area(&mut self, chapter_id: &str, rect: &Rect, style: AreaStyle);
}

/// Selected and highlighted chapter of a viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterOverlay {
    selected: Option<String>,
    highlighted: Option<String>,
}

impl ChapterOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chapter(&mut self, chapter_id: Option<&str>) {
        self.selected = chapter_id.map(str::to_string);
    }

    pub fn set_highlight_chapter(&mut self, chapter_id: Option<&str>) {
        self.highlighted = chapter_id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn style_of(&self, chapter_id: &str) -> AreaStyle {
        if self.selected.as_deref() == Some(chapter_id) {
            AreaStyle::Selected
        } else if self.highlighted.as_deref() == Some(chapter_id) {
            AreaStyle::Highlighted
        } else {
            AreaStyle::Outline
        }
    }

    /// Draw every chapter area of a page, outermost chapter first.
    pub fn paint_page(
        &self,
        areas: &ChapterAreaContainer,
        page_id: &str,
        painter: &mut impl AreaPainter,
    ) {
        for (chapter_id, rects) in areas.page_areas(page_id) {
            let style = self.style_of(chapter_id);
            for rect in rects {
                painter.draw_area(chapter_id, rect, style);
            }
        }
    }

    /// Highlight the chapter under the pointer. Returns whether it changed.
    pub fn hover(&mut self, areas: &ChapterAreaContainer, page_id: &str, x: f64, y: f64) -> bool {
        let hit = areas.chapter_at(page_id, x, y);
        if hit == self.highlighted() {
            return false;
        }
        self.set_highlight_chapter(hit);
        true
    }
}
