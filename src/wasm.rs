//! WASM bindings for browser-based page viewers.
//!
//! A [`Viewer`] holds one document's structure model, its chapter areas and
//! the overlay state. Page layouts are handed in as they are fetched.

use wasm_bindgen::prelude::*;

use crate::alto::AltoLayout;
use crate::areas::ChapterAreaContainer;
use crate::mets::read_structure;
use crate::model::StructureModel;
use crate::overlay::ChapterOverlay;
use crate::ranges::chapter_ranges;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One viewer session over a METS document.
#[wasm_bindgen]
pub struct Viewer {
    model: StructureModel,
    areas: ChapterAreaContainer,
    overlay: ChapterOverlay,
}

#[wasm_bindgen]
impl Viewer {
    /// Build the structure of a METS document.
    ///
    /// Fails when the document structure cannot be built; the page should
    /// then fall back to a plain image view.
    #[wasm_bindgen(constructor)]
    pub fn new(mets: &[u8]) -> Result<Viewer, JsValue> {
        let model = read_structure(mets).map_err(js_error)?;
        let areas = ChapterAreaContainer::new(&model);
        Ok(Viewer {
            model,
            areas,
            overlay: ChapterOverlay::new(),
        })
    }

    /// Chapter tree as JSON.
    #[wasm_bindgen(js_name = structureJson)]
    pub fn structure_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.model.to_tree()).map_err(js_error)
    }

    /// Images in display order as JSON.
    #[wasm_bindgen(js_name = imagesJson)]
    pub fn images_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.model.images()).map_err(js_error)
    }

    /// Range expression of a chapter's pages; empty for unknown chapters.
    #[wasm_bindgen(js_name = chapterRanges)]
    pub fn chapter_ranges(&self, chapter_id: &str) -> String {
        self.model
            .chapter_by_id(chapter_id)
            .map(|idx| chapter_ranges(&self.model, idx))
            .unwrap_or_default()
    }

    /// Add a fetched text layout. Returns `false` for repeated pages.
    #[wasm_bindgen(js_name = addPage)]
    pub fn add_page(&mut self, page_id: &str, alto_href: &str, alto: &[u8]) -> Result<bool, JsValue> {
        let layout = AltoLayout::from_bytes(alto).map_err(js_error)?;
        Ok(self.areas.add_page(page_id, alto_href, &layout))
    }

    /// Chapter areas of a page as JSON: `[{"chapter", "style", "rects"}]`.
    #[wasm_bindgen(js_name = areasJson)]
    pub fn areas_json(&self, page_id: &str) -> Result<String, JsValue> {
        let areas: Vec<_> = self
            .areas
            .page_areas(page_id)
            .into_iter()
            .map(|(chapter, rects)| {
                serde_json::json!({
                    "chapter": chapter,
                    "style": self.overlay.style_of(chapter),
                    "rects": rects,
                })
            })
            .collect();
        serde_json::to_string(&areas).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setChapter)]
    pub fn set_chapter(&mut self, chapter_id: Option<String>) {
        self.overlay.set_chapter(chapter_id.as_deref());
    }

    #[wasm_bindgen(js_name = setHighlightChapter)]
    pub fn set_highlight_chapter(&mut self, chapter_id: Option<String>) {
        self.overlay.set_highlight_chapter(chapter_id.as_deref());
    }

    /// Chapter under a point of a page, if any.
    #[wasm_bindgen(js_name = chapterAt)]
    pub fn chapter_at(&self, page_id: &str, x: f64, y: f64) -> Option<String> {
        self.areas.chapter_at(page_id, x, y).map(str::to_string)
    }
}
