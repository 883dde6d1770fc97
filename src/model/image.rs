//! Physical pages of a document.

use std::collections::BTreeMap;

/// Index of an image in its model's (filtered, renumbered) image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageIdx(pub u32);

impl ImageIdx {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Purpose keys of [`StructureImage::additional_hrefs`].
pub mod href_kind {
    /// Text layout (ALTO) of the page.
    pub const TEXT_LAYOUT: &str = "AltoHref";
    /// Transcription of the page.
    pub const TRANSCRIPTION: &str = "TEI.TRANSCRIPTION";
    /// Prefix of translation keys; the language code follows.
    pub const TRANSLATION_PREFIX: &str = "TEI.TRANSLATION.";
}

/// One renderable page (`mets:div` of the physical struct map).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructureImage {
    pub id: String,
    /// 1-based display order, dense over the model's image list.
    pub order: u32,
    pub order_label: Option<String>,
    /// Href of the primary image file.
    pub href: String,
    pub mime_type: String,
    /// Secondary files of the page keyed by purpose (see [`href_kind`]).
    pub additional_hrefs: BTreeMap<String, String>,
    /// Raw `CONTENTIDS` value.
    pub content_id: Option<String>,
}

impl StructureImage {
    pub fn text_layout_href(&self) -> Option<&str> {
        self.additional_hrefs
            .get(href_kind::TEXT_LAYOUT)
            .map(String::as_str)
    }

    pub fn transcription_href(&self) -> Option<&str> {
        self.additional_hrefs
            .get(href_kind::TRANSCRIPTION)
            .map(String::as_str)
    }

    /// Translation href for a language code, e.g. `de`.
    pub fn translation_href(&self, lang: &str) -> Option<&str> {
        self.additional_hrefs
            .get(&format!("{}{lang}", href_kind::TRANSLATION_PREFIX))
            .map(String::as_str)
    }

    /// Languages this page has translations for.
    pub fn translation_languages(&self) -> impl Iterator<Item = &str> {
        self.additional_hrefs
            .keys()
            .filter_map(|k| k.strip_prefix(href_kind::TRANSLATION_PREFIX))
    }

    /// The URN among the content ids, if any.
    ///
    /// `CONTENTIDS` is a whitespace separated list of URIs.
    pub fn urn(&self) -> Option<&str> {
        self.content_id
            .as_deref()?
            .split_ascii_whitespace()
            .find(|id| id.starts_with("urn:"))
    }

    /// The label shown to readers: the order label when present, else the order.
    pub fn display_label(&self) -> String {
        match &self.order_label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => self.order.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> StructureImage {
        let mut additional_hrefs = BTreeMap::new();
        additional_hrefs.insert(href_kind::TEXT_LAYOUT.to_string(), "alto/p1.xml".to_string());
        additional_hrefs.insert(
            format!("{}de", href_kind::TRANSLATION_PREFIX),
            "tei/de/p1.xml".to_string(),
        );
        StructureImage {
            id: "phys_1".to_string(),
            order: 3,
            order_label: None,
            href: "img/p1.tif".to_string(),
            mime_type: "image/tiff".to_string(),
            additional_hrefs,
            content_id: Some("https://example.org/p1 urn:nbn:de:0001-p1".to_string()),
        }
    }

    #[test]
    fn test_secondary_hrefs() {
        let image = image();
        assert_eq!(image.text_layout_href(), Some("alto/p1.xml"));
        assert_eq!(image.transcription_href(), None);
        assert_eq!(image.translation_href("de"), Some("tei/de/p1.xml"));
        assert_eq!(image.translation_languages().collect::<Vec<_>>(), ["de"]);
    }

    #[test]
    fn test_urn_and_label() {
        let mut image = image();
        assert_eq!(image.urn(), Some("urn:nbn:de:0001-p1"));
        assert_eq!(image.display_label(), "3");
        image.order_label = Some("iv".to_string());
        assert_eq!(image.display_label(), "iv");
    }
}
