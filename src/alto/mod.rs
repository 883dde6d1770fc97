//! ALTO text layouts.
//!
//! A layout is reduced to what highlight geometry needs: the page size and
//! a flat, document-ordered list of every positioned element with an `ID`.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::util::{attr, decode_xml, local_name};

/// Unit of the layout's coordinates (`MeasurementUnit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MeasurementUnit {
    #[default]
    Pixel,
    /// 1/10 mm.
    Mm10,
    /// 1/1200 inch.
    Inch1200,
}

impl MeasurementUnit {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pixel" => Some(Self::Pixel),
            "mm10" => Some(Self::Mm10),
            "inch1200" => Some(Self::Inch1200),
            _ => None,
        }
    }
}

/// Kind of a positioned ALTO element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElementKind {
    TextBlock,
    TextLine,
    String,
    Illustration,
    GraphicalElement,
    ComposedBlock,
}

impl ElementKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"TextBlock" => Some(Self::TextBlock),
            b"TextLine" => Some(Self::TextLine),
            b"String" => Some(Self::String),
            b"Illustration" => Some(Self::Illustration),
            b"GraphicalElement" => Some(Self::GraphicalElement),
            b"ComposedBlock" => Some(Self::ComposedBlock),
            _ => None,
        }
    }
}

/// A positioned element of the layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AltoElement {
    pub id: String,
    pub kind: ElementKind,
    pub rect: Rect,
    /// `CONTENT` of `String` elements.
    pub content: Option<String>,
}

/// Text layout of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AltoLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub unit: MeasurementUnit,
    elements: Vec<AltoElement>,
    index: HashMap<String, usize>,
}

impl AltoLayout {
    /// Build a layout from elements in document order.
    ///
    /// When an id repeats, lookups resolve to its first occurrence.
    pub fn new(page_width: f64, page_height: f64, elements: Vec<AltoElement>) -> Self {
        let mut index = HashMap::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            index.entry(element.id.clone()).or_insert(i);
        }
        Self {
            page_width,
            page_height,
            unit: MeasurementUnit::Pixel,
            elements,
            index,
        }
    }

    /// Parse ALTO from raw bytes, detecting the encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&decode_xml(bytes))
    }

    /// Parse ALTO from a string. Only the first `Page` is read.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut page_size: Option<(f64, f64)> = None;
        let mut unit = MeasurementUnit::Pixel;
        let mut in_unit = false;
        let mut pages_seen = 0usize;
        let mut elements = Vec::new();

        loop {
            let (e, empty) = match reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(e) => {
                    if local_name(e.name().as_ref()) == b"MeasurementUnit" {
                        in_unit = false;
                    }
                    continue;
                }
                Event::Text(t) => {
                    if in_unit {
                        let raw = String::from_utf8_lossy(t.as_ref());
                        match MeasurementUnit::parse(&raw) {
                            Some(parsed) => unit = parsed,
                            None => log::warn!("unknown ALTO measurement unit `{raw}`"),
                        }
                    }
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            let name = e.name();
            let local = local_name(name.as_ref());
            match local {
                b"MeasurementUnit" => in_unit = !empty,
                b"Page" => {
                    pages_seen += 1;
                    if pages_seen == 1 {
                        let width = number(&e, b"WIDTH")?;
                        let height = number(&e, b"HEIGHT")?;
                        if let (Some(width), Some(height)) = (width, height) {
                            page_size = Some((width, height));
                        }
                    }
                }
                _ if pages_seen > 1 => {}
                _ => {
                    if let Some(kind) = ElementKind::from_local_name(local)
                        && let Some(element) = read_element(&e, kind)?
                    {
                        elements.push(element);
                    }
                }
            }
        }

        let (page_width, page_height) = page_size.unwrap_or_else(|| {
            let bounds = Rect::bounding(elements.iter().map(|e: &AltoElement| &e.rect));
            bounds.map(|b| (b.right(), b.bottom())).unwrap_or((0.0, 0.0))
        });

        let mut layout = Self::new(page_width, page_height, elements);
        layout.unit = unit;
        Ok(layout)
    }

    /// Every positioned element, in document order.
    pub fn elements(&self) -> &[AltoElement] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&AltoElement> {
        self.position(id).map(|i| &self.elements[i])
    }

    /// Position of an element in [`elements`](Self::elements).
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Elements from `from_id` to `to_id`, both inclusive.
    ///
    /// Endpoints given in reverse document order are swapped. Returns `None`
    /// when either id is not in the layout.
    pub fn range(&self, from_id: &str, to_id: &str) -> Option<&[AltoElement]> {
        let from = self.position(from_id)?;
        let to = self.position(to_id)?;
        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        Some(&self.elements[start..=end])
    }
}

fn number(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<f64>> {
    let Some(raw) = attr(e, name)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::InvalidAttribute {
            element: String::from_utf8_lossy(local_name(e.name().as_ref())).into_owned(),
            name: String::from_utf8_lossy(name).into_owned(),
            value: raw,
        })
}

fn read_element(e: &BytesStart<'_>, kind: ElementKind) -> Result<Option<AltoElement>> {
    let Some(id) = attr(e, b"ID")? else {
        return Ok(None);
    };
    let (Some(x), Some(y), Some(width), Some(height)) = (
        number(e, b"HPOS")?,
        number(e, b"VPOS")?,
        number(e, b"WIDTH")?,
        number(e, b"HEIGHT")?,
    ) else {
        log::debug!("ALTO element `{id}` has no complete geometry");
        return Ok(None);
    };
    let content = match kind {
        ElementKind::String => attr(e, b"CONTENT")?,
        _ => None,
    };

    Ok(Some(AltoElement {
        id,
        kind,
        rect: Rect::new(x, y, width, height),
        content,
    }))
}
