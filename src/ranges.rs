//! Page range expressions for chapters (`"3-7,9,12-14"`).

use crate::error::{Error, Result};
use crate::model::{ChapterIdx, ImageIdx, StructureModel};

/// Orders of the pages owned by `chapter` or any of its descendants.
pub fn chapter_pages(model: &StructureModel, chapter: ChapterIdx) -> Vec<u32> {
    model
        .images()
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let owner = model.owning_chapter(ImageIdx(i as u32));
            model.is_descendant_of(owner, chapter)
        })
        .map(|(_, image)| image.order)
        .collect()
}

/// Compact range expression over the pages of a chapter and its descendants.
///
/// A chapter without pages yields an empty string.
pub fn chapter_ranges(model: &StructureModel, chapter: ChapterIdx) -> String {
    format_ranges(&chapter_pages(model, chapter))
}

/// Join ascending page numbers into runs: `[1, 2, 3, 5]` -> `"1-3,5"`.
pub fn format_ranges(pages: &[u32]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut run: Option<(u32, u32)> = None;

    for &page in pages {
        run = match run {
            Some((start, last)) if last.checked_add(1) == Some(page) => Some((start, page)),
            Some(closed) => {
                parts.push(format_run(closed));
                Some((page, page))
            }
            None => Some((page, page)),
        };
    }
    if let Some(closed) = run {
        parts.push(format_run(closed));
    }

    parts.join(",")
}

fn format_run((start, last): (u32, u32)) -> String {
    if start == last {
        start.to_string()
    } else {
        format!("{start}-{last}")
    }
}

/// Parse a range expression into ascending, de-duplicated page numbers.
///
/// Whitespace around parts is ignored; an empty expression is no pages.
/// Pages are 1-based, so `0` and reversed spans are rejected.
pub fn parse_ranges(expr: &str) -> Result<Vec<u32>> {
    let mut pages = Vec::new();
    for part in expr.split(',').map(str::trim) {
        if part.is_empty() {
            if expr.trim().is_empty() {
                continue;
            }
            return Err(Error::InvalidRange(expr.to_string()));
        }

        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (page_number(start, expr)?, page_number(end, expr)?),
            None => {
                let page = page_number(part, expr)?;
                (page, page)
            }
        };
        if start > end {
            return Err(Error::InvalidRange(expr.to_string()));
        }
        pages.extend(start..=end);
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn page_number(raw: &str, expr: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(Error::InvalidRange(expr.to_string())),
    }
}
