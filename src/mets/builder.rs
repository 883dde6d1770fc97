//! Turns a [`MetsDocument`] into a [`StructureModel`].

use std::collections::{BTreeMap, HashMap, HashSet};

use super::document::{LogicalDiv, MetsDocument, MetsFile, PhysicalPage};
use crate::error::{Error, Result};
use crate::model::{
    BlockRef, ChapterIdx, ImageIdx, StructureChapter, StructureImage, StructureModel, href_kind,
};

/// The only `BETYPE` an area reference may use.
const IDREF: &str = "IDREF";

/// File group names used to classify a document's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureOptions {
    /// Group holding the renderable page images.
    pub primary_group: String,
    pub text_layout_group: String,
    pub transcription_group: String,
    /// Prefix of translation groups; the rest of the `USE` is the language.
    pub translation_prefix: String,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            primary_group: "MASTER".to_string(),
            text_layout_group: "ALTO".to_string(),
            transcription_group: "TEI.TRANSCRIPTION".to_string(),
            translation_prefix: "TEI.TRANSLATION.".to_string(),
        }
    }
}

impl StructureOptions {
    pub fn with_primary_group(mut self, usage: impl Into<String>) -> Self {
        self.primary_group = usage.into();
        self
    }

    pub fn with_text_layout_group(mut self, usage: impl Into<String>) -> Self {
        self.text_layout_group = usage.into();
        self
    }

    pub fn with_transcription_group(mut self, usage: impl Into<String>) -> Self {
        self.transcription_group = usage.into();
        self
    }

    pub fn with_translation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.translation_prefix = prefix.into();
        self
    }

    /// Purpose key for a secondary group, or `None` if the group is not one.
    fn purpose_of(&self, usage: &str) -> Option<String> {
        if usage == self.text_layout_group {
            Some(href_kind::TEXT_LAYOUT.to_string())
        } else if usage == self.transcription_group {
            Some(href_kind::TRANSCRIPTION.to_string())
        } else {
            usage
                .strip_prefix(&self.translation_prefix)
                .filter(|lang| !lang.is_empty())
                .map(|lang| format!("{}{lang}", href_kind::TRANSLATION_PREFIX))
        }
    }
}

/// A secondary file and what it is for.
struct SecondaryFile<'a> {
    purpose: String,
    file: &'a MetsFile,
}

/// Builds a [`StructureModel`] from a parsed METS document.
///
/// ```
/// use mets_overlay::mets::{MetsDocument, StructureModelBuilder};
///
/// # fn main() -> mets_overlay::Result<()> {
/// # let xml = r#"<mets xmlns:xlink="x">
/// #   <fileSec><fileGrp USE="MASTER"><file ID="m1" MIMETYPE="image/jpeg">
/// #     <FLocat xlink:href="p1.jpg"/></file></fileGrp></fileSec>
/// #   <structMap TYPE="LOGICAL"><div ID="log_0" TYPE="monograph" LABEL="Book"/></structMap>
/// #   <structMap TYPE="PHYSICAL"><div ID="seq"><div ID="p1"><fptr FILEID="m1"/></div></div></structMap>
/// #   <structLink><smLink xlink:from="log_0" xlink:to="p1"/></structLink>
/// # </mets>"#;
/// let doc = MetsDocument::parse(xml)?;
/// let model = StructureModelBuilder::default().build(&doc)?;
/// assert_eq!(model.images().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StructureModelBuilder {
    options: StructureOptions,
}

impl StructureModelBuilder {
    pub fn new(options: StructureOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StructureOptions {
        &self.options
    }

    pub fn build(&self, doc: &MetsDocument) -> Result<StructureModel> {
        let logical = doc
            .logical
            .as_ref()
            .ok_or_else(|| Error::MissingElement("logical structMap root div".to_string()))?;
        let pages = doc
            .physical
            .as_ref()
            .ok_or_else(|| Error::MissingElement("physical structMap".to_string()))?;

        // Step 1: file indices
        let primary = doc
            .file_group(&self.options.primary_group)
            .ok_or_else(|| Error::MissingFileGroup(self.options.primary_group.clone()))?;
        let primary_files: HashMap<&str, &MetsFile> =
            primary.files.iter().map(|f| (f.id.as_str(), f)).collect();

        let mut secondary_files: HashMap<&str, SecondaryFile<'_>> = HashMap::new();
        for group in &doc.file_groups {
            let Some(purpose) = self.options.purpose_of(&group.usage) else {
                continue;
            };
            for file in &group.files {
                secondary_files.insert(
                    file.id.as_str(),
                    SecondaryFile {
                        purpose: purpose.clone(),
                        file,
                    },
                );
            }
        }
        let has_text_layout_group = doc.file_group(&self.options.text_layout_group).is_some();

        // Step 2: chapters
        let mut chapters = ChapterArena {
            chapters: Vec::new(),
            by_id: HashMap::new(),
            secondary_files: &secondary_files,
            has_text_layout_group,
        };
        let root = chapters.add(logical, None)?;

        // Step 3: images, in display order. `ORDER` wins over position;
        // ties keep document order.
        let mut keyed: Vec<(i64, StructureImage)> = Vec::with_capacity(pages.len());
        for (position, page) in pages.iter().enumerate() {
            if let Some(image) = self.image_for_page(page, &primary_files, &secondary_files) {
                keyed.push((page.order.unwrap_or(position as i64 + 1), image));
            }
        }
        keyed.sort_by_key(|&(key, _)| key);
        let images: Vec<StructureImage> = keyed
            .into_iter()
            .enumerate()
            .map(|(i, (_, mut image))| {
                image.order = i as u32 + 1;
                image
            })
            .collect();
        let image_by_id: HashMap<&str, usize> = images
            .iter()
            .enumerate()
            .map(|(i, img)| (img.id.as_str(), i))
            .collect();

        // Steps 4 and 5: structure links, strictly in document order
        let mut linker = Linker {
            chapter_to_image: HashMap::new(),
            provisional: HashSet::new(),
            owner: vec![None; images.len()],
        };
        for link in &doc.links {
            let Some(&chapter) = chapters.by_id.get(link.from.as_str()) else {
                log::warn!("skipping structure link from unknown chapter `{}`", link.from);
                continue;
            };
            let Some(&image) = image_by_id.get(link.to.as_str()) else {
                log::warn!("skipping structure link to unknown page `{}`", link.to);
                continue;
            };
            linker.link(&chapters.chapters, &images, chapter, image);
        }

        // Step 6: drop unlinked images and renumber
        let Linker {
            chapter_to_image,
            owner,
            ..
        } = linker;

        let mut new_index: Vec<Option<ImageIdx>> = vec![None; images.len()];
        let mut kept = Vec::new();
        let mut image_to_chapter = Vec::new();
        for (old, (mut image, owner)) in images.into_iter().zip(owner).enumerate() {
            let Some(owner) = owner else {
                log::debug!("dropping page `{}` without a linked chapter", image.id);
                continue;
            };
            image.order = kept.len() as u32 + 1;
            new_index[old] = Some(ImageIdx(kept.len() as u32));
            kept.push(image);
            image_to_chapter.push(owner);
        }

        let chapter_to_image = chapter_to_image
            .into_iter()
            .filter_map(|(chapter, old)| new_index[old].map(|idx| (chapter, idx)))
            .collect();

        log::debug!(
            "built structure model: {} chapters, {} pages",
            chapters.chapters.len(),
            kept.len()
        );

        Ok(StructureModel::from_parts(
            chapters.chapters,
            chapters.by_id,
            root,
            kept,
            chapter_to_image,
            image_to_chapter,
        ))
    }

    fn image_for_page(
        &self,
        page: &PhysicalPage,
        primary_files: &HashMap<&str, &MetsFile>,
        secondary_files: &HashMap<&str, SecondaryFile<'_>>,
    ) -> Option<StructureImage> {
        let Some(master) = page
            .file_ids
            .iter()
            .find_map(|id| primary_files.get(id.as_str()))
        else {
            log::warn!(
                "page `{}` has no file in group {}",
                page.id,
                self.options.primary_group
            );
            return None;
        };

        let mut additional_hrefs = BTreeMap::new();
        for id in &page.file_ids {
            if let Some(secondary) = secondary_files.get(id.as_str()) {
                additional_hrefs
                    .entry(secondary.purpose.clone())
                    .or_insert_with(|| secondary.file.href.clone());
            }
        }

        Some(StructureImage {
            id: page.id.clone(),
            // Assigned once all pages are sorted.
            order: 0,
            order_label: page.order_label.clone(),
            href: master.href.clone(),
            mime_type: master.mime_type.clone(),
            additional_hrefs,
            content_id: page.content_ids.clone(),
        })
    }
}

/// Chapter arena under construction.
struct ChapterArena<'a> {
    chapters: Vec<StructureChapter>,
    by_id: HashMap<String, ChapterIdx>,
    secondary_files: &'a HashMap<&'a str, SecondaryFile<'a>>,
    has_text_layout_group: bool,
}

impl ChapterArena<'_> {
    fn add(&mut self, div: &LogicalDiv, parent: Option<ChapterIdx>) -> Result<ChapterIdx> {
        let idx = ChapterIdx(self.chapters.len() as u32);

        // Divs without an ID cannot be linked; they keep a placeholder id
        // that is not registered for lookup.
        let id = if div.id.is_empty() {
            log::warn!("logical div `{}` has no ID", div.label);
            format!("#{}", idx.0)
        } else {
            if self.by_id.insert(div.id.clone(), idx).is_some() {
                return Err(Error::DuplicateChapter(div.id.clone()));
            }
            div.id.clone()
        };

        let mut chapter = StructureChapter::new(&id, &div.kind, &div.label);
        chapter.parent = parent;
        for area in &div.areas {
            let be_type = area.be_type.as_deref().unwrap_or_default();
            if be_type != IDREF {
                return Err(Error::UnsupportedReference {
                    chapter: id.clone(),
                    kind: be_type.to_string(),
                });
            }
            let Some(file) = self.secondary_files.get(area.file_id.as_str()) else {
                if !self.has_text_layout_group {
                    return Err(Error::MissingFileGroup(format!(
                        "text layout group for `{}`",
                        area.file_id
                    )));
                }
                log::warn!(
                    "chapter `{}` references unknown file `{}`",
                    id,
                    area.file_id
                );
                continue;
            };
            chapter.push_block(BlockRef {
                file_id: area.file_id.clone(),
                href: file.file.href.clone(),
                from_id: area.begin.clone().unwrap_or_default(),
                to_id: area.end.clone().unwrap_or_default(),
            });
        }
        self.chapters.push(chapter);

        for child in &div.children {
            let child_idx = self.add(child, Some(idx))?;
            self.chapters[idx.index()].children.push(child_idx);
        }

        Ok(idx)
    }
}

/// Link tables under construction; image indices are pre-filter positions.
struct Linker {
    chapter_to_image: HashMap<ChapterIdx, usize>,
    /// Chapters whose image was inherited from a child link.
    provisional: HashSet<ChapterIdx>,
    owner: Vec<Option<ChapterIdx>>,
}

impl Linker {
    fn link(
        &mut self,
        chapters: &[StructureChapter],
        images: &[StructureImage],
        chapter: ChapterIdx,
        image: usize,
    ) {
        if let Some(parent) = chapters[chapter.index()].parent
            && !self.chapter_to_image.contains_key(&parent)
        {
            self.chapter_to_image.insert(parent, image);
            self.provisional.insert(parent);
        }

        let replace = match self.chapter_to_image.get(&chapter) {
            None => true,
            Some(&current) => {
                images[current].order > images[image].order || self.provisional.contains(&chapter)
            }
        };
        if replace {
            self.chapter_to_image.insert(chapter, image);
            self.provisional.remove(&chapter);
        }

        self.owner[image].get_or_insert(chapter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mets::document::{Area, FileGroup, StructLink};

    fn file(id: &str, href: &str) -> MetsFile {
        MetsFile {
            id: id.to_string(),
            href: href.to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    fn div(id: &str, children: Vec<LogicalDiv>) -> LogicalDiv {
        LogicalDiv {
            id: id.to_string(),
            kind: "chapter".to_string(),
            label: id.to_string(),
            areas: Vec::new(),
            children,
        }
    }

    fn page(id: &str, master: &str) -> PhysicalPage {
        PhysicalPage {
            id: id.to_string(),
            file_ids: vec![master.to_string()],
            ..Default::default()
        }
    }

    fn link(from: &str, to: &str) -> StructLink {
        StructLink {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Root with children `a` and `b`; `a` has child `a1`; three pages.
    fn document(links: Vec<StructLink>) -> MetsDocument {
        MetsDocument {
            logical: Some(div(
                "root",
                vec![div("a", vec![div("a1", Vec::new())]), div("b", Vec::new())],
            )),
            physical: Some(vec![page("p1", "m1"), page("p2", "m2"), page("p3", "m3")]),
            file_groups: vec![FileGroup {
                usage: "MASTER".to_string(),
                files: vec![file("m1", "1.jpg"), file("m2", "2.jpg"), file("m3", "3.jpg")],
            }],
            links,
        }
    }

    fn rep_href(model: &StructureModel, id: &str) -> Option<String> {
        let chapter = model.chapter_by_id(id)?;
        model
            .representative_image(chapter)
            .map(|img| model.image(img).href.clone())
    }

    #[test]
    fn test_parent_gets_provisional_image_then_direct_link_wins() {
        // a1 -> p2 gives a a provisional p2; the later direct link a -> p3
        // replaces it even though p3 comes after p2.
        let doc = document(vec![link("a1", "p2"), link("a", "p3")]);
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        assert_eq!(rep_href(&model, "a1").as_deref(), Some("2.jpg"));
        assert_eq!(rep_href(&model, "a").as_deref(), Some("3.jpg"));
    }

    #[test]
    fn test_earlier_page_wins_for_direct_links() {
        let doc = document(vec![link("b", "p3"), link("b", "p1"), link("b", "p2")]);
        let model = StructureModelBuilder::default().build(&doc).unwrap();
        assert_eq!(rep_href(&model, "b").as_deref(), Some("1.jpg"));
    }

    #[test]
    fn test_first_writer_owns_image() {
        let doc = document(vec![
            link("a1", "p1"),
            link("a", "p1"),
            link("b", "p2"),
            link("b", "p3"),
        ]);
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        let owner = model.owning_chapter(model.image_by_href("1.jpg").unwrap());
        assert_eq!(model.chapter(owner).id, "a1");
    }

    #[test]
    fn test_unlinked_images_are_dropped_and_renumbered() {
        let doc = document(vec![link("a", "p1"), link("b", "p3")]);
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        let hrefs: Vec<_> = model.images().iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, ["1.jpg", "3.jpg"]);
        let orders: Vec<_> = model.images().iter().map(|i| i.order).collect();
        assert_eq!(orders, [1, 2]);
        assert_eq!(model.image_by_href("2.jpg"), None);
    }

    #[test]
    fn test_explicit_order_overrides_position() {
        let mut doc = document(vec![link("a", "p1"), link("a", "p2"), link("a", "p3")]);
        if let Some(pages) = doc.physical.as_mut() {
            pages[0].order = Some(3);
            pages[1].order = Some(1);
            pages[2].order = Some(2);
        }
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        let hrefs: Vec<_> = model.images().iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, ["2.jpg", "3.jpg", "1.jpg"]);
        assert_eq!(rep_href(&model, "a").as_deref(), Some("2.jpg"));
    }

    #[test]
    fn test_negative_order_sorts_first() {
        let mut doc = document(vec![link("a", "p1"), link("a", "p2"), link("a", "p3")]);
        if let Some(pages) = doc.physical.as_mut() {
            pages[2].order = Some(-2);
        }
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        let pages: Vec<_> = model
            .images()
            .iter()
            .map(|i| (i.href.as_str(), i.order))
            .collect();
        assert_eq!(pages, [("3.jpg", 1), ("1.jpg", 2), ("2.jpg", 3)]);
    }

    #[test]
    fn test_div_without_id_gets_placeholder() {
        let mut doc = document(vec![link("a", "p1")]);
        if let Some(root) = doc.logical.as_mut() {
            root.children.push(div("", vec![div("", Vec::new())]));
        }
        let model = StructureModelBuilder::default().build(&doc).unwrap();

        assert_eq!(model.chapter_count(), 6);
        let ids: Vec<_> = model
            .chapters_in_order()
            .map(|c| model.chapter(c).id.clone())
            .collect();
        assert_eq!(ids[4..], ["#4", "#5"]);
        assert_eq!(model.chapter_by_id("#4"), None);
        assert_eq!(model.chapter_by_id(""), None);
    }

    #[test]
    fn test_missing_primary_group_is_fatal() {
        let mut doc = document(Vec::new());
        doc.file_groups[0].usage = "DEFAULT".to_string();
        assert!(matches!(
            StructureModelBuilder::default().build(&doc),
            Err(Error::MissingFileGroup(_))
        ));

        let model = StructureModelBuilder::new(StructureOptions::default().with_primary_group("DEFAULT"))
            .build(&doc);
        assert!(model.is_ok());
    }

    #[test]
    fn test_unsupported_reference_is_fatal() {
        let mut doc = document(Vec::new());
        doc.file_groups.push(FileGroup {
            usage: "ALTO".to_string(),
            files: vec![file("alto_1", "1.xml")],
        });
        if let Some(root) = doc.logical.as_mut() {
            root.children[1].areas.push(Area {
                file_id: "alto_1".to_string(),
                begin: Some("0".to_string()),
                end: Some("10".to_string()),
                be_type: Some("BYTE".to_string()),
            });
        }
        match StructureModelBuilder::default().build(&doc) {
            Err(Error::UnsupportedReference { chapter, kind }) => {
                assert_eq!(chapter, "b");
                assert_eq!(kind, "BYTE");
            }
            other => panic!("expected unsupported reference, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_chapter_id_is_fatal() {
        let mut doc = document(Vec::new());
        if let Some(root) = doc.logical.as_mut() {
            root.children[1].id = "a".to_string();
        }
        assert!(matches!(
            StructureModelBuilder::default().build(&doc),
            Err(Error::DuplicateChapter(id)) if id == "a"
        ));
    }

    #[test]
    fn test_translation_groups_are_keyed_by_language() {
        let options = StructureOptions::default();
        assert_eq!(
            options.purpose_of("TEI.TRANSLATION.de").as_deref(),
            Some("TEI.TRANSLATION.de")
        );
        assert_eq!(options.purpose_of("ALTO").as_deref(), Some("AltoHref"));
        assert_eq!(options.purpose_of("TEI.TRANSLATION."), None);
        assert_eq!(options.purpose_of("MASTER"), None);
    }
}
