//! METS reader: logical and physical struct maps, file groups, struct links.
//!
//! The reader only collects what the document declares. Resolving ids
//! against each other is the builder's job.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::util::{attr, decode_xml, local_name, normalize_href};

/// A `mets:file` with its first `mets:FLocat` href.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetsFile {
    pub id: String,
    pub href: String,
    pub mime_type: String,
}

/// A `mets:fileGrp` and the files directly in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileGroup {
    /// The group's `USE` attribute, e.g. `MASTER` or `ALTO`.
    pub usage: String,
    pub files: Vec<MetsFile>,
}

/// A `mets:area` below a logical div.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Area {
    pub file_id: String,
    pub begin: Option<String>,
    pub end: Option<String>,
    /// `BETYPE`; only `IDREF` can be resolved.
    pub be_type: Option<String>,
}

/// A div of the logical struct map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicalDiv {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub areas: Vec<Area>,
    pub children: Vec<LogicalDiv>,
}

/// A page div of the physical struct map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalPage {
    pub id: String,
    /// `ORDER`; `None` when absent or not an integer.
    pub order: Option<i64>,
    pub order_label: Option<String>,
    pub content_ids: Option<String>,
    /// `FILEID`s of the page's `mets:fptr`s, in document order.
    pub file_ids: Vec<String>,
}

/// A `mets:smLink` from a logical div to a physical page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLink {
    pub from: String,
    pub to: String,
}

/// Everything the viewer needs from a METS document, unresolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetsDocument {
    /// Root div of the logical struct map.
    pub logical: Option<LogicalDiv>,
    /// Pages of the physical struct map; `None` when the map is missing.
    pub physical: Option<Vec<PhysicalPage>>,
    pub file_groups: Vec<FileGroup>,
    pub links: Vec<StructLink>,
}

impl MetsDocument {
    /// Parse METS from raw bytes, detecting the encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&decode_xml(bytes))
    }

    /// Parse METS from a string.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut state = ReaderState::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => state.open(&e)?,
                Event::Empty(e) => {
                    state.open(&e)?;
                    state.close(local_name(e.name().as_ref()));
                }
                Event::End(e) => state.close(local_name(e.name().as_ref())),
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(state.doc)
    }

    pub fn file_group(&self, usage: &str) -> Option<&FileGroup> {
        self.file_groups.iter().find(|g| g.usage == usage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapKind {
    Logical,
    Physical,
    Other,
}

#[derive(Default)]
struct ReaderState {
    doc: MetsDocument,
    map: Option<MapKind>,
    /// Open logical divs, innermost last.
    logical_stack: Vec<LogicalDiv>,
    /// Div nesting inside the physical map; pages sit at depth 2.
    physical_depth: usize,
    page: Option<PhysicalPage>,
    /// Indices into `doc.file_groups` of the open groups.
    group_stack: Vec<usize>,
    file: Option<MetsFile>,
}

impl ReaderState {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"structMap" => {
                let kind = attr(e, b"TYPE")?.unwrap_or_default();
                self.map = Some(match kind.to_ascii_uppercase().as_str() {
                    "LOGICAL" => MapKind::Logical,
                    "PHYSICAL" => MapKind::Physical,
                    _ => MapKind::Other,
                });
                if self.map == Some(MapKind::Physical) && self.doc.physical.is_none() {
                    self.doc.physical = Some(Vec::new());
                }
            }
            b"div" => match self.map {
                Some(MapKind::Logical) => {
                    let id = attr(e, b"ID")?.unwrap_or_default();
                    let kind = attr(e, b"TYPE")?.unwrap_or_default();
                    let label = match attr(e, b"LABEL")? {
                        Some(label) => label,
                        None => attr(e, b"ORDERLABEL")?.unwrap_or_default(),
                    };
                    self.logical_stack.push(LogicalDiv {
                        id,
                        kind,
                        label,
                        ..Default::default()
                    });
                }
                Some(MapKind::Physical) => {
                    self.physical_depth += 1;
                    if self.physical_depth == 2 {
                        self.page = Some(read_page(e)?);
                    }
                }
                _ => {}
            },
            b"area" => match self.map {
                Some(MapKind::Logical) => {
                    if let Some(div) = self.logical_stack.last_mut() {
                        div.areas.push(Area {
                            file_id: attr(e, b"FILEID")?.unwrap_or_default(),
                            begin: attr(e, b"BEGIN")?,
                            end: attr(e, b"END")?,
                            be_type: attr(e, b"BETYPE")?,
                        });
                    }
                }
                Some(MapKind::Physical) => {
                    if let (Some(page), Some(file_id)) = (self.page.as_mut(), attr(e, b"FILEID")?) {
                        page.file_ids.push(file_id);
                    }
                }
                _ => {}
            },
            b"fptr" if self.map == Some(MapKind::Physical) => {
                if let (Some(page), Some(file_id)) = (self.page.as_mut(), attr(e, b"FILEID")?) {
                    page.file_ids.push(file_id);
                }
            }
            b"fileGrp" => {
                self.doc.file_groups.push(FileGroup {
                    usage: attr(e, b"USE")?.unwrap_or_default(),
                    files: Vec::new(),
                });
                self.group_stack.push(self.doc.file_groups.len() - 1);
            }
            b"file" if !self.group_stack.is_empty() => {
                self.file = Some(MetsFile {
                    id: attr(e, b"ID")?.unwrap_or_default(),
                    href: String::new(),
                    mime_type: attr(e, b"MIMETYPE")?.unwrap_or_default(),
                });
            }
            b"FLocat" => {
                if let Some(file) = self.file.as_mut()
                    && file.href.is_empty()
                    && let Some(href) = attr(e, b"href")?
                {
                    file.href = normalize_href(&href);
                }
            }
            b"smLink" => {
                let from = attr(e, b"from")?.unwrap_or_default();
                let to = attr(e, b"to")?.unwrap_or_default();
                self.doc.links.push(StructLink { from, to });
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"structMap" => self.map = None,
            b"div" => match self.map {
                Some(MapKind::Logical) => {
                    let Some(div) = self.logical_stack.pop() else {
                        return;
                    };
                    if let Some(parent) = self.logical_stack.last_mut() {
                        parent.children.push(div);
                    } else if self.doc.logical.is_none() {
                        self.doc.logical = Some(div);
                    } else {
                        log::warn!("ignoring additional logical root div `{}`", div.id);
                    }
                }
                Some(MapKind::Physical) => {
                    if self.physical_depth == 2
                        && let Some(page) = self.page.take()
                        && let Some(pages) = self.doc.physical.as_mut()
                    {
                        pages.push(page);
                    }
                    self.physical_depth = self.physical_depth.saturating_sub(1);
                }
                _ => {}
            },
            b"fileGrp" => {
                self.group_stack.pop();
            }
            b"file" => {
                if let (Some(file), Some(&group)) = (self.file.take(), self.group_stack.last()) {
                    self.doc.file_groups[group].files.push(file);
                }
            }
            _ => {}
        }
    }
}

fn read_page(e: &BytesStart<'_>) -> Result<PhysicalPage> {
    let id = attr(e, b"ID")?.unwrap_or_default();
    let order = match attr(e, b"ORDER")? {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(order) => Some(order),
            Err(_) => {
                log::warn!("page `{id}` has invalid ORDER `{raw}`; using its position");
                None
            }
        },
        None => None,
    };

    Ok(PhysicalPage {
        id,
        order,
        order_label: attr(e, b"ORDERLABEL")?,
        content_ids: attr(e, b"CONTENTIDS")?,
        file_ids: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const METS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:fileSec>
    <mets:fileGrp USE="MASTER">
      <mets:file ID="master_1" MIMETYPE="image/tiff">
        <mets:FLocat LOCTYPE="URL" xlink:href="img/page%201.tif"/>
      </mets:file>
    </mets:fileGrp>
    <mets:fileGrp USE="ALTO">
      <mets:file ID="alto_1" MIMETYPE="text/xml">
        <mets:FLocat LOCTYPE="URL" xlink:href="alto/page_1.xml"/>
      </mets:file>
    </mets:fileGrp>
  </mets:fileSec>
  <mets:structMap TYPE="LOGICAL">
    <mets:div ID="log_0" TYPE="monograph" LABEL="Book">
      <mets:div ID="log_1" TYPE="chapter" LABEL="One">
        <mets:fptr>
          <mets:seq>
            <mets:area FILEID="alto_1" BEGIN="b1" END="b2" BETYPE="IDREF"/>
          </mets:seq>
        </mets:fptr>
      </mets:div>
      <mets:div ID="log_2" TYPE="chapter" ORDERLABEL="Two"/>
    </mets:div>
  </mets:structMap>
  <mets:structMap TYPE="PHYSICAL">
    <mets:div ID="phys_0" TYPE="physSequence">
      <mets:div ID="phys_1" TYPE="page" ORDER="1" ORDERLABEL="i" CONTENTIDS="urn:nbn:x-1">
        <mets:fptr FILEID="master_1"/>
        <mets:fptr FILEID="alto_1"/>
      </mets:div>
    </mets:div>
  </mets:structMap>
  <mets:structLink>
    <mets:smLink xlink:from="log_1" xlink:to="phys_1"/>
  </mets:structLink>
</mets:mets>"#;

    #[test]
    fn test_parse_file_groups() {
        let doc = MetsDocument::parse(METS).unwrap();
        assert_eq!(doc.file_groups.len(), 2);
        let master = doc.file_group("MASTER").unwrap();
        assert_eq!(master.files[0].id, "master_1");
        assert_eq!(master.files[0].href, "img/page 1.tif");
        assert_eq!(master.files[0].mime_type, "image/tiff");
    }

    #[test]
    fn test_parse_logical_tree() {
        let doc = MetsDocument::parse(METS).unwrap();
        let root = doc.logical.unwrap();
        assert_eq!(root.id, "log_0");
        assert_eq!(root.children.len(), 2);

        let one = &root.children[0];
        assert_eq!(one.label, "One");
        assert_eq!(one.areas.len(), 1);
        assert_eq!(one.areas[0].begin.as_deref(), Some("b1"));
        assert_eq!(one.areas[0].be_type.as_deref(), Some("IDREF"));

        let two = &root.children[1];
        assert_eq!(two.label, "Two");
        assert!(two.children.is_empty());
    }

    #[test]
    fn test_parse_physical_pages_and_links() {
        let doc = MetsDocument::parse(METS).unwrap();
        let pages = doc.physical.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, "phys_1");
        assert_eq!(pages[0].order, Some(1));
        assert_eq!(pages[0].order_label.as_deref(), Some("i"));
        assert_eq!(pages[0].file_ids, ["master_1", "alto_1"]);

        assert_eq!(
            doc.links,
            [StructLink {
                from: "log_1".to_string(),
                to: "phys_1".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_maps_are_none() {
        let doc = MetsDocument::parse("<mets:mets xmlns:mets=\"x\"/>").unwrap();
        assert!(doc.logical.is_none());
        assert!(doc.physical.is_none());
    }

    #[test]
    fn test_unparsable_order_is_ignored() {
        let xml = r#"<mets xmlns:xlink="x"><structMap TYPE="PHYSICAL"><div ID="s">
            <div ID="p1" ORDER="first"/><div ID="p2" ORDER=""/><div ID="p3" ORDER="-2"/>
            </div></structMap></mets>"#;
        let pages = MetsDocument::parse(xml).unwrap().physical.unwrap();
        let orders: Vec<_> = pages.iter().map(|p| p.order).collect();
        assert_eq!(orders, [None, None, Some(-2)]);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(
            MetsDocument::parse("<mets><structMap></mets>"),
            Err(Error::Xml(_))
        ));
    }
}
