//! Inline METS and ALTO fixtures.

#![allow(dead_code)]

use mets_overlay::Rect;

/// A physical page: METS id, image href and optional ALTO href.
pub struct Page<'a> {
    pub id: &'a str,
    pub image: &'a str,
    pub alto: Option<&'a str>,
}

pub fn page<'a>(id: &'a str, image: &'a str, alto: Option<&'a str>) -> Page<'a> {
    Page { id, image, alto }
}

/// `<mets:area>` referencing the ALTO file of a page.
pub fn area(page_id: &str, begin: &str, end: &str) -> String {
    format!(
        r#"<mets:fptr><mets:seq><mets:area FILEID="alto_{page_id}" BEGIN="{begin}" END="{end}" BETYPE="IDREF"/></mets:seq></mets:fptr>"#
    )
}

/// Build a METS document.
///
/// `logical` is the inner XML of the logical struct map (one root div).
pub fn mets(logical: &str, pages: &[Page<'_>], links: &[(&str, &str)]) -> String {
    let mut master = String::new();
    let mut alto = String::new();
    let mut physical = String::new();

    for (i, p) in pages.iter().enumerate() {
        master.push_str(&format!(
            r#"<mets:file ID="master_{id}" MIMETYPE="image/jpeg"><mets:FLocat LOCTYPE="URL" xlink:href="{href}"/></mets:file>"#,
            id = p.id,
            href = p.image
        ));
        let mut fptrs = format!(r#"<mets:fptr FILEID="master_{}"/>"#, p.id);
        if let Some(href) = p.alto {
            alto.push_str(&format!(
                r#"<mets:file ID="alto_{id}" MIMETYPE="text/xml"><mets:FLocat LOCTYPE="URL" xlink:href="{href}"/></mets:file>"#,
                id = p.id
            ));
            fptrs.push_str(&format!(r#"<mets:fptr FILEID="alto_{}"/>"#, p.id));
        }
        physical.push_str(&format!(
            r#"<mets:div ID="{id}" TYPE="page" ORDER="{order}" ORDERLABEL="[{order}]">{fptrs}</mets:div>"#,
            id = p.id,
            order = i + 1
        ));
    }

    let sm_links: String = links
        .iter()
        .map(|(from, to)| format!(r#"<mets:smLink xlink:from="{from}" xlink:to="{to}"/>"#))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:fileSec>
    <mets:fileGrp USE="MASTER">{master}</mets:fileGrp>
    <mets:fileGrp USE="ALTO">{alto}</mets:fileGrp>
  </mets:fileSec>
  <mets:structMap TYPE="LOGICAL">{logical}</mets:structMap>
  <mets:structMap TYPE="PHYSICAL"><mets:div ID="phys_root" TYPE="physSequence">{physical}</mets:div></mets:structMap>
  <mets:structLink>{sm_links}</mets:structLink>
</mets:mets>"#
    )
}

/// An ALTO page of the given size holding one text block per entry.
pub fn alto(width: f64, height: f64, blocks: &[(&str, Rect)]) -> String {
    let blocks: String = blocks
        .iter()
        .map(|(id, r)| {
            format!(
                r#"<TextBlock ID="{id}" HPOS="{}" VPOS="{}" WIDTH="{}" HEIGHT="{}"/>"#,
                r.x, r.y, r.width, r.height
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v2#">
  <Description><MeasurementUnit>pixel</MeasurementUnit></Description>
  <Layout><Page ID="page" WIDTH="{width}" HEIGHT="{height}"><PrintSpace>{blocks}</PrintSpace></Page></Layout>
</alto>"#
    )
}

pub fn assert_rect_eq(actual: &Rect, expected: &Rect) {
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.width, expected.width)
            && close(actual.height, expected.height),
        "{actual:?} != {expected:?}"
    );
}

/// True when no rectangle of `a` shares area with one of `b`.
pub fn disjoint(a: &[Rect], b: &[Rect]) -> bool {
    a.iter().all(|r| b.iter().all(|s| !r.intersects(s)))
}

// ----------------------------------------------------------------------------
// The nested-chapter book: chapter A on pages 1-2, A.1 on page 2 inside A.
// ----------------------------------------------------------------------------

pub const PAGE_HEIGHT: f64 = 1000.0;

/// Text blocks of page 2: A's text surrounds A.1's block `m`.
pub fn nested_page_blocks() -> Vec<(&'static str, Rect)> {
    vec![
        ("t", Rect::new(100.0, 100.0, 800.0, 100.0)),
        ("l", Rect::new(100.0, 300.0, 100.0, 400.0)),
        ("m", Rect::new(300.0, 300.0, 400.0, 400.0)),
        ("r", Rect::new(800.0, 300.0, 100.0, 400.0)),
        ("b", Rect::new(100.0, 800.0, 800.0, 100.0)),
    ]
}

pub fn nested_book() -> String {
    let logical = format!(
        r#"<mets:div ID="root" TYPE="monograph" LABEL="Book">
             <mets:div ID="A" TYPE="chapter" LABEL="Chapter A">
               {a_p1}{a_p2_top}{a_p2_bottom}
               <mets:div ID="A.1" TYPE="section" LABEL="Section A.1">{a1_p2}</mets:div>
             </mets:div>
             <mets:div ID="B" TYPE="chapter" LABEL="Chapter B"/>
           </mets:div>"#,
        a_p1 = area("p1", "x1", "x1"),
        a_p2_top = area("p2", "t", "l"),
        a_p2_bottom = area("p2", "r", "b"),
        a1_p2 = area("p2", "m", "m"),
    );

    mets(
        &logical,
        &[
            page("p1", "img/1.jpg", Some("alto/1.xml")),
            page("p2", "img/2.jpg", Some("alto/2.xml")),
            page("p3", "img/3.jpg", Some("alto/3.xml")),
        ],
        &[("A.1", "p2"), ("A", "p1"), ("A", "p2"), ("root", "p3")],
    )
}
