//! Fixed package parts of a presentation: content types, relationships,
//! the slide master, its two layouts and the theme.

use crate::style::SlideLayout;

pub(crate) const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const NS_PRESENTATION: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

/// Slide size in EMU (4:3 screen).
pub(crate) const SLIDE_WIDTH: u64 = 9_144_000;
pub(crate) const SLIDE_HEIGHT: u64 = 6_858_000;

/// Position and size of a placeholder in EMU
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub x: u64,
    pub y: u64,
    pub cx: u64,
    pub cy: u64,
}

impl Frame {
    pub(crate) fn xml(&self) -> String {
        format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
    }
}

/// Placeholder geometry of one layout: (title frame, body frame)
pub(crate) fn layout_frames(layout: SlideLayout) -> (Frame, Frame) {
    match layout {
        SlideLayout::Title => (
            Frame { x: 685_800, y: 2_130_425, cx: 7_772_400, cy: 1_470_025 },
            Frame { x: 1_371_600, y: 3_886_200, cx: 6_400_000, cy: 1_752_600 },
        ),
        SlideLayout::TitleAndBody => (
            Frame { x: 457_200, y: 274_638, cx: 8_229_600, cy: 1_143_000 },
            Frame { x: 457_200, y: 1_600_200, cx: 8_229_600, cy: 4_525_963 },
        ),
    }
}

/// Placeholder types for the title and body shapes of a layout
pub(crate) fn placeholder_types(layout: SlideLayout) -> (&'static str, &'static str) {
    match layout {
        SlideLayout::Title => ("ctrTitle", "subTitle"),
        SlideLayout::TitleAndBody => ("title", "body"),
    }
}

/// Index of the layout part (`slideLayoutN.xml`) used for a layout
pub(crate) fn layout_index(layout: SlideLayout) -> usize {
    match layout {
        SlideLayout::Title => 1,
        SlideLayout::TitleAndBody => 2,
    }
}

fn relationships(entries: &[(String, &str, String)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_HEADER, NS_RELATIONSHIPS);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

pub(crate) fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        concat!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{}"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="{}"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        ),
        XML_HEADER, CT_SLIDE_LAYOUT, CT_SLIDE_LAYOUT
    );
    for number in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            number, CT_SLIDE
        ));
    }
    xml.push_str("</Types>");
    xml
}

pub(crate) fn package_relationships() -> String {
    relationships(&[
        ("rId1".to_string(), REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string()),
        ("rId2".to_string(), REL_CORE_PROPERTIES, "docProps/core.xml".to_string()),
        ("rId3".to_string(), REL_EXTENDED_PROPERTIES, "docProps/app.xml".to_string()),
    ])
}

pub(crate) fn core_properties(title: &str, creator: &str) -> String {
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>{}</dc:creator>",
            "</cp:coreProperties>"
        ),
        XML_HEADER, title, creator
    )
}

pub(crate) fn app_properties(application: &str, slide_count: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{}</Application><Slides>{}</Slides>",
            "</Properties>"
        ),
        XML_HEADER, application, slide_count
    )
}

/// `rId1` is the master, `rId2` the theme, slides follow from `rId3`.
pub(crate) fn presentation(slide_count: usize) -> String {
    let slide_ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 3 + i))
        .collect();
    format!(
        concat!(
            "{}<p:presentation {} saveSubsetFonts=\"1\">",
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{}</p:sldIdLst>",
            r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/>"#,
            r#"<p:notesSz cx="{}" cy="{}"/>"#,
            "</p:presentation>"
        ),
        XML_HEADER, NS_PRESENTATION, slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
    )
}

pub(crate) fn presentation_relationships(slide_count: usize) -> String {
    let mut entries = vec![
        ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for i in 0..slide_count {
        entries.push((format!("rId{}", 3 + i), REL_SLIDE, format!("slides/slide{}.xml", i + 1)));
    }
    relationships(&entries)
}

const EMPTY_TREE: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    "<p:grpSpPr/>"
);

pub(crate) fn group_header() -> &'static str {
    EMPTY_TREE
}

pub(crate) fn slide_master() -> String {
    format!(
        concat!(
            "{}<p:sldMaster {}>",
            "<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            "<p:sldLayoutIdLst>",
            r#"<p:sldLayoutId id="2147483649" r:id="rId1"/>"#,
            r#"<p:sldLayoutId id="2147483650" r:id="rId2"/>"#,
            "</p:sldLayoutIdLst>",
            "</p:sldMaster>"
        ),
        XML_HEADER, NS_PRESENTATION, EMPTY_TREE
    )
}

pub(crate) fn slide_master_relationships() -> String {
    relationships(&[
        ("rId1".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
        ("rId2".to_string(), REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml".to_string()),
        ("rId3".to_string(), REL_THEME, "../theme/theme1.xml".to_string()),
    ])
}

fn layout_placeholder(id: u32, name: &str, ph: &str, idx: Option<u32>, frame: Frame) -> String {
    let idx_attr = idx.map(|i| format!(r#" idx="{}""#, i)).unwrap_or_default();
    format!(
        concat!(
            "<p:sp><p:nvSpPr>",
            r#"<p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
            r#"<p:nvPr><p:ph type="{}"{}/></p:nvPr>"#,
            "</p:nvSpPr><p:spPr>{}</p:spPr>",
            "<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody>",
            "</p:sp>"
        ),
        id, name, ph, idx_attr, frame.xml()
    )
}

pub(crate) fn slide_layout(layout: SlideLayout) -> String {
    let (title_frame, body_frame) = layout_frames(layout);
    let (title_ph, body_ph) = placeholder_types(layout);
    let (kind, name) = match layout {
        SlideLayout::Title => ("title", "Title Slide"),
        SlideLayout::TitleAndBody => ("obj", "Title and Content"),
    };
    format!(
        concat!(
            "{}<p:sldLayout {} type=\"{}\" preserve=\"1\">",
            "<p:cSld name=\"{}\"><p:spTree>{}{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        XML_HEADER,
        NS_PRESENTATION,
        kind,
        name,
        EMPTY_TREE,
        layout_placeholder(2, "Title 1", title_ph, None, title_frame),
        layout_placeholder(3, "Text Placeholder 2", body_ph, Some(1), body_frame),
    )
}

pub(crate) fn slide_layout_relationships() -> String {
    relationships(&[(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".to_string(),
    )])
}

pub(crate) fn slide_relationships(layout: SlideLayout) -> String {
    relationships(&[(
        "rId1".to_string(),
        REL_SLIDE_LAYOUT,
        format!("../slideLayouts/slideLayout{}.xml", layout_index(layout)),
    )])
}

fn solid_fill(color: &str) -> String {
    format!(r#"<a:solidFill><a:schemeClr val="{}"/></a:solidFill>"#, color)
}

pub(crate) fn theme() -> String {
    let colors = [
        ("dk1", r#"<a:sysClr val="windowText" lastClr="000000"/>"#.to_string()),
        ("lt1", r#"<a:sysClr val="window" lastClr="FFFFFF"/>"#.to_string()),
        ("dk2", r#"<a:srgbClr val="1F497D"/>"#.to_string()),
        ("lt2", r#"<a:srgbClr val="EEECE1"/>"#.to_string()),
        ("accent1", r#"<a:srgbClr val="2E86C1"/>"#.to_string()),
        ("accent2", r#"<a:srgbClr val="C0504D"/>"#.to_string()),
        ("accent3", r#"<a:srgbClr val="9BBB59"/>"#.to_string()),
        ("accent4", r#"<a:srgbClr val="8064A2"/>"#.to_string()),
        ("accent5", r#"<a:srgbClr val="4BACC6"/>"#.to_string()),
        ("accent6", r#"<a:srgbClr val="F79646"/>"#.to_string()),
        ("hlink", r#"<a:srgbClr val="0000FF"/>"#.to_string()),
        ("folHlink", r#"<a:srgbClr val="800080"/>"#.to_string()),
    ];
    let color_scheme: String = colors
        .iter()
        .map(|(name, value)| format!("<a:{0}>{1}</a:{0}>", name, value))
        .collect();

    let font = |typeface: &str| {
        format!(
            r#"<a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface="Arial"/>"#,
            typeface
        )
    };
    let fill = solid_fill("phClr");
    let line = |width: u32| {
        format!(r#"<a:ln w="{}" cap="flat" cmpd="sng" algn="ctr">{}<a:prstDash val="solid"/></a:ln>"#, width, fill)
    };
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        concat!(
            "{}",
            r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Clinic">"#,
            "<a:themeElements>",
            r#"<a:clrScheme name="Clinic">{}</a:clrScheme>"#,
            r#"<a:fontScheme name="Clinic"><a:majorFont>{}</a:majorFont><a:minorFont>{}</a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="Clinic">"#,
            "<a:fillStyleLst>{}{}{}</a:fillStyleLst>",
            "<a:lnStyleLst>{}{}{}</a:lnStyleLst>",
            "<a:effectStyleLst>{}{}{}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{}{}{}</a:bgFillStyleLst>",
            "</a:fmtScheme>",
            "</a:themeElements>",
            "<a:objectDefaults/><a:extraClrSchemeLst/>",
            "</a:theme>"
        ),
        XML_HEADER,
        color_scheme,
        font("Calibri"),
        font("Calibri"),
        fill, fill, fill,
        line(9525), line(25400), line(38100),
        effect, effect, effect,
        fill, fill, fill,
    )
}
