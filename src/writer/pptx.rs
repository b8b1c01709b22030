//! PPTX output: a minimal PresentationML package of full-bleed picture slides.
//!
//! The package holds one master, one blank layout and one theme. Each slide
//! carries a single picture at the origin whose extent is the whole slide,
//! so page images are stretched to the canvas regardless of aspect ratio.

use super::{write_atomically, write_package, Parts};
use crate::config::SlideSize;
use crate::error::ConvertError;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// An in-progress deck; slides are kept in insertion order.
#[derive(Debug)]
pub struct SlideDeck {
    size: SlideSize,
    slides: Vec<Vec<u8>>,
}

impl SlideDeck {
    pub fn new(size: SlideSize) -> Self {
        Self {
            size,
            slides: Vec::new(),
        }
    }

    /// Append a slide showing the PNG at `png_path`.
    pub fn add_picture_slide(&mut self, png_path: &Path) -> Result<(), ConvertError> {
        let data = std::fs::read(png_path).map_err(|e| ConvertError::ConversionFailed {
            detail: format!("reading slide image '{}': {e}", png_path.display()),
        })?;
        self.add_picture_bytes(data)
    }

    /// Append a slide showing already-encoded PNG bytes.
    pub fn add_picture_bytes(&mut self, png: Vec<u8>) -> Result<(), ConvertError> {
        if !png.starts_with(PNG_SIGNATURE) {
            return Err(ConvertError::ConversionFailed {
                detail: format!("slide {} image is not a PNG", self.slides.len() + 1),
            });
        }
        debug!("Slide {}: {} bytes", self.slides.len() + 1, png.len());
        self.slides.push(png);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Write the deck to `path`; returns the slide count.
    pub fn write(self, path: &Path) -> Result<usize, ConvertError> {
        let count = self.slides.len();
        let mut parts: Parts = vec![
            ("[Content_Types].xml".into(), content_types(count).into_bytes()),
            ("_rels/.rels".into(), root_rels().into_bytes()),
            (
                "ppt/presentation.xml".into(),
                presentation(count, self.size).into_bytes(),
            ),
            (
                "ppt/_rels/presentation.xml.rels".into(),
                presentation_rels(count).into_bytes(),
            ),
            (
                "ppt/slideMasters/slideMaster1.xml".into(),
                slide_master().into_bytes(),
            ),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
                rels(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                    ("rId2", "theme", "../theme/theme1.xml"),
                ])
                .into_bytes(),
            ),
            (
                "ppt/slideLayouts/slideLayout1.xml".into(),
                blank_layout().into_bytes(),
            ),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).into_bytes(),
            ),
            ("ppt/theme/theme1.xml".into(), theme().into_bytes()),
        ];

        for (i, png) in self.slides.into_iter().enumerate() {
            let n = i + 1;
            let media = format!("../media/image{n}.png");
            parts.push((
                format!("ppt/slides/slide{n}.xml"),
                picture_slide(self.size).into_bytes(),
            ));
            parts.push((
                format!("ppt/slides/_rels/slide{n}.xml.rels"),
                rels(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                    ("rId2", "image", media.as_str()),
                ])
                .into_bytes(),
            ));
            parts.push((format!("ppt/media/image{n}.png"), png));
        }

        write_atomically(path, |file| write_package(file, parts))?;
        info!("Wrote {} ({} slides)", path.display(), count);
        Ok(count)
    }
}

fn content_types(slides: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
        r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
        r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
        r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
    ));
    for n in 1..=slides {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        "{XML_DECL}{}",
        concat!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>"#,
            "</Relationships>"
        )
    )
}

/// A relationships part from `(id, type, target)` triples.
fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        let _ = write!(
            xml,
            r#"<Relationship Id="{id}" Type="{REL_NS}/{kind}" Target="{target}"/>"#
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn presentation(slides: usize, size: SlideSize) -> String {
    let mut xml = String::from(XML_DECL);
    let _ = write!(
        xml,
        r#"<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#
    );
    if slides > 0 {
        xml.push_str("<p:sldIdLst>");
        for i in 0..slides {
            // rId1 is the master, rId2 the theme
            let _ = write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3);
        }
        xml.push_str("</p:sldIdLst>");
    }
    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        size.width_emu, size.height_emu
    );
    xml
}

fn presentation_rels(slides: usize) -> String {
    let mut entries: Vec<(String, &str, String)> = vec![
        (
            "rId1".into(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".into(),
        ),
        ("rId2".into(), "theme", "theme/theme1.xml".into()),
    ];
    for n in 1..=slides {
        entries.push((format!("rId{}", n + 2), "slide", format!("slides/slide{n}.xml")));
    }
    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    rels(&borrowed)
}

const EMPTY_TREE: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster {ns}><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{tree}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        ns = NS,
        tree = EMPTY_TREE
    )
}

fn blank_layout() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout {ns} type="blank" preserve="1"><p:cSld name="Blank">"#,
            "<p:spTree>{tree}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        decl = XML_DECL,
        ns = NS,
        tree = EMPTY_TREE
    )
}

fn picture_slide(size: SlideSize) -> String {
    format!(
        concat!(
            "{decl}",
            "<p:sld {ns}><p:cSld><p:spTree>{tree}",
            "<p:pic><p:nvPicPr>",
            r#"<p:cNvPr id="2" name="Page"/><p:cNvPicPr/><p:nvPr/>"#,
            "</p:nvPicPr>",
            r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            "</p:pic></p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        decl = XML_DECL,
        ns = NS,
        tree = EMPTY_TREE,
        cx = size.width_emu,
        cy = size.height_emu
    )
}

fn theme() -> String {
    let colors = [
        ("dk1", r#"<a:sysClr val="windowText" lastClr="000000"/>"#),
        ("lt1", r#"<a:sysClr val="window" lastClr="FFFFFF"/>"#),
        ("dk2", r#"<a:srgbClr val="44546A"/>"#),
        ("lt2", r#"<a:srgbClr val="E7E6E6"/>"#),
        ("accent1", r#"<a:srgbClr val="4472C4"/>"#),
        ("accent2", r#"<a:srgbClr val="ED7D31"/>"#),
        ("accent3", r#"<a:srgbClr val="A5A5A5"/>"#),
        ("accent4", r#"<a:srgbClr val="FFC000"/>"#),
        ("accent5", r#"<a:srgbClr val="5B9BD5"/>"#),
        ("accent6", r#"<a:srgbClr val="70AD47"/>"#),
        ("hlink", r#"<a:srgbClr val="0563C1"/>"#),
        ("folHlink", r#"<a:srgbClr val="954F72"/>"#),
    ];

    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office">"#);
    for (name, color) in colors {
        let _ = write!(xml, "<a:{name}>{color}</a:{name}>");
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(concat!(
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        "</a:fontScheme>",
        r#"<a:fmtScheme name="Office"><a:fillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        "</a:fillStyleLst><a:lnStyleLst>",
        r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        "</a:lnStyleLst><a:effectStyleLst>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "</a:effectStyleLst><a:bgFillStyleLst>",
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        "</a:bgFillStyleLst></a:fmtScheme>",
        "</a:themeElements></a:theme>"
    ));
    xml
}
