//! PPTX serialization.
//!
//! A PPTX file is a zip of XML parts. We emit a minimal package: one master
//! with a blank layout and theme, then the slides and their images under
//! `ppt/media/`.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tracing::info;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::deck::{Deck, Frame, Paragraph, Picture, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU, Shape, Slide, TextBox};
use crate::error::AppError;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const FONT_FACE: &str = "Calibri";

/// Write `deck` to `path`, replacing any existing file.
pub fn write_pptx(deck: &Deck, path: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create presentation '{}'", path.display()), e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut put = |name: &str, bytes: &[u8]| -> Result<(), AppError> {
        zip.start_file(name, options).map_err(|e| AppError::package(path, e))?;
        zip.write_all(bytes)
            .map_err(|e| AppError::io(format!("Failed to write '{name}' into '{}'", path.display()), e))
    };

    let n = deck.slides.len();
    put("[Content_Types].xml", content_types(n).as_bytes())?;
    put("_rels/.rels", root_rels().as_bytes())?;
    put("docProps/app.xml", app_props(n).as_bytes())?;
    put("docProps/core.xml", core_props(deck).as_bytes())?;
    put("ppt/presentation.xml", presentation(n).as_bytes())?;
    put("ppt/_rels/presentation.xml.rels", presentation_rels(n).as_bytes())?;
    put("ppt/presProps.xml", pres_props().as_bytes())?;
    put("ppt/viewProps.xml", view_props().as_bytes())?;
    put("ppt/tableStyles.xml", table_styles().as_bytes())?;
    put("ppt/theme/theme1.xml", theme().as_bytes())?;
    put("ppt/slideMasters/slideMaster1.xml", slide_master().as_bytes())?;
    put("ppt/slideMasters/_rels/slideMaster1.xml.rels", slide_master_rels().as_bytes())?;
    put("ppt/slideLayouts/slideLayout1.xml", slide_layout().as_bytes())?;
    put("ppt/slideLayouts/_rels/slideLayout1.xml.rels", slide_layout_rels().as_bytes())?;

    let mut image_count = 0usize;
    for (idx, slide) in deck.slides.iter().enumerate() {
        let mut media = Vec::new();
        for picture in pictures(slide) {
            image_count += 1;
            let name = format!("image{image_count}.png");
            let bytes = fs::read(&picture.image).map_err(|e| {
                AppError::io(format!("Failed to read chart image '{}'", picture.image.display()), e)
            })?;
            put(&format!("ppt/media/{name}"), &bytes)?;
            media.push(name);
        }

        let number = idx + 1;
        put(&format!("ppt/slides/slide{number}.xml"), slide_xml(slide).as_bytes())?;
        put(
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            slide_rels(&media).as_bytes(),
        )?;
    }

    zip.finish().map_err(|e| AppError::package(path, e))?;
    info!(path = %path.display(), slides = n, images = image_count, "wrote presentation");
    Ok(())
}

fn pictures(slide: &Slide) -> impl Iterator<Item = &Picture> {
    slide.shapes.iter().filter_map(|s| match s {
        Shape::Picture(p) => Some(p),
        Shape::Text(_) => None,
    })
}

fn content_types(slides: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/ppt/presProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"/><Override PartName="/ppt/viewProps.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"/><Override PartName="/ppt/tableStyles.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for i in 1..=slides {
        out.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>hrdash</Application><PresentationFormat>Widescreen</PresentationFormat><Slides>{slides}</Slides></Properties>"#
    )
}

fn core_props(deck: &Deck) -> String {
    let created = deck.generated_at.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>hrdash</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified></cp:coreProperties>"#,
        escape(&deck.title)
    )
}

fn presentation(slides: usize) -> String {
    let ids: String = (1..=slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 1))
        .collect();
    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle/></p:presentation>"#
    )
}

/// rId1 = master, rId2..=rId(n+1) = slides, then props and theme.
fn presentation_rels(slides: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#
    );
    for i in 1..=slides {
        out.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_BASE}/slide" Target="slides/slide{i}.xml"/>"#,
            i + 1
        ));
    }
    let next = slides + 2;
    out.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{REL_BASE}/presProps" Target="presProps.xml"/><Relationship Id="rId{}" Type="{REL_BASE}/viewProps" Target="viewProps.xml"/><Relationship Id="rId{}" Type="{REL_BASE}/theme" Target="theme/theme1.xml"/><Relationship Id="rId{}" Type="{REL_BASE}/tableStyles" Target="tableStyles.xml"/></Relationships>"#,
        next,
        next + 1,
        next + 2,
        next + 3
    ));
    out
}

fn pres_props() -> String {
    format!(r#"{XML_DECL}<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#)
}

fn view_props() -> String {
    format!(
        r#"{XML_DECL}<p:viewPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#
    )
}

fn table_styles() -> String {
    format!(r#"{XML_DECL}<a:tblStyleLst xmlns:a="{NS_A}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#)
}

fn theme() -> String {
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = fill.repeat(3);
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{w}">{fill}</a:ln>"#))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);
    format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="{FONT_FACE}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
    )
}

fn empty_group() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#,
        empty_group()
    )
}

fn slide_master_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL_BASE}/theme" Target="../theme/theme1.xml"/></Relationships>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        empty_group()
    )
}

fn slide_layout_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
    )
}

/// rId1 = layout, rId2.. = images in shape order.
fn slide_rels(media: &[String]) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#
    );
    for (i, name) in media.iter().enumerate() {
        out.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{REL_BASE}/image" Target="../media/{name}"/>"#,
            i + 2
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn slide_xml(slide: &Slide) -> String {
    let mut shapes = String::new();
    let mut picture_rel = 2;
    // Shape id 1 is the group root.
    for (idx, shape) in slide.shapes.iter().enumerate() {
        let id = idx + 2;
        match shape {
            Shape::Text(text) => shapes.push_str(&text_box_xml(id, text)),
            Shape::Picture(picture) => {
                shapes.push_str(&picture_xml(id, picture_rel, &picture.frame));
                picture_rel += 1;
            }
        }
    }
    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        empty_group()
    )
}

fn xfrm(frame: &Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn text_box_xml(id: usize, text: &TextBox) -> String {
    let wrap = if text.word_wrap { "square" } else { "none" };
    let paragraphs: String = text.paragraphs.iter().map(paragraph_xml).collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="{wrap}" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        id - 1,
        xfrm(&text.frame)
    )
}

fn paragraph_xml(p: &Paragraph) -> String {
    let bold = if p.bold { r#" b="1""# } else { "" };
    let run_props = format!(
        r#"<a:rPr lang="en-US" sz="{}"{bold} dirty="0"><a:latin typeface="{FONT_FACE}"/></a:rPr>"#,
        p.size_pt * 100
    );

    let mut out = String::from("<a:p>");
    if p.bullet {
        out.push_str(r#"<a:pPr marL="285750" indent="-285750"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#);
    }
    for (i, line) in p.lines.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!(
                r#"<a:br><a:rPr lang="en-US" sz="{}" dirty="0"/></a:br>"#,
                p.size_pt * 100
            ));
        }
        out.push_str(&format!("<a:r>{run_props}<a:t>{}</a:t></a:r>", escape(line)));
    }
    out.push_str(&format!(
        r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/></a:p>"#,
        p.size_pt * 100
    ));
    out
}

fn picture_xml(id: usize, rel: usize, frame: &Frame) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id - 1,
        xfrm(frame)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use chrono::{Local, TimeZone};
    use zip::ZipArchive;

    use crate::deck::build_deck;
    use crate::deck::tests::chart_set;

    fn read_part(archive: &mut ZipArchive<File>, name: &str) -> String {
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn writes_a_complete_package() {
        let dir = tempfile::tempdir().unwrap();
        let charts = chart_set(dir.path());
        for image in [&charts.headcount, &charts.hiring, &charts.department] {
            fs::write(&image.path, b"\x89PNG\r\n\x1a\nfake").unwrap();
        }

        let bullets = vec![
            "Average turnover is 1.40%; highest risk area is R&D (2.10%).".to_string(),
            "Recommendation: keep <calm>.".to_string(),
        ];
        let generated_at = Local.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let deck = build_deck("Headcount is 110 (+10.0% MoM).", &bullets, &charts, generated_at);

        let path = dir.path().join("deck.pptx");
        fs::write(&path, b"stale").unwrap();
        write_pptx(&deck, &path).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/media/image1.png",
            "ppt/media/image3.png",
            "ppt/slides/slide5.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }
        assert!(archive.by_name("ppt/slides/slide6.xml").is_err());

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 5);
        assert!(presentation.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));

        let first = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(first.contains("Headcount is 110 (+10.0% MoM)."));
        assert!(first.contains("Generated Jan 15, 2026"));

        let chart_slide = read_part(&mut archive, "ppt/slides/slide2.xml");
        assert!(chart_slide.contains(r#"<a:blip r:embed="rId2"/>"#));
        let rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image1.png"));

        let last = read_part(&mut archive, "ppt/slides/slide5.xml");
        assert!(last.contains("highest risk area is R&amp;D"));
        assert!(last.contains("keep &lt;calm&gt;."));
        assert!(last.contains("<a:buChar"));
    }

    #[test]
    fn missing_chart_image_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let charts = chart_set(dir.path());
        let generated_at = Local.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        let deck = build_deck("s", &[], &charts, generated_at);

        let err = write_pptx(&deck, &dir.path().join("deck.pptx")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert!(err.to_string().contains("headcount.png"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape(r#"a<b>&"c"'"#), "a&lt;b&gt;&amp;&quot;c&quot;&apos;");
    }
}
