use crate::{
    deck::Slide,
    style::{SlideFormat, TextAlignment},
};

use super::parts::{self, Frame, NS_PRESENTATION, XML_HEADER};

/// Escapes text for XML character data and attribute values, dropping
/// control characters XML 1.0 cannot carry.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' => escaped.push(c),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn alignment_attr(alignment: TextAlignment) -> &'static str {
    match alignment {
        TextAlignment::Left => "l",
        TextAlignment::Center => "ctr",
        TextAlignment::Right => "r",
    }
}

fn run_properties(format: &SlideFormat) -> String {
    let lang = if format.right_to_left { "ar-SA" } else { "en-US" };
    match format.font_size_pt {
        // DrawingML sizes are hundredths of a point.
        Some(size) => format!(r#"lang="{}" sz="{}" dirty="0""#, lang, size * 100),
        None => format!(r#"lang="{}" dirty="0""#, lang),
    }
}

/// One `<a:p>` per body line. The line break closing the last paragraph
/// does not open an empty one.
fn body_paragraphs(body: &str, format: &SlideFormat) -> String {
    let paragraph_props = format!(
        r#"<a:pPr algn="{}" rtl="{}"/>"#,
        alignment_attr(format.alignment),
        if format.right_to_left { 1 } else { 0 }
    );
    let run_props = run_properties(format);
    let text = body.strip_suffix('\n').unwrap_or(body);

    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                format!("<a:p>{}<a:endParaRPr {}/></a:p>", paragraph_props, run_props)
            } else {
                format!(
                    "<a:p>{}<a:r><a:rPr {}/><a:t>{}</a:t></a:r></a:p>",
                    paragraph_props,
                    run_props,
                    escape_xml(line)
                )
            }
        })
        .collect()
}

fn shape(id: u32, name: &str, placeholder: &str, frame: Frame, paragraphs: &str) -> String {
    let ph = if placeholder == "body" || placeholder == "subTitle" {
        format!(r#"<p:ph type="{}" idx="1"/>"#, placeholder)
    } else {
        format!(r#"<p:ph type="{}"/>"#, placeholder)
    };
    format!(
        concat!(
            "<p:sp><p:nvSpPr>",
            r#"<p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
            "<p:nvPr>{}</p:nvPr></p:nvSpPr>",
            "<p:spPr>{}</p:spPr>",
            "<p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody>",
            "</p:sp>"
        ),
        id,
        name,
        ph,
        frame.xml(),
        paragraphs
    )
}

/// Renders one slide record with the format chosen for it.
pub(crate) fn slide_xml(slide: &Slide, format: &SlideFormat) -> String {
    let (title_frame, body_frame) = parts::layout_frames(format.layout);
    let (title_ph, body_ph) = parts::placeholder_types(format.layout);

    let title = format!(
        r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        escape_xml(&slide.title)
    );
    let body = body_paragraphs(&slide.body, format);

    format!(
        concat!(
            "{}<p:sld {}>",
            "<p:cSld><p:spTree>{}{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sld>"
        ),
        XML_HEADER,
        NS_PRESENTATION,
        parts::group_header(),
        shape(2, "Title 1", title_ph, title_frame, &title),
        shape(3, "Content 2", body_ph, body_frame, &body),
    )
}
