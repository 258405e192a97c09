//! WordprocessingML serialization.
use super::{CP_NS, DATE_FORMAT, DCTERMS_NS, DC_NS, EP_NS, W_NS};
use crate::common::unit::{pt_to_half_points_u32, pt_to_twip_i64};
use crate::common::{BuiltInProperties, Result};
use crate::document::text::{LINE_BREAK_CHAR, PAGE_BREAK_CHAR, TAB_CHAR};
use crate::document::{
    Document, DropCapPosition, Font, FrameFormat, Inline, LineSpacing, Paragraph,
    ParagraphAlignment, ParagraphFormat, Run, StyleIdentifier, TabLeader,
};
use crate::revision::{ContentChange, RevisionMark};
use smallvec::SmallVec;
use std::fmt::Write as FmtWrite;

/// Serialize `doc` as a flat `w:document`.
pub fn to_string(doc: &Document) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(&mut xml, r#"<w:document xmlns:w="{}">"#, W_NS)?;
    write_properties(&mut xml, doc.built_in_properties())?;
    xml.push_str("<w:body>");

    let section_count = doc.section_count();
    for (section_index, section) in doc.sections().iter().enumerate() {
        let paragraphs = section.body().paragraphs();
        let last = paragraphs.len().saturating_sub(1);
        for (index, paragraph) in paragraphs.iter().enumerate() {
            let ends_section = section_index + 1 < section_count && index == last;
            write_paragraph(&mut xml, paragraph, ends_section)?;
        }
    }

    xml.push_str("<w:sectPr/></w:body></w:document>");
    Ok(xml)
}

fn write_properties(xml: &mut String, props: &BuiltInProperties) -> Result<()> {
    if !props.has_data() {
        return Ok(());
    }
    write!(
        xml,
        r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="{}" xmlns:dcterms="{}" xmlns:ep="{}">"#,
        CP_NS, DC_NS, DCTERMS_NS, EP_NS
    )?;
    let text_properties = [
        ("dc:creator", &props.author),
        ("dc:title", &props.title),
        ("dc:subject", &props.subject),
        ("cp:keywords", &props.keywords),
        ("dc:description", &props.comments),
        ("cp:lastModifiedBy", &props.last_saved_by),
        ("cp:category", &props.category),
        ("ep:Company", &props.company),
    ];
    for (tag, value) in text_properties {
        if let Some(value) = value {
            write!(xml, "<{tag}>{}</{tag}>", escape_xml(value))?;
        }
    }
    if let Some(created) = props.created {
        write!(xml, "<dcterms:created>{}</dcterms:created>", created.format(DATE_FORMAT))?;
    }
    if let Some(saved) = props.last_saved {
        write!(xml, "<dcterms:modified>{}</dcterms:modified>", saved.format(DATE_FORMAT))?;
    }
    if props.revision_number > 0 {
        let mut buffer = itoa::Buffer::new();
        write!(xml, "<cp:revision>{}</cp:revision>", buffer.format(props.revision_number))?;
    }
    xml.push_str("</cp:coreProperties>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph, ends_section: bool) -> Result<()> {
    xml.push_str("<w:p>");

    let mut ppr = String::new();
    write_format(&mut ppr, paragraph.format())?;
    write_mark_properties(&mut ppr, paragraph)?;
    if ends_section {
        ppr.push_str("<w:sectPr/>");
    }
    if let Some(change) = paragraph.format_change() {
        open_mark(&mut ppr, "w:pPrChange", change.mark())?;
        ppr.push_str("><w:pPr>");
        write_format(&mut ppr, change.previous())?;
        ppr.push_str("</w:pPr></w:pPrChange>");
    }
    if !ppr.is_empty() {
        xml.push_str("<w:pPr>");
        xml.push_str(&ppr);
        xml.push_str("</w:pPr>");
    }

    write_content(xml, paragraph.content())?;
    xml.push_str("</w:p>");
    Ok(())
}

/// Paragraph properties in schema order. Defaults are omitted.
fn write_format(xml: &mut String, format: &ParagraphFormat) -> Result<()> {
    if format.style_identifier != StyleIdentifier::Normal {
        push_empty(xml, "w:pStyle", &[("w:val", format.style_identifier.style_id())]);
    }
    if format.keep_with_next {
        xml.push_str("<w:keepNext/>");
    }
    if format.frame.is_some()
        || format.drop_cap_position != DropCapPosition::None
        || format.lines_to_drop != 1
    {
        write_frame(xml, format);
    }
    if !format.tab_stops.is_empty() {
        xml.push_str("<w:tabs>");
        for stop in format.tab_stops.iter() {
            xml.push_str("<w:tab");
            push_attr(xml, "w:val", stop.alignment.as_str());
            if stop.leader != TabLeader::None {
                push_attr(xml, "w:leader", stop.leader.as_str());
            }
            push_int_attr(xml, "w:pos", pt_to_twip_i64(stop.position));
            xml.push_str("/>");
        }
        xml.push_str("</w:tabs>");
    }
    if !format.far_east_line_break_control {
        xml.push_str(r#"<w:kinsoku w:val="0"/>"#);
    }
    if !format.word_wrap {
        xml.push_str(r#"<w:wordWrap w:val="0"/>"#);
    }
    if !format.hanging_punctuation {
        xml.push_str(r#"<w:overflowPunct w:val="0"/>"#);
    }
    if format.space_before != 0.0
        || format.space_after != 0.0
        || format.line_spacing != LineSpacing::Single
    {
        let (line, rule) = match format.line_spacing {
            LineSpacing::Single => (240, "auto"),
            LineSpacing::OneAndHalf => (360, "auto"),
            LineSpacing::Double => (480, "auto"),
            LineSpacing::Multiple(factor) => ((factor * 240.0).round() as i64, "auto"),
            LineSpacing::Exact(points) => (pt_to_twip_i64(points), "exact"),
            LineSpacing::AtLeast(points) => (pt_to_twip_i64(points), "atLeast"),
        };
        xml.push_str("<w:spacing");
        push_int_attr(xml, "w:before", pt_to_twip_i64(format.space_before));
        push_int_attr(xml, "w:after", pt_to_twip_i64(format.space_after));
        push_int_attr(xml, "w:line", line);
        push_attr(xml, "w:lineRule", rule);
        xml.push_str("/>");
    }
    if format.left_indent != 0.0 || format.right_indent != 0.0 || format.first_line_indent != 0.0 {
        xml.push_str("<w:ind");
        push_int_attr(xml, "w:left", pt_to_twip_i64(format.left_indent));
        push_int_attr(xml, "w:right", pt_to_twip_i64(format.right_indent));
        if format.first_line_indent < 0.0 {
            push_int_attr(xml, "w:hanging", pt_to_twip_i64(-format.first_line_indent));
        } else if format.first_line_indent > 0.0 {
            push_int_attr(xml, "w:firstLine", pt_to_twip_i64(format.first_line_indent));
        }
        xml.push_str("/>");
    }
    if format.alignment != ParagraphAlignment::Left {
        push_empty(xml, "w:jc", &[("w:val", format.alignment.as_str())]);
    }
    Ok(())
}

fn write_frame(xml: &mut String, format: &ParagraphFormat) {
    xml.push_str("<w:framePr");
    if format.drop_cap_position != DropCapPosition::None {
        push_attr(xml, "w:dropCap", format.drop_cap_position.as_str());
    }
    if format.drop_cap_position != DropCapPosition::None || format.lines_to_drop != 1 {
        push_int_attr(xml, "w:lines", format.lines_to_drop);
    }
    if let Some(frame) = &format.frame {
        write_frame_position(xml, frame);
    }
    xml.push_str("/>");
}

fn write_frame_position(xml: &mut String, frame: &FrameFormat) {
    push_int_attr(xml, "w:w", pt_to_twip_i64(frame.width));
    push_int_attr(xml, "w:h", pt_to_twip_i64(frame.height));
    push_attr(xml, "w:hRule", frame.height_rule.as_str());
    push_int_attr(xml, "w:hSpace", pt_to_twip_i64(frame.horizontal_distance_from_text));
    push_int_attr(xml, "w:vSpace", pt_to_twip_i64(frame.vertical_distance_from_text));
    push_attr(xml, "w:hAnchor", frame.relative_horizontal_position.as_str());
    push_attr(xml, "w:vAnchor", frame.relative_vertical_position.as_str());
    push_int_attr(xml, "w:x", pt_to_twip_i64(frame.horizontal_position));
    if let Some(align) = frame.horizontal_alignment.as_str() {
        push_attr(xml, "w:xAlign", align);
    }
    push_int_attr(xml, "w:y", pt_to_twip_i64(frame.vertical_position));
    if let Some(align) = frame.vertical_alignment.as_str() {
        push_attr(xml, "w:yAlign", align);
    }
}

/// Run properties of the paragraph mark: its own revision and the
/// style-separator flag.
fn write_mark_properties(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    if paragraph.change().is_none() && !paragraph.break_is_style_separator() {
        return Ok(());
    }
    xml.push_str("<w:rPr>");
    if let Some(change) = paragraph.change() {
        let (tag, mark) = change_tag(change);
        open_mark(xml, tag, mark)?;
        xml.push_str("/>");
    }
    if paragraph.break_is_style_separator() {
        xml.push_str("<w:vanish/><w:specVanish/>");
    }
    xml.push_str("</w:rPr>");
    Ok(())
}

fn write_content(xml: &mut String, content: &[Inline]) -> Result<()> {
    // One entry per open field: true while its code is being written.
    let mut code_stack: SmallVec<[bool; 4]> = SmallVec::new();

    for node in content {
        let wrapper = node.change().map(change_tag);
        if let Some((tag, mark)) = wrapper {
            open_mark(xml, tag, mark)?;
            xml.push('>');
        }
        let deleted = node.is_delete_revision();
        match node {
            Inline::FieldStart(_) => {
                xml.push_str(r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#);
                code_stack.push(true);
            },
            Inline::FieldSeparator(_) => {
                xml.push_str(r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#);
                if let Some(in_code) = code_stack.last_mut() {
                    *in_code = false;
                }
            },
            Inline::FieldEnd(_) => {
                xml.push_str(r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#);
                code_stack.pop();
            },
            Inline::Run(run) => {
                let in_code = code_stack.last().copied().unwrap_or(false);
                write_run(xml, run, in_code, deleted)?;
            },
        }
        if let Some((tag, _)) = wrapper {
            write!(xml, "</{tag}>")?;
        }
    }
    Ok(())
}

fn write_run(xml: &mut String, run: &Run, in_code: bool, deleted: bool) -> Result<()> {
    xml.push_str("<w:r>");
    write_run_properties(xml, run.font());
    if in_code {
        let tag = if deleted { "w:delInstrText" } else { "w:instrText" };
        write!(
            xml,
            r#"<{tag} xml:space="preserve">{}</{tag}>"#,
            escape_xml(run.text())
        )?;
    } else {
        write_run_text(xml, run.text(), deleted)?;
    }
    xml.push_str("</w:r>");
    Ok(())
}

/// Split run text into `w:t` pieces around tabs and breaks.
fn write_run_text(xml: &mut String, text: &str, deleted: bool) -> Result<()> {
    let tag = if deleted { "w:delText" } else { "w:t" };
    let mut rest = text;
    while !rest.is_empty() {
        let split = rest
            .find([TAB_CHAR, LINE_BREAK_CHAR, PAGE_BREAK_CHAR])
            .unwrap_or(rest.len());
        if split > 0 {
            write!(
                xml,
                r#"<{tag} xml:space="preserve">{}</{tag}>"#,
                escape_xml(&rest[..split])
            )?;
        }
        let mut tail = rest[split..].chars();
        match tail.next() {
            Some(TAB_CHAR) => xml.push_str("<w:tab/>"),
            Some(LINE_BREAK_CHAR) => xml.push_str("<w:br/>"),
            Some(PAGE_BREAK_CHAR) => xml.push_str(r#"<w:br w:type="page"/>"#),
            _ => {},
        }
        rest = tail.as_str();
    }
    Ok(())
}

fn write_run_properties(xml: &mut String, font: &Font) {
    let mut rpr = String::new();
    if font.style_identifier != StyleIdentifier::DefaultParagraphFont {
        push_empty(&mut rpr, "w:rStyle", &[("w:val", font.style_identifier.style_id())]);
    }
    if let Some(name) = &font.name {
        push_empty(&mut rpr, "w:rFonts", &[("w:ascii", name.as_str()), ("w:hAnsi", name.as_str())]);
    }
    if font.bold {
        rpr.push_str("<w:b/>");
    }
    if font.italic {
        rpr.push_str("<w:i/>");
    }
    if let Some(color) = &font.color {
        push_empty(&mut rpr, "w:color", &[("w:val", color.as_str())]);
    }
    if let Some(size) = font.size {
        rpr.push_str("<w:sz");
        push_int_attr(&mut rpr, "w:val", pt_to_half_points_u32(size));
        rpr.push_str("/>");
    }
    if let Some(highlight) = &font.highlight {
        push_empty(&mut rpr, "w:highlight", &[("w:val", highlight.as_str())]);
    }
    if let Some(underline) = font.underline {
        push_empty(&mut rpr, "w:u", &[("w:val", underline.as_str())]);
    }
    if !rpr.is_empty() {
        xml.push_str("<w:rPr>");
        xml.push_str(&rpr);
        xml.push_str("</w:rPr>");
    }
}

fn change_tag(change: &ContentChange) -> (&'static str, &RevisionMark) {
    match change {
        ContentChange::Inserted(mark) => ("w:ins", mark),
        ContentChange::Deleted(mark) => ("w:del", mark),
    }
}

/// Open `<tag` with the mark's id, author and date. The caller closes it.
fn open_mark(xml: &mut String, tag: &str, mark: &RevisionMark) -> Result<()> {
    xml.push('<');
    xml.push_str(tag);
    push_int_attr(xml, "w:id", mark.id());
    push_attr(xml, "w:author", mark.author());
    write!(xml, r#" w:date="{}""#, mark.date().format(DATE_FORMAT))?;
    Ok(())
}

fn push_empty(xml: &mut String, tag: &str, attrs: &[(&str, &str)]) {
    xml.push('<');
    xml.push_str(tag);
    for (name, value) in attrs {
        push_attr(xml, name, value);
    }
    xml.push_str("/>");
}

#[inline]
fn push_attr(xml: &mut String, name: &str, value: &str) {
    xml.push(' ');
    xml.push_str(name);
    xml.push_str("=\"");
    xml.push_str(&escape_xml(value));
    xml.push('"');
}

#[inline]
fn push_int_attr<I: itoa::Integer>(xml: &mut String, name: &str, value: I) {
    let mut buffer = itoa::Buffer::new();
    xml.push(' ');
    xml.push_str(name);
    xml.push_str("=\"");
    xml.push_str(buffer.format(value));
    xml.push('"');
}

/// Escape XML special characters. Control characters XML 1.0 cannot carry
/// are dropped.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {},
            c => out.push(c),
        }
    }
    out
}
