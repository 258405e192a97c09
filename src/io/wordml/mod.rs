//! Flat WordprocessingML codec.
//!
//! Reads and writes a single `w:document` part, the XML Word keeps in
//! `word/document.xml`, with the built-in properties embedded as a
//! `cp:coreProperties` block ahead of the body.
//!
//! | Model | WordprocessingML |
//! |-------|------------------|
//! | paragraph | `w:p` |
//! | run | `w:r` with `w:rPr`, `w:t`, `w:tab`, `w:br` |
//! | field markers | `w:fldChar` begin/separate/end, code in `w:instrText` |
//! | tracked run or marker | `w:ins` / `w:del` wrapper |
//! | tracked paragraph | `w:pPr/w:rPr/w:ins` or `w:del` |
//! | format change | `w:pPrChange` holding the previous `w:pPr` |
//! | frame, drop cap | `w:framePr` |
//! | section boundary | `w:pPr/w:sectPr` on the section's last paragraph |
//!
//! `w:fldSimple` is accepted on read and expanded into markers.

mod reader;
mod writer;

pub use reader::from_str;
pub use writer::to_string;

pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const CP_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub(crate) const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub(crate) const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub(crate) const EP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

/// Timestamp format of `w:date` and the dcterms properties.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::document::{
        BreakType, Document, DocumentBuilder, DocumentSettings, DropCapPosition, Font,
        FrameFormat, HeightRule, LineSpacing, ParagraphAlignment, RelativeHorizontalPosition,
        Run, StyleIdentifier, TabAlignment, TabLeader, UnderlineStyle,
    };
    use crate::fields::FieldType;
    use crate::revision::RevisionType;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn round_trip(doc: &Document) -> Document {
        let xml = to_string(doc).unwrap();
        from_str(&xml).unwrap()
    }

    #[test]
    fn test_fields_and_text_round_trip() {
        let mut doc = Document::with_settings(DocumentSettings::new().with_fixed_time(date()));
        doc.built_in_properties_mut().set_author("Test Author");
        {
            let mut builder = DocumentBuilder::new(&mut doc);
            builder.write("Written by ").unwrap();
            builder.insert_field_type(FieldType::Author, true).unwrap();
            builder.write(" <&> \"quoted\"\tafter tab").unwrap();
            builder.insert_break(BreakType::Line).unwrap();
            builder.insert_field(" DATE \\@ \"yyyy-MM-dd\" ").unwrap();
            builder.insert_break(BreakType::Paragraph).unwrap();
            builder.insert_field(" LISTNUM ").unwrap();
        }

        let loaded = round_trip(&doc);
        assert_eq!(loaded.text(), doc.text());
        assert_eq!(
            loaded.paragraph_text(0, 0).unwrap(),
            "Written by \u{13} AUTHOR \u{14}Test Author\u{15} <&> \"quoted\"\tafter tab\u{b}\u{13} DATE \\@ \"yyyy-MM-dd\" \u{14}2024-11-05\u{15}\r"
        );

        let first = loaded.sections()[0].body().paragraphs()[0].fields();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].field_type(), FieldType::Author);
        assert_eq!(first[0].result(), Some("Test Author"));
        assert_eq!(first[1].field_type(), FieldType::Date);

        let second = loaded.sections()[0].body().paragraphs()[1].fields();
        assert_eq!(second[0].field_type(), FieldType::ListNum);
        assert!(second[0].range().separator.is_none());
        assert_eq!(loaded.built_in_properties().author(), "Test Author");
    }

    #[test]
    fn test_revisions_round_trip() {
        let mut doc = Document::new();
        {
            let mut body = doc.first_body_editor().unwrap();
            body.first_paragraph().unwrap().append_text("Keep me.");
            body.append_paragraph("Delete me.");
        }
        doc.start_track_revisions("John Doe", Some(date()));
        {
            let mut body = doc.first_body_editor().unwrap();
            body.remove_paragraph(1).unwrap();
            body.append_paragraph("Inserted.");
            let mut para = body.first_paragraph().unwrap();
            para.append_text(" Tracked run.");
            para.update_format(|f| f.alignment = ParagraphAlignment::Right);
        }

        let loaded = round_trip(&doc);
        let expected: Vec<(RevisionType, String)> = doc
            .revisions()
            .iter()
            .map(|r| (r.revision_type(), r.text().to_string()))
            .collect();
        let actual: Vec<(RevisionType, String)> = loaded
            .revisions()
            .iter()
            .map(|r| (r.revision_type(), r.text().to_string()))
            .collect();
        assert_eq!(actual, expected);
        assert!(loaded.revisions().iter().all(|r| r.author() == "John Doe"));
        assert!(loaded.revisions().iter().all(|r| r.date() == date()));

        let paragraphs = loaded.sections()[0].body().paragraphs();
        assert!(paragraphs[1].is_delete_revision());
        assert!(paragraphs[2].is_insert_revision());
        let change = paragraphs[0].format_change().unwrap();
        assert_eq!(change.previous().alignment, ParagraphAlignment::Left);
        assert_eq!(paragraphs[0].format().alignment, ParagraphAlignment::Right);

        let mut loaded = loaded;
        loaded.reject_all_revisions();
        assert_eq!(loaded.text(), "Keep me.\rDelete me.\u{c}");
    }

    #[test]
    fn test_format_round_trip() {
        let mut doc = Document::new();
        {
            let mut body = doc.first_body_editor().unwrap();
            let mut para = body.first_paragraph().unwrap();
            para.update_format(|f| {
                f.style_identifier = StyleIdentifier::Heading1;
                f.keep_with_next = true;
                f.line_spacing = LineSpacing::Exact(14.0);
                f.space_before = 6.0;
                f.left_indent = 36.0;
                f.first_line_indent = -18.0;
                f.drop_cap_position = DropCapPosition::Margin;
                f.lines_to_drop = 3;
                f.far_east_line_break_control = false;
                f.hanging_punctuation = false;
                f.tab_stops.add(72.0, TabAlignment::Decimal, TabLeader::Dots);
                f.tab_stops.add(144.0, TabAlignment::Clear, TabLeader::None);
                f.frame = Some(FrameFormat {
                    width: 233.3,
                    height: 138.8,
                    height_rule: HeightRule::Exactly,
                    horizontal_position: 21.05,
                    relative_horizontal_position: RelativeHorizontalPosition::Page,
                    horizontal_distance_from_text: 9.0,
                    vertical_position: -17.65,
                    ..Default::default()
                });
            });
            let font = Font::new()
                .with_name("Courier New")
                .with_size(10.5)
                .with_bold(true)
                .with_style(StyleIdentifier::Emphasis);
            let mut run = Run::with_font("styled", font);
            run.font_mut().underline = Some(UnderlineStyle::Double);
            run.font_mut().color = Some("FF0000".to_string());
            para.append_run(run);
        }

        let loaded = round_trip(&doc);
        let paragraph = &loaded.sections()[0].body().paragraphs()[0];
        assert_eq!(paragraph.format(), doc.sections()[0].body().paragraphs()[0].format());
        let run = paragraph.runs().next().unwrap();
        assert_eq!(run.text(), "styled");
        assert_eq!(run.font().name.as_deref(), Some("Courier New"));
        assert_eq!(run.font().size, Some(10.5));
        assert!(run.font().bold);
        assert!(!run.font().italic);
        assert_eq!(run.font().underline, Some(UnderlineStyle::Double));
        assert_eq!(run.font().color.as_deref(), Some("FF0000"));
        assert_eq!(run.font().style_identifier, StyleIdentifier::Emphasis);
    }

    #[test]
    fn test_sections_and_style_separator_round_trip() {
        let mut doc = Document::new();
        {
            let mut builder = DocumentBuilder::new(&mut doc);
            builder.write("Heading").unwrap();
            builder.insert_style_separator().unwrap();
            builder.write("Body text").unwrap();
            builder.insert_break(BreakType::Section).unwrap();
            builder.write("Second section").unwrap();
        }

        let loaded = round_trip(&doc);
        assert_eq!(loaded.section_count(), 2);
        assert_eq!(loaded.text(), "Heading\rBody text\u{c}Second section\u{c}");
        assert!(loaded.sections()[0].body().paragraphs()[0].break_is_style_separator());
        assert!(!loaded.sections()[0].body().paragraphs()[1].break_is_style_separator());
    }

    #[test]
    fn test_read_word_markup() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:jc w:val="center"/><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:pPr>
      <w:r><w:t xml:space="preserve">Fish &amp; chips &#x2014; </w:t></w:r>
      <w:fldSimple w:instr=" TITLE "><w:r><w:t>Menu</w:t></w:r></w:fldSimple>
    </w:p>
    <w:p>
      <w:ins w:id="7" w:author="Jane" w:date="2024-11-05T10:30:00Z">
        <w:r><w:rPr><w:i/><w:rPrChange w:id="9"><w:rPr><w:b/></w:rPr></w:rPrChange></w:rPr><w:t>new</w:t></w:r>
      </w:ins>
    </w:p>
    <w:sectPr><w:pgMar w:top="1440"/></w:sectPr>
  </w:body>
</w:document>"#;

        let doc = from_str(xml).unwrap();
        assert_eq!(doc.section_count(), 2);
        assert_eq!(
            doc.paragraph_text(0, 0).unwrap(),
            "Fish & chips \u{2014} \u{13} TITLE \u{14}Menu\u{15}\u{c}"
        );
        let first = &doc.sections()[0].body().paragraphs()[0];
        assert_eq!(first.format().alignment, ParagraphAlignment::Center);
        assert_eq!(first.fields()[0].field_type(), FieldType::Title);

        let second = &doc.sections()[1].body().paragraphs()[0];
        let run = second.runs().next().unwrap();
        assert!(run.is_insert_revision());
        assert!(run.font().italic);
        assert!(!run.font().bold);

        let revisions = doc.revisions();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].id(), 7);
        assert_eq!(revisions[0].author(), "Jane");
    }

    #[test]
    fn test_loaded_revision_ids_are_reserved() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:ins w:id="41" w:author="A" w:date="2024-01-01T00:00:00Z"><w:r><w:t>x</w:t></w:r></w:ins></w:p>
</w:body></w:document>"#;
        let mut doc = from_str(xml).unwrap();
        doc.start_track_revisions("B", Some(date()));
        doc.first_body_editor().unwrap().append_paragraph("y");
        let ids: Vec<u32> = doc.revisions().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![41, 42]);
    }

    #[test]
    fn test_unbalanced_fields_are_rejected() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText> PAGE </w:instrText></w:r></w:p>
</w:body></w:document>"#;
        assert!(matches!(from_str(xml), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let xml = "<w:document><w:body><w:p></w:body></w:document>";
        assert!(matches!(from_str(xml), Err(Error::XmlError(_))));
    }

    #[test]
    fn test_empty_body_gets_a_paragraph() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#;
        let doc = from_str(xml).unwrap();
        assert_eq!(doc.section_count(), 1);
        assert_eq!(doc.text(), "\u{c}");
    }
}
