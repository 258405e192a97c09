//! Scenario tests for the document model.
use super::*;
use crate::common::NodeId;
use crate::fields::FieldType;
use crate::revision::{RevisionTarget, RevisionType};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 5)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn new_document() -> Document {
    Document::with_settings(DocumentSettings::new().with_fixed_time(fixed_time()))
}

/// Two paragraphs: an empty one and "Hello World!", so paragraph 1 is last.
fn hello_document() -> Document {
    let mut doc = new_document();
    doc.built_in_properties_mut().set_author("Test Author");
    let mut body = doc.first_body_editor().unwrap();
    body.append_paragraph("Hello World!");
    doc
}

/// Three paragraphs; the second holds "Hello World!" and " Hello World!".
fn two_run_document() -> (Document, NodeId, NodeId) {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    let first = body.paragraph(1).unwrap().runs().next().unwrap().id();
    let second = body.paragraph(1).unwrap().append_text(" Hello World!");
    body.append_paragraph("");
    (doc, first, second)
}

#[test]
fn test_insert_field_before_text_in_paragraph() {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(1)
        .unwrap()
        .insert_field(" AUTHOR ", None, false)
        .unwrap();
    body.append_paragraph("");

    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "\u{13} AUTHOR \u{14}Test Author\u{15}Hello World!\r"
    );
}

#[test]
fn test_insert_field_after_text_in_paragraph() {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(1).unwrap().insert_field(" DATE ", None, true).unwrap();
    body.append_paragraph("");

    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "Hello World!\u{13} DATE \u{14}11/5/2024\u{15}\r"
    );
}

#[test]
fn test_insert_field_type_without_update() {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.paragraph(1).unwrap();
    para.insert_field_type(FieldType::Author, false, None, false)
        .unwrap();
    para.insert_field_type(FieldType::Author, false, None, true)
        .unwrap();
    body.append_paragraph("");

    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "\u{13} AUTHOR \u{14}\u{15}Hello World!\u{13} AUTHOR \u{14}\u{15}\r"
    );
}

#[test]
fn test_insert_field_without_separator() {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    let range = body
        .paragraph(1)
        .unwrap()
        .insert_field_type(FieldType::ListNum, true, None, false)
        .unwrap();
    body.append_paragraph("");

    assert!(range.separator.is_none());
    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "\u{13} LISTNUM \u{15}Hello World!\r"
    );
}

#[test]
fn test_insert_field_without_document_author() {
    let mut doc = hello_document();
    doc.built_in_properties_mut().set_author("");
    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(1)
        .unwrap()
        .insert_field_with_placeholder(" AUTHOR ", None, None, false)
        .unwrap();
    body.append_paragraph("");

    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "\u{13} AUTHOR \u{14}\u{15}Hello World!\r"
    );
}

#[test]
fn test_insert_field_relative_to_runs() {
    let (mut doc, _, second) = two_run_document();
    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(1)
        .unwrap()
        .insert_field_with_placeholder(" AUTHOR ", Some("Test Field Value"), Some(second), false)
        .unwrap();
    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "Hello World!\u{13} AUTHOR \u{14}Test Field Value\u{15} Hello World!\r"
    );

    let (mut doc, _, second) = two_run_document();
    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(1)
        .unwrap()
        .insert_field_with_placeholder(" AUTHOR ", Some(""), Some(second), true)
        .unwrap();
    assert_eq!(
        doc.paragraph_text(0, 1).unwrap(),
        "Hello World! Hello World!\u{13} AUTHOR \u{14}\u{15}\r"
    );
}

#[test]
fn test_insert_field_into_empty_last_paragraph() {
    let mut doc = hello_document();
    let mut body = doc.first_body_editor().unwrap();
    body.append_paragraph("");
    body.paragraph(2)
        .unwrap()
        .insert_field_type(FieldType::Author, false, None, false)
        .unwrap();
    assert_eq!(doc.paragraph_text(0, 2).unwrap(), "\u{13} AUTHOR \u{14}\u{15}\u{c}");

    let mut body = doc.first_body_editor().unwrap();
    body.paragraph(0)
        .unwrap()
        .insert_field_type(FieldType::Author, true, None, false)
        .unwrap();
    assert_eq!(
        doc.paragraph_text(0, 0).unwrap(),
        "\u{13} AUTHOR \u{14}Test Author\u{15}\r"
    );
}

#[test]
fn test_author_field_with_unset_author() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.first_paragraph().unwrap();
    para.append_field_type(FieldType::Author, true).unwrap();
    assert_eq!(para.text(), "\u{13} AUTHOR \u{14}\u{15}");
}

#[test]
fn test_append_field_variants() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.first_paragraph().unwrap();
    para.append_field_type(FieldType::Date, true).unwrap();
    para.append_field(" TIME  \\@ \"HH:mm:ss\" ");
    para.append_field_with_placeholder(" QUOTE \"Real value\"", "Placeholder value");

    let fields = para.fields();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].field_type(), FieldType::Date);
    assert_eq!(fields[0].result(), Some("11/5/2024"));
    assert_eq!(fields[1].result(), Some("14:30:00"));
    assert_eq!(fields[2].result(), Some("Placeholder value"));

    // The placeholder is replaced once the field is updated.
    assert_eq!(doc.update_fields(), 3);
    let para = doc.first_section().unwrap().body().paragraph(0).unwrap();
    assert_eq!(para.fields()[2].result(), Some("Real value"));
}

#[test]
fn test_unknown_field_type_has_no_code() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.first_paragraph().unwrap();
    assert!(matches!(
        para.append_field_type(FieldType::Unknown, true),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(para.child_count(), 0);
}

#[test]
fn test_foreign_reference_leaves_paragraph_unchanged() {
    let (mut doc, first, _) = two_run_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.paragraph(0).unwrap();
    let err = para.insert_field(" AUTHOR ", Some(first), true).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(para.child_count(), 0);
}

#[test]
fn test_first_section_of_malformed_document() {
    let mut doc = new_document();
    doc.sections.clear();
    assert!(matches!(doc.first_section(), Err(Error::StructuralInvariant(_))));
    assert!(matches!(
        doc.first_body_editor(),
        Err(Error::StructuralInvariant(_))
    ));

    let mut doc = new_document();
    doc.sections[0].body.paragraphs.clear();
    assert!(matches!(doc.first_section(), Err(Error::StructuralInvariant(_))));
}

#[test]
fn test_is_revision() {
    let mut doc = new_document();
    {
        let mut body = doc.first_body_editor().unwrap();
        body.first_paragraph().unwrap().append_text("Paragraph 1. ");
        body.append_paragraph("Paragraph 2. ");
        body.append_paragraph("Paragraph 3. ");
    }

    doc.start_track_revisions("John Doe", None);
    let mut body = doc.first_body_editor().unwrap();
    body.append_paragraph("Paragraph 4. ");
    assert!(body.paragraph(3).unwrap().is_insert_revision());
    assert_eq!(body.paragraph_count(), 4);

    assert!(body.remove_paragraph(2).unwrap().is_none());
    assert_eq!(body.paragraph_count(), 4);
    assert!(body.paragraph(2).unwrap().is_delete_revision());

    let revisions = doc.revisions();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].revision_type(), RevisionType::Delete);
    assert_eq!(revisions[0].text(), "Paragraph 3. ");
    assert_eq!(revisions[1].revision_type(), RevisionType::Insert);
    assert_eq!(revisions[1].author(), "John Doe");
    assert_eq!(revisions[1].date(), fixed_time());

    let husks = doc.accept_all_revisions();
    let body = doc.first_section().unwrap().body();
    assert_eq!(body.paragraph_count(), 3);
    assert_eq!(husks.len(), 1);
    assert_eq!(husks[0].child_count(), 0);
    assert!(!body.paragraph(2).unwrap().is_insert_revision());
    assert!(!doc.has_revisions());
    assert!(doc.is_tracking_revisions());
}

#[test]
fn test_accept_and_reject_without_pending_changes() {
    let mut doc = new_document();
    doc.first_body_editor().unwrap().append_paragraph("Text");
    assert!(doc.accept_all_revisions().is_empty());
    assert!(doc.reject_all_revisions().is_empty());
    assert_eq!(doc.text(), "\rText\u{c}");
}

#[test]
fn test_reject_inline_and_format_revisions() {
    let mut doc = new_document();
    doc.first_body_editor()
        .unwrap()
        .first_paragraph()
        .unwrap()
        .append_text("Original");

    doc.start_track_revisions("Jane Smith", None);
    {
        let mut body = doc.first_body_editor().unwrap();
        let mut para = body.first_paragraph().unwrap();
        para.append_text(" added");
        para.append_field(" AUTHOR ");
        para.update_format(|format| format.alignment = ParagraphAlignment::Center);
        assert!(para.is_format_revision());
        assert_eq!(para.revision_flags(), crate::revision::RevisionFlags::FORMAT);
    }

    let revisions = doc.revisions();
    assert_eq!(revisions.len(), 3);
    assert_eq!(revisions[0].revision_type(), RevisionType::FormatChange);
    assert_eq!(revisions[1].text(), " added");
    assert_eq!(revisions[2].text(), "\u{13} AUTHOR \u{14}\u{15}");
    assert!(matches!(revisions[1].target(), RevisionTarget::Inline { .. }));

    doc.reject_all_revisions();
    let para = doc.first_section().unwrap().body().paragraph(0).unwrap();
    assert_eq!(para.text(), "Original");
    assert_eq!(para.format().alignment, ParagraphAlignment::Left);
    assert!(!doc.has_revisions());
}

#[test]
fn test_format_change_on_inserted_paragraph() {
    let mut doc = new_document();
    doc.start_track_revisions("Jane Smith", None);
    {
        let mut body = doc.first_body_editor().unwrap();
        body.append_paragraph("New");
        let mut para = body.paragraph(1).unwrap();
        para.update_format(|format| format.alignment = ParagraphAlignment::Center);
        assert!(para.is_insert_revision());
        assert!(para.is_format_revision());
        assert_eq!(
            para.revision_flags(),
            crate::revision::RevisionFlags::INSERT | crate::revision::RevisionFlags::FORMAT
        );
    }

    let kinds: Vec<RevisionType> = doc.revisions().iter().map(|r| r.revision_type()).collect();
    assert_eq!(kinds, [RevisionType::Insert, RevisionType::FormatChange]);

    let mut accepted = doc.clone();
    accepted.accept_all_revisions();
    let para = accepted.first_section().unwrap().body().paragraph(1).unwrap();
    assert_eq!(para.format().alignment, ParagraphAlignment::Center);
    assert!(!accepted.has_revisions());

    let removed = doc.reject_all_revisions();
    assert_eq!(removed.len(), 1);
    assert!(!removed[0].is_format_revision());
    assert_eq!(doc.text(), "\u{c}");
}

#[test]
fn test_tracked_run_removal() {
    let mut doc = new_document();
    let run = doc
        .first_body_editor()
        .unwrap()
        .first_paragraph()
        .unwrap()
        .append_text("Keep me?");

    doc.start_track_revisions("John Doe", None);
    {
        let mut body = doc.first_body_editor().unwrap();
        let mut para = body.first_paragraph().unwrap();
        assert!(para.remove_run(run).unwrap().is_none());
        assert_eq!(para.text(), "Keep me?");
    }
    doc.accept_all_revisions();
    assert_eq!(doc.paragraph_text(0, 0).unwrap(), "\u{c}");
}

#[test]
fn test_revision_ids_are_unique() {
    let mut doc = new_document();
    doc.start_track_revisions("John Doe", None);
    let mut body = doc.first_body_editor().unwrap();
    body.append_paragraph("One");
    body.append_paragraph("Two");
    let ids: Vec<u32> = doc.revisions().iter().map(|r| r.id()).collect();
    assert_eq!(ids, [0, 1]);
}

#[test]
fn test_cloned_nodes_get_fresh_ids() {
    let mut tracker = crate::revision::RevisionTracker::new();
    let mut para = Paragraph::new();
    let run = Run::new("x");
    let first = para.append_run(run.clone(), &mut tracker);
    let second = para.append_run(run, &mut tracker);
    assert_ne!(first, second);

    para.insert_field_with_result(" QUOTE \"y\" ", Some("y"), Some(second), true, &mut tracker)
        .unwrap();
    assert_eq!(para.text(), "xx\u{13} QUOTE \"y\" \u{14}y\u{15}");
    para.remove_run(second, &mut tracker).unwrap();
    assert_eq!(para.text(), "x\u{13} QUOTE \"y\" \u{14}y\u{15}");

    let copy = para.clone();
    assert_ne!(copy.id(), para.id());
    for (original, cloned) in para.content().iter().zip(copy.content()) {
        assert_ne!(original.id(), cloned.id());
    }
    assert_eq!(copy.text(), para.text());
    assert_eq!(copy.fields().len(), 1);
}

#[test]
fn test_cloned_paragraph_is_a_separate_node() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    let template = Paragraph::with_text("Same");
    let a = body.append(template.clone());
    let b = body.append(template);
    assert_ne!(a, b);
    assert_eq!(body.position(a), Some(1));
    assert_eq!(body.position(b), Some(2));
}

#[test]
fn test_join_runs() {
    let mut doc = new_document();
    let mut builder = DocumentBuilder::new(&mut doc);
    for text in ["Run 1. ", "Run 2. ", "Run 3. ", "Run 4. "] {
        builder.write(text).unwrap();
    }
    assert_eq!(builder.current_paragraph().unwrap().run_count(), 4);

    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.first_paragraph().unwrap();
    let last = para.runs().last().unwrap().id();
    para.run_mut(last).unwrap().font_mut().style_identifier = StyleIdentifier::Emphasis;

    assert_eq!(para.join_runs_with_same_formatting(), 2);
    let texts: Vec<&str> = para.runs().map(Run::text).collect();
    assert_eq!(texts, ["Run 1. Run 2. Run 3. ", "Run 4. "]);
}

#[test]
fn test_break_is_style_separator() {
    let mut doc = new_document();
    let mut builder = DocumentBuilder::new(&mut doc);
    builder.insert_table_of_contents("\\o \\h \\z \\u").unwrap();
    builder.insert_break(BreakType::Page).unwrap();
    builder
        .update_paragraph_format(|f| f.style_identifier = StyleIdentifier::Heading1)
        .unwrap();
    builder.write("Heading 1. ").unwrap();
    builder.write("Will appear in the TOC. ").unwrap();
    builder.insert_style_separator().unwrap();
    builder
        .update_paragraph_format(|f| f.style_identifier = StyleIdentifier::Quote)
        .unwrap();
    builder.write("Won't appear in the TOC. ").unwrap();

    let body = doc.first_section().unwrap().body();
    assert!(body.paragraph(0).unwrap().break_is_style_separator());
    assert!(!body.paragraph(1).unwrap().break_is_style_separator());
    assert_eq!(
        body.paragraph(0).unwrap().format().style_identifier,
        StyleIdentifier::Heading1
    );
    assert_eq!(
        body.paragraph(1).unwrap().format().style_identifier,
        StyleIdentifier::Quote
    );

    // TOC is not evaluated; its empty result survives an update.
    assert_eq!(doc.update_fields(), 0);
    assert_eq!(
        doc.paragraph_text(0, 0).unwrap(),
        "\u{13} TOC \\o \\h \\z \\u \u{14}\u{15}\u{c}Heading 1. Will appear in the TOC. \r"
    );
}

#[test]
fn test_builder_section_and_line_breaks() {
    let mut doc = new_document();
    let mut builder = DocumentBuilder::new(&mut doc);
    builder.write("One").unwrap();
    builder.insert_break(BreakType::Line).unwrap();
    builder.write("Two").unwrap();
    builder.insert_break(BreakType::Section).unwrap();
    builder.writeln("Three").unwrap();

    assert_eq!(doc.section_count(), 2);
    assert_eq!(doc.text(), "One\u{b}Two\u{c}Three\r\u{c}");
}

#[test]
fn test_builder_tracks_revisions() {
    let mut doc = new_document();
    doc.start_track_revisions("John Doe", None);
    let mut builder = DocumentBuilder::new(&mut doc);
    builder.writeln("Tracked").unwrap();
    assert_eq!(doc.revisions().len(), 2);
    doc.reject_all_revisions();
    assert_eq!(doc.text(), "\u{c}");
}

#[test]
fn test_frame_and_drop_cap_defaults() {
    let doc = new_document();
    let para = doc.first_section().unwrap().body().first_paragraph().unwrap();
    assert_eq!(para.format().drop_cap_position, DropCapPosition::None);
    assert!(!para.format().is_frame());
}

#[test]
fn test_tab_stops() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    let mut para = body.first_paragraph().unwrap();
    assert_eq!(para.effective_tab_stops().len(), 0);
    para.update_format(|format| {
        format.tab_stops.add(72.0, TabAlignment::Left, TabLeader::Dots);
        format.tab_stops.add(216.0, TabAlignment::Center, TabLeader::Dashes);
        format.tab_stops.add(360.0, TabAlignment::Right, TabLeader::Line);
    });
    assert_eq!(para.effective_tab_stops().len(), 3);
    para.append_text("\tTab 1\tTab 2\tTab 3");
    assert_eq!(para.text(), "\tTab 1\tTab 2\tTab 3");
}

#[test]
fn test_start_tracking_defaults_to_document_clock() {
    let mut doc = new_document();
    doc.start_track_revisions("John Doe", None);
    assert_eq!(doc.revision_tracker().date(), Some(fixed_time()));
    doc.stop_track_revisions();
    assert!(!doc.is_tracking_revisions());
    doc.first_body_editor().unwrap().append_paragraph("Untracked");
    assert!(!doc.has_revisions());
}

#[test]
fn test_deferred_date_and_time_match_immediate() {
    let mut doc = new_document();
    let mut body = doc.first_body_editor().unwrap();
    body.append_paragraph("");
    {
        let mut para = body.paragraph(0).unwrap();
        para.append_field_type(FieldType::Date, true).unwrap();
        para.append_field_type(FieldType::Time, true).unwrap();
    }
    let mut para = body.paragraph(1).unwrap();
    para.append_field_type(FieldType::Date, false).unwrap();
    para.append_field_type(FieldType::Time, false).unwrap();
    assert_eq!(para.text(), "\u{13} DATE \u{14}\u{15}\u{13} TIME \u{14}\u{15}");
    assert_eq!(para.update_fields(), 2);

    let expected = "\u{13} DATE \u{14}11/5/2024\u{15}\u{13} TIME \u{14}2:30 PM\u{15}";
    assert_eq!(doc.paragraph_text(0, 0).unwrap(), format!("{expected}\r"));
    assert_eq!(doc.paragraph_text(0, 1).unwrap(), format!("{expected}\u{c}"));
}

fn style_strategy() -> impl Strategy<Value = StyleIdentifier> {
    prop_oneof![
        Just(StyleIdentifier::DefaultParagraphFont),
        Just(StyleIdentifier::Emphasis),
        Just(StyleIdentifier::Strong),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_field_lands_at_requested_position(
        texts in prop::collection::vec("[a-z]{1,5}", 1..6),
        pick in any::<prop::sample::Index>(),
        is_after in any::<bool>(),
    ) {
        let mut tracker = crate::revision::RevisionTracker::new();
        let mut para = Paragraph::new();
        let ids: Vec<NodeId> = texts.iter().map(|t| para.append_text(t, &mut tracker)).collect();
        let index = pick.index(ids.len());

        para.insert_field_with_result(" QUOTE \"x\" ", Some("x"), Some(ids[index]), is_after, &mut tracker)
            .unwrap();

        let split = if is_after { index + 1 } else { index };
        let expected = format!(
            "{}\u{13} QUOTE \"x\" \u{14}x\u{15}{}",
            texts[..split].concat(),
            texts[split..].concat()
        );
        prop_assert_eq!(para.text(), expected);
        prop_assert_eq!(para.text().matches('\u{13}').count(), 1);
    }

    #[test]
    fn prop_join_runs_is_idempotent(
        runs in prop::collection::vec(("[a-z]{1,4}", style_strategy()), 0..8),
    ) {
        let mut tracker = crate::revision::RevisionTracker::new();
        let mut para = Paragraph::new();
        for (text, style) in &runs {
            para.append_run(Run::with_font(text, Font::new().with_style(*style)), &mut tracker);
        }
        let before = para.text();

        let merges = para.join_runs_with_same_formatting();
        prop_assert_eq!(merges + para.run_count(), runs.len());
        prop_assert_eq!(para.text(), before);
        prop_assert_eq!(para.join_runs_with_same_formatting(), 0);
    }

    #[test]
    fn prop_deferred_update_matches_immediate(
        author in "[A-Za-z ]{0,12}",
        field_type in prop_oneof![
            Just(FieldType::Author),
            Just(FieldType::Date),
            Just(FieldType::Time),
        ],
    ) {
        let mut doc = new_document();
        doc.built_in_properties_mut().set_author(&author);
        let mut body = doc.first_body_editor().unwrap();

        let immediate = body.paragraph(0).unwrap().append_field_type(field_type, true).unwrap();
        body.append_paragraph("");
        let mut deferred = body.paragraph(1).unwrap();
        let range = deferred.append_field_type(field_type, false).unwrap();
        deferred.update_field(range.start).unwrap();

        let body = doc.first_section().unwrap().body();
        prop_assert!(body.paragraph(0).unwrap().contains(immediate.start));
        prop_assert_eq!(body.paragraph(0).unwrap().text(), body.paragraph(1).unwrap().text());
    }
}
