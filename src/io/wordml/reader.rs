//! WordprocessingML parsing.
//!
//! Event-driven: one pass over the XML with a small state machine. Field
//! markers are read untyped; types are derived from the codes once each
//! paragraph is complete.
use super::DATE_FORMAT;
use crate::common::unit::{half_points_to_pt_f64, twip_to_pt_f64};
use crate::common::{BuiltInProperties, Error, Result};
use crate::document::text::{LINE_BREAK_CHAR, PAGE_BREAK_CHAR, TAB_CHAR};
use crate::document::{
    Body, Document, DropCapPosition, FieldChar, Font, FrameFormat, HeightRule,
    HorizontalAlignment, Inline, LineSpacing, Paragraph, ParagraphAlignment, ParagraphFormat,
    RelativeHorizontalPosition, RelativeVerticalPosition, Run, Section, StyleIdentifier,
    TabAlignment, TabLeader, UnderlineStyle, VerticalAlignment,
};
use crate::fields::FieldType;
use crate::revision::{ContentChange, FormatChange, RevisionMark};
use chrono::{DateTime, NaiveDateTime};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::mem;

/// Parse a flat `w:document`.
pub fn from_str(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut decoder = Decoder::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => decoder.start(&e)?,
            Ok(Event::Empty(e)) => {
                decoder.start(&e)?;
                decoder.end(e.local_name().as_ref())?;
            },
            Ok(Event::End(e)) => decoder.end(e.local_name().as_ref())?,
            Ok(Event::Text(e)) => {
                let text = std::str::from_utf8(e.as_ref()).map_err(|e| {
                    Error::XmlError(format!("Invalid UTF-8 in text content: {}", e))
                })?;
                decoder.text(text);
            },
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(e.as_ref()).map_err(|e| {
                    Error::XmlError(format!("Invalid UTF-8 in CDATA section: {}", e))
                })?;
                decoder.text(text);
            },
            Ok(Event::GeneralRef(e)) => {
                let name = std::str::from_utf8(e.as_ref()).map_err(|e| {
                    Error::XmlError(format!("Invalid UTF-8 in entity reference: {}", e))
                })?;
                decoder.text(&resolve_reference(name)?);
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {},
        }
    }
    decoder.finish()
}

/// Where `w:rPr` children go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PropertyTarget {
    #[default]
    None,
    Run,
    ParagraphMark,
}

/// Core property element being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreProperty {
    Author,
    Title,
    Subject,
    Keywords,
    Comments,
    LastSavedBy,
    Category,
    Company,
    Created,
    Modified,
    Revision,
}

impl CoreProperty {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        Some(match name {
            b"creator" => Self::Author,
            b"title" => Self::Title,
            b"subject" => Self::Subject,
            b"keywords" => Self::Keywords,
            b"description" => Self::Comments,
            b"lastModifiedBy" => Self::LastSavedBy,
            b"category" => Self::Category,
            b"Company" => Self::Company,
            b"created" => Self::Created,
            b"modified" => Self::Modified,
            b"revision" => Self::Revision,
            _ => return None,
        })
    }
}

#[derive(Debug, Default)]
struct RunState {
    font: Font,
    text: String,
    /// The run held a field marker, so an empty text is not an empty run
    has_marker: bool,
}

#[derive(Debug, Default)]
struct Decoder {
    sections: Vec<Section>,
    paragraphs: Vec<Paragraph>,
    paragraph: Option<Paragraph>,
    run: Option<RunState>,
    /// Change of the enclosing `w:ins`/`w:del` wrapper
    inline_change: Option<ContentChange>,
    in_ppr: bool,
    /// Open `w:pPrChange`: its mark and the previous format being read
    format_change: Option<(RevisionMark, ParagraphFormat)>,
    rpr: PropertyTarget,
    in_text: bool,
    section_break: bool,
    /// Depth inside an element whose content is ignored
    skip_depth: usize,
    properties: BuiltInProperties,
    in_properties: bool,
    property: Option<CoreProperty>,
    property_text: String,
}

impl Decoder {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return Ok(());
        }
        let local_name_ref = e.local_name();
        let name = local_name_ref.as_ref();

        if self.in_properties {
            self.property = CoreProperty::from_local_name(name);
            self.property_text.clear();
            return Ok(());
        }

        match name {
            b"coreProperties" => self.in_properties = true,
            b"p" => {
                self.paragraph = Some(Paragraph::new());
                self.section_break = false;
            },
            b"pPr" => {
                if self.format_change.is_none() {
                    self.in_ppr = true;
                }
            },
            b"pPrChange" if self.in_ppr => {
                self.format_change = Some((read_mark(e)?, ParagraphFormat::default()));
            },
            b"sectPr" => {
                if self.in_ppr {
                    self.section_break = true;
                }
                self.skip_depth = 1;
            },
            b"rPrChange" | b"numPr" | b"pBdr" | b"shd" => self.skip_depth = 1,
            b"rPr" => {
                self.rpr = if self.run.is_some() {
                    PropertyTarget::Run
                } else if self.in_ppr {
                    PropertyTarget::ParagraphMark
                } else {
                    PropertyTarget::None
                };
            },
            b"ins" | b"del" => {
                let mark = read_mark(e)?;
                let change = if name == b"ins" {
                    ContentChange::Inserted(mark)
                } else {
                    ContentChange::Deleted(mark)
                };
                match self.rpr {
                    PropertyTarget::ParagraphMark => {
                        if let Some(paragraph) = self.paragraph.as_mut() {
                            paragraph.change = Some(change);
                        }
                    },
                    PropertyTarget::None => self.inline_change = Some(change),
                    PropertyTarget::Run => {},
                }
            },
            b"specVanish" if self.rpr == PropertyTarget::ParagraphMark => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.break_is_style_separator = true;
                }
            },
            b"r" => self.run = Some(RunState::default()),
            b"t" | b"delText" | b"instrText" | b"delInstrText" => {
                self.in_text = self.run.is_some();
            },
            b"tab" if self.in_ppr => {
                if let Some(format) = self.format_mut() {
                    read_tab_stop(format, e)?;
                }
            },
            b"tab" => self.push_char(TAB_CHAR),
            b"br" => {
                let page = attr(e, b"type")?.as_deref() == Some("page");
                self.push_char(if page { PAGE_BREAK_CHAR } else { LINE_BREAK_CHAR });
            },
            b"fldChar" => {
                let kind = attr(e, b"fldCharType")?.unwrap_or_default();
                self.push_field_char(&kind)?;
            },
            b"fldSimple" => {
                let code = attr(e, b"instr")?.unwrap_or_default();
                self.push_field_char("begin")?;
                self.push_inline(Inline::Run(Run::new(&code)));
                self.push_field_char("separate")?;
            },
            _ if self.in_ppr && self.rpr == PropertyTarget::None => {
                if let Some(format) = self.format_mut() {
                    read_paragraph_property(format, name, e)?;
                }
            },
            _ if self.rpr == PropertyTarget::Run => {
                if let Some(run) = self.run.as_mut() {
                    read_run_property(&mut run.font, name, e)?;
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Result<()> {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return Ok(());
        }

        if self.in_properties {
            if name == b"coreProperties" {
                self.in_properties = false;
            } else if let Some(property) = self.property.take() {
                self.apply_property(property)?;
            }
            return Ok(());
        }

        match name {
            b"p" => self.finish_paragraph()?,
            b"pPr" => {
                if self.format_change.is_none() {
                    self.in_ppr = false;
                }
            },
            b"pPrChange" => {
                if let Some((mark, previous)) = self.format_change.take()
                    && let Some(paragraph) = self.paragraph.as_mut()
                {
                    paragraph.format_change = Some(FormatChange { mark, previous });
                }
            },
            b"rPr" => self.rpr = PropertyTarget::None,
            b"ins" | b"del" if self.rpr == PropertyTarget::None => self.inline_change = None,
            b"r" => {
                if let Some(state) = self.run.take() {
                    if !state.text.is_empty() || !state.has_marker {
                        self.push_inline(Inline::Run(Run::with_font(&state.text, state.font)));
                    }
                }
            },
            b"t" | b"delText" | b"instrText" | b"delInstrText" => self.in_text = false,
            b"fldSimple" => self.push_field_char("end")?,
            b"body" => {
                if !self.paragraphs.is_empty() {
                    self.close_section();
                }
            },
            _ => {},
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 {
            return;
        }
        if self.property.is_some() {
            self.property_text.push_str(text);
        } else if self.in_text
            && let Some(run) = self.run.as_mut()
        {
            run.text.push_str(text);
        }
    }

    fn finish(mut self) -> Result<Document> {
        if !self.paragraphs.is_empty() {
            self.close_section();
        }
        let mut doc = Document::new();
        if !self.sections.is_empty() {
            doc.sections = self.sections;
        }
        doc.properties = self.properties;
        doc.normalize();
        Ok(doc)
    }

    /// Format receiving `w:pPr` children: the previous format inside a
    /// `w:pPrChange`, else the paragraph's own.
    fn format_mut(&mut self) -> Option<&mut ParagraphFormat> {
        match self.format_change.as_mut() {
            Some((_, previous)) => Some(previous),
            None => self.paragraph.as_mut().map(|p| &mut p.format),
        }
    }

    fn push_inline(&mut self, mut node: Inline) {
        node.set_change(self.inline_change.clone());
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.content.push(node);
        }
    }

    fn push_char(&mut self, c: char) {
        if let Some(run) = self.run.as_mut() {
            run.text.push(c);
        }
    }

    /// Emit text collected so far in the open run as its own run.
    fn flush_run_text(&mut self) {
        let Some(state) = self.run.as_mut() else {
            return;
        };
        if state.text.is_empty() {
            return;
        }
        let run = Run::with_font(&mem::take(&mut state.text), state.font.clone());
        self.push_inline(Inline::Run(run));
    }

    fn push_field_char(&mut self, kind: &str) -> Result<()> {
        self.flush_run_text();
        if let Some(state) = self.run.as_mut() {
            state.has_marker = true;
        }
        let marker = FieldChar::new(FieldType::Unknown);
        let node = match kind {
            "begin" => Inline::FieldStart(marker),
            "separate" => Inline::FieldSeparator(marker),
            "end" => Inline::FieldEnd(marker),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Unknown field character type: {:?}",
                    other
                )));
            },
        };
        self.push_inline(node);
        Ok(())
    }

    fn finish_paragraph(&mut self) -> Result<()> {
        let Some(mut paragraph) = self.paragraph.take() else {
            return Ok(());
        };
        paragraph.check_field_markers()?;
        paragraph.refresh_field_types();
        self.paragraphs.push(paragraph);
        if self.section_break {
            self.close_section();
            self.section_break = false;
        }
        Ok(())
    }

    fn close_section(&mut self) {
        let paragraphs = mem::take(&mut self.paragraphs);
        self.sections.push(Section::with_body(Body { paragraphs }));
    }

    fn apply_property(&mut self, property: CoreProperty) -> Result<()> {
        let value = mem::take(&mut self.property_text);
        let text = if value.is_empty() { None } else { Some(value) };
        let props = &mut self.properties;
        match property {
            CoreProperty::Author => props.author = text,
            CoreProperty::Title => props.title = text,
            CoreProperty::Subject => props.subject = text,
            CoreProperty::Keywords => props.keywords = text,
            CoreProperty::Comments => props.comments = text,
            CoreProperty::LastSavedBy => props.last_saved_by = text,
            CoreProperty::Category => props.category = text,
            CoreProperty::Company => props.company = text,
            CoreProperty::Created => props.created = text.as_deref().map(parse_date).transpose()?,
            CoreProperty::Modified => {
                props.last_saved = text.as_deref().map(parse_date).transpose()?;
            },
            CoreProperty::Revision => {
                props.revision_number = match text.as_deref().map(str::trim) {
                    Some(value) => value.parse().map_err(|_| {
                        Error::InvalidFormat(format!("Invalid revision number: {:?}", value))
                    })?,
                    None => 0,
                };
            },
        }
        Ok(())
    }
}

fn read_paragraph_property(format: &mut ParagraphFormat, name: &[u8], e: &BytesStart<'_>) -> Result<()> {
    match name {
        b"pStyle" => {
            if let Some(id) = attr(e, b"val")? {
                format.style_identifier = StyleIdentifier::from_style_id(&id).unwrap_or_default();
            }
        },
        b"keepNext" => format.keep_with_next = on_off(e)?,
        b"framePr" => read_frame(format, e)?,
        b"kinsoku" => format.far_east_line_break_control = on_off(e)?,
        b"wordWrap" => format.word_wrap = on_off(e)?,
        b"overflowPunct" => format.hanging_punctuation = on_off(e)?,
        b"spacing" => {
            if let Some(before) = attr_i64(e, b"before")? {
                format.space_before = twip_to_pt_f64(before);
            }
            if let Some(after) = attr_i64(e, b"after")? {
                format.space_after = twip_to_pt_f64(after);
            }
            if let Some(line) = attr_i64(e, b"line")? {
                format.line_spacing = match attr(e, b"lineRule")?.as_deref() {
                    Some("exact") => LineSpacing::Exact(twip_to_pt_f64(line)),
                    Some("atLeast") => LineSpacing::AtLeast(twip_to_pt_f64(line)),
                    _ => match line {
                        240 => LineSpacing::Single,
                        360 => LineSpacing::OneAndHalf,
                        480 => LineSpacing::Double,
                        other => LineSpacing::Multiple(other as f64 / 240.0),
                    },
                };
            }
        },
        b"ind" => {
            for attr in e.attributes().flatten() {
                let twips = parse_i64(&attr_value(&attr)?)?;
                match attr.key.local_name().as_ref() {
                    b"left" | b"start" => format.left_indent = twip_to_pt_f64(twips),
                    b"right" | b"end" => format.right_indent = twip_to_pt_f64(twips),
                    b"firstLine" => format.first_line_indent = twip_to_pt_f64(twips),
                    b"hanging" => format.first_line_indent = -twip_to_pt_f64(twips),
                    _ => {},
                }
            }
        },
        b"jc" => {
            if let Some(value) = attr(e, b"val")? {
                format.alignment = ParagraphAlignment::from_wml(&value).unwrap_or_default();
            }
        },
        _ => {},
    }
    Ok(())
}

fn read_frame(format: &mut ParagraphFormat, e: &BytesStart<'_>) -> Result<()> {
    let mut frame = FrameFormat::default();
    let mut positioned = false;
    for attr in e.attributes().flatten() {
        let value = attr_value(&attr)?;
        match attr.key.local_name().as_ref() {
            b"dropCap" => {
                format.drop_cap_position = DropCapPosition::from_wml(&value).unwrap_or_default();
                continue;
            },
            b"lines" => {
                format.lines_to_drop = u8::try_from(parse_i64(&value)?).unwrap_or(1);
                continue;
            },
            b"w" => frame.width = twip_to_pt_f64(parse_i64(&value)?),
            b"h" => frame.height = twip_to_pt_f64(parse_i64(&value)?),
            b"hRule" => frame.height_rule = HeightRule::from_wml(&value).unwrap_or_default(),
            b"hSpace" => frame.horizontal_distance_from_text = twip_to_pt_f64(parse_i64(&value)?),
            b"vSpace" => frame.vertical_distance_from_text = twip_to_pt_f64(parse_i64(&value)?),
            b"x" => frame.horizontal_position = twip_to_pt_f64(parse_i64(&value)?),
            b"y" => frame.vertical_position = twip_to_pt_f64(parse_i64(&value)?),
            b"xAlign" => {
                frame.horizontal_alignment = HorizontalAlignment::from_wml(&value).unwrap_or_default();
            },
            b"yAlign" => {
                frame.vertical_alignment = VerticalAlignment::from_wml(&value).unwrap_or_default();
            },
            b"hAnchor" => {
                frame.relative_horizontal_position =
                    RelativeHorizontalPosition::from_wml(&value).unwrap_or_default();
            },
            b"vAnchor" => {
                frame.relative_vertical_position =
                    RelativeVerticalPosition::from_wml(&value).unwrap_or_default();
            },
            _ => continue,
        }
        positioned = true;
    }
    if positioned {
        format.frame = Some(frame);
    }
    Ok(())
}

fn read_tab_stop(format: &mut ParagraphFormat, e: &BytesStart<'_>) -> Result<()> {
    let Some(position) = attr_i64(e, b"pos")? else {
        return Ok(());
    };
    let alignment = attr(e, b"val")?
        .and_then(|v| TabAlignment::from_wml(&v))
        .unwrap_or_default();
    let leader = attr(e, b"leader")?
        .and_then(|v| TabLeader::from_wml(&v))
        .unwrap_or_default();
    format
        .tab_stops
        .add(twip_to_pt_f64(position), alignment, leader);
    Ok(())
}

fn read_run_property(font: &mut Font, name: &[u8], e: &BytesStart<'_>) -> Result<()> {
    match name {
        b"rStyle" => {
            if let Some(id) = attr(e, b"val")? {
                font.style_identifier =
                    StyleIdentifier::from_style_id(&id).unwrap_or(StyleIdentifier::DefaultParagraphFont);
            }
        },
        b"rFonts" => {
            if let Some(face) = attr(e, b"ascii")?.or(attr(e, b"hAnsi")?) {
                font.name = Some(face);
            }
        },
        b"b" => font.bold = on_off(e)?,
        b"i" => font.italic = on_off(e)?,
        b"u" => {
            font.underline = attr(e, b"val")?.and_then(|v| UnderlineStyle::from_wml(&v));
        },
        b"color" => {
            font.color = attr(e, b"val")?.filter(|v| v != "auto");
        },
        b"sz" => {
            if let Some(half_points) = attr_i64(e, b"val")? {
                font.size = Some(half_points_to_pt_f64(u32::try_from(half_points).unwrap_or(0)));
            }
        },
        b"highlight" => {
            font.highlight = attr(e, b"val")?.filter(|v| v != "none");
        },
        _ => {},
    }
    Ok(())
}

fn read_mark(e: &BytesStart<'_>) -> Result<RevisionMark> {
    let id = match attr_i64(e, b"id")? {
        Some(id) => u32::try_from(id)
            .map_err(|_| Error::InvalidFormat(format!("Invalid revision id: {}", id)))?,
        None => 0,
    };
    let author = attr(e, b"author")?.unwrap_or_default();
    let date = match attr(e, b"date")? {
        Some(date) => parse_date(&date)?,
        None => NaiveDateTime::default(),
    };
    Ok(RevisionMark::new(id, author, date))
}

/// Parse an ISO 8601 timestamp. Offsets are dropped, keeping wall-clock time.
fn parse_date(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.naive_local());
    }
    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), DATE_FORMAT.trim_end_matches('Z'))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| Error::InvalidFormat(format!("Invalid date {:?}: {}", value, e)))
}

/// An OOXML on/off property: present without `w:val` means on.
fn on_off(e: &BytesStart<'_>) -> Result<bool> {
    Ok(!matches!(
        attr(e, b"val")?.as_deref(),
        Some("0") | Some("false") | Some("off")
    ))
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return attr_value(&attr).map(Some);
        }
    }
    Ok(None)
}

fn attr_i64(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<i64>> {
    attr(e, name)?.as_deref().map(parse_i64).transpose()
}

fn attr_value(attr: &Attribute<'_>) -> Result<String> {
    let raw = std::str::from_utf8(&attr.value)
        .map_err(|e| Error::XmlError(format!("Invalid UTF-8 in attribute value: {}", e)))?;
    let value = quick_xml::escape::unescape(raw).map_err(|e| Error::XmlError(e.to_string()))?;
    Ok(value.into_owned())
}

fn parse_i64(value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFormat(format!("Invalid integer attribute: {:?}", value)))
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return value
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::XmlError(format!("Invalid character reference: &{};", name)));
    }
    quick_xml::escape::resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::XmlError(format!("Unknown entity: &{};", name)))
}
