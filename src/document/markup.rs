// src/document/markup.rs
//! Token-level cleanup of report markup before the recovering tree builder sees it.
//!
//! Reports are XML-shaped but the tree builder follows HTML rules, which
//! misreads two things reports do routinely: self-closing tags such as
//! `<P/>` (kept open, so following markers nest inside them) and inline
//! markup inside `TITLE` (read as literal text). The reader below rewrites
//! both and passes every other token through untouched. It does not check
//! end-tag names, so unbalanced markup is left for the tree builder to repair.

use quick_xml::events::{BytesEnd, BytesText, Event};
use quick_xml::{Reader, Writer};

const TITLE_TAG: &[u8] = b"title";
const MARKER_TAG_PREFIX: &[u8] = b"section-";

// Elements the tree builder treats as void; `<BR/>` must stay a single tag.
const VOID_TAGS: &[&[u8]] = &[
    b"area", b"base", b"br", b"col", b"embed", b"hr", b"img", b"input", b"link", b"meta", b"param", b"source",
    b"track", b"wbr",
];

/// Rewrites self-closing non-void elements as start/end pairs and flattens
/// the content of every `TITLE` to its text.
pub(crate) fn normalize(text: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut writer = Writer::new(Vec::with_capacity(text.len()));
    // Escaped text of the TITLE being read, if any.
    let mut title: Option<Vec<u8>> = None;

    loop {
        let event = reader.read_event()?;

        if let Some(buffer) = title.as_mut() {
            match event {
                Event::Text(ref t) => {
                    buffer.extend_from_slice(t);
                    continue;
                }
                Event::CData(ref c) => {
                    let raw = String::from_utf8_lossy(c).into_owned();
                    buffer.extend_from_slice(quick_xml::escape::escape(raw.as_str()).as_bytes());
                    continue;
                }
                Event::End(ref e) if e.name().as_ref().eq_ignore_ascii_case(TITLE_TAG) => {
                    close_title(&mut writer, buffer, e.clone())?;
                    title = None;
                    continue;
                }
                Event::Start(ref e) | Event::Empty(ref e) if !is_marker(e.name().as_ref()) => continue,
                Event::End(ref e) if !is_marker(e.name().as_ref()) => continue,
                Event::Comment(_) | Event::PI(_) => continue,
                _ => {
                    // A marker or EOF ends a title whose closing tag was lost.
                    close_title(&mut writer, buffer, BytesEnd::new("TITLE"))?;
                    title = None;
                }
            }
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref().eq_ignore_ascii_case(TITLE_TAG) => {
                writer.write_event(Event::Start(e))?;
                title = Some(Vec::new());
            }
            Event::Empty(e) if !is_void(e.name().as_ref()) => {
                writer.write_event(Event::Start(e.borrow()))?;
                writer.write_event(Event::End(e.to_end()))?;
            }
            Event::CData(c) => {
                let raw = String::from_utf8_lossy(&c).into_owned();
                writer.write_event(Event::Text(BytesText::new(&raw)))?;
            }
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn close_title(writer: &mut Writer<Vec<u8>>, buffer: &[u8], end: BytesEnd<'_>) -> Result<(), quick_xml::Error> {
    let text = String::from_utf8_lossy(buffer);
    writer.write_event(Event::Text(BytesText::from_escaped(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn is_void(name: &[u8]) -> bool {
    VOID_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}

fn is_marker(name: &[u8]) -> bool {
    name.len() > MARKER_TAG_PREFIX.len() && name[..MARKER_TAG_PREFIX.len()].eq_ignore_ascii_case(MARKER_TAG_PREFIX)
}
