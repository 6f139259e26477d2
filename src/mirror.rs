//! Re-serializes a book as lightly cleaned XML. The declaration is normalized,
//! comments, processing instructions and whitespace-only text disappear, and
//! subtrees that never reach the database (`teiHeader`, `notes`, `vs`, `cs`)
//! are left out.

use crate::error::MqlError;
use crate::events::XmlEvent;
use crate::reader::EventReader;
use crate::transducer::is_suppressed;
use miette::NamedSource;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{self, Write};

pub struct MirrorWriter<W: Write> {
    writer: Writer<W>,
    suppressed_depth: usize,
}

impl<W: Write> MirrorWriter<W> {
    /// Starts a mirror document, writing the XML declaration.
    pub fn new(out: W) -> io::Result<Self> {
        let mut writer = Writer::new(out);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(io::Error::other)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(Self {
            writer,
            suppressed_depth: 0,
        })
    }

    pub fn write(&mut self, event: &XmlEvent) -> io::Result<()> {
        match event {
            XmlEvent::Start { name, attributes } => {
                if self.suppressed_depth > 0 || is_suppressed(name) {
                    self.suppressed_depth += 1;
                    return Ok(());
                }
                let mut start = BytesStart::new(name.as_str());
                for attribute in attributes.iter() {
                    start.push_attribute(attribute);
                }
                self.emit(Event::Start(start))
            }
            XmlEvent::End { name } => {
                if self.suppressed_depth > 0 {
                    self.suppressed_depth -= 1;
                    return Ok(());
                }
                self.emit(Event::End(BytesEnd::new(name.as_str())))
            }
            XmlEvent::Text(text) => {
                if self.suppressed_depth > 0 || text.trim().is_empty() {
                    return Ok(());
                }
                self.emit(Event::Text(BytesText::new(text)))
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn emit(&mut self, event: Event<'_>) -> io::Result<()> {
        self.writer.write_event(event).map_err(io::Error::other)
    }
}

/// Mirrors `source` into `out`. `out_name` labels I/O errors.
pub fn mirror_document<W: Write>(
    source: &str,
    source_name: &str,
    out: W,
    out_name: &str,
) -> Result<W, MqlError> {
    let mut mirror = MirrorWriter::new(out).map_err(|e| MqlError::io(out_name, e))?;
    for item in EventReader::new(source) {
        let (_, event) = item.map_err(|e| MqlError::Xml {
            src: NamedSource::new(source_name, source.to_string()),
            span: e.span,
            message: e.message,
        })?;
        mirror.write(&event).map_err(|e| MqlError::io(out_name, e))?;
    }
    let mut out = mirror.into_inner();
    out.write_all(b"\n")
        .and_then(|()| out.flush())
        .map_err(|e| MqlError::io(out_name, e))?;
    Ok(out)
}
