//! Pull-based XML front-end on top of `quick-xml`.

use crate::events::{Attributes, XmlEvent};
use miette::SourceSpan;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A failure of the underlying XML reader, located in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlReadError {
    pub span: SourceSpan,
    pub message: String,
}

/// Yields the [`XmlEvent`]s of a document together with the byte span of the
/// markup that produced each one. Empty elements come out as a start/end pair;
/// declarations, comments, processing instructions and doctypes are skipped.
pub struct EventReader<'a> {
    reader: Reader<&'a [u8]>,
    done: bool,
}

impl<'a> EventReader<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.trim_text(false);
        reader.expand_empty_elements(true);
        reader.check_end_names(true);
        Self {
            reader,
            done: false,
        }
    }

    fn read(&mut self) -> Result<Option<(SourceSpan, XmlEvent)>, XmlReadError> {
        loop {
            let start = self.reader.buffer_position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| self.error(start, e.to_string()))?;
            let span = SourceSpan::from((start, self.reader.buffer_position() - start));

            let xml_event = match event {
                Event::Start(e) => {
                    let name = utf8(e.name().as_ref()).map_err(|m| self.error(start, m))?;
                    let mut attributes = Attributes::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| self.error(start, e.to_string()))?;
                        let key = utf8(attr.key.as_ref()).map_err(|m| self.error(start, m))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| self.error(start, e.to_string()))?;
                        attributes.push(key, value.into_owned());
                    }
                    XmlEvent::Start { name, attributes }
                }
                Event::End(e) => {
                    let name = utf8(e.name().as_ref()).map_err(|m| self.error(start, m))?;
                    XmlEvent::End { name }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| self.error(start, e.to_string()))?;
                    XmlEvent::Text(text.into_owned())
                }
                Event::CData(e) => {
                    let text = utf8(&e).map_err(|m| self.error(start, m))?;
                    XmlEvent::Text(text)
                }
                Event::Eof => return Ok(None),
                _ => continue,
            };
            return Ok(Some((span, xml_event)));
        }
    }

    fn error(&self, start: usize, message: String) -> XmlReadError {
        let end = self.reader.buffer_position().max(start);
        XmlReadError {
            span: SourceSpan::from((start, end - start)),
            message,
        }
    }
}

impl<'a> Iterator for EventReader<'a> {
    type Item = Result<(SourceSpan, XmlEvent), XmlReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| format!("invalid UTF-8 in markup: {e}"))
}
