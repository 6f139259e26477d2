//! The document-to-record state machine.
//!
//! A [`Transducer`] consumes one [`XmlEvent`] at a time and keeps every piece of
//! state it needs in itself: the stack of open elements, the stack of division
//! types (seeded with an empty sentinel), the stack of suppressed subtrees, the
//! open book/chapter/verse/title records, the open paragraph, the
//! per-book document index and the scratch fields of the current word.
//!
//! Monad convention: a record opens at the current monad and, when sealed, ends
//! at `current - 1`. A record sealed at the monad it opened at spans nothing and
//! is dropped. Only `<w>` consumes a monad, when it closes.

use crate::error::TransducerError;
use crate::events::{Attributes, XmlEvent};
use crate::monad::{Monad, MonadAllocator, FIRST_MONAD};
use crate::record::{Language, ParagraphClass, Record, RecordData, TitleDivType};
use crate::segment::{MergePolicy, SegmentType};
use crate::store::RecordStore;
use crate::tokens::{NoTokens, TokenSink, WordContext};
use serde::Serialize;
use std::fmt::{self, Display};

/// Subtrees skipped entirely: no records, no monads, no validation.
const SUPPRESSED_ELEMENTS: [&str; 4] = ["teiHeader", "notes", "vs", "cs"];

/// Wrappers that are accepted and otherwise ignored.
const IGNORED_ELEMENTS: [&str; 10] = [
    "tanach",
    "book",
    "verse",
    "names",
    "name",
    "abbrev",
    "number",
    "filename",
    "hebrewname",
    "c",
];

const WORD_TYPES: [&str; 1] = ["x-ketiv"];

/// Whether `tag` opens a subtree that contributes nothing to the output.
pub fn is_suppressed(tag: &str) -> bool {
    SUPPRESSED_ELEMENTS.contains(&tag)
}

/// A non-fatal observation made while transducing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// A `<seg>` directly inside something other than `<verse>`.
    UnexpectedSegmentParent { segment: String, parent: String },
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnexpectedSegmentParent { segment, parent } => write!(
                f,
                "<seg type=\"{segment}\">... occurs with surprising parent tag: <{parent}>"
            ),
        }
    }
}

/// Everything a finished transduction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transduction {
    pub store: RecordStore,
    /// The first monad not used by this document.
    pub next_monad: Monad,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
struct OpenRecord {
    first_monad: Monad,
    docindex: Option<u32>,
    data: RecordData,
}

#[derive(Debug, Clone, Copy)]
struct OpenParagraph {
    first_monad: Monad,
    docindex: u32,
}

pub struct Transducer<S: TokenSink = NoTokens> {
    sink: S,
    monads: MonadAllocator,
    store: RecordStore,
    elements: Vec<String>,
    div_types: Vec<String>,
    nixing: Vec<String>,
    book: Option<OpenRecord>,
    chapter: Option<OpenRecord>,
    verse: Option<OpenRecord>,
    title: Option<OpenRecord>,
    paragraph: Option<OpenParagraph>,
    next_docindex: u32,
    word: Option<WordContext>,
    segment: Option<SegmentType>,
    merge: MergePolicy,
    in_catch_word: bool,
    in_reading: bool,
    in_note: bool,
    pending_text: String,
    warnings: Vec<Warning>,
}

impl Transducer<NoTokens> {
    pub fn new() -> Self {
        Self::with_sink(NoTokens, FIRST_MONAD)
    }

    /// A transducer whose first word occupies `first_monad`.
    pub fn starting_at(first_monad: Monad) -> Self {
        Self::with_sink(NoTokens, first_monad)
    }
}

impl Default for Transducer<NoTokens> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TokenSink> Transducer<S> {
    pub fn with_sink(sink: S, first_monad: Monad) -> Self {
        Self {
            sink,
            monads: MonadAllocator::starting_at(first_monad),
            store: RecordStore::new(),
            elements: Vec::new(),
            div_types: vec![String::new()],
            nixing: Vec::new(),
            book: None,
            chapter: None,
            verse: None,
            title: None,
            paragraph: None,
            next_docindex: 1,
            word: None,
            segment: None,
            merge: MergePolicy::NONE,
            in_catch_word: false,
            in_reading: false,
            in_note: false,
            pending_text: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Records sealed so far.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn current_monad(&self) -> Monad {
        self.monads.current()
    }

    pub fn handle(&mut self, event: XmlEvent) -> Result<(), TransducerError> {
        match event {
            XmlEvent::Start { name, attributes } => self.start_element(&name, &attributes),
            XmlEvent::End { name } => self.end_element(&name),
            XmlEvent::Text(text) => {
                self.characters(&text);
                Ok(())
            }
        }
    }

    pub fn characters(&mut self, text: &str) {
        self.pending_text.push_str(text);
    }

    pub fn start_element(&mut self, tag: &str, attributes: &Attributes) -> Result<(), TransducerError> {
        // Character data in front of a start tag never carries a token.
        self.pending_text.clear();
        self.elements.push(tag.to_string());

        if is_suppressed(tag) {
            self.nixing.push(tag.to_string());
            return Ok(());
        }
        if !self.nixing.is_empty() {
            return Ok(());
        }

        match tag {
            "div" => self.open_div(attributes),
            "chapter" => {
                let osis_id = required(tag, attributes, "n")?;
                self.close_verse();
                self.close_chapter();
                self.open_chapter(osis_id)
            }
            "v" => {
                let osis_id = required(tag, attributes, "v")?;
                self.close_verse();
                self.open_verse(osis_id)
            }
            "title" => {
                self.open_title();
                Ok(())
            }
            "w" => self.open_word(attributes),
            "seg" => self.open_segment(attributes),
            "catchWord" => {
                self.in_catch_word = true;
                Ok(())
            }
            "rdg" => {
                self.in_reading = true;
                Ok(())
            }
            "note" => {
                self.in_note = true;
                Ok(())
            }
            _ if IGNORED_ELEMENTS.contains(&tag) => Ok(()),
            _ => Err(TransducerError::UnknownTag {
                tag: tag.to_string(),
            }),
        }
    }

    pub fn end_element(&mut self, tag: &str) -> Result<(), TransducerError> {
        let text = std::mem::take(&mut self.pending_text);

        match self.elements.last() {
            Some(open) if open == tag => {}
            open => {
                return Err(TransducerError::MismatchedEndTag {
                    expected: open.cloned().unwrap_or_default(),
                    found: tag.to_string(),
                })
            }
        }

        if is_suppressed(tag) && self.nixing.last().map(String::as_str) == Some(tag) {
            self.nixing.pop();
        } else if self.nixing.is_empty() {
            self.close_element(tag, &text)?;
        }

        self.elements.pop();
        Ok(())
    }

    /// Seals whatever is still open. Fails if the document ended mid-element.
    pub fn finish(mut self) -> Result<Transduction, TransducerError> {
        if let Some(tag) = self.elements.last() {
            return Err(TransducerError::UnclosedElement { tag: tag.clone() });
        }
        self.close_verse();
        self.close_chapter();
        self.close_book();
        self.drop_paragraph();
        Ok(Transduction {
            store: self.store,
            next_monad: self.monads.current(),
            warnings: self.warnings,
        })
    }

    fn close_element(&mut self, tag: &str, text: &str) -> Result<(), TransducerError> {
        let has_text = !text.trim().is_empty();
        match tag {
            "w" => {
                self.close_word(if has_text { text } else { "" });
                return Ok(());
            }
            "seg" => {
                self.close_segment(if has_text { text } else { "" });
                return Ok(());
            }
            _ if has_text => {
                return Err(TransducerError::UnexpectedText {
                    tag: tag.to_string(),
                    text: text.trim().to_string(),
                })
            }
            _ => {}
        }

        match tag {
            "verse" => self.close_verse(),
            "title" => self.close_title(),
            "div" => {
                if self.div_types.len() > 1 {
                    self.div_types.pop();
                }
            }
            "catchWord" => self.in_catch_word = false,
            "rdg" => self.in_reading = false,
            "note" => self.in_note = false,
            // chapter and v are fully handled when they open.
            _ => {}
        }
        Ok(())
    }

    fn take_docindex(&mut self) -> u32 {
        let docindex = self.next_docindex;
        self.next_docindex += 1;
        docindex
    }

    fn open(&mut self, data: RecordData, with_docindex: bool) -> OpenRecord {
        let docindex = with_docindex.then(|| self.take_docindex());
        OpenRecord {
            first_monad: self.monads.current(),
            docindex,
            data,
        }
    }

    /// Moves a record into the store, ending it just before the current monad.
    fn seal(&mut self, open: OpenRecord) {
        let current = self.monads.current();
        if current <= open.first_monad {
            log::debug!(
                "Discarding empty {} opened at monad {}",
                open.data.kind(),
                open.first_monad
            );
            return;
        }
        let mut record = Record::new(open.first_monad, current - 1, open.data);
        record.docindex = open.docindex;
        self.store.push(record);
    }

    fn open_div(&mut self, attributes: &Attributes) -> Result<(), TransducerError> {
        let div_type = required("div", attributes, "type")?;
        self.div_types.push(div_type.to_string());
        if div_type == "book" {
            let osis_id = required("div", attributes, "osisID")?.to_string();
            self.close_verse();
            self.close_chapter();
            self.close_book();
            self.drop_paragraph();
            self.next_docindex = 1;
            let book = self.open(RecordData::Book { osis_id }, true);
            self.book = Some(book);
        }
        Ok(())
    }

    fn close_book(&mut self) {
        if let Some(book) = self.book.take() {
            self.seal(book);
        }
    }

    fn open_chapter(&mut self, osis_id: &str) -> Result<(), TransducerError> {
        let parts = split_osis_id("chapter", osis_id, 2)?;
        let chapter = parse_number("chapter", osis_id, parts[1], "a numeric chapter")?;
        let data = RecordData::Chapter {
            osis_id: osis_id.to_string(),
            osis_book: parts[0].to_string(),
            chapter,
        };
        let chapter = self.open(data, true);
        self.chapter = Some(chapter);
        Ok(())
    }

    fn close_chapter(&mut self) {
        if let Some(chapter) = self.chapter.take() {
            self.seal(chapter);
        }
    }

    fn open_verse(&mut self, osis_id: &str) -> Result<(), TransducerError> {
        let parts = split_osis_id("v", osis_id, 3)?;
        let chapter = parse_number("v", osis_id, parts[1], "a numeric chapter")?;
        let verse = parse_number("v", osis_id, parts[2], "a numeric verse")?;
        let data = RecordData::Verse {
            osis_id: osis_id.to_string(),
            osis_book: parts[0].to_string(),
            chapter,
            verse,
        };
        let verse = self.open(data, true);
        self.verse = Some(verse);
        Ok(())
    }

    fn close_verse(&mut self) {
        if let Some(verse) = self.verse.take() {
            self.seal(verse);
        }
    }

    fn open_title(&mut self) {
        let divtype = match self.div_types.last().map(String::as_str) {
            Some("bookGroup") => Some(TitleDivType::BookGroup),
            Some("book") if self.chapter.is_some() => Some(TitleDivType::Chapter),
            Some("book") => Some(TitleDivType::Book),
            _ => None,
        };
        self.title = divtype.map(|divtype| self.open(RecordData::Title { divtype }, false));
    }

    fn close_title(&mut self) {
        if let Some(title) = self.title.take() {
            self.seal(title);
        }
    }

    fn open_word(&mut self, attributes: &Attributes) -> Result<(), TransducerError> {
        let strongs = attributes
            .get("lemma")
            .unwrap_or("")
            .split('/')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("/");

        let (language, morph) = match attributes.get("morph") {
            Some(morph) => {
                let mut chars = morph.chars();
                let code = chars.next();
                match code.and_then(Language::from_code) {
                    Some(language) => (Some(language), chars.as_str().to_string()),
                    None => {
                        return Err(TransducerError::UnsupportedLanguage {
                            code: code.map(String::from).unwrap_or_default(),
                            morph: morph.to_string(),
                        })
                    }
                }
            }
            None => (None, String::new()),
        };

        let word_type = attributes.get("type").unwrap_or("");
        if !word_type.is_empty() && !WORD_TYPES.contains(&word_type) {
            return Err(TransducerError::UnknownWordType {
                value: word_type.to_string(),
            });
        }

        self.word = Some(WordContext {
            strongs,
            morph,
            language,
            word_id: attributes.get("id").unwrap_or("").to_string(),
            word_type: word_type.to_string(),
            word_n: attributes.get("n").unwrap_or("").to_string(),
            merge: MergePolicy::NONE,
            in_catch_word: self.in_catch_word,
            in_reading: self.in_reading,
            in_note: self.in_note,
        });
        Ok(())
    }

    fn close_word(&mut self, surface: &str) {
        let mut word = self.word.take().unwrap_or_default();
        word.merge = self.merge;

        let monad = self.monads.current();
        if self.paragraph.is_none() {
            let docindex = self.take_docindex();
            self.paragraph = Some(OpenParagraph {
                first_monad: monad,
                docindex,
            });
        }
        self.sink.word(&word, surface, monad, &mut self.store);
        self.monads.advance();
        self.merge = MergePolicy::NONE;
    }

    fn open_segment(&mut self, attributes: &Attributes) -> Result<(), TransducerError> {
        let segment = SegmentType::parse(required("seg", attributes, "type")?)?;

        // The seg itself is already on the element stack.
        let parent = self
            .elements
            .len()
            .checked_sub(2)
            .and_then(|i| self.elements.get(i))
            .map(String::as_str)
            .unwrap_or("");
        if parent != "verse" {
            self.warnings.push(Warning::UnexpectedSegmentParent {
                segment: segment.as_str().to_string(),
                parent: parent.to_string(),
            });
        }

        self.segment = Some(segment);
        self.merge = segment.open_policy();
        Ok(())
    }

    fn close_segment(&mut self, text: &str) {
        let Some(segment) = self.segment.take() else {
            return;
        };
        self.sink.segment(segment, text, self.merge, &mut self.store);
        self.merge = segment.close_policy();
        if let Some(class) = segment.paragraph_class() {
            self.close_paragraph(class);
        }
    }

    /// Seals the open paragraph and opens the next one at the current monad,
    /// drawing its docindex now. A paragraph that would span nothing stays
    /// open with the docindex it already has.
    fn close_paragraph(&mut self, class: ParagraphClass) {
        let current = self.monads.current();
        if let Some(paragraph) = self.paragraph.take() {
            if paragraph.first_monad >= current {
                self.paragraph = Some(paragraph);
                return;
            }
            let open = OpenRecord {
                first_monad: paragraph.first_monad,
                docindex: Some(paragraph.docindex),
                data: RecordData::Paragraph { class },
            };
            self.seal(open);
        }
        let docindex = self.take_docindex();
        self.paragraph = Some(OpenParagraph {
            first_monad: current,
            docindex,
        });
    }

    /// Drops a paragraph no pe or samekh ever terminated; it has no class.
    fn drop_paragraph(&mut self) {
        if let Some(paragraph) = self.paragraph.take() {
            log::debug!(
                "Dropping unterminated paragraph starting at monad {}",
                paragraph.first_monad
            );
        }
    }
}

fn required<'a>(
    tag: &str,
    attributes: &'a Attributes,
    attribute: &str,
) -> Result<&'a str, TransducerError> {
    attributes
        .get(attribute)
        .ok_or_else(|| TransducerError::MissingAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        })
}

fn split_osis_id<'a>(
    tag: &str,
    osis_id: &'a str,
    components: usize,
) -> Result<Vec<&'a str>, TransducerError> {
    let parts: Vec<&str> = osis_id.split('.').collect();
    if parts.len() != components || parts.iter().any(|p| p.is_empty()) {
        return Err(TransducerError::MalformedOsisId {
            tag: tag.to_string(),
            osis_id: osis_id.to_string(),
            expected: format!("{components} dot-separated components"),
        });
    }
    Ok(parts)
}

fn parse_number(tag: &str, osis_id: &str, part: &str, expected: &str) -> Result<u32, TransducerError> {
    part.parse().map_err(|_| TransducerError::MalformedOsisId {
        tag: tag.to_string(),
        osis_id: osis_id.to_string(),
        expected: expected.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordKind, WordToken};

    fn run(events: Vec<XmlEvent>) -> Result<Transduction, TransducerError> {
        let mut transducer = Transducer::new();
        for event in events {
            transducer.handle(event)?;
        }
        transducer.finish()
    }

    fn word() -> Vec<XmlEvent> {
        vec![
            XmlEvent::start("w", [("lemma", "H1"), ("morph", "HNcmsa")]),
            XmlEvent::text("דבר"),
            XmlEvent::end("w"),
        ]
    }

    fn seg(kind: &str) -> Vec<XmlEvent> {
        vec![
            XmlEvent::start("seg", [("type", kind)]),
            XmlEvent::end("seg"),
        ]
    }

    fn verse(osis_id: &str, body: Vec<Vec<XmlEvent>>) -> Vec<XmlEvent> {
        let mut events = vec![
            XmlEvent::start("v", [("v", osis_id)]),
            XmlEvent::tag("verse"),
        ];
        events.extend(body.into_iter().flatten());
        events.push(XmlEvent::end("verse"));
        events.push(XmlEvent::end("v"));
        events
    }

    fn book(osis_id: &str, body: Vec<XmlEvent>) -> Vec<XmlEvent> {
        let mut events = vec![XmlEvent::start("div", [("type", "book"), ("osisID", osis_id)])];
        events.extend(body);
        events.push(XmlEvent::end("div"));
        events
    }

    fn chapter(osis_id: &str, body: Vec<XmlEvent>) -> Vec<XmlEvent> {
        let mut events = vec![XmlEvent::start("chapter", [("n", osis_id)])];
        events.extend(body);
        events.push(XmlEvent::end("chapter"));
        events
    }

    #[test]
    fn words_consume_one_monad_each() {
        let events = book(
            "Gen",
            chapter("Gen.1", verse("Gen.1.1", vec![word(), word(), word()])),
        );
        let result = run(events).unwrap();
        assert_eq!(result.next_monad, 4);
        let verse = &result.store.get(RecordKind::Verse)[0];
        assert_eq!((verse.first_monad, verse.last_monad), (1, 3));
    }

    #[test]
    fn empty_verse_is_discarded() {
        let mut body = verse("Gen.1.1", vec![]);
        body.extend(verse("Gen.1.2", vec![word()]));
        let result = run(book("Gen", chapter("Gen.1", body))).unwrap();
        let verses = result.store.get(RecordKind::Verse);
        assert_eq!(verses.len(), 1);
        assert_eq!(
            verses[0].data,
            RecordData::Verse {
                osis_id: "Gen.1.2".to_string(),
                osis_book: "Gen".to_string(),
                chapter: 1,
                verse: 2,
            }
        );
    }

    #[test]
    fn new_chapter_closes_the_open_verse() {
        // A verse left open by a missing </verse> is closed by the next chapter.
        let mut events = vec![
            XmlEvent::start("div", [("type", "book"), ("osisID", "Gen")]),
            XmlEvent::start("chapter", [("n", "Gen.1")]),
            XmlEvent::start("v", [("v", "Gen.1.31")]),
        ];
        events.extend(word());
        events.push(XmlEvent::end("v"));
        events.push(XmlEvent::end("chapter"));
        events.push(XmlEvent::start("chapter", [("n", "Gen.2")]));
        events.extend(verse("Gen.2.1", vec![word()]));
        events.push(XmlEvent::end("chapter"));
        events.push(XmlEvent::end("div"));

        let result = run(events).unwrap();
        let verses = result.store.get(RecordKind::Verse);
        assert_eq!((verses[0].first_monad, verses[0].last_monad), (1, 1));
        let chapters = result.store.get(RecordKind::Chapter);
        assert_eq!(chapters.len(), 2);
        assert_eq!((chapters[0].first_monad, chapters[0].last_monad), (1, 1));
        assert_eq!((chapters[1].first_monad, chapters[1].last_monad), (2, 2));
    }

    #[test]
    fn paragraphs_are_sealed_by_pe_and_samekh() {
        let body = verse(
            "Gen.1.1",
            vec![word(), word(), seg("x-pe"), word(), seg("x-samekh")],
        );
        let result = run(book("Gen", chapter("Gen.1", body))).unwrap();
        let paragraphs = result.store.get(RecordKind::Paragraph);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!((paragraphs[0].first_monad, paragraphs[0].last_monad), (1, 2));
        assert_eq!(
            paragraphs[0].data,
            RecordData::Paragraph {
                class: ParagraphClass::Pe
            }
        );
        assert_eq!((paragraphs[1].first_monad, paragraphs[1].last_monad), (3, 3));
        assert_eq!(
            paragraphs[1].data,
            RecordData::Paragraph {
                class: ParagraphClass::Samekh
            }
        );
    }

    #[test]
    fn pe_immediately_after_pe_emits_nothing() {
        let body = verse("Gen.1.1", vec![word(), seg("x-pe"), seg("x-pe")]);
        let result = run(book("Gen", chapter("Gen.1", body))).unwrap();
        assert_eq!(result.store.count(RecordKind::Paragraph), 1);
    }

    #[test]
    fn empty_paragraph_stays_open_with_its_docindex() {
        let body = verse(
            "Gen.1.1",
            vec![word(), seg("x-pe"), seg("x-pe"), word(), seg("x-samekh")],
        );
        let result = run(book("Gen", chapter("Gen.1", body))).unwrap();
        let paragraphs: Vec<(Monad, Monad, Option<u32>)> = result
            .store
            .get(RecordKind::Paragraph)
            .iter()
            .map(|r| (r.first_monad, r.last_monad, r.docindex))
            .collect();
        // The second pe draws nothing: the paragraph opened by the first is kept.
        assert_eq!(paragraphs, vec![(1, 1, Some(4)), (2, 2, Some(5))]);
    }

    #[test]
    fn next_paragraph_draws_docindex_at_the_marker() {
        let mut body = chapter("Gen.1", verse("Gen.1.1", vec![word(), seg("x-pe")]));
        body.extend(chapter("Gen.2", verse("Gen.2.1", vec![word(), seg("x-pe")])));
        let result = run(book("Gen", body)).unwrap();
        let store = &result.store;

        let docindices = |kind| {
            store
                .get(kind)
                .iter()
                .map(|r: &Record| r.docindex)
                .collect::<Vec<_>>()
        };
        assert_eq!(docindices(RecordKind::Chapter), vec![Some(2), Some(6)]);
        assert_eq!(docindices(RecordKind::Verse), vec![Some(3), Some(7)]);
        assert_eq!(docindices(RecordKind::Paragraph), vec![Some(4), Some(5)]);
        let spans: Vec<(Monad, Monad)> = store
            .get(RecordKind::Paragraph)
            .iter()
            .map(|r| (r.first_monad, r.last_monad))
            .collect();
        assert_eq!(spans, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn paragraph_draws_docindex_when_its_first_word_arrives() {
        let body = verse("Gen.1.1", vec![word(), seg("x-pe")]);
        let result = run(book("Gen", chapter("Gen.1", body))).unwrap();
        assert_eq!(result.store.get(RecordKind::Paragraph)[0].docindex, Some(4));
    }

    #[test]
    fn titles_follow_the_innermost_division() {
        let title = vec![
            XmlEvent::tag("title"),
            XmlEvent::start("w", [("morph", "HNp")]),
            XmlEvent::end("w"),
            XmlEvent::end("title"),
        ];
        let mut events = vec![XmlEvent::start("div", [("type", "bookGroup")])];
        events.extend(title.clone());
        events.extend(book(
            "Gen",
            [title.clone(), chapter("Gen.1", [title, verse("Gen.1.1", vec![word()])].concat())]
                .concat(),
        ));
        events.push(XmlEvent::end("div"));

        let result = run(events).unwrap();
        let divtypes: Vec<RecordData> = result
            .store
            .get(RecordKind::Title)
            .iter()
            .map(|r| r.data.clone())
            .collect();
        assert_eq!(
            divtypes,
            vec![
                RecordData::Title {
                    divtype: TitleDivType::BookGroup
                },
                RecordData::Title {
                    divtype: TitleDivType::Book
                },
                RecordData::Title {
                    divtype: TitleDivType::Chapter
                },
            ]
        );
    }

    #[test]
    fn suppressed_subtrees_are_skipped_wholesale() {
        let mut events = vec![
            XmlEvent::tag("tanach"),
            XmlEvent::tag("teiHeader"),
            XmlEvent::tag("anything"),
            XmlEvent::text("free text"),
            XmlEvent::start("w", [("morph", "Zbogus")]),
            XmlEvent::end("w"),
            XmlEvent::end("anything"),
            XmlEvent::end("teiHeader"),
        ];
        events.extend(book("Gen", chapter("Gen.1", verse("Gen.1.1", vec![word()]))));
        events.push(XmlEvent::end("tanach"));

        let result = run(events).unwrap();
        assert_eq!(result.next_monad, 2);
    }

    #[test]
    fn segment_outside_verse_is_only_a_warning() {
        let events = book("Gen", chapter("Gen.1", seg("x-paseq")));
        let result = run(events).unwrap();
        assert_eq!(
            result.warnings,
            vec![Warning::UnexpectedSegmentParent {
                segment: "x-paseq".to_string(),
                parent: "chapter".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_tag_is_fatal() {
        let mut transducer = Transducer::new();
        let err = transducer
            .start_element("foo", &Attributes::new())
            .unwrap_err();
        assert_eq!(
            err,
            TransducerError::UnknownTag {
                tag: "foo".to_string()
            }
        );
    }

    #[test]
    fn word_validation() {
        let mut transducer = Transducer::new();
        let greek: Attributes = [("morph", "GNcmsa")].into_iter().collect();
        assert!(matches!(
            transducer.start_element("w", &greek),
            Err(TransducerError::UnsupportedLanguage { .. })
        ));

        let mut transducer = Transducer::new();
        let qere: Attributes = [("type", "x-qere")].into_iter().collect();
        assert!(matches!(
            transducer.start_element("w", &qere),
            Err(TransducerError::UnknownWordType { .. })
        ));
    }

    #[test]
    fn malformed_osis_ids_are_fatal() {
        for (tag, attr, id) in [
            ("chapter", "n", "Gen"),
            ("chapter", "n", "Gen.x"),
            ("v", "v", "Gen.1"),
            ("v", "v", "Gen..1"),
        ] {
            let mut transducer = Transducer::new();
            let attributes: Attributes = [(attr, id)].into_iter().collect();
            assert!(
                matches!(
                    transducer.start_element(tag, &attributes),
                    Err(TransducerError::MalformedOsisId { .. })
                ),
                "{tag} {id}"
            );
        }
    }

    #[test]
    fn mismatched_and_unclosed_elements_are_fatal() {
        let mut transducer = Transducer::new();
        transducer.start_element("book", &Attributes::new()).unwrap();
        assert_eq!(
            transducer.end_element("tanach"),
            Err(TransducerError::MismatchedEndTag {
                expected: "book".to_string(),
                found: "tanach".to_string(),
            })
        );

        let mut transducer = Transducer::new();
        transducer.start_element("book", &Attributes::new()).unwrap();
        assert_eq!(
            transducer.finish().unwrap_err(),
            TransducerError::UnclosedElement {
                tag: "book".to_string()
            }
        );
    }

    #[test]
    fn stray_text_is_fatal_but_whitespace_is_not() {
        let mut transducer = Transducer::new();
        transducer.start_element("book", &Attributes::new()).unwrap();
        transducer.characters("\n   \t");
        transducer.end_element("book").unwrap();

        let mut transducer = Transducer::new();
        transducer.start_element("book", &Attributes::new()).unwrap();
        transducer.characters("stray");
        assert!(matches!(
            transducer.end_element("book"),
            Err(TransducerError::UnexpectedText { .. })
        ));
    }

    #[test]
    fn lemma_components_are_trimmed() {
        #[derive(Default)]
        struct Lemmas(Vec<String>);
        impl TokenSink for Lemmas {
            fn word(&mut self, word: &WordContext, _: &str, _: Monad, _: &mut RecordStore) {
                self.0.push(word.strongs.clone());
            }
        }

        let mut lemmas = Lemmas::default();
        let mut transducer = Transducer::with_sink(&mut lemmas, FIRST_MONAD);
        let attributes: Attributes = [("lemma", "b/ 7225 "), ("morph", "HR/Ncfsa")]
            .into_iter()
            .collect();
        transducer.start_element("w", &attributes).unwrap();
        transducer.end_element("w").unwrap();
        transducer.finish().unwrap();
        assert_eq!(lemmas.0, vec!["b/7225".to_string()]);
    }

    #[test]
    fn token_sink_sees_the_context_of_each_word() {
        /// Surface, then the reading, note and catch-word flags.
        type Seen = (String, bool, bool, bool);

        #[derive(Default)]
        struct Tokens(Vec<Seen>);
        impl TokenSink for Tokens {
            fn word(&mut self, word: &WordContext, surface: &str, monad: Monad, store: &mut RecordStore) {
                self.0.push((
                    surface.to_string(),
                    word.in_reading,
                    word.in_note,
                    word.in_catch_word,
                ));
                let token = WordToken {
                    surface: surface.to_string(),
                    language: word.language.unwrap_or(Language::Hebrew),
                    morph: word.morph.clone(),
                    strongs: word.strongs.clone(),
                    word_id: word.word_id.clone(),
                    word_type: word.word_type.clone(),
                    word_n: word.word_n.clone(),
                };
                store.push(Record::new(monad, monad, RecordData::Token(token)));
            }

            fn segment(&mut self, _: SegmentType, text: &str, merge: MergePolicy, store: &mut RecordStore) {
                if !merge.add_to_current {
                    return;
                }
                if let Some(Record {
                    data: RecordData::Token(token),
                    ..
                }) = store.last_mut(RecordKind::Token)
                {
                    token.surface.push_str(text);
                }
            }
        }

        fn w(surface: &str) -> Vec<XmlEvent> {
            vec![
                XmlEvent::start("w", [("morph", "HNcmsa")]),
                XmlEvent::text(surface),
                XmlEvent::end("w"),
            ]
        }
        fn within(tag: &str, inner: Vec<XmlEvent>) -> Vec<XmlEvent> {
            let mut events = vec![XmlEvent::tag(tag)];
            events.extend(inner);
            events.push(XmlEvent::end(tag));
            events
        }
        let sof_pasuq = vec![
            XmlEvent::start("seg", [("type", "x-sof-pasuq")]),
            XmlEvent::text("׃"),
            XmlEvent::end("seg"),
        ];
        let body = verse(
            "Gen.1.1",
            vec![
                w("a"),
                within("rdg", w("b")),
                within("note", w("c")),
                within("catchWord", w("d")),
                sof_pasuq,
                w("e"),
            ],
        );

        let mut tokens = Tokens::default();
        let mut transducer = Transducer::with_sink(&mut tokens, FIRST_MONAD);
        for event in book("Gen", chapter("Gen.1", body)) {
            transducer.handle(event).unwrap();
        }
        let result = transducer.finish().unwrap();

        let seen = |s: &str, reading, note, catch_word| (s.to_string(), reading, note, catch_word);
        assert_eq!(
            tokens.0,
            vec![
                seen("a", false, false, false),
                seen("b", true, false, false),
                seen("c", false, true, false),
                seen("d", false, false, true),
                seen("e", false, false, false),
            ]
        );

        let surfaces: Vec<(Monad, &str)> = result
            .store
            .get(RecordKind::Token)
            .iter()
            .map(|r| match &r.data {
                RecordData::Token(token) => (r.first_monad, token.surface.as_str()),
                other => panic!("unexpected record {other:?}"),
            })
            .collect();
        assert_eq!(
            surfaces,
            vec![(1, "a"), (2, "b"), (3, "c"), (4, "d׃"), (5, "e")]
        );
    }
}
