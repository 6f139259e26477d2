//! Typed records and the attributes they contribute to the MQL dump.
//!
//! Every record kind carries only its own fields. The order in which
//! [`Record::attributes`] lists them is the order they are written: numeric
//! (and enumeration) attributes first, then string attributes, each group in
//! the order the opening code path assigns them.

use crate::monad::Monad;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::{self, Display};

/// The fixed set of object types. The derived ordering is the dump order, and is
/// lexicographic over the structural object type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RecordKind {
    Book,
    Chapter,
    Paragraph,
    Title,
    Verse,
    Token,
    NonBibleToken,
    NonWordBibleToken,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Book,
        RecordKind::Chapter,
        RecordKind::Paragraph,
        RecordKind::Title,
        RecordKind::Verse,
        RecordKind::Token,
        RecordKind::NonBibleToken,
        RecordKind::NonWordBibleToken,
    ];

    /// The object type name used in `CREATE OBJECTS WITH OBJECT TYPE [...]`.
    pub fn object_type_name(self) -> &'static str {
        match self {
            RecordKind::Book => "book",
            RecordKind::Chapter => "chapter",
            RecordKind::Paragraph => "paragraph",
            RecordKind::Title => "title",
            RecordKind::Verse => "verse",
            RecordKind::Token => "Token",
            RecordKind::NonBibleToken => "NonBibleToken",
            RecordKind::NonWordBibleToken => "NonWordBibleToken",
        }
    }

    /// Token kinds always occupy a single monad.
    pub fn is_token(self) -> bool {
        matches!(
            self,
            RecordKind::Token | RecordKind::NonBibleToken | RecordKind::NonWordBibleToken
        )
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.object_type_name())
    }
}

/// Which kind of division a title belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TitleDivType {
    #[serde(rename = "bookGroup")]
    BookGroup,
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "chapter")]
    Chapter,
}

impl TitleDivType {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleDivType::BookGroup => "bookGroup",
            TitleDivType::Book => "book",
            TitleDivType::Chapter => "chapter",
        }
    }
}

/// The segment marker that closed a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphClass {
    Pe,
    Samekh,
}

impl ParagraphClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ParagraphClass::Pe => "pe",
            ParagraphClass::Samekh => "samekh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    Hebrew,
    Aramaic,
}

impl Language {
    /// Maps the leading character of a morphology code to a language.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'H' => Some(Language::Hebrew),
            'A' => Some(Language::Aramaic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Hebrew => "Hebrew",
            Language::Aramaic => "Aramaic",
        }
    }
}

/// The fields of a `Token` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordToken {
    pub surface: String,
    pub language: Language,
    pub morph: String,
    pub strongs: String,
    pub word_id: String,
    pub word_type: String,
    pub word_n: String,
}

/// Kind-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum RecordData {
    Book {
        osis_id: String,
    },
    Chapter {
        osis_id: String,
        osis_book: String,
        chapter: u32,
    },
    Verse {
        osis_id: String,
        osis_book: String,
        chapter: u32,
        verse: u32,
    },
    Title {
        divtype: TitleDivType,
    },
    Paragraph {
        class: ParagraphClass,
    },
    Token(WordToken),
    NonBibleToken {
        wholesurface: String,
    },
    NonWordBibleToken {
        wholesurface: String,
    },
}

impl RecordData {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordData::Book { .. } => RecordKind::Book,
            RecordData::Chapter { .. } => RecordKind::Chapter,
            RecordData::Verse { .. } => RecordKind::Verse,
            RecordData::Title { .. } => RecordKind::Title,
            RecordData::Paragraph { .. } => RecordKind::Paragraph,
            RecordData::Token(_) => RecordKind::Token,
            RecordData::NonBibleToken { .. } => RecordKind::NonBibleToken,
            RecordData::NonWordBibleToken { .. } => RecordKind::NonWordBibleToken,
        }
    }
}

/// The value half of an MQL feature assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// Written bare, e.g. `chapter:=1;`.
    Integer(u64),
    /// An enumeration constant, also written bare, e.g. `divtype:=book;`.
    Enum(&'static str),
    /// Written quoted and mangled, e.g. `osisID:="Gen";`.
    Text(Cow<'a, str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'static str,
    pub value: AttributeValue<'a>,
}

impl<'a> Attribute<'a> {
    fn integer(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value: AttributeValue::Integer(value),
        }
    }

    fn enumeration(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value: AttributeValue::Enum(value),
        }
    }

    fn text(name: &'static str, value: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name,
            value: AttributeValue::Text(value.into()),
        }
    }
}

/// A completed object spanning `first_monad..=last_monad`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub first_monad: Monad,
    pub last_monad: Monad,
    /// Explicit object id; 0 leaves the id to the database.
    #[serde(skip_serializing_if = "is_unassigned")]
    pub id_d: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docindex: Option<u32>,
    #[serde(flatten)]
    pub data: RecordData,
}

fn is_unassigned(id_d: &u64) -> bool {
    *id_d == 0
}

impl Record {
    pub fn new(first_monad: Monad, last_monad: Monad, data: RecordData) -> Self {
        Self {
            first_monad,
            last_monad,
            id_d: 0,
            docindex: None,
            data,
        }
    }

    pub fn with_docindex(mut self, docindex: u32) -> Self {
        self.docindex = Some(docindex);
        self
    }

    pub fn with_id_d(mut self, id_d: u64) -> Self {
        self.id_d = id_d;
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.data.kind()
    }

    /// Attributes in emission order.
    pub fn attributes(&self) -> Vec<Attribute<'_>> {
        let docindex = self
            .docindex
            .map(|d| Attribute::integer("docindex", u64::from(d)));
        let mut attrs = Vec::new();
        match &self.data {
            RecordData::Book { osis_id } => {
                attrs.extend(docindex);
                attrs.push(Attribute::text("osisID", osis_id.as_str()));
            }
            RecordData::Chapter {
                osis_id,
                osis_book,
                chapter,
            } => {
                attrs.push(Attribute::integer("chapter", u64::from(*chapter)));
                attrs.extend(docindex);
                attrs.push(Attribute::text("osisID", osis_id.as_str()));
                attrs.push(Attribute::text("osisBook", osis_book.as_str()));
            }
            RecordData::Verse {
                osis_id,
                osis_book,
                chapter,
                verse,
            } => {
                attrs.push(Attribute::integer("chapter", u64::from(*chapter)));
                attrs.push(Attribute::integer("verse", u64::from(*verse)));
                attrs.extend(docindex);
                // Stored bare, emitted with one space on either side.
                attrs.push(Attribute::text("osisID", format!(" {osis_id} ")));
                attrs.push(Attribute::text("osisBook", osis_book.as_str()));
            }
            RecordData::Title { divtype } => {
                attrs.push(Attribute::enumeration("divtype", divtype.as_str()));
                attrs.extend(docindex);
            }
            RecordData::Paragraph { class } => {
                attrs.extend(docindex);
                attrs.push(Attribute::text("class", class.as_str()));
            }
            RecordData::Token(token) => {
                attrs.push(Attribute::enumeration("language", token.language.as_str()));
                attrs.extend(docindex);
                attrs.push(Attribute::text("surface", token.surface.as_str()));
                attrs.push(Attribute::text("word_id", token.word_id.as_str()));
                attrs.push(Attribute::text("word_type", token.word_type.as_str()));
                attrs.push(Attribute::text("word_n", token.word_n.as_str()));
                attrs.push(Attribute::text("morph", token.morph.as_str()));
                attrs.push(Attribute::text("strongs", token.strongs.as_str()));
            }
            RecordData::NonBibleToken { wholesurface }
            | RecordData::NonWordBibleToken { wholesurface } => {
                attrs.extend(docindex);
                attrs.push(Attribute::text("wholesurface", wholesurface.as_str()));
            }
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(record: &Record) -> Vec<&'static str> {
        record.attributes().iter().map(|a| a.name).collect()
    }

    #[test]
    fn verse_attributes_put_numbers_first_and_pad_the_id() {
        let verse = Record::new(
            1,
            3,
            RecordData::Verse {
                osis_id: "Gen.1.1".to_string(),
                osis_book: "Gen".to_string(),
                chapter: 1,
                verse: 1,
            },
        )
        .with_docindex(3);

        assert_eq!(
            names(&verse),
            vec!["chapter", "verse", "docindex", "osisID", "osisBook"]
        );
        assert_eq!(
            verse.attributes()[3].value,
            AttributeValue::Text(Cow::Owned(" Gen.1.1 ".to_string()))
        );
    }

    #[test]
    fn title_divtype_is_an_enumeration() {
        let title = Record::new(
            5,
            6,
            RecordData::Title {
                divtype: TitleDivType::BookGroup,
            },
        );
        assert_eq!(
            title.attributes(),
            vec![Attribute::enumeration("divtype", "bookGroup")]
        );
    }

    #[test]
    fn kind_order_is_lexicographic_over_structural_names() {
        let structural: Vec<&str> = RecordKind::ALL
            .iter()
            .filter(|k| !k.is_token())
            .map(|k| k.object_type_name())
            .collect();
        let mut sorted = structural.clone();
        sorted.sort_unstable();
        assert_eq!(structural, sorted);
    }

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code('H'), Some(Language::Hebrew));
        assert_eq!(Language::from_code('A'), Some(Language::Aramaic));
        assert_eq!(Language::from_code('G'), None);
    }
}
