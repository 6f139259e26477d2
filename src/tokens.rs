//! Extension point for word-level token records.
//!
//! The transducer calls a [`TokenSink`] once per `<w>` element (with the monad
//! the word occupies) and once per `<seg>` element. How word text becomes
//! `Token`, `NonBibleToken` or `NonWordBibleToken` records is not settled, so
//! the default sink, [`NoTokens`], records nothing.

use crate::monad::Monad;
use crate::record::Language;
use crate::segment::{MergePolicy, SegmentType};
use crate::store::RecordStore;

/// Attributes captured from a `<w>` start tag, plus the context it appeared in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordContext {
    /// Lemma components, each trimmed, joined with `/`.
    pub strongs: String,
    /// Morphology code without its leading language character.
    pub morph: String,
    pub language: Option<Language>,
    pub word_id: String,
    pub word_type: String,
    pub word_n: String,
    /// Merge policy in force when the word closed.
    pub merge: MergePolicy,
    pub in_catch_word: bool,
    pub in_reading: bool,
    pub in_note: bool,
}

pub trait TokenSink {
    /// Called when a `<w>` closes. `surface` is its character data, empty if it
    /// had none. `monad` is the monad the word occupies.
    fn word(&mut self, word: &WordContext, surface: &str, monad: Monad, store: &mut RecordStore) {
        let _ = (word, surface, monad, store);
    }

    /// Called when a `<seg>` closes, with the policy that was in force while
    /// its text was read.
    fn segment(
        &mut self,
        segment: SegmentType,
        text: &str,
        merge: MergePolicy,
        store: &mut RecordStore,
    ) {
        let _ = (segment, text, merge, store);
    }
}

/// Produces no token records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokens;

impl TokenSink for NoTokens {}

impl<T: TokenSink + ?Sized> TokenSink for &mut T {
    fn word(&mut self, word: &WordContext, surface: &str, monad: Monad, store: &mut RecordStore) {
        (**self).word(word, surface, monad, store);
    }

    fn segment(
        &mut self,
        segment: SegmentType,
        text: &str,
        merge: MergePolicy,
        store: &mut RecordStore,
    ) {
        (**self).segment(segment, text, merge, store);
    }
}
