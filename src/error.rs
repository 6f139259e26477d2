use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Top-level error for everything from reading a book file to writing the MQL dump.
#[derive(Error, Debug, Diagnostic)]
pub enum MqlError {
    #[error("{cause}")]
    #[diagnostic(code(mql::transducer))]
    Transducer {
        #[source_code]
        src: NamedSource<String>,
        #[label("while handling this event")]
        span: SourceSpan,
        #[diagnostic_source]
        cause: TransducerError,
    },

    #[error("Malformed XML: {message}")]
    #[diagnostic(
        code(mql::xml),
        help("The document could not be tokenized. Check that tags are balanced and attributes are quoted.")
    )]
    Xml {
        #[source_code]
        src: NamedSource<String>,
        #[label("the XML reader stopped here")]
        span: SourceSpan,
        message: String,
    },

    #[error("I/O error on {path}")]
    #[diagnostic(code(mql::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(
        code(mql::config),
        help("Check the configuration file and the command-line overrides.")
    )]
    Config(#[from] ::config::ConfigError),
}

impl MqlError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        MqlError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the element state machine. All of them are fatal: an
/// unrecognized construct means the monad and record accounting would be wrong.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum TransducerError {
    #[error("Unknown start-tag <{tag}>")]
    #[diagnostic(
        code(transducer::unknown_tag),
        help("Only the OSIS subset used by the Westminster Leningrad Codex is supported.")
    )]
    UnknownTag { tag: String },

    #[error("Unknown seg@type '{value}'")]
    #[diagnostic(
        code(transducer::unknown_segment_type),
        help("Expected one of x-sof-pasuq, x-maqqef, x-paseq, x-pe, x-samekh, x-large, x-reversednun, x-suspended, x-small.")
    )]
    UnknownSegmentType { value: String },

    #[error("Unknown w@type '{value}'")]
    #[diagnostic(
        code(transducer::unknown_word_type),
        help("The only word type understood is x-ketiv.")
    )]
    UnknownWordType { value: String },

    #[error("Unknown token language '{code}' in w@morph '{morph}'")]
    #[diagnostic(
        code(transducer::unsupported_language),
        help("The first character of a morphology code must be H (Hebrew) or A (Aramaic).")
    )]
    UnsupportedLanguage { code: String, morph: String },

    #[error("Malformed osisID '{osis_id}' on <{tag}>: expected {expected}")]
    #[diagnostic(code(transducer::malformed_osis_id))]
    MalformedOsisId {
        tag: String,
        osis_id: String,
        expected: String,
    },

    #[error("<{tag}> is missing the required attribute '{attribute}'")]
    #[diagnostic(code(transducer::missing_attribute))]
    MissingAttribute { tag: String, attribute: String },

    #[error("End-tag </{found}> does not match open element <{expected}>")]
    #[diagnostic(code(transducer::mismatched_end_tag))]
    MismatchedEndTag { expected: String, found: String },

    #[error("Document ended while <{tag}> was still open")]
    #[diagnostic(code(transducer::unclosed_element))]
    UnclosedElement { tag: String },

    #[error("Don't know how to handle text '{text}' closing <{tag}>")]
    #[diagnostic(
        code(transducer::unexpected_text),
        help("Only <w> and <seg> may carry character data outside suppressed subtrees.")
    )]
    UnexpectedText { tag: String, text: String },
}
