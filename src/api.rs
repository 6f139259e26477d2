use crate::error::MqlError;
use crate::monad::FIRST_MONAD;
use crate::mql;
use crate::reader::EventReader;
use crate::tokens::TokenSink;
use crate::transducer::{Transducer, Transduction};
use crate::utils::get_line_and_column;
use miette::{NamedSource, SourceSpan};

impl Transduction {
    /// Renders the records as a self-contained MQL script, ending in `VACUUM DATABASE ANALYZE GO`.
    ///
    /// # Errors
    /// Only fails if writing to the in-memory buffer fails.
    pub fn to_mql(&self) -> std::io::Result<String> {
        mql::to_mql_string(&self.store)
    }

    /// Serializes the records and warnings into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the records and warnings into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

/// Transduces a single book document, numbering its words from the first monad.
///
/// # Errors
/// Returns an `MqlError` if the XML is malformed or uses a construct the
/// transducer does not understand.
pub fn transduce_str(source: &str, file_name: &str) -> Result<Transduction, MqlError> {
    transduce_with(source, file_name, Transducer::starting_at(FIRST_MONAD))
}

/// Feeds every event of `source` through `transducer`, attaching the offending
/// markup to any error. Warnings are logged with their position as they arise.
///
/// # Errors
/// See [`transduce_str`].
pub fn transduce_with<S: TokenSink>(
    source: &str,
    file_name: &str,
    mut transducer: Transducer<S>,
) -> Result<Transduction, MqlError> {
    let named = || NamedSource::new(file_name, source.to_string());

    for item in EventReader::new(source) {
        let (span, event) = item.map_err(|e| MqlError::Xml {
            src: named(),
            span: e.span,
            message: e.message,
        })?;

        let seen = transducer.warnings().len();
        transducer
            .handle(event)
            .map_err(|cause| MqlError::Transducer {
                src: named(),
                span,
                cause,
            })?;

        for warning in &transducer.warnings()[seen..] {
            let (line, column) = get_line_and_column(source, span.offset());
            log::warn!("{file_name}:{line}:{column}: {warning}");
        }
    }

    transducer.finish().map_err(|cause| MqlError::Transducer {
        src: named(),
        span: SourceSpan::from((source.len(), 0)),
        cause,
    })
}
