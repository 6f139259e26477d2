//! Whole-corpus conversion: every configured book, in order, into one MQL file.

use crate::api::transduce_with;
use crate::config::ConvertConfig;
use crate::error::MqlError;
use crate::mirror::mirror_document;
use crate::monad::{Monad, FIRST_MONAD};
use crate::mql::MqlWriter;
use crate::store::RecordStore;
use crate::transducer::Transducer;
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSummary {
    pub name: String,
    pub first_monad: Monad,
    /// The first monad left for the next book.
    pub next_monad: Monad,
    pub records: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub books: Vec<BookSummary>,
    pub records: usize,
}

impl ConversionSummary {
    /// Words seen across all books.
    pub fn monads(&self) -> u64 {
        self.books
            .last()
            .map_or(0, |book| book.next_monad - FIRST_MONAD)
    }
}

/// Converts the configured books and writes the MQL script. Monads continue
/// from one book to the next. Nothing is written to the MQL file unless every
/// book transduces cleanly.
///
/// # Errors
/// Returns the first I/O, XML or transducer error encountered.
pub fn convert(config: &ConvertConfig) -> Result<ConversionSummary, MqlError> {
    let mut store = RecordStore::new();
    let mut summary = ConversionSummary::default();
    let mut next_monad = FIRST_MONAD;

    for book in &config.input.books {
        let path = config.input.book_path(book);
        let name = path.display().to_string();
        log::info!("Now reading: {name} ...");
        let source = fs::read_to_string(&path).map_err(|e| MqlError::io(&name, e))?;

        let transduction = transduce_with(&source, &name, Transducer::starting_at(next_monad))?;

        if let Some(mirror_path) = config.mirror.book_path(book) {
            log::info!("Now writing: {} ...", mirror_path.display());
            write_mirror(&source, &name, &mirror_path)?;
        }

        summary.books.push(BookSummary {
            name: book.clone(),
            first_monad: next_monad,
            next_monad: transduction.next_monad,
            records: transduction.store.len(),
            warnings: transduction.warnings.len(),
        });
        next_monad = transduction.next_monad;
        store.append(transduction.store);
    }

    summary.records = store.len();
    write_mql(&store, &config.output.mql, config.output.batch_size)?;
    log::info!(
        "Finished dumping {} records from {} book(s)",
        summary.records,
        summary.books.len()
    );
    Ok(summary)
}

fn write_mirror(source: &str, source_name: &str, path: &Path) -> Result<(), MqlError> {
    let out_name = path.display().to_string();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| MqlError::io(dir.display().to_string(), e))?;
    }
    let file = fs::File::create(path).map_err(|e| MqlError::io(&out_name, e))?;
    mirror_document(source, source_name, BufWriter::new(file), &out_name)?;
    Ok(())
}

fn write_mql(store: &RecordStore, path: &Path, batch_size: usize) -> Result<(), MqlError> {
    let name = path.display().to_string();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| MqlError::io(dir.display().to_string(), e))?;
    }
    let file = fs::File::create(path).map_err(|e| MqlError::io(&name, e))?;
    let mut writer = MqlWriter::with_batch_size(BufWriter::new(file), batch_size);
    writer
        .write_store(store)
        .map_err(|e| MqlError::io(&name, e))?;
    writer.finish().map_err(|e| MqlError::io(&name, e))?;
    Ok(())
}
