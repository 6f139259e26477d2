//! The batched, transactional MQL dump.

use crate::mangle::mangle;
use crate::record::{AttributeValue, Record, RecordKind};
use crate::store::RecordStore;
use std::io::{self, Write};

/// Records per transaction before the block is committed and a new one begun.
pub const DEFAULT_BATCH_SIZE: usize = 50_000;

/// Writes record stores as MQL. One writer may receive several stores (one per
/// book); [`MqlWriter::finish`] appends the closing maintenance directive.
pub struct MqlWriter<W: Write> {
    out: W,
    batch_size: usize,
}

impl<W: Write> MqlWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_batch_size(out, DEFAULT_BATCH_SIZE)
    }

    /// A `batch_size` of 0 is treated as 1.
    pub fn with_batch_size(out: W, batch_size: usize) -> Self {
        Self {
            out,
            batch_size: batch_size.max(1),
        }
    }

    /// Dumps every non-empty kind of `store`, in kind order. A kind with no
    /// records gets no transaction block at all; this includes `Token` and
    /// `NonBibleToken` while no [`TokenSink`](crate::tokens::TokenSink)
    /// produces them.
    pub fn write_store(&mut self, store: &RecordStore) -> io::Result<()> {
        for (kind, records) in store.iter() {
            log::info!("Now dumping [{kind}] ...");
            self.write_kind(kind, records)?;
        }
        Ok(())
    }

    /// Dumps the records of one kind as one or more transaction blocks.
    pub fn write_kind(&mut self, kind: RecordKind, records: &[Record]) -> io::Result<()> {
        for batch in records.chunks(self.batch_size) {
            self.begin(kind)?;
            for record in batch {
                self.write_record(record)?;
            }
            self.commit()?;
        }
        Ok(())
    }

    fn begin(&mut self, kind: RecordKind) -> io::Result<()> {
        writeln!(self.out, "BEGIN TRANSACTION GO")?;
        writeln!(
            self.out,
            "CREATE OBJECTS WITH OBJECT TYPE [{}]",
            kind.object_type_name()
        )
    }

    fn commit(&mut self) -> io::Result<()> {
        writeln!(self.out, "GO")?;
        writeln!(self.out, "COMMIT TRANSACTION GO")
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        if record.kind().is_token() {
            write!(self.out, "CREATE OBJECT FROM MONADS={{{}}}", record.first_monad)?;
        } else {
            write!(
                self.out,
                "CREATE OBJECT FROM MONADS={{{}-{}}}",
                record.first_monad, record.last_monad
            )?;
        }
        if record.id_d != 0 {
            write!(self.out, " WITH ID_D={}", record.id_d)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "[")?;
        for attribute in record.attributes() {
            match attribute.value {
                AttributeValue::Integer(n) => writeln!(self.out, "  {}:={};", attribute.name, n)?,
                AttributeValue::Enum(e) => writeln!(self.out, "  {}:={};", attribute.name, e)?,
                AttributeValue::Text(s) => {
                    writeln!(self.out, "  {}:=\"{}\";", attribute.name, mangle(&s))?
                }
            }
        }
        writeln!(self.out, "]")
    }

    /// Writes the trailing `VACUUM` directive and hands back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        writeln!(self.out, "VACUUM DATABASE ANALYZE GO")?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Serializes one store into a complete MQL script.
pub fn to_mql_string(store: &RecordStore) -> io::Result<String> {
    let mut writer = MqlWriter::new(Vec::new());
    writer.write_store(store)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
