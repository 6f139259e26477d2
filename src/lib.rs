//! Streaming conversion of OSIS-tagged Hebrew Bible XML into Emdros MQL.
//!
//! A book document is read as a flat stream of [`XmlEvent`]s, run through the
//! [`Transducer`] state machine, which allocates monads and seals structural
//! records, and the resulting [`RecordStore`] is dumped by an [`MqlWriter`].

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod mangle;
pub mod mirror;
pub mod monad;
pub mod mql;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod segment;
pub mod store;
pub mod tokens;
pub mod transducer;
pub mod utils;

pub use api::{transduce_str, transduce_with};
pub use error::{MqlError, TransducerError};
pub use events::{Attributes, XmlEvent};
pub use monad::{Monad, MonadAllocator, FIRST_MONAD};
pub use mql::MqlWriter;
pub use record::{Record, RecordData, RecordKind};
pub use store::RecordStore;
pub use transducer::{Transducer, Transduction, Warning};
