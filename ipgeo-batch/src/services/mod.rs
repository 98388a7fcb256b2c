//! Resolution services

pub mod address_source;
pub mod lookup_client;
pub mod progress;
pub mod resolution_engine;
pub mod result_sink;

pub use address_source::{manual_address, parse_addresses, read_addresses, read_addresses_from};
pub use lookup_client::{HttpTransport, LookupClient, LookupTransport, TransportError};
pub use progress::{FnReporter, ProgressReporter};
pub use resolution_engine::ResolutionEngine;
pub use result_sink::{write_csv, CsvFileSink, ResultSink, StdoutSink, ADDRESS_HEADER};
