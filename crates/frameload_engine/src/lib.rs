//! Frame loader engine: the transport running fetch jobs and the document
//! scanner standing in for a parser.
mod engine;
mod fetch;
mod scan;
mod types;

pub use engine::EngineHandle;
pub use fetch::{ChannelSink, EventSink, FetchSettings, Fetcher, ReqwestFetcher};
pub use scan::{Discovery, DocumentScanner};
pub use types::{FailureKind, FetchError, FetchMetadata, TransportEvent};
