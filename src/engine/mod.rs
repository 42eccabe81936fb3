//! The list query and filter engine.
//!
//! Evaluation and encoding are synchronous and never fail; only the
//! transport boundary can, and the retry fetcher decides how failures surface.

pub mod codec;
pub mod evaluator;
pub mod filter_state;
pub mod freshness;
pub mod retry;
pub mod sinks;
pub mod transport;

pub use codec::{decode_filters, QueryCodec};
pub use evaluator::{evaluate, normalize, FieldResolver, FilterOutcome, PageSpec, NO_RECORDS_MESSAGE};
pub use filter_state::FilterStateStore;
pub use freshness::FreshnessCache;
pub use retry::AdaptiveFetcher;
pub use sinks::{
    BusyIndicator, Notification, NotificationKind, NotificationSink, TracingBusyIndicator,
    TracingNotifier,
};
pub use transport::{HttpListTransport, ListTransport};
