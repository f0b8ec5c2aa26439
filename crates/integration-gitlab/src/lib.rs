//! Transport clients for the dashboard backend: the one-shot projects
//! snapshot and the persistent pipeline push stream.

pub mod error;
pub mod snapshot;
pub mod stream;

pub use error::{FetchError, StreamError};
pub use snapshot::{
    ReqwestSnapshotTransport, SnapshotClient, SnapshotHttpResponse, SnapshotTransport,
};
pub use stream::PushStreamClient;
