//! Client data collaborators
//!
//! The client directory and the client record service are reached over HTTP.
//! Both sit behind traits so the controller can be driven by any implementation.

pub mod directory;
pub mod http;
pub mod records;

pub use directory::{ClientDirectory, HttpClientDirectory};
pub use http::BackendClient;
pub use records::{ClientRecordFetcher, HttpClientRecordFetcher};
