//! Server collaborators: the map agent and the projection registry.
//!
//! Both are traits so initialization and the viewer can run against
//! in-memory fakes; [`HttpMapAgent`] and [`EpsgIoResolver`] are the reqwest
//! implementations used by the CLI.

pub mod agent;
pub mod error;
pub mod http;
pub mod projection;

pub use agent::*;
pub use error::ClientError;
pub use http::HttpMapAgent;
pub use projection::*;
