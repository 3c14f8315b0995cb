// prepwise-api: Async Rust client for the preparedness portal backend,
// its push channel, and the third-party services the portal composes.

pub mod backend;
pub mod error;
pub mod push;
pub mod services;
pub mod transport;

pub use backend::BackendClient;
pub use error::{Error, Service};
pub use push::{PushEvent, PushHandle, PushRooms, ReconnectConfig};
pub use services::{ServiceEndpoints, ServicesClient};
pub use transport::{TlsMode, TransportConfig};
