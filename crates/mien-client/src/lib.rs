//! mien-client — Protocol plumbing for the inference/storage backend.
//!
//! Three independent clients: the REST API the admin tooling browses
//! sessions through, the WebSocket realtime channel the capture client
//! streams frames over, and the auth provider the admin signs in against.
//! All of the actual inference and storage lives on the other side of
//! these connections.

pub mod auth;
pub mod channel;
pub mod rest;

pub use auth::{AuthClient, AuthError, AuthSession};
pub use channel::{ChannelClient, ChannelError, ChannelHandle, ParticipantInfo};
pub use rest::{ApiError, RestClient};
