//! Chat Gateway Common Types
//!
//! Wire types shared by the gateway and the hosting service test doubles.

pub mod chat;

pub use chat::{BatchedRequest, ChatQuery, ChatReply, QueryValidationError};
