//! Resources managed by whiskform
//!
//! Each resource implements [`declarative::Resource`] against a
//! [`ClientSession`](crate::session::ClientSession).

pub mod error;
pub mod openwhisk_action;

pub use openwhisk_action::OpenWhiskAction;
