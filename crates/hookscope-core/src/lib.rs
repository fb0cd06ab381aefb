//! Core domain models and storage for the hookscope capture service.
//!
//! Provides the webhook record entity, time-ordered identifiers, payload
//! classification, handler-code generation, and the PostgreSQL repository
//! layer. The API crate depends on these foundational types; all SQL in
//! the system lives under [`storage`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codegen;
pub mod error;
pub mod models;
pub mod payload;
pub mod storage;
pub mod time;

pub use error::{CoreError, Result};
pub use models::{RecordPage, WebhookId, WebhookRecord};
pub use payload::{Payload, PayloadCategory};
pub use time::{Clock, RealClock, TestClock};
