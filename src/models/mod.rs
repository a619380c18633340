//! Data models for the EcoParrain referral program.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod datastore;
mod lead;
mod notification;
mod user;

pub use datastore::*;
pub use lead::*;
pub use notification::*;
pub use user::*;
