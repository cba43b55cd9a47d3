//! HealthCard portal client.
//!
//! Session handling, route guarding and the declarative form engine used by
//! every create/update screen of the portal, plus the REST plumbing they sit on.

pub mod api;
pub mod authorization;
pub mod config;
pub mod consts;
pub mod forms;
pub mod models;
pub mod notify;
pub mod pages;
pub mod selector;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod scenarios;
