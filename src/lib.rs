//! Configuration codec and reconciler for hosted web and function apps.
//!
//! - [`site`] - flat model, stack codec, app-settings classifier, expander,
//!   flattener and update reconciler
//! - [`azure`] - management API client
//! - [`config`] - persistent settings and document loading

pub mod azure;
pub mod config;
pub mod site;
