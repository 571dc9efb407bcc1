//! Site configuration
//!
//! Translates between the flat configuration users write and the nested
//! bodies the management API accepts, and reconciles one against the other.
//!
//! # Module Structure
//!
//! - [`stack`] - Stack identifier codec (`linuxFxVersion` / `windowsFxVersion`)
//! - [`registry`] - Known stack kinds, loaded from embedded JSON
//! - [`settings`] - Reserved app-settings classifier
//! - [`model`] - Flat model
//! - [`nested`] - Remote API shapes
//! - [`expand`] / [`flatten`] - Flat to nested and back
//! - [`sticky`] - Sticky-settings merger
//! - [`changes`] / [`reconcile`] - Change tracking and ordered updates
//! - [`remote`] / [`fetcher`] - Remote service seam and the read path
//!
//! Blocks carried by their own sub-resource live in [`access`], [`autoheal`],
//! [`auth`], [`auth_v2`], [`logs`], [`backup`] and [`mounts`].

pub mod access;
pub mod auth;
pub mod auth_v2;
pub mod autoheal;
pub mod backup;
pub mod changes;
pub mod expand;
pub mod fetcher;
pub mod flatten;
pub mod logs;
pub mod model;
pub mod mounts;
pub mod nested;
pub mod reconcile;
pub mod registry;
pub mod remote;
pub mod settings;
pub mod stack;
pub mod sticky;

pub use model::{SiteConfig, StickySettings, WebApp};
pub use reconcile::{ReconcileError, Reconciler, SubResource, UpdatePlan};
pub use remote::RemoteServiceClient;
pub use stack::{ApplicationStack, OsFamily};
