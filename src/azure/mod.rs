//! Management API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Site-scoped client implementing the remote service seam
//! - [`dispatch`] - Operation name to REST route mapping
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use sitecfg::azure::client::{ArmClient, SiteTarget};
//! use sitecfg::site::fetcher::read_web_app;
//!
//! async fn example(target: SiteTarget, token: &str) -> anyhow::Result<()> {
//!     let client = ArmClient::new(target, token)?;
//!     let app = read_web_app(&client, None).await?;
//!     println!("{}", app.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dispatch;
pub mod http;
