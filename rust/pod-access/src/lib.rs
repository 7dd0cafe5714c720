#![warn(missing_docs)]

//! Access control resolution for Pod resources.
//!
//! A Pod resource is governed by exactly one of two incompatible
//! authorization schemes:
//!
//! - **ACP** (Access Control Policies): a linked Access Control Resource
//!   references policies that match agents and allow modes.
//! - **WAC** (Web Access Control): a linked ACL lists rules granting modes to
//!   agents, with container defaults inherited by members.
//!
//! The [`resolve`] detector picks the scheme for a [`ResourceHandle`] and
//! returns a [`Strategy`]. Every caller then works through the uniform
//! [`AccessControl`] contract and never branches on the scheme again.
//!
//! ```rust,no_run
//! # async fn example<S: pod_access::ResourceStore>(
//! #     resource: pod_access::ResourceHandle,
//! #     store: S,
//! # ) -> Result<(), pod_access::AccessControlError> {
//! use pod_access::{AccessControl, AccessMode, AccessModes, Agent, resolve};
//! use url::Url;
//!
//! let policies = Url::parse("https://pod.example/alice/policies/")?;
//! let mut strategy = resolve(&resource, &policies, store, false, None)?;
//!
//! let bob = Agent::from("https://bob.example/profile/card#me");
//! strategy
//!     .grant_access(&bob, AccessModes::from([AccessMode::Read]))
//!     .await?;
//!
//! for permission in strategy.list_permissions().await? {
//!     println!("{} {}", permission.web_id(), permission.modes);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Pseudo-agents
//!
//! "Anyone" and "anyone signed in" are encoded differently by the two
//! schemes. [`PseudoAgent`] maps both encodings onto one pair of canonical
//! identifiers so listings never depend on the scheme that produced them.

mod error;
pub use error::*;

mod mode;
pub use mode::*;

mod scheme;
pub use scheme::*;

mod agent;
pub use agent::*;

mod resource;
pub use resource::*;

mod permission;
pub use permission::*;

mod store;
pub use store::*;

pub mod acp;
pub use acp::AcpStrategy;

pub mod wac;
pub use wac::WacStrategy;

mod strategy;
pub use strategy::*;

mod detect;
pub use detect::*;

#[cfg(any(test, feature = "helpers"))]
mod memory;
#[cfg(any(test, feature = "helpers"))]
pub use memory::*;
