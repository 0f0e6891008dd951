//! Slate Domain Types
//!
//! This crate defines the domain types shared by the assignment decision
//! engine: the billets a sailor browses, the swipe decisions recorded
//! against them, and the ranked applications that make up the slate.
//!
//! # Key Concepts
//!
//! - **Decision**: the most recent directional verdict on a billet, kept
//!   separately for `real` and `sandbox` mode.
//! - **Application**: a live, ranked promotion of a billet onto the bounded
//!   slate. At most one live application exists per billet.
//! - **Manifest**: the unbounded backlog of interest, derived from decisions
//!   for billets that are not on the slate.
//! - **History entry**: one undo frame, enough to reverse a single swipe
//!   across both ledgers.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime dependencies. IDs use the
//! newtype pattern and implement `Display`, `generate()`, and `new()`.

#![deny(unsafe_code)]

mod application;
mod billet;
mod decision;
mod errors;
mod history;
mod ids;
mod manifest;

pub use application::*;
pub use billet::*;
pub use decision::*;
pub use errors::*;
pub use history::*;
pub use ids::*;
pub use manifest::*;
