//! Slate Decision Engine
//!
//! The state machine behind the billet swipe UI. It keeps two decision
//! ledgers (`real` and `sandbox`), a bounded ledger of ranked applications
//! (the slate), and an undo stack whose frames reverse a swipe across both.
//!
//! # Example
//!
//! ```
//! use slate_engine::{AssignmentStore, SlateConfig, SwipeOutcome};
//! use slate_types::{Billet, BilletId, SwipeDirection, UserId};
//!
//! let mut store = AssignmentStore::new(SlateConfig::default());
//! store.load_billets(vec![Billet::new(
//!     BilletId::new("B1"),
//!     "Division Officer",
//!     "USS Example",
//!     "Norfolk, VA",
//! )]);
//!
//! let user = UserId::new("sailor");
//! let outcome = store.swipe(&BilletId::new("B1"), SwipeDirection::Up, &user);
//! assert!(matches!(outcome, SwipeOutcome::Promoted(_)));
//! assert_eq!(store.user_application_ids(&user).len(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`AssignmentStore`] owns all mutable state and is the only mutator.
//! - [`SlateState`] is the read-only view handed to [`selectors`].
//! - [`persistence`] flushes the real-mode ledgers behind a cancelable
//!   debounce window; sandbox state never leaves the process.

#![deny(unsafe_code)]

mod applications;
mod config;
mod decisions;
mod events;
mod history;
pub mod invariants;
mod outcome;
pub mod persistence;
mod queue;
pub mod selectors;
mod source;
mod state;
mod store;

pub use applications::{Admission, ApplicationLedger};
pub use config::{SlateConfig, WithdrawalPolicy};
pub use decisions::DecisionLedger;
pub use events::SlateEvent;
pub use history::UndoStack;
pub use invariants::InvariantViolation;
pub use outcome::{PromotionOutcome, PromotionRejection, SwipeOutcome};
pub use persistence::{InMemoryStorage, JsonFileStorage, SlateStorage};
pub use queue::ReviewQueue;
pub use selectors::{ManifestItem, Placement, SlateEntry};
pub use source::{BilletSource, StaticBilletSource};
pub use state::SlateState;
pub use store::AssignmentStore;
