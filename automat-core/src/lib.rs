//! # automat-core
//!
//! Transition semantics for automat.
//!
//! This crate provides:
//! - The [`Mapping`] trait: a pure decision function from (state, input)
//!   to an optional [`Transition`]
//! - First-match-wins composition via [`Composite`] and [`reduce`]
//! - Declarative transition rules ([`Rule`])
//! - [`Effect`] descriptors for asynchronous work authorized by a
//!   transition, feeding further inputs back through [`Feedback`]
//! - The [`Reply`] record published for every processed input
//! - A bounded audit trail of transitions ([`TransitionLog`])
//!
//! The runtime that drives these types lives in `automat-engine`.

pub mod effect;
pub mod error;
pub mod history;
pub mod mapping;
pub mod reply;
pub mod rule;

pub use effect::{CancelPolicy, Effect, Feedback};
pub use error::EffectError;
pub use history::{TransitionLog, TransitionRecord};
pub use mapping::{map_fn, reduce, Composite, Input, Mapping, State, Transition};
pub use reply::Reply;
pub use rule::{Rule, RuleBuilder};
