//! # automat-engine
//!
//! The transition engine for automat.
//!
//! The engine merges external inputs and effect feedback into one
//! serialized stream, drives a single authoritative state value through a
//! first-match-wins mapping, and publishes exactly one [`Reply`] per
//! processed input. Asynchronous work authorized by a transition runs as
//! an [`Effect`] whose outputs re-enter the same stream.
//!
//! ```
//! use automat_engine::{Automaton, Composite, Rule};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Door { Closed, Open }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Push { Open, Close }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mapping = Composite::new()
//!         .with(Rule::on(Push::Open).from(Door::Closed).go(Door::Open))
//!         .with(Rule::on(Push::Close).from(Door::Open).go(Door::Closed));
//!
//!     let automaton = Automaton::start(Door::Closed, mapping);
//!     let mut replies = automaton.subscribe_replies();
//!
//!     automaton.send(Push::Open).await.unwrap();
//!     let reply = replies.recv().await.unwrap();
//!     assert_eq!(reply.from_state, Door::Closed);
//!     assert_eq!(reply.to_state, Some(Door::Open));
//!     assert_eq!(automaton.state(), Door::Open);
//!
//!     // Unmatched inputs are observable no-ops, not errors.
//!     automaton.send(Push::Open).await.unwrap();
//!     assert!(replies.recv().await.unwrap().is_no_match());
//!
//!     automaton.close().await;
//! }
//! ```

pub mod automaton;
pub mod config;
mod effects;
pub mod error;
mod publish;

pub use automaton::{Automaton, InputSender};
pub use config::AutomatonConfig;
pub use error::EngineError;

// Re-export the core surface so hosts depend on one crate.
pub use automat_core::{
    map_fn, reduce, CancelPolicy, Composite, Effect, EffectError, Feedback, Input, Mapping, Reply,
    Rule, RuleBuilder, State, Transition, TransitionLog, TransitionRecord,
};
