//! Declarative transition rules.
//!
//! A rule binds an input pattern and a state pattern to a destination
//! state, optionally authorizing an effect. Rules implement [`Mapping`]
//! and compose through the same first-match-wins combinator as plain
//! functions; predicate forms are sugar over the same contract, not a
//! separate mechanism.
//!
//! ```
//! use automat_core::{Mapping, Rule};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Auth { LoggedOut, LoggingIn, LoggedIn, LoggingOut }
//! #[derive(Debug, Clone, PartialEq)]
//! enum Op { Login, ForceLogout }
//!
//! let login = Rule::on(Op::Login).from(Auth::LoggedOut).go(Auth::LoggingIn);
//! let force = Rule::on(Op::ForceLogout)
//!     .from_any_of([Auth::LoggingIn, Auth::LoggedIn])
//!     .go(Auth::LoggingOut);
//!
//! assert!(login.map(&Auth::LoggedOut, &Op::Login).is_some());
//! assert!(force.map(&Auth::LoggedOut, &Op::ForceLogout).is_none());
//! ```

use crate::effect::Effect;
use crate::mapping::{Mapping, Transition};
use std::sync::Arc;

enum InputPattern<I> {
    Exact(I),
    Where(Arc<dyn Fn(&I) -> bool + Send + Sync>),
    Any,
}

impl<I: PartialEq> InputPattern<I> {
    fn matches(&self, input: &I) -> bool {
        match self {
            InputPattern::Exact(expected) => expected == input,
            InputPattern::Where(predicate) => predicate(input),
            InputPattern::Any => true,
        }
    }
}

enum StatePattern<S> {
    Exact(S),
    AnyOf(Vec<S>),
    Where(Arc<dyn Fn(&S) -> bool + Send + Sync>),
    Any,
}

impl<S: PartialEq> StatePattern<S> {
    fn matches(&self, state: &S) -> bool {
        match self {
            StatePattern::Exact(expected) => expected == state,
            StatePattern::AnyOf(expected) => expected.contains(state),
            StatePattern::Where(predicate) => predicate(state),
            StatePattern::Any => true,
        }
    }
}

/// One declarative transition rule.
///
/// Built with [`Rule::on`] and friends; see the module docs for the
/// shape. A rule with no source pattern matches from any state.
pub struct Rule<S, I> {
    input: InputPattern<I>,
    from: StatePattern<S>,
    to: S,
    effect: Option<Effect<I>>,
}

impl<S, I> Rule<S, I> {
    /// Starts a rule triggered by inputs equal to `input`.
    pub fn on(input: I) -> RuleBuilder<S, I> {
        RuleBuilder {
            input: InputPattern::Exact(input),
            from: StatePattern::Any,
        }
    }

    /// Starts a rule triggered by any input satisfying `predicate`.
    pub fn on_where(predicate: impl Fn(&I) -> bool + Send + Sync + 'static) -> RuleBuilder<S, I> {
        RuleBuilder {
            input: InputPattern::Where(Arc::new(predicate)),
            from: StatePattern::Any,
        }
    }

    /// Starts a rule triggered by every input.
    pub fn on_any() -> RuleBuilder<S, I> {
        RuleBuilder {
            input: InputPattern::Any,
            from: StatePattern::Any,
        }
    }

    /// Authorizes `effect` whenever this rule fires.
    pub fn with_effect(mut self, effect: Effect<I>) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Intermediate builder produced by [`Rule::on`]; completed by
/// [`go`](RuleBuilder::go).
pub struct RuleBuilder<S, I> {
    input: InputPattern<I>,
    from: StatePattern<S>,
}

impl<S, I> RuleBuilder<S, I> {
    /// Restricts the rule to fire only from `state`.
    pub fn from(mut self, state: S) -> Self {
        self.from = StatePattern::Exact(state);
        self
    }

    /// Restricts the rule to fire from any of `states`.
    pub fn from_any_of(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.from = StatePattern::AnyOf(states.into_iter().collect());
        self
    }

    /// Restricts the rule to fire from states satisfying `predicate`.
    pub fn from_where(mut self, predicate: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        self.from = StatePattern::Where(Arc::new(predicate));
        self
    }

    /// Completes the rule with its destination state.
    pub fn go(self, to: S) -> Rule<S, I> {
        Rule {
            input: self.input,
            from: self.from,
            to,
            effect: None,
        }
    }
}

impl<S, I> Mapping<S, I> for Rule<S, I>
where
    S: Clone + PartialEq + Send + Sync,
    I: PartialEq + Send + Sync,
{
    fn map(&self, state: &S, input: &I) -> Option<Transition<S, I>> {
        if !self.input.matches(input) || !self.from.matches(state) {
            return None;
        }

        let mut transition = Transition::to(self.to.clone());
        if let Some(effect) = &self.effect {
            transition = transition.with_effect(effect.clone());
        }
        Some(transition)
    }
}
