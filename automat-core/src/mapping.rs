//! Mapping: the decision function from (state, input) to a transition.
//!
//! A mapping is evaluated synchronously by the engine, one input at a
//! time. It either commits to a [`Transition`] or returns `None` for "no
//! match"; an unmatched input is an observable no-op, not an error.
//! Mappings compose first-match-wins through [`Composite`].

use crate::effect::Effect;
use std::fmt::Debug;

/// Marker for types usable as automaton states.
///
/// Blanket-implemented; states need equality so the engine can be asked
/// "are we still in X", and cloning so observers receive snapshots rather
/// than references into the engine.
pub trait State: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Debug + Send + Sync + 'static> State for T {}

/// Marker for types usable as automaton inputs.
///
/// Blanket-implemented. Inputs are immutable and transient: the engine
/// clones one copy into the reply and retires the value once the reply is
/// published.
pub trait Input: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> Input for T {}

/// The result of a matched mapping: the next state to commit, plus any
/// asynchronous work the transition authorizes.
pub struct Transition<S, I> {
    /// The committed next state.
    pub to: S,
    effect: Option<Effect<I>>,
}

impl<S, I> Transition<S, I> {
    /// A transition to `state` with no side effect.
    pub fn to(state: S) -> Self {
        Self {
            to: state,
            effect: None,
        }
    }

    /// Authorizes `effect` to run once this transition commits.
    pub fn with_effect(mut self, effect: Effect<I>) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The authorized effect, if any.
    pub fn effect(&self) -> Option<&Effect<I>> {
        self.effect.as_ref()
    }

    /// Splits the transition into its committed state and effect.
    pub fn into_parts(self) -> (S, Option<Effect<I>>) {
        (self.to, self.effect)
    }
}

impl<S: Debug, I> Debug for Transition<S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("to", &self.to)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

/// A decision rule: given the current state and one input, either produce
/// the transition to commit or report "no match" with `None`.
///
/// Evaluation must be synchronous and must not block; anything
/// asynchronous belongs in the authorized [`Effect`]. Implementations are
/// expected to be pure with respect to the automaton: the engine calls
/// `map` exactly once per processed input.
pub trait Mapping<S, I>: Send + Sync {
    /// Evaluates this mapping at `(state, input)`.
    fn map(&self, state: &S, input: &I) -> Option<Transition<S, I>>;
}

impl<S, I, F> Mapping<S, I> for F
where
    F: Fn(&S, &I) -> Option<Transition<S, I>> + Send + Sync,
{
    fn map(&self, state: &S, input: &I) -> Option<Transition<S, I>> {
        self(state, input)
    }
}

/// Lifts a pure `(state, input) -> Option<next_state>` function into a
/// mapping that never authorizes effects.
pub fn map_fn<S, I, F>(f: F) -> impl Mapping<S, I>
where
    F: Fn(&S, &I) -> Option<S> + Send + Sync,
{
    move |state: &S, input: &I| f(state, input).map(Transition::to)
}

/// An ordered, first-match-wins combination of mappings.
///
/// Constituents are tried in declaration order; the first to return a
/// transition wins and later constituents are not consulted for that
/// input. Declaration order is therefore part of the public contract:
/// overlapping rules require deliberate ordering by the caller, and ties
/// are resolved silently by position. An empty composite matches nothing.
pub struct Composite<S, I> {
    mappings: Vec<Box<dyn Mapping<S, I>>>,
}

impl<S, I> Composite<S, I> {
    /// An empty composite. Every input is unmatched until rules are added.
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Appends `mapping` after all previously declared rules.
    pub fn push(&mut self, mapping: impl Mapping<S, I> + 'static) {
        self.mappings.push(Box::new(mapping));
    }

    /// Chaining form of [`push`](Composite::push).
    pub fn with(mut self, mapping: impl Mapping<S, I> + 'static) -> Self {
        self.push(mapping);
        self
    }

    /// Number of constituent mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if no rules have been declared.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<S, I> Default for Composite<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, I> Mapping<S, I> for Composite<S, I> {
    fn map(&self, state: &S, input: &I) -> Option<Transition<S, I>> {
        self.mappings.iter().find_map(|m| m.map(state, input))
    }
}

/// Combines an ordered collection of mappings into one [`Composite`],
/// first match wins.
pub fn reduce<S, I>(mappings: impl IntoIterator<Item = Box<dyn Mapping<S, I>>>) -> Composite<S, I> {
    Composite {
        mappings: mappings.into_iter().collect(),
    }
}
