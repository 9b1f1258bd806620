//! Registry of named animation state owned by the render loop.

use std::collections::HashMap;

use crate::scroll::Scroller;
use crate::stack::Stack;
use crate::transition::{FrameTransition, NumberTransition};

/// Named transitions, scrollers and stacks for one render loop.
///
/// Instances are created on first access and persist for the lifetime of
/// the context. Accessors borrow the context mutably, so each instance has a
/// single writer at a time.
#[derive(Debug, Default)]
pub struct RenderContext {
    transitions: HashMap<String, FrameTransition>,
    numbers: HashMap<String, NumberTransition>,
    scrollers: HashMap<String, Scroller>,
    stacks: HashMap<String, Stack>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame transition called `name`, built with `init` on first use.
    pub fn transition(
        &mut self,
        name: &str,
        init: impl FnOnce(&str) -> FrameTransition,
    ) -> &mut FrameTransition {
        self.transitions
            .entry(name.to_owned())
            .or_insert_with(|| init(name))
    }

    pub fn number(
        &mut self,
        name: &str,
        init: impl FnOnce(&str) -> NumberTransition,
    ) -> &mut NumberTransition {
        self.numbers
            .entry(name.to_owned())
            .or_insert_with(|| init(name))
    }

    pub fn scroller(&mut self, name: &str, init: impl FnOnce(&str) -> Scroller) -> &mut Scroller {
        self.scrollers
            .entry(name.to_owned())
            .or_insert_with(|| init(name))
    }

    pub fn stack(&mut self, name: &str, init: impl FnOnce(&str) -> Stack) -> &mut Stack {
        self.stacks.entry(name.to_owned()).or_insert_with(|| init(name))
    }

    /// Forget every instance called `name`. Returns whether any existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let mut removed = self.transitions.remove(name).is_some();
        removed |= self.numbers.remove(name).is_some();
        removed |= self.scrollers.remove(name).is_some();
        removed |= self.stacks.remove(name).is_some();
        removed
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
        self.numbers.clear();
        self.scrollers.clear();
        self.stacks.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len() + self.numbers.len() + self.scrollers.len() + self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
