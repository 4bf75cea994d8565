//! # Post-Effect System
//!
//! Commits can leave the document in a shape the editor does not allow. A
//! post-effect looks at a committed update and returns the mutations that
//! bring the document back in line.
//!
//! Post-effects are:
//! - **Deterministic**: the same update always produces the same mutations
//! - **Minimal**: only the corrections that are actually needed
//!
//! The editor applies each effect's mutations as their own commit, tagged as
//! a correction. Corrections are not analyzed again.

use crate::editor::UpdateEvent;
use crate::mutations::Mutation;
use crate::restriction::TemplateRestriction;

/// Post-effect that reacts to committed updates
pub trait PostEffect: std::fmt::Debug {
    /// Name reported in the correction tag
    fn name(&self) -> &'static str;

    /// Analyze the update and generate corrective mutations if needed
    fn analyze(&self, event: &UpdateEvent) -> Vec<Mutation>;
}

/// Post-effect engine that runs all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(TemplateRestriction)],
        }
    }

    /// Engine with no effects registered
    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn register(&mut self, effect: Box<dyn PostEffect>) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Analyze an update, returning each effect's corrections in
    /// registration order. Effects with nothing to correct are left out.
    pub fn analyze(&self, event: &UpdateEvent) -> Vec<(&'static str, Vec<Mutation>)> {
        self.effects
            .iter()
            .filter_map(|effect| {
                let mutations = effect.analyze(event);
                if mutations.is_empty() {
                    None
                } else {
                    Some((effect.name(), mutations))
                }
            })
            .collect()
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EditorState;
    use std::collections::BTreeSet;

    #[derive(Debug)]
    struct ClearEverything;

    impl PostEffect for ClearEverything {
        fn name(&self) -> &'static str {
            "clear-everything"
        }

        fn analyze(&self, _event: &UpdateEvent) -> Vec<Mutation> {
            vec![Mutation::ClearRoot]
        }
    }

    fn event() -> UpdateEvent {
        UpdateEvent {
            state: EditorState::empty(),
            prev_state: EditorState::empty(),
            dirty: BTreeSet::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.len(), 1);
        assert!(PostEffectEngine::empty().is_empty());
    }

    #[test]
    fn test_analyze_skips_quiet_effects() {
        let engine = PostEffectEngine::new();
        assert!(engine.analyze(&event()).is_empty());
    }

    #[test]
    fn test_analyze_reports_effect_name() {
        let mut engine = PostEffectEngine::empty();
        engine.register(Box::new(ClearEverything));

        let corrections = engine.analyze(&event());
        assert_eq!(corrections, vec![("clear-everything", vec![Mutation::ClearRoot])]);
    }
}
