use crate::request::{Completion, Generation};

/// Lifecycle of one overlay's content.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState<S> {
    Idle,
    Fetching { generation: Generation, scope: S },
    Applied { generation: Generation, scope: S },
}

/// Generation bookkeeping for a fetch-and-replace overlay.
///
/// Requests are never cancelled; a response is authoritative only if its
/// generation is still the current one when it arrives.
#[derive(Debug, Clone)]
pub struct FetchController<S> {
    current: Generation,
    state: OverlayState<S>,
    /// Last applied state, restored if every part of the current generation fails.
    fallback: Option<(Generation, S)>,
    outstanding: usize,
}

impl<S: Clone> Default for FetchController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> FetchController<S> {
    pub fn new() -> Self {
        Self {
            current: Generation(0),
            state: OverlayState::Idle,
            fallback: None,
            outstanding: 0,
        }
    }

    pub fn state(&self) -> &OverlayState<S> {
        &self.state
    }

    pub fn current(&self) -> Generation {
        self.current
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.current
    }

    /// Starts a generation of `parts` requests; the layer keeps its contents
    /// until one of them succeeds.
    pub fn begin(&mut self, scope: S, parts: usize) -> Generation {
        if let OverlayState::Applied { generation, scope } = &self.state {
            self.fallback = Some((*generation, scope.clone()));
        }
        self.start(scope, parts)
    }

    /// Starts a generation after the caller already emptied the layer, so a
    /// total failure falls back to `Idle`.
    pub fn begin_cleared(&mut self, scope: S, parts: usize) -> Generation {
        self.fallback = None;
        self.start(scope, parts)
    }

    fn start(&mut self, scope: S, parts: usize) -> Generation {
        self.current = Generation(self.current.0 + 1);
        self.outstanding = parts;
        self.state = OverlayState::Fetching {
            generation: self.current,
            scope,
        };
        self.current
    }

    /// Records a usable response. The caller mutates the layer only when this
    /// returns [`Completion::Applied`].
    pub fn succeed(&mut self, generation: Generation) -> Completion {
        if !self.is_current(generation) {
            return Completion::Stale;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        let scope = match &self.state {
            OverlayState::Fetching { scope, .. } | OverlayState::Applied { scope, .. } => {
                scope.clone()
            }
            OverlayState::Idle => return Completion::Stale,
        };
        self.state = OverlayState::Applied { generation, scope };
        Completion::Applied
    }

    pub fn fail(&mut self, generation: Generation) -> Completion {
        if !self.is_current(generation) {
            return Completion::Stale;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding == 0 && matches!(self.state, OverlayState::Fetching { .. }) {
            self.state = match self.fallback.clone() {
                Some((generation, scope)) => OverlayState::Applied { generation, scope },
                None => OverlayState::Idle,
            };
        }
        Completion::Failed
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchController, OverlayState};
    use crate::request::{Completion, Generation};
    use pretty_assertions::assert_eq;

    #[test]
    fn newer_generation_makes_older_results_stale() {
        let mut c: FetchController<&str> = FetchController::new();
        let g1 = c.begin("a", 1);
        let g2 = c.begin("b", 1);
        assert!(g2 > g1);
        assert_eq!(c.succeed(g2), Completion::Applied);
        assert_eq!(c.succeed(g1), Completion::Stale);
        assert_eq!(
            c.state(),
            &OverlayState::Applied {
                generation: g2,
                scope: "b"
            }
        );
    }

    #[test]
    fn failure_restores_last_applied() {
        let mut c: FetchController<&str> = FetchController::new();
        let g1 = c.begin("a", 1);
        c.succeed(g1);
        let g2 = c.begin("b", 1);
        assert_eq!(c.fail(g2), Completion::Failed);
        assert_eq!(
            c.state(),
            &OverlayState::Applied {
                generation: g1,
                scope: "a"
            }
        );
        assert_eq!(c.current(), Generation(2));
    }

    #[test]
    fn failure_after_clear_returns_to_idle() {
        let mut c: FetchController<&str> = FetchController::new();
        let g1 = c.begin("a", 1);
        c.succeed(g1);
        let g2 = c.begin_cleared("b", 1);
        c.fail(g2);
        assert_eq!(c.state(), &OverlayState::Idle);
    }

    #[test]
    fn multi_part_generation_survives_partial_failure() {
        let mut c: FetchController<Vec<&str>> = FetchController::new();
        let g = c.begin_cleared(vec!["x", "y", "z"], 3);
        assert_eq!(c.fail(g), Completion::Failed);
        assert!(matches!(c.state(), OverlayState::Fetching { .. }));
        assert_eq!(c.succeed(g), Completion::Applied);
        assert_eq!(c.fail(g), Completion::Failed);
        assert!(matches!(c.state(), OverlayState::Applied { .. }));
        assert_eq!(c.outstanding(), 0);
    }

    #[test]
    fn stale_failures_are_reported_as_stale() {
        let mut c: FetchController<u8> = FetchController::new();
        let g1 = c.begin(1, 1);
        let _g2 = c.begin(2, 1);
        assert_eq!(c.fail(g1), Completion::Stale);
        assert!(matches!(c.state(), OverlayState::Fetching { scope: 2, .. }));
    }
}
