//! Per-unit-of-work routing state.

/// Routing flags scoped to one logical unit of work (a session, request, or
/// transaction).
///
/// The owner of the unit-of-work boundary passes this mutably through every
/// `prepare` call in the scope and MUST call [`RoutingState::clear`] on every
/// exit path; a scope that is reused without clearing leaks routing
/// decisions into the next unit of work.
///
/// The state is an explicit context object rather than worker-bound storage,
/// so runtimes that multiplex many logical sessions onto few workers attach
/// it to the session.
#[derive(Debug, Clone, Default)]
pub struct RoutingState {
    skip_sharding: bool,
    master_route_only: bool,
    master_visited: bool,
}

impl RoutingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_skip_sharding(&self) -> bool {
        self.skip_sharding
    }

    pub fn set_skip_sharding(&mut self, skip: bool) {
        self.skip_sharding = skip;
    }

    /// Whether the caller pinned this scope's reads to the master.
    pub fn is_master_route_only(&self) -> bool {
        self.master_route_only
    }

    pub fn set_master_route_only(&mut self, master_only: bool) {
        self.master_route_only = master_only;
    }

    /// Whether this scope already touched the master.
    ///
    /// Once set, the flag stays set until [`RoutingState::clear`]; later
    /// reads in the scope stick to the master so they never observe stale
    /// replica state.
    pub fn is_master_visited(&self) -> bool {
        self.master_visited
    }

    pub fn set_master_visited(&mut self) {
        self.master_visited = true;
    }

    /// Reset every flag to its initial value.
    pub fn clear(&mut self) {
        self.skip_sharding = false;
        self.master_route_only = false;
        self.master_visited = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_flags() {
        let state = RoutingState::new();
        assert!(!state.is_skip_sharding());
        assert!(!state.is_master_route_only());
        assert!(!state.is_master_visited());
    }

    #[test]
    fn master_visited_is_sticky_until_clear() {
        let mut state = RoutingState::new();
        state.set_master_visited();
        assert!(state.is_master_visited());

        state.clear();
        assert!(!state.is_master_visited());
    }

    #[test]
    fn clear_resets_all_flags() {
        let mut state = RoutingState::new();
        state.set_skip_sharding(true);
        state.set_master_route_only(true);
        state.set_master_visited();

        state.clear();
        assert!(!state.is_skip_sharding());
        assert!(!state.is_master_route_only());
        assert!(!state.is_master_visited());
    }
}
