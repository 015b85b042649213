//! Reusable command predicates.

use crate::state::AppState;

pub fn is_not_busy(state: &AppState) -> bool {
    state.busy_count == 0
}

pub fn has_selection(state: &AppState) -> bool {
    state
        .active_map()
        .and_then(|m| m.selection.as_ref())
        .is_some_and(|s| s.has_selection())
}

pub fn has_previous_view(state: &AppState) -> bool {
    state.active_map().is_some_and(|m| m.history_index > 0)
}

pub fn has_next_view(state: &AppState) -> bool {
    state
        .active_map()
        .is_some_and(|m| m.history_index + 1 < m.history.len())
}
