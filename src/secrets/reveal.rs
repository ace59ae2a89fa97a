//! Keyed reveal cache for secret values.
//!
//! Each secret name tracks whether its true value has been fetched, is in
//! flight, or is currently visible. At most one fetch is pending per name,
//! and a cached value is never refetched or overwritten without an explicit
//! eviction - the only invalidation is a successful edit or delete of the
//! same secret in this process. A value revealed here can therefore go
//! stale if another session mutates the secret concurrently; that window
//! is accepted for a single-tab console.
//!
//! The cache itself does no I/O: `toggle` hands back what to do, the
//! caller performs the fetch, and `apply_value`/`fetch_failed` feed the
//! outcome back in under a ticket so results that arrive after an eviction
//! are ignored.

use std::collections::HashMap;

/// What a toggle decided, for the caller to act on
#[derive(Debug, PartialEq, Eq)]
pub enum ToggleAction {
    /// Value was visible; it is now hidden (still cached)
    NowHidden,
    /// Value was already cached; it is now visible, no network needed
    NowRevealed,
    /// A fetch for this name is already pending; this toggle is a no-op
    InFlight,
    /// No cached value: a fetch was registered and must now be performed
    StartFetch(FetchTicket),
}

/// Proof of which fetch a result belongs to. Results are applied only if
/// the entry still has this exact fetch pending.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub name: String,
    id: u64,
}

/// Presentation state for one secret name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Loading,
    Revealed(String),
}

#[derive(Debug, Default)]
struct Entry {
    value: Option<String>,
    visible: bool,
    pending: Option<u64>,
}

#[derive(Debug, Default)]
pub struct RevealCache {
    entries: HashMap<String, Entry>,
    next_fetch_id: u64,
}

impl RevealCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip visibility for a name, registering a fetch when the value is
    /// not cached yet. The pending mark set here is what guarantees a
    /// second toggle during the fetch performs no new request.
    pub fn toggle(&mut self, name: &str) -> ToggleAction {
        let entry = self.entries.entry(name.to_string()).or_default();

        if entry.pending.is_some() {
            return ToggleAction::InFlight;
        }
        if entry.visible {
            entry.visible = false;
            return ToggleAction::NowHidden;
        }
        if entry.value.is_some() {
            entry.visible = true;
            return ToggleAction::NowRevealed;
        }

        let id = self.next_fetch_id;
        self.next_fetch_id += 1;
        entry.pending = Some(id);
        ToggleAction::StartFetch(FetchTicket {
            name: name.to_string(),
            id,
        })
    }

    /// Apply a fetched value. Returns false (and drops the value) when the
    /// entry was evicted or superseded while the fetch was in flight.
    pub fn apply_value(&mut self, ticket: &FetchTicket, value: String) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.name) else {
            return false;
        };
        if entry.pending != Some(ticket.id) {
            return false;
        }
        entry.pending = None;
        entry.value = Some(value);
        entry.visible = true;
        true
    }

    /// A fetch failed: clear the pending mark, the entry stays hidden.
    /// Other entries are unaffected.
    pub fn fetch_failed(&mut self, ticket: &FetchTicket) {
        if let Some(entry) = self.entries.get_mut(&ticket.name) {
            if entry.pending == Some(ticket.id) {
                entry.pending = None;
            }
        }
    }

    /// Discard everything cached for a name. Called after a successful
    /// edit or delete so a stale value can never be shown again.
    pub fn evict(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn state(&self, name: &str) -> RevealState {
        match self.entries.get(name) {
            Some(entry) if entry.pending.is_some() => RevealState::Loading,
            Some(Entry {
                value: Some(value),
                visible: true,
                ..
            }) => RevealState::Revealed(value.clone()),
            _ => RevealState::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_of(action: ToggleAction) -> FetchTicket {
        match action {
            ToggleAction::StartFetch(ticket) => ticket,
            other => panic!("expected StartFetch, got {:?}", other),
        }
    }

    #[test]
    fn second_toggle_during_fetch_starts_nothing() {
        let mut cache = RevealCache::new();

        let first = cache.toggle("db_pass");
        assert!(matches!(first, ToggleAction::StartFetch(_)));

        let second = cache.toggle("db_pass");
        assert_eq!(second, ToggleAction::InFlight);
        assert_eq!(cache.state("db_pass"), RevealState::Loading);

        // Both toggles observe the same resolved value.
        let ticket = ticket_of(first);
        assert!(cache.apply_value(&ticket, "s3cret".to_string()));
        assert_eq!(
            cache.state("db_pass"),
            RevealState::Revealed("s3cret".to_string())
        );
    }

    #[test]
    fn hide_and_reshow_uses_the_cached_value() {
        let mut cache = RevealCache::new();
        let ticket = ticket_of(cache.toggle("db_pass"));
        cache.apply_value(&ticket, "s3cret".to_string());

        assert_eq!(cache.toggle("db_pass"), ToggleAction::NowHidden);
        assert_eq!(cache.state("db_pass"), RevealState::Hidden);

        // No new fetch: the value stayed cached while hidden.
        assert_eq!(cache.toggle("db_pass"), ToggleAction::NowRevealed);
        assert_eq!(
            cache.state("db_pass"),
            RevealState::Revealed("s3cret".to_string())
        );
    }

    #[test]
    fn failed_fetch_returns_to_hidden_and_allows_retry() {
        let mut cache = RevealCache::new();
        let ticket = ticket_of(cache.toggle("db_pass"));

        cache.fetch_failed(&ticket);
        assert_eq!(cache.state("db_pass"), RevealState::Hidden);

        // Retry starts a fresh fetch rather than reporting in-flight.
        assert!(matches!(cache.toggle("db_pass"), ToggleAction::StartFetch(_)));
    }

    #[test]
    fn eviction_forces_a_fresh_fetch() {
        let mut cache = RevealCache::new();
        let ticket = ticket_of(cache.toggle("db_pass"));
        cache.apply_value(&ticket, "old-value".to_string());

        cache.evict("db_pass");
        assert_eq!(cache.state("db_pass"), RevealState::Hidden);

        let retry = cache.toggle("db_pass");
        let retry_ticket = ticket_of(retry);
        assert!(cache.apply_value(&retry_ticket, "new-value".to_string()));
        assert_eq!(
            cache.state("db_pass"),
            RevealState::Revealed("new-value".to_string())
        );
    }

    #[test]
    fn stale_result_after_eviction_is_ignored() {
        let mut cache = RevealCache::new();
        let ticket = ticket_of(cache.toggle("db_pass"));

        // Secret edited while the fetch is still in flight.
        cache.evict("db_pass");

        assert!(!cache.apply_value(&ticket, "pre-edit value".to_string()));
        assert_eq!(cache.state("db_pass"), RevealState::Hidden);
    }

    #[test]
    fn stale_result_for_a_superseded_fetch_is_ignored() {
        let mut cache = RevealCache::new();
        let old_ticket = ticket_of(cache.toggle("db_pass"));

        // Evict then reveal again: a newer fetch owns the entry now.
        cache.evict("db_pass");
        let new_ticket = ticket_of(cache.toggle("db_pass"));

        assert!(!cache.apply_value(&old_ticket, "stale".to_string()));
        assert!(cache.apply_value(&new_ticket, "fresh".to_string()));
        assert_eq!(
            cache.state("db_pass"),
            RevealState::Revealed("fresh".to_string())
        );
    }

    #[test]
    fn failure_of_one_entry_leaves_others_alone() {
        let mut cache = RevealCache::new();
        let a = ticket_of(cache.toggle("alpha"));
        let b = ticket_of(cache.toggle("beta"));

        cache.fetch_failed(&a);
        assert_eq!(cache.state("alpha"), RevealState::Hidden);
        assert_eq!(cache.state("beta"), RevealState::Loading);

        assert!(cache.apply_value(&b, "beta-value".to_string()));
        assert_eq!(
            cache.state("beta"),
            RevealState::Revealed("beta-value".to_string())
        );
    }

    #[test]
    fn unknown_names_read_as_hidden() {
        let cache = RevealCache::new();
        assert_eq!(cache.state("never-seen"), RevealState::Hidden);
    }
}
