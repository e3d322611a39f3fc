use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
    /// New history entry
    Push,
    /// Overwrites the current entry, used by redirects
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub location: String,
}

/// Client-side navigation. The URL is the source of truth for which CRUD
/// state is active, so views move between states only through this.
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);

    fn push(&self, location: &str) {
        self.navigate(Navigation {
            kind: NavigationKind::Push,
            location: location.to_string(),
        });
    }

    fn replace(&self, location: &str) {
        self.navigate(Navigation {
            kind: NavigationKind::Replace,
            location: location.to_string(),
        });
    }
}

/// Keeps the navigation history in memory. The hosts read the last entry to
/// decide where the user ends up.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Mutex<Vec<Navigation>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Navigation> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, navigation: Navigation) {
        tracing::debug!(kind = ?navigation.kind, location = %navigation.location, "navigate");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(navigation);
        }
    }
}
