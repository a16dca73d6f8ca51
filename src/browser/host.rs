//! Host browser abstraction.
//!
//! The relay and the panel never touch tabs directly. They ask a
//! [`Browser`] for the window list, for a tab's page agent, to inject a
//! capability, or to open a new tab.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};
use crate::page::AgentHandle;
use crate::protocol::OverlayState;

// ============================================================================
// Types
// ============================================================================

/// Window category. Only [`WindowKind::Normal`] windows host targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowKind {
    /// Regular browsing window.
    Normal,
    /// Popup window.
    Popup,
    /// Panel window.
    Panel,
    /// Developer tools window.
    Devtools,
}

/// Snapshot of one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Tab ID.
    pub id: TabId,
    /// Current URL.
    pub url: String,
    /// Current title.
    pub title: String,
    /// Whether this is its window's active tab.
    pub active: bool,
}

/// Snapshot of one window and its tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Window ID.
    pub id: WindowId,
    /// Window category.
    pub kind: WindowKind,
    /// Whether the window has focus.
    pub focused: bool,
    /// Tabs, in strip order.
    pub tabs: Vec<TabInfo>,
}

impl WindowInfo {
    /// Returns the active tab, if any.
    #[inline]
    #[must_use]
    pub fn active_tab(&self) -> Option<&TabInfo> {
        self.tabs.iter().find(|tab| tab.active)
    }
}

/// Capability the relay can inject into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Full overlay hosting the panel.
    Overlay,
    /// Minimal banner proving injection works.
    Probe,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlay => f.write_str("overlay"),
            Self::Probe => f.write_str("probe"),
        }
    }
}

// ============================================================================
// Browser Trait
// ============================================================================

/// Host browser operations.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Lists windows with their tabs.
    async fn windows(&self) -> Result<Vec<WindowInfo>>;

    /// Returns the page agent handle for `tab`.
    ///
    /// # Errors
    ///
    /// [`Error::TargetUnavailable`] if the tab no longer exists.
    async fn page_agent(&self, tab: TabId) -> Result<AgentHandle>;

    /// Injects `capability` into `tab`.
    ///
    /// # Errors
    ///
    /// [`Error::InjectionFailure`] if the host refused the injection.
    async fn inject(&self, tab: TabId, capability: Capability) -> Result<OverlayState>;

    /// Opens `url` in a new tab and returns its ID.
    async fn open_tab(&self, url: &str) -> Result<TabId>;
}

// ============================================================================
// Target Resolution
// ============================================================================

/// Picks the page an action should target.
///
/// Prefers the focused normal window's active tab, then any normal
/// window's active tab.
///
/// # Errors
///
/// [`Error::TargetUnavailable`] if no normal window has an active tab.
pub fn active_target(windows: &[WindowInfo]) -> Result<TabInfo> {
    let normal = || windows.iter().filter(|w| w.kind == WindowKind::Normal);

    normal()
        .filter(|w| w.focused)
        .find_map(WindowInfo::active_tab)
        .or_else(|| normal().find_map(WindowInfo::active_tab))
        .cloned()
        .ok_or_else(|| Error::target_unavailable("no active tab in any normal window"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: u32, active: bool) -> TabInfo {
        TabInfo {
            id: TabId::new(id).expect("tab id"),
            url: format!("https://example.com/{id}"),
            title: String::new(),
            active,
        }
    }

    fn window(id: u32, kind: WindowKind, focused: bool, tabs: Vec<TabInfo>) -> WindowInfo {
        WindowInfo {
            id: WindowId::new(id).expect("window id"),
            kind,
            focused,
            tabs,
        }
    }

    #[test]
    fn test_prefers_focused_normal_window() {
        let windows = vec![
            window(1, WindowKind::Normal, false, vec![tab(1, true)]),
            window(2, WindowKind::Normal, true, vec![tab(2, false), tab(3, true)]),
        ];
        assert_eq!(active_target(&windows).expect("target").id.as_u32(), 3);
    }

    #[test]
    fn test_falls_back_to_any_normal_window() {
        let windows = vec![
            window(1, WindowKind::Popup, true, vec![tab(1, true)]),
            window(2, WindowKind::Normal, false, vec![tab(2, true)]),
        ];
        assert_eq!(active_target(&windows).expect("target").id.as_u32(), 2);
    }

    #[test]
    fn test_focused_window_without_active_tab() {
        let windows = vec![
            window(1, WindowKind::Normal, true, vec![tab(1, false)]),
            window(2, WindowKind::Normal, false, vec![tab(2, true)]),
        ];
        assert_eq!(active_target(&windows).expect("target").id.as_u32(), 2);
    }

    #[test]
    fn test_no_target() {
        let windows = vec![window(1, WindowKind::Devtools, true, vec![tab(1, true)])];
        assert!(matches!(
            active_target(&windows),
            Err(Error::TargetUnavailable { .. })
        ));
        assert!(active_target(&[]).is_err());
    }
}
