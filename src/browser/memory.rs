//! In-memory browser host.
//!
//! Windows and tabs live in a table guarded by a `parking_lot` mutex. Every
//! tab holds a [`StaticDocument`] and a running [`PageAgent`] serving it.
//!
//! Opening a page spawns its agent task, so it must happen inside a Tokio
//! runtime.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};
use crate::page::{AgentHandle, Document, PageAgent, SharedDocument, StaticDocument};
use crate::protocol::{AgentRequest, OverlayState};

use super::host::{Browser, Capability, TabInfo, WindowInfo, WindowKind};

// ============================================================================
// Types
// ============================================================================

struct WindowEntry {
    kind: WindowKind,
    focused: bool,
    tabs: Vec<TabId>,
}

struct TabEntry {
    window: WindowId,
    active: bool,
    document: SharedDocument<StaticDocument>,
    agent: AgentHandle,
}

#[derive(Default)]
struct Inner {
    windows: Vec<(WindowId, WindowEntry)>,
    tabs: FxHashMap<TabId, TabEntry>,
    blocked: FxHashSet<(TabId, Capability)>,
    next_window: u32,
    next_tab: u32,
}

impl Inner {
    fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowEntry> {
        self.windows
            .iter_mut()
            .find(|(window_id, _)| *window_id == id)
            .map(|(_, entry)| entry)
    }
}

// ============================================================================
// MemoryBrowser
// ============================================================================

/// Browser host backed by in-memory documents.
pub struct MemoryBrowser {
    inner: Mutex<Inner>,
    agent_timeout: Option<Duration>,
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryBrowser")
            .field("windows", &inner.windows.len())
            .field("tabs", &inner.tabs.len())
            .finish_non_exhaustive()
    }
}

impl MemoryBrowser {
    /// Creates a browser with no windows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            agent_timeout: None,
        }
    }

    /// Sets the call timeout of page agents spawned from now on.
    #[must_use]
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = Some(timeout);
        self
    }

    /// Opens a window and focuses it.
    pub fn open_window(&self, kind: WindowKind) -> WindowId {
        let mut inner = self.inner.lock();
        inner.next_window += 1;
        let id = WindowId::new(inner.next_window).unwrap_or(WindowId::MIN);

        for (_, window) in &mut inner.windows {
            window.focused = false;
        }
        inner.windows.push((
            id,
            WindowEntry {
                kind,
                focused: true,
                tabs: Vec::new(),
            },
        ));

        debug!(window_id = %id, ?kind, "Window opened");
        id
    }

    /// Opens `document` in a new active tab of `window`.
    ///
    /// # Errors
    ///
    /// [`Error::TargetUnavailable`] if the window does not exist.
    pub fn open_page(&self, window: WindowId, document: StaticDocument) -> Result<TabId> {
        let mut inner = self.inner.lock();
        if inner.window_mut(window).is_none() {
            return Err(Error::target_unavailable(format!(
                "window {window} does not exist"
            )));
        }

        inner.next_tab += 1;
        let tab_id = TabId::new(inner.next_tab).unwrap_or(TabId::MIN);
        let url = document.url().to_string();
        let document = Arc::new(Mutex::new(document));
        let agent = PageAgent::new(tab_id, Arc::clone(&document)).spawn(self.agent_timeout);

        let siblings = inner
            .window_mut(window)
            .map(|entry| {
                entry.tabs.push(tab_id);
                entry.tabs.clone()
            })
            .unwrap_or_default();
        for sibling in siblings {
            if let Some(tab) = inner.tabs.get_mut(&sibling) {
                tab.active = false;
            }
        }

        inner.tabs.insert(
            tab_id,
            TabEntry {
                window,
                active: true,
                document,
                agent,
            },
        );

        info!(tab_id = %tab_id, window_id = %window, url = %url, "Page opened");
        Ok(tab_id)
    }

    /// Focuses `window`, unfocusing every other window.
    pub fn focus(&self, window: WindowId) {
        let mut inner = self.inner.lock();
        for (id, entry) in &mut inner.windows {
            entry.focused = *id == window;
        }
    }

    /// Makes `tab` its window's active tab.
    pub fn activate(&self, tab: TabId) {
        let mut inner = self.inner.lock();
        let Some(window) = inner.tabs.get(&tab).map(|entry| entry.window) else {
            return;
        };

        for entry in inner.tabs.values_mut() {
            if entry.window == window {
                entry.active = false;
            }
        }
        if let Some(entry) = inner.tabs.get_mut(&tab) {
            entry.active = true;
        }
    }

    /// Closes `tab`. Its page agent stops once pending handles drop.
    pub fn close_tab(&self, tab: TabId) {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.tabs.remove(&tab) else {
            return;
        };
        if let Some(window) = inner.window_mut(entry.window) {
            window.tabs.retain(|id| *id != tab);
        }
        inner.blocked.retain(|(blocked, _)| *blocked != tab);
        debug!(tab_id = %tab, "Tab closed");
    }

    /// Returns the document shown in `tab`.
    #[must_use]
    pub fn document(&self, tab: TabId) -> Option<SharedDocument<StaticDocument>> {
        self.inner
            .lock()
            .tabs
            .get(&tab)
            .map(|entry| Arc::clone(&entry.document))
    }

    /// Makes every future injection of `capability` into `tab` fail.
    pub fn block_injection(&self, tab: TabId, capability: Capability) {
        self.inner.lock().blocked.insert((tab, capability));
    }

    fn agent(&self, tab: TabId) -> Result<AgentHandle> {
        self.inner
            .lock()
            .tabs
            .get(&tab)
            .map(|entry| entry.agent.clone())
            .ok_or_else(|| Error::target_unavailable(format!("tab {tab} does not exist")))
    }

    fn default_window(&self) -> WindowId {
        let existing = {
            let inner = self.inner.lock();
            let normal = || {
                inner
                    .windows
                    .iter()
                    .filter(|(_, w)| w.kind == WindowKind::Normal)
            };
            normal()
                .find(|(_, w)| w.focused)
                .or_else(|| normal().next())
                .map(|(id, _)| *id)
        };

        existing.unwrap_or_else(|| self.open_window(WindowKind::Normal))
    }
}

#[async_trait]
impl Browser for MemoryBrowser {
    async fn windows(&self) -> Result<Vec<WindowInfo>> {
        let inner = self.inner.lock();

        let windows = inner
            .windows
            .iter()
            .map(|(id, window)| WindowInfo {
                id: *id,
                kind: window.kind,
                focused: window.focused,
                tabs: window
                    .tabs
                    .iter()
                    .filter_map(|tab_id| {
                        let entry = inner.tabs.get(tab_id)?;
                        let doc = entry.document.lock();
                        Some(TabInfo {
                            id: *tab_id,
                            url: doc.url().to_string(),
                            title: doc.title().to_string(),
                            active: entry.active,
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(windows)
    }

    async fn page_agent(&self, tab: TabId) -> Result<AgentHandle> {
        self.agent(tab)
    }

    async fn inject(&self, tab: TabId, capability: Capability) -> Result<OverlayState> {
        let blocked = self.inner.lock().blocked.contains(&(tab, capability));
        if blocked {
            return Err(Error::injection_failure(
                tab,
                format!("{capability} injection refused by host"),
            ));
        }

        let request = match capability {
            Capability::Overlay => AgentRequest::AttachOverlay,
            Capability::Probe => AgentRequest::AttachProbe,
        };

        self.agent(tab)?.call(request).await?.into_overlay()
    }

    async fn open_tab(&self, url: &str) -> Result<TabId> {
        let window = self.default_window();
        self.open_page(window, StaticDocument::new(url, ""))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::host::active_target;
    use crate::page::{Document, OVERLAY_ID, PROBE_ID};

    fn page(url: &str) -> StaticDocument {
        StaticDocument::new(url, "Page")
    }

    #[tokio::test]
    async fn test_open_page_is_active() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window(WindowKind::Normal);
        let first = browser.open_page(window, page("https://a.test")).expect("open");
        let second = browser.open_page(window, page("https://b.test")).expect("open");

        let windows = browser.windows().await.expect("windows");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].tabs.len(), 2);

        let target = active_target(&windows).expect("target");
        assert_eq!(target.id, second);
        assert_eq!(target.url, "https://b.test");

        browser.activate(first);
        let windows = browser.windows().await.expect("windows");
        assert_eq!(active_target(&windows).expect("target").id, first);
    }

    #[tokio::test]
    async fn test_focus_moves_target() {
        let browser = MemoryBrowser::new();
        let w1 = browser.open_window(WindowKind::Normal);
        let t1 = browser.open_page(w1, page("https://a.test")).expect("open");
        let w2 = browser.open_window(WindowKind::Normal);
        let t2 = browser.open_page(w2, page("https://b.test")).expect("open");

        let windows = browser.windows().await.expect("windows");
        assert_eq!(active_target(&windows).expect("target").id, t2);

        browser.focus(w1);
        let windows = browser.windows().await.expect("windows");
        assert_eq!(active_target(&windows).expect("target").id, t1);
    }

    #[tokio::test]
    async fn test_inject_overlay_and_block() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window(WindowKind::Normal);
        let tab = browser.open_page(window, page("https://a.test")).expect("open");

        let state = browser.inject(tab, Capability::Overlay).await.expect("inject");
        assert_eq!(state, OverlayState::Attached);

        browser.block_injection(tab, Capability::Probe);
        let err = browser.inject(tab, Capability::Probe).await.unwrap_err();
        assert!(matches!(err, Error::InjectionFailure { .. }));

        let doc = browser.document(tab).expect("document");
        let doc = doc.lock();
        assert!(doc.element_by_id(OVERLAY_ID).is_some());
        assert!(doc.element_by_id(PROBE_ID).is_none());
    }

    #[tokio::test]
    async fn test_closed_tab_is_unavailable() {
        let browser = MemoryBrowser::new();
        let window = browser.open_window(WindowKind::Normal);
        let tab = browser.open_page(window, page("https://a.test")).expect("open");

        browser.close_tab(tab);

        assert!(matches!(
            browser.page_agent(tab).await,
            Err(Error::TargetUnavailable { .. })
        ));
        assert!(browser.document(tab).is_none());
    }

    #[tokio::test]
    async fn test_open_tab_creates_window_when_needed() {
        let browser = MemoryBrowser::new();
        let tab = browser
            .open_tab("https://www.google.com/search?q=x")
            .await
            .expect("open");

        let windows = browser.windows().await.expect("windows");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].kind, WindowKind::Normal);
        assert_eq!(active_target(&windows).expect("target").id, tab);
    }

    #[tokio::test]
    async fn test_open_page_unknown_window() {
        let browser = MemoryBrowser::new();
        let missing = WindowId::new(9).expect("window id");
        assert!(browser.open_page(missing, page("https://a.test")).is_err());
    }
}
