//! Tab data structure
//!
//! A tab is cheap until it is displayed: restoring a session builds tabs
//! from [`TabRecord`]s without creating renderers.

use std::sync::Arc;

use crate::configuration::{ConfigurationHandle, WebConfiguration};
use crate::error::TabError;
use crate::record::TabRecord;
use crate::renderer::{Renderer, RendererFactory, RendererState};
use crate::Result;

pub const UNTITLED_TAB_TITLE: &str = "Untitled Tab";
pub const NEW_TAB_TITLE: &str = "New Tab";

#[derive(Debug)]
pub struct Tab {
    /// Last known address
    pub url: Option<String>,
    pub title: String,
    /// Placeholder tab that never loaded an address
    is_empty: bool,
    renderer: RendererState,
    configuration: ConfigurationHandle,
}

impl Tab {
    pub fn new(url: String, title: String, configuration: ConfigurationHandle) -> Result<Self> {
        validate_url(&url)?;

        Ok(Self {
            url: Some(url),
            title,
            is_empty: false,
            renderer: RendererState::Empty,
            configuration,
        })
    }

    /// A "New Tab" placeholder with no address.
    pub fn placeholder(configuration: ConfigurationHandle) -> Self {
        Self {
            url: None,
            title: NEW_TAB_TITLE.to_string(),
            is_empty: true,
            renderer: RendererState::Empty,
            configuration,
        }
    }

    /// Rebuild a tab from its persisted form. Never creates a renderer.
    pub fn from_record(record: TabRecord, configuration: ConfigurationHandle) -> Self {
        let title = if record.title.is_empty() {
            UNTITLED_TAB_TITLE.to_string()
        } else {
            record.title
        };

        Self {
            url: record.url,
            title,
            is_empty: record.is_empty,
            renderer: RendererState::Empty,
            configuration,
        }
    }

    /// Persisted form. Prefers the renderer's current address, which
    /// reflects redirects and in-page navigation, over the stored one.
    pub fn to_record(&self) -> TabRecord {
        TabRecord {
            title: self.title.clone(),
            url: self.current_address(),
            is_empty: self.is_empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_loaded()
    }

    pub fn renderer_state(&self) -> &RendererState {
        &self.renderer
    }

    pub fn configuration(&self) -> &ConfigurationHandle {
        &self.configuration
    }

    /// The renderer for this tab, created on first use and pointed at the
    /// stored address. A tab whose profile configuration is gone gets a
    /// fresh non-persistent one.
    pub fn renderer(&mut self, factory: &dyn RendererFactory) -> &mut dyn Renderer {
        let configuration = &self.configuration;
        let url = self.url.as_deref();

        self.renderer.get_or_insert_with(|| {
            let configuration = configuration.upgrade().unwrap_or_else(|| {
                tracing::warn!("Tab configuration unavailable, using a non-persistent one");
                Arc::new(WebConfiguration::default())
            });

            let mut renderer = factory.create(&configuration);
            if let Some(url) = url {
                renderer.load(url);
            }

            tracing::debug!(url = ?url, "Created renderer");
            renderer
        })
    }

    /// Address the renderer shows, falling back to the stored one.
    pub fn current_address(&self) -> Option<String> {
        self.renderer
            .as_renderer()
            .and_then(|r| r.current_address())
            .or_else(|| self.url.clone())
    }

    /// Navigate to `url`, loading it right away if a renderer exists.
    pub fn navigate(&mut self, url: String) -> Result<()> {
        validate_url(&url)?;

        if let RendererState::Loaded(renderer) = &mut self.renderer {
            renderer.load(&url);
        }

        self.url = Some(url);
        self.is_empty = false;
        Ok(())
    }

    /// Copy address and title from the renderer after a page load.
    pub fn sync_from_renderer(&mut self) {
        let Some(renderer) = self.renderer.as_renderer() else {
            return;
        };

        if let Some(address) = renderer.current_address() {
            self.url = Some(address);
            self.is_empty = false;
        }
        if let Some(title) = renderer.title().filter(|t| !t.is_empty()) {
            self.title = title;
        }
    }

    /// Release the renderer, keeping what it last showed.
    pub fn deactivate(&mut self) {
        self.sync_from_renderer();
        self.renderer = RendererState::Empty;
    }

    /// Get display title (with fallback to URL)
    pub fn display_title(&self) -> &str {
        match (&self.url, self.title.is_empty()) {
            (Some(url), true) => url,
            _ => &self.title,
        }
    }
}

fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
    }

    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| TabError::InvalidUrl(format!("{}: {}", url, e)))
}
