//! Malvon Tab Management
//!
//! A [`TabGroup`] owns its [`Tab`]s and a selection cursor. Tabs only hold
//! a non-owning [`ConfigurationHandle`] to the profile's shared
//! [`WebConfiguration`]; the renderer behind a tab is created lazily on
//! first display, never while restoring a session.

mod color;
mod configuration;
mod error;
mod group;
mod record;
mod renderer;
mod tab;

pub use color::Color;
pub use configuration::{ConfigurationHandle, StoragePartition, WebConfiguration};
pub use error::TabError;
pub use group::{TabGroup, DEFAULT_TAB_GROUP_ICON};
pub use record::{TabGroupRecord, TabRecord};
pub use renderer::{Renderer, RendererFactory, RendererState};
pub use tab::{Tab, NEW_TAB_TITLE, UNTITLED_TAB_TITLE};

pub type Result<T> = std::result::Result<T, TabError>;

#[cfg(test)]
mod test_support;
