//! Renderer seam
//!
//! The embedding application supplies the actual web view through
//! [`RendererFactory`]; this crate only tracks whether one exists.

use std::fmt;
use std::sync::Arc;

use crate::configuration::WebConfiguration;

/// A live web-content renderer backing a tab.
pub trait Renderer: Send {
    fn load(&mut self, address: &str);

    /// Address currently displayed, which may differ from the one loaded
    /// after redirects or in-page navigation.
    fn current_address(&self) -> Option<String>;

    fn title(&self) -> Option<String>;
}

pub trait RendererFactory {
    fn create(&self, configuration: &Arc<WebConfiguration>) -> Box<dyn Renderer>;
}

#[derive(Default)]
pub enum RendererState {
    /// No renderer yet: restored or background tab
    #[default]
    Empty,
    Loaded(Box<dyn Renderer>),
}

impl RendererState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, RendererState::Loaded(_))
    }

    pub fn as_renderer(&self) -> Option<&dyn Renderer> {
        match self {
            RendererState::Loaded(renderer) => Some(renderer.as_ref()),
            RendererState::Empty => None,
        }
    }

    pub(crate) fn get_or_insert_with<F>(&mut self, create: F) -> &mut dyn Renderer
    where
        F: FnOnce() -> Box<dyn Renderer>,
    {
        if let RendererState::Empty = self {
            *self = RendererState::Loaded(create());
        }

        match self {
            RendererState::Loaded(renderer) => renderer.as_mut(),
            RendererState::Empty => unreachable!("renderer was just created"),
        }
    }
}

impl fmt::Debug for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererState::Empty => f.write_str("Empty"),
            RendererState::Loaded(renderer) => f
                .debug_tuple("Loaded")
                .field(&renderer.current_address())
                .finish(),
        }
    }
}
