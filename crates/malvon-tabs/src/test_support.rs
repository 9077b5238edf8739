use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::configuration::{StoragePartition, WebConfiguration};
use crate::renderer::{Renderer, RendererFactory};

/// Renderer that optionally redirects every load to a fixed address.
pub(crate) struct FakeRenderer {
    pub address: Option<String>,
    pub redirect_to: Option<String>,
}

impl Renderer for FakeRenderer {
    fn load(&mut self, address: &str) {
        self.address = Some(self.redirect_to.clone().unwrap_or_else(|| address.to_string()));
    }

    fn current_address(&self) -> Option<String> {
        self.address.clone()
    }

    fn title(&self) -> Option<String> {
        self.address.as_ref().map(|a| format!("Page at {}", a))
    }
}

#[derive(Default)]
pub(crate) struct FakeFactory {
    pub created: AtomicUsize,
    pub redirect_to: Option<String>,
    pub last_partition: Mutex<Option<StoragePartition>>,
}

impl FakeFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn last_partition(&self) -> Option<StoragePartition> {
        *self.last_partition.lock().unwrap()
    }
}

impl RendererFactory for FakeFactory {
    fn create(&self, configuration: &Arc<WebConfiguration>) -> Box<dyn Renderer> {
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.last_partition.lock().unwrap() = Some(configuration.partition);
        Box::new(FakeRenderer {
            address: None,
            redirect_to: self.redirect_to.clone(),
        })
    }
}
