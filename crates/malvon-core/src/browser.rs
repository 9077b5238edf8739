//! Main browser state container

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use malvon_history::SearchFrequencyStore;
use malvon_profile::{Profile, ProfileRegistry};
use malvon_suggest::{GoogleSuggestions, RemoteSuggestions, SuggestionAggregator, SuggestionEvent};

use crate::config::Config;
use crate::Result;

/// Main browser instance
///
/// Holds everything that outlives a single window: the profile registry,
/// the search frequency store shared by all profiles, the remote
/// suggestion client and the profiles opened so far.
pub struct Browser {
    config: Config,
    registry: ProfileRegistry,
    searches: SearchFrequencyStore,
    remote: Arc<dyn RemoteSuggestions>,
    profiles: Mutex<HashMap<String, Arc<Mutex<Profile>>>>,
}

impl Browser {
    pub fn new(config: Config) -> Result<Self> {
        let remote =
            GoogleSuggestions::with_endpoint(&config.suggest_endpoint, config.suggest_timeout())?;
        Self::with_remote(config, Arc::new(remote))
    }

    /// Like [`Browser::new`] with a caller-supplied suggestion service.
    pub fn with_remote(config: Config, remote: Arc<dyn RemoteSuggestions>) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;

        let registry = ProfileRegistry::open(config.registry_path())?;
        let searches = SearchFrequencyStore::open(config.search_data_path())?;

        tracing::info!(data_dir = %config.data_dir.display(), "Browser initialized");

        Ok(Self {
            config,
            registry,
            searches,
            remote,
            profiles: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn search_frequency(&self) -> &SearchFrequencyStore {
        &self.searches
    }

    // === Profile operations ===

    /// Open `name`, or return it if it is already open.
    pub fn open_profile(&self, name: &str) -> Result<Arc<Mutex<Profile>>> {
        let mut profiles = self.profiles.lock();
        if let Some(profile) = profiles.get(name) {
            return Ok(Arc::clone(profile));
        }

        let profile = Profile::open(name, &self.registry, &self.config.profile_options())?;
        let profile = Arc::new(Mutex::new(profile));
        profiles.insert(name.to_string(), Arc::clone(&profile));
        Ok(profile)
    }

    pub fn open_default_profile(&self) -> Result<Arc<Mutex<Profile>>> {
        self.open_profile(&self.config.default_profile)
    }

    /// A fresh private profile. Not tracked: it is gone once dropped.
    pub fn private_profile(&self) -> Profile {
        tracing::info!("Opened private profile");
        Profile::private()
    }

    /// Names of every registered profile, open or not.
    pub fn profile_names(&self) -> Result<Vec<String>> {
        Ok(self.registry.names()?)
    }

    // === Address bar ===

    /// An aggregator over the shared search terms and `profile`'s history.
    /// Fails outside a Tokio runtime.
    pub fn suggestion_aggregator(
        &self,
        profile: &Profile,
    ) -> Result<(SuggestionAggregator, mpsc::UnboundedReceiver<SuggestionEvent>)> {
        let (aggregator, events) =
            SuggestionAggregator::new(Arc::clone(&self.remote), self.config.suggestion_settings())?;

        let aggregator = aggregator.with_search_frequency(self.searches.clone());
        let aggregator = match profile.history() {
            Some(history) => aggregator.with_history(history.clone()),
            None => aggregator,
        };

        Ok((aggregator, events))
    }

    /// Count a submitted search term. Failures are logged, never surfaced.
    pub fn record_search(&self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        if let Err(e) = self.searches.increment_occurrence(term) {
            tracing::warn!(error = %e, "Failed to record search term");
        }
    }

    // === Lifecycle ===

    /// Save and close every open profile. Every profile is attempted; the
    /// first failure is returned.
    pub fn shutdown(&self) -> Result<()> {
        let profiles: Vec<_> = self.profiles.lock().drain().collect();
        let mut first_error = None;

        for (name, profile) in profiles {
            if let Err(e) = profile.lock().close() {
                tracing::error!(profile = %name, error = %e, "Failed to close profile");
                first_error.get_or_insert(e);
            }
        }

        tracing::info!("Browser shut down");
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
