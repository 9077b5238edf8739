//! Browser profiles

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use malvon_history::{HistoryRecord, HistoryStore, DEFAULT_BATCH_SIZE};
use malvon_tabs::{
    Color, ConfigurationHandle, Tab, TabGroup, TabGroupRecord, WebConfiguration,
    UNTITLED_TAB_TITLE,
};

use crate::error::ProfileError;
use crate::registry::ProfileRegistry;
use crate::Result;

pub const DEFAULT_TAB_GROUP_NAME: &str = "Untitled Tab Group";
pub const PRIVATE_TAB_GROUP_NAME: &str = "Private Tab Group";
pub const PRIVATE_PROFILE_NAME: &str = "Private";

#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub data_dir: PathBuf,
    pub history_batch_size: usize,
}

impl ProfileOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            history_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Where a persistent profile keeps its tab groups.
struct Persistence {
    tab_groups_path: PathBuf,
    registry: ProfileRegistry,
}

pub struct Profile {
    name: String,
    configuration: Arc<WebConfiguration>,
    tab_groups: Vec<TabGroup>,
    current: usize,
    history: Option<HistoryStore>,
    /// `None` for private profiles
    persistence: Option<Persistence>,
}

impl Profile {
    /// Open the profile called `name`, registering it if it is new.
    pub fn open(name: &str, registry: &ProfileRegistry, options: &ProfileOptions) -> Result<Self> {
        let data = registry.load_or_create(name)?;
        let configuration = Arc::new(WebConfiguration::persistent(data.partition_id));

        let history_path = options
            .data_dir
            .join(format!("{}.sqlite", data.partition_id));
        let history = match HistoryStore::open(&history_path, options.history_batch_size) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(
                    profile = %name,
                    path = %history_path.display(),
                    error = %e,
                    "Failed to open history, visits will not be saved"
                );
                HistoryStore::detached(options.history_batch_size)
            }
        };

        let tab_groups_path = options.data_dir.join(format!("{}-TabGroups.json", name));
        let handle = ConfigurationHandle::new(&configuration);
        let tab_groups = load_tab_groups(&tab_groups_path, &handle);
        let current = data.selected_tab_group_index.min(tab_groups.len() - 1);

        tracing::info!(
            profile = %name,
            partition = %data.partition_id,
            tab_groups = tab_groups.len(),
            current,
            "Opened profile"
        );

        Ok(Self {
            name: name.to_string(),
            configuration,
            tab_groups,
            current,
            history: Some(history),
            persistence: Some(Persistence {
                tab_groups_path,
                registry: registry.clone(),
            }),
        })
    }

    /// A profile that keeps nothing: ephemeral storage, no history, no files.
    pub fn private() -> Self {
        Self {
            name: PRIVATE_PROFILE_NAME.to_string(),
            configuration: Arc::new(WebConfiguration::ephemeral()),
            tab_groups: vec![TabGroup::new(PRIVATE_TAB_GROUP_NAME).with_color(Color::BLACK)],
            current: 0,
            history: None,
            persistence: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_private(&self) -> bool {
        self.persistence.is_none()
    }

    pub fn configuration(&self) -> &Arc<WebConfiguration> {
        &self.configuration
    }

    pub fn configuration_handle(&self) -> ConfigurationHandle {
        ConfigurationHandle::new(&self.configuration)
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Record a finished page load in this profile's history.
    pub fn record_visit(&self, title: &str, address: &str) {
        let Some(history) = &self.history else {
            return;
        };

        let title = if title.is_empty() { UNTITLED_TAB_TITLE } else { title };
        history.insert(HistoryRecord::new(title.to_string(), address.to_string()));
    }

    pub fn tab_groups(&self) -> &[TabGroup] {
        &self.tab_groups
    }

    pub fn current_tab_group_index(&self) -> usize {
        self.current
    }

    pub fn current_tab_group(&self) -> &TabGroup {
        &self.tab_groups[self.current]
    }

    pub fn current_tab_group_mut(&mut self) -> &mut TabGroup {
        &mut self.tab_groups[self.current]
    }

    /// Open `url` in a new tab of the current group and select it.
    pub fn open_tab(&mut self, url: String, title: String) -> Result<usize> {
        let tab = Tab::new(url, title, self.configuration_handle())?;
        Ok(self.current_tab_group_mut().add_tab(tab))
    }

    /// Append a new group and make it current. Returns its index.
    pub fn add_tab_group(&mut self, name: impl Into<String>) -> usize {
        self.tab_groups.push(TabGroup::new(name));
        self.current = self.tab_groups.len() - 1;

        tracing::debug!(profile = %self.name, index = self.current, "Added tab group");
        self.current
    }

    pub fn switch_tab_group(&mut self, index: usize) -> Result<()> {
        self.check_group_index(index)?;
        self.current = index;
        Ok(())
    }

    /// Remove the group at `index`. A profile always keeps at least one
    /// group, so removing the last one leaves a fresh empty group behind.
    pub fn remove_tab_group(&mut self, index: usize) -> Result<TabGroup> {
        self.check_group_index(index)?;

        let removed = self.tab_groups.remove(index);
        if self.tab_groups.is_empty() {
            let fresh = self.fresh_group();
            self.tab_groups.push(fresh);
        }

        if self.current > index {
            self.current -= 1;
        }
        self.current = self.current.min(self.tab_groups.len() - 1);

        tracing::debug!(
            profile = %self.name,
            group = %removed.name,
            current = self.current,
            "Removed tab group"
        );
        Ok(removed)
    }

    fn fresh_group(&self) -> TabGroup {
        if self.is_private() {
            TabGroup::new(PRIVATE_TAB_GROUP_NAME).with_color(Color::BLACK)
        } else {
            TabGroup::new(DEFAULT_TAB_GROUP_NAME)
        }
    }

    fn check_group_index(&self, index: usize) -> Result<()> {
        if index < self.tab_groups.len() {
            Ok(())
        } else {
            Err(ProfileError::TabGroupOutOfBounds {
                index,
                len: self.tab_groups.len(),
            })
        }
    }

    /// Write the tab groups document and remember the current group.
    /// Does nothing for private profiles.
    pub fn save_tab_groups(&self) -> Result<()> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };

        let records: Vec<TabGroupRecord> =
            self.tab_groups.iter().map(TabGroup::to_record).collect();
        let json = serde_json::to_vec(&records)?;

        if let Some(parent) = persistence.tab_groups_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&persistence.tab_groups_path, json)?;

        persistence
            .registry
            .set_selected_tab_group_index(&self.name, self.current)?;

        tracing::info!(
            profile = %self.name,
            tab_groups = records.len(),
            "Saved tab groups"
        );
        Ok(())
    }

    /// Save tab groups and flush history. The history store is closed even
    /// if saving fails.
    pub fn close(&mut self) -> Result<()> {
        let saved = self.save_tab_groups();

        if let Some(history) = self.history.take() {
            history.flush_and_close();
        }

        saved
    }
}

/// Read the tab groups document. Anything unreadable, or an empty document,
/// gives a single default group.
fn load_tab_groups(path: &Path, configuration: &ConfigurationHandle) -> Vec<TabGroup> {
    let records = fs::read(path)
        .map_err(ProfileError::from)
        .and_then(|data| Ok(serde_json::from_slice::<Vec<TabGroupRecord>>(&data)?));

    match records {
        Ok(records) if !records.is_empty() => records
            .into_iter()
            .map(|record| TabGroup::from_record(record, configuration))
            .collect(),
        Ok(_) => vec![TabGroup::new(DEFAULT_TAB_GROUP_NAME)],
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load tab groups, starting with a default group"
            );
            vec![TabGroup::new(DEFAULT_TAB_GROUP_NAME)]
        }
    }
}

impl Drop for Profile {
    fn drop(&mut self) {
        if let Some(history) = self.history.take() {
            history.flush_and_close();
        }
    }
}
