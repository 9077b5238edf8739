//! Tab groups and their selection policy

use crate::color::Color;
use crate::configuration::ConfigurationHandle;
use crate::error::TabError;
use crate::record::TabGroupRecord;
use crate::tab::Tab;
use crate::Result;

pub const DEFAULT_TAB_GROUP_ICON: &str = "square.3.layers.3d";

/// An ordered set of tabs with a selection cursor.
///
/// `selected` is `None` exactly when there are no tabs, otherwise it is a
/// valid index. Every mutation below keeps it that way.
#[derive(Debug)]
pub struct TabGroup {
    pub name: String,
    pub color: Color,
    pub icon: String,
    tabs: Vec<Tab>,
    selected: Option<usize>,
    /// Selection before the most recent switch, for "previous tab"
    previous: Option<usize>,
}

impl TabGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::default(),
            icon: DEFAULT_TAB_GROUP_ICON.to_string(),
            tabs: Vec::new(),
            selected: None,
            previous: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Append `tab` and select it. Returns its index.
    pub fn add_tab(&mut self, tab: Tab) -> usize {
        self.tabs.push(tab);
        let index = self.tabs.len() - 1;

        self.previous = self.selected;
        self.selected = Some(index);

        tracing::debug!(group = %self.name, index, "Added tab");
        index
    }

    /// Append a "New Tab" placeholder and select it.
    pub fn add_empty_tab(&mut self, configuration: ConfigurationHandle) -> usize {
        self.add_tab(Tab::placeholder(configuration))
    }

    pub fn switch_tab(&mut self, to: usize) -> Result<()> {
        self.check_index(to)?;

        if self.selected != Some(to) {
            self.previous = self.selected;
            self.selected = Some(to);
        }
        Ok(())
    }

    /// Remove the tab at `index`. The selection moves to the neighbour of the
    /// removed tab, or to nothing once the group is empty.
    pub fn remove_tab(&mut self, index: usize) -> Result<Tab> {
        self.check_index(index)?;

        let tab = self.tabs.remove(index);
        self.selected = self.selected.and_then(|sel| self.index_after_removal(sel, index));
        self.previous = match self.previous {
            Some(prev) if prev == index => None,
            Some(prev) if prev > index => Some(prev - 1),
            other => other,
        };
        if self.previous == self.selected {
            self.previous = None;
        }

        tracing::debug!(
            group = %self.name,
            index,
            selected = self.selected_index(),
            "Removed tab"
        );
        Ok(tab)
    }

    /// Remove the selected tab, if any.
    pub fn remove_current_tab(&mut self) -> Option<Tab> {
        let index = self.selected?;
        self.remove_tab(index).ok()
    }

    fn index_after_removal(&self, selected: usize, removed: usize) -> Option<usize> {
        let last = self.tabs.len().checked_sub(1)?;

        if removed > last && selected >= removed {
            Some(last)
        } else if selected >= removed {
            Some(selected.saturating_sub(1))
        } else {
            Some(selected)
        }
    }

    /// Move the tab at `from` so that it ends up at `to`. The selection keeps
    /// pointing at the same tab.
    pub fn move_tab(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);

        let follow = |index: usize| {
            if index == from {
                to
            } else if from < index && index <= to {
                index - 1
            } else if to <= index && index < from {
                index + 1
            } else {
                index
            }
        };
        self.selected = self.selected.map(follow);
        self.previous = self.previous.map(follow);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.tabs.len() {
            Ok(())
        } else {
            Err(TabError::IndexOutOfBounds {
                index,
                len: self.tabs.len(),
            })
        }
    }

    /// Selected index, `-1` when the group has no tabs.
    pub fn selected_index(&self) -> i64 {
        self.selected.map_or(-1, |i| i as i64)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        self.selected.and_then(|i| self.tabs.get(i))
    }

    pub fn selected_tab_mut(&mut self) -> Option<&mut Tab> {
        self.selected.and_then(|i| self.tabs.get_mut(i))
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn to_record(&self) -> TabGroupRecord {
        TabGroupRecord {
            name: self.name.clone(),
            tabs: self.tabs.iter().map(Tab::to_record).collect(),
            selected_index: self.selected_index(),
            color: Some(self.color),
            icon: self.icon.clone(),
        }
    }

    /// Rebuild a group from its persisted form, attaching every tab to
    /// `configuration`. An out-of-range selection is clamped.
    pub fn from_record(record: TabGroupRecord, configuration: &ConfigurationHandle) -> Self {
        let tabs: Vec<Tab> = record
            .tabs
            .into_iter()
            .map(|tab| Tab::from_record(tab, configuration.clone()))
            .collect();

        let selected = tabs
            .len()
            .checked_sub(1)
            .map(|last| record.selected_index.clamp(0, last as i64) as usize);

        Self {
            name: record.name,
            color: record.color.unwrap_or(Color::MINT),
            icon: record.icon,
            tabs,
            selected,
            previous: None,
        }
    }
}
