//! Popover registry owned by a calendar instance.
//!
//! Each registered popover gets a locally generated id. Visibility is
//! driven explicitly through `show`/`hide`/`toggle`; positioning stays with
//! the host.

use std::collections::BTreeMap;

use crate::attribute::PopoverVisibility;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopoverState {
    pub id: String,
    pub visibility: PopoverVisibility,
    pub is_interactive: bool,
    pub is_visible: bool,
    /// Id of the day cell the popover is anchored to while shown.
    pub target: Option<String>,
}

#[derive(Debug)]
pub struct PopoverRegistry {
    prefix: String,
    next_id: u64,
    popovers: BTreeMap<String, PopoverState>,
}

impl PopoverRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        PopoverRegistry {
            prefix: prefix.into(),
            next_id: 0,
            popovers: BTreeMap::new(),
        }
    }

    /// Register a popover and return its id.
    pub fn register(&mut self, visibility: PopoverVisibility, is_interactive: bool) -> String {
        self.next_id += 1;
        let id = format!("{}-popover-{}", self.prefix, self.next_id);
        self.popovers.insert(
            id.clone(),
            PopoverState {
                id: id.clone(),
                visibility,
                is_interactive,
                is_visible: false,
                target: None,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: &str) -> Option<PopoverState> {
        self.popovers.remove(id)
    }

    /// Show `id` anchored at `target`. Returns false for unknown ids.
    pub fn show(&mut self, id: &str, target: &str) -> bool {
        match self.popovers.get_mut(id) {
            Some(state) => {
                state.is_visible = true;
                state.target = Some(target.to_string());
                true
            }
            None => false,
        }
    }

    pub fn hide(&mut self, id: &str) -> bool {
        match self.popovers.get_mut(id) {
            Some(state) => {
                state.is_visible = false;
                state.target = None;
                true
            }
            None => false,
        }
    }

    /// Flip visibility; returns the new visibility.
    pub fn toggle(&mut self, id: &str, target: &str) -> bool {
        if self.is_visible(id) {
            self.hide(id);
            false
        } else {
            self.show(id, target)
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.popovers.get(id).map_or(false, |state| state.is_visible)
    }

    pub fn get(&self, id: &str) -> Option<&PopoverState> {
        self.popovers.get(id)
    }

    pub fn hide_all(&mut self) {
        for state in self.popovers.values_mut() {
            state.is_visible = false;
            state.target = None;
        }
    }

    pub fn len(&self) -> usize {
        self.popovers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popovers.is_empty()
    }
}
