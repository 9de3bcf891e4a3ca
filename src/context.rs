//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Edit mode exposes delete actions and checked-off items - read
    pub edit_mode: ReadSignal<bool>,
    set_edit_mode: WriteSignal<bool>,
    /// Active list id - read
    pub list_id: ReadSignal<String>,
}

impl AppContext {
    pub fn new(
        edit_mode: (ReadSignal<bool>, WriteSignal<bool>),
        list_id: ReadSignal<String>,
    ) -> Self {
        Self {
            edit_mode: edit_mode.0,
            set_edit_mode: edit_mode.1,
            list_id,
        }
    }

    /// Flip edit mode
    pub fn toggle_edit_mode(&self) {
        self.set_edit_mode.update(|on| *on = !*on);
    }
}
