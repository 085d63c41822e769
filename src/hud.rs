//! HUD and UI panel model
//!
//! The session only flips these flags; drawing them is the host's job.

use serde::{Deserialize, Serialize};

use crate::host::ObjectRef;

/// A tracked on-screen indicator for a spawned actor or item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub object: ObjectRef,
    /// Character type for actors, `pickup` for items
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HudState {
    pub hud_visible: bool,
    pub main_ui_visible: bool,
    pub pause_menu_visible: bool,
    pub dialog_background_visible: bool,
    pub edit_button_visible: bool,
    pub game_canvas_visible: bool,
    pub static_overlay_visible: bool,
    pub results_visible: bool,
    /// Active content dialog: (title, description)
    pub dialog: Option<(String, String)>,
    pub indicators: Vec<Indicator>,
}

impl HudState {
    pub fn new() -> Self {
        Self {
            main_ui_visible: true,
            ..Self::default()
        }
    }

    pub fn show_hud(&mut self) {
        self.hud_visible = true;
    }

    pub fn hide_hud(&mut self) {
        self.hud_visible = false;
    }

    pub fn show_ui(&mut self) {
        self.main_ui_visible = true;
    }

    pub fn hide_ui(&mut self) {
        self.main_ui_visible = false;
    }

    pub fn show_pause(&mut self) {
        self.pause_menu_visible = true;
        self.dialog_background_visible = true;
    }

    /// Hide every modal: pause menu, dialog background and content dialog
    pub fn hide_dialogs(&mut self) {
        self.pause_menu_visible = false;
        self.dialog_background_visible = false;
        self.dialog = None;
    }

    pub fn show_dialog(&mut self, title: &str, description: &str) {
        self.dialog_background_visible = true;
        self.dialog = Some((title.to_string(), description.to_string()));
    }

    pub fn add_indicator(&mut self, object: ObjectRef, kind: &str) {
        self.indicators.push(Indicator {
            object,
            kind: kind.to_string(),
        });
    }

    pub fn clear_indicators(&mut self) {
        self.indicators.clear();
    }

    /// Back to the main menu look
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
