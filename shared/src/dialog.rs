//! Alert and confirm dialogs.
//!
//! [`DialogManager`] holds at most one live dialog per [`DialogKind`]. Every
//! `show_*` call reuses the slot and hands out a fresh [`DialogInstanceId`];
//! input carrying an older id is dropped. Each show arms a one-shot overlay
//! cleanup that runs when the shell reports the dialog as hidden.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::Page;
use crate::messages::{Locale, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogKind {
    Alert,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogInstanceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ButtonStyle {
    Primary,
    #[default]
    Secondary,
    Danger,
}

impl ButtonStyle {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary px-4",
            Self::Secondary => "btn btn-secondary px-4",
            Self::Danger => "btn btn-danger px-4",
        }
    }
}

/// What a pressed alert button does after closing the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    Dismiss,
    Navigate(Page),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogButton {
    pub label: String,
    pub style: ButtonStyle,
    pub action: DialogAction,
}

impl DialogButton {
    pub fn new(label: impl Into<String>, style: ButtonStyle, action: DialogAction) -> Self {
        Self {
            label: label.into(),
            style,
            action,
        }
    }

    pub fn navigate(label: impl Into<String>, page: Page) -> Self {
        Self::new(label, ButtonStyle::Secondary, DialogAction::Navigate(page))
    }

    #[must_use]
    pub fn close(locale: Locale) -> Self {
        Self::new(
            Message::Close.text(locale),
            ButtonStyle::Secondary,
            DialogAction::Dismiss,
        )
    }
}

/// Work run when a confirm dialog is answered "yes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmIntent {
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDialog {
    pub id: DialogInstanceId,
    pub title: String,
    pub message: String,
    pub buttons: Vec<DialogButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmDialog {
    pub id: DialogInstanceId,
    pub title: String,
    pub message: String,
    pub intent: ConfirmIntent,
    pub no: DialogButton,
    pub yes: DialogButton,
}

/// Page-body state left behind by modal overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverlayState {
    pub backdrops: u32,
    pub body_modal_open: bool,
    pub body_scroll_locked: bool,
}

impl OverlayState {
    fn push(&mut self) {
        self.backdrops = self.backdrops.saturating_add(1);
        self.body_modal_open = true;
        self.body_scroll_locked = true;
    }

    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.backdrops == 0 && !self.body_modal_open && !self.body_scroll_locked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DialogSlot<T> {
    current: Option<T>,
    visible: bool,
    cleanup_armed: bool,
}

impl<T> Default for DialogSlot<T> {
    fn default() -> Self {
        Self {
            current: None,
            visible: false,
            cleanup_armed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogManager {
    next_id: u64,
    alert: DialogSlot<AlertDialog>,
    confirm: DialogSlot<ConfirmDialog>,
    overlay: OverlayState,
}

impl DialogManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> DialogInstanceId {
        self.next_id = self.next_id.wrapping_add(1);
        DialogInstanceId(self.next_id)
    }

    /// Opens the alert dialog. With no buttons a single "close" button is used.
    pub fn show_alert(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        buttons: Vec<DialogButton>,
        locale: Locale,
    ) -> DialogInstanceId {
        let id = self.allocate_id();
        let buttons = if buttons.is_empty() {
            vec![DialogButton::close(locale)]
        } else {
            buttons
        };
        self.alert.current = Some(AlertDialog {
            id,
            title: title.into(),
            message: message.into(),
            buttons,
        });
        if !self.alert.visible {
            self.overlay.push();
        }
        self.alert.visible = true;
        self.alert.cleanup_armed = true;
        debug!(dialog = id.0, "alert dialog shown");
        id
    }

    pub fn show_confirm(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        intent: ConfirmIntent,
        locale: Locale,
    ) -> DialogInstanceId {
        let id = self.allocate_id();
        self.confirm.current = Some(ConfirmDialog {
            id,
            title: title.into(),
            message: message.into(),
            intent,
            no: DialogButton::new(Message::No.text(locale), ButtonStyle::Secondary, DialogAction::Dismiss),
            yes: DialogButton::new(Message::Yes.text(locale), ButtonStyle::Danger, DialogAction::Dismiss),
        });
        if !self.confirm.visible {
            self.overlay.push();
        }
        self.confirm.visible = true;
        self.confirm.cleanup_armed = true;
        debug!(dialog = id.0, ?intent, "confirm dialog shown");
        id
    }

    /// Closes the alert and returns the pressed button's action.
    pub fn press_alert_button(&mut self, id: DialogInstanceId, index: usize) -> Option<DialogAction> {
        if !self.is_live(DialogKind::Alert, id) {
            debug!(dialog = id.0, "ignoring press on stale alert");
            return None;
        }
        let action = self
            .alert
            .current
            .as_ref()
            .and_then(|dialog| dialog.buttons.get(index))
            .map(|button| button.action)?;
        self.alert.visible = false;
        Some(action)
    }

    /// Closes the confirm dialog; only an affirmative answer yields its intent.
    pub fn answer_confirm(&mut self, id: DialogInstanceId, affirmative: bool) -> Option<ConfirmIntent> {
        if !self.is_live(DialogKind::Confirm, id) {
            debug!(dialog = id.0, "ignoring answer on stale confirm");
            return None;
        }
        self.confirm.visible = false;
        if affirmative {
            self.confirm.current.as_ref().map(|dialog| dialog.intent)
        } else {
            None
        }
    }

    /// Escape key, backdrop click or the header close button.
    pub fn dismiss(&mut self, kind: DialogKind, id: DialogInstanceId) -> bool {
        if !self.is_live(kind, id) {
            return false;
        }
        match kind {
            DialogKind::Alert => self.alert.visible = false,
            DialogKind::Confirm => self.confirm.visible = false,
        }
        true
    }

    /// The shell finished the hide transition. Runs the armed cleanup once.
    pub fn hidden(&mut self, kind: DialogKind, id: DialogInstanceId) -> bool {
        if self.current_id(kind) != Some(id) {
            debug!(dialog = id.0, ?kind, "ignoring hidden for superseded dialog");
            return false;
        }
        let (armed, other_visible) = match kind {
            DialogKind::Alert => {
                self.alert.visible = false;
                (
                    std::mem::take(&mut self.alert.cleanup_armed),
                    self.confirm.visible,
                )
            }
            DialogKind::Confirm => {
                self.confirm.visible = false;
                (
                    std::mem::take(&mut self.confirm.cleanup_armed),
                    self.alert.visible,
                )
            }
        };
        if !armed {
            return false;
        }
        self.overlay = OverlayState::default();
        if other_visible {
            self.overlay.push();
        }
        debug!(dialog = id.0, ?kind, "overlay cleaned up");
        true
    }

    fn current_id(&self, kind: DialogKind) -> Option<DialogInstanceId> {
        match kind {
            DialogKind::Alert => self.alert.current.as_ref().map(|d| d.id),
            DialogKind::Confirm => self.confirm.current.as_ref().map(|d| d.id),
        }
    }

    fn is_live(&self, kind: DialogKind, id: DialogInstanceId) -> bool {
        let visible = match kind {
            DialogKind::Alert => self.alert.visible,
            DialogKind::Confirm => self.confirm.visible,
        };
        visible && self.current_id(kind) == Some(id)
    }

    #[must_use]
    pub fn visible_alert(&self) -> Option<&AlertDialog> {
        self.alert.current.as_ref().filter(|_| self.alert.visible)
    }

    #[must_use]
    pub fn visible_confirm(&self) -> Option<&ConfirmDialog> {
        self.confirm.current.as_ref().filter(|_| self.confirm.visible)
    }

    #[must_use]
    pub const fn overlay(&self) -> OverlayState {
        self.overlay
    }
}
