use serde::{Deserialize, Serialize};

use crate::capabilities::Page;
use crate::dialog::{AlertDialog, ConfirmDialog, DialogButton, DialogInstanceId, OverlayState};
use crate::messages::{Locale, Message};
use crate::model::Model;
use crate::session::{
    FederatedOutcome, PageAccess, ProfileOutcome, RegisterOutcome, Session, SignInOutcome,
};
use crate::sos::{EmergencyPointer, SosFlow};

pub const SOS_ICON: &str = "RECURSOS/emergencia.png";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum AccessView {
    Public,
    Checking,
    Granted,
    Redirecting,
}

impl From<&PageAccess> for AccessView {
    fn from(access: &PageAccess) -> Self {
        match access {
            PageAccess::NotRequired => Self::Public,
            PageAccess::Pending => Self::Checking,
            PageAccess::Granted(_) => Self::Granted,
            PageAccess::Redirected => Self::Redirecting,
        }
    }
}

/// Markup state of the SOS control.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SosButtonView {
    pub disabled: bool,
    /// Spinner shown instead of the icon.
    pub busy: bool,
    pub label: String,
    pub icon: Option<String>,
    pub icon_alt: Option<String>,
    pub location_text: Option<String>,
}

impl SosButtonView {
    fn new(flow: &SosFlow, locale: Locale) -> Self {
        let location_text = flow.location_text().map(String::from);
        if flow.control_disabled() {
            Self {
                disabled: true,
                busy: true,
                label: Message::Locating.text(locale).into(),
                icon: None,
                icon_alt: Some(Message::Loading.text(locale).into()),
                location_text,
            }
        } else {
            Self {
                disabled: false,
                busy: false,
                label: Message::SosLabel.text(locale).into(),
                icon: Some(SOS_ICON.into()),
                icon_alt: Some(Message::SosIconAlt.text(locale).into()),
                location_text,
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub class: String,
}

impl From<&DialogButton> for ButtonView {
    fn from(button: &DialogButton) -> Self {
        Self {
            label: button.label.clone(),
            class: button.style.css_class().into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AlertDialogView {
    pub id: DialogInstanceId,
    pub title: String,
    pub message: String,
    pub buttons: Vec<ButtonView>,
}

impl From<&AlertDialog> for AlertDialogView {
    fn from(dialog: &AlertDialog) -> Self {
        Self {
            id: dialog.id,
            title: dialog.title.clone(),
            message: dialog.message.clone(),
            buttons: dialog.buttons.iter().map(ButtonView::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfirmDialogView {
    pub id: DialogInstanceId,
    pub title: String,
    pub message: String,
    pub no: ButtonView,
    pub yes: ButtonView,
}

impl From<&ConfirmDialog> for ConfirmDialogView {
    fn from(dialog: &ConfirmDialog) -> Self {
        Self {
            id: dialog.id,
            title: dialog.title.clone(),
            message: dialog.message.clone(),
            no: ButtonView::from(&dialog.no),
            yes: ButtonView::from(&dialog.yes),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub page: Page,
    pub access: AccessView,
    pub session_known: bool,
    pub session: Option<Session>,
    pub is_busy: bool,
    pub sign_in: Option<SignInOutcome>,
    pub registration: Option<RegisterOutcome>,
    pub federated: Option<FederatedOutcome>,
    pub profile_completion: Option<ProfileOutcome>,
    pub sos: SosButtonView,
    pub active_emergency: Option<EmergencyPointer>,
    pub alert: Option<AlertDialogView>,
    pub confirm: Option<ConfirmDialogView>,
    pub overlay: OverlayState,
    pub error_message: Option<String>,
    pub view_timestamp_ms: u64,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let locale = model.locale();
        Self {
            page: model.page,
            access: AccessView::from(&model.access),
            session_known: model.session.is_known(),
            session: model.session.session().cloned(),
            is_busy: model.is_busy,
            sign_in: model.sign_in.clone(),
            registration: model.registration.clone(),
            federated: model.federated.clone(),
            profile_completion: model.profile_completion.clone(),
            sos: SosButtonView::new(&model.sos, locale),
            active_emergency: model.active_emergency.clone(),
            alert: model.dialogs.visible_alert().map(AlertDialogView::from),
            confirm: model.dialogs.visible_confirm().map(ConfirmDialogView::from),
            overlay: model.dialogs.overlay(),
            error_message: model
                .last_error
                .as_ref()
                .map(|e| e.user_facing_message(locale).to_string()),
            view_timestamp_ms: model.view_timestamp_ms,
        }
    }
}
