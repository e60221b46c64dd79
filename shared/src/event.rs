use secrecy::SecretString;

use crate::capabilities::{AuthResult, AuthUser, DocumentResult, GeolocationResult, KvResult, Page};
use crate::config::AppConfig;
use crate::dialog::{DialogInstanceId, DialogKind};
use crate::session::{ProfileCompletionForm, RegistrationForm};
use crate::ObserverId;

// --- Event enum: no None variant, large variants boxed ---
//
// Not `Clone` or `Serialize`: sign-in and registration carry the password as
// a `SecretString`, which is neither.

#[derive(Debug, Default)]
pub enum Event {
    #[default]
    Noop,

    // Lifecycle
    AppStarted,
    Configure(Box<AppConfig>),
    PageOpened {
        page: Page,
    },

    // Session stream
    SessionChanged {
        observer: ObserverId,
        result: Box<AuthResult>,
    },
    StopObservingSession,

    // Email / password
    SignInRequested {
        email: String,
        password: SecretString,
    },
    SignInResponse(Box<AuthResult>),
    RegisterRequested(Box<RegistrationForm>),
    AccountCreated(Box<AuthResult>),
    ProfileWritten(Box<DocumentResult>),

    // Federated
    FederatedSignInRequested,
    FederatedSignInResponse(Box<AuthResult>),
    FederatedProfileFetched {
        user: Box<AuthUser>,
        result: Box<DocumentResult>,
    },
    FederatedProfileBackfilled(Box<DocumentResult>),
    CompleteProfileRequested(Box<ProfileCompletionForm>),
    CompleteProfileResponse(Box<DocumentResult>),

    // Sign-out
    SignOutConfirmationRequested,
    SignOutRequested,
    SignOutResponse(Box<AuthResult>),

    // SOS
    SosPressed,
    PositionResolved(Box<GeolocationResult>),
    AlertWritten(Box<DocumentResult>),
    EmergencyPointerSaved(Box<KvResult>),
    EmergencyPointerRequested,
    EmergencyPointerLoaded(Box<KvResult>),

    // Dialogs
    AlertButtonPressed {
        dialog: DialogInstanceId,
        index: usize,
    },
    ConfirmAnswered {
        dialog: DialogInstanceId,
        affirmative: bool,
    },
    DialogDismissed {
        kind: DialogKind,
        dialog: DialogInstanceId,
    },
    DialogHidden {
        kind: DialogKind,
        dialog: DialogInstanceId,
    },

    /// The shell could not find a control the core expects on the page.
    ControlMissing {
        control: String,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::PageOpened { .. } => "page_opened",
            Self::SessionChanged { .. } => "session_changed",
            Self::StopObservingSession => "stop_observing_session",
            Self::SignInRequested { .. } => "sign_in_requested",
            Self::SignInResponse(_) => "sign_in_response",
            Self::RegisterRequested(_) => "register_requested",
            Self::AccountCreated(_) => "account_created",
            Self::ProfileWritten(_) => "profile_written",
            Self::FederatedSignInRequested => "federated_sign_in_requested",
            Self::FederatedSignInResponse(_) => "federated_sign_in_response",
            Self::FederatedProfileFetched { .. } => "federated_profile_fetched",
            Self::FederatedProfileBackfilled(_) => "federated_profile_backfilled",
            Self::CompleteProfileRequested(_) => "complete_profile_requested",
            Self::CompleteProfileResponse(_) => "complete_profile_response",
            Self::SignOutConfirmationRequested => "sign_out_confirmation_requested",
            Self::SignOutRequested => "sign_out_requested",
            Self::SignOutResponse(_) => "sign_out_response",
            Self::SosPressed => "sos_pressed",
            Self::PositionResolved(_) => "position_resolved",
            Self::AlertWritten(_) => "alert_written",
            Self::EmergencyPointerSaved(_) => "emergency_pointer_saved",
            Self::EmergencyPointerRequested => "emergency_pointer_requested",
            Self::EmergencyPointerLoaded(_) => "emergency_pointer_loaded",
            Self::AlertButtonPressed { .. } => "alert_button_pressed",
            Self::ConfirmAnswered { .. } => "confirm_answered",
            Self::DialogDismissed { .. } => "dialog_dismissed",
            Self::DialogHidden { .. } => "dialog_hidden",
            Self::ControlMissing { .. } => "control_missing",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::SignInRequested { .. }
                | Self::RegisterRequested(_)
                | Self::FederatedSignInRequested
                | Self::CompleteProfileRequested(_)
                | Self::SignOutConfirmationRequested
                | Self::SignOutRequested
                | Self::SosPressed
                | Self::AlertButtonPressed { .. }
                | Self::ConfirmAnswered { .. }
                | Self::DialogDismissed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_not_in_debug_output() {
        let event = Event::SignInRequested {
            email: "ana@example.com".into(),
            password: SecretString::new("hunter22".into()),
        };
        let debug = format!("{event:?}");
        assert!(debug.contains("ana@example.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_user_initiated() {
        assert!(Event::SosPressed.is_user_initiated());
        assert!(!Event::AlertWritten(Box::new(Err(crate::capabilities::DocumentError::new(
            crate::capabilities::StoreErrorKind::WriteFailed,
            "x",
        ))))
        .is_user_initiated());
        assert_eq!(Event::default().name(), "noop");
    }
}
