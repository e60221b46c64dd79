use crate::capabilities::Page;
use crate::config::AppConfig;
use crate::dialog::DialogManager;
use crate::messages::Locale;
use crate::session::{
    FederatedOutcome, PageAccess, PendingRegistration, ProfileOutcome, RegisterOutcome,
    SessionState, SignInOutcome,
};
use crate::sos::{EmergencyPointer, SosFlow};
use crate::{get_current_time_ms, AppError, ObserverId};

#[derive(Debug)]
pub struct Model {
    pub config: AppConfig,
    pub page: Page,
    pub access: PageAccess,

    /// Only ever written from the session stream.
    pub session: SessionState,
    pub session_observer: Option<ObserverId>,

    pub sign_in: Option<SignInOutcome>,
    pub pending_registration: Option<PendingRegistration>,
    pub registration: Option<RegisterOutcome>,
    pub federated: Option<FederatedOutcome>,
    pub profile_completion: Option<ProfileOutcome>,
    /// An auth or profile request is outstanding.
    pub is_busy: bool,

    pub sos: SosFlow,
    pub active_emergency: Option<EmergencyPointer>,

    pub dialogs: DialogManager,
    pub last_error: Option<AppError>,
    pub view_timestamp_ms: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            page: Page::default(),
            access: PageAccess::default(),
            session: SessionState::Unknown,
            session_observer: None,
            sign_in: None,
            pending_registration: None,
            registration: None,
            federated: None,
            profile_completion: None,
            is_busy: false,
            sos: SosFlow::new(),
            active_emergency: None,
            dialogs: DialogManager::new(),
            last_error: None,
            view_timestamp_ms: get_current_time_ms(),
        }
    }
}

impl Model {
    pub fn update_timestamp(&mut self) {
        self.view_timestamp_ms = get_current_time_ms();
    }

    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.config.locale
    }

    pub fn set_error(&mut self, error: AppError) {
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Drops per-page state when a new page is loaded. Session and
    /// configuration survive.
    pub fn enter_page(&mut self, page: Page) {
        self.page = page;
        self.access = PageAccess::NotRequired;
        self.sign_in = None;
        self.pending_registration = None;
        self.registration = None;
        self.federated = None;
        self.profile_completion = None;
        self.is_busy = false;
        self.sos = SosFlow::new();
        self.active_emergency = None;
        self.dialogs = DialogManager::new();
        self.clear_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::{ErrorKind, UserId};

    #[test]
    fn test_default_model() {
        let model = Model::default();
        assert_eq!(model.session, SessionState::Unknown);
        assert_eq!(model.page, Page::Home);
        assert_eq!(model.locale(), Locale::Es);
        assert!(!model.sos.control_disabled());
        assert!(model.view_timestamp_ms > 0);
    }

    #[test]
    fn test_enter_page_keeps_session() {
        let mut model = Model::default();
        model.session = SessionState::SignedIn(Session {
            uid: UserId::new("u1"),
            email: None,
            display_name: None,
        });
        model.is_busy = true;
        model.set_error(AppError::new(ErrorKind::Internal, "x"));

        model.enter_page(Page::Emergency);
        assert_eq!(model.page, Page::Emergency);
        assert!(model.session.session().is_some());
        assert!(!model.is_busy);
        assert!(model.last_error.is_none());
    }
}
