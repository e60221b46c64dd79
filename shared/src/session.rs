use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use crate::capabilities::{AuthErrorKind, AuthUser, Page};
use crate::config::MIN_PASSWORD_CHARS;
use crate::messages::{self, Locale, Message};
use crate::{ErrorKind, UnixTimeMs, UserId};

/// Authenticated identity, passed explicitly to every operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<AuthUser> for Session {
    fn from(user: AuthUser) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// Last value seen on the session stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// No emission received yet.
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<Option<AuthUser>> for SessionState {
    fn from(user: Option<AuthUser>) -> Self {
        user.map_or(Self::SignedOut, |u| Self::SignedIn(u.into()))
    }
}

// --- Profile documents ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileFields {
    pub primer_nombre: String,
    pub segundo_nombre: String,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub celular: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolunteerStatus {
    #[serde(rename = "no_disponible")]
    Unavailable,
    #[serde(rename = "no_aplicable")]
    NotApplicable,
}

impl VolunteerStatus {
    #[must_use]
    pub const fn for_volunteer(is_volunteer: bool) -> Self {
        if is_volunteer {
            Self::Unavailable
        } else {
            Self::NotApplicable
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "no_disponible",
            Self::NotApplicable => "no_aplicable",
        }
    }
}

/// Document stored at `usuarios/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub es_voluntario: bool,
    pub estado_voluntario: VolunteerStatus,
    /// Client clock, ms since epoch.
    pub fecha_registro: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registro_con_google: Option<bool>,
}

#[must_use]
pub fn build_profile(
    email: impl Into<String>,
    fields: ProfileFields,
    is_volunteer: bool,
    now: UnixTimeMs,
    federated: bool,
) -> UserProfile {
    UserProfile {
        email: email.into(),
        fields,
        es_voluntario: is_volunteer,
        estado_voluntario: VolunteerStatus::for_volunteer(is_volunteer),
        fecha_registro: now.as_millis(),
        registro_con_google: federated.then_some(true),
    }
}

/// Stored field counts as set: anything but absent, null, `false`, `0`,
/// `NaN` or `""`.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Fields to merge into a returning federated user's profile, if any.
///
/// A set `estadoVoluntario` is never touched, whatever its type.
#[instrument(level = "debug", skip(existing))]
#[must_use]
pub fn volunteer_backfill(existing: &Value) -> Option<Value> {
    if is_truthy(existing.get("estadoVoluntario")) {
        return None;
    }
    let is_volunteer = is_truthy(existing.get("esVoluntario"));
    Some(json!({
        "estadoVoluntario": VolunteerStatus::for_volunteer(is_volunteer).as_str()
    }))
}

// --- Local input checks ---

pub fn check_password(password: &SecretString) -> Result<(), AuthErrorKind> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
        Err(AuthErrorKind::WeakPassword)
    } else {
        Ok(())
    }
}

pub fn check_email(email: &str) -> Result<(), AuthErrorKind> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthErrorKind::InvalidEmail),
    }
}

// --- Forms ---

#[derive(Debug)]
pub struct RegistrationForm {
    pub email: String,
    pub password: SecretString,
    pub fields: ProfileFields,
    pub is_volunteer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompletionForm {
    pub uid: UserId,
    pub email: String,
    pub fields: ProfileFields,
    pub is_volunteer: bool,
}

/// Registration data held while the account is being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub email: String,
    pub fields: ProfileFields,
    pub is_volunteer: bool,
}

// --- Outcomes ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignInOutcome {
    pub success: bool,
    pub user: Option<Session>,
    pub message: Option<String>,
    pub user_not_found: bool,
    /// `Some(false)` when the credential pair was rejected; unset for a
    /// malformed email or on success.
    pub credential: Option<bool>,
    pub error: Option<ErrorKind>,
}

impl SignInOutcome {
    #[must_use]
    pub fn succeeded(session: Session) -> Self {
        Self {
            success: true,
            user: Some(session),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(kind: AuthErrorKind, locale: Locale) -> Self {
        Self {
            success: false,
            user: None,
            message: Some(messages::sign_in_failure(kind).text(locale).to_string()),
            user_not_found: kind == AuthErrorKind::UserNotFound,
            credential: (kind != AuthErrorKind::InvalidEmail).then_some(false),
            error: Some(ErrorKind::Auth(kind)),
        }
    }

    /// Rejected because another request is still outstanding.
    #[must_use]
    pub fn busy(locale: Locale) -> Self {
        Self {
            message: Some(Message::RequestInProgress.text(locale).to_string()),
            error: Some(ErrorKind::Busy),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegisterOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub email_in_use: bool,
    pub error: Option<ErrorKind>,
}

impl RegisterOutcome {
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(kind: AuthErrorKind, locale: Locale) -> Self {
        Self {
            success: false,
            message: Some(messages::register_failure(kind).text(locale).to_string()),
            email_in_use: kind == AuthErrorKind::EmailInUse,
            error: Some(ErrorKind::Auth(kind)),
        }
    }

    /// Account created but the profile document could not be written.
    #[must_use]
    pub fn profile_failed(kind: ErrorKind, locale: Locale) -> Self {
        Self {
            success: false,
            message: Some(Message::ProfileSaveFailed.text(locale).to_string()),
            email_in_use: false,
            error: Some(kind),
        }
    }

    #[must_use]
    pub fn busy(locale: Locale) -> Self {
        Self {
            message: Some(Message::RequestInProgress.text(locale).to_string()),
            error: Some(ErrorKind::Busy),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FederatedOutcome {
    /// No profile yet; the caller should collect profile fields.
    NewUser {
        uid: UserId,
        email: Option<String>,
        display_name: String,
    },
    ReturningUser,
    Failed {
        message: String,
        error: ErrorKind,
    },
}

impl FederatedOutcome {
    #[must_use]
    pub fn failed(error: ErrorKind, locale: Locale) -> Self {
        Self::Failed {
            message: Message::FederatedFailed.text(locale).to_string(),
            error,
        }
    }

    #[must_use]
    pub fn busy(locale: Locale) -> Self {
        Self::Failed {
            message: Message::RequestInProgress.text(locale).to_string(),
            error: ErrorKind::Busy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<ErrorKind>,
}

impl ProfileOutcome {
    #[must_use]
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(kind: ErrorKind, locale: Locale) -> Self {
        Self {
            success: false,
            message: Some(Message::ProfileSaveFailed.text(locale).to_string()),
            error: Some(kind),
        }
    }

    #[must_use]
    pub fn busy(locale: Locale) -> Self {
        Self {
            message: Some(Message::RequestInProgress.text(locale).to_string()),
            error: Some(ErrorKind::Busy),
            ..Self::default()
        }
    }
}

// --- Private page guard ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PageAccess {
    #[default]
    NotRequired,
    /// Private page open, waiting for the first session emission.
    Pending,
    Granted(Session),
    Redirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    NotRequired,
    Wait,
    Grant(Session),
    RedirectToLogin,
}

/// Decides what a page does with the current session state.
#[must_use]
pub fn guard_page(page: Page, state: &SessionState) -> GuardDecision {
    if !page.is_private() {
        return GuardDecision::NotRequired;
    }
    match state {
        SessionState::Unknown => GuardDecision::Wait,
        SessionState::SignedOut => GuardDecision::RedirectToLogin,
        SessionState::SignedIn(session) => GuardDecision::Grant(session.clone()),
    }
}

impl From<GuardDecision> for PageAccess {
    fn from(decision: GuardDecision) -> Self {
        match decision {
            GuardDecision::NotRequired => Self::NotRequired,
            GuardDecision::Wait => Self::Pending,
            GuardDecision::Grant(session) => Self::Granted(session),
            GuardDecision::RedirectToLogin => Self::Redirected,
        }
    }
}
