use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::{ObserverId, UserId};

/// Email/password pair sent to the authentication backend.
///
/// The password only leaves the core inside this struct; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: &SecretString) -> Self {
        Self {
            email: email.into(),
            password: password.expose_secret().clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FederatedProvider {
    Google,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum AuthOperation {
    SignInWithPassword(Credentials),
    CreateAccount(Credentials),
    SignOut,
    SignInWithProvider { provider: FederatedProvider },
    /// Long-lived: the shell answers once with the current session and again
    /// on every sign-in/sign-out until `StopObserving` arrives.
    ObserveSession { observer: ObserverId },
    StopObserving { observer: ObserverId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AuthOutput {
    User(AuthUser),
    SignedOut,
    SessionChanged(Option<AuthUser>),
}

impl AuthOutput {
    /// Extracts the signed-in user, turning any other output into an error
    /// that classifies as [`AuthErrorKind::Other`].
    pub fn into_user(self) -> Result<AuthUser, AuthError> {
        match self {
            Self::User(user) => Ok(user),
            other => Err(AuthError::new(
                "core/unexpected-output",
                format!("expected a user, got {other:?}"),
            )),
        }
    }
}

/// Raw backend failure. `code` is the backend's own error code string
/// (e.g. `auth/user-not-found`); classification happens in the core.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct AuthError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl AuthError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> AuthErrorKind {
        AuthErrorKind::classify(&self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    UserNotFound,
    WrongCredential,
    InvalidEmail,
    EmailInUse,
    WeakPassword,
    Other,
}

impl AuthErrorKind {
    #[must_use]
    pub fn classify(code: &str) -> Self {
        match code {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/invalid-login-credentials" | "auth/wrong-password" | "auth/invalid-credential" => {
                Self::WrongCredential
            }
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/email-already-in-use" => Self::EmailInUse,
            "auth/weak-password" => Self::WeakPassword,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UserNotFound => "AUTH_USER_NOT_FOUND",
            Self::WrongCredential => "AUTH_WRONG_CREDENTIAL",
            Self::InvalidEmail => "AUTH_INVALID_EMAIL",
            Self::EmailInUse => "AUTH_EMAIL_IN_USE",
            Self::WeakPassword => "AUTH_WEAK_PASSWORD",
            Self::Other => "AUTH_ERROR",
        }
    }
}

pub type AuthResult = Result<AuthOutput, AuthError>;

impl Operation for AuthOperation {
    type Output = AuthResult;
}

pub struct Auth<E> {
    context: CapabilityContext<AuthOperation, E>,
}

impl<Ev> Capability<Ev> for Auth<Ev> {
    type Operation = AuthOperation;
    type MappedSelf<MappedEv> = Auth<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Auth::new(self.context.map_event(f))
    }
}

impl<E> Auth<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<AuthOperation, E>) -> Self {
        Self { context }
    }

    pub fn sign_in<F>(&self, credentials: Credentials, make_event: F)
    where
        F: FnOnce(AuthResult) -> E + Send + 'static,
    {
        self.request(AuthOperation::SignInWithPassword(credentials), make_event);
    }

    pub fn create_account<F>(&self, credentials: Credentials, make_event: F)
    where
        F: FnOnce(AuthResult) -> E + Send + 'static,
    {
        self.request(AuthOperation::CreateAccount(credentials), make_event);
    }

    pub fn sign_out<F>(&self, make_event: F)
    where
        F: FnOnce(AuthResult) -> E + Send + 'static,
    {
        self.request(AuthOperation::SignOut, make_event);
    }

    pub fn sign_in_with_provider<F>(&self, provider: FederatedProvider, make_event: F)
    where
        F: FnOnce(AuthResult) -> E + Send + 'static,
    {
        self.request(AuthOperation::SignInWithProvider { provider }, make_event);
    }

    /// Subscribes to session changes. `make_event` runs once per emission.
    pub fn observe_session<F>(&self, observer: ObserverId, make_event: F)
    where
        F: Fn(AuthResult) -> E + Send + Sync + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let mut stream = ctx.stream_from_shell(AuthOperation::ObserveSession { observer });
            while let Some(result) = stream.next().await {
                ctx.update_app(make_event(result));
            }
        });
    }

    pub fn stop_observing(&self, observer: ObserverId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(AuthOperation::StopObserving { observer }).await;
        });
    }

    fn request<F>(&self, operation: AuthOperation, make_event: F)
    where
        F: FnOnce(AuthResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(result));
        });
    }
}
