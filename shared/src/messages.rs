//! User-facing text.
//!
//! Every string the shell shows comes from [`Message`]. Backend error text is
//! never passed through; errors are mapped by kind in [`describe_error`].

use serde::{Deserialize, Serialize};

use crate::capabilities::{AuthErrorKind, LocationError, StoreErrorKind};
use crate::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Message {
    // Dialog chrome
    Close,
    Yes,
    No,
    ConfirmTitle,
    ConfirmBody,

    // SOS control
    SosLabel,
    SosIconAlt,
    Locating,
    Loading,

    // SOS dialogs
    SessionRequiredTitle,
    SessionRequiredBody,
    GoToLogin,
    ReportedTitle,
    ReportedBody,
    Continue,
    ErrorTitle,
    AlertWriteFailed,
    LocationErrorTitle,
    LocationFailed,

    // Session gateway
    SignOutTitle,
    SignOutBody,
    UserNotFound,
    WrongCredential,
    InvalidEmailShort,
    InvalidEmail,
    EmailInUse,
    WeakPassword,
    AuthFailed,
    FederatedFailed,
    ProfileSaveFailed,

    // Generic
    StoreUnavailable,
    PermissionDenied,
    LocalStorageFailed,
    InvalidInput,
    RequestInProgress,
    Unexpected,
}

impl Message {
    #[must_use]
    pub const fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Es => self.es(),
            Locale::En => self.en(),
        }
    }

    const fn es(self) -> &'static str {
        match self {
            Self::Close => "Cerrar",
            Self::Yes => "Sí",
            Self::No => "No",
            Self::ConfirmTitle => "Confirmar",
            Self::ConfirmBody => "¿Estás seguro?",
            Self::SosLabel => "SOS",
            Self::SosIconAlt => "Emergencia",
            Self::Locating => "Localizando...",
            Self::Loading => "Cargando...",
            Self::SessionRequiredTitle => "Sesión requerida",
            Self::SessionRequiredBody => "Debes iniciar sesión para activar una emergencia",
            Self::GoToLogin => "Ir a login",
            Self::ReportedTitle => "Emergencia Reportada",
            Self::ReportedBody => {
                "Tu ubicación ha sido enviada a los voluntarios cercanos. \
                 Mantén la calma y sigue las instrucciones del equipo de emergencia."
            }
            Self::Continue => "Continuar",
            Self::ErrorTitle => "Error",
            Self::AlertWriteFailed => "Error al enviar la alerta. Por favor, inténtalo de nuevo.",
            Self::LocationErrorTitle => "Error de ubicación",
            Self::LocationFailed => {
                "No se pudo obtener tu ubicación. Activa el GPS y permite el acceso."
            }
            Self::SignOutTitle => "Cerrar sesión",
            Self::SignOutBody => "¿Seguro que quieres cerrar sesión?",
            Self::UserNotFound => "Usuario no encontrado",
            Self::WrongCredential => "Contraseña incorrecta o usuario no existe",
            Self::InvalidEmailShort => "Email inválido",
            Self::InvalidEmail => "Correo electrónico inválido",
            Self::EmailInUse => "Este correo electrónico ya está registrado",
            Self::WeakPassword => "La contraseña es muy débil (mínimo 6 caracteres)",
            Self::AuthFailed => "No se pudo completar la autenticación. Inténtalo de nuevo.",
            Self::FederatedFailed => "No se pudo iniciar sesión con Google. Inténtalo de nuevo.",
            Self::ProfileSaveFailed => "No se pudo guardar tu perfil. Inténtalo de nuevo.",
            Self::StoreUnavailable => "El servicio no está disponible. Inténtalo más tarde.",
            Self::PermissionDenied => "No tienes permiso para realizar esta acción.",
            Self::LocalStorageFailed => "No se pudo guardar la información en este dispositivo.",
            Self::InvalidInput => "Los datos ingresados no son válidos.",
            Self::RequestInProgress => "Ya hay una solicitud en curso. Espera un momento.",
            Self::Unexpected => "Ocurrió un error inesperado.",
        }
    }

    const fn en(self) -> &'static str {
        match self {
            Self::Close => "Close",
            Self::Yes => "Yes",
            Self::No => "No",
            Self::ConfirmTitle => "Confirm",
            Self::ConfirmBody => "Are you sure?",
            Self::SosLabel => "SOS",
            Self::SosIconAlt => "Emergency",
            Self::Locating => "Locating...",
            Self::Loading => "Loading...",
            Self::SessionRequiredTitle => "Sign-in required",
            Self::SessionRequiredBody => "You must sign in to raise an emergency",
            Self::GoToLogin => "Go to login",
            Self::ReportedTitle => "Emergency Reported",
            Self::ReportedBody => {
                "Your location has been sent to nearby volunteers. \
                 Stay calm and follow the emergency team's instructions."
            }
            Self::Continue => "Continue",
            Self::ErrorTitle => "Error",
            Self::AlertWriteFailed => "Could not send the alert. Please try again.",
            Self::LocationErrorTitle => "Location error",
            Self::LocationFailed => {
                "Could not get your location. Turn on GPS and allow access."
            }
            Self::SignOutTitle => "Sign out",
            Self::SignOutBody => "Do you really want to sign out?",
            Self::UserNotFound => "User not found",
            Self::WrongCredential => "Wrong password or user does not exist",
            Self::InvalidEmailShort | Self::InvalidEmail => "Invalid email address",
            Self::EmailInUse => "This email address is already registered",
            Self::WeakPassword => "The password is too weak (at least 6 characters)",
            Self::AuthFailed => "Authentication failed. Please try again.",
            Self::FederatedFailed => "Google sign-in failed. Please try again.",
            Self::ProfileSaveFailed => "Could not save your profile. Please try again.",
            Self::StoreUnavailable => "The service is unavailable. Try again later.",
            Self::PermissionDenied => "You are not allowed to do that.",
            Self::LocalStorageFailed => "Could not save data on this device.",
            Self::InvalidInput => "The data entered is not valid.",
            Self::RequestInProgress => "Another request is in progress. Please wait.",
            Self::Unexpected => "An unexpected error occurred.",
        }
    }
}

/// Message for a failed email/password sign-in.
#[must_use]
pub const fn sign_in_failure(kind: AuthErrorKind) -> Message {
    match kind {
        AuthErrorKind::UserNotFound => Message::UserNotFound,
        AuthErrorKind::WrongCredential => Message::WrongCredential,
        AuthErrorKind::InvalidEmail => Message::InvalidEmailShort,
        AuthErrorKind::EmailInUse | AuthErrorKind::WeakPassword | AuthErrorKind::Other => {
            Message::AuthFailed
        }
    }
}

/// Message for a failed account creation.
#[must_use]
pub const fn register_failure(kind: AuthErrorKind) -> Message {
    match kind {
        AuthErrorKind::EmailInUse => Message::EmailInUse,
        AuthErrorKind::WeakPassword => Message::WeakPassword,
        AuthErrorKind::InvalidEmail => Message::InvalidEmail,
        AuthErrorKind::UserNotFound | AuthErrorKind::WrongCredential | AuthErrorKind::Other => {
            Message::AuthFailed
        }
    }
}

#[must_use]
pub const fn message_for(kind: ErrorKind) -> Message {
    match kind {
        ErrorKind::Auth(auth) => register_or_sign_in(auth),
        ErrorKind::Store(StoreErrorKind::WriteFailed) => Message::AlertWriteFailed,
        ErrorKind::Store(StoreErrorKind::PermissionDenied) => Message::PermissionDenied,
        ErrorKind::Store(
            StoreErrorKind::Unavailable | StoreErrorKind::ReadFailed | StoreErrorKind::InvalidPath,
        ) => Message::StoreUnavailable,
        ErrorKind::Location(
            LocationError::PermissionDenied | LocationError::Timeout | LocationError::PositionUnavailable,
        ) => Message::LocationFailed,
        ErrorKind::LocalStorage => Message::LocalStorageFailed,
        ErrorKind::Validation => Message::InvalidInput,
        ErrorKind::Busy => Message::RequestInProgress,
        ErrorKind::Serialization | ErrorKind::InvalidState | ErrorKind::Internal => {
            Message::Unexpected
        }
    }
}

const fn register_or_sign_in(kind: AuthErrorKind) -> Message {
    match kind {
        AuthErrorKind::UserNotFound | AuthErrorKind::WrongCredential => sign_in_failure(kind),
        _ => register_failure(kind),
    }
}

#[must_use]
pub const fn describe_error(kind: ErrorKind, locale: Locale) -> &'static str {
    message_for(kind).text(locale)
}

#[must_use]
pub fn location_sent(lat: f64, lon: f64, locale: Locale) -> String {
    match locale {
        Locale::Es => format!("Ubicación enviada: Lat {lat:.6}, Lng {lon:.6}"),
        Locale::En => format!("Location sent: Lat {lat:.6}, Lng {lon:.6}"),
    }
}
