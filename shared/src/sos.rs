//! SOS activation state machine.
//!
//! [`SosFlow`] is pure: each method takes the current input, updates the
//! phase and returns an [`SosStep`] telling the app which effect to request
//! next. The single-flight guard is `control_disabled`, set in the same
//! `update` call that accepts the press.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{GeolocationResult, LocationError};
use crate::config::ANONYMOUS_EMAIL;
use crate::messages::{self, Locale, Message};
use crate::session::{Session, SessionState};
use crate::{AlertId, Coordinate, ErrorKind, UnixTimeMs, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    #[serde(rename = "activa")]
    Active,
}

/// Document added to the alerts collection. The store fills `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub usuario_id: UserId,
    pub email: String,
    pub latitud: f64,
    pub longitud: f64,
    pub estado: AlertStatus,
}

impl AlertRecord {
    #[must_use]
    pub fn new(session: &Session, at: Coordinate) -> Self {
        let email = session
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(ANONYMOUS_EMAIL);
        Self {
            usuario_id: session.uid.clone(),
            email: email.to_string(),
            latitud: at.lat(),
            longitud: at.lon(),
            estado: AlertStatus::Active,
        }
    }
}

/// Device-local record of the last reported alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyPointer {
    pub lat: f64,
    pub lon: f64,
    /// Client clock, ms since epoch.
    pub timestamp: u64,
    pub alerta_id: AlertId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum SosPhase {
    #[default]
    Idle,
    /// Pressed before the first session emission arrived.
    AwaitingSession,
    AwaitingLocation {
        session: Session,
    },
    Submitting {
        session: Session,
        at: Coordinate,
    },
    Reported {
        alert_id: AlertId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosFailure {
    Location(LocationError),
    Write(ErrorKind),
}

impl SosFailure {
    /// Title and body of the error dialog.
    #[must_use]
    pub const fn dialog(self) -> (Message, Message) {
        match self {
            Self::Location(_) => (Message::LocationErrorTitle, Message::LocationFailed),
            Self::Write(_) => (Message::ErrorTitle, Message::AlertWriteFailed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SosStep {
    /// Nothing to do.
    Ignore,
    /// Wait for the session stream.
    Defer,
    /// No session: show the sign-in prompt.
    RequireLogin,
    RequestLocation,
    WriteAlert(AlertRecord),
    /// Alert stored; persist the pointer and show the success dialog.
    Reported(EmergencyPointer),
    Fail(SosFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SosFlow {
    phase: SosPhase,
    control_disabled: bool,
    location_text: Option<String>,
}

impl SosFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> &SosPhase {
        &self.phase
    }

    #[must_use]
    pub const fn control_disabled(&self) -> bool {
        self.control_disabled
    }

    #[must_use]
    pub fn location_text(&self) -> Option<&str> {
        self.location_text.as_deref()
    }

    /// Handles a press on the SOS control.
    ///
    /// The session check comes first, so a signed-out press always prompts
    /// for login even while the control is disabled.
    pub fn press(&mut self, state: &SessionState) -> SosStep {
        match state {
            SessionState::Unknown => {
                if matches!(self.phase, SosPhase::Idle) {
                    self.phase = SosPhase::AwaitingSession;
                    debug!("sos pressed before session known");
                    SosStep::Defer
                } else {
                    SosStep::Ignore
                }
            }
            SessionState::SignedOut => {
                if matches!(self.phase, SosPhase::AwaitingSession) {
                    self.phase = SosPhase::Idle;
                }
                SosStep::RequireLogin
            }
            SessionState::SignedIn(session) => {
                if self.control_disabled {
                    debug!("sos press ignored, control disabled");
                    return SosStep::Ignore;
                }
                self.control_disabled = true;
                self.phase = SosPhase::AwaitingLocation {
                    session: session.clone(),
                };
                info!(uid = %session.uid, "sos activated");
                SosStep::RequestLocation
            }
        }
    }

    /// Replays a deferred press once the session is known.
    pub fn session_resolved(&mut self, state: &SessionState) -> SosStep {
        if !matches!(self.phase, SosPhase::AwaitingSession) || !state.is_known() {
            return SosStep::Ignore;
        }
        self.phase = SosPhase::Idle;
        self.press(state)
    }

    pub fn location_resolved(&mut self, result: GeolocationResult, locale: Locale) -> SosStep {
        let SosPhase::AwaitingLocation { session } = &self.phase else {
            return SosStep::Ignore;
        };
        let session = session.clone();

        let at = match result {
            Ok(position) => match position.coordinate() {
                Ok(at) => at,
                Err(e) => {
                    warn!(error = %e, "shell returned an invalid position");
                    return self.fail(SosFailure::Location(LocationError::PositionUnavailable));
                }
            },
            Err(e) => {
                warn!(error = %e, "geolocation failed");
                return self.fail(SosFailure::Location(e));
            }
        };

        self.location_text = Some(messages::location_sent(at.lat(), at.lon(), locale));
        let record = AlertRecord::new(&session, at);
        self.phase = SosPhase::Submitting { session, at };
        SosStep::WriteAlert(record)
    }

    pub fn alert_written(&mut self, result: Result<AlertId, ErrorKind>, now: UnixTimeMs) -> SosStep {
        let SosPhase::Submitting { at, .. } = &self.phase else {
            return SosStep::Ignore;
        };
        let at = *at;

        match result {
            Ok(alert_id) => {
                info!(alert_id = %alert_id, "alert stored");
                self.phase = SosPhase::Reported {
                    alert_id: alert_id.clone(),
                };
                SosStep::Reported(EmergencyPointer {
                    lat: at.lat(),
                    lon: at.lon(),
                    timestamp: now.as_millis(),
                    alerta_id: alert_id,
                })
            }
            Err(kind) => {
                warn!(code = kind.code(), "alert write failed");
                self.fail(SosFailure::Write(kind))
            }
        }
    }

    /// Back to the initial enabled state. The location text is kept.
    pub fn reset(&mut self) {
        self.phase = SosPhase::Idle;
        self.control_disabled = false;
    }

    fn fail(&mut self, failure: SosFailure) -> SosStep {
        self.reset();
        SosStep::Fail(failure)
    }
}
