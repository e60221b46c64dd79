use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::capabilities::{
    AuthOutput, AuthResult, Credentials, DocumentError, DocumentOutput, DocumentPath,
    FederatedProvider, Page, TypedKv,
};
use crate::config::ALERT_TIMESTAMP_FIELD;
use crate::dialog::{ConfirmIntent, DialogAction, DialogButton};
use crate::messages::Message;
use crate::session::{
    self, build_profile, guard_page, volunteer_backfill, FederatedOutcome, GuardDecision,
    PageAccess, PendingRegistration, ProfileOutcome, RegisterOutcome, SessionState,
    SignInOutcome, UserProfile,
};
use crate::sos::{EmergencyPointer, SosPhase, SosStep};
use crate::{
    AlertId, AppError, AppResult, Capabilities, ErrorKind, Event, Model, ObserverId, UnixTimeMs,
    UserId, ViewModel,
};

#[derive(Default)]
pub struct App;

impl App {
    fn user_document(model: &Model, uid: &UserId) -> Result<DocumentPath, DocumentError> {
        DocumentPath::new(model.config.users_collection.clone(), uid.as_str())
    }

    fn profile_payload(
        model: &Model,
        uid: &UserId,
        profile: &UserProfile,
    ) -> AppResult<(DocumentPath, Value)> {
        let path = Self::user_document(model, uid)?;
        let data = serde_json::to_value(profile)?;
        Ok((path, data))
    }

    fn pointer_store(model: &Model) -> AppResult<TypedKv<EmergencyPointer>> {
        Ok(TypedKv::new(model.config.emergency_pointer_key.clone())?)
    }

    fn start_session_observer(model: &mut Model, caps: &Capabilities) {
        if model.session_observer.is_some() {
            return;
        }
        let observer = ObserverId::generate();
        let tag = observer.clone();
        caps.auth.observe_session(observer.clone(), move |result| Event::SessionChanged {
            observer: tag.clone(),
            result: Box::new(result),
        });
        debug!(observer = %observer, "observing session");
        model.session_observer = Some(observer);
    }

    fn apply_guard(decision: GuardDecision, model: &mut Model, caps: &Capabilities) {
        if decision == GuardDecision::RedirectToLogin && model.access != PageAccess::Redirected {
            info!(page = model.page.path(), "no session on private page, redirecting");
            caps.navigation.navigate(Page::Login);
        }
        model.access = decision.into();
    }

    fn apply_session_output(model: &mut Model, result: AuthResult) {
        match result {
            Ok(AuthOutput::SessionChanged(user)) => model.session = SessionState::from(user),
            Ok(AuthOutput::User(user)) => model.session = SessionState::from(Some(user)),
            Ok(AuthOutput::SignedOut) => model.session = SessionState::SignedOut,
            Err(e) => {
                warn!(code = %e.code, "session stream error");
                if !model.session.is_known() {
                    model.session = SessionState::SignedOut;
                }
            }
        }
    }

    fn run_sos_step(step: SosStep, model: &mut Model, caps: &Capabilities) {
        let locale = model.locale();
        match step {
            SosStep::Ignore | SosStep::Defer => {}

            SosStep::RequireLogin => {
                model.dialogs.show_alert(
                    Message::SessionRequiredTitle.text(locale),
                    Message::SessionRequiredBody.text(locale),
                    vec![DialogButton::navigate(Message::GoToLogin.text(locale), Page::Login)],
                    locale,
                );
            }

            SosStep::RequestLocation => {
                caps.geolocation
                    .current_position(model.config.position_options, |result| {
                        Event::PositionResolved(Box::new(result))
                    });
            }

            SosStep::WriteAlert(record) => match serde_json::to_value(&record) {
                Ok(data) => {
                    caps.documents.add(
                        model.config.alerts_collection.clone(),
                        data,
                        vec![ALERT_TIMESTAMP_FIELD.to_string()],
                        |result| Event::AlertWritten(Box::new(result)),
                    );
                }
                Err(e) => {
                    error!(error = %e, "alert record not serializable");
                    let next = model
                        .sos
                        .alert_written(Err(ErrorKind::Serialization), UnixTimeMs::now());
                    Self::run_sos_step(next, model, caps);
                }
            },

            SosStep::Reported(pointer) => {
                model.active_emergency = Some(pointer.clone());
                let saved = Self::pointer_store(model).and_then(|store| {
                    let bytes = store.encode(&pointer)?;
                    Ok((store, bytes))
                });
                match saved {
                    Ok((store, bytes)) => {
                        caps.kv.set(store.key().clone(), bytes, |result| {
                            Event::EmergencyPointerSaved(Box::new(result))
                        });
                    }
                    Err(e) => {
                        warn!(code = e.code(), error = %e, "emergency pointer not saved");
                        Self::show_reported(model);
                    }
                }
            }

            SosStep::Fail(failure) => {
                let (title, body) = failure.dialog();
                model
                    .dialogs
                    .show_alert(title.text(locale), body.text(locale), Vec::new(), locale);
            }
        }
    }

    fn show_reported(model: &mut Model) {
        if !matches!(model.sos.phase(), SosPhase::Reported { .. }) {
            return;
        }
        let locale = model.locale();
        model.dialogs.show_alert(
            Message::ReportedTitle.text(locale),
            Message::ReportedBody.text(locale),
            vec![DialogButton::navigate(Message::Continue.text(locale), Page::Emergency)],
            locale,
        );
    }

    fn load_emergency_pointer(model: &Model, caps: &Capabilities) {
        match Self::pointer_store(model) {
            Ok(store) => caps.kv.get(store.key().clone(), |result| {
                Event::EmergencyPointerLoaded(Box::new(result))
            }),
            Err(e) => warn!(code = e.code(), error = %e, "emergency pointer key invalid"),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        model.update_timestamp();
        debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );
        let locale = model.locale();

        match event {
            Event::Noop => {}

            Event::AppStarted => {
                Self::start_session_observer(model, caps);
                caps.render.render();
            }

            Event::Configure(config) => {
                match config.validate() {
                    Ok(()) => {
                        info!(locale = ?config.locale, "configuration applied");
                        model.config = *config;
                    }
                    Err(e) => {
                        warn!(error = %e, "configuration rejected");
                        model.set_error(AppError::new(ErrorKind::Validation, e.to_string()));
                    }
                }
                caps.render.render();
            }

            Event::PageOpened { page } => {
                model.enter_page(page);
                Self::start_session_observer(model, caps);
                Self::apply_guard(guard_page(page, &model.session), model, caps);
                if page == Page::Emergency {
                    Self::load_emergency_pointer(model, caps);
                }
                caps.render.render();
            }

            Event::SessionChanged { observer, result } => {
                if model.session_observer.as_ref() != Some(&observer) {
                    debug!(observer = %observer, "ignoring emission from stale observer");
                    return;
                }
                Self::apply_session_output(model, *result);

                if matches!(model.access, PageAccess::Pending | PageAccess::Granted(_)) {
                    Self::apply_guard(guard_page(model.page, &model.session), model, caps);
                }

                let step = model.sos.session_resolved(&model.session);
                Self::run_sos_step(step, model, caps);
                caps.render.render();
            }

            Event::StopObservingSession => {
                if let Some(observer) = model.session_observer.take() {
                    caps.auth.stop_observing(observer);
                }
            }

            // --- Email / password sign-in ---
            Event::SignInRequested { email, password } => {
                if model.is_busy {
                    debug!("sign-in rejected, request in progress");
                    model.sign_in = Some(SignInOutcome::busy(locale));
                    caps.render.render();
                    return;
                }
                if let Err(kind) = session::check_email(&email) {
                    model.sign_in = Some(SignInOutcome::failed(kind, locale));
                    caps.render.render();
                    return;
                }
                model.is_busy = true;
                model.sign_in = None;
                caps.auth.sign_in(Credentials::new(email.trim(), &password), |result| {
                    Event::SignInResponse(Box::new(result))
                });
                caps.render.render();
            }

            Event::SignInResponse(result) => {
                model.is_busy = false;
                model.sign_in = Some(match (*result).and_then(AuthOutput::into_user) {
                    Ok(user) => {
                        info!(uid = %user.uid, "signed in");
                        SignInOutcome::succeeded(user.into())
                    }
                    Err(e) => {
                        warn!(code = %e.code, "sign-in failed");
                        SignInOutcome::failed(e.kind(), locale)
                    }
                });
                caps.render.render();
            }

            // --- Registration ---
            Event::RegisterRequested(form) => {
                if model.is_busy {
                    debug!("registration rejected, request in progress");
                    model.registration = Some(RegisterOutcome::busy(locale));
                    caps.render.render();
                    return;
                }
                let form = *form;
                let checked = session::check_email(&form.email)
                    .and_then(|()| session::check_password(&form.password));
                if let Err(kind) = checked {
                    model.registration = Some(RegisterOutcome::failed(kind, locale));
                    caps.render.render();
                    return;
                }
                let email = form.email.trim().to_string();
                caps.auth.create_account(Credentials::new(email.clone(), &form.password), |result| {
                    Event::AccountCreated(Box::new(result))
                });
                model.pending_registration = Some(PendingRegistration {
                    email,
                    fields: form.fields,
                    is_volunteer: form.is_volunteer,
                });
                model.registration = None;
                model.is_busy = true;
                caps.render.render();
            }

            Event::AccountCreated(result) => {
                let pending = model.pending_registration.take();
                let user = match (*result).and_then(AuthOutput::into_user) {
                    Ok(user) => user,
                    Err(e) => {
                        warn!(code = %e.code, "account creation failed");
                        model.is_busy = false;
                        model.registration = Some(RegisterOutcome::failed(e.kind(), locale));
                        caps.render.render();
                        return;
                    }
                };
                let Some(pending) = pending else {
                    error!(uid = %user.uid, "account created with no pending registration");
                    model.is_busy = false;
                    model.registration =
                        Some(RegisterOutcome::profile_failed(ErrorKind::InvalidState, locale));
                    caps.render.render();
                    return;
                };

                let profile = build_profile(
                    pending.email,
                    pending.fields,
                    pending.is_volunteer,
                    UnixTimeMs::now(),
                    false,
                );
                match Self::profile_payload(model, &user.uid, &profile) {
                    Ok((path, data)) => {
                        info!(uid = %user.uid, volunteer = profile.es_voluntario, "account created");
                        caps.documents.set(path, data, |result| {
                            Event::ProfileWritten(Box::new(result))
                        });
                    }
                    Err(e) => {
                        error!(code = e.code(), error = %e, "profile not written");
                        model.is_busy = false;
                        model.registration = Some(RegisterOutcome::profile_failed(e.kind, locale));
                    }
                }
                caps.render.render();
            }

            Event::ProfileWritten(result) => {
                model.is_busy = false;
                model.registration = Some(match *result {
                    Ok(_) => RegisterOutcome::succeeded(),
                    Err(e) => {
                        error!(error = %e, "profile write failed");
                        RegisterOutcome::profile_failed(ErrorKind::Store(e.kind), locale)
                    }
                });
                caps.render.render();
            }

            // --- Federated sign-in ---
            Event::FederatedSignInRequested => {
                if model.is_busy {
                    debug!("federated sign-in rejected, request in progress");
                    model.federated = Some(FederatedOutcome::busy(locale));
                    caps.render.render();
                    return;
                }
                model.is_busy = true;
                model.federated = None;
                caps.auth
                    .sign_in_with_provider(FederatedProvider::Google, |result| {
                        Event::FederatedSignInResponse(Box::new(result))
                    });
                caps.render.render();
            }

            Event::FederatedSignInResponse(result) => {
                let fetched = (*result)
                    .and_then(AuthOutput::into_user)
                    .map_err(AppError::from)
                    .and_then(|user| {
                        let path = Self::user_document(model, &user.uid)?;
                        Ok((user, path))
                    });
                match fetched {
                    Ok((user, path)) => {
                        caps.documents.get(path, move |result| Event::FederatedProfileFetched {
                            user: Box::new(user),
                            result: Box::new(result),
                        });
                    }
                    Err(e) => {
                        warn!(code = e.code(), error = %e, "federated sign-in failed");
                        model.is_busy = false;
                        model.federated = Some(FederatedOutcome::failed(e.kind, locale));
                    }
                }
                caps.render.render();
            }

            Event::FederatedProfileFetched { user, result } => {
                let outcome = match *result {
                    Ok(DocumentOutput::Snapshot(None)) => {
                        info!(uid = %user.uid, "first federated sign-in");
                        Some(FederatedOutcome::NewUser {
                            uid: user.uid.clone(),
                            email: user.email.clone(),
                            display_name: user.display_name.clone().unwrap_or_default(),
                        })
                    }
                    Ok(DocumentOutput::Snapshot(Some(existing))) => {
                        match volunteer_backfill(&existing) {
                            None => Some(FederatedOutcome::ReturningUser),
                            Some(fields) => match Self::user_document(model, &user.uid) {
                                Ok(path) => {
                                    info!(uid = %user.uid, "backfilling volunteer status");
                                    caps.documents.update(path, fields, |result| {
                                        Event::FederatedProfileBackfilled(Box::new(result))
                                    });
                                    None
                                }
                                Err(e) => Some(FederatedOutcome::failed(ErrorKind::Store(e.kind), locale)),
                            },
                        }
                    }
                    Ok(other) => {
                        let e = DocumentError::unexpected(&other);
                        warn!(error = %e, "unexpected profile read output");
                        Some(FederatedOutcome::failed(ErrorKind::Store(e.kind), locale))
                    }
                    Err(e) => {
                        warn!(error = %e, "profile read failed");
                        Some(FederatedOutcome::failed(ErrorKind::Store(e.kind), locale))
                    }
                };
                if let Some(outcome) = outcome {
                    model.is_busy = false;
                    model.federated = Some(outcome);
                }
                caps.render.render();
            }

            Event::FederatedProfileBackfilled(result) => {
                model.is_busy = false;
                model.federated = Some(match *result {
                    Ok(_) => FederatedOutcome::ReturningUser,
                    Err(e) => {
                        warn!(error = %e, "volunteer status backfill failed");
                        FederatedOutcome::failed(ErrorKind::Store(e.kind), locale)
                    }
                });
                caps.render.render();
            }

            Event::CompleteProfileRequested(form) => {
                if model.is_busy {
                    debug!("profile completion rejected, request in progress");
                    model.profile_completion = Some(ProfileOutcome::busy(locale));
                    caps.render.render();
                    return;
                }
                let form = *form;
                let profile = build_profile(
                    form.email,
                    form.fields,
                    form.is_volunteer,
                    UnixTimeMs::now(),
                    true,
                );
                match Self::profile_payload(model, &form.uid, &profile) {
                    Ok((path, data)) => {
                        model.is_busy = true;
                        model.profile_completion = None;
                        caps.documents.set(path, data, |result| {
                            Event::CompleteProfileResponse(Box::new(result))
                        });
                    }
                    Err(e) => {
                        warn!(code = e.code(), error = %e, "federated profile not written");
                        model.profile_completion = Some(ProfileOutcome::failed(e.kind, locale));
                    }
                }
                caps.render.render();
            }

            Event::CompleteProfileResponse(result) => {
                model.is_busy = false;
                model.profile_completion = Some(match *result {
                    Ok(_) => ProfileOutcome::succeeded(),
                    Err(e) => {
                        warn!(error = %e, "federated profile write failed");
                        ProfileOutcome::failed(ErrorKind::Store(e.kind), locale)
                    }
                });
                caps.render.render();
            }

            // --- Sign-out ---
            Event::SignOutConfirmationRequested => {
                model.dialogs.show_confirm(
                    Message::SignOutTitle.text(locale),
                    Message::SignOutBody.text(locale),
                    ConfirmIntent::SignOut,
                    locale,
                );
                caps.render.render();
            }

            Event::SignOutRequested => {
                caps.auth
                    .sign_out(|result| Event::SignOutResponse(Box::new(result)));
            }

            Event::SignOutResponse(result) => match *result {
                Ok(_) => {
                    info!("signed out");
                    caps.navigation.navigate(Page::Home);
                }
                Err(e) => error!(code = %e.code, message = %e.message, "sign-out failed"),
            },

            // --- SOS ---
            Event::SosPressed => {
                let step = model.sos.press(&model.session);
                Self::run_sos_step(step, model, caps);
                caps.render.render();
            }

            Event::PositionResolved(result) => {
                let step = model.sos.location_resolved(*result, locale);
                Self::run_sos_step(step, model, caps);
                caps.render.render();
            }

            Event::AlertWritten(result) => {
                let written = match *result {
                    Ok(DocumentOutput::Added { id }) if !id.is_empty() => Ok(AlertId::new(id)),
                    Ok(other) => Err(ErrorKind::Store(DocumentError::unexpected(&other).kind)),
                    Err(e) => {
                        error!(error = %e, "alert write failed");
                        Err(ErrorKind::Store(e.kind))
                    }
                };
                let step = model.sos.alert_written(written, UnixTimeMs::now());
                Self::run_sos_step(step, model, caps);
                caps.render.render();
            }

            Event::EmergencyPointerSaved(result) => {
                if let Err(e) = *result {
                    let e = AppError::from(e);
                    warn!(code = e.code(), error = %e, "emergency pointer not saved");
                }
                Self::show_reported(model);
                caps.render.render();
            }

            Event::EmergencyPointerRequested => {
                Self::load_emergency_pointer(model, caps);
            }

            Event::EmergencyPointerLoaded(result) => {
                let loaded = Self::pointer_store(model).and_then(|store| {
                    let output = (*result)?;
                    Ok(store.decode(output)?)
                });
                match loaded {
                    Ok(pointer) => model.active_emergency = pointer,
                    Err(e) => warn!(code = e.code(), error = %e, "emergency pointer unreadable"),
                }
                caps.render.render();
            }

            // --- Dialogs ---
            Event::AlertButtonPressed { dialog, index } => {
                match model.dialogs.press_alert_button(dialog, index) {
                    Some(DialogAction::Navigate(page)) => caps.navigation.navigate(page),
                    Some(DialogAction::Dismiss) | None => {}
                }
                caps.render.render();
            }

            Event::ConfirmAnswered {
                dialog,
                affirmative,
            } => {
                let intent = model.dialogs.answer_confirm(dialog, affirmative);
                caps.render.render();
                if let Some(ConfirmIntent::SignOut) = intent {
                    self.update(Event::SignOutRequested, model, caps);
                }
            }

            Event::DialogDismissed { kind, dialog } => {
                if model.dialogs.dismiss(kind, dialog) {
                    caps.render.render();
                }
            }

            Event::DialogHidden { kind, dialog } => {
                if model.dialogs.hidden(kind, dialog) {
                    caps.render.render();
                }
            }

            Event::ControlMissing { control } => {
                error!(control = %control, page = model.page.path(), "control not found");
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
