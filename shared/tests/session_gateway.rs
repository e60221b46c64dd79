mod common;

use assert_matches::assert_matches;
use proptest::prelude::*;
use secrecy::SecretString;
use serde_json::json;

use shared::capabilities::{
    AuthError, AuthErrorKind, AuthOperation, AuthOutput, DocumentOperation, DocumentOutput,
    FederatedProvider, Page,
};
use shared::session::{FederatedOutcome, ProfileCompletionForm, ProfileFields, RegistrationForm};
use shared::view::AccessView;
use shared::{ErrorKind, Event, Model, UserId};

use common::*;

fn sign_in(email: &str, password: &str) -> Event {
    Event::SignInRequested {
        email: email.into(),
        password: SecretString::new(password.into()),
    }
}

fn fields() -> ProfileFields {
    ProfileFields {
        primer_nombre: "Ana".into(),
        segundo_nombre: String::new(),
        primer_apellido: "Gómez".into(),
        segundo_apellido: "Ruiz".into(),
        celular: "3001234567".into(),
    }
}

fn registration(password: &str, is_volunteer: bool) -> Event {
    Event::RegisterRequested(Box::new(RegistrationForm {
        email: "ana@example.com".into(),
        password: SecretString::new(password.into()),
        fields: fields(),
        is_volunteer,
    }))
}

#[test]
fn test_sign_in_success() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, sign_in(" ana@example.com ", "secreto1"));
    let mut requests = auth_requests(&mut effects);
    assert_eq!(requests.len(), 1);
    assert_matches!(&requests[0].operation, AuthOperation::SignInWithPassword(credentials) => {
        assert_eq!(credentials.email, "ana@example.com");
        assert_eq!(credentials.password, "secreto1");
    });
    assert!(app.view(&model).is_busy);

    resolve(
        &app,
        &mut model,
        &mut requests[0],
        Ok(AuthOutput::User(user("u1", Some("ana@example.com")))),
    );
    let view = app.view(&model);
    assert!(!view.is_busy);
    let outcome = view.sign_in.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.user.unwrap().uid, UserId::new("u1"));
    assert!(outcome.message.is_none());
}

#[test]
fn test_sign_in_failure_messages() {
    let cases = [
        ("auth/user-not-found", "Usuario no encontrado", true),
        (
            "auth/invalid-login-credentials",
            "Contraseña incorrecta o usuario no existe",
            false,
        ),
        (
            "auth/wrong-password",
            "Contraseña incorrecta o usuario no existe",
            false,
        ),
        ("auth/invalid-email", "Email inválido", false),
    ];
    for (code, message, not_found) in cases {
        let app = Tester::default();
        let mut model = Model::default();
        let mut effects = run(&app, &mut model, sign_in("ana@example.com", "secreto1"));
        let mut requests = auth_requests(&mut effects);

        resolve(&app, &mut model, &mut requests[0], Err(AuthError::new(code, "raw backend text")));
        let outcome = app.view(&model).sign_in.unwrap();
        assert!(!outcome.success, "{code}");
        assert_eq!(outcome.message.as_deref(), Some(message), "{code}");
        assert_eq!(outcome.user_not_found, not_found, "{code}");
        assert!(outcome.user.is_none());
    }
}

#[test]
fn test_malformed_email_rejected_locally() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, sign_in("not-an-email", "secreto1"));
    assert!(auth_requests(&mut effects).is_empty());
    let outcome = app.view(&model).sign_in.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.credential, None);
    assert_eq!(outcome.error, Some(ErrorKind::Auth(AuthErrorKind::InvalidEmail)));
}

fn any_email() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z0-9.]{1,12}@[a-z]{1,10}\\.[a-z]{2,3}",
        "[^@]{0,24}",
        "\\PC{0,24}",
        "ñandú@correo\\.co|@|user@|@dominio",
    ]
}

proptest! {
    #[test]
    fn sign_in_always_reports_an_outcome(
        email in any_email(),
        password in "\\PC{0,24}",
        code in "[a-z/-]{0,32}",
        message in ".{0,64}",
    ) {
        let app = Tester::default();
        let mut model = Model::default();
        let mut effects = run(&app, &mut model, sign_in(&email, &password));
        let mut requests = auth_requests(&mut effects);
        prop_assert!(requests.len() <= 1);

        if let Some(request) = requests.first_mut() {
            prop_assert!(app.view(&model).sign_in.is_none());
            resolve(&app, &mut model, request, Err(AuthError::new(code, message.clone())));
        }

        let outcome = app.view(&model).sign_in;
        prop_assert!(outcome.is_some());
        let outcome = outcome.unwrap();
        prop_assert!(!outcome.success);
        prop_assert!(outcome.user.is_none());
        prop_assert!(outcome.message.is_some());
        if !message.trim().is_empty() {
            prop_assert_ne!(outcome.message.as_deref(), Some(message.as_str()));
        }
        prop_assert!(!app.view(&model).is_busy);
    }
}

#[test]
fn test_sign_in_while_busy_reports_outcome() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::FederatedSignInRequested);
    let mut pending = auth_requests(&mut effects);
    assert_eq!(pending.len(), 1);

    let mut effects = run(&app, &mut model, sign_in("ana@example.com", "secreto1"));
    assert!(auth_requests(&mut effects).is_empty());
    let outcome = app.view(&model).sign_in.expect("busy outcome");
    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::Busy));
    assert_eq!(
        outcome.message.as_deref(),
        Some("Ya hay una solicitud en curso. Espera un momento.")
    );

    // The outstanding request still completes normally
    let mut effects = resolve(
        &app,
        &mut model,
        &mut pending[0],
        Ok(AuthOutput::User(user("g1", None))),
    );
    assert_eq!(document_requests(&mut effects).len(), 1);
}

#[test]
fn test_every_gated_request_reports_busy() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut effects = run(&app, &mut model, sign_in("ana@example.com", "secreto1"));
    assert_eq!(auth_requests(&mut effects).len(), 1);

    let mut effects = run(&app, &mut model, registration("secreto1", true));
    assert!(auth_requests(&mut effects).is_empty());
    assert_eq!(app.view(&model).registration.unwrap().error, Some(ErrorKind::Busy));

    let mut effects = run(&app, &mut model, Event::FederatedSignInRequested);
    assert!(auth_requests(&mut effects).is_empty());
    assert_matches!(
        app.view(&model).federated,
        Some(FederatedOutcome::Failed { error: ErrorKind::Busy, .. })
    );

    let mut effects = run(
        &app,
        &mut model,
        Event::CompleteProfileRequested(Box::new(ProfileCompletionForm {
            uid: UserId::new("g1"),
            email: "ana@gmail.com".into(),
            fields: fields(),
            is_volunteer: false,
        })),
    );
    assert!(document_requests(&mut effects).is_empty());
    let outcome = app.view(&model).profile_completion.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::Busy));
}

#[test]
fn test_register_volunteer_writes_profile() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, registration("secreto1", true));
    let mut requests = auth_requests(&mut effects);
    assert_matches!(&requests[0].operation, AuthOperation::CreateAccount(credentials) => {
        assert_eq!(credentials.email, "ana@example.com");
    });

    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Ok(AuthOutput::User(user("u7", Some("ana@example.com")))),
    );
    let mut writes = document_requests(&mut effects);
    assert_eq!(writes.len(), 1);
    assert_matches!(&writes[0].operation, DocumentOperation::Set { path, data } => {
        assert_eq!(path.collection(), "usuarios");
        assert_eq!(path.id(), "u7");
        assert_eq!(data["email"], "ana@example.com");
        assert_eq!(data["primerNombre"], "Ana");
        assert_eq!(data["segundoApellido"], "Ruiz");
        assert_eq!(data["celular"], "3001234567");
        assert_eq!(data["esVoluntario"], true);
        assert_eq!(data["estadoVoluntario"], "no_disponible");
        assert!(data["fechaRegistro"].as_u64().unwrap() > 0);
        assert!(data.get("registroConGoogle").is_none());
    });

    resolve(&app, &mut model, &mut writes[0], Ok(DocumentOutput::Written));
    let outcome = app.view(&model).registration.unwrap();
    assert!(outcome.success);
    assert!(!app.view(&model).is_busy);
}

#[test]
fn test_register_non_volunteer_status() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, registration("secreto1", false));
    let mut requests = auth_requests(&mut effects);
    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Ok(AuthOutput::User(user("u8", None))),
    );
    let writes = document_requests(&mut effects);
    assert_matches!(&writes[0].operation, DocumentOperation::Set { data, .. } => {
        assert_eq!(data["esVoluntario"], false);
        assert_eq!(data["estadoVoluntario"], "no_aplicable");
    });
}

#[test]
fn test_weak_password_never_reaches_backend() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, registration("12345", true));
    assert!(auth_requests(&mut effects).is_empty());
    assert!(document_requests(&mut effects).is_empty());

    let outcome = app.view(&model).registration.unwrap();
    assert!(!outcome.success);
    assert_eq!(
        outcome.message.as_deref(),
        Some("La contraseña es muy débil (mínimo 6 caracteres)")
    );
}

#[test]
fn test_register_email_in_use() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, registration("secreto1", false));
    let mut requests = auth_requests(&mut effects);
    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Err(AuthError::new("auth/email-already-in-use", "")),
    );
    assert!(document_requests(&mut effects).is_empty());

    let outcome = app.view(&model).registration.unwrap();
    assert!(!outcome.success);
    assert!(outcome.email_in_use);
    assert_eq!(
        outcome.message.as_deref(),
        Some("Este correo electrónico ya está registrado")
    );
}

#[test]
fn test_federated_new_user() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::FederatedSignInRequested);
    let mut requests = auth_requests(&mut effects);
    assert_matches!(
        requests[0].operation,
        AuthOperation::SignInWithProvider {
            provider: FederatedProvider::Google
        }
    );

    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Ok(AuthOutput::User(shared::capabilities::AuthUser {
            uid: UserId::new("g1"),
            email: Some("ana@gmail.com".into()),
            display_name: Some("Ana Gómez".into()),
        })),
    );
    let mut reads = document_requests(&mut effects);
    assert_matches!(&reads[0].operation, DocumentOperation::Get { path } => {
        assert_eq!(path.to_string(), "usuarios/g1");
    });

    resolve(&app, &mut model, &mut reads[0], Ok(DocumentOutput::Snapshot(None)));
    assert_eq!(
        app.view(&model).federated,
        Some(FederatedOutcome::NewUser {
            uid: UserId::new("g1"),
            email: Some("ana@gmail.com".into()),
            display_name: "Ana Gómez".into(),
        })
    );
}

fn federated_returning(existing: serde_json::Value) -> (Tester, Model, Vec<shared::Effect>) {
    let app = Tester::default();
    let mut model = Model::default();
    let mut effects = run(&app, &mut model, Event::FederatedSignInRequested);
    let mut requests = auth_requests(&mut effects);
    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Ok(AuthOutput::User(user("g2", Some("ana@gmail.com")))),
    );
    let mut reads = document_requests(&mut effects);
    let effects = resolve(
        &app,
        &mut model,
        &mut reads[0],
        Ok(DocumentOutput::Snapshot(Some(existing))),
    );
    (app, model, effects)
}

#[test]
fn test_federated_returning_user_with_status() {
    let (app, model, mut effects) = federated_returning(json!({
        "email": "ana@gmail.com",
        "esVoluntario": true,
        "estadoVoluntario": "disponible"
    }));
    assert!(document_requests(&mut effects).is_empty());
    assert_eq!(app.view(&model).federated, Some(FederatedOutcome::ReturningUser));
}

#[test]
fn test_federated_returning_user_backfills_status() {
    let (app, mut model, mut effects) = federated_returning(json!({
        "email": "ana@gmail.com",
        "esVoluntario": true
    }));
    let mut updates = document_requests(&mut effects);
    assert_eq!(updates.len(), 1);
    assert_matches!(&updates[0].operation, DocumentOperation::Update { path, fields } => {
        assert_eq!(path.id(), "g2");
        assert_eq!(fields, &json!({"estadoVoluntario": "no_disponible"}));
    });
    assert!(app.view(&model).federated.is_none());

    resolve(&app, &mut model, &mut updates[0], Ok(DocumentOutput::Written));
    assert_eq!(app.view(&model).federated, Some(FederatedOutcome::ReturningUser));
    assert!(!app.view(&model).is_busy);
}

#[test]
fn test_federated_popup_closed() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut effects = run(&app, &mut model, Event::FederatedSignInRequested);
    let mut requests = auth_requests(&mut effects);

    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Err(AuthError::new("auth/popup-closed-by-user", "closed")),
    );
    assert!(document_requests(&mut effects).is_empty());
    assert_matches!(
        app.view(&model).federated,
        Some(FederatedOutcome::Failed { message, .. }) => assert!(!message.contains("closed"))
    );
}

#[test]
fn test_complete_profile_marks_federated_registration() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(
        &app,
        &mut model,
        Event::CompleteProfileRequested(Box::new(ProfileCompletionForm {
            uid: UserId::new("g1"),
            email: "ana@gmail.com".into(),
            fields: fields(),
            is_volunteer: false,
        })),
    );
    let mut writes = document_requests(&mut effects);
    assert_matches!(&writes[0].operation, DocumentOperation::Set { path, data } => {
        assert_eq!(path.to_string(), "usuarios/g1");
        assert_eq!(data["registroConGoogle"], true);
        assert_eq!(data["estadoVoluntario"], "no_aplicable");
    });

    resolve(&app, &mut model, &mut writes[0], Ok(DocumentOutput::Written));
    assert!(app.view(&model).profile_completion.unwrap().success);
}

#[test]
fn test_sign_out_confirmed() {
    let app = Tester::default();
    let mut model = Model::default();
    start_with_session(&app, &mut model, Some(user("u1", None)));

    run(&app, &mut model, Event::SignOutConfirmationRequested);
    let confirm = app.view(&model).confirm.expect("confirm dialog");
    assert_eq!(confirm.no.label, "No");

    let mut effects = run(
        &app,
        &mut model,
        Event::ConfirmAnswered {
            dialog: confirm.id,
            affirmative: true,
        },
    );
    let mut requests = auth_requests(&mut effects);
    assert_eq!(requests.len(), 1);
    assert_matches!(requests[0].operation, AuthOperation::SignOut);
    assert!(app.view(&model).confirm.is_none());

    let mut effects = resolve(&app, &mut model, &mut requests[0], Ok(AuthOutput::SignedOut));
    assert_eq!(navigated_to(&mut effects), vec![Page::Home]);
}

#[test]
fn test_sign_out_declined() {
    let app = Tester::default();
    let mut model = Model::default();
    start_with_session(&app, &mut model, Some(user("u1", None)));

    run(&app, &mut model, Event::SignOutConfirmationRequested);
    let confirm = app.view(&model).confirm.unwrap();
    let mut effects = run(
        &app,
        &mut model,
        Event::ConfirmAnswered {
            dialog: confirm.id,
            affirmative: false,
        },
    );
    assert!(auth_requests(&mut effects).is_empty());
    assert!(app.view(&model).confirm.is_none());
}

#[test]
fn test_sign_out_failure_stays_put() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::SignOutRequested);
    let mut requests = auth_requests(&mut effects);
    let mut effects = resolve(
        &app,
        &mut model,
        &mut requests[0],
        Err(AuthError::new("auth/network-request-failed", "offline")),
    );
    assert!(navigated_to(&mut effects).is_empty());
    assert!(app.view(&model).alert.is_none());
}

#[test]
fn test_private_page_redirects_without_session() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::PageOpened { page: Page::CompleteProfile });
    assert_eq!(app.view(&model).access, AccessView::Checking);
    assert!(navigated_to(&mut effects).is_empty());
    let mut observe = auth_requests(&mut effects).pop().unwrap();

    let mut effects = resolve(&app, &mut model, &mut observe, Ok(AuthOutput::SessionChanged(None)));
    assert_eq!(navigated_to(&mut effects), vec![Page::Login]);
    assert_eq!(app.view(&model).access, AccessView::Redirecting);
}

#[test]
fn test_private_page_granted_with_session() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::PageOpened { page: Page::Emergency });
    let mut observe = auth_requests(&mut effects).pop().unwrap();

    let mut effects = resolve(
        &app,
        &mut model,
        &mut observe,
        Ok(AuthOutput::SessionChanged(Some(user("u1", None)))),
    );
    assert!(navigated_to(&mut effects).is_empty());
    assert_eq!(app.view(&model).access, AccessView::Granted);
}

#[test]
fn test_public_page_never_redirects() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut effects = run(&app, &mut model, Event::PageOpened { page: Page::Login });
    let mut observe = auth_requests(&mut effects).pop().unwrap();
    let mut effects = resolve(&app, &mut model, &mut observe, Ok(AuthOutput::SessionChanged(None)));
    assert!(navigated_to(&mut effects).is_empty());
    assert_eq!(app.view(&model).access, AccessView::Public);
}
