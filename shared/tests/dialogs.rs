mod common;

use shared::capabilities::{LocationError, Page};
use shared::dialog::DialogKind;
use shared::{Event, Model};

use common::*;

/// Signed-in app with a location error dialog on screen.
fn with_error_dialog() -> (Tester, Model) {
    let app = Tester::default();
    let mut model = Model::default();
    start_with_session(&app, &mut model, Some(user("u1", None)));
    let mut effects = run(&app, &mut model, Event::SosPressed);
    let mut locate = geolocation_requests(&mut effects);
    resolve(&app, &mut model, &mut locate[0], Err(LocationError::Timeout));
    (app, model)
}

#[test]
fn test_hidden_cleans_overlay_once() {
    let (app, mut model) = with_error_dialog();
    let alert = app.view(&model).alert.unwrap();
    assert_eq!(app.view(&model).overlay.backdrops, 1);

    run(
        &app,
        &mut model,
        Event::AlertButtonPressed {
            dialog: alert.id,
            index: 0,
        },
    );
    let view = app.view(&model);
    assert!(view.alert.is_none());
    assert!(!view.overlay.is_clean());

    run(
        &app,
        &mut model,
        Event::DialogHidden {
            kind: DialogKind::Alert,
            dialog: alert.id,
        },
    );
    assert!(app.view(&model).overlay.is_clean());

    // A repeated hidden notification is a no-op
    let update = app.update(
        Event::DialogHidden {
            kind: DialogKind::Alert,
            dialog: alert.id,
        },
        &mut model,
    );
    assert!(update.effects.is_empty());
    assert!(app.view(&model).overlay.is_clean());
}

#[test]
fn test_stale_dialog_input_ignored() {
    let (app, mut model) = with_error_dialog();
    let first = app.view(&model).alert.unwrap();

    // Second failure replaces the dialog content under a new id
    let mut effects = run(&app, &mut model, Event::SosPressed);
    let mut locate = geolocation_requests(&mut effects);
    resolve(&app, &mut model, &mut locate[0], Err(LocationError::PermissionDenied));
    let second = app.view(&model).alert.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(app.view(&model).overlay.backdrops, 1);

    let mut effects = run(
        &app,
        &mut model,
        Event::AlertButtonPressed {
            dialog: first.id,
            index: 0,
        },
    );
    assert!(navigated_to(&mut effects).is_empty());
    assert_eq!(app.view(&model).alert.unwrap().id, second.id);

    run(
        &app,
        &mut model,
        Event::DialogHidden {
            kind: DialogKind::Alert,
            dialog: first.id,
        },
    );
    assert_eq!(app.view(&model).overlay.backdrops, 1);
}

#[test]
fn test_dismiss_then_hidden() {
    let (app, mut model) = with_error_dialog();
    let alert = app.view(&model).alert.unwrap();

    run(
        &app,
        &mut model,
        Event::DialogDismissed {
            kind: DialogKind::Alert,
            dialog: alert.id,
        },
    );
    assert!(app.view(&model).alert.is_none());
    run(
        &app,
        &mut model,
        Event::DialogHidden {
            kind: DialogKind::Alert,
            dialog: alert.id,
        },
    );
    assert!(app.view(&model).overlay.is_clean());
}

#[test]
fn test_confirm_over_alert_keeps_one_backdrop() {
    let (app, mut model) = with_error_dialog();
    run(&app, &mut model, Event::SignOutConfirmationRequested);
    let view = app.view(&model);
    assert_eq!(view.overlay.backdrops, 2);
    let confirm = view.confirm.unwrap();

    run(
        &app,
        &mut model,
        Event::ConfirmAnswered {
            dialog: confirm.id,
            affirmative: false,
        },
    );
    run(
        &app,
        &mut model,
        Event::DialogHidden {
            kind: DialogKind::Confirm,
            dialog: confirm.id,
        },
    );
    let view = app.view(&model);
    assert!(view.alert.is_some());
    assert_eq!(view.overlay.backdrops, 1);
    assert!(view.overlay.body_modal_open);
}

#[test]
fn test_page_change_resets_dialogs() {
    let (app, mut model) = with_error_dialog();
    run(&app, &mut model, Event::PageOpened { page: Page::Home });
    let view = app.view(&model);
    assert!(view.alert.is_none());
    assert!(view.overlay.is_clean());
}
