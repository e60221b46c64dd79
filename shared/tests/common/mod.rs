#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;

use shared::capabilities::{
    AuthOperation, AuthOutput, AuthUser, DocumentOperation, GeolocationOperation, KvOperation,
    NavigationOperation, Page,
};
use shared::{App, Effect, Event, Model, UserId};

pub type Tester = AppTester<App, Effect>;

/// Runs `event` and every event it produces without shell involvement.
pub fn run(app: &Tester, model: &mut Model, event: Event) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut queue = vec![event];
    while let Some(event) = queue.pop() {
        let update = app.update(event, model);
        effects.extend(update.effects);
        queue.extend(update.events);
    }
    effects
}

/// Answers a shell request and feeds the resulting events back into the app.
pub fn resolve<Op: Operation>(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<Op>,
    output: Op::Output,
) -> Vec<Effect> {
    let update = app.resolve(request, output).expect("request should resolve");
    let mut effects = update.effects;
    for event in update.events {
        effects.extend(run(app, model, event));
    }
    effects
}

macro_rules! take {
    ($name:ident, $variant:ident, $op:ty) => {
        pub fn $name(effects: &mut Vec<Effect>) -> Vec<Request<$op>> {
            let mut taken = Vec::new();
            let mut rest = Vec::new();
            for effect in effects.drain(..) {
                match effect {
                    Effect::$variant(request) => taken.push(request),
                    other => rest.push(other),
                }
            }
            *effects = rest;
            taken
        }
    };
}

take!(auth_requests, Auth, AuthOperation);
take!(document_requests, Documents, DocumentOperation);
take!(geolocation_requests, Geolocation, GeolocationOperation);
take!(kv_requests, Kv, KvOperation);
take!(navigation_requests, Navigation, NavigationOperation);

pub fn navigated_to(effects: &mut Vec<Effect>) -> Vec<Page> {
    navigation_requests(effects)
        .into_iter()
        .map(|request| match request.operation {
            NavigationOperation::Navigate { page } => page,
        })
        .collect()
}

pub fn user(uid: &str, email: Option<&str>) -> AuthUser {
    AuthUser {
        uid: UserId::new(uid),
        email: email.map(String::from),
        display_name: None,
    }
}

/// Starts the app and answers the session subscription. Returns the live
/// subscription so tests can emit further session changes.
pub fn start_with_session(
    app: &Tester,
    model: &mut Model,
    session: Option<AuthUser>,
) -> Request<AuthOperation> {
    let mut effects = run(app, model, Event::AppStarted);
    let mut observe = auth_requests(&mut effects)
        .pop()
        .expect("app should subscribe to session changes");
    assert!(matches!(
        observe.operation,
        AuthOperation::ObserveSession { .. }
    ));
    resolve(app, model, &mut observe, Ok(AuthOutput::SessionChanged(session)));
    observe
}
