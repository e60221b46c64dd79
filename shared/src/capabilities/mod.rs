mod auth;
mod documents;
mod geolocation;
mod kv;
mod navigation;

pub use self::auth::{
    Auth, AuthError, AuthErrorKind, AuthOperation, AuthOutput, AuthResult, AuthUser, Credentials,
    FederatedProvider,
};
pub use self::documents::{
    DocumentError, DocumentOperation, DocumentOutput, DocumentPath, DocumentResult, Documents,
    StoreErrorKind,
};
pub use self::geolocation::{
    Geolocation, GeolocationOperation, GeolocationResult, LocationError, Position, PositionOptions,
};
pub use self::kv::{
    Kv, KvError, KvKey, KvOperation, KvOutput, KvResult, StorageErrorCode, TypedKv,
};
pub use self::navigation::{Navigation, NavigationOperation, Page};

pub use crux_core::render::Render;

use crate::{event::Event, App};

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub auth: Auth<Event>,
    pub documents: Documents<Event>,
    pub geolocation: Geolocation<Event>,
    pub kv: Kv<Event>,
    pub navigation: Navigation<Event>,
    pub render: Render<Event>,
}
