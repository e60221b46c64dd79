use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const MAX_SEGMENT_LENGTH: usize = 1500;

/// `collection/id` address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Result<Self, DocumentError> {
        let collection = collection.into();
        let id = id.into();
        validate_segment(&collection)?;
        validate_segment(&id)?;
        Ok(Self { collection, id })
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

pub fn validate_segment(segment: &str) -> Result<(), DocumentError> {
    let reason = if segment.trim().is_empty() {
        "path segment cannot be empty"
    } else if segment.len() > MAX_SEGMENT_LENGTH {
        "path segment too long"
    } else if segment.contains('/') {
        "path segment cannot contain '/'"
    } else if segment == "." || segment == ".." {
        "path segment cannot be '.' or '..'"
    } else {
        return Ok(());
    };
    Err(DocumentError::new(
        StoreErrorKind::InvalidPath,
        format!("{reason}: {segment:?}"),
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum DocumentOperation {
    Get {
        path: DocumentPath,
    },
    /// Replaces the whole document.
    Set {
        path: DocumentPath,
        data: Value,
    },
    /// Merges `fields` into an existing document.
    Update {
        path: DocumentPath,
        fields: Value,
    },
    /// Creates a document with a store-assigned id. Each name in
    /// `server_timestamp_fields` is filled with the store's commit time.
    Add {
        collection: String,
        data: Value,
        server_timestamp_fields: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DocumentOutput {
    Snapshot(Option<Value>),
    Written,
    Added { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    ReadFailed,
    WriteFailed,
    PermissionDenied,
    Unavailable,
    InvalidPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct DocumentError {
    pub kind: StoreErrorKind,
    #[serde(default)]
    pub message: String,
}

impl DocumentError {
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unexpected(output: &DocumentOutput) -> Self {
        Self::new(
            StoreErrorKind::ReadFailed,
            format!("unexpected store output: {output:?}"),
        )
    }
}

pub type DocumentResult = Result<DocumentOutput, DocumentError>;

impl Operation for DocumentOperation {
    type Output = DocumentResult;
}

pub struct Documents<E> {
    context: CapabilityContext<DocumentOperation, E>,
}

impl<Ev> Capability<Ev> for Documents<Ev> {
    type Operation = DocumentOperation;
    type MappedSelf<MappedEv> = Documents<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Documents::new(self.context.map_event(f))
    }
}

impl<E> Documents<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<DocumentOperation, E>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, path: DocumentPath, make_event: F)
    where
        F: FnOnce(DocumentResult) -> E + Send + 'static,
    {
        self.request(DocumentOperation::Get { path }, make_event);
    }

    pub fn set<F>(&self, path: DocumentPath, data: Value, make_event: F)
    where
        F: FnOnce(DocumentResult) -> E + Send + 'static,
    {
        self.request(DocumentOperation::Set { path, data }, make_event);
    }

    pub fn update<F>(&self, path: DocumentPath, fields: Value, make_event: F)
    where
        F: FnOnce(DocumentResult) -> E + Send + 'static,
    {
        self.request(DocumentOperation::Update { path, fields }, make_event);
    }

    pub fn add<F>(
        &self,
        collection: impl Into<String>,
        data: Value,
        server_timestamp_fields: Vec<String>,
        make_event: F,
    ) where
        F: FnOnce(DocumentResult) -> E + Send + 'static,
    {
        self.request(
            DocumentOperation::Add {
                collection: collection.into(),
                data,
                server_timestamp_fields,
            },
            make_event,
        );
    }

    fn request<F>(&self, operation: DocumentOperation, make_event: F)
    where
        F: FnOnce(DocumentResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(result));
        });
    }
}
