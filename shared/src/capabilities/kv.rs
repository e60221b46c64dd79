use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
/// Browser local storage rarely allows more than 5 MiB per origin.
pub const MAX_VALUE_SIZE: usize = 5 * 1024 * 1024;

/// Key into the shell's device-local string store. Stored verbatim, so the
/// raw key is what other pages of the app read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KvKey(String);

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(key: &str) -> Result<(), KvError> {
        let invalid = |reason: &str| KvError::InvalidKey {
            key: key.chars().take(50).collect(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(invalid("key exceeds maximum length"));
        }
        if key.chars().any(char::is_control) {
            return Err(invalid("key contains control characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum KvOperation {
    Get { key: KvKey },
    Set { key: KvKey, value: Vec<u8> },
}

impl KvOperation {
    pub fn set(key: KvKey, value: Vec<u8>) -> Result<Self, KvError> {
        if value.len() > MAX_VALUE_SIZE {
            return Err(KvError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(Self::Set { key, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum KvOutput {
    Value(Option<Vec<u8>>),
    Written,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message} (code: {code:?}, retryable: {retryable})")]
    Storage {
        code: StorageErrorCode,
        message: String,
        retryable: bool,
    },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("quota exceeded")]
    QuotaExceeded,
}

impl KvError {
    pub fn storage(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    fn serialization(e: &serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageErrorCode {
    Unknown,
    /// Storage disabled, e.g. private browsing or blocked cookies.
    Unavailable,
    PermissionDenied,
    Busy,
}

impl StorageErrorCode {
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Busy)
    }
}

pub type KvResult = Result<KvOutput, KvError>;

impl Operation for KvOperation {
    type Output = KvResult;
}

/// JSON view over a single key.
pub struct TypedKv<T> {
    key: KvKey,
    _phantom: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> TypedKv<T> {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        Ok(Self {
            key: KvKey::new(key)?,
            _phantom: PhantomData,
        })
    }

    #[must_use]
    pub fn key(&self) -> &KvKey {
        &self.key
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, KvError> {
        serde_json::to_vec(value).map_err(|e| KvError::serialization(&e))
    }

    pub fn decode(&self, output: KvOutput) -> Result<Option<T>, KvError> {
        match output {
            KvOutput::Value(Some(bytes)) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KvError::serialization(&e)),
            KvOutput::Value(None) => Ok(None),
            other => Err(KvError::storage(
                StorageErrorCode::Unknown,
                format!("unexpected output: {other:?}"),
            )),
        }
    }
}

pub struct Kv<E> {
    context: CapabilityContext<KvOperation, E>,
}

impl<Ev> Capability<Ev> for Kv<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = Kv<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Kv::new(self.context.map_event(f))
    }
}

impl<E> Kv<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<KvOperation, E>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> E + Send + 'static,
    {
        self.request(KvOperation::Get { key }, make_event);
    }

    /// Oversized values fail locally without reaching the shell.
    pub fn set<F>(&self, key: KvKey, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(KvResult) -> E + Send + 'static,
    {
        match KvOperation::set(key, value) {
            Ok(operation) => self.request(operation, make_event),
            Err(e) => {
                let ctx = self.context.clone();
                self.context.spawn(async move {
                    ctx.update_app(make_event(Err(e)));
                });
            }
        }
    }

    fn request<F>(&self, operation: KvOperation, make_event: F)
    where
        F: FnOnce(KvResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(result));
        });
    }
}
