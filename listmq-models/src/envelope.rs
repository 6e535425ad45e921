use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub const CONTENT_TYPE_PROPERTY: &str = "content_type";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub type Properties = BTreeMap<String, Value>;

/// Named destination; the name is used verbatim as the broker list key.
///
/// A pipe may point at another pipe as its dead letter. Cycles in that chain
/// are not detected. Properties stay local and never reach the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    name: String,
    dead_letter: Option<Box<Pipe>>,
    properties: Properties,
}

impl Pipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dead_letter: None,
            properties: Properties::new(),
        }
    }

    pub fn with_dead_letter(mut self, pipe: Pipe) -> Self {
        self.dead_letter = Some(Box::new(pipe));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dead_letter(&self) -> Option<&Pipe> {
        self.dead_letter.as_deref()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Payload unit. Only `body` crosses the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    body: Vec<u8>,
    properties: Properties,
}

impl Message {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns a copy carrying `key` only if the property is not already set.
    pub fn with_default_property(&self, key: &str, value: impl Into<Value>) -> Self {
        let mut message = self.clone();
        message
            .properties
            .entry(key.to_string())
            .or_insert_with(|| value.into());
        message
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// A pipe and a message travelling together.
///
/// Envelopes are never changed after construction; re-publishing builds a
/// fresh one so the received envelope stays a faithful record.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pipe: Pipe,
    message: Message,
}

impl Envelope {
    pub fn new(pipe: Pipe, message: Message) -> Self {
        Self { pipe, message }
    }

    pub fn pipe(&self) -> &Pipe {
        &self.pipe
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_parts(self) -> (Pipe, Message) {
        (self.pipe, self.message)
    }
}
