//! Stored records and their CBOR encoding.
//!
//! A record is the full entity snapshot (excluded fields included) plus the
//! caller's opaque signature and optional public key. Records are encoded as
//! a CBOR map with text keys:
//!
//! ```text
//! { "entity": {...}, "public_key": text / null, "signature": text }
//! ```
//!
//! Decoding is an explicit parse step: every required field is checked and a
//! missing or mistyped one fails with [`CoreError::MalformedRecord`] naming it.
//! Nothing is silently defaulted except the optional lists and maps.

use std::io::Cursor;

use bytes::Bytes;
use ciborium::value::{Integer, Value};

use constellation_core::{
    AttrMap, AttrValue, CapabilitiesBlock, CoreError, Entity, IntentBlock, MemoryBlock, Result,
};

/// CBOR map key names.
mod keys {
    pub const ENTITY: &str = "entity";
    pub const SIGNATURE: &str = "signature";
    pub const PUBLIC_KEY: &str = "public_key";

    pub const ID: &str = "id";
    pub const DISPLAY_NAME: &str = "display_name";
    pub const MASS: &str = "mass";
    pub const GRAVITY: &str = "gravity";
    pub const INTENT: &str = "intent";
    pub const CAPABILITIES: &str = "capabilities";
    pub const MEMORY: &str = "memory";
    pub const TRUST: &str = "trust";

    pub const MISSION: &str = "mission";
    pub const CONSTRAINTS: &str = "constraints";
    pub const INTERFACES: &str = "interfaces";
    pub const SKILLS: &str = "skills";
    pub const COMPUTE_PROFILE: &str = "compute_profile";
    pub const CONTINUITY_HASH: &str = "continuity_hash";
    pub const SUMMARIES: &str = "summaries";
    pub const ATTACHMENTS: &str = "attachments";
}

/// What the store keeps under an integrity hash.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub entity: Entity,
    /// Opaque; never verified.
    pub signature: String,
    /// Opaque; never verified.
    pub public_key: Option<String>,
}

impl StoredRecord {
    pub fn new(entity: Entity, signature: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            entity,
            signature: signature.into(),
            public_key,
        }
    }

    /// Encode to CBOR bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = Vec::new();
        ciborium::into_writer(&self.to_value(), &mut buf)
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    /// Decode from CBOR bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let value: Value = ciborium::from_reader(Cursor::new(bytes))
            .map_err(|e| CoreError::DecodingError(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Convert to a CBOR value.
    pub fn to_value(&self) -> Value {
        let public_key = match &self.public_key {
            Some(pk) => Value::Text(pk.clone()),
            None => Value::Null,
        };
        map(vec![
            (keys::ENTITY, entity_to_value(&self.entity)),
            (keys::SIGNATURE, Value::Text(self.signature.clone())),
            (keys::PUBLIC_KEY, public_key),
        ])
    }

    /// Parse a CBOR value back into a record.
    pub fn from_value(value: &Value) -> Result<Self> {
        let fields = Fields::new(value, "record")?;
        let entity = entity_from_value(fields.required(keys::ENTITY)?)?;
        let signature = text(fields.required(keys::SIGNATURE)?, "record.signature")?;
        let public_key = match fields.optional(keys::PUBLIC_KEY) {
            None | Some(Value::Null) => None,
            Some(v) => Some(text(v, "record.public_key")?),
        };
        Ok(Self {
            entity,
            signature,
            public_key,
        })
    }
}

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (Value::Text(k.to_string()), v))
            .collect(),
    )
}

fn text_list_value(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::Text(s.clone())).collect())
}

fn attr_to_value(attr: &AttrValue) -> Value {
    match attr {
        AttrValue::Bool(b) => Value::Bool(*b),
        AttrValue::Integer(i) => Value::Integer((*i).into()),
        AttrValue::Float(f) => Value::Float(*f),
        AttrValue::Text(s) => Value::Text(s.clone()),
        AttrValue::List(items) => Value::Array(items.iter().map(attr_to_value).collect()),
    }
}

fn attr_map_value(attrs: &AttrMap) -> Value {
    Value::Map(
        attrs
            .iter()
            .map(|(k, v)| (Value::Text(k.clone()), attr_to_value(v)))
            .collect(),
    )
}

fn entity_to_value(entity: &Entity) -> Value {
    map(vec![
        (keys::ID, Value::Text(entity.id.clone())),
        (keys::DISPLAY_NAME, Value::Text(entity.display_name.clone())),
        (keys::MASS, Value::Float(entity.mass)),
        (keys::GRAVITY, Value::Float(entity.gravity)),
        (
            keys::INTENT,
            map(vec![
                (keys::MISSION, Value::Text(entity.intent.mission.clone())),
                (
                    keys::CONSTRAINTS,
                    text_list_value(&entity.intent.constraints),
                ),
            ]),
        ),
        (
            keys::CAPABILITIES,
            map(vec![
                (
                    keys::INTERFACES,
                    text_list_value(&entity.capabilities.interfaces),
                ),
                (keys::SKILLS, text_list_value(&entity.capabilities.skills)),
                (
                    keys::COMPUTE_PROFILE,
                    attr_map_value(&entity.capabilities.compute_profile),
                ),
            ]),
        ),
        (
            keys::MEMORY,
            map(vec![
                (
                    keys::CONTINUITY_HASH,
                    Value::Text(entity.memory.continuity_hash.clone()),
                ),
                (keys::SUMMARIES, text_list_value(&entity.memory.summaries)),
                (
                    keys::ATTACHMENTS,
                    text_list_value(&entity.memory.attachments),
                ),
            ]),
        ),
        (keys::TRUST, attr_map_value(&entity.trust)),
    ])
}

/// A CBOR map being parsed, with the dotted path used in error messages.
struct Fields<'a> {
    path: String,
    entries: &'a [(Value, Value)],
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value, path: &str) -> Result<Self> {
        match value {
            Value::Map(entries) => Ok(Self {
                path: path.to_string(),
                entries,
            }),
            _ => Err(CoreError::invalid(path, "a map")),
        }
    }

    fn path_of(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Value::Text(t) if t == key))
            .map(|(_, v)| v)
    }

    fn required(&self, key: &str) -> Result<&'a Value> {
        self.optional(key)
            .ok_or_else(|| CoreError::missing(&self.path_of(key)))
    }

    fn nested(&self, key: &str) -> Result<Fields<'a>> {
        Fields::new(self.required(key)?, &self.path_of(key))
    }

    fn text(&self, key: &str) -> Result<String> {
        text(self.required(key)?, &self.path_of(key))
    }

    fn number(&self, key: &str) -> Result<f64> {
        let path = self.path_of(key);
        match self.required(key)? {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(i128::from(*i) as f64),
            _ => Err(CoreError::invalid(&path, "a number")),
        }
    }

    /// Absent lists decode as empty.
    fn text_list(&self, key: &str) -> Result<Vec<String>> {
        let path = self.path_of(key);
        match self.optional(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| text(item, &path)).collect(),
            Some(_) => Err(CoreError::invalid(&path, "a list of text")),
        }
    }

    /// Absent maps decode as empty.
    fn attr_map(&self, key: &str) -> Result<AttrMap> {
        let path = self.path_of(key);
        match self.optional(key) {
            None => Ok(AttrMap::new()),
            Some(Value::Map(entries)) => entries
                .iter()
                .map(|(k, v)| -> Result<(String, AttrValue)> {
                    let name = text(k, &path)?;
                    let attr = attr_from_value(v, &format!("{path}.{name}"))?;
                    Ok((name, attr))
                })
                .collect(),
            Some(_) => Err(CoreError::invalid(&path, "a map")),
        }
    }
}

fn text(value: &Value, path: &str) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        _ => Err(CoreError::invalid(path, "text")),
    }
}

fn attr_from_value(value: &Value, path: &str) -> Result<AttrValue> {
    Ok(match value {
        Value::Bool(b) => AttrValue::Bool(*b),
        Value::Integer(i) => AttrValue::Integer(integer(*i, path)?),
        Value::Float(f) => AttrValue::Float(*f),
        Value::Text(s) => AttrValue::Text(s.clone()),
        Value::Array(items) => AttrValue::List(
            items
                .iter()
                .map(|item| attr_from_value(item, path))
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => return Err(CoreError::invalid(path, "a scalar or list")),
    })
}

fn integer(i: Integer, path: &str) -> Result<i64> {
    i64::try_from(i128::from(i)).map_err(|_| CoreError::invalid(path, "a 64-bit integer"))
}

fn entity_from_value(value: &Value) -> Result<Entity> {
    let fields = Fields::new(value, "entity")?;

    let id = fields.text(keys::ID)?;
    let display_name = fields.text(keys::DISPLAY_NAME)?;
    let mass = fields.number(keys::MASS)?;
    let gravity = fields.number(keys::GRAVITY)?;

    let intent = fields.nested(keys::INTENT)?;
    let capabilities = fields.nested(keys::CAPABILITIES)?;
    let memory = fields.nested(keys::MEMORY)?;

    Ok(Entity {
        id,
        display_name,
        mass,
        gravity,
        intent: IntentBlock {
            mission: intent.text(keys::MISSION)?,
            constraints: intent.text_list(keys::CONSTRAINTS)?,
        },
        capabilities: CapabilitiesBlock {
            interfaces: capabilities.text_list(keys::INTERFACES)?,
            skills: capabilities.text_list(keys::SKILLS)?,
            compute_profile: capabilities.attr_map(keys::COMPUTE_PROFILE)?,
        },
        memory: MemoryBlock {
            continuity_hash: memory.text(keys::CONTINUITY_HASH)?,
            summaries: memory.text_list(keys::SUMMARIES)?,
            attachments: memory.text_list(keys::ATTACHMENTS)?,
        },
        trust: fields.attr_map(keys::TRUST)?,
    })
}
