use crate::error::PdfError;
use quire_object::{Dictionary, Value};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Header version written when none is configured.
pub const DEFAULT_VERSION: &str = "1.3";

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    #[default]
    Letter,
    Legal,
    A3,
    A4,
    A5,
    Tabloid,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn dimensions_pt(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }

    /// `[0 0 width height]`
    pub fn media_box(&self) -> Value {
        let (width, height) = self.dimensions_pt();
        Value::Array(vec![0.into(), 0.into(), width.into(), height.into()])
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "tabloid" => Ok(PageSize::Tabloid),
            _ => Err(format!("Unknown page size: {}", s)),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageSize::Letter => serializer.serialize_str("Letter"),
            PageSize::Legal => serializer.serialize_str("Legal"),
            PageSize::A3 => serializer.serialize_str("A3"),
            PageSize::A4 => serializer.serialize_str("A4"),
            PageSize::A5 => serializer.serialize_str("A5"),
            PageSize::Tabloid => serializer.serialize_str("Tabloid"),
            PageSize::Custom { width, height } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("width", width)?;
                map.serialize_entry("height", height)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageSizeDef {
            Str(String),
            Map { width: f64, height: f64 },
        }

        match PageSizeDef::deserialize(deserializer)? {
            PageSizeDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            PageSizeDef::Map { width, height } => Ok(PageSize::Custom { width, height }),
        }
    }
}

/// Settings that shape a document and its rendered file.
///
/// `info` and `trailer` are free-form JSON objects; they are converted to
/// PDF dictionaries with strings becoming text, whole numbers integers and
/// other numbers reals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub version: String,
    pub page_size: PageSize,
    pub compress: bool,
    pub compact: bool,
    pub info: Map<String, JsonValue>,
    pub trailer: Map<String, JsonValue>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            page_size: PageSize::default(),
            compress: false,
            compact: true,
            info: Map::new(),
            trailer: Map::new(),
        }
    }
}

impl DocumentOptions {
    pub fn from_json(json: &str) -> Result<Self, PdfError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn info_dictionary(&self) -> Dictionary {
        json_object_to_dictionary(&self.info)
    }

    pub fn trailer_dictionary(&self) -> Dictionary {
        json_object_to_dictionary(&self.trailer)
    }
}

pub fn json_object_to_dictionary(map: &Map<String, JsonValue>) -> Dictionary {
    map.iter().map(|(key, value)| (key.as_str(), json_to_value(value))).collect()
}

pub fn json_to_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        JsonValue::Object(map) => Value::Dictionary(json_object_to_dictionary(map)),
    }
}
