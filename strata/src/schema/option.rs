//! Option declarations: the type, merge strategy, and metadata of one key.

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::schema::KeyPath;
use crate::value::Value;

/// The declared shape of an option's value.
///
/// Types are checked by the validator after merging; the merge engine
/// itself only cares about the declared [`MergeStrategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    /// A boolean toggle.
    Bool,
    /// Free-form text.
    Str,
    /// Text restricted to a fixed set of variants.
    Enum(Vec<String>),
    /// An ordered list of text values.
    StrList,
    /// A non-empty package name resolvable by the build backend.
    PackageRef,
    /// A non-empty service unit name.
    UnitRef,
    /// Either null or a value of the inner type.
    Nullable(Box<OptionType>),
}

impl OptionType {
    /// Check whether a value has this declared shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::{OptionType, Value};
    ///
    /// assert!(OptionType::Bool.matches(&Value::Bool(true)));
    /// assert!(!OptionType::Bool.matches(&Value::Str("true".to_string())));
    ///
    /// let nullable = OptionType::Nullable(Box::new(OptionType::Str));
    /// assert!(nullable.matches(&Value::Null));
    /// assert!(nullable.matches(&Value::Str("x".to_string())));
    /// ```
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Str => matches!(value, Value::Str(_)),
            Self::Enum(variants) => value
                .as_str()
                .map_or(false, |s| variants.iter().any(|v| v == s)),
            Self::StrList => matches!(value, Value::List(_)),
            Self::PackageRef | Self::UnitRef => {
                value.as_str().map_or(false, |s| !s.is_empty())
            }
            Self::Nullable(inner) => value.is_null() || inner.matches(value),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Str => write!(f, "str"),
            Self::Enum(variants) => write!(f, "enum({})", variants.join(", ")),
            Self::StrList => write!(f, "str-list"),
            Self::PackageRef => write!(f, "package"),
            Self::UnitRef => write!(f, "unit"),
            Self::Nullable(inner) => write!(f, "nullable {inner}"),
        }
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool => serializer.serialize_str("bool"),
            Self::Str => serializer.serialize_str("str"),
            Self::StrList => serializer.serialize_str("str-list"),
            Self::PackageRef => serializer.serialize_str("package"),
            Self::UnitRef => serializer.serialize_str("unit"),
            Self::Enum(variants) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("enum", variants)?;
                map.end()
            }
            Self::Nullable(inner) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("nullable", inner)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for OptionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts either a bare type name ("bool"), or a single-key map for
        // the parameterized forms ({enum: [...]}, {nullable: ...}).
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Name(String),
            Enum {
                #[serde(rename = "enum")]
                values: Vec<String>,
            },
            Nullable {
                nullable: Box<Helper>,
            },
        }

        fn convert<E: DeError>(helper: Helper) -> Result<OptionType, E> {
            match helper {
                Helper::Name(name) => match name.as_str() {
                    "bool" => Ok(OptionType::Bool),
                    "str" => Ok(OptionType::Str),
                    "str-list" => Ok(OptionType::StrList),
                    "package" => Ok(OptionType::PackageRef),
                    "unit" => Ok(OptionType::UnitRef),
                    other => Err(E::custom(format!("unknown option type '{other}'"))),
                },
                Helper::Enum { values } => Ok(OptionType::Enum(values)),
                Helper::Nullable { nullable } => {
                    Ok(OptionType::Nullable(Box::new(convert(*nullable)?)))
                }
            }
        }

        convert(Helper::deserialize(deserializer)?)
    }
}

/// How multiple fragment values on the same key are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// The highest-priority value wins outright.
    Override,
    /// Lists are concatenated in submission order.
    ListAppend,
    /// Booleans are combined with logical AND.
    BoolAnd,
    /// Booleans are combined with logical OR.
    BoolOr,
    /// Strings are joined with newlines in submission order.
    Concat,
}

impl MergeStrategy {
    /// Check whether the strategy can combine values of the given type.
    ///
    /// [`Override`](Self::Override) works for every type; the combining
    /// strategies each require the matching shape.
    #[must_use]
    pub fn compatible_with(&self, ty: &OptionType) -> bool {
        match self {
            Self::Override => true,
            Self::ListAppend => matches!(ty, OptionType::StrList),
            Self::BoolAnd | Self::BoolOr => matches!(ty, OptionType::Bool),
            Self::Concat => matches!(ty, OptionType::Str),
        }
    }
}

impl Default for MergeStrategy {
    fn default() -> Self {
        Self::Override
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Override => "override",
            Self::ListAppend => "list-append",
            Self::BoolAnd => "bool-and",
            Self::BoolOr => "bool-or",
            Self::Concat => "concat",
        };
        write!(f, "{name}")
    }
}

/// The declaration of one configuration option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    /// The key path the option lives at.
    pub path: KeyPath,
    /// The declared value shape.
    #[serde(rename = "type")]
    pub ty: OptionType,
    /// How contributions to this key are combined.
    #[serde(default)]
    pub strategy: MergeStrategy,
    /// The value used when no fragment targets the key.
    #[serde(default)]
    pub default: Option<Value>,
    /// Whether validation requires the key to carry a value.
    #[serde(default)]
    pub mandatory: bool,
    /// Human-readable purpose of the option.
    #[serde(default)]
    pub description: String,
    /// An example value for documentation output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl OptionDecl {
    /// Create a declaration with no default and no mandatory flag.
    #[must_use]
    pub fn new(path: KeyPath, ty: OptionType, strategy: MergeStrategy, description: &str) -> Self {
        Self {
            path,
            ty,
            strategy,
            default: None,
            mandatory: false,
            description: description.to_string(),
            example: None,
        }
    }

    /// Set the default value used when no fragment targets the key.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Require the key to carry a value after merging.
    #[must_use]
    pub fn with_mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Attach an example value for documentation output.
    #[must_use]
    pub fn with_example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }
}
