//! Block property definitions: named, finite-valued axes of block variation.
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;

use kstring::KString;
use smallvec::SmallVec;
use thiserror::Error;

use crate::tags::EnumValue;

/// Possible errors from property construction and value parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A string did not parse to a member of the property's value domain.
    #[error("`{value}` is not a legal value for property `{property}`")]
    InvalidValue {
        /// The property whose domain was searched.
        property: KString,
        /// The rejected input string.
        value: String,
    },
    /// Two admitted enum values collide on their canonical serialized name.
    #[error("multiple values of property `{property}` share the serialized name `{name}`")]
    DuplicateName {
        /// The property under construction.
        property: KString,
        /// The colliding canonical name.
        name: &'static str,
    },
}

/// The semantic kind of a property.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PropertyKind {
    /// Two-valued true/false property.
    Bool,
    /// Bounded inclusive integer range property.
    Int,
    /// Ordered subset of a closed tag family.
    Enum,
}

/// One concrete value of a property.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum PropertyValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i32),
    /// A tag value.
    Enum(EnumValue),
}

impl PropertyValue {
    /// The kind of this value.
    pub const fn kind(self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Enum(_) => PropertyKind::Enum,
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Enum(v) => write!(f, "{v}"),
        }
    }
}

impl Debug for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<EnumValue> for PropertyValue {
    fn from(value: EnumValue) -> Self {
        PropertyValue::Enum(value)
    }
}

/// The finite ordered value domain of a property, one case per [`PropertyKind`].
#[derive(Clone, Debug, Eq, PartialEq)]
enum PropertyDomain {
    Bool,
    Int { min: i32, max: i32 },
    Enum { values: SmallVec<[EnumValue; 6]> },
}

/// A named, typed, finite-valued axis of block variation.
///
/// Identity is the serialized key alone: two properties are equal iff their keys match,
/// which makes them usable as map keys across construction sites as long as key names
/// are coordinated through [`crate::properties::canonical`].
#[derive(Clone)]
pub struct Property {
    key: KString,
    domain: PropertyDomain,
}

impl Property {
    /// Creates a true/false property.
    pub fn boolean(key: &str) -> Self {
        Self {
            key: KString::from_ref(key),
            domain: PropertyDomain::Bool,
        }
    }

    /// Creates an integer property spanning `min..=max`.
    ///
    /// Panics if the range is empty; bounds come from the compile-time property table,
    /// so an empty range is a programming error, not input data.
    pub fn integer(key: &str, min: i32, max: i32) -> Self {
        assert!(min <= max, "integer property `{key}` has an empty range {min}..={max}");
        Self {
            key: KString::from_ref(key),
            domain: PropertyDomain::Int { min, max },
        }
    }

    /// Creates an enum property admitting the given ordered tag subset.
    pub fn enumerated(
        key: &str,
        values: impl IntoIterator<Item = EnumValue>,
    ) -> Result<Self, PropertyError> {
        let values: SmallVec<[EnumValue; 6]> = values.into_iter().collect();
        for (i, value) in values.iter().enumerate() {
            if values[..i]
                .iter()
                .any(|prev| prev.serialized_name() == value.serialized_name())
            {
                return Err(PropertyError::DuplicateName {
                    property: KString::from_ref(key),
                    name: value.serialized_name(),
                });
            }
        }
        Ok(Self {
            key: KString::from_ref(key),
            domain: PropertyDomain::Enum { values },
        })
    }

    /// The serialized key of this property (e.g. `"facing"`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The semantic kind of this property.
    pub fn kind(&self) -> PropertyKind {
        match &self.domain {
            PropertyDomain::Bool => PropertyKind::Bool,
            PropertyDomain::Int { .. } => PropertyKind::Int,
            PropertyDomain::Enum { .. } => PropertyKind::Enum,
        }
    }

    /// The inclusive bounds of an integer property, `None` for other kinds.
    pub fn int_bounds(&self) -> Option<RangeInclusive<i32>> {
        match &self.domain {
            PropertyDomain::Int { min, max } => Some(*min..=*max),
            _ => None,
        }
    }

    /// The admitted tags of an enum property, empty for other kinds.
    pub fn enum_values(&self) -> &[EnumValue] {
        match &self.domain {
            PropertyDomain::Enum { values } => values,
            _ => &[],
        }
    }

    /// Iterates over the full value domain in canonical order.
    pub fn values(&self) -> PropertyValues<'_> {
        PropertyValues {
            inner: match &self.domain {
                PropertyDomain::Bool => ValuesInner::Bool([true, false].into_iter()),
                PropertyDomain::Int { min, max } => ValuesInner::Int(*min..=*max),
                PropertyDomain::Enum { values } => ValuesInner::Enum(values.iter()),
            },
        }
    }

    /// The number of values in the domain.
    pub fn value_count(&self) -> usize {
        match &self.domain {
            PropertyDomain::Bool => 2,
            PropertyDomain::Int { min, max } => (*max - *min) as usize + 1,
            PropertyDomain::Enum { values } => values.len(),
        }
    }

    /// Checks whether the given value is a member of this property's domain.
    pub fn contains(&self, value: PropertyValue) -> bool {
        match (&self.domain, value) {
            (PropertyDomain::Bool, PropertyValue::Bool(_)) => true,
            (PropertyDomain::Int { min, max }, PropertyValue::Int(v)) => (*min..=*max).contains(&v),
            (PropertyDomain::Enum { values }, PropertyValue::Enum(v)) => values.contains(&v),
            _ => false,
        }
    }

    /// Parses a serialized value string into a domain member.
    ///
    /// Booleans accept exactly `"true"`/`"false"`, integers any in-range base-10
    /// number, enums any admitted tag's canonical name after ASCII case-folding.
    pub fn value_from_str(&self, value: &str) -> Result<PropertyValue, PropertyError> {
        let invalid = || PropertyError::InvalidValue {
            property: self.key.clone(),
            value: value.to_owned(),
        };
        match &self.domain {
            PropertyDomain::Bool => match value {
                "true" => Ok(PropertyValue::Bool(true)),
                "false" => Ok(PropertyValue::Bool(false)),
                _ => Err(invalid()),
            },
            PropertyDomain::Int { min, max } => {
                let parsed: i32 = value.parse().map_err(|_| invalid())?;
                if (*min..=*max).contains(&parsed) {
                    Ok(PropertyValue::Int(parsed))
                } else {
                    Err(invalid())
                }
            }
            PropertyDomain::Enum { values } => {
                let folded = value.to_ascii_lowercase();
                values
                    .iter()
                    .find(|v| v.serialized_name() == folded)
                    .map(|&v| PropertyValue::Enum(v))
                    .ok_or_else(invalid)
            }
        }
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Debug for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Property{{key={}, kind={:?}}}", self.key, self.kind())
    }
}

/// Iterator over a property's value domain, see [`Property::values`].
pub struct PropertyValues<'a> {
    inner: ValuesInner<'a>,
}

enum ValuesInner<'a> {
    Bool(std::array::IntoIter<bool, 2>),
    Int(RangeInclusive<i32>),
    Enum(std::slice::Iter<'a, EnumValue>),
}

impl<'a> Iterator for PropertyValues<'a> {
    type Item = PropertyValue;

    fn next(&mut self) -> Option<PropertyValue> {
        match &mut self.inner {
            ValuesInner::Bool(it) => it.next().map(PropertyValue::Bool),
            ValuesInner::Int(it) => it.next().map(PropertyValue::Int),
            ValuesInner::Enum(it) => it.next().map(|&v| PropertyValue::Enum(v)),
        }
    }
}
