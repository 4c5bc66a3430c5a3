use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value indirection for themeable fields.
///
/// On the wire a `Value` is the bare literal, a `Constant` is `{"type":"CONSTANT","value":..}` and a
/// `Variable` is `{"type":"VARIABLE","id":..,"fallback":..}`. Freshly extracted trees only hold
/// `Value`; theming promotes literals to `Variable`.
#[derive(Clone, Debug, PartialEq)]
pub enum Indirect<T> {
    Value(T),
    Constant(T),
    Variable { id: String, fallback: T },
}

/// Which form an [`Indirect`] takes, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndirectKind {
    Value,
    Constant,
    Variable,
}

impl<T> Indirect<T> {
    pub fn kind(&self) -> IndirectKind {
        match self {
            Self::Value(_) => IndirectKind::Value,
            Self::Constant(_) => IndirectKind::Constant,
            Self::Variable { .. } => IndirectKind::Variable,
        }
    }

    /// The literal a renderer starts from: the value, the constant, or the variable's fallback.
    pub fn literal(&self) -> &T {
        match self {
            Self::Value(v) | Self::Constant(v) => v,
            Self::Variable { fallback, .. } => fallback,
        }
    }

    pub fn variable_id(&self) -> Option<&str> {
        match self {
            Self::Variable { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn variable(id: impl Into<String>, fallback: T) -> Self {
        Self::Variable {
            id: id.into(),
            fallback,
        }
    }
}

impl<T> From<T> for Indirect<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Tagged<T> {
    #[serde(rename = "CONSTANT")]
    Constant { value: T },
    #[serde(rename = "VARIABLE")]
    Variable { id: String, fallback: T },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum TaggedRef<'a, T> {
    #[serde(rename = "CONSTANT")]
    Constant { value: &'a T },
    #[serde(rename = "VARIABLE")]
    Variable { id: &'a str, fallback: &'a T },
}

impl<T: Serialize> Serialize for Indirect<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Constant(value) => TaggedRef::Constant { value }.serialize(serializer),
            Self::Variable { id, fallback } => {
                TaggedRef::Variable { id, fallback }.serialize(serializer)
            }
        }
    }
}

impl<'de, T> Deserialize<'de> for Indirect<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Tagged(Tagged<T>),
            Literal(T),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Tagged(Tagged::Constant { value }) => Ok(Self::Constant(value)),
            Repr::Tagged(Tagged::Variable { id, fallback }) => Ok(Self::Variable { id, fallback }),
            Repr::Literal(v) => Ok(Self::Value(v)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/value.rs"]
mod tests;
