use std::fmt;

/// Opaque structured payload carried in envelope bodies.
///
/// The session never interprets a `Value` beyond folding map & list
/// mutations into a [`Value::Tagged`] record, so the model is deliberately
/// small. Values are totally ordered so they can key a map lane.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Text(String),
    Data(Vec<u8>),
    /// `@tag(header: value, ..) body`
    Tagged {
        tag: String,
        headers: Vec<(String, Value)>,
        body: Box<Value>,
    },
}

impl Value {
    pub fn tagged(tag: impl Into<String>, headers: Vec<(String, Value)>, body: Value) -> Self {
        Value::Tagged {
            tag: tag.into(),
            headers,
            body: Box::new(body),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns the tag of a tagged record
    pub fn tag(&self) -> Option<&str> {
        match self {
            Value::Tagged { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Looks up a header of a tagged record by name
    pub fn header(&self, name: &str) -> Option<&Value> {
        let Value::Tagged { headers, .. } = self else {
            return None;
        };
        headers
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value)
    }

    /// The body of a tagged record, or the value itself for anything else
    pub fn body(&self) -> &Value {
        match self {
            Value::Tagged { body, .. } => body.as_ref(),
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(number) => Some(*number),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Int(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<Vec<u8>> for Value {
    fn from(data: Vec<u8>) -> Self {
        Value::Data(data)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => Ok(()),
            Value::Bool(flag) => write!(f, "{}", flag),
            Value::Int(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Data(data) => write!(f, "%[{} bytes]", data.len()),
            Value::Tagged { tag, headers, body } => {
                write!(f, "@{}", tag)?;
                if !headers.is_empty() {
                    write!(f, "(")?;
                    for (index, (name, value)) in headers.iter().enumerate() {
                        if index > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}:{}", name, value)?;
                    }
                    write!(f, ")")?;
                }
                if !body.is_absent() {
                    write!(f, " {}", body)?;
                }
                Ok(())
            }
        }
    }
}
