//! Typed values of the `.smh` parameter dictionary

use ndarray::Array2;
use serde::Serialize;

/// Type tag of a parameter line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    String,
    UInt32,
    UInt64,
    /// `REAL32` in the file, held as f64
    Real,
}

impl ValueKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "String" => Some(ValueKind::String),
            "UINT32" => Some(ValueKind::UInt32),
            "UINT64" => Some(ValueKind::UInt64),
            "REAL32" => Some(ValueKind::Real),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::UInt32 => "UINT32",
            ValueKind::UInt64 => "UINT64",
            ValueKind::Real => "REAL32",
        }
    }
}

/// A single primitive value. `Null` marks a value that could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Str(String),
    UInt32(u32),
    UInt64(u64),
    Real(f64),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Integer view. Reals are truncated, strings are parsed.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::UInt32(v) => Some(u64::from(*v)),
            Scalar::UInt64(v) => Some(*v),
            Scalar::Real(v) if v.is_finite() && *v >= 0.0 => Some(v.trunc() as u64),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::UInt32(v) => Some(f64::from(*v)),
            Scalar::UInt64(v) => Some(*v as f64),
            Scalar::Real(v) => Some(*v),
            Scalar::Str(s) => s.trim().parse().ok(),
            Scalar::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Parameter value: a scalar, an ordered list or a 2D matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Matrix(Array2<Scalar>),
}

impl Value {
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(Scalar::Null))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<Scalar>> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_scalar().and_then(Scalar::as_u64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Shape metadata matching this value.
    pub fn count(&self) -> Count {
        match self {
            Value::Scalar(_) => Count::One,
            Value::List(v) => Count::Length(v.len()),
            Value::Matrix(m) => Count::Shape(m.nrows(), m.ncols()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Scalar(Scalar::UInt32(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Scalar(Scalar::UInt64(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Real(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::Str(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::Str(v))
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(v: Vec<Scalar>) -> Self {
        Value::List(v)
    }
}

impl From<Array2<Scalar>> for Value {
    fn from(m: Array2<Scalar>) -> Self {
        Value::Matrix(m)
    }
}

/// Declared size of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Count {
    One,
    Length(usize),
    Shape(usize, usize),
}

impl Count {
    /// Upper bound for indexed access (rows for a matrix).
    pub fn index_bound(self) -> usize {
        match self {
            Count::One => 1,
            Count::Length(n) => n,
            Count::Shape(rows, _) => rows,
        }
    }
}

/// One dictionary entry: type tag, declared count and value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterEntry {
    pub kind: ValueKind,
    count: Count,
    value: Value,
}

impl ParameterEntry {
    pub fn new(kind: ValueKind, value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            kind,
            count: value.count(),
            value,
        }
    }

    pub fn null(kind: ValueKind) -> Self {
        Self::new(kind, Value::NULL)
    }

    pub fn count(&self) -> Count {
        self.count
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replaces the value; the count follows the new value, the kind is kept.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        self.count = self.value.count();
    }

    /// Element `index` of a list, row `index` of a matrix, or the scalar
    /// itself for index 0. `None` when out of bounds.
    pub fn indexed(&self, index: usize) -> Option<Value> {
        if index >= self.count.index_bound() {
            return None;
        }
        match &self.value {
            Value::Scalar(s) => Some(Value::Scalar(s.clone())),
            Value::List(v) => v.get(index).cloned().map(Value::Scalar),
            Value::Matrix(m) => Some(Value::List(m.row(index).to_vec())),
        }
    }
}
