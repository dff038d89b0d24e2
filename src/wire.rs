//! Binary typed-array codec for widget state.
//!
//! Numeric channels travel as `{dtype, value, shape, type}` objects whose
//! `value` holds little-endian element bytes, base64-encoded inside JSON.
//! Two-dimensional arrays are split into rows on decode and joined again on
//! encode.

use serde::{Deserialize, Serialize};

use crate::data::Values;
use crate::error::{PlotError, Result};

/// Element type of a wire array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
}

impl DType {
    /// Parse a dtype tag such as `float64`.
    pub fn from_name(name: &str) -> Result<Self> {
        let dtype = match name {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            other => return Err(PlotError::UnsupportedDtype(other.to_string())),
        };
        Ok(dtype)
    }

    /// Wire tag.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Bytes per element.
    pub fn size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// Decoded elements, kept in their wire type so re-encoding is exact.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    /// `int8` elements.
    Int8(Vec<i8>),
    /// `int16` elements.
    Int16(Vec<i16>),
    /// `int32` elements.
    Int32(Vec<i32>),
    /// `uint8` elements.
    Uint8(Vec<u8>),
    /// `uint16` elements.
    Uint16(Vec<u16>),
    /// `uint32` elements.
    Uint32(Vec<u32>),
    /// `float32` elements.
    Float32(Vec<f32>),
    /// `float64` elements.
    Float64(Vec<f64>),
}

macro_rules! decode_le {
    ($bytes:expr, $ty:ty, $variant:ident) => {
        TypedArray::$variant(
            $bytes
                .chunks_exact(std::mem::size_of::<$ty>())
                .map(|chunk| {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(chunk);
                    <$ty>::from_le_bytes(raw)
                })
                .collect(),
        )
    };
}

impl TypedArray {
    /// Decode little-endian element bytes.
    pub fn from_le_bytes(dtype: DType, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % dtype.size() != 0 {
            return Err(PlotError::Deserialize(format!(
                "{} bytes is not a whole number of {} elements",
                bytes.len(),
                dtype.name()
            )));
        }
        let array = match dtype {
            DType::Int8 => decode_le!(bytes, i8, Int8),
            DType::Int16 => decode_le!(bytes, i16, Int16),
            DType::Int32 => decode_le!(bytes, i32, Int32),
            DType::Uint8 => TypedArray::Uint8(bytes.to_vec()),
            DType::Uint16 => decode_le!(bytes, u16, Uint16),
            DType::Uint32 => decode_le!(bytes, u32, Uint32),
            DType::Float32 => decode_le!(bytes, f32, Float32),
            DType::Float64 => decode_le!(bytes, f64, Float64),
        };
        Ok(array)
    }

    /// Encode the elements as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::Int8(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Int16(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Int32(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Uint8(values) => values.clone(),
            Self::Uint16(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Uint32(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Float32(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Float64(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Element type of the array.
    pub fn dtype(&self) -> DType {
        match self {
            Self::Int8(_) => DType::Int8,
            Self::Int16(_) => DType::Int16,
            Self::Int32(_) => DType::Int32,
            Self::Uint8(_) => DType::Uint8,
            Self::Uint16(_) => DType::Uint16,
            Self::Uint32(_) => DType::Uint32,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(values) => values.len(),
            Self::Int16(values) => values.len(),
            Self::Int32(values) => values.len(),
            Self::Uint8(values) => values.len(),
            Self::Uint16(values) => values.len(),
            Self::Uint32(values) => values.len(),
            Self::Float32(values) => values.len(),
            Self::Float64(values) => values.len(),
        }
    }

    /// Check whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every element to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Int8(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Int16(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Int32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Uint8(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Uint16(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Uint32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Float32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            Self::Float64(values) => values.clone(),
        }
    }
}

/// JSON form of a typed array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireArray {
    /// Element type tag, e.g. `float64`.
    pub dtype: String,
    /// Little-endian element bytes, base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
    /// `[len]` or `[rows, columns]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    /// `"date"` when elements are epoch milliseconds.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// A decoded array with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    /// Flat elements in row-major order.
    pub values: TypedArray,
    /// `(rows, columns)` for two-dimensional arrays.
    pub shape: Option<(usize, usize)>,
    /// Elements are milliseconds since the Unix epoch.
    pub date: bool,
}

impl ArrayData {
    /// A one-dimensional array.
    pub fn new(values: TypedArray) -> Self {
        Self {
            values,
            shape: None,
            date: false,
        }
    }

    /// Join equal-length rows into a two-dimensional `float64` array.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return Err(PlotError::Deserialize(
                "rows of a two-dimensional array differ in length".to_string(),
            ));
        }
        Ok(Self {
            values: TypedArray::Float64(rows.concat()),
            shape: Some(if columns == 0 { (0, 0) } else { (rows.len(), columns) }),
            date: false,
        })
    }

    /// Mark the elements as dates.
    pub fn with_date(mut self, date: bool) -> Self {
        self.date = date;
        self
    }

    /// Decode a wire array, checking its dtype, byte length and shape.
    pub fn decode(wire: &WireArray) -> Result<Self> {
        let dtype = DType::from_name(&wire.dtype)?;
        let values = TypedArray::from_le_bytes(dtype, &wire.value)?;
        let shape = match wire.shape.as_deref() {
            None | Some([_]) => None,
            Some(&[rows, columns]) => {
                if columns == 0 && rows != 0 {
                    return Err(PlotError::Deserialize(format!(
                        "shape {rows}x0 has rows without columns"
                    )));
                }
                if rows.checked_mul(columns) != Some(values.len()) {
                    return Err(PlotError::Deserialize(format!(
                        "shape {rows}x{columns} does not match {} elements",
                        values.len()
                    )));
                }
                Some((rows, columns))
            }
            Some(other) => {
                return Err(PlotError::Deserialize(format!(
                    "unsupported array rank {}",
                    other.len()
                )));
            }
        };
        Ok(Self {
            values,
            shape,
            date: wire.kind.as_deref() == Some("date"),
        })
    }

    /// Encode to the wire form; the shape is always written.
    pub fn encode(&self) -> WireArray {
        WireArray {
            dtype: self.values.dtype().name().to_string(),
            value: self.values.to_le_bytes(),
            shape: Some(match self.shape {
                Some((rows, columns)) => vec![rows, columns],
                None => vec![self.values.len()],
            }),
            kind: self.date.then(|| "date".to_string()),
        }
    }

    /// Channel values, split row-wise for two-dimensional arrays.
    pub fn to_values(&self) -> Values {
        let flat = self.values.to_f64();
        match self.shape {
            Some((_, columns)) if columns > 0 => {
                Values::Nested(flat.chunks(columns).map(<[f64]>::to_vec).collect())
            }
            Some(_) => Values::Nested(Vec::new()),
            None => Values::Numbers(flat),
        }
    }
}

/// Read a channel attribute from widget JSON.
///
/// Accepts a wire array, a plain list of numbers, a list of number lists, a
/// list of labels, or `null` (empty).
pub fn values_from_json(name: &str, value: &serde_json::Value) -> Result<Values> {
    use serde_json::Value as Json;

    let invalid = |reason: &str| PlotError::InvalidAttribute {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    match value {
        Json::Null => Ok(Values::Numbers(Vec::new())),
        Json::Object(map) if map.contains_key("dtype") => {
            let wire: WireArray = serde_json::from_value(value.clone())?;
            Ok(ArrayData::decode(&wire)?.to_values())
        }
        Json::Array(items) => {
            if items.iter().all(Json::is_number) {
                return Ok(Values::Numbers(
                    items.iter().filter_map(Json::as_f64).collect(),
                ));
            }
            if items.iter().all(Json::is_array) {
                return items
                    .iter()
                    .map(|row| match values_from_json(name, row)? {
                        Values::Numbers(numbers) => Ok(numbers),
                        _ => Err(invalid("nested rows must be numeric")),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Values::Nested);
            }
            items
                .iter()
                .map(|item| match item {
                    Json::String(label) => Ok(label.clone()),
                    Json::Number(number) => Ok(number.to_string()),
                    Json::Bool(flag) => Ok(flag.to_string()),
                    _ => Err(invalid("labels must be strings, numbers or booleans")),
                })
                .collect::<Result<Vec<_>>>()
                .map(Values::Labels)
        }
        _ => Err(invalid("expected an array")),
    }
}

/// Encode channel values for widget JSON. Labels stay a plain JSON list.
pub fn values_to_json(values: &Values) -> Result<serde_json::Value> {
    let array = match values {
        Values::Numbers(numbers) => ArrayData::new(TypedArray::Float64(numbers.clone())),
        Values::Nested(rows) => ArrayData::from_rows(rows)?,
        Values::Labels(labels) => return Ok(serde_json::json!(labels)),
    };
    Ok(serde_json::to_value(array.encode())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_round_trip_is_bit_exact() {
        let doubles = vec![0.1, -0.0, f64::MAX, f64::MIN_POSITIVE, 1e-310, f64::NAN];
        let singles = vec![0.1f32, -3.5, f32::MAX, f32::EPSILON, f32::INFINITY];
        for array in [TypedArray::Float64(doubles), TypedArray::Float32(singles)] {
            let json = serde_json::to_string(&ArrayData::new(array.clone()).encode()).unwrap();
            let wire: WireArray = serde_json::from_str(&json).unwrap();
            let decoded = ArrayData::decode(&wire).unwrap();
            assert_eq!(decoded.values.to_le_bytes(), array.to_le_bytes());
        }
    }

    #[test]
    fn decodes_little_endian_integers() {
        let wire = WireArray {
            dtype: "int16".to_string(),
            value: vec![0x01, 0x00, 0xff, 0xff],
            shape: None,
            kind: None,
        };
        let data = ArrayData::decode(&wire).unwrap();
        assert_eq!(data.values, TypedArray::Int16(vec![1, -1]));
        assert_eq!(data.to_values(), Values::Numbers(vec![1.0, -1.0]));
    }

    #[test]
    fn two_dimensional_arrays_split_into_rows() {
        let data = ArrayData::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let wire = data.encode();
        assert_eq!(wire.shape, Some(vec![3, 2]));
        let decoded = ArrayData::decode(&wire).unwrap();
        assert_eq!(
            decoded.to_values(),
            Values::Nested(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(ArrayData::from_rows(&[vec![1.0], vec![2.0, 3.0]]).is_err());
    }

    #[test]
    fn malformed_arrays_error() {
        let unknown = WireArray {
            dtype: "complex128".to_string(),
            value: Vec::new(),
            shape: None,
            kind: None,
        };
        assert!(matches!(
            ArrayData::decode(&unknown),
            Err(PlotError::UnsupportedDtype(_))
        ));

        let truncated = WireArray {
            dtype: "float64".to_string(),
            value: vec![0; 7],
            shape: None,
            kind: None,
        };
        assert!(matches!(
            ArrayData::decode(&truncated),
            Err(PlotError::Deserialize(_))
        ));

        let bad_shape = WireArray {
            dtype: "uint8".to_string(),
            value: vec![1, 2, 3],
            shape: Some(vec![2, 2]),
            kind: None,
        };
        assert!(ArrayData::decode(&bad_shape).is_err());
    }

    #[test]
    fn oversized_shapes_error() {
        let overflowing = WireArray {
            dtype: "float64".to_string(),
            value: vec![0; 16],
            shape: Some(vec![usize::MAX, 2]),
            kind: None,
        };
        assert!(matches!(
            ArrayData::decode(&overflowing),
            Err(PlotError::Deserialize(_))
        ));

        let rows_without_columns = WireArray {
            dtype: "float64".to_string(),
            value: Vec::new(),
            shape: Some(vec![usize::MAX, 0]),
            kind: None,
        };
        assert!(matches!(
            ArrayData::decode(&rows_without_columns),
            Err(PlotError::Deserialize(_))
        ));

        let empty = WireArray {
            dtype: "float64".to_string(),
            value: Vec::new(),
            shape: Some(vec![0, 0]),
            kind: None,
        };
        let data = ArrayData::decode(&empty).unwrap();
        assert_eq!(data.to_values(), Values::Nested(Vec::new()));
    }

    #[test]
    fn date_flag_survives_encoding() {
        let data = ArrayData::new(TypedArray::Float64(vec![0.0])).with_date(true);
        let wire = data.encode();
        assert_eq!(wire.kind.as_deref(), Some("date"));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["type"], "date");
        assert!(ArrayData::decode(&wire).unwrap().date);
    }

    #[test]
    fn plain_json_lists() {
        let numbers = values_from_json("x", &serde_json::json!([1, 2.5])).unwrap();
        assert_eq!(numbers, Values::Numbers(vec![1.0, 2.5]));
        let labels = values_from_json("x", &serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(labels, Values::Labels(vec!["a".to_string(), "b".to_string()]));
        let nested = values_from_json("y", &serde_json::json!([[1], [2, 3]])).unwrap();
        assert_eq!(nested, Values::Nested(vec![vec![1.0], vec![2.0, 3.0]]));
        assert!(values_from_json("x", &serde_json::json!(3)).is_err());
    }

    #[test]
    fn values_json_round_trip() {
        let values = Values::Numbers(vec![0.5, 1.5]);
        let json = values_to_json(&values).unwrap();
        assert_eq!(json["dtype"], "float64");
        assert_eq!(values_from_json("x", &json).unwrap(), values);
    }
}
