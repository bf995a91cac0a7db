//! Per-frame metadata schema and values

use bon::Builder;
use serde::Serialize;

/// Scalar type of one metadata field. Every field is 8 bytes wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetaType {
    Int64,
    Float64,
}

impl MetaType {
    /// `"Int64"` is the only integer type string; everything else is read as
    /// a double.
    pub fn from_declared(declared: &str) -> Self {
        if declared == "Int64" {
            MetaType::Int64
        } else {
            MetaType::Float64
        }
    }

    pub fn size_bytes(self) -> usize {
        8
    }
}

/// Footer tags that list several variants of one field under the same name,
/// told apart by a secondary attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetaFamily {
    /// `TimeStamp`, keyed by `event` (ExposureStarted, ExposureEnded)
    TimeStamp,
    /// `GateTracking`, keyed by `component` (Delay, Width)
    GateTracking,
}

impl MetaFamily {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TimeStamp" => Some(MetaFamily::TimeStamp),
            "GateTracking" => Some(MetaFamily::GateTracking),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            MetaFamily::TimeStamp => "TimeStamp",
            MetaFamily::GateTracking => "GateTracking",
        }
    }

    /// Attribute that names the variant.
    pub fn disambiguator(self) -> &'static str {
        match self {
            MetaFamily::TimeStamp => "event",
            MetaFamily::GateTracking => "component",
        }
    }
}

/// One entry of the per-frame metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct MetaField {
    /// Tag name, or the disambiguating attribute value for family tags
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub tag: String,
    pub family: Option<MetaFamily>,
    pub kind: MetaType,
}

/// A decoded metadata scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MetaValue {
    Int64(i64),
    Float64(f64),
}

impl MetaValue {
    pub fn kind(&self) -> MetaType {
        match self {
            MetaValue::Int64(_) => MetaType::Int64,
            MetaValue::Float64(_) => MetaType::Float64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            MetaValue::Int64(v) => v as f64,
            MetaValue::Float64(v) => v,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MetaValue::Int64(v) => Some(v),
            MetaValue::Float64(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_types() {
        assert_eq!(MetaType::from_declared("Int64"), MetaType::Int64);
        assert_eq!(MetaType::from_declared("Double"), MetaType::Float64);
        assert_eq!(MetaType::from_declared("int64"), MetaType::Float64);
    }

    #[test]
    fn test_families() {
        assert_eq!(MetaFamily::from_tag("TimeStamp"), Some(MetaFamily::TimeStamp));
        assert_eq!(MetaFamily::GateTracking.disambiguator(), "component");
        assert_eq!(MetaFamily::from_tag("FrameTrackingNumber"), None);
    }
}
