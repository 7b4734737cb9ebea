use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::error::ParseLabelError;

/// Enumerations whose wire form is a fixed label. Parsing accepts the label
/// or the optional ASCII alias, ignoring ASCII case.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal $(| $alias:literal)?),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            fn matches(self, value: &str) -> bool {
                match self {
                    $(
                        $name::$variant => {
                            value.eq_ignore_ascii_case($label)
                                $(|| value.eq_ignore_ascii_case($alias))?
                        }
                    )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseLabelError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.matches(value))
                    .ok_or_else(|| ParseLabelError::new($kind, value))
            }
        }
    };
}

labelled_enum!(CargoType, "cargo type", {
    General => "一般貨物" | "general",
    Refrigerated => "冷蔵貨物" | "refrigerated",
    Dangerous => "危険物" | "dangerous",
    Perishable => "生鮮食品" | "perishable",
    Pharmaceutical => "医薬品" | "pharmaceutical",
    Electronics => "電子機器" | "electronics",
    Apparel => "衣類" | "apparel",
    Other => "その他" | "other",
});

labelled_enum!(CargoStatus, "cargo status", {
    Pending => "PENDING",
    InTransit => "IN_TRANSIT",
    Arrived => "ARRIVED",
    Delivered => "DELIVERED",
    Cancelled => "CANCELLED",
});

labelled_enum!(Airport, "airport", {
    Nrt => "NRT",
    Hnd => "HND",
    Lax => "LAX",
    Jfk => "JFK",
    Lhr => "LHR",
    Cdg => "CDG",
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CargoId(pub String);

impl CargoId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CargoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CargoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A cargo record as held by the backend. Status and timestamps are
/// server-owned and only ever displayed by this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cargo {
    pub cargo_id: CargoId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flight_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_airport: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub destination_airport: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cargo_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipper_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consignee_name: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_date: Option<NaiveDateTime>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// One movement or status entry in a cargo's tracking history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracking_id: String,
    pub cargo_id: CargoId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Parts(Vec<i64>),
    Unrecognised(IgnoredAny),
}

/// Display-only timestamps: local ISO text, RFC 3339 with an offset (kept as
/// the wall time it names) or `[y, m, d, h, min, s, nanos]` arrays. Anything
/// else decodes as `None` rather than failing the record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Text(text)) => parse_timestamp_text(text.trim()),
        Some(RawTimestamp::Parts(parts)) => timestamp_from_parts(&parts),
        Some(RawTimestamp::Unrecognised(_)) | None => None,
    };
    Ok(parsed)
}

fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|ts| ts.naive_local()))
}

fn timestamp_from_parts(parts: &[i64]) -> Option<NaiveDateTime> {
    let part = |idx: usize| -> Option<u32> {
        parts.get(idx).map_or(Some(0), |value| u32::try_from(*value).ok())
    };
    let (year, month, day) = match parts {
        [year, month, day, ..] => (
            i32::try_from(*year).ok()?,
            u32::try_from(*month).ok()?,
            u32::try_from(*day).ok()?,
        ),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_nano_opt(part(3)?, part(4)?, part(5)?, part(6)?)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
