use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

// the web client reads ids and select values from the DOM, so they may
// arrive as "3" as well as 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct LenientI64(#[serde(deserialize_with = "deserialize_number_from_string")] pub i64);

impl From<LenientI64> for i64 {
    fn from(value: LenientI64) -> Self {
        value.0
    }
}
