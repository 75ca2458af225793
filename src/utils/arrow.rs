//! Arrow utility functions for extracting typed values from arrays
//!
//! Null-safe accessors used when reading record sets back from flat Arrow
//! tables. Each returns `None` for nulls or for array types it cannot
//! interpret, leaving the policy decision to the caller.

use arrow::array::{
    Array, ArrayRef, Date32Array, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{NaiveDateTime, TimeZone, Utc};

/// Extract a string value from an Arrow array at the specified index,
/// handling nulls
#[must_use]
pub fn string_at(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            Some(string_array.value(index).to_string())
        }
        _ => None,
    }
}

/// Extract a timestamp value from an Arrow array at the specified index,
/// handling nulls
///
/// Supports microsecond and millisecond timestamps, `Date32` (midnight), and
/// `Utf8` columns holding one of the common date/time renderings.
#[must_use]
pub fn datetime_at(array: &ArrayRef, index: usize) -> Option<NaiveDateTime> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let ts_array = array.as_any().downcast_ref::<TimestampMicrosecondArray>()?;
            Utc.timestamp_micros(ts_array.value(index))
                .single()
                .map(|dt| dt.naive_utc())
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let ts_array = array.as_any().downcast_ref::<TimestampMillisecondArray>()?;
            Utc.timestamp_millis_opt(ts_array.value(index))
                .single()
                .map(|dt| dt.naive_utc())
        }
        DataType::Date32 => {
            let date_array = array.as_any().downcast_ref::<Date32Array>()?;
            date_array
                .value_as_date(index)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            let raw = string_array.value(index);

            for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                    return Some(dt);
                }
            }
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        _ => None,
    }
}
