//! # Value Marshaling
//!
//! Conversions between Rhai values and the native argument/return types
//! used by the widget tree.
//!
//! ## Conventions
//! - **Numbers**: integers or floats; floats truncate toward zero.
//! - **Booleans**: `true`/`false`, or a number (`0` is false).
//! - **Strings**: decoded into an owned, NUL-terminated `CString` that the
//!   caller drops once the native call returns. A native null string
//!   encodes as `""`, never `()`.
//! - **Colors**: `0xRRGGBB` or `#{ red, green, blue }`; anything else is
//!   black. Encoded as `#{ r, g, b, hex, kind: "lv_color" }`.

use crate::errors::BridgeError;
use crate::widgets::Rgb;
use rhai::{Dynamic, Map, INT};
use std::ffi::{CStr, CString};

/// Type tag of encoded colors.
pub const COLOR_TYPE: &str = "lv_color";

fn as_number(value: &Dynamic) -> Option<INT> {
    value
        .as_int()
        .ok()
        .or_else(|| value.as_float().ok().map(|f| f as INT))
}

/// Decodes a required number.
pub fn decode_int(value: &Dynamic, index: usize) -> Result<INT, BridgeError> {
    as_number(value).ok_or_else(|| BridgeError::arg_type(index, "a number", value.type_name()))
}

/// Decodes a number into a native `int32_t`, wrapping like a C cast.
pub fn decode_i32(value: &Dynamic, index: usize) -> Result<i32, BridgeError> {
    decode_int(value, index).map(|v| v as i32)
}

/// Decodes a number into a native `uint32_t`, wrapping like a C cast.
pub fn decode_u32(value: &Dynamic, index: usize) -> Result<u32, BridgeError> {
    decode_int(value, index).map(|v| v as u32)
}

/// Decodes a boolean; numbers are accepted with `0` meaning false.
pub fn decode_bool(value: &Dynamic, index: usize) -> Result<bool, BridgeError> {
    if let Ok(b) = value.as_bool() {
        return Ok(b);
    }
    as_number(value)
        .map(|n| n != 0)
        .ok_or_else(|| BridgeError::arg_type(index, "a boolean or number", value.type_name()))
}

/// Copies a script string into an owned native buffer.
pub fn decode_string(value: &Dynamic, index: usize) -> Result<CString, BridgeError> {
    if !value.is_string() {
        return Err(BridgeError::arg_type(index, "a string", value.type_name()));
    }
    let text = value
        .clone()
        .into_string()
        .map_err(|found| BridgeError::arg_type(index, "a string", found))?;

    let len = text.len() + 1;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BridgeError::Allocation { len })?;
    buf.extend_from_slice(text.as_bytes());
    CString::new(buf).map_err(|_| BridgeError::arg_type(index, "a string without NUL bytes", "string"))
}

/// Optional string parameter: absent or `()` is a native null, no buffer.
pub fn decode_optional_string(value: Option<&Dynamic>, index: usize) -> Result<Option<CString>, BridgeError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_unit() => Ok(None),
        Some(v) => decode_string(v, index).map(Some),
    }
}

/// Encodes a native string result. Null becomes the empty string.
pub fn encode_string(value: Option<&CStr>) -> Dynamic {
    match value {
        Some(s) => s.to_string_lossy().into_owned().into(),
        None => "".into(),
    }
}

fn channel(map: &Map, key: &str) -> u8 {
    map.get(key).and_then(as_number).map(|v| v as u8).unwrap_or(0)
}

/// Decodes a color. Never fails; malformed input yields black.
pub fn decode_color(value: &Dynamic) -> Rgb {
    if let Some(packed) = as_number(value) {
        return Rgb::from_hex(packed as u32);
    }
    let Some(map) = value.clone().try_cast::<Map>() else {
        return Rgb::BLACK;
    };
    let encoded = map
        .get("type")
        .or_else(|| map.get("kind"))
        .and_then(|k| k.clone().into_string().ok())
        .is_some_and(|k| k == COLOR_TYPE);
    if encoded {
        if let Some(hex) = map.get("hex").and_then(as_number) {
            return Rgb::from_hex(hex as u32);
        }
    }
    Rgb::new(
        channel(&map, "red"),
        channel(&map, "green"),
        channel(&map, "blue"),
    )
}

pub fn encode_color(color: Rgb) -> Map {
    let mut map = Map::new();
    map.insert("r".into(), Dynamic::from_int(color.red as INT));
    map.insert("g".into(), Dynamic::from_int(color.green as INT));
    map.insert("b".into(), Dynamic::from_int(color.blue as INT));
    map.insert("hex".into(), Dynamic::from_int(color.to_hex() as INT));
    map.insert("type".into(), COLOR_TYPE.into());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_map(fields: &[(&str, Dynamic)]) -> Dynamic {
        let mut map = Map::new();
        for (k, v) in fields {
            map.insert((*k).into(), v.clone());
        }
        Dynamic::from_map(map)
    }

    #[test]
    fn packed_and_component_colors() {
        assert_eq!(decode_color(&Dynamic::from_int(0x12_34_56)), Rgb::new(0x12, 0x34, 0x56));
        let partial = rgb_map(&[("red", Dynamic::from_int(200)), ("blue", Dynamic::from_float(7.9))]);
        assert_eq!(decode_color(&partial), Rgb::new(200, 0, 7));
    }

    #[test]
    fn malformed_color_is_black() {
        assert_eq!(decode_color(&"red".into()), Rgb::BLACK);
        assert_eq!(decode_color(&Dynamic::UNIT), Rgb::BLACK);
        let wrong = rgb_map(&[("red", "high".into())]);
        assert_eq!(decode_color(&wrong), Rgb::BLACK);
    }

    #[test]
    fn encoded_color_decodes_back() {
        let color = Rgb::new(1, 2, 3);
        let encoded = encode_color(color);
        assert_eq!(encoded["hex"].as_int().unwrap(), 0x01_02_03);
        assert_eq!(encoded["type"].clone().into_string().unwrap(), COLOR_TYPE);
        assert_eq!(decode_color(&Dynamic::from_map(encoded)), color);
    }

    #[test]
    fn legacy_kind_tag_still_decodes() {
        let mut map = Map::new();
        map.insert("kind".into(), COLOR_TYPE.into());
        map.insert("hex".into(), Dynamic::from_int(0x10_20_30));
        assert_eq!(decode_color(&Dynamic::from_map(map)), Rgb::new(0x10, 0x20, 0x30));
    }

    #[test]
    fn booleans_accept_numbers() {
        assert!(decode_bool(&Dynamic::TRUE, 0).unwrap());
        assert!(!decode_bool(&Dynamic::from_int(0), 0).unwrap());
        assert!(decode_bool(&Dynamic::from_int(-3), 0).unwrap());
        let err = decode_bool(&"yes".into(), 4).unwrap_err();
        assert!(matches!(err, BridgeError::ArgumentType { index: 4, .. }));
    }

    #[test]
    fn numbers_reject_strings() {
        assert_eq!(decode_i32(&Dynamic::from_float(-2.7), 0).unwrap(), -2);
        assert!(decode_int(&"10".into(), 1).is_err());
    }

    #[test]
    fn strings_become_nul_terminated_buffers() {
        let buf = decode_string(&"héllo".into(), 0).unwrap();
        assert_eq!(buf.as_bytes_with_nul().last(), Some(&0));
        assert_eq!(buf.to_str().unwrap(), "héllo");

        assert!(decode_string(&Dynamic::from_int(1), 0).is_err());
        assert!(decode_string(&"a\0b".into(), 0).is_err());
        assert_eq!(decode_optional_string(Some(&Dynamic::UNIT), 0).unwrap(), None);
    }

    #[test]
    fn null_string_encodes_empty() {
        let encoded = encode_string(None);
        assert!(encoded.is_string());
        assert_eq!(encoded.into_string().unwrap(), "");
    }
}
