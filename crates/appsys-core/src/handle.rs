//! # Handles
//!
//! Script-visible references to native resources.
//!
//! ## Responsibilities
//! - **Encoding**: `Handle` is registered with Rhai as a custom type exposing
//!   `ptr`, `kind` and `class`; `to_map` produces the plain map shape.
//! - **Decoding**: Accepts either shape, checks the kind exhaustively and
//!   treats `()` as a null pointer where the parameter is optional.
//!
//! Decoding never checks that an object is still alive; resolving an
//! `ObjId` against the widget tree does, and fails with `ExpiredHandle`.

use crate::errors::BridgeError;
use crate::widgets::{ObjId, WidgetClass};
use rhai::{Dynamic, Map};
use std::fmt;

/// Index into the built-in font table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

/// Built-in fonts: script name and pixel size.
pub const BUILTIN_FONTS: &[(&str, u32)] = &[
    ("lv_font_montserrat_14", 14),
    ("lv_font_montserrat_20", 20),
];

impl FontId {
    pub fn name(self) -> Option<&'static str> {
        BUILTIN_FONTS.get(self.0 as usize).map(|(name, _)| *name)
    }
}

/// The kind tag carried by every handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Object,
    Font,
    Pointer,
}

impl HandleKind {
    pub fn tag(self) -> &'static str {
        match self {
            HandleKind::Object => "lv_obj",
            HandleKind::Font => "lv_font",
            HandleKind::Pointer => "pointer",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "lv_font" => Some(HandleKind::Font),
            "pointer" | "void*" => Some(HandleKind::Pointer),
            _ if WidgetClass::from_name(tag).is_some() => Some(HandleKind::Object),
            _ => None,
        }
    }
}

/// A native resource as seen by scripts.
///
/// Handles are plain values: two handles to the same object compare equal
/// by what they reference, not by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    Object { id: ObjId, class: WidgetClass },
    Font(FontId),
    Pointer(u64),
}

impl Handle {
    pub fn object(id: ObjId, class: WidgetClass) -> Self {
        Handle::Object { id, class }
    }

    pub fn kind(&self) -> HandleKind {
        match self {
            Handle::Object { .. } => HandleKind::Object,
            Handle::Font(_) => HandleKind::Font,
            Handle::Pointer(_) => HandleKind::Pointer,
        }
    }

    /// The numeric pointer field. Exact for every variant.
    pub fn raw(&self) -> i64 {
        match self {
            Handle::Object { id, .. } => id.to_raw(),
            Handle::Font(font) => font.0 as i64,
            Handle::Pointer(ptr) => *ptr as i64,
        }
    }

    /// Widget class name for objects, empty for other kinds.
    pub fn class_name(&self) -> &'static str {
        match self {
            Handle::Object { class, .. } => class.name(),
            _ => "",
        }
    }

    pub fn as_object(&self) -> Option<ObjId> {
        match self {
            Handle::Object { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Rebuilds a handle from its pointer field and tag.
    pub fn from_raw(raw: i64, tag: &str) -> Option<Self> {
        let handle = match HandleKind::from_tag(tag)? {
            HandleKind::Object => Handle::Object {
                id: ObjId::from_raw(raw),
                class: WidgetClass::from_name(tag)?,
            },
            HandleKind::Font => Handle::Font(FontId(u32::try_from(raw).ok()?)),
            HandleKind::Pointer => Handle::Pointer(raw as u64),
        };
        Some(handle)
    }

    /// The plain map shape: `#{ ptr, class }` for objects, `#{ ptr, type }`
    /// otherwise.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        map.insert("ptr".into(), Dynamic::from_int(self.raw()));
        match self {
            Handle::Object { class, .. } => {
                map.insert("class".into(), class.name().into());
            }
            _ => {
                map.insert("type".into(), self.kind().tag().into());
            }
        }
        map
    }

    pub fn to_dynamic(self) -> Dynamic {
        Dynamic::from(self)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Object { id, class } => write!(
                f,
                "{}#{}.{}",
                class.name(),
                id.index,
                id.generation
            ),
            Handle::Font(font) => write!(f, "{}", font.name().unwrap_or("lv_font")),
            Handle::Pointer(ptr) => write!(f, "pointer({ptr:#x})"),
        }
    }
}

fn is_null(value: &Dynamic) -> bool {
    value.is_unit()
}

fn number_field(map: &Map, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    value
        .as_int()
        .ok()
        .or_else(|| value.as_float().ok().map(|f| f as i64))
}

/// Decodes a handle in either script shape.
pub fn decode_handle(value: &Dynamic, index: usize) -> Result<Handle, BridgeError> {
    if let Some(handle) = value.clone().try_cast::<Handle>() {
        return Ok(handle);
    }
    let Some(map) = value.clone().try_cast::<Map>() else {
        return Err(BridgeError::arg_type(index, "a handle", value.type_name()));
    };
    let Some(raw) = number_field(&map, "ptr") else {
        return Err(BridgeError::arg_type(
            index,
            "a handle with a numeric ptr field",
            "object without ptr",
        ));
    };
    let tag = map
        .get("class")
        .or_else(|| map.get("type"))
        .or_else(|| map.get("kind"))
        .and_then(|v| v.clone().into_string().ok())
        .unwrap_or_else(|| HandleKind::Pointer.tag().to_string());
    Handle::from_raw(raw, &tag).ok_or_else(|| BridgeError::arg_type(index, "a known handle kind", &tag))
}

/// Like `decode_handle`, but a missing argument or `()` is a null pointer.
pub fn decode_optional_handle(value: Option<&Dynamic>, index: usize) -> Result<Option<Handle>, BridgeError> {
    match value {
        None => Ok(None),
        Some(v) if is_null(v) => Ok(None),
        Some(v) => decode_handle(v, index).map(Some),
    }
}

/// Decodes a handle that must reference a widget object.
pub fn decode_object(value: &Dynamic, index: usize) -> Result<ObjId, BridgeError> {
    let handle = decode_handle(value, index)?;
    handle
        .as_object()
        .ok_or_else(|| BridgeError::arg_type(index, "an object handle", handle.kind().tag()))
}

pub fn decode_optional_object(value: Option<&Dynamic>, index: usize) -> Result<Option<ObjId>, BridgeError> {
    match value {
        None => Ok(None),
        Some(v) if is_null(v) => Ok(None),
        Some(v) => decode_object(v, index).map(Some),
    }
}

pub fn decode_font(value: &Dynamic, index: usize) -> Result<FontId, BridgeError> {
    match decode_handle(value, index)? {
        Handle::Font(font) if font.name().is_some() => Ok(font),
        other => Err(BridgeError::arg_type(index, "a font handle", other.kind().tag())),
    }
}

/// Decodes the optional user-data argument of a registration: any handle,
/// or a bare integer taken as a generic pointer.
pub fn decode_user_data(value: Option<&Dynamic>, index: usize) -> Result<Option<Handle>, BridgeError> {
    match value {
        Some(v) if v.is_int() => Ok(v.as_int().ok().map(|raw| Handle::Pointer(raw as u64))),
        other => decode_optional_handle(other, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_handles() -> Vec<Handle> {
        vec![
            Handle::object(
                ObjId {
                    index: 3,
                    generation: 9,
                },
                WidgetClass::Label,
            ),
            Handle::object(
                ObjId {
                    index: u32::MAX,
                    generation: u32::MAX,
                },
                WidgetClass::Obj,
            ),
            Handle::Font(FontId(1)),
            Handle::Pointer(0x1000),
            Handle::Pointer(u64::MAX),
        ]
    }

    #[test]
    fn custom_type_roundtrip() {
        for handle in sample_handles() {
            let decoded = decode_handle(&handle.to_dynamic(), 0).unwrap();
            assert_eq!(decoded, handle);
            assert_eq!(decoded.raw(), handle.raw());
            assert_eq!(decoded.kind(), handle.kind());
        }
    }

    #[test]
    fn map_shape_roundtrip() {
        for handle in sample_handles() {
            let map = Dynamic::from_map(handle.to_map());
            assert_eq!(decode_handle(&map, 0).unwrap(), handle);
        }
    }

    #[test]
    fn type_field_tags_non_object_maps() {
        let map = Handle::Font(FontId(0)).to_map();
        assert_eq!(map["type"].clone().into_string().unwrap(), "lv_font");
        assert!(!map.contains_key("kind"));

        let mut typed = Map::new();
        typed.insert("ptr".into(), Dynamic::from_int(0));
        typed.insert("type".into(), "lv_font".into());
        assert_eq!(decode_font(&Dynamic::from_map(typed), 0).unwrap(), FontId(0));

        let mut legacy = Map::new();
        legacy.insert("ptr".into(), Dynamic::from_int(1));
        legacy.insert("kind".into(), "lv_font".into());
        assert_eq!(decode_handle(&Dynamic::from_map(legacy), 0).unwrap(), Handle::Font(FontId(1)));
    }

    #[test]
    fn rejects_values_without_pointer_field() {
        let err = decode_handle(&Dynamic::from_int(5), 2).unwrap_err();
        assert!(matches!(err, BridgeError::ArgumentType { index: 2, .. }));

        let mut map = Map::new();
        map.insert("class".into(), "lv_obj".into());
        let err = decode_handle(&Dynamic::from_map(map), 0).unwrap_err();
        assert!(err.to_string().starts_with("TypeError"));
    }

    #[test]
    fn null_decodes_to_none_only_when_optional() {
        assert_eq!(decode_optional_handle(Some(&Dynamic::UNIT), 0).unwrap(), None);
        assert_eq!(decode_optional_object(None, 0).unwrap(), None);
        assert!(decode_object(&Dynamic::UNIT, 0).is_err());
    }

    #[test]
    fn object_decoder_rejects_fonts() {
        let font = Handle::Font(FontId(0)).to_dynamic();
        assert!(decode_object(&font, 1).is_err());
        assert_eq!(decode_font(&font, 1).unwrap(), FontId(0));
        assert!(decode_font(&Handle::Font(FontId(99)).to_dynamic(), 1).is_err());
    }

    #[test]
    fn bare_integer_user_data_is_a_pointer() {
        let decoded = decode_user_data(Some(&Dynamic::from_int(0x42)), 3).unwrap();
        assert_eq!(decoded, Some(Handle::Pointer(0x42)));
    }
}
