//! # Constants API
//!
//! Static modules of toolkit constants, populated once per engine.
//!
//! ## Modules
//! - **lvgl_enum**: Integer constants (`lvgl_enum::LV_EVENT_CLICKED`)
//! - **lv_font**: Handles of the built-in fonts
//!   (`lv_font::lv_font_montserrat_14`)

use crate::handle::{FontId, Handle, BUILTIN_FONTS};
use rhai::{Engine, Module, INT};

/// Symbolic toolkit constants exported to scripts.
pub const ENUM_TABLE: &[(&str, INT)] = &[
    // Event codes
    ("LV_EVENT_ALL", 0),
    ("LV_EVENT_PRESSED", 1),
    ("LV_EVENT_PRESSING", 2),
    ("LV_EVENT_PRESS_LOST", 3),
    ("LV_EVENT_SHORT_CLICKED", 4),
    ("LV_EVENT_SINGLE_CLICKED", 5),
    ("LV_EVENT_DOUBLE_CLICKED", 6),
    ("LV_EVENT_TRIPLE_CLICKED", 7),
    ("LV_EVENT_LONG_PRESSED", 8),
    ("LV_EVENT_LONG_PRESSED_REPEAT", 9),
    ("LV_EVENT_CLICKED", 10),
    ("LV_EVENT_RELEASED", 11),
    ("LV_EVENT_SCROLL_BEGIN", 12),
    ("LV_EVENT_SCROLL_THROW_BEGIN", 13),
    ("LV_EVENT_SCROLL_END", 14),
    ("LV_EVENT_SCROLL", 15),
    ("LV_EVENT_GESTURE", 16),
    ("LV_EVENT_KEY", 17),
    ("LV_EVENT_ROTARY", 18),
    ("LV_EVENT_FOCUSED", 19),
    ("LV_EVENT_DEFOCUSED", 20),
    ("LV_EVENT_LEAVE", 21),
    ("LV_EVENT_HIT_TEST", 22),
    ("LV_EVENT_INDEV_RESET", 23),
    ("LV_EVENT_HOVER_OVER", 24),
    ("LV_EVENT_HOVER_LEAVE", 25),
    ("LV_EVENT_COVER_CHECK", 26),
    ("LV_EVENT_REFR_EXT_DRAW_SIZE", 27),
    ("LV_EVENT_DRAW_MAIN_BEGIN", 28),
    ("LV_EVENT_DRAW_MAIN", 29),
    ("LV_EVENT_DRAW_MAIN_END", 30),
    ("LV_EVENT_DRAW_POST_BEGIN", 31),
    ("LV_EVENT_DRAW_POST", 32),
    ("LV_EVENT_DRAW_POST_END", 33),
    ("LV_EVENT_DRAW_TASK_ADDED", 34),
    ("LV_EVENT_VALUE_CHANGED", 35),
    ("LV_EVENT_INSERT", 36),
    ("LV_EVENT_REFRESH", 37),
    ("LV_EVENT_READY", 38),
    ("LV_EVENT_CANCEL", 39),
    ("LV_EVENT_CREATE", 40),
    ("LV_EVENT_DELETE", 41),
    ("LV_EVENT_CHILD_CHANGED", 42),
    ("LV_EVENT_CHILD_CREATED", 43),
    ("LV_EVENT_CHILD_DELETED", 44),
    ("LV_EVENT_SCREEN_UNLOAD_START", 45),
    ("LV_EVENT_SCREEN_LOAD_START", 46),
    ("LV_EVENT_SCREEN_LOADED", 47),
    ("LV_EVENT_SCREEN_UNLOADED", 48),
    ("LV_EVENT_SIZE_CHANGED", 49),
    ("LV_EVENT_STYLE_CHANGED", 50),
    ("LV_EVENT_LAYOUT_CHANGED", 51),
    ("LV_EVENT_GET_SELF_SIZE", 52),
    ("LV_EVENT_INVALIDATE_AREA", 53),
    ("LV_EVENT_RESOLUTION_CHANGED", 54),
    ("LV_EVENT_COLOR_FORMAT_CHANGED", 55),
    ("LV_EVENT_REFR_REQUEST", 56),
    ("LV_EVENT_REFR_START", 57),
    ("LV_EVENT_REFR_READY", 58),
    ("LV_EVENT_RENDER_START", 59),
    ("LV_EVENT_RENDER_READY", 60),
    ("LV_EVENT_FLUSH_START", 61),
    ("LV_EVENT_FLUSH_FINISH", 62),
    ("LV_EVENT_FLUSH_WAIT_START", 63),
    ("LV_EVENT_FLUSH_WAIT_FINISH", 64),
    ("LV_EVENT_VSYNC", 65),
    // States
    ("LV_STATE_DEFAULT", 0),
    ("LV_STATE_CHECKED", 1),
    ("LV_STATE_FOCUSED", 2),
    ("LV_STATE_FOCUS_KEY", 4),
    ("LV_STATE_EDITED", 8),
    ("LV_STATE_HOVERED", 16),
    ("LV_STATE_PRESSED", 32),
    ("LV_STATE_SCROLLED", 64),
    ("LV_STATE_DISABLED", 128),
    ("LV_STATE_USER_1", 4096),
    ("LV_STATE_USER_2", 8192),
    ("LV_STATE_USER_3", 16384),
    ("LV_STATE_USER_4", 32768),
    ("LV_STATE_ANY", 65535),
    // Parts
    ("LV_PART_MAIN", 0),
    ("LV_PART_SCROLLBAR", 65536),
    ("LV_PART_INDICATOR", 131072),
    ("LV_PART_KNOB", 196608),
    ("LV_PART_SELECTED", 262144),
    ("LV_PART_ITEMS", 327680),
    ("LV_PART_CURSOR", 393216),
    ("LV_PART_CUSTOM_FIRST", 524288),
    ("LV_PART_ANY", 983040),
    ("LV_PART_TEXTAREA_PLACEHOLDER", 524288),
    // Object flags
    ("LV_OBJ_FLAG_HIDDEN", 1),
    ("LV_OBJ_FLAG_CLICKABLE", 2),
    ("LV_OBJ_FLAG_CLICK_FOCUSABLE", 4),
    ("LV_OBJ_FLAG_CHECKABLE", 8),
    ("LV_OBJ_FLAG_SCROLLABLE", 16),
    ("LV_OBJ_FLAG_SCROLL_ELASTIC", 32),
    ("LV_OBJ_FLAG_SCROLL_MOMENTUM", 64),
    ("LV_OBJ_FLAG_SCROLL_ONE", 128),
    ("LV_OBJ_FLAG_SCROLL_CHAIN_HOR", 256),
    ("LV_OBJ_FLAG_SCROLL_CHAIN_VER", 512),
    ("LV_OBJ_FLAG_SCROLL_CHAIN", 768),
    ("LV_OBJ_FLAG_SCROLL_ON_FOCUS", 1024),
    ("LV_OBJ_FLAG_SCROLL_WITH_ARROW", 2048),
    ("LV_OBJ_FLAG_SNAPPABLE", 4096),
    ("LV_OBJ_FLAG_PRESS_LOCK", 8192),
    ("LV_OBJ_FLAG_EVENT_BUBBLE", 16384),
    ("LV_OBJ_FLAG_GESTURE_BUBBLE", 32768),
    ("LV_OBJ_FLAG_ADV_HITTEST", 65536),
    ("LV_OBJ_FLAG_IGNORE_LAYOUT", 131072),
    ("LV_OBJ_FLAG_FLOATING", 262144),
    ("LV_OBJ_FLAG_SEND_DRAW_TASK_EVENTS", 524288),
    ("LV_OBJ_FLAG_OVERFLOW_VISIBLE", 1048576),
    ("LV_OBJ_FLAG_FLEX_IN_NEW_TRACK", 2097152),
    ("LV_OBJ_FLAG_LAYOUT_1", 8388608),
    ("LV_OBJ_FLAG_LAYOUT_2", 16777216),
    ("LV_OBJ_FLAG_WIDGET_1", 33554432),
    ("LV_OBJ_FLAG_WIDGET_2", 67108864),
    ("LV_OBJ_FLAG_USER_1", 134217728),
    ("LV_OBJ_FLAG_USER_2", 268435456),
    ("LV_OBJ_FLAG_USER_3", 536870912),
    ("LV_OBJ_FLAG_USER_4", 1073741824),
    // Alignment
    ("LV_ALIGN_DEFAULT", 0),
    ("LV_ALIGN_TOP_LEFT", 1),
    ("LV_ALIGN_TOP_MID", 2),
    ("LV_ALIGN_TOP_RIGHT", 3),
    ("LV_ALIGN_BOTTOM_LEFT", 4),
    ("LV_ALIGN_BOTTOM_MID", 5),
    ("LV_ALIGN_BOTTOM_RIGHT", 6),
    ("LV_ALIGN_LEFT_MID", 7),
    ("LV_ALIGN_RIGHT_MID", 8),
    ("LV_ALIGN_CENTER", 9),
    ("LV_ALIGN_OUT_TOP_LEFT", 10),
    ("LV_ALIGN_OUT_TOP_MID", 11),
    ("LV_ALIGN_OUT_TOP_RIGHT", 12),
    ("LV_ALIGN_OUT_BOTTOM_LEFT", 13),
    ("LV_ALIGN_OUT_BOTTOM_MID", 14),
    ("LV_ALIGN_OUT_BOTTOM_RIGHT", 15),
    ("LV_ALIGN_OUT_LEFT_TOP", 16),
    ("LV_ALIGN_OUT_LEFT_MID", 17),
    ("LV_ALIGN_OUT_LEFT_BOTTOM", 18),
    ("LV_ALIGN_OUT_RIGHT_TOP", 19),
    ("LV_ALIGN_OUT_RIGHT_MID", 20),
    ("LV_ALIGN_OUT_RIGHT_BOTTOM", 21),
    // Directions
    ("LV_DIR_NONE", 0),
    ("LV_DIR_LEFT", 1),
    ("LV_DIR_RIGHT", 2),
    ("LV_DIR_TOP", 4),
    ("LV_DIR_BOTTOM", 8),
    ("LV_DIR_HOR", 3),
    ("LV_DIR_VER", 12),
    ("LV_DIR_ALL", 15),
    // Text alignment
    ("LV_TEXT_ALIGN_AUTO", 0),
    ("LV_TEXT_ALIGN_LEFT", 1),
    ("LV_TEXT_ALIGN_CENTER", 2),
    ("LV_TEXT_ALIGN_RIGHT", 3),
    // Label long modes
    ("LV_LABEL_LONG_MODE_WRAP", 0),
    ("LV_LABEL_LONG_MODE_DOTS", 1),
    ("LV_LABEL_LONG_MODE_SCROLL", 2),
    ("LV_LABEL_LONG_MODE_SCROLL_CIRCULAR", 3),
    ("LV_LABEL_LONG_MODE_CLIP", 4),
    ("LV_LABEL_LONG_WRAP", 0),
    ("LV_LABEL_LONG_DOT", 1),
    ("LV_LABEL_LONG_SCROLL", 2),
    ("LV_LABEL_LONG_SCROLL_CIRCULAR", 3),
    ("LV_LABEL_LONG_CLIP", 4),
    // Chart
    ("LV_CHART_TYPE_NONE", 0),
    ("LV_CHART_TYPE_LINE", 1),
    ("LV_CHART_TYPE_BAR", 2),
    ("LV_CHART_TYPE_SCATTER", 3),
    ("LV_CHART_UPDATE_MODE_SHIFT", 0),
    ("LV_CHART_UPDATE_MODE_CIRCULAR", 1),
    ("LV_CHART_AXIS_PRIMARY_Y", 0),
    ("LV_CHART_AXIS_SECONDARY_Y", 1),
    ("LV_CHART_AXIS_PRIMARY_X", 2),
    ("LV_CHART_AXIS_SECONDARY_X", 4),
    // Roller modes
    ("LV_ROLLER_MODE_NORMAL", 0),
    ("LV_ROLLER_MODE_INFINITE", 1),
    // Opacity
    ("LV_OPA_TRANSP", 0),
    ("LV_OPA_COVER", 255),
    // Animation
    ("LV_ANIM_OFF", 0),
    ("LV_ANIM_ON", 1),
];

pub fn enum_module() -> Module {
    let mut module = Module::new();
    for &(name, value) in ENUM_TABLE {
        module.set_var(name, value);
    }
    module
}

pub fn font_module() -> Module {
    let mut module = Module::new();
    for (index, (name, _)) in BUILTIN_FONTS.iter().enumerate() {
        module.set_var(*name, Handle::Font(FontId(index as u32)));
    }
    module
}

pub fn register(engine: &mut Engine) {
    engine.register_static_module("lvgl_enum", enum_module().into());
    engine.register_static_module("lv_font", font_module().into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::EventCode;

    fn lookup(name: &str) -> Option<INT> {
        ENUM_TABLE.iter().find(|(n, _)| *n == name).map(|&(_, v)| v)
    }

    #[test]
    fn event_codes_match_native_values() {
        assert_eq!(lookup("LV_EVENT_ALL"), Some(EventCode::ALL.0 as INT));
        assert_eq!(lookup("LV_EVENT_CLICKED"), Some(EventCode::CLICKED.0 as INT));
        assert_eq!(lookup("LV_EVENT_DELETE"), Some(EventCode::DELETE.0 as INT));
        assert_eq!(lookup("LV_EVENT_VALUE_CHANGED"), Some(EventCode::VALUE_CHANGED.0 as INT));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = ENUM_TABLE.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ENUM_TABLE.len());
    }

    #[test]
    fn modules_are_reachable_from_scripts() {
        let mut engine = Engine::new();
        register(&mut engine);
        let code = engine.eval::<INT>("lvgl_enum::LV_EVENT_CLICKED").unwrap();
        assert_eq!(code, 10);
        let font = engine.eval::<Handle>("lv_font::lv_font_montserrat_20").unwrap();
        assert_eq!(font, Handle::Font(FontId(1)));
    }
}
