//! # Objects API
//!
//! Operations valid on every widget object.
//!
//! ## Responsibilities
//! - **Screens**: `lv_scr_act`, `lv_disp_get_scr_act`
//! - **Hierarchy**: `lv_obj_create`, `lv_obj_del`, `lv_obj_clean`,
//!   `lv_obj_get_parent`, `lv_obj_get_child_cnt`
//! - **Geometry**: position, size and alignment setters and getters
//! - **Flags & States**: `lv_obj_add_flag`, `lv_obj_clear_flag`,
//!   `lv_obj_has_flag`, `lv_obj_set_state`, `lv_obj_has_state`
//! - **Styles**: local style setters keyed by selector

use crate::bridge;
use crate::errors::BridgeError;
use crate::handle::decode_optional_handle;
use crate::marshal::encode_color;
use crate::scripting::entry::{Call, FuncEntry};
use crate::widgets::{Alignment, Rgb, StyleProp, StyleValue, WidgetClass};
use rhai::{Dynamic, INT};

/// `LV_ALIGN_CENTER`
const ALIGN_CENTER: i32 = 9;

pub const ENTRIES: &[FuncEntry] = &[
    FuncEntry::new("lv_scr_act", 0, 0, scr_act),
    FuncEntry::new("lv_disp_get_scr_act", 0, 1, disp_get_scr_act),
    FuncEntry::new("lv_obj_create", 1, 0, obj_create),
    FuncEntry::new("lv_obj_del", 1, 0, obj_del),
    FuncEntry::new("lv_obj_delete", 1, 0, obj_del),
    FuncEntry::new("lv_obj_clean", 1, 0, obj_clean),
    FuncEntry::new("lv_obj_get_parent", 1, 0, obj_get_parent),
    FuncEntry::new("lv_obj_get_child_cnt", 1, 0, obj_get_child_cnt),
    FuncEntry::new("lv_obj_set_pos", 3, 0, obj_set_pos),
    FuncEntry::new("lv_obj_set_size", 3, 0, obj_set_size),
    FuncEntry::new("lv_obj_set_width", 2, 0, obj_set_width),
    FuncEntry::new("lv_obj_set_height", 2, 0, obj_set_height),
    FuncEntry::new("lv_obj_get_x", 1, 0, obj_get_x),
    FuncEntry::new("lv_obj_get_y", 1, 0, obj_get_y),
    FuncEntry::new("lv_obj_get_width", 1, 0, obj_get_width),
    FuncEntry::new("lv_obj_get_height", 1, 0, obj_get_height),
    FuncEntry::new("lv_obj_align", 2, 2, obj_align),
    FuncEntry::new("lv_obj_align_to", 3, 2, obj_align_to),
    FuncEntry::new("lv_obj_center", 1, 0, obj_center),
    FuncEntry::new("lv_obj_add_flag", 2, 0, obj_add_flag),
    FuncEntry::new("lv_obj_clear_flag", 2, 0, obj_clear_flag),
    FuncEntry::new("lv_obj_has_flag", 2, 0, obj_has_flag),
    FuncEntry::new("lv_obj_set_state", 3, 0, obj_set_state),
    FuncEntry::new("lv_obj_has_state", 2, 0, obj_has_state),
    FuncEntry::new("lv_obj_set_style_bg_color", 3, 0, style_bg_color),
    FuncEntry::new("lv_obj_set_style_text_color", 3, 0, style_text_color),
    FuncEntry::new("lv_obj_set_style_border_color", 3, 0, style_border_color),
    FuncEntry::new("lv_obj_set_style_border_width", 3, 0, style_border_width),
    FuncEntry::new("lv_obj_set_style_radius", 3, 0, style_radius),
    FuncEntry::new("lv_obj_set_style_pad_all", 3, 0, style_pad_all),
    FuncEntry::new("lv_obj_set_style_pad_row", 3, 0, style_pad_row),
    FuncEntry::new("lv_obj_set_style_pad_column", 3, 0, style_pad_column),
    FuncEntry::new("lv_obj_set_style_text_font", 3, 0, style_text_font),
    FuncEntry::new("lv_obj_get_style_bg_color", 2, 0, get_style_bg_color),
];

fn scr_act(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let root = call.bridge.borrow().tree.root();
    call.handle(root)
}

/// The display argument is accepted for compatibility; there is one display.
fn disp_get_scr_act(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    decode_optional_handle(call.opt(0), 0)?;
    scr_act(call)
}

/// Creates an object of `class` under the parent in argument 0; a null
/// parent creates a screen.
pub(crate) fn create(call: &Call<'_, '_>, class: WidgetClass) -> Result<Dynamic, BridgeError> {
    let parent = call.optional_object(0)?;
    let id = call.bridge.borrow_mut().create_object(class, parent)?;
    call.handle(id)
}

fn obj_create(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    create(call, WidgetClass::Obj)
}

fn obj_del(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    bridge::delete_object(call.bridge, obj, &mut call.invoker())?;
    Ok(Dynamic::UNIT)
}

fn obj_clean(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    bridge::clean_object(call.bridge, obj, &mut call.invoker())?;
    Ok(Dynamic::UNIT)
}

fn obj_get_parent(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    match call.widget(obj, |w| w.parent)? {
        Some(parent) => call.handle(parent),
        None => Ok(Dynamic::UNIT),
    }
}

fn obj_get_child_cnt(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let count = call.widget(obj, |w| w.children.len())?;
    Ok(Dynamic::from_int(count as INT))
}

fn obj_set_pos(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (x, y) = (call.i32(1)?, call.i32(2)?);
    call.widget_mut(obj, |w| {
        w.x = x;
        w.y = y;
        w.alignment = None;
    })?;
    Ok(Dynamic::UNIT)
}

fn obj_set_size(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (width, height) = (call.i32(1)?, call.i32(2)?);
    call.widget_mut(obj, |w| {
        w.width = width;
        w.height = height;
    })?;
    Ok(Dynamic::UNIT)
}

fn obj_set_width(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let width = call.i32(1)?;
    call.widget_mut(obj, |w| w.width = width)?;
    Ok(Dynamic::UNIT)
}

fn obj_set_height(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let height = call.i32(1)?;
    call.widget_mut(obj, |w| w.height = height)?;
    Ok(Dynamic::UNIT)
}

fn obj_get_x(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    Ok(Dynamic::from_int(call.widget(obj, |w| w.x)? as INT))
}

fn obj_get_y(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    Ok(Dynamic::from_int(call.widget(obj, |w| w.y)? as INT))
}

fn obj_get_width(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    Ok(Dynamic::from_int(call.widget(obj, |w| w.width)? as INT))
}

fn obj_get_height(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    Ok(Dynamic::from_int(call.widget(obj, |w| w.height)? as INT))
}

fn offset(call: &Call<'_, '_>, index: usize) -> Result<i32, BridgeError> {
    match call.opt(index) {
        Some(_) => call.i32(index),
        None => Ok(0),
    }
}

fn obj_align(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let alignment = Alignment {
        align: call.i32(1)?,
        base: None,
        x_ofs: offset(call, 2)?,
        y_ofs: offset(call, 3)?,
    };
    call.widget_mut(obj, |w| w.alignment = Some(alignment))?;
    Ok(Dynamic::UNIT)
}

fn obj_align_to(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let base = call.object(1)?;
    call.widget(base, |_| ())?;
    let alignment = Alignment {
        align: call.i32(2)?,
        base: Some(base),
        x_ofs: offset(call, 3)?,
        y_ofs: offset(call, 4)?,
    };
    call.widget_mut(obj, |w| w.alignment = Some(alignment))?;
    Ok(Dynamic::UNIT)
}

fn obj_center(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.widget_mut(obj, |w| {
        w.alignment = Some(Alignment {
            align: ALIGN_CENTER,
            ..Alignment::default()
        })
    })?;
    Ok(Dynamic::UNIT)
}

fn obj_add_flag(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let flag = call.u32(1)?;
    call.widget_mut(obj, |w| w.flags |= flag)?;
    Ok(Dynamic::UNIT)
}

fn obj_clear_flag(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let flag = call.u32(1)?;
    call.widget_mut(obj, |w| w.flags &= !flag)?;
    Ok(Dynamic::UNIT)
}

fn obj_has_flag(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let flag = call.u32(1)?;
    Ok(call.widget(obj, |w| w.has_flag(flag))?.into())
}

fn obj_set_state(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let state = call.u32(1)?;
    let enable = call.bool(2)?;
    call.widget_mut(obj, |w| {
        if enable {
            w.state |= state;
        } else {
            w.state &= !state;
        }
    })?;
    Ok(Dynamic::UNIT)
}

fn obj_has_state(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let state = call.u32(1)?;
    Ok(call.widget(obj, |w| w.state & state == state)?.into())
}

fn set_style(call: &Call<'_, '_>, props: &[StyleProp], value: StyleValue) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let selector = call.u32(2)?;
    call.widget_mut(obj, |w| {
        for &prop in props {
            w.styles.insert((prop, selector), value);
        }
    })?;
    Ok(Dynamic::UNIT)
}

fn style_bg_color(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::BgColor], StyleValue::Color(call.color(1)?))
}

fn style_text_color(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::TextColor], StyleValue::Color(call.color(1)?))
}

fn style_border_color(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::BorderColor], StyleValue::Color(call.color(1)?))
}

fn style_border_width(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::BorderWidth], StyleValue::Num(call.i32(1)?))
}

fn style_radius(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::Radius], StyleValue::Num(call.i32(1)?))
}

fn style_pad_all(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let pads = [
        StyleProp::PadTop,
        StyleProp::PadBottom,
        StyleProp::PadLeft,
        StyleProp::PadRight,
    ];
    set_style(call, &pads, StyleValue::Num(call.i32(1)?))
}

fn style_pad_row(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::PadRow], StyleValue::Num(call.i32(1)?))
}

fn style_pad_column(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::PadColumn], StyleValue::Num(call.i32(1)?))
}

fn style_text_font(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    set_style(call, &[StyleProp::TextFont], StyleValue::Font(call.font(1)?))
}

/// Unset backgrounds read back as white, the default theme's color.
fn get_style_bg_color(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let selector = call.u32(1)?;
    let color = match call.widget(obj, |w| w.style(StyleProp::BgColor, selector))? {
        Some(StyleValue::Color(color)) => color,
        _ => Rgb::WHITE,
    };
    Ok(Dynamic::from_map(encode_color(color)))
}
