//! # Widgets API
//!
//! Per-class constructors, setters and getters.
//!
//! ## Responsibilities
//! - **Constructors**: `lv_<class>_create(parent)` for every widget class
//! - **Text**: label, checkbox and textarea text; string getters return
//!   `""` for a null native string
//! - **Values**: slider, bar and arc values and ranges
//! - **Selections**: dropdown and roller options
//! - **Table / Chart / Image / Msgbox**: cells, chart settings, image
//!   source and transforms, message box close
//!
//! Calling a class-specific function on an object of another class throws
//! a `TypeError`.

use super::objects::create;
use crate::bridge;
use crate::errors::BridgeError;
use crate::marshal::{decode_optional_string, encode_string};
use crate::scripting::entry::{Call, FuncEntry};
use crate::widgets::{Widget, WidgetClass};
use rhai::{Dynamic, INT};
use std::ffi::CString;

use WidgetClass::*;

const VALUED: &[WidgetClass] = &[Slider, Bar, Arc];
const TEXTUAL: &[WidgetClass] = &[Label, Checkbox, Textarea];

macro_rules! constructor {
    ($name:ident, $class:expr) => {
        fn $name(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
            create(call, $class)
        }
    };
}

constructor!(label_create, Label);
constructor!(btn_create, Button);
constructor!(checkbox_create, Checkbox);
constructor!(slider_create, Slider);
constructor!(bar_create, Bar);
constructor!(arc_create, Arc);
constructor!(switch_create, Switch);
constructor!(dropdown_create, Dropdown);
constructor!(roller_create, Roller);
constructor!(textarea_create, Textarea);
constructor!(table_create, Table);
constructor!(chart_create, Chart);
constructor!(img_create, Image);
constructor!(msgbox_create, Msgbox);

pub const ENTRIES: &[FuncEntry] = &[
    FuncEntry::new("lv_label_create", 1, 0, label_create),
    FuncEntry::new("lv_btn_create", 1, 0, btn_create),
    FuncEntry::new("lv_button_create", 1, 0, btn_create),
    FuncEntry::new("lv_checkbox_create", 1, 0, checkbox_create),
    FuncEntry::new("lv_slider_create", 1, 0, slider_create),
    FuncEntry::new("lv_bar_create", 1, 0, bar_create),
    FuncEntry::new("lv_arc_create", 1, 0, arc_create),
    FuncEntry::new("lv_switch_create", 1, 0, switch_create),
    FuncEntry::new("lv_dropdown_create", 1, 0, dropdown_create),
    FuncEntry::new("lv_roller_create", 1, 0, roller_create),
    FuncEntry::new("lv_textarea_create", 1, 0, textarea_create),
    FuncEntry::new("lv_table_create", 1, 0, table_create),
    FuncEntry::new("lv_chart_create", 1, 0, chart_create),
    FuncEntry::new("lv_img_create", 1, 0, img_create),
    FuncEntry::new("lv_image_create", 1, 0, img_create),
    FuncEntry::new("lv_msgbox_create", 1, 0, msgbox_create),
    // Label
    FuncEntry::new("lv_label_set_text", 2, 0, label_set_text),
    FuncEntry::new("lv_label_get_text", 1, 0, text_get),
    FuncEntry::new("lv_label_set_long_mode", 2, 0, label_set_long_mode),
    FuncEntry::new("lv_label_set_recolor", 2, 0, label_set_recolor),
    // Checkbox
    FuncEntry::new("lv_checkbox_set_text", 2, 0, checkbox_set_text),
    FuncEntry::new("lv_checkbox_get_text", 1, 0, text_get),
    // Slider, bar, arc
    FuncEntry::new("lv_slider_set_value", 2, 1, value_set),
    FuncEntry::new("lv_bar_set_value", 2, 1, value_set),
    FuncEntry::new("lv_arc_set_value", 2, 0, value_set),
    FuncEntry::new("lv_slider_get_value", 1, 0, value_get),
    FuncEntry::new("lv_bar_get_value", 1, 0, value_get),
    FuncEntry::new("lv_arc_get_value", 1, 0, value_get),
    FuncEntry::new("lv_slider_set_range", 3, 0, range_set),
    FuncEntry::new("lv_bar_set_range", 3, 0, range_set),
    FuncEntry::new("lv_arc_set_range", 3, 0, range_set),
    FuncEntry::new("lv_arc_set_bg_angles", 3, 0, arc_set_bg_angles),
    // Dropdown, roller
    FuncEntry::new("lv_dropdown_set_options", 2, 0, options_set),
    FuncEntry::new("lv_roller_set_options", 2, 1, options_set),
    FuncEntry::new("lv_dropdown_set_selected", 2, 0, selected_set),
    FuncEntry::new("lv_roller_set_selected", 2, 1, selected_set),
    FuncEntry::new("lv_dropdown_get_selected", 1, 0, selected_get),
    FuncEntry::new("lv_roller_get_selected", 1, 0, selected_get),
    // Textarea
    FuncEntry::new("lv_textarea_set_text", 2, 0, textarea_set_text),
    FuncEntry::new("lv_textarea_add_text", 2, 0, textarea_add_text),
    FuncEntry::new("lv_textarea_get_text", 1, 0, text_get),
    FuncEntry::new("lv_textarea_set_placeholder_text", 2, 0, textarea_set_placeholder),
    // Table
    FuncEntry::new("lv_table_set_row_cnt", 2, 0, table_set_row_cnt),
    FuncEntry::new("lv_table_set_col_cnt", 2, 0, table_set_col_cnt),
    FuncEntry::new("lv_table_set_cell_value", 4, 0, table_set_cell_value),
    FuncEntry::new("lv_table_get_cell_value", 3, 0, table_get_cell_value),
    // Chart
    FuncEntry::new("lv_chart_set_type", 2, 0, chart_set_type),
    FuncEntry::new("lv_chart_set_point_count", 2, 0, chart_set_point_count),
    FuncEntry::new("lv_chart_set_range", 4, 0, chart_set_range),
    // Image
    FuncEntry::new("lv_img_set_src", 2, 0, img_set_src),
    FuncEntry::new("lv_image_set_src", 2, 0, img_set_src),
    FuncEntry::new("lv_img_set_angle", 2, 0, img_set_angle),
    FuncEntry::new("lv_image_set_rotation", 2, 0, img_set_angle),
    FuncEntry::new("lv_img_set_zoom", 2, 0, img_set_zoom),
    FuncEntry::new("lv_image_set_scale", 2, 0, img_set_zoom),
    // Msgbox
    FuncEntry::new("lv_msgbox_close", 1, 0, msgbox_close),
];

fn unit<T>(_: T) -> Dynamic {
    Dynamic::UNIT
}

/// Label text. A null argument keeps the current text.
fn label_set_text(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let text = decode_optional_string(call.opt(1), 1)?;
    call.class_mut(obj, &[Label], |w| {
        if let Some(text) = text {
            w.text = Some(text);
        }
    })
    .map(unit)
}

fn text_get(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.class_ref(obj, TEXTUAL, |w| encode_string(w.text.as_deref()))
}

fn label_set_long_mode(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let mode = call.i32(1)?;
    call.class_mut(obj, &[Label], |w| w.long_mode = mode).map(unit)
}

fn label_set_recolor(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let enable = call.bool(1)?;
    call.class_mut(obj, &[Label], |w| w.recolor = enable).map(unit)
}

fn checkbox_set_text(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let text = call.string(1)?;
    call.class_mut(obj, &[Checkbox], |w| w.text = Some(text)).map(unit)
}

/// Programmatic value changes do not fire `VALUE_CHANGED`.
fn value_set(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let value = call.i32(1)?;
    call.class_mut(obj, VALUED, |w| w.set_value(value)).map(unit)
}

fn value_get(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.class_ref(obj, VALUED, |w| Dynamic::from_int(w.value as INT))
}

fn range_set(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (min, max) = (call.i32(1)?, call.i32(2)?);
    call.class_mut(obj, VALUED, |w| w.set_range(min, max)).map(unit)
}

fn arc_set_bg_angles(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (start, end) = (call.i32(1)?, call.i32(2)?);
    call.class_mut(obj, &[Arc], |w| w.bg_angles = (start, end)).map(unit)
}

/// Options are one string with `\n` separated entries.
fn options_set(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let options = call.string(1)?;
    let entries: Vec<String> = options
        .to_string_lossy()
        .split('\n')
        .map(str::to_string)
        .collect();
    call.class_mut(obj, &[Dropdown, Roller], |w| {
        w.options = entries;
        w.selected = 0;
    })
    .map(unit)
}

fn clamp_selection(widget: &Widget, index: u32) -> u32 {
    let last = widget.options.len().saturating_sub(1) as u32;
    index.min(last)
}

fn selected_set(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let index = call.u32(1)?;
    call.class_mut(obj, &[Dropdown, Roller], |w| {
        w.selected = clamp_selection(w, index);
    })
    .map(unit)
}

fn selected_get(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.class_ref(obj, &[Dropdown, Roller], |w| Dynamic::from_int(w.selected as INT))
}

fn textarea_set_text(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let text = call.string(1)?;
    call.class_mut(obj, &[Textarea], |w| w.text = Some(text)).map(unit)
}

fn textarea_add_text(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let added = call.string(1)?;
    call.class_mut(obj, &[Textarea], |w| {
        let mut bytes = w.text.take().map(CString::into_bytes).unwrap_or_default();
        bytes.extend_from_slice(added.as_bytes());
        // Neither part holds interior NULs.
        w.text = CString::new(bytes).ok();
    })
    .map(unit)
}

fn textarea_set_placeholder(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let text = call.string(1)?;
    call.class_mut(obj, &[Textarea], |w| w.placeholder = Some(text)).map(unit)
}

fn table_set_row_cnt(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let rows = call.u32(1)?;
    call.class_mut(obj, &[Table], |w| {
        w.rows = rows;
        w.cells.retain(|&(row, _), _| row < rows);
    })
    .map(unit)
}

fn table_set_col_cnt(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let cols = call.u32(1)?;
    call.class_mut(obj, &[Table], |w| {
        w.cols = cols;
        w.cells.retain(|&(_, col), _| col < cols);
    })
    .map(unit)
}

/// Writing past the current size grows the table.
fn table_set_cell_value(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (row, col) = (call.u32(1)?, call.u32(2)?);
    let text = call.string(3)?;
    call.class_mut(obj, &[Table], |w| {
        w.rows = w.rows.max(row.saturating_add(1));
        w.cols = w.cols.max(col.saturating_add(1));
        w.cells
            .insert((row, col), text.to_string_lossy().into_owned());
    })
    .map(unit)
}

/// Empty cells are a null native string and read back as `""`.
fn table_get_cell_value(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let (row, col) = (call.u32(1)?, call.u32(2)?);
    let cell = call.class_ref(obj, &[Table], |w| w.cells.get(&(row, col)).cloned())?;
    let native = cell.and_then(|text| CString::new(text).ok());
    Ok(encode_string(native.as_deref()))
}

fn chart_set_type(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let chart_type = call.i32(1)?;
    call.class_mut(obj, &[Chart], |w| w.chart_type = chart_type).map(unit)
}

fn chart_set_point_count(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let count = call.u32(1)?;
    call.class_mut(obj, &[Chart], |w| w.point_count = count).map(unit)
}

/// The axis argument is accepted; one range is kept per chart.
fn chart_set_range(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.i32(1)?;
    let (min, max) = (call.i32(2)?, call.i32(3)?);
    call.class_mut(obj, &[Chart], |w| w.range = (min, max)).map(unit)
}

fn img_set_src(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let src = call.string(1)?;
    call.class_mut(obj, &[Image], |w| w.image_src = Some(src)).map(unit)
}

fn img_set_angle(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let angle = call.i32(1)?;
    call.class_mut(obj, &[Image], |w| w.angle = angle).map(unit)
}

fn img_set_zoom(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let zoom = call.i32(1)?;
    call.class_mut(obj, &[Image], |w| w.zoom = zoom).map(unit)
}

fn msgbox_close(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    call.class_ref(obj, &[Msgbox], |_| ())?;
    bridge::delete_object(call.bridge, obj, &mut call.invoker())?;
    Ok(Dynamic::UNIT)
}
