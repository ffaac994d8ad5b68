//! # Widget Objects
//!
//! Per-object state stored in the widget tree.
//!
//! ## Key Types
//! - `WidgetClass`: Which constructor created the object.
//! - `Widget`: Hierarchy, geometry, flags, state and class-specific content.
//! - `Rgb`: 24-bit color, the native `lv_color_t`.
//! - `StyleProp` / `StyleValue`: Local style properties keyed by selector.

use crate::handle::FontId;
use crate::widgets::event::Subscription;
use crate::widgets::ObjId;
use std::collections::BTreeMap;
use std::ffi::CString;

/// The widget class an object was created as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    Obj,
    Label,
    Button,
    Checkbox,
    Slider,
    Bar,
    Arc,
    Switch,
    Dropdown,
    Roller,
    Textarea,
    Table,
    Chart,
    Image,
    Msgbox,
}

impl WidgetClass {
    /// Native class name, as seen by scripts on object handles.
    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::Obj => "lv_obj",
            WidgetClass::Label => "lv_label",
            WidgetClass::Button => "lv_button",
            WidgetClass::Checkbox => "lv_checkbox",
            WidgetClass::Slider => "lv_slider",
            WidgetClass::Bar => "lv_bar",
            WidgetClass::Arc => "lv_arc",
            WidgetClass::Switch => "lv_switch",
            WidgetClass::Dropdown => "lv_dropdown",
            WidgetClass::Roller => "lv_roller",
            WidgetClass::Textarea => "lv_textarea",
            WidgetClass::Table => "lv_table",
            WidgetClass::Chart => "lv_chart",
            WidgetClass::Image => "lv_image",
            WidgetClass::Msgbox => "lv_msgbox",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let class = match name {
            "lv_obj" => WidgetClass::Obj,
            "lv_label" => WidgetClass::Label,
            "lv_button" | "lv_btn" => WidgetClass::Button,
            "lv_checkbox" => WidgetClass::Checkbox,
            "lv_slider" => WidgetClass::Slider,
            "lv_bar" => WidgetClass::Bar,
            "lv_arc" => WidgetClass::Arc,
            "lv_switch" => WidgetClass::Switch,
            "lv_dropdown" => WidgetClass::Dropdown,
            "lv_roller" => WidgetClass::Roller,
            "lv_textarea" => WidgetClass::Textarea,
            "lv_table" => WidgetClass::Table,
            "lv_chart" => WidgetClass::Chart,
            "lv_image" | "lv_img" => WidgetClass::Image,
            "lv_msgbox" => WidgetClass::Msgbox,
            _ => return None,
        };
        Some(class)
    }

    /// Classes that carry a value inside a range.
    pub fn has_range(self) -> bool {
        matches!(
            self,
            WidgetClass::Slider | WidgetClass::Bar | WidgetClass::Arc | WidgetClass::Chart
        )
    }
}

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Unpacks `0xRRGGBB`; bits above 24 are ignored.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }
}

/// Local style properties settable through the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProp {
    BgColor,
    TextColor,
    BorderColor,
    BorderWidth,
    Radius,
    PadTop,
    PadBottom,
    PadLeft,
    PadRight,
    PadRow,
    PadColumn,
    TextFont,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StyleValue {
    Color(Rgb),
    Num(i32),
    Font(FontId),
}

/// Alignment of an object relative to its parent or a base object.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Alignment {
    pub align: i32,
    pub base: Option<ObjId>,
    pub x_ofs: i32,
    pub y_ofs: i32,
}

/// A native object in the retained-mode tree.
#[derive(Clone, Debug)]
pub struct Widget {
    pub class: WidgetClass,
    pub parent: Option<ObjId>,
    pub children: Vec<ObjId>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub alignment: Option<Alignment>,
    pub flags: u32,
    pub state: u32,
    /// Label, checkbox and textarea text. `None` reads back as a null string.
    pub text: Option<CString>,
    pub placeholder: Option<CString>,
    pub long_mode: i32,
    pub recolor: bool,
    pub value: i32,
    pub range: (i32, i32),
    pub bg_angles: (i32, i32),
    pub options: Vec<String>,
    pub selected: u32,
    pub rows: u32,
    pub cols: u32,
    pub cells: BTreeMap<(u32, u32), String>,
    pub chart_type: i32,
    pub point_count: u32,
    pub image_src: Option<CString>,
    pub angle: i32,
    pub zoom: i32,
    pub styles: BTreeMap<(StyleProp, u32), StyleValue>,
    pub subscriptions: Vec<Subscription>,
    /// Set once deletion has started; the slot is freed afterwards.
    pub deleting: bool,
}

/// `LV_OBJ_FLAG_CLICKABLE`
pub const FLAG_CLICKABLE: u32 = 1 << 1;
/// `LV_OBJ_FLAG_SCROLLABLE`
pub const FLAG_SCROLLABLE: u32 = 1 << 4;
/// `LV_IMAGE_ZOOM_NONE`
pub const ZOOM_NONE: i32 = 256;

impl Widget {
    pub fn new(class: WidgetClass, parent: Option<ObjId>) -> Self {
        let flags = match class {
            WidgetClass::Label | WidgetClass::Image => 0,
            WidgetClass::Obj => FLAG_CLICKABLE | FLAG_SCROLLABLE,
            _ => FLAG_CLICKABLE,
        };
        let text = match class {
            WidgetClass::Label => CString::new("Text").ok(),
            WidgetClass::Checkbox => CString::new("Check box").ok(),
            WidgetClass::Textarea => Some(CString::default()),
            _ => None,
        };
        Self {
            class,
            parent,
            children: Vec::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            alignment: None,
            flags,
            state: 0,
            text,
            placeholder: None,
            long_mode: 0,
            recolor: false,
            value: 0,
            range: (0, 100),
            bg_angles: (135, 45),
            options: Vec::new(),
            selected: 0,
            rows: 1,
            cols: 1,
            cells: BTreeMap::new(),
            chart_type: 1,
            point_count: 10,
            image_src: None,
            angle: 0,
            zoom: ZOOM_NONE,
            styles: BTreeMap::new(),
            subscriptions: Vec::new(),
            deleting: false,
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    /// Stores `value` clamped into the current range.
    pub fn set_value(&mut self, value: i32) {
        let (min, max) = self.range;
        self.value = value.clamp(min.min(max), max.max(min));
    }

    pub fn set_range(&mut self, min: i32, max: i32) {
        self.range = (min, max);
        let v = self.value;
        self.set_value(v);
    }

    pub fn style(&self, prop: StyleProp, selector: u32) -> Option<StyleValue> {
        self.styles.get(&(prop, selector)).copied()
    }
}
