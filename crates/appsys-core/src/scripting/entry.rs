//! # Function Entry Table
//!
//! Scaffolding for the native functions exposed to scripts.
//!
//! ## Pattern
//! A `FuncEntry` names a wrapper and its argument counts. Installation
//! registers the wrapper once per arity `0..=required + optional`, every
//! parameter a `Dynamic`, so a call with too few arguments reaches the
//! wrapper and throws an argument-count `TypeError` instead of failing
//! function lookup. Wrappers decode their arguments through `Call`.

use crate::bridge::BridgeRef;
use crate::dispatch::ContextInvoker;
use crate::errors::BridgeError;
use crate::handle::{self, FontId, Handle};
use crate::marshal;
use crate::widgets::{ObjId, Rgb, Widget, WidgetClass, WidgetTree};
use rhai::{Dynamic, Engine, EvalAltResult, NativeCallContext, INT};
use std::ffi::CString;
use tracing::warn;

/// A native wrapper: decodes `call.args`, performs the operation and
/// encodes the result.
pub type Wrapper = fn(&Call<'_, '_>) -> Result<Dynamic, BridgeError>;

/// What an installed function returns to the engine.
pub type ScriptResult = Result<Dynamic, Box<EvalAltResult>>;

#[derive(Clone, Copy)]
pub struct FuncEntry {
    pub name: &'static str,
    pub required: usize,
    pub optional: usize,
    pub wrapper: Wrapper,
}

impl FuncEntry {
    pub const fn new(name: &'static str, required: usize, optional: usize, wrapper: Wrapper) -> Self {
        Self {
            name,
            required,
            optional,
            wrapper,
        }
    }

    /// Checks the argument count and runs the wrapper, converting failures
    /// into script exceptions.
    pub fn invoke(&self, ctx: &NativeCallContext, bridge: &BridgeRef, args: &[Dynamic]) -> ScriptResult {
        if args.len() < self.required {
            return Err(BridgeError::ArgumentCount {
                function: self.name,
                required: self.required,
                given: args.len(),
            }
            .into_script_error());
        }
        let call = Call {
            name: self.name,
            ctx,
            bridge,
            args,
        };
        (self.wrapper)(&call).map_err(|e| {
            if let BridgeError::ExpiredHandle { raw } = e {
                warn!(function = self.name, handle = raw, "call with expired handle");
            }
            e.into_script_error()
        })
    }
}

macro_rules! register_arity {
    ($engine:ident, $entry:ident, $bridge:ident; $($arg:ident),*) => {{
        let bridge = $bridge.clone();
        $engine.register_fn(
            $entry.name,
            move |ctx: NativeCallContext, $($arg: Dynamic),*| -> ScriptResult {
                $entry.invoke(&ctx, &bridge, &[$($arg),*])
            },
        );
    }};
}

/// Highest arity an entry may declare.
pub const MAX_ARITY: usize = 6;

/// Registers every entry as a global function of `engine`.
pub fn install(engine: &mut Engine, bridge: &BridgeRef, entries: &[FuncEntry]) {
    for &entry in entries {
        let max = (entry.required + entry.optional).min(MAX_ARITY);
        for arity in 0..=max {
            match arity {
                0 => register_arity!(engine, entry, bridge;),
                1 => register_arity!(engine, entry, bridge; a),
                2 => register_arity!(engine, entry, bridge; a, b),
                3 => register_arity!(engine, entry, bridge; a, b, c),
                4 => register_arity!(engine, entry, bridge; a, b, c, d),
                5 => register_arity!(engine, entry, bridge; a, b, c, d, e),
                _ => register_arity!(engine, entry, bridge; a, b, c, d, e, f),
            }
        }
    }
}

/// One native call in progress.
pub struct Call<'a, 'c> {
    pub name: &'static str,
    pub ctx: &'a NativeCallContext<'c>,
    pub bridge: &'a BridgeRef,
    pub args: &'a [Dynamic],
}

impl<'a, 'c> Call<'a, 'c> {
    pub fn arg(&self, index: usize) -> Result<&'a Dynamic, BridgeError> {
        self.args.get(index).ok_or(BridgeError::ArgumentCount {
            function: self.name,
            required: index + 1,
            given: self.args.len(),
        })
    }

    /// An optional argument; `None` when not supplied.
    pub fn opt(&self, index: usize) -> Option<&'a Dynamic> {
        self.args.get(index)
    }

    pub fn int(&self, index: usize) -> Result<INT, BridgeError> {
        marshal::decode_int(self.arg(index)?, index)
    }

    pub fn i32(&self, index: usize) -> Result<i32, BridgeError> {
        marshal::decode_i32(self.arg(index)?, index)
    }

    pub fn u32(&self, index: usize) -> Result<u32, BridgeError> {
        marshal::decode_u32(self.arg(index)?, index)
    }

    pub fn bool(&self, index: usize) -> Result<bool, BridgeError> {
        marshal::decode_bool(self.arg(index)?, index)
    }

    pub fn string(&self, index: usize) -> Result<CString, BridgeError> {
        marshal::decode_string(self.arg(index)?, index)
    }

    pub fn color(&self, index: usize) -> Result<Rgb, BridgeError> {
        Ok(marshal::decode_color(self.arg(index)?))
    }

    pub fn object(&self, index: usize) -> Result<ObjId, BridgeError> {
        handle::decode_object(self.arg(index)?, index)
    }

    pub fn optional_object(&self, index: usize) -> Result<Option<ObjId>, BridgeError> {
        handle::decode_optional_object(self.opt(index), index)
    }

    pub fn font(&self, index: usize) -> Result<FontId, BridgeError> {
        handle::decode_font(self.arg(index)?, index)
    }

    pub fn invoker(&self) -> ContextInvoker<'a, 'c> {
        ContextInvoker::new(self.ctx)
    }

    /// Runs `f` with the widget tree borrowed for the duration of the call.
    pub fn tree<R>(&self, f: impl FnOnce(&mut WidgetTree) -> Result<R, BridgeError>) -> Result<R, BridgeError> {
        f(&mut self.bridge.borrow_mut().tree)
    }

    pub fn widget<R>(&self, id: ObjId, f: impl FnOnce(&Widget) -> R) -> Result<R, BridgeError> {
        self.tree(|tree| tree.get(id).map(f))
    }

    pub fn widget_mut<R>(&self, id: ObjId, f: impl FnOnce(&mut Widget) -> R) -> Result<R, BridgeError> {
        self.tree(|tree| tree.get_mut(id).map(f))
    }

    /// Like `widget_mut`, but the object must be one of `classes`.
    pub fn class_mut<R>(
        &self,
        id: ObjId,
        classes: &[WidgetClass],
        f: impl FnOnce(&mut Widget) -> R,
    ) -> Result<R, BridgeError> {
        let name = self.name;
        self.tree(|tree| {
            let widget = tree.get_mut(id)?;
            if !classes.contains(&widget.class) {
                return Err(BridgeError::WrongClass {
                    function: name,
                    class: widget.class.name(),
                });
            }
            Ok(f(widget))
        })
    }

    pub fn class_ref<R>(&self, id: ObjId, classes: &[WidgetClass], f: impl FnOnce(&Widget) -> R) -> Result<R, BridgeError> {
        self.class_mut(id, classes, |w| f(w))
    }

    /// Encodes a live object id as a handle.
    pub fn handle(&self, id: ObjId) -> Result<Dynamic, BridgeError> {
        self.bridge.borrow().handle_of(id).map(Handle::to_dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Bridge;
    use crate::config::BridgeConfig;

    fn echo_count(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
        Ok(Dynamic::from_int(call.args.len() as INT))
    }

    const ENTRIES: &[FuncEntry] = &[FuncEntry::new("echo_count", 2, 1, echo_count)];

    fn engine() -> Engine {
        let mut engine = Engine::new();
        let bridge = Bridge::shared(BridgeConfig::default());
        install(&mut engine, &bridge, ENTRIES);
        engine
    }

    #[test]
    fn every_arity_up_to_optional_is_callable() {
        let engine = engine();
        assert_eq!(engine.eval::<INT>("echo_count(1, 2)").unwrap(), 2);
        assert_eq!(engine.eval::<INT>("echo_count(1, 2, 3)").unwrap(), 3);
        assert!(engine.eval::<INT>("echo_count(1, 2, 3, 4)").is_err());
    }

    #[test]
    fn missing_arguments_throw_type_error() {
        let engine = engine();
        let err = engine.eval::<INT>("echo_count(1)").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("TypeError"), "{message}");
        assert!(message.contains("echo_count expects at least 2"), "{message}");
    }
}
