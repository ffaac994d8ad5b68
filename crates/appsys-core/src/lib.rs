//! # AppSys Core
//!
//! `appsys-core` binds an embedded [Rhai](https://rhai.rs/) engine to a
//! retained-mode widget toolkit so applications can be written as scripts.
//!
//! ## Core Features
//!
//! *   **Handles**: Native objects travel through scripts as opaque,
//!     generation-checked handles; a handle to a deleted object stops
//!     resolving instead of aliasing a new one.
//! *   **Marshaling**: Integers, booleans, strings, colors, fonts and user
//!     data are decoded from and encoded to script values with typed errors.
//! *   **Callbacks**: Script functions are registered per `(object, event)`
//!     with a wildcard code, bounded per key, and survive until the object
//!     is deleted or the app is torn down.
//! *   **Lifecycle**: Deleting an object delivers `DELETE` to its callbacks
//!     and then purges every callback the subtree held.
//! *   **Function Table**: Every native function is a `FuncEntry` with its
//!     argument counts, installed in one pass.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use appsys_core::{AppPackage, AppRuntime, BridgeConfig};
//!
//! let mut app = AppRuntime::new(BridgeConfig::default());
//! app.run(&AppPackage::from_script("hello", r#"
//!     let btn = lv_btn_create(lv_scr_act());
//!     register_event_handler(btn, lvgl_enum::LV_EVENT_CLICKED, |e| print("clicked"));
//! "#))?;
//! app.pump_until_idle()?;
//! # Ok::<(), appsys_core::AppError>(())
//! ```

/// Application packages and the app runner.
pub mod app;

/// Shared per-interpreter state and the dispatch entry points.
pub mod bridge;

/// Bridge configuration.
pub mod config;

/// Callback invocation and event objects.
pub mod dispatch;

pub mod errors;

/// Opaque handles for native objects, fonts and pointers.
pub mod handle;

/// Purges callbacks when screens report deleted objects.
pub mod lifecycle;

/// Conversions between script values and native scalars.
pub mod marshal;

/// Per-object, per-event callback storage.
pub mod registry;

/// Rhai API bindings.
pub mod scripting;

/// The native widget tree.
pub mod widgets;

pub use app::{AppPackage, AppRuntime, AppSystem};
pub use bridge::{Bridge, BridgeRef};
pub use config::BridgeConfig;
pub use dispatch::{DispatchErrorPolicy, DispatchReport};
pub use errors::{AppError, BridgeError};
pub use handle::Handle;
pub use scripting::register_rhai_api;
