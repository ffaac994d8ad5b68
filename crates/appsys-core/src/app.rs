//! # App Runner
//!
//! Loads application packages and runs them against a fresh engine and
//! bridge.
//!
//! ## Responsibilities
//! - **Packages**: `AppPackage` from a script file or a JSON manifest.
//! - **Runtime**: `AppRuntime` compiles and evaluates the main script with
//!   `app_info` in scope, then pumps queued toolkit events through the
//!   registered callbacks.
//! - **System**: `AppSystem` keeps at most one running app and tears the
//!   previous one down before starting the next.

use crate::bridge::{self, Bridge, BridgeRef};
use crate::config::BridgeConfig;
use crate::dispatch::{DispatchReport, EngineInvoker};
use crate::errors::{AppError, BridgeError};
use crate::handle::Handle;
use crate::scripting::register_rhai_api;
use crate::widgets::EventCode;
use rhai::{Dynamic, Engine, Map, Scope, AST};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, instrument, warn};

/// An application: metadata plus its main script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppPackage {
    pub app_id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip)]
    pub main_script: String,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(flatten)]
    package: AppPackage,
    /// Main script path, relative to the manifest.
    main: String,
}

impl AppPackage {
    /// A package named after `app_id` with no further metadata.
    pub fn from_script(app_id: impl Into<String>, script: impl Into<String>) -> Self {
        let app_id = app_id.into();
        Self {
            name: app_id.clone(),
            app_id,
            main_script: script.into(),
            ..Self::default()
        }
    }

    /// Loads a JSON manifest and the main script it names.
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|e| AppError::Config(e.to_string()))?;
        let script_path = path.parent().unwrap_or_else(|| Path::new(".")).join(&manifest.main);
        let mut package = manifest.package;
        package.main_script = std::fs::read_to_string(script_path)?;
        Ok(package)
    }

    /// Loads `path` as a manifest if it ends in `.json`, else as a script.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self::from_manifest(path);
        }
        let app_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        Ok(Self::from_script(app_id, std::fs::read_to_string(path)?))
    }

    /// The `app_info` map visible to the script.
    pub fn info_map(&self) -> Map {
        let mut map = Map::new();
        for (key, value) in [
            ("app_id", &self.app_id),
            ("name", &self.name),
            ("version", &self.version),
            ("author", &self.author),
            ("description", &self.description),
        ] {
            map.insert(key.into(), value.clone().into());
        }
        map
    }
}

/// One running application.
pub struct AppRuntime {
    engine: Engine,
    bridge: BridgeRef,
    scope: Scope<'static>,
    ast: Option<AST>,
    max_pump_rounds: usize,
}

impl AppRuntime {
    pub fn new(config: BridgeConfig) -> Self {
        let max_pump_rounds = config.max_pump_rounds;
        let bridge = Bridge::shared(config);
        let mut engine = Engine::new();
        register_rhai_api(&mut engine, &bridge);
        Self {
            engine,
            bridge,
            scope: Scope::new(),
            ast: None,
            max_pump_rounds,
        }
    }

    pub fn bridge(&self) -> &BridgeRef {
        &self.bridge
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compiles and evaluates the package's main script.
    #[instrument(skip_all, fields(app_id = %package.app_id))]
    pub fn run(&mut self, package: &AppPackage) -> Result<(), AppError> {
        if package.main_script.trim().is_empty() {
            return Err(AppError::EmptyPackage);
        }
        let ast = self
            .engine
            .compile(&package.main_script)
            .map_err(|e| AppError::InvalidScript(e.to_string()))?;

        self.scope = Scope::new();
        self.scope
            .push_constant("app_info", Dynamic::from_map(package.info_map()));
        info!(name = %package.name, version = %package.version, "starting app");

        let result = self.engine.run_ast_with_scope(&mut self.scope, &ast);
        self.ast = Some(ast);
        result.map_err(|e| AppError::ScriptException(e.to_string()))
    }

    /// A top-level variable of the main script.
    pub fn variable<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.scope.get_value::<Dynamic>(name)?.try_cast::<T>()
    }

    /// Queues the press/release/click sequence on `target`.
    pub fn click(&mut self, target: &Handle) -> Result<(), AppError> {
        let obj = target
            .as_object()
            .ok_or_else(|| BridgeError::arg_type(0, "an object handle", target.kind().tag()))?;
        self.bridge.borrow_mut().tree.simulate_click(obj)?;
        Ok(())
    }

    /// Queues `code` on `target`.
    pub fn fire(&mut self, target: &Handle, code: EventCode) -> Result<(), AppError> {
        let obj = target
            .as_object()
            .ok_or_else(|| BridgeError::arg_type(0, "an object handle", target.kind().tag()))?;
        self.bridge.borrow_mut().tree.queue_event(obj, code)?;
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        self.bridge.borrow().tree.has_pending()
    }

    /// Delivers the events queued so far.
    pub fn pump(&mut self) -> Result<DispatchReport, AppError> {
        let Some(ast) = &self.ast else {
            return Ok(DispatchReport::default());
        };
        let mut invoker = EngineInvoker::new(&self.engine, ast);
        Ok(bridge::pump(&self.bridge, &mut invoker)?)
    }

    /// Pumps until no events are queued, for at most `max_pump_rounds`
    /// rounds.
    pub fn pump_until_idle(&mut self) -> Result<DispatchReport, AppError> {
        let mut report = DispatchReport::default();
        for _ in 0..self.max_pump_rounds {
            if !self.has_pending() {
                return Ok(report);
            }
            report.merge(self.pump()?);
        }
        if self.has_pending() {
            warn!(rounds = self.max_pump_rounds, "events still queued after pump limit");
        }
        Ok(report)
    }

    /// Releases every callback and forgets the script. Idempotent.
    pub fn shutdown(&mut self) -> usize {
        if self.ast.take().is_none() && self.bridge.borrow().registry.is_empty() {
            return 0;
        }
        self.scope.clear();
        let released = self.bridge.borrow_mut().teardown();
        info!(released, "app stopped");
        released
    }
}

impl fmt::Debug for AppRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRuntime")
            .field("running", &self.ast.is_some())
            .field("callbacks", &self.bridge.borrow().registry.callback_count())
            .field("max_pump_rounds", &self.max_pump_rounds)
            .finish_non_exhaustive()
    }
}

impl Drop for AppRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs at most one app at a time.
pub struct AppSystem {
    config: BridgeConfig,
    current: Option<AppRuntime>,
}

impl AppSystem {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Stops the running app, if any, and starts `package`.
    ///
    /// A package that fails to start leaves no app running.
    pub fn run_app(&mut self, package: &AppPackage) -> Result<&mut AppRuntime, AppError> {
        self.stop();
        let mut runtime = AppRuntime::new(self.config.clone());
        runtime.run(package)?;
        Ok(self.current.insert(runtime))
    }

    pub fn current(&mut self) -> Option<&mut AppRuntime> {
        self.current.as_mut()
    }

    pub fn stop(&mut self) {
        if let Some(mut runtime) = self.current.take() {
            runtime.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_script_is_rejected() {
        let mut runtime = AppRuntime::new(BridgeConfig::default());
        let err = runtime.run(&AppPackage::from_script("empty", "  \n")).unwrap_err();
        assert!(matches!(err, AppError::EmptyPackage));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn syntax_errors_are_invalid_scripts() {
        let mut runtime = AppRuntime::new(BridgeConfig::default());
        let err = runtime.run(&AppPackage::from_script("bad", "let = ;")).unwrap_err();
        assert!(matches!(err, AppError::InvalidScript(_)));
        assert_eq!(err.code(), -2);
    }

    #[test]
    fn thrown_errors_are_script_exceptions() {
        let mut runtime = AppRuntime::new(BridgeConfig::default());
        let err = runtime.run(&AppPackage::from_script("boom", r#"throw "boom";"#)).unwrap_err();
        assert!(matches!(err, AppError::ScriptException(_)));
    }

    #[test]
    fn app_info_is_visible_to_the_script() {
        let mut runtime = AppRuntime::new(BridgeConfig::default());
        let mut package = AppPackage::from_script("com.example.clock", "let seen = app_info.app_id + '@' + app_info.version;");
        package.version = "1.0.2".into();
        runtime.run(&package).unwrap();
        assert_eq!(runtime.variable::<String>("seen").unwrap(), "com.example.clock@1.0.2");
    }

    #[test]
    fn manifest_names_main_script() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rhai"), "let x = 1;").unwrap();
        fs::write(
            dir.path().join("app.json"),
            r#"{ "app_id": "com.example.x", "name": "X", "version": "0.1", "main": "main.rhai" }"#,
        )
        .unwrap();

        let package = AppPackage::load(dir.path().join("app.json")).unwrap();
        assert_eq!(package.app_id, "com.example.x");
        assert_eq!(package.main_script, "let x = 1;");
        assert_eq!(package.author, "");
    }

    #[test]
    fn running_a_new_app_tears_down_the_previous_one() {
        let mut system = AppSystem::new(BridgeConfig::default());
        let first = AppPackage::from_script(
            "first",
            "let btn = lv_btn_create(lv_scr_act()); register_event_handler(btn, 10, |e| 1);",
        );
        let old_bridge = system.run_app(&first).unwrap().bridge().clone();
        assert_eq!(old_bridge.borrow().registry.callback_count(), 1);

        system.run_app(&AppPackage::from_script("second", "let y = 2;")).unwrap();
        assert!(old_bridge.borrow().registry.is_empty());
        assert!(system.current().is_some());
    }
}
