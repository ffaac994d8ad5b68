use rhai::{EvalAltResult, Position};
use thiserror::Error;

/// Failures raised at the script/toolkit boundary.
///
/// Every variant surfaces to scripts as a thrown runtime error whose message
/// starts with the script-side error kind (`TypeError` or `RangeError`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("TypeError: {function} expects at least {required} argument(s), got {given}")]
    ArgumentCount {
        function: &'static str,
        required: usize,
        given: usize,
    },
    #[error("TypeError: argument {index} must be {expected}, got {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: String,
    },
    #[error("RangeError: too many callbacks for event {code} (limit {limit})")]
    Capacity { code: i64, limit: usize },
    #[error("RangeError: out of memory while marshaling {len} bytes")]
    Allocation { len: usize },
    #[error("TypeError: expired handle {raw:#x}")]
    ExpiredHandle { raw: i64 },
    #[error("TypeError: {function} is not supported by a {class} object")]
    WrongClass {
        function: &'static str,
        class: &'static str,
    },
    #[error("event callback failed: {0}")]
    Callback(String),
}

impl BridgeError {
    pub fn arg_type(index: usize, expected: &'static str, found: &str) -> Self {
        BridgeError::ArgumentType {
            index,
            expected,
            found: found.to_string(),
        }
    }

    /// Converts into the runtime error thrown back into the script.
    pub fn into_script_error(self) -> Box<EvalAltResult> {
        EvalAltResult::ErrorRuntime(self.to_string().into(), Position::NONE).into()
    }
}

/// Outcome codes of starting an application package.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("app package has no main script")]
    EmptyPackage,
    #[error("invalid script: {0}")]
    InvalidScript(String),
    #[error("script exception: {0}")]
    ScriptException(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl AppError {
    /// Numeric result code reported by the app runner; `0` is success.
    pub fn code(&self) -> i32 {
        match self {
            AppError::EmptyPackage => -1,
            AppError::InvalidScript(_) => -2,
            AppError::ScriptException(_) | AppError::Bridge(_) => -3,
            AppError::Config(_) | AppError::Io(_) => -5,
        }
    }
}
