//! FFI bindings for MindScope fusion
//!
//! C-compatible functions for calling the engine from other languages.
//! All functions take null-terminated C strings and return allocated memory that
//! must be freed by the caller using `mindscope_free_string`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{assess_json, behavior_json, FusionProcessor};
use crate::types::Modality;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Like `cstr_to_string`, recording an error naming `what` on failure
unsafe fn required_string(ptr: *const c_char, what: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {what} string pointer"));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Map a Rust result onto the C convention: string or NULL plus last error
fn into_c_result<E: std::fmt::Display>(result: Result<String, E>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Assess pre-classified modality inputs (JSON) and return the payload JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindscope_free_string`.
/// - Returns NULL on error; call `mindscope_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscope_assess_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_string(json, "JSON") else {
        return ptr::null_mut();
    };
    into_c_result(assess_json(json_str))
}

/// Analyze a behavioral profile (JSON) and return the analysis JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindscope_free_string`.
/// - Returns NULL on error; call `mindscope_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscope_behavior_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_string(json, "JSON") else {
        return ptr::null_mut();
    };
    into_c_result(behavior_json(json_str))
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to an engine with one user's history
pub struct MindscopeEngineHandle {
    processor: FusionProcessor,
}

/// Create an engine.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it must
///   be a valid null-terminated C string holding an engine configuration.
/// - Must be freed with `mindscope_engine_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_new(
    config_json: *const c_char,
) -> *mut MindscopeEngineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let Some(json) = required_string(config_json, "config") else {
            return ptr::null_mut();
        };
        match EngineConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match FusionProcessor::with_config(config) {
        Ok(processor) => Box::into_raw(Box::new(MindscopeEngineHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_free(engine: *mut MindscopeEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Assess inputs (JSON) with the engine's history.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `mindscope_free_string`.
/// - Returns NULL on error; call `mindscope_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_assess(
    engine: *mut MindscopeEngineHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &mut *engine;

    let Some(json_str) = required_string(json, "JSON") else {
        return ptr::null_mut();
    };
    into_c_result(handle.processor.process_json(&json_str))
}

/// Replace the fusion weights from a JSON object such as `{"text": 0.5, "image": 0.5}`.
///
/// Weights that do not sum to 1 are renormalized.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_set_weights(
    engine: *mut MindscopeEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &*engine;

    let Some(json_str) = required_string(json, "JSON") else {
        return -1;
    };
    let raw: HashMap<String, f64> = match serde_json::from_str(&json_str) {
        Ok(raw) => raw,
        Err(e) => {
            set_last_error(&e.to_string());
            return -1;
        }
    };

    let mut weights = HashMap::new();
    for (name, weight) in raw {
        match name.parse::<Modality>() {
            Ok(modality) => {
                weights.insert(modality, weight);
            }
            Err(e) => {
                set_last_error(&e.to_string());
                return -1;
            }
        }
    }

    handle.processor.engine().update_fusion_weights(&weights);
    0
}

/// Current fusion weights as a JSON object.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`.
/// - Returns a newly allocated string that must be freed with `mindscope_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_get_weights(
    engine: *mut MindscopeEngineHandle,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    into_c_result(serde_json::to_string(
        &handle.processor.engine().get_fusion_weights(),
    ))
}

/// Save the engine's history to JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`.
/// - Returns a newly allocated string that must be freed with `mindscope_free_string`.
/// - Returns NULL on error; call `mindscope_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_save_history(
    engine: *mut MindscopeEngineHandle,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    into_c_result(handle.processor.save_history())
}

/// Load the engine's history from JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `mindscope_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn mindscope_engine_load_history(
    engine: *mut MindscopeEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &mut *engine;

    let Some(json_str) = required_string(json, "JSON") else {
        return -1;
    };

    match handle.processor.load_history(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by MindScope functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a MindScope function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mindscope_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next MindScope call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mindscope_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mindscope_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs_json() -> CString {
        CString::new(
            r#"{
                "text": {"emotion": "happy", "stress_score": 0.2, "confidence": 0.8},
                "image": {"dominant_emotion": "sad", "stress_score": 0.7, "confidence": 0.6}
            }"#,
        )
        .unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        mindscope_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_assess_json() {
        let json = inputs_json();
        unsafe {
            let result = take_string(mindscope_assess_json(json.as_ptr()));
            let payload: serde_json::Value = serde_json::from_str(&result).unwrap();
            assert_eq!(payload["report"]["final_category"], "moderate");
        }
    }

    #[test]
    fn test_ffi_behavior_json() {
        let json = CString::new(r#"{"posting_frequency": 2.6}"#).unwrap();
        unsafe {
            let result = take_string(mindscope_behavior_json(json.as_ptr()));
            assert!(result.contains("\"high\""));
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        unsafe {
            let engine = mindscope_engine_new(ptr::null());
            assert!(!engine.is_null());

            let json = inputs_json();
            let payload = take_string(mindscope_engine_assess(engine, json.as_ptr()));
            assert!(payload.contains("report_id"));

            let weights = CString::new(r#"{"text": 1, "image": 1, "behavioral": 2}"#).unwrap();
            assert_eq!(mindscope_engine_set_weights(engine, weights.as_ptr()), 0);
            let current: HashMap<String, f64> =
                serde_json::from_str(&take_string(mindscope_engine_get_weights(engine))).unwrap();
            assert!((current["behavioral"] - 0.5).abs() < 1e-12);

            let history = mindscope_engine_save_history(engine);
            assert!(!history.is_null());

            let engine2 = mindscope_engine_new(ptr::null());
            assert_eq!(mindscope_engine_load_history(engine2, history), 0);

            mindscope_free_string(history);
            mindscope_engine_free(engine);
            mindscope_engine_free(engine2);
        }
    }

    #[test]
    fn test_ffi_engine_with_config() {
        let config = CString::new(r#"{"history_window": 5}"#).unwrap();
        let bad = CString::new(r#"{"history_window": 0}"#).unwrap();
        unsafe {
            let engine = mindscope_engine_new(config.as_ptr());
            assert!(!engine.is_null());
            mindscope_engine_free(engine);

            assert!(mindscope_engine_new(bad.as_ptr()).is_null());
            assert!(!mindscope_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid = CString::new("not json").unwrap();
            assert!(mindscope_assess_json(invalid.as_ptr()).is_null());

            let error = mindscope_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            assert!(mindscope_assess_json(ptr::null()).is_null());

            let engine = mindscope_engine_new(ptr::null());
            let unknown = CString::new(r#"{"audio": 1.0}"#).unwrap();
            assert_eq!(mindscope_engine_set_weights(engine, unknown.as_ptr()), -1);
            mindscope_engine_free(engine);

            assert!(mindscope_engine_assess(ptr::null_mut(), invalid.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = mindscope_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
