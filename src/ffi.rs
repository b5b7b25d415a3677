//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `hyper_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `hyper_free_buffer` / `hyper_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int`:
//!   `0` success, `1` null argument, `2` invalid UTF-8, `3` pipeline error.
//! - Error details can be retrieved via `hyper_last_error`.
//!
//! ## Thread safety
//! - `hyper_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//!
//! ## Usage from Go (cgo)
//! ```go
//! // #cgo LDFLAGS: -lhyperpdf
//! // #include "hyperpdf.h"
//! import "C"
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::draw::{commands_from_json, commands_to_json};
use crate::pipeline::{
    compute_draw_commands, generate_pdf, render_commands, PageOrientation, PipelineConfig,
};

const ERR_NULL: c_int = 1;
const ERR_UTF8: c_int = 2;
const ERR_PIPELINE: c_int = 3;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Page orientation for use in [`HyperPipelineConfig`].
#[repr(C)]
pub enum HyperPageOrientation {
    /// Portrait mode: height > width (default).
    Portrait = 0,
    /// Landscape mode: width > height.
    Landscape = 1,
}

/// Optional configuration passed to the `*_ex` functions.
///
/// Fields set to `0` (or `NULL` for `title`) fall back to their A4 defaults:
/// - `page_width`  → 595.28 pt
/// - `page_height` → 841.89 pt
/// - margins       → 40 pt
/// - `title`       → "hyperpdf output"
#[repr(C)]
pub struct HyperPipelineConfig {
    /// Null-terminated UTF-8 document title embedded in PDF metadata.
    pub title: *const c_char,
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    /// Page orientation (portrait = 0, landscape = 1).
    pub orientation: HyperPageOrientation,
}

/// Convert a [`HyperPipelineConfig`] to a [`PipelineConfig`]. A null pointer
/// yields the defaults.
///
/// # Safety
/// `cfg`, if non-null, must point to a valid config whose `title` (if
/// non-null) is a valid null-terminated string.
unsafe fn pipeline_config_from_c(cfg: *const HyperPipelineConfig) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let Some(cfg) = cfg.as_ref() else {
        return defaults;
    };
    let or_default = |value: f32, default: f32| if value == 0.0 { default } else { value };

    let title = if cfg.title.is_null() {
        defaults.title.clone()
    } else {
        CStr::from_ptr(cfg.title)
            .to_str()
            .map(str::to_string)
            .unwrap_or_else(|_| defaults.title.clone())
    };

    PipelineConfig {
        title,
        page_width: or_default(cfg.page_width, defaults.page_width),
        page_height: or_default(cfg.page_height, defaults.page_height),
        margin_left: or_default(cfg.margin_left, defaults.margin_left),
        margin_top: or_default(cfg.margin_top, defaults.margin_top),
        margin_right: or_default(cfg.margin_right, defaults.margin_right),
        orientation: match cfg.orientation {
            HyperPageOrientation::Portrait => PageOrientation::Portrait,
            HyperPageOrientation::Landscape => PageOrientation::Landscape,
        },
    }
}

/// Borrow `len` bytes at `ptr` as UTF-8.
///
/// # Safety
/// `ptr` must point to `len` readable bytes that outlive the returned slice.
unsafe fn input_str<'a>(ptr: *const u8, len: u32) -> Result<&'a str, c_int> {
    let bytes = slice::from_raw_parts(ptr, len as usize);
    std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        ERR_UTF8
    })
}

/// Hand a byte buffer to the caller.
///
/// # Safety
/// `out_buf` and `out_len` must be valid for writes.
unsafe fn write_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    *out_buf = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    *out_len = len;
}

/// Hand a string to the caller.
///
/// # Safety
/// `out` must be valid for writes.
unsafe fn write_string(s: String, out: *mut *mut c_char) -> c_int {
    match CString::new(s) {
        Ok(cs) => {
            *out = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            ERR_PIPELINE
        }
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Generate a PDF from a JSON style document with the default A4 config.
///
/// # Parameters
/// - `json_ptr`: pointer to UTF-8 JSON bytes (not necessarily null-terminated)
/// - `json_len`: length of the JSON data in bytes
/// - `out_buf`: on success, receives a pointer to heap-allocated PDF bytes
/// - `out_len`: on success, receives the length of the PDF buffer
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `hyper_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `hyper_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn hyper_generate_pdf(
    json_ptr: *const u8,
    json_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    hyper_generate_pdf_ex(json_ptr, json_len, ptr::null(), out_buf, out_len)
}

/// Generate a PDF with a custom [`HyperPipelineConfig`].
///
/// # Safety
/// As [`hyper_generate_pdf`]. `cfg` may be `NULL`; otherwise it must point to
/// a fully initialised [`HyperPipelineConfig`].
#[no_mangle]
pub unsafe extern "C" fn hyper_generate_pdf_ex(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const HyperPipelineConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let json = match input_str(json_ptr, json_len) {
        Ok(s) => s,
        Err(rc) => return rc,
    };
    let config = pipeline_config_from_c(cfg);

    match generate_pdf(json, &config) {
        Ok((pdf_bytes, _commands)) => {
            write_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ERR_PIPELINE
        }
    }
}

/// Compute only the draw-command stream. Returns JSON.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `cfg` may be `NULL`.
/// - `*out_json_ptr` must be freed with `hyper_free_string`.
#[no_mangle]
pub unsafe extern "C" fn hyper_draw_commands(
    json_ptr: *const u8,
    json_len: u32,
    cfg: *const HyperPipelineConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let json = match input_str(json_ptr, json_len) {
        Ok(s) => s,
        Err(rc) => return rc,
    };
    let config = pipeline_config_from_c(cfg);

    let serialized = compute_draw_commands(json, &config)
        .map_err(|e| e.to_string())
        .and_then(|commands| commands_to_json(&commands).map_err(|e| e.to_string()));
    match serialized {
        Ok(out) => write_string(out, out_json_ptr),
        Err(e) => {
            set_last_error(&e);
            ERR_PIPELINE
        }
    }
}

/// Render a PDF from a draw-command JSON string produced by
/// [`hyper_draw_commands`].
///
/// # Safety
/// - `commands_ptr` must be a valid null-terminated string.
/// - `cfg` may be `NULL`.
/// - The caller must free `*out_buf` with `hyper_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn hyper_render_commands(
    commands_ptr: *const c_char,
    cfg: *const HyperPipelineConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if commands_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let json = match CStr::from_ptr(commands_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return ERR_UTF8;
        }
    };
    let config = pipeline_config_from_c(cfg);

    let rendered = commands_from_json(json)
        .map_err(|e| format!("Invalid command JSON: {e}"))
        .and_then(|commands| render_commands(&commands, &config).map_err(|e| e.to_string()));
    match rendered {
        Ok(pdf_bytes) => {
            write_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e);
            ERR_PIPELINE
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `hyper_generate_pdf` (or similar).
///
/// # Safety
/// `buf` must have been returned by a previous `hyper_*` call, and `len` must
/// be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn hyper_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned by `hyper_draw_commands`.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn hyper_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next failing `hyper_*` call on the
/// same thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn hyper_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn hyper_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
