//! C ABI entry points for embedding a [`Session`] in a foreign host.
//!
//! A C ABI cannot be generic, so the concrete engine is chosen by the embedding crate:
//!
//! ```ignore
//! plwasm::export_session_abi!(MyEngine, MyEngine::new());
//! ```
//!
//! That expands to `plwasm_session_new`, `plwasm_initialize`, `plwasm_set_data`,
//! `plwasm_execute`, `plwasm_console_result`, `plwasm_ui_config` and `plwasm_session_free`.
//! Handles are opaque. A null handle is ignored and the getters then return an empty string.
//!
//! Strings returned to the host stay valid until the next `plwasm_execute` or
//! `plwasm_session_free` on the same handle.

use std::any::Any;
use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use plwasm_engine::{EngineFault, PatternEngine};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::{RunOutcome, Session};

static EMPTY: [u8; 1] = [0];

/// A [`Session`] plus the NUL-terminated copies of its results handed out to the host.
pub struct HostSession<E> {
    session: Session<E>,
    console: CString,
    ui_config: CString,
}

impl<E: PatternEngine> HostSession<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    pub fn with_config(engine: E, config: SessionConfig) -> Self {
        Self {
            session: Session::with_config(engine, config),
            console: CString::default(),
            ui_config: c"[]".to_owned(),
        }
    }

    pub fn initialize(&mut self) {
        #[cfg(feature = "host-logger")]
        install_logger(self.session.config());
        self.session.initialize();
    }

    pub fn set_data(&mut self, data: &[u8]) {
        self.session.bind(Bytes::copy_from_slice(data));
    }

    /// Run `script`. An engine panic is reported as a fault instead of unwinding into the host.
    ///
    /// Catching needs `panic = "unwind"`. On `wasm32-unknown-unknown` panics always abort, so
    /// there a panicking engine takes the whole module down.
    pub fn execute(&mut self, script: &str) -> RunOutcome {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.session.run(script))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let fault = EngineFault::new(panic_message(payload.as_ref()));
                self.session.record_fault(fault)
            }
        };
        self.refresh();
        outcome
    }

    pub fn console_result(&self) -> &CStr {
        &self.console
    }

    pub fn ui_config(&self) -> &CStr {
        &self.ui_config
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    fn refresh(&mut self) {
        match host_string(self.session.transcript()) {
            Ok(console) => self.console = console,
            Err(e) => log::error!("keeping previous console result: {e}"),
        }
        match self.session.schema_json().and_then(host_string) {
            Ok(ui_config) => self.ui_config = ui_config,
            Err(e) => log::error!("keeping previous ui config: {e}"),
        }
    }
}

#[cfg(feature = "host-logger")]
fn install_logger(config: &SessionConfig) {
    // Another logger may already be installed by the host.
    let _ = env_logger::Builder::new()
        .filter_level(config.logger_config().level_filter)
        .try_init();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn host_string(text: String) -> Result<CString, SessionError> {
    Ok(CString::new(text)?)
}

pub fn into_handle<E>(host: HostSession<E>) -> *mut c_void {
    Box::into_raw(Box::new(host)) as *mut c_void
}

/// # Safety
/// `handle` must be null or come from [`into_handle`] with the same `E`, and not be freed yet.
pub unsafe fn host_mut<'a, E>(handle: *mut c_void) -> Option<&'a mut HostSession<E>> {
    unsafe { (handle as *mut HostSession<E>).as_mut() }
}

/// # Safety
/// Same as [`host_mut`]. The handle is dangling afterwards.
pub unsafe fn free_handle<E>(handle: *mut c_void) {
    if handle.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(handle as *mut HostSession<E>) });
}

/// # Safety
/// Unless null or `len` is 0, `data` must point to `len` readable bytes.
pub unsafe fn bytes_from_raw<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() || len == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(data, len) }
}

/// Invalid UTF-8 is replaced, a null pointer reads as an empty script.
///
/// # Safety
/// Unless null, `text` must point to a NUL-terminated string.
pub unsafe fn str_from_raw<'a>(text: *const c_char) -> Cow<'a, str> {
    if text.is_null() {
        return Cow::Borrowed("");
    }
    unsafe { CStr::from_ptr(text) }.to_string_lossy()
}

pub fn empty_c_str() -> *const c_char {
    EMPTY.as_ptr() as *const c_char
}

/// Export the `plwasm_*` C ABI for engine type `$engine`, built by `$ctor` for every new handle.
#[macro_export]
macro_rules! export_session_abi {
    ($engine:ty, $ctor:expr) => {
        #[no_mangle]
        pub extern "C" fn plwasm_session_new() -> *mut ::std::ffi::c_void {
            $crate::ffi::into_handle($crate::ffi::HostSession::<$engine>::new($ctor))
        }

        /// # Safety
        /// `handle` must be null or a live handle from `plwasm_session_new`.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_initialize(handle: *mut ::std::ffi::c_void) {
            if let Some(host) = unsafe { $crate::ffi::host_mut::<$engine>(handle) } {
                host.initialize();
            }
        }

        /// # Safety
        /// `handle` as for `plwasm_initialize`; `data` must point to `len` readable bytes.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_set_data(
            handle: *mut ::std::ffi::c_void,
            data: *const u8,
            len: usize,
        ) {
            if let Some(host) = unsafe { $crate::ffi::host_mut::<$engine>(handle) } {
                host.set_data(unsafe { $crate::ffi::bytes_from_raw(data, len) });
            }
        }

        /// # Safety
        /// `handle` as for `plwasm_initialize`; `code` must be null or NUL-terminated.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_execute(
            handle: *mut ::std::ffi::c_void,
            code: *const ::std::ffi::c_char,
        ) {
            if let Some(host) = unsafe { $crate::ffi::host_mut::<$engine>(handle) } {
                let code = unsafe { $crate::ffi::str_from_raw(code) };
                host.execute(&code);
            }
        }

        /// # Safety
        /// `handle` as for `plwasm_initialize`.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_console_result(
            handle: *mut ::std::ffi::c_void,
        ) -> *const ::std::ffi::c_char {
            match unsafe { $crate::ffi::host_mut::<$engine>(handle) } {
                Some(host) => host.console_result().as_ptr(),
                None => $crate::ffi::empty_c_str(),
            }
        }

        /// # Safety
        /// `handle` as for `plwasm_initialize`.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_ui_config(
            handle: *mut ::std::ffi::c_void,
        ) -> *const ::std::ffi::c_char {
            match unsafe { $crate::ffi::host_mut::<$engine>(handle) } {
                Some(host) => host.ui_config().as_ptr(),
                None => $crate::ffi::empty_c_str(),
            }
        }

        /// # Safety
        /// `handle` as for `plwasm_initialize`; it must not be used afterwards.
        #[no_mangle]
        pub unsafe extern "C" fn plwasm_session_free(handle: *mut ::std::ffi::c_void) {
            unsafe { $crate::ffi::free_handle::<$engine>(handle) }
        }
    };
}
