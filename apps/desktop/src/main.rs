//! # Dukkan Host Entry Point
//!
//! Spawned by the UI. Reads JSON requests on stdin, answers on stdout, logs
//! to stderr. See [`dukkan_desktop_lib::run`] for the startup sequence.
//!
//! ```text
//! $ echo '{"op":"login","args":{"username":"admin","password":"password"}}' | dukkan-desktop
//! {"ok":true,"data":{"id":"...","username":"admin","role":"admin"}}
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match dukkan_desktop_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dukkan-desktop: {}", e);
            ExitCode::FAILURE
        }
    }
}
