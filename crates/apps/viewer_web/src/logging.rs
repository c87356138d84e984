//! Browser console logging. `tracing` events are forwarded as `log`
//! records (no subscriber is installed in the page), and `console_log`
//! writes those to the matching console method.

use log::Level;

/// Debug events only appear when the loaded state enables diagnostics, so
/// everything down to DEBUG is let through.
pub fn init() {
    if console_log::init_with_level(Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already installed".into());
    }
}
