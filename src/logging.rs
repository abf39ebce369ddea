#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use web_sys::console;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub(crate) fn log_console(message: &str) {
    console::log_1(&message.into());
}

// Outside the browser the console bindings are unavailable; route through `log`
// so native hosts pick it up with whatever logger they install.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
pub(crate) fn log_console(message: &str) {
    log::debug!("{}", message);
}
