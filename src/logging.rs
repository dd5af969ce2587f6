pub use log::LevelFilter::*;

#[cfg(feature = "screeps")]
struct JsLog;

#[cfg(feature = "screeps")]
impl log::Log for JsLog {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let message = format!("{}", record.args());
        web_sys::console::log_1(&js_sys::JsString::from(message.as_str()).into());
    }

    fn flush(&self) {}
}

fn format_record(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!("({}) {}: {}", record.level(), record.target(), message))
}

/// Route `log` output to the game console, or to stderr when running natively.
/// Repeated calls after the first are ignored.
pub fn setup_logging(verbosity: log::LevelFilter) {
    let dispatch = fern::Dispatch::new().level(verbosity).format(format_record);

    #[cfg(feature = "screeps")]
    let dispatch = dispatch.chain(Box::new(JsLog) as Box<dyn log::Log>);

    #[cfg(not(feature = "screeps"))]
    let dispatch = dispatch.chain(std::io::stderr());

    if let Err(err) = dispatch.apply() {
        log::debug!("Logging already configured: {}", err);
    }
}

#[cfg(feature = "screeps")]
pub mod panic {
    use std::fmt::Write;
    use std::panic;
    use wasm_bindgen::prelude::wasm_bindgen;

    #[wasm_bindgen]
    extern "C" {
        type Error;

        #[wasm_bindgen(constructor)]
        fn new() -> Error;

        #[wasm_bindgen(structural, method, getter)]
        fn stack(error: &Error) -> String;

        #[wasm_bindgen(static_method_of = Error, setter, js_name = stackTraceLimit)]
        fn stack_trace_limit(size: f32);
    }

    pub fn setup_panic_hook() {
        panic::set_hook(Box::new(panic_hook));
    }

    fn panic_hook(info: &panic::PanicHookInfo) {
        let mut fmt_error = String::new();
        let _ = writeln!(fmt_error, "{}", info);

        // Backtraces don't work in wasm, borrow the JS stack instead.
        Error::stack_trace_limit(10000_f32);
        let stack = Error::new().stack();

        if stack.contains("__rust_end_short_backtrace") {
            for line in stack
                .lines()
                .skip_while(|line| !line.contains("__rust_end_short_backtrace"))
                .skip(1)
            {
                let _ = writeln!(fmt_error, "{}", line);
            }
        } else {
            let stack = stack.split_once('\n').map(|(_, s)| s).unwrap_or(stack.as_str());
            let _ = writeln!(fmt_error, "{}", stack);
        }

        log::error!("{}", fmt_error);
    }
}
