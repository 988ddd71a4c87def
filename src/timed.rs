/// Log the start and end of a block of work, with its elapsed time, at `info`.
#[macro_export]
macro_rules! timed {
    (@run $msg:ident, $closure:expr) => {{
        let start_time = ::std::time::Instant::now();
        ::log::info!("Start: {}", $msg);

        let out = $closure();

        ::log::info!("End:   {}: {:?}", $msg, start_time.elapsed());

        out
    }};
    ($msg:expr, $($args:expr),+ ; $closure:expr) => {{
        let msg = format!($msg, $($args),+);
        $crate::timed!(@run msg, $closure)
    }};
    ($msg:expr ; $closure:expr) => {{
        let msg: &str = $msg;
        $crate::timed!(@run msg, $closure)
    }};
}
