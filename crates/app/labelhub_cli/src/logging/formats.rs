use flexi_logger::DeferredNow;
use log::Record;

/// `LEVEL message`, with the module path added at debug and below.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    if record.level() <= log::Level::Info {
        write!(w, "{:<5} {}", record.level(), record.args())
    } else {
        write!(
            w,
            "{:<5} [{}] {}",
            record.level(),
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        )
    }
}
