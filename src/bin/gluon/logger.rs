use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};

const RESET: &str = "\x1b[0m";

enum Color {
    Gray,
    BrightRed,
    BrightYellow,
    BrightBlue,
    BrightCyan,
    BrightMagenta,
}

impl Color {
    fn code(&self) -> &'static str {
        match self {
            Color::Gray => "\x1b[90m",
            Color::BrightRed => "\x1b[91m",
            Color::BrightYellow => "\x1b[93m",
            Color::BrightBlue => "\x1b[94m",
            Color::BrightCyan => "\x1b[96m",
            Color::BrightMagenta => "\x1b[95m",
        }
    }
}

struct Inner {
    level: LevelFilter,
}

struct CliLogger {
    inner: spin::Mutex<Inner>,
}

static LOGGER: CliLogger = CliLogger {
    inner: spin::Mutex::new(Inner {
        level: LevelFilter::Warn,
    }),
};

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.inner.lock().level
    }

    fn log(&self, record: &Record) {
        // Holding the lock keeps lines from interleaving.
        let inner = self.inner.lock();
        if record.level() > inner.level {
            return;
        }
        let level = record.level();
        let color = match level {
            Level::Error => Color::BrightRed,
            Level::Warn => Color::BrightYellow,
            Level::Info => Color::BrightBlue,
            Level::Debug => Color::BrightCyan,
            Level::Trace => Color::BrightMagenta,
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{}{level:5}{RESET} {}[{}]{RESET} {}",
            color.code(),
            Color::Gray.code(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Installs the logger. `verbosity` counts `-v` flags: 0 warns, 1 debugs, 2 or more traces.
pub fn init(verbosity: u64) -> Result<(), log::SetLoggerError> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    LOGGER.inner.lock().level = level;
    log::set_max_level(level);
    log::set_logger(&LOGGER)
}
