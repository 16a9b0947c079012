use std::fmt;

/// Severity of a [`Record`](crate::Record).
///
/// The named levels run from [`Level::TRACE`] to [`Level::FATAL`]. Any other
/// number is still a valid level and renders relative to the nearest named
/// one, e.g. `TRACE-2` or `FATAL+1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    pub const TRACE: Level = Level(0);
    pub const DEBUG: Level = Level(1);
    pub const INFO: Level = Level(2);
    pub const WARN: Level = Level(3);
    pub const ERROR: Level = Level(4);
    /// Programmer error, above the highest recoverable severity.
    pub const PANIC: Level = Level(5);
    pub const FATAL: Level = Level(6);

    /// Step between adjacent levels on the filter scale.
    const FILTER_STEP: i32 = 4;

    pub const fn new(n: i32) -> Self {
        Level(n)
    }

    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Map onto the quantized filter scale, where [`Level::INFO`] is zero and
    /// each named level is four units from its neighbours. Saturates at the
    /// ends of the `i32` range.
    pub const fn to_filter(self) -> i32 {
        self.0
            .saturating_sub(Self::INFO.0)
            .saturating_mul(Self::FILTER_STEP)
    }

    /// Inverse of [`Level::to_filter`]; values between steps truncate
    /// toward [`Level::INFO`].
    pub const fn from_filter(value: i32) -> Self {
        Level((value / Self::FILTER_STEP).saturating_add(Self::INFO.0))
    }

    /// Mnemonic for a named level, `None` outside the named range.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("TRACE"),
            1 => Some("DEBUG"),
            2 => Some("INFO"),
            3 => Some("WARN"),
            4 => Some("ERROR"),
            5 => Some("PANIC"),
            6 => Some("FATAL"),
            _ => None,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if *self < Level::TRACE => {
                write!(f, "TRACE-{}", i64::from(Level::TRACE.0) - i64::from(self.0))
            }
            None => write!(f, "FATAL+{}", i64::from(self.0) - i64::from(Level::FATAL.0)),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::TRACE,
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            tracing::Level::ERROR => Level::ERROR,
        }
    }
}
