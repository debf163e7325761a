pub use colored::Colorize;
pub use log::{max_level, set_max_level, Level, LevelFilter};

/// Returns whether a message at `level` would currently be printed.
/// Nothing passes until [`set_max_level`] raises the filter above `Off`.
pub fn enabled(level: Level) -> bool {
    level <= max_level()
}

/// Internal macro used to deduplicate logic.
/// Please do not use this. This is an implementation
/// detail and may disappear at any time. This macro
/// is public because `macro_rules!` is limited.
#[cfg(debug_assertions)]
#[doc(hidden)]
#[macro_export]
macro_rules! log {
    (($name:ident, $level:ident, $colour:ident) => $fmt:literal $(, $arg:expr)* $(,)?) => {{
        if $crate::enabled($crate::Level::$level) {
            use $crate::Colorize as _;

            eprintln!(
                "{} {} {}",
                concat!("[", stringify!($name), "]").$colour(),
                concat!(file!(), ":", line!(), ":").yellow(),
                format!($fmt $(, $arg)*)
            );
        }
    }};
}

#[cfg(not(debug_assertions))]
#[doc(hidden)]
#[macro_export]
macro_rules! log {
    (($name:ident, $level:ident, $colour:ident) => $fmt:literal $(, $arg:expr)* $(,)?) => {{
        if $crate::enabled($crate::Level::$level) {
            use $crate::Colorize as _;

            eprintln!(
                "{} {}",
                concat!("[", stringify!($name), "]").$colour(),
                format!($fmt $(, $arg)*)
            );
        }
    }};
}

/// For verbose output tracking the execution of the program.
#[macro_export]
macro_rules! trace {
    ($($input:tt)*) => {
        $crate::log!((trace, Trace, purple) => $($input)*)
    };
}

/// For additional information that might be helpful for debugging.
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug {
    ($($input:tt)*) => {
        $crate::log!((debug, Debug, cyan) => $($input)*)
    };
}

/// Compiled out of release builds, but the arguments are still typechecked.
#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug {
    ($($input:tt)*) => {{
        if false {
            $crate::log!((debug, Debug, cyan) => $($input)*)
        }
    }};
}

/// Information that may be useful to the user.
#[macro_export]
macro_rules! info {
    ($($input:tt)*) => {
        $crate::log!((info, Info, blue) => $($input)*)
    };
}

/// An alert that something may have gone wrong.
#[macro_export]
macro_rules! warning {
    ($($input:tt)*) => {
        $crate::log!((warning, Warn, bright_yellow) => $($input)*)
    };
}

/// An alert that something has gone horribly wrong.
#[macro_export]
macro_rules! error {
    ($($input:tt)*) => {
        $crate::log!((error, Error, bright_red) => $($input)*)
    };
}
