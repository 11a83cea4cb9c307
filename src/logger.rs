//! Run log: one file per run, truncated when the run starts.
//!
//! Default location is `<data dir>/Filterer/filterer.log` (`%APPDATA%`,
//! `~/Library/Application Support`, `$XDG_DATA_HOME` or `~/.local/share`);
//! the CLI's `--log FILE` overrides it.
//!
//! Free-form lines go through `log_info!` / `log_warn!` / `log_err!`.  Every
//! filter pass also writes one [`ApplyRecord`] line, so a log can be grepped
//! for `APPLY` to see exactly which chain touched how many pixels.  Nothing
//! is written until [`init`] has run.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ops::filters::Filter;

static SINK: OnceLock<Mutex<File>> = OnceLock::new();

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*))
    };
}

/// One filter pass over an image.
#[derive(Clone, Copy, Debug)]
pub struct ApplyRecord<'a> {
    /// `"chain"` for `apply_filters`, `"single"` for `apply_single_filter`.
    pub mode: &'static str,
    pub filters: &'a [Filter],
    pub width: u32,
    pub height: u32,
}

impl ApplyRecord<'_> {
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for ApplyRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mode={} filters=", self.mode)?;
        if self.filters.is_empty() {
            f.write_str("-")?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", filter)?;
        }
        write!(
            f,
            " pixels={} size={}x{}",
            self.pixel_count(),
            self.width,
            self.height
        )
    }
}

/// Log one filter pass.
pub fn record_apply(record: &ApplyRecord<'_>) {
    write("APPLY", &record.to_string());
}

/// Write a level-tagged line.  Dropped silently before [`init`] or on I/O
/// failure.
pub fn write(level: &str, msg: &str) {
    let Some(sink) = SINK.get() else { return };
    if let Ok(mut file) = sink.lock() {
        let _ = writeln!(file, "{} {:<5} {}", epoch_stamp(), level, msg);
    }
}

/// Open the run log at `path`, or at the default location when `None`.
/// Only the first call in a process has any effect.  Panics are mirrored
/// into the log before the default hook runs.
pub fn init(path: Option<&Path>) {
    if SINK.get().is_some() {
        return;
    }
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
    {
        Ok(f) => f,
        Err(e) => {
            // Run without a log
            eprintln!("[logger] cannot open {}: {}", path.display(), e);
            return;
        }
    };
    let _ = SINK.set(Mutex::new(file));
    write("INFO", &format!("filterer {} run log: {}", env!("CARGO_PKG_VERSION"), path.display()));

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write("PANIC", &info.to_string());
        default_hook(info);
    }));
}

fn default_log_path() -> PathBuf {
    data_dir().join("Filterer").join("filterer.log")
}

/// First platform data directory that the environment provides.
fn data_dir() -> PathBuf {
    let candidates: &[(&str, &[&str])] = if cfg!(target_os = "windows") {
        &[("APPDATA", &[])]
    } else if cfg!(target_os = "macos") {
        &[("HOME", &["Library", "Application Support"])]
    } else {
        &[("XDG_DATA_HOME", &[]), ("HOME", &[".local", "share"])]
    };
    candidates
        .iter()
        .find_map(|(var, tail)| {
            let base = std::env::var_os(var)?;
            Some(tail.iter().fold(PathBuf::from(base), |p, part| p.join(part)))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Seconds since the Unix epoch with millisecond precision.
fn epoch_stamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => format!("{}.{:03}", d.as_secs(), d.subsec_millis()),
        Err(_) => "0.000".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_record_lists_chain_and_size() {
        let chain = [Filter::red(255), Filter::grayscale()];
        let record = ApplyRecord { mode: "chain", filters: &chain, width: 3, height: 2 };
        assert_eq!(
            record.to_string(),
            "mode=chain filters=red=255,grayscale=20 pixels=6 size=3x2"
        );
    }

    #[test]
    fn apply_record_marks_empty_chain() {
        let record = ApplyRecord { mode: "chain", filters: &[], width: 1, height: 1 };
        assert_eq!(record.to_string(), "mode=chain filters=- pixels=1 size=1x1");
    }

    #[test]
    fn epoch_stamp_has_millis() {
        let stamp = epoch_stamp();
        let (secs, millis) = stamp.split_once('.').unwrap();
        assert!(secs.parse::<u64>().is_ok());
        assert_eq!(millis.len(), 3);
    }

    #[test]
    fn default_log_lives_under_app_folder() {
        assert!(default_log_path().ends_with(Path::new("Filterer").join("filterer.log")));
    }
}
