use std::fmt::Write;
use std::sync::RwLock;

/// A calendar date carried through the writer as a first-class value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JsonDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Rendering pattern for dates.
///
/// Runs of `y`, `M` and `d` are substituted with the zero-padded year, month
/// and day; every other character is copied through. The default pattern is
/// `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn iso_date() -> Self {
        Self::new("yyyy-MM-dd")
    }

    pub fn format(&self, date: &JsonDate) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut chars = self.pattern.chars().peekable();
        while let Some(ch) = chars.next() {
            let mut run = 1;
            while chars.peek() == Some(&ch) {
                chars.next();
                run += 1;
            }
            match ch {
                'y' => {
                    let _ = write!(out, "{:0width$}", date.year, width = run);
                }
                'M' => {
                    let _ = write!(out, "{:0width$}", date.month, width = run);
                }
                'd' => {
                    let _ = write!(out, "{:0width$}", date.day, width = run);
                }
                other => {
                    for _ in 0..run {
                        out.push(other);
                    }
                }
            }
        }
        out
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::iso_date()
    }
}

static DEFAULT_DATE_FORMAT: RwLock<Option<DateFormat>> = RwLock::new(None);

/// Replace the process-wide date format used by write calls that do not
/// supply one.
///
/// This is a single writable slot read on every serialization that omits an
/// explicit format. Set it once at startup: swapping it while writes are in
/// flight hands different formats to different values of the same document.
pub fn set_default_date_format(format: DateFormat) {
    let mut slot = match DEFAULT_DATE_FORMAT.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(format);
}

/// The process-wide date format; `yyyy-MM-dd` until a caller replaces it.
pub fn default_date_format() -> DateFormat {
    let slot = match DEFAULT_DATE_FORMAT.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    slot.clone().unwrap_or_default()
}
