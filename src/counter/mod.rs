//! Persisted intermediary counters.
//!
//! The counter file is plain text and human-editable. Populated lines match
//! `# INTERMEDIARY-COUNTER <kind> <n>` with kind one of `class`, `method` or
//! `field`; blank lines and anything else are ignored on read, and line order
//! does not matter. A file missing any of the three kinds fails to load.
//! Counters are written back once, at the end of a generation run, in
//! method/field/class order.

use regex::Regex;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Counter file errors
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("failed to read counter file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write counter file: {0}")]
    Write(#[source] std::io::Error),
    #[error("counter file is missing the {0} counter")]
    MissingKind(&'static str),
    #[error("counter value out of range: {0}")]
    ValueOutOfRange(String),
}

const COUNTER_LINE: &str = r"^# INTERMEDIARY-COUNTER (class|method|field) (\d+)$";

fn counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COUNTER_LINE).expect("counter pattern is valid"))
}

/// The three intermediary counters.
///
/// Each holds the *next* value to assign; a fresh run starts all three at 1.
/// Counters only ever increase during a run and are persisted in full at run
/// end, never incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterState {
    pub class: u64,
    pub method: u64,
    pub field: u64,
}

impl Default for CounterState {
    fn default() -> Self {
        Self {
            class: 1,
            method: 1,
            field: 1,
        }
    }
}

impl CounterState {
    /// Load counters from a previously saved file.
    ///
    /// All three kinds must be present somewhere in the file; absence of any
    /// one is a load error, so a half-written or wrong file cannot silently
    /// restart numbering.
    pub fn load(path: &Path) -> Result<Self, CounterError> {
        let contents = fs::read_to_string(path).map_err(CounterError::Read)?;

        let mut class = None;
        let mut method = None;
        let mut field = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(caps) = counter_pattern().captures(line) else {
                continue;
            };

            let value: u64 = caps[2]
                .parse()
                .map_err(|_| CounterError::ValueOutOfRange(caps[2].to_string()))?;

            match &caps[1] {
                "class" => class = Some(value),
                "method" => method = Some(value),
                "field" => field = Some(value),
                _ => unreachable!("pattern only admits the three kinds"),
            }
        }

        Ok(Self {
            class: class.ok_or(CounterError::MissingKind("class"))?,
            method: method.ok_or(CounterError::MissingKind("method"))?,
            field: field.ok_or(CounterError::MissingKind("field"))?,
        })
    }

    /// Overwrite the counter file with the current state.
    pub fn save(&self, path: &Path) -> Result<(), CounterError> {
        let file = fs::File::create(path).map_err(CounterError::Write)?;
        let mut writer = BufWriter::new(file);

        // Historical write order: method, field, class.
        writeln!(writer, "# INTERMEDIARY-COUNTER method {}", self.method)
            .map_err(CounterError::Write)?;
        writeln!(writer, "# INTERMEDIARY-COUNTER field {}", self.field)
            .map_err(CounterError::Write)?;
        writeln!(writer, "# INTERMEDIARY-COUNTER class {}", self.class)
            .map_err(CounterError::Write)?;

        writer.flush().map_err(CounterError::Write)
    }

    /// Take the next class number.
    pub fn next_class(&mut self) -> u64 {
        let n = self.class;
        self.class += 1;
        n
    }

    /// Take the next method number.
    pub fn next_method(&mut self) -> u64 {
        let n = self.method;
        self.method += 1;
        n
    }

    /// Take the next field number.
    pub fn next_field(&mut self) -> u64 {
        let n = self.field;
        self.field += 1;
        n
    }
}
