//! # Flight counts per airline
//!
//! Reads an airline lookup file (`code::name` per line) and a flight record
//! file whose lines start with a two character airline code, then tallies
//! the flights of every known airline.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::Instant;

use chumsky::prelude::*;
use tracing::instrument;

/// Name printed for a tallied code that has no entry in [Airlines].
pub const UNKNOWN_AIRLINE: &str = "Unknown Airline";

/// Number of leading characters of a flight record holding the airline code.
const CODE_LEN: usize = 2;

/// Airline code to display name lookup.
#[derive(Debug, Default)]
pub struct Airlines {
    names: HashMap<String, String>,
}

impl Airlines {
    /// Build the lookup from `code::name` lines.
    ///
    /// `\r\n` and a lone `\r` both end a line.
    /// Lines that do not split into exactly two fields on `::` are skipped.
    /// A code seen twice keeps the name from its last line.
    #[instrument(skip(s))]
    pub fn from_str(s: &str) -> Airlines {
        let ts = Instant::now();
        let s = unify_line_ends(s);
        let parser = line_parser();

        let mut names = HashMap::new();
        let mut skipped = 0;

        for (lineno, line) in s.lines().enumerate() {
            match parser.parse(line.trim()) {
                Ok((code, name)) => {
                    names.insert(code, name);
                }
                Err(err) => {
                    tracing::trace!(line = lineno + 1, "Skipping airline line: {:?}", err);
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            elapsed_μs = ts.elapsed().as_micros(),
            "Loaded {} airlines, skipped {} lines.",
            names.len(),
            skipped
        );

        Airlines { names }
    }

    #[instrument(fields(path = %path.as_ref().to_string_lossy()))]
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Airlines> {
        let s = read_utf8(path.as_ref())?;
        Ok(Self::from_str(&s))
    }

    /// Display name for `code`.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All `(code, name)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Flight counts per airline code, kept in the order the codes were first seen.
#[derive(Debug, Default)]
pub struct FlightTally {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FlightTally {
    pub fn new() -> FlightTally {
        FlightTally::default()
    }

    /// Count flight records per airline.
    ///
    /// The code of a record is its first two characters, taken as is from the
    /// line including the line terminator. `\r\n` and a lone `\r` end a
    /// line and are read as `\n`. Records whose code is not in `airlines`
    /// are ignored.
    #[instrument(skip(s, airlines))]
    pub fn from_str(s: &str, airlines: &Airlines) -> FlightTally {
        let ts = Instant::now();
        let s = unify_line_ends(s);
        let mut tally = FlightTally::new();
        let mut records = 0;

        for line in s.split_inclusive('\n') {
            records += 1;
            let code = code_prefix(line);
            if airlines.contains(code) {
                tally.record(code);
            } else {
                tracing::trace!("No airline for record code {code:?}.");
            }
        }

        tracing::debug!(
            elapsed_ms = ts.elapsed().as_millis(),
            "Scanned {} records. {} matched {} airlines.",
            records,
            tally.total(),
            tally.len()
        );

        tally
    }

    #[instrument(skip(airlines), fields(path = %path.as_ref().to_string_lossy()))]
    pub fn from_path<P: AsRef<Path>>(path: P, airlines: &Airlines) -> io::Result<FlightTally> {
        let s = read_utf8(path.as_ref())?;
        Ok(Self::from_str(&s, airlines))
    }

    /// Add one flight for `code`.
    ///
    /// No lookup check happens here; [FlightTally::from_str] only records
    /// known codes.
    pub fn record(&mut self, code: &str) {
        if let Some(&i) = self.index.get(code) {
            self.counts[i].1 += 1;
        } else {
            self.index.insert(code.to_owned(), self.counts.len());
            self.counts.push((code.to_owned(), 1));
        }
    }

    pub fn get(&self, code: &str) -> Option<u64> {
        self.index.get(code).map(|&i| self.counts[i].1)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// `(code, count)` pairs in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(c, n)| (c.as_str(), *n))
    }
}

/// Printable flight report, one `<name>: <count>` line per tallied airline.
pub struct Report<'a> {
    tally: &'a FlightTally,
    airlines: &'a Airlines,
}

impl<'a> Report<'a> {
    pub fn new(tally: &'a FlightTally, airlines: &'a Airlines) -> Report<'a> {
        Report { tally, airlines }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, count) in self.tally.iter() {
            let name = self.airlines.get(code).unwrap_or(UNKNOWN_AIRLINE);
            writeln!(f, "{}: {}", name, format_count(count))?;
        }
        Ok(())
    }
}

/// Format `n` with a `,` between every group of three digits.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn read_utf8(path: &Path) -> io::Result<String> {
    let s = std::fs::read(path).map_err(|err| {
        tracing::error!("Cannot read {}: {}", path.display(), err);
        err
    })?;
    String::from_utf8(s).map_err(|err| {
        tracing::error!("{} is not valid UTF-8: {}", path.display(), err);
        io::Error::new(io::ErrorKind::InvalidData, err)
    })
}

/// Rewrite `\r\n` and lone `\r` line ends as `\n`.
fn unify_line_ends(s: &str) -> Cow<'_, str> {
    if !s.contains('\r') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
}

/// First [CODE_LEN] characters of `line`, or all of it when shorter.
fn code_prefix(line: &str) -> &str {
    match line.char_indices().nth(CODE_LEN) {
        Some((end, _)) => &line[..end],
        None => line,
    }
}

/// A single `code::name` line. Either field may be empty, but neither may
/// contain `::`.
fn line_parser() -> impl Parser<char, (String, String), Error = Simple<char>> {
    let field = || {
        just::<char, _, Simple<char>>("::")
            .not()
            .repeated()
            .collect::<String>()
    };

    field()
        .labelled("Airline code")
        .then_ignore(just("::"))
        .then(field().labelled("Airline name"))
        .then_ignore(end())
}
