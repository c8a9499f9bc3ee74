//! Signals raised by `Relation::check`.

use std::collections::BTreeSet;

use serde::Serialize;

use super::types::IoCategory;

/// One condition observed while checking a relation. Several may hold at
/// once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Signal {
    NoIoData,
    FileNotFound,
    InputFileNotFound,
    OutputFileNotFound,
    FileChanged,
    InputFileChanged,
    OutputFileChanged,
    FoundMatchingRecord,
    FoundMatchingRecordOutputChanged,
}

impl Signal {
    /// Stable numeric code: hundreds digit is the family.
    pub fn code(self) -> u16 {
        match self {
            Signal::NoIoData => 0,
            Signal::FileNotFound => 100,
            Signal::InputFileNotFound => 101,
            Signal::OutputFileNotFound => 102,
            Signal::FileChanged => 200,
            Signal::InputFileChanged => 201,
            Signal::OutputFileChanged => 202,
            Signal::FoundMatchingRecord => 300,
            Signal::FoundMatchingRecordOutputChanged => 301,
        }
    }

    /// Message template; `{filename}` is substituted. The umbrella signals
    /// have none.
    pub fn message_template(self) -> Option<&'static str> {
        match self {
            Signal::NoIoData => Some("No IO data found"),
            Signal::FileNotFound | Signal::FileChanged => None,
            Signal::InputFileNotFound => Some("Input file not found: {filename}"),
            Signal::OutputFileNotFound => Some("Output file not found: {filename}"),
            Signal::InputFileChanged => Some("Input file changed: {filename}"),
            Signal::OutputFileChanged => Some("Output file changed: {filename}"),
            Signal::FoundMatchingRecord => Some("Found overlapping db record"),
            Signal::FoundMatchingRecordOutputChanged => {
                Some("Found overlapping db record, but output changed")
            }
        }
    }

    pub fn not_found(category: IoCategory) -> Self {
        match category {
            IoCategory::Input => Signal::InputFileNotFound,
            IoCategory::Output => Signal::OutputFileNotFound,
        }
    }

    pub fn changed(category: IoCategory) -> Self {
        match category {
            IoCategory::Input => Signal::InputFileChanged,
            IoCategory::Output => Signal::OutputFileChanged,
        }
    }
}

/// A signal plus what it was raised about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub signal: Signal,
    pub filename: Option<String>,
    pub relation_id: Option<String>,
}

impl Observation {
    pub fn message(&self) -> Option<String> {
        self.signal
            .message_template()
            .map(|t| t.replace("{filename}", self.filename.as_deref().unwrap_or("")))
    }
}

/// Everything `check` observed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckOutcome {
    signals: BTreeSet<Signal>,
    observations: Vec<Observation>,
}

impl CheckOutcome {
    pub(crate) fn observe(
        &mut self,
        signal: Signal,
        filename: Option<&str>,
        relation_id: Option<&str>,
    ) {
        self.signals.insert(signal);
        self.observations.push(Observation {
            signal,
            filename: filename.map(str::to_string),
            relation_id: relation_id.map(str::to_string),
        });
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.signals.contains(&signal)
    }

    pub fn signals(&self) -> &BTreeSet<Signal> {
        &self.signals
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Rendered messages of every observation that has one.
    pub fn messages(&self) -> Vec<String> {
        self.observations.iter().filter_map(Observation::message).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Signal::NoIoData.code(), 0);
        assert_eq!(Signal::OutputFileNotFound.code(), 102);
        assert_eq!(Signal::InputFileChanged.code(), 201);
        assert_eq!(Signal::FoundMatchingRecordOutputChanged.code(), 301);
    }

    #[test]
    fn category_variants() {
        assert_eq!(Signal::not_found(IoCategory::Input), Signal::InputFileNotFound);
        assert_eq!(Signal::changed(IoCategory::Output), Signal::OutputFileChanged);
    }

    #[test]
    fn umbrella_signals_have_no_message() {
        let mut outcome = CheckOutcome::default();
        outcome.observe(Signal::FileNotFound, Some("/a"), None);
        outcome.observe(Signal::InputFileNotFound, Some("/a"), None);
        assert_eq!(outcome.messages(), vec!["Input file not found: /a".to_string()]);
        assert_eq!(outcome.signals().len(), 2);
    }

    #[test]
    fn signals_deduplicate_observations_do_not() {
        let mut outcome = CheckOutcome::default();
        outcome.observe(Signal::FileChanged, Some("/a"), None);
        outcome.observe(Signal::FileChanged, Some("/b"), None);
        assert_eq!(outcome.signals().len(), 1);
        assert_eq!(outcome.observations().len(), 2);
    }
}
