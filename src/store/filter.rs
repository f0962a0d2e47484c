//! Filter criteria for the log list

use super::LogEntry;

/// How the status criterion constrains entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No status constraint
    #[default]
    Any,
    /// Status must equal this code exactly
    Exact(u16),
    /// The input was not a status code; nothing matches
    Invalid,
}

impl StatusFilter {
    /// Interpret the status text typed by the user
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return StatusFilter::Any;
        }
        match input.parse::<u16>() {
            Ok(code) => StatusFilter::Exact(code),
            Err(_) => StatusFilter::Invalid,
        }
    }

    fn matches(&self, status: Option<u16>) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Exact(code) => status == Some(*code),
            StatusFilter::Invalid => false,
        }
    }
}

/// Criteria applied by [`LogStore::filter`](super::LogStore::filter)
///
/// All criteria are ANDed; empty substrings match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    ip: String,
    method: String,
    status: StatusFilter,
}

impl FilterCriteria {
    /// Criteria that match every entry
    pub fn all() -> Self {
        Self::default()
    }

    /// Build criteria from the three raw filter inputs
    pub fn from_inputs(ip: &str, method: &str, status: &str) -> Self {
        Self::default()
            .with_ip(ip)
            .with_method(method)
            .with_status(StatusFilter::parse(status))
    }

    /// Case-insensitive substring that must appear in the IP
    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ip = ip.to_lowercase();
        self
    }

    /// Case-insensitive substring that must appear in the method
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_lowercase();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Whether no criterion is active
    pub fn is_empty(&self) -> bool {
        self.ip.is_empty() && self.method.is_empty() && self.status == StatusFilter::Any
    }

    /// Check a single entry against all criteria
    pub fn matches(&self, entry: &LogEntry) -> bool {
        let ip_ok = self.ip.is_empty() || entry.ip.to_lowercase().contains(&self.ip);
        let method_ok = self.method.is_empty()
            || entry.method_or_empty().to_lowercase().contains(&self.method);
        ip_ok && method_ok && self.status.matches(entry.status)
    }
}
