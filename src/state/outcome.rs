//! Final outcome of one product reference within a keyword run
use crate::extract::ExtractionFailure;
use std::fmt;

/// What happened to a product reference dispatched to the detail extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductOutcome {
    // ===== Success =====
    /// Records were extracted and handed to the sink
    Extracted,

    // ===== Skips =====
    /// Juvenile product, excluded on purpose
    OutOfScope,

    /// Disallowed by robots.txt
    RobotsDenied,

    /// Run was cancelled or timed out before the fetch was issued
    Cancelled,

    // ===== Failures =====
    /// Detail page could not be fetched
    FetchFailed,

    /// Detail page had no title to work with
    MissingTitle,

    /// No candidate price text was valid
    NoPrice,

    /// No variant could be recovered from the page
    NoVariants,
}

impl ProductOutcome {
    /// Returns true if the product produced records
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if the product was skipped deliberately
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::OutOfScope | Self::RobotsDenied | Self::Cancelled)
    }

    /// Returns true if the product was lost to an error
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed | Self::MissingTitle | Self::NoPrice | Self::NoVariants
        )
    }

    /// Stable lowercase label used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extracted => "extracted",
            Self::OutOfScope => "out_of_scope",
            Self::RobotsDenied => "robots_denied",
            Self::Cancelled => "cancelled",
            Self::FetchFailed => "fetch_failed",
            Self::MissingTitle => "missing_title",
            Self::NoPrice => "no_price",
            Self::NoVariants => "no_variants",
        }
    }

    /// Returns all outcomes in reporting order
    pub fn all() -> [Self; 8] {
        [
            Self::Extracted,
            Self::OutOfScope,
            Self::RobotsDenied,
            Self::Cancelled,
            Self::FetchFailed,
            Self::MissingTitle,
            Self::NoPrice,
            Self::NoVariants,
        ]
    }
}

impl From<&ExtractionFailure> for ProductOutcome {
    fn from(failure: &ExtractionFailure) -> Self {
        match failure {
            ExtractionFailure::OutOfScopeProduct { .. } => Self::OutOfScope,
            ExtractionFailure::MissingTitle => Self::MissingTitle,
            ExtractionFailure::NoPriceFound => Self::NoPrice,
            ExtractionFailure::NoVariantsFound { .. } => Self::NoVariants,
        }
    }
}

impl fmt::Display for ProductOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
