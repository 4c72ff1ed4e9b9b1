//! Domain models for citeaudit.
//!
//! Canonical definitions for the audit entities:
//! - `ExtractedPattern` / `ReferenceListExtraction`: upstream extractor input
//! - `CitationFlag`: style and structure findings
//! - `CitationPair`: an inline citation linked to a reference entry
//! - `VerificationResult`: existence and support outcome per citation
//! - `IntegrityIndex`: the aggregate score

pub mod error;
pub mod flag;
pub mod integrity;
pub mod pattern;
pub mod reference;
pub mod request;
pub mod style;
pub mod verification;

pub use error::{AuditError, Result};
pub use flag::{CitationFlag, Severity, TextAnchor, ViolationType};
pub use integrity::{ConfidenceTier, IntegrityIndex};
pub use pattern::{ExtractedPattern, PatternType};
pub use reference::{
    CitationPair, EntryMetadata, ReferenceEntry, ReferenceListExtraction, UnmatchedReason,
};
pub use request::{AuditReport, AuditRequest, DocumentMetadata, DocumentSection};
pub use style::CitationStyle;
pub use verification::{ExistenceStatus, SupportStatus, VerificationResult};
