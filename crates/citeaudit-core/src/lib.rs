//! Citeaudit Core Library
//!
//! The citation audit pipeline. Given a declared citation style plus the
//! inline markers and reference entries an upstream extractor found, a
//! [`CitationAuditor`] checks style compliance, links each marker to a
//! reference entry, confirms the cited works exist, judges whether their
//! abstracts support the citing claim, and folds everything into a
//! Citation Integrity Index.

pub mod auditor;
pub mod config;
pub mod detect;
pub mod domain;
pub mod matcher;
pub mod obs;
pub mod observer;
pub mod reference_list;
pub mod rules;
pub mod scoring;
pub mod telemetry;
pub mod verification;

pub use auditor::CitationAuditor;
pub use config::AuditConfig;
pub use detect::{detect_styles, detect_styles_in_text};
pub use domain::{
    AuditError, AuditReport, AuditRequest, CitationFlag, CitationPair, CitationStyle,
    ConfidenceTier, DocumentMetadata, DocumentSection, EntryMetadata, ExistenceStatus,
    ExtractedPattern, IntegrityIndex, PatternType, ReferenceEntry, ReferenceListExtraction, Result,
    Severity, SupportStatus, TextAnchor, UnmatchedReason, VerificationResult, ViolationType,
};
pub use matcher::{CitationMatcher, HeuristicExtractor, MetadataExtractor};
pub use observer::{scan, PatternMatch, PatternObserver};
pub use reference_list::ReferenceListValidator;
pub use rules::{NumberingPolicy, StyleRuleConfig, StyleRuleRegistry};
pub use scoring::{IntegrityScorer, ScoreInputs};
pub use telemetry::init_tracing;
pub use verification::{ExternalVerificationService, VerificationConfig, VerificationWorklist};

/// Crate version, reported by `citeaudit --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
