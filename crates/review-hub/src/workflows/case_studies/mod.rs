//! Generated case studies: typed ingestion, company identity, and catalogue statistics.

pub mod company;
pub mod domain;
pub mod stats;

pub use company::{clean_url, extract_host};
pub use domain::{
    CaseStudy, CaseStudyId, Classification, ClassificationTag, MaturityModel, SECTION_SEPARATOR,
};
pub use stats::CaseStudyStatistics;
