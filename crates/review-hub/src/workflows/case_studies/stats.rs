use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::company::clean_url;
use super::domain::CaseStudy;
use crate::workflows::evaluations::Evaluation;

/// Catalogue counts and classification distributions for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaseStudyStatistics {
    pub total_case_studies: usize,
    pub evaluated_case_studies: usize,
    pub pending_evaluations: usize,
    pub company_distribution: BTreeMap<String, usize>,
    pub sector_distribution: BTreeMap<String, usize>,
    pub industry_distribution: BTreeMap<String, usize>,
    pub business_functions: BTreeMap<String, usize>,
    pub business_impacts: BTreeMap<String, usize>,
    pub maturity_models: BTreeMap<String, usize>,
}

impl CaseStudyStatistics {
    /// `company_urls` pre-seeds the company distribution so companies without case studies
    /// still show up with a zero count.
    pub fn compute(
        case_studies: &[CaseStudy],
        evaluations: &[Evaluation],
        company_urls: &[String],
    ) -> Self {
        let mut stats = Self {
            total_case_studies: case_studies.len(),
            ..Self::default()
        };

        let evaluated: BTreeSet<&str> = evaluations
            .iter()
            .map(|evaluation| evaluation.case_study_id.as_str())
            .collect();
        stats.evaluated_case_studies = evaluated.len();
        stats.pending_evaluations = stats
            .total_case_studies
            .saturating_sub(stats.evaluated_case_studies);

        for url in company_urls {
            stats.company_distribution.entry(clean_url(url)).or_insert(0);
        }

        for case_study in case_studies {
            if let Some(company) = case_study.company() {
                increment(&mut stats.company_distribution, company);
            }

            let Some(classification) = &case_study.classification else {
                continue;
            };

            if let Some(industry) = &classification.industry {
                if let Some(sector) = &industry.category {
                    increment(&mut stats.sector_distribution, sector.clone());
                }
                if let Some(label) = industry.label() {
                    increment(&mut stats.industry_distribution, label);
                }
            }
            for label in classification
                .business_functions
                .iter()
                .filter_map(|tag| tag.label())
            {
                increment(&mut stats.business_functions, label);
            }
            for label in classification
                .business_impacts
                .iter()
                .filter_map(|tag| tag.label())
            {
                increment(&mut stats.business_impacts, label);
            }
            for label in classification
                .maturity_models
                .iter()
                .filter_map(|model| model.label())
            {
                increment(&mut stats.maturity_models, label);
            }
        }

        stats
    }
}

fn increment(distribution: &mut BTreeMap<String, usize>, key: String) {
    *distribution.entry(key).or_insert(0) += 1;
}
