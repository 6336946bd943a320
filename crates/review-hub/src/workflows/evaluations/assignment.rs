use std::collections::{HashMap, HashSet};

use rand::seq::IteratorRandom;
use rand::Rng;

use super::domain::Evaluation;
use crate::workflows::case_studies::{clean_url, CaseStudy, CaseStudyId};

/// Exclusion sets for one evaluator. A case study is a candidate only if neither its id nor its
/// company (clean source URL) has been evaluated by that evaluator.
#[derive(Debug, Clone, Default)]
pub struct AssignmentSelector {
    evaluated_ids: HashSet<CaseStudyId>,
    evaluated_companies: HashSet<String>,
}

impl AssignmentSelector {
    /// `evaluator` is matched exactly against stored identities.
    pub fn for_evaluator(
        evaluator: &str,
        case_studies: &[CaseStudy],
        evaluations: &[Evaluation],
    ) -> Self {
        let catalogue_urls: HashMap<&CaseStudyId, &str> = case_studies
            .iter()
            .filter_map(|case_study| {
                case_study
                    .source_url
                    .as_deref()
                    .map(|url| (&case_study.id, url))
            })
            .collect();

        let mut selector = Self::default();
        for evaluation in evaluations.iter().filter(|e| e.evaluator == evaluator) {
            let url = evaluation
                .case_study_url
                .as_deref()
                .or_else(|| catalogue_urls.get(&evaluation.case_study_id).copied());
            if let Some(url) = url {
                selector.evaluated_companies.insert(clean_url(url));
            }
            selector
                .evaluated_ids
                .insert(evaluation.case_study_id.clone());
        }
        selector
    }

    pub fn is_candidate(&self, case_study: &CaseStudy) -> bool {
        if self.evaluated_ids.contains(&case_study.id) {
            return false;
        }
        match case_study.company() {
            Some(company) => !self.evaluated_companies.contains(&company),
            None => true,
        }
    }

    pub fn candidates<'a>(
        &'a self,
        case_studies: &'a [CaseStudy],
    ) -> impl Iterator<Item = &'a CaseStudy> + 'a {
        case_studies
            .iter()
            .filter(move |case_study| self.is_candidate(case_study))
    }

    /// Uniform pick over the candidates in a single pass.
    pub fn choose<'a, R>(&self, case_studies: &'a [CaseStudy], rng: &mut R) -> Option<&'a CaseStudy>
    where
        R: Rng + ?Sized,
    {
        case_studies
            .iter()
            .filter(|case_study| self.is_candidate(case_study))
            .choose(rng)
    }

    pub fn evaluated_companies(&self) -> impl Iterator<Item = &str> {
        self.evaluated_companies.iter().map(String::as_str)
    }
}

/// Picks a case study the evaluator has not yet reviewed, directly or through another case study
/// about the same company. `None` means nothing is left.
pub fn select_next<'a>(
    evaluator: &str,
    case_studies: &'a [CaseStudy],
    evaluations: &[Evaluation],
) -> Option<&'a CaseStudy> {
    AssignmentSelector::for_evaluator(evaluator, case_studies, evaluations)
        .choose(case_studies, &mut rand::rng())
}
