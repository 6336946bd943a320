use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::views::FeedbackEntry;
use super::ReviewedEvaluation;
use crate::workflows::evaluations::domain::Evaluation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub user: String,
    /// All of the user's evaluations, scored or not.
    pub count: usize,
    pub average: Option<f64>,
    pub min: Option<u8>,
    pub max: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSummary {
    pub area: String,
    pub total_citations: usize,
    pub citations_by_user: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaDetail {
    pub area: String,
    pub count: usize,
    pub entries: Vec<FeedbackEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    pub user: String,
    pub count: usize,
    pub entries: Vec<FeedbackEntry>,
}

/// Ordering key shared by every ranked list. A missing score ranks as 0 and a missing timestamp
/// ranks below any real one.
fn rank_key(evaluation: &Evaluation) -> (u8, Option<DateTime<Utc>>) {
    (evaluation.score.unwrap_or(0), evaluation.timestamp)
}

fn compare_rank(a: &Evaluation, b: &Evaluation) -> Ordering {
    rank_key(a).cmp(&rank_key(b))
}

fn compare_users(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Mean of per-evaluator means over scored evaluations. Zero when nothing is scored.
pub fn average_score<E: AsRef<Evaluation>>(evaluations: &[E]) -> f64 {
    let mut per_evaluator: HashMap<&str, (u32, usize)> = HashMap::new();
    for evaluation in evaluations.iter().map(AsRef::<Evaluation>::as_ref) {
        if let Some(score) = evaluation.score {
            let entry = per_evaluator.entry(evaluation.evaluator.as_str()).or_default();
            entry.0 += u32::from(score);
            entry.1 += 1;
        }
    }
    if per_evaluator.is_empty() {
        return 0.0;
    }

    let total: f64 = per_evaluator
        .iter()
        .map(|(evaluator, (sum, count))| {
            let mean = f64::from(*sum) / *count as f64;
            debug!(evaluator, mean, scored = count, "evaluator average");
            mean
        })
        .sum();
    total / per_evaluator.len() as f64
}

pub fn per_user_statistics<E: AsRef<Evaluation>>(evaluations: &[E]) -> Vec<UserStatistics> {
    let mut grouped: HashMap<&str, Vec<&Evaluation>> = HashMap::new();
    for evaluation in evaluations.iter().map(AsRef::<Evaluation>::as_ref) {
        grouped
            .entry(evaluation.evaluator.as_str())
            .or_default()
            .push(evaluation);
    }

    let mut statistics: Vec<UserStatistics> = grouped
        .into_iter()
        .map(|(user, rows)| {
            let scores: Vec<u8> = rows.iter().filter_map(|row| row.score).collect();
            let average = (!scores.is_empty()).then(|| {
                scores.iter().map(|score| f64::from(*score)).sum::<f64>() / scores.len() as f64
            });
            UserStatistics {
                user: user.to_string(),
                count: rows.len(),
                average,
                min: scores.iter().copied().min(),
                max: scores.iter().copied().max(),
            }
        })
        .collect();
    statistics.sort_by(|a, b| compare_users(&a.user, &b.user));
    statistics
}

fn scored_only<E: AsRef<Evaluation> + Clone>(evaluations: &[E]) -> Vec<E> {
    evaluations
        .iter()
        .filter(|evaluation| evaluation.as_ref().score.is_some())
        .cloned()
        .collect()
}

/// Highest `(score, timestamp)` first; at most `n` items. Unscored evaluations are not ranked.
pub fn top_n<E: AsRef<Evaluation> + Clone>(evaluations: &[E], n: usize) -> Vec<E> {
    let mut ranked = scored_only(evaluations);
    ranked.sort_by(|a, b| compare_rank(b.as_ref(), a.as_ref()));
    ranked.truncate(n);
    ranked
}

/// Lowest `(score, timestamp)` first; at most `n` items. Unscored evaluations are not ranked.
pub fn bottom_n<E: AsRef<Evaluation> + Clone>(evaluations: &[E], n: usize) -> Vec<E> {
    let mut ranked = scored_only(evaluations);
    ranked.sort_by(|a, b| compare_rank(a.as_ref(), b.as_ref()));
    ranked.truncate(n);
    ranked
}

/// Citation counts per improvement area, most cited first. Free-text areas share the `Other`
/// bucket; evaluations without an area are not counted.
pub fn improvement_area_summary<E: AsRef<Evaluation>>(evaluations: &[E]) -> Vec<AreaSummary> {
    let mut grouped: BTreeMap<&'static str, AreaSummary> = BTreeMap::new();
    for evaluation in evaluations.iter().map(AsRef::<Evaluation>::as_ref) {
        let Some(area) = &evaluation.improvement_area else {
            continue;
        };
        let summary = grouped.entry(area.label()).or_insert_with(|| AreaSummary {
            area: area.label().to_string(),
            total_citations: 0,
            citations_by_user: BTreeMap::new(),
        });
        summary.total_citations += 1;
        *summary
            .citations_by_user
            .entry(evaluation.evaluator.clone())
            .or_insert(0) += 1;
    }

    let mut summaries: Vec<AreaSummary> = grouped.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total_citations
            .cmp(&a.total_citations)
            .then_with(|| a.area.cmp(&b.area))
    });
    summaries
}

pub fn improvement_area_detailed(reviewed: &[ReviewedEvaluation]) -> Vec<AreaDetail> {
    let mut grouped: BTreeMap<&'static str, Vec<&ReviewedEvaluation>> = BTreeMap::new();
    for item in reviewed {
        if let Some(area) = &item.evaluation.improvement_area {
            grouped.entry(area.label()).or_default().push(item);
        }
    }

    let mut details: Vec<AreaDetail> = grouped
        .into_iter()
        .map(|(area, items)| AreaDetail {
            area: area.to_string(),
            count: items.len(),
            entries: ranked_entries(items),
        })
        .collect();
    details.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.area.cmp(&b.area)));
    details
}

pub fn per_user_detail(reviewed: &[ReviewedEvaluation]) -> Vec<UserDetail> {
    let mut grouped: HashMap<&str, Vec<&ReviewedEvaluation>> = HashMap::new();
    for item in reviewed {
        grouped
            .entry(item.evaluation.evaluator.as_str())
            .or_default()
            .push(item);
    }

    let mut details: Vec<UserDetail> = grouped
        .into_iter()
        .map(|(user, items)| UserDetail {
            user: user.to_string(),
            count: items.len(),
            entries: ranked_entries(items),
        })
        .collect();
    details.sort_by(|a, b| compare_users(&a.user, &b.user));
    details
}

/// Entries ordered by score then timestamp, both descending.
fn ranked_entries(mut items: Vec<&ReviewedEvaluation>) -> Vec<FeedbackEntry> {
    items.sort_by(|a, b| compare_rank(&b.evaluation, &a.evaluation));
    items.into_iter().map(FeedbackEntry::from).collect()
}
