use crate::infra::{build_service, build_store};
use clap::Args;
use review_hub::config::AppConfig;
use review_hub::error::AppError;
use review_hub::workflows::case_studies::CaseStudyStatistics;
use review_hub::workflows::evaluations::{FeedbackEntry, Reviewer, TeamSummary};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// JSON seed file holding case studies and evaluations
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Number of entries in the top and bottom lists (defaults to the configured limit)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// JSON seed file holding case studies and evaluations
    #[arg(long)]
    pub(crate) seed: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct NextArgs {
    /// JSON seed file holding case studies and evaluations
    #[arg(long)]
    pub(crate) seed: PathBuf,
    /// Reviewer email to pick a case study for
    #[arg(long)]
    pub(crate) reviewer: String,
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(limit) = args.limit {
        config.summary.limit = limit;
    }
    let store = build_store(Some(&args.seed), &config.storage.collections)?;
    let service = build_service(&config, store);

    let summary = service.team_summary()?;
    print!("{}", render_team_summary(&summary));
    Ok(())
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = build_store(Some(&args.seed), &config.storage.collections)?;
    let service = build_service(&config, store);

    let statistics = service.case_study_statistics()?;
    print!("{}", render_dashboard(&statistics));
    Ok(())
}

pub(crate) fn run_next(args: NextArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = build_store(Some(&args.seed), &config.storage.collections)?;
    let service = build_service(&config, store);

    // Reports read local seed data, so the allow-list is not consulted here.
    let reviewer = Reviewer {
        email: args.reviewer.trim().to_lowercase(),
        is_admin: false,
    };

    match service.next_case_study(&reviewer)? {
        Some(case_study) => {
            println!("Next case study for {}", reviewer.email);
            println!("  Id: {}", case_study.id.as_str());
            println!(
                "  Source: {}",
                case_study.source_url.as_deref().unwrap_or("No URL provided")
            );
            if let Some(company) = case_study.company() {
                println!("  Company: {company}");
            }
        }
        None => println!("Nothing left for {} to review", reviewer.email),
    }
    Ok(())
}

fn render_team_summary(summary: &TeamSummary) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Team evaluation summary").expect("write heading");
    writeln!(
        &mut out,
        "  Evaluations: {} ({} excluding relevance)",
        summary.total_evaluations, summary.evaluations_excluding_relevance
    )
    .expect("write totals");
    writeln!(&mut out, "  Evaluators: {}", summary.evaluator_count).expect("write evaluators");
    writeln!(&mut out, "  Average score: {:.1}", summary.average_score)
        .expect("write average");

    writeln!(&mut out, "\nPer reviewer").expect("write reviewer heading");
    for stats in &summary.per_user {
        writeln!(
            &mut out,
            "  - {}: {} evaluation(s), avg {}, min {}, max {}",
            stats.user,
            stats.count,
            stats
                .average
                .map(|average| format!("{average:.1}"))
                .unwrap_or_else(|| "n/a".to_string()),
            optional_score(stats.min),
            optional_score(stats.max),
        )
        .expect("write reviewer row");
    }

    write_entries(&mut out, "Top rated", &summary.top);
    write_entries(&mut out, "Lowest rated", &summary.bottom);

    writeln!(&mut out, "\nImprovement areas").expect("write area heading");
    if summary.improvement_areas.is_empty() {
        writeln!(&mut out, "  none cited").expect("write empty areas");
    }
    for area in &summary.improvement_areas {
        writeln!(
            &mut out,
            "  - {}: {} citation(s)",
            area.area, area.total_citations
        )
        .expect("write area row");
    }
    out
}

fn write_entries(out: &mut String, heading: &str, entries: &[FeedbackEntry]) {
    writeln!(out, "\n{heading}").expect("write entries heading");
    if entries.is_empty() {
        writeln!(out, "  none").expect("write empty entries");
        return;
    }
    for entry in entries {
        writeln!(
            out,
            "  - [{}] {} by {}: {}",
            optional_score(entry.score),
            entry.case_study.source_url,
            entry.evaluator,
            entry.feedback
        )
        .expect("write entry");
    }
}

fn render_dashboard(statistics: &CaseStudyStatistics) -> String {
    let mut out = String::new();
    writeln!(&mut out, "Case study dashboard").expect("write heading");
    writeln!(
        &mut out,
        "  Total case studies: {}",
        statistics.total_case_studies
    )
    .expect("write total");
    writeln!(&mut out, "  Evaluated: {}", statistics.evaluated_case_studies)
        .expect("write evaluated");
    writeln!(&mut out, "  Pending: {}", statistics.pending_evaluations).expect("write pending");

    write_distribution(&mut out, "Companies", &statistics.company_distribution);
    write_distribution(&mut out, "Sectors", &statistics.sector_distribution);
    write_distribution(&mut out, "Industries", &statistics.industry_distribution);
    write_distribution(&mut out, "Business functions", &statistics.business_functions);
    write_distribution(&mut out, "Business impacts", &statistics.business_impacts);
    write_distribution(&mut out, "Maturity models", &statistics.maturity_models);
    out
}

fn write_distribution(out: &mut String, heading: &str, distribution: &BTreeMap<String, usize>) {
    if distribution.is_empty() {
        return;
    }
    writeln!(out, "\n{heading}").expect("write distribution heading");
    for (label, count) in distribution {
        writeln!(out, "  - {label}: {count}").expect("write distribution row");
    }
}

fn optional_score(score: Option<u8>) -> String {
    score
        .map(|value| value.to_string())
        .unwrap_or_else(|| "-".to_string())
}
