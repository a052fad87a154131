//! End-to-end run orchestration: load, match, enrich, generate, export.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use log::info;

use crate::config::AppConfig;
use crate::derive::{generate_new_contacts, generate_new_facilities};
use crate::enrich::merge;
use crate::export::{
    export_enriched_companies, export_new_contacts, export_new_facilities, export_run_summary,
    ENRICHED_COMPANIES_FILE, NEW_CONTACTS_FILE, NEW_FACILITIES_FILE, RUN_SUMMARY_FILE,
};
use crate::load::{load_all, Datasets};
use crate::matching::{CandidateResolver, MatchClassifier, MatchKind};
use crate::metrics::memory_stats_mb;
use crate::models::{EnrichedRecord, FacilityType, NewContactRecord, NewFacilityRecord};
use crate::normalize::NameNormalizer;
use crate::summary::{RunCounters, RunSummary, SummaryBuilder};

/// In-memory result of the match, enrich, and generate phases.
pub struct ProcessOutput {
    pub enriched: Vec<EnrichedRecord>,
    pub new_facilities: Vec<NewFacilityRecord>,
    pub new_contacts: Vec<NewContactRecord>,
    pub counters: RunCounters,
    pub facility_stats: crate::derive::FacilityGenStats,
    pub contact_stats: crate::derive::ContactGenStats,
}

/// Match every company against the target pool and derive the output record
/// sets. Companies are processed in input order, so output order mirrors the
/// CRM export.
pub fn process(datasets: Datasets, config: &AppConfig) -> ProcessOutput {
    let Datasets {
        companies,
        contacts,
        facilities,
        targets,
        executives,
        ..
    } = datasets;

    let normalizer = NameNormalizer::new(&config.normalizer);
    let classifier = MatchClassifier::new(&config.matching);
    let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);

    let mut counters = RunCounters::default();
    let mut matched_targets: HashSet<usize> = HashSet::new();
    let mut enriched = Vec::with_capacity(companies.len());
    for company in companies {
        let key = normalizer.normalize(&company.name);
        let result = resolver.resolve(&key);
        match result.kind {
            MatchKind::Exact => counters.exact_matches += 1,
            MatchKind::Partial => counters.partial_matches += 1,
            MatchKind::None => counters.unmatched += 1,
        }
        if let Some(idx) = result.target_idx {
            matched_targets.insert(idx);
        }
        enriched.push(merge(company, &result, &targets));
    }

    let existing_facility_ids: HashSet<String> = facilities
        .iter()
        .map(|f| f.external_id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let (new_facilities, facility_stats) =
        generate_new_facilities(&targets, &matched_targets, &existing_facility_ids);

    let existing_emails: HashSet<String> = contacts
        .iter()
        .map(|c| c.email.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    let (new_contacts, contact_stats) = generate_new_contacts(
        &executives,
        &resolver,
        &normalizer,
        &existing_emails,
        &config.titles,
    );

    ProcessOutput {
        enriched,
        new_facilities,
        new_contacts,
        counters,
        facility_stats,
        contact_stats,
    }
}

/// Run one full reconciliation: read inputs from `input_dir`, write the four
/// output files into `output_dir`, and return the summary.
pub fn run(input_dir: &Path, output_dir: &Path, config: &AppConfig) -> anyhow::Result<RunSummary> {
    let started = Utc::now();
    let mem_start = memory_stats_mb();
    let builder = SummaryBuilder::new(started, mem_start.used_mb);

    let load_started = Instant::now();
    let datasets = load_all(input_dir, &config.executives)
        .with_context(|| format!("loading inputs from {}", input_dir.display()))?;
    let load_time = load_started.elapsed();

    let alf_targets = datasets
        .targets
        .iter()
        .filter(|t| t.facility_type == FacilityType::Alf)
        .count();
    let snf_targets = datasets.targets.len() - alf_targets;
    let builder = builder
        .with_inputs(
            datasets.companies.len(),
            alf_targets,
            snf_targets,
            datasets.executives.len(),
        )
        .with_executive_filtering(datasets.executives_filtered_out, datasets.executives_deduped)
        .with_load_time(load_time);

    let match_started = Instant::now();
    let output = process(datasets, config);
    let match_time = match_started.elapsed();
    info!(
        "matched {} of {} companies ({} exact, {} partial)",
        output.counters.total_matched(),
        output.counters.total_processed(),
        output.counters.exact_matches,
        output.counters.partial_matches
    );
    let builder = builder
        .with_match_phase(output.counters, match_time)
        .with_generation(output.facility_stats, output.contact_stats);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let export_started = Instant::now();
    export_enriched_companies(&output.enriched, &output_dir.join(ENRICHED_COMPANIES_FILE))?;
    export_new_facilities(&output.new_facilities, &output_dir.join(NEW_FACILITIES_FILE))?;
    export_new_contacts(&output.new_contacts, &output_dir.join(NEW_CONTACTS_FILE))?;
    let export_time = export_started.elapsed();

    let mem_end = memory_stats_mb();
    let summary = builder
        .with_export_time(export_time)
        .build(Utc::now(), mem_end.used_mb);
    export_run_summary(&summary, &output_dir.join(RUN_SUMMARY_FILE))?;

    info!(
        "run complete in {:.2}s, outputs in {}",
        summary.duration_secs(),
        output_dir.display()
    );
    Ok(summary)
}
