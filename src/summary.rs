//! Run summary assembly and rendering.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::derive::{ContactGenStats, FacilityGenStats};

/// Per-run match counters, owned by the pipeline and updated in one place as
/// match results come back.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunCounters {
    pub exact_matches: usize,
    pub partial_matches: usize,
    pub unmatched: usize,
}

impl RunCounters {
    pub fn total_matched(&self) -> usize {
        self.exact_matches + self.partial_matches
    }

    pub fn total_processed(&self) -> usize {
        self.total_matched() + self.unmatched
    }
}

/// Everything the summary report needs, collected over one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_utc: DateTime<Utc>,
    pub ended_utc: DateTime<Utc>,
    pub load_time: Duration,
    pub match_time: Duration,
    pub export_time: Duration,
    pub mem_used_start_mb: u64,
    pub mem_used_end_mb: u64,
    pub companies_in: usize,
    pub targets_in: usize,
    pub alf_targets_in: usize,
    pub snf_targets_in: usize,
    pub executives_in: usize,
    pub executives_filtered_out: usize,
    pub executives_deduped: usize,
    pub counters: RunCounters,
    pub facility_stats: FacilityGenStats,
    pub contact_stats: ContactGenStats,
}

/// Staged construction for [`RunSummary`]; the pipeline fills sections in as
/// each phase completes.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    started_utc: DateTime<Utc>,
    load_time: Duration,
    match_time: Duration,
    export_time: Duration,
    mem_used_start_mb: u64,
    companies_in: usize,
    targets_in: usize,
    alf_targets_in: usize,
    snf_targets_in: usize,
    executives_in: usize,
    executives_filtered_out: usize,
    executives_deduped: usize,
    counters: RunCounters,
    facility_stats: FacilityGenStats,
    contact_stats: ContactGenStats,
}

impl SummaryBuilder {
    pub fn new(started_utc: DateTime<Utc>, mem_used_start_mb: u64) -> Self {
        Self {
            started_utc,
            load_time: Duration::ZERO,
            match_time: Duration::ZERO,
            export_time: Duration::ZERO,
            mem_used_start_mb,
            companies_in: 0,
            targets_in: 0,
            alf_targets_in: 0,
            snf_targets_in: 0,
            executives_in: 0,
            executives_filtered_out: 0,
            executives_deduped: 0,
            counters: RunCounters::default(),
            facility_stats: FacilityGenStats::default(),
            contact_stats: ContactGenStats::default(),
        }
    }

    pub fn with_inputs(
        mut self,
        companies: usize,
        alf_targets: usize,
        snf_targets: usize,
        executives: usize,
    ) -> Self {
        self.companies_in = companies;
        self.alf_targets_in = alf_targets;
        self.snf_targets_in = snf_targets;
        self.targets_in = alf_targets + snf_targets;
        self.executives_in = executives;
        self
    }

    pub fn with_executive_filtering(mut self, filtered_out: usize, deduped: usize) -> Self {
        self.executives_filtered_out = filtered_out;
        self.executives_deduped = deduped;
        self
    }

    pub fn with_load_time(mut self, load_time: Duration) -> Self {
        self.load_time = load_time;
        self
    }

    pub fn with_match_phase(mut self, counters: RunCounters, match_time: Duration) -> Self {
        self.counters = counters;
        self.match_time = match_time;
        self
    }

    pub fn with_generation(
        mut self,
        facility_stats: FacilityGenStats,
        contact_stats: ContactGenStats,
    ) -> Self {
        self.facility_stats = facility_stats;
        self.contact_stats = contact_stats;
        self
    }

    pub fn with_export_time(mut self, export_time: Duration) -> Self {
        self.export_time = export_time;
        self
    }

    pub fn build(self, ended_utc: DateTime<Utc>, mem_used_end_mb: u64) -> RunSummary {
        RunSummary {
            started_utc: self.started_utc,
            ended_utc,
            load_time: self.load_time,
            match_time: self.match_time,
            export_time: self.export_time,
            mem_used_start_mb: self.mem_used_start_mb,
            mem_used_end_mb,
            companies_in: self.companies_in,
            targets_in: self.targets_in,
            alf_targets_in: self.alf_targets_in,
            snf_targets_in: self.snf_targets_in,
            executives_in: self.executives_in,
            executives_filtered_out: self.executives_filtered_out,
            executives_deduped: self.executives_deduped,
            counters: self.counters,
            facility_stats: self.facility_stats,
            contact_stats: self.contact_stats,
        }
    }
}

impl RunSummary {
    pub fn duration_secs(&self) -> f64 {
        (self.ended_utc - self.started_utc).num_milliseconds() as f64 / 1000.0
    }

    pub fn match_rate_pct(&self) -> f64 {
        if self.companies_in == 0 {
            0.0
        } else {
            self.counters.total_matched() as f64 * 100.0 / self.companies_in as f64
        }
    }

    /// Key/value rows for the summary CSV, in a fixed report order.
    pub fn as_rows(&self) -> Vec<(String, String)> {
        let secs = |d: Duration| format!("{:.2}", d.as_secs_f64());
        vec![
            ("Started (UTC)".into(), self.started_utc.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("Ended (UTC)".into(), self.ended_utc.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("Duration (s)".into(), format!("{:.2}", self.duration_secs())),
            ("Load Time (s)".into(), secs(self.load_time)),
            ("Match Time (s)".into(), secs(self.match_time)),
            ("Export Time (s)".into(), secs(self.export_time)),
            ("Memory Used Start (MB)".into(), self.mem_used_start_mb.to_string()),
            ("Memory Used End (MB)".into(), self.mem_used_end_mb.to_string()),
            ("Companies In".into(), self.companies_in.to_string()),
            ("ALF Facilities In".into(), self.alf_targets_in.to_string()),
            ("SNF Facilities In".into(), self.snf_targets_in.to_string()),
            ("Executives In".into(), self.executives_in.to_string()),
            ("Executives Filtered (firm type)".into(), self.executives_filtered_out.to_string()),
            ("Executives Deduplicated".into(), self.executives_deduped.to_string()),
            ("Exact Matches".into(), self.counters.exact_matches.to_string()),
            ("Partial Matches".into(), self.counters.partial_matches.to_string()),
            ("Unmatched Companies".into(), self.counters.unmatched.to_string()),
            ("Match Rate (%)".into(), format!("{:.1}", self.match_rate_pct())),
            ("New Facilities".into(), self.facility_stats.emitted.to_string()),
            ("New Facilities Skipped".into(), self.facility_stats.skipped().to_string()),
            ("New Contacts".into(), self.contact_stats.emitted.to_string()),
            ("New Contacts Skipped".into(), self.contact_stats.skipped().to_string()),
        ]
    }

    /// Human-readable report for stdout, ending with the CRM import order.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Reconciliation Summary ===\n");
        for (key, value) in self.as_rows() {
            out.push_str(&format!("{key:<34} {value}\n"));
        }
        out.push_str("\nImport the generated files in this order:\n");
        out.push_str("  1. enriched_companies.csv  (update existing companies)\n");
        out.push_str("  2. new_facilities.csv      (create missing facilities)\n");
        out.push_str("  3. new_contacts.csv        (create missing contacts)\n");
        out.push_str("  4. associate new contacts with their companies\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let started = Utc::now();
        SummaryBuilder::new(started, 100)
            .with_inputs(200, 40, 60, 30)
            .with_executive_filtering(5, 2)
            .with_match_phase(
                RunCounters {
                    exact_matches: 120,
                    partial_matches: 30,
                    unmatched: 50,
                },
                Duration::from_millis(1500),
            )
            .build(started + chrono::Duration::seconds(3), 140)
    }

    #[test]
    fn counters_add_up() {
        let c = RunCounters {
            exact_matches: 3,
            partial_matches: 2,
            unmatched: 5,
        };
        assert_eq!(c.total_matched(), 5);
        assert_eq!(c.total_processed(), 10);
    }

    #[test]
    fn match_rate_over_companies_in() {
        let s = summary();
        assert!((s.match_rate_pct() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn match_rate_zero_when_no_companies() {
        let s = SummaryBuilder::new(Utc::now(), 0).build(Utc::now(), 0);
        assert_eq!(s.match_rate_pct(), 0.0);
    }

    #[test]
    fn rows_include_phase_timings_and_counts() {
        let s = summary();
        let rows = s.as_rows();
        let get = |key: &str| {
            rows.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("Companies In"), "200");
        assert_eq!(get("Exact Matches"), "120");
        assert_eq!(get("Match Time (s)"), "1.50");
        assert_eq!(get("Match Rate (%)"), "75.0");
    }

    #[test]
    fn text_report_ends_with_import_order() {
        let text = summary().render_text();
        assert!(text.contains("Reconciliation Summary"));
        assert!(text.contains("1. enriched_companies.csv"));
        assert!(text.contains("4. associate new contacts"));
    }
}
