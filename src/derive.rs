//! Generation of new-facility and new-contact records from target-only data.
//!
//! The two generators are independent: new facilities come from targets that
//! won no match, new contacts from the executive directory. Both apply
//! data-quality gates; failing rows are counted, never fatal.

use std::collections::HashSet;

use log::debug;

use crate::config::TitleConfig;
use crate::matching::CandidateResolver;
use crate::models::{
    ExecutiveRecord, NewContactRecord, NewFacilityRecord, SeniorityLevel, TargetRecord,
};
use crate::normalize::NameNormalizer;
use crate::util::{format_phone, is_valid_email, is_valid_phone};

#[derive(Debug, Default, Clone, Copy)]
pub struct FacilityGenStats {
    pub emitted: usize,
    pub skipped_quality: usize,
    pub skipped_existing: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContactGenStats {
    pub emitted: usize,
    pub skipped_no_employer: usize,
    pub skipped_no_contact_info: usize,
    pub skipped_existing: usize,
}

impl FacilityGenStats {
    pub fn skipped(&self) -> usize {
        self.skipped_quality + self.skipped_existing
    }
}

impl ContactGenStats {
    pub fn skipped(&self) -> usize {
        self.skipped_no_employer + self.skipped_no_contact_info + self.skipped_existing
    }
}

/// Emit a new-facility record for every target that was never selected as the
/// winning candidate for any source, passes the quality gate (non-empty name
/// and address), and is not already present in the CRM facility export.
pub fn generate_new_facilities(
    targets: &[TargetRecord],
    matched_targets: &HashSet<usize>,
    existing_external_ids: &HashSet<String>,
) -> (Vec<NewFacilityRecord>, FacilityGenStats) {
    let mut out = Vec::new();
    let mut stats = FacilityGenStats::default();
    for (idx, target) in targets.iter().enumerate() {
        if matched_targets.contains(&idx) {
            continue;
        }
        if existing_external_ids.contains(target.external_id.as_str()) {
            stats.skipped_existing += 1;
            continue;
        }
        if target.name.trim().is_empty() || target.address.is_empty() {
            debug!(
                "skipping facility {}: failed quality gate (name/address)",
                target.external_id
            );
            stats.skipped_quality += 1;
            continue;
        }
        out.push(NewFacilityRecord {
            external_id: target.external_id.clone(),
            name: target.name.clone(),
            facility_type: target.facility_type,
            bed_count: target.bed_count,
            website: target.website.clone(),
            npi: target.npi.clone().unwrap_or_default(),
            status: target.status,
            address: target.address.clone(),
            phone: target.phone.clone(),
        });
        stats.emitted += 1;
    }
    (out, stats)
}

/// Emit a new-contact record for every executive whose employer name resolves
/// to a known target key and who carries a usable email or phone. Executives
/// already present in the CRM contact export (by email) are skipped.
pub fn generate_new_contacts(
    executives: &[ExecutiveRecord],
    resolver: &CandidateResolver<'_>,
    normalizer: &NameNormalizer,
    existing_emails: &HashSet<String>,
    titles: &TitleConfig,
) -> (Vec<NewContactRecord>, ContactGenStats) {
    let mut out = Vec::new();
    let mut stats = ContactGenStats::default();
    for exec in executives {
        let employer_key = normalizer.normalize(&exec.employer_name);
        if employer_key.is_empty() || !resolver.has_key(&employer_key) {
            debug!(
                "skipping executive {}: employer {:?} not in target pool",
                exec.external_id, exec.employer_name
            );
            stats.skipped_no_employer += 1;
            continue;
        }
        let email = exec
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| is_valid_email(e));
        let phone = exec
            .phone
            .as_deref()
            .filter(|p| is_valid_phone(p))
            .map(format_phone);
        if email.is_none() && phone.is_none() {
            stats.skipped_no_contact_info += 1;
            continue;
        }
        if let Some(e) = email {
            if existing_emails.contains(&e.to_lowercase()) {
                stats.skipped_existing += 1;
                continue;
            }
        }
        out.push(NewContactRecord {
            external_id: exec.external_id.clone(),
            first_name: exec.first_name.clone(),
            last_name: exec.last_name.clone(),
            title: exec.title.clone(),
            department: exec.department.clone(),
            email: email.unwrap_or_default().to_string(),
            phone: phone.unwrap_or_default(),
            employer_name: exec.employer_name.clone(),
            seniority: seniority_from_title(&exec.title, titles),
        });
        stats.emitted += 1;
    }
    (out, stats)
}

/// Keyword lookup over the lower-cased title. C-level keywords take
/// precedence over manager keywords.
pub fn seniority_from_title(title: &str, cfg: &TitleConfig) -> SeniorityLevel {
    let lower = title.to_lowercase();
    if cfg.clevel_keywords.iter().any(|k| lower.contains(k.as_str())) {
        SeniorityLevel::CLevel
    } else if cfg.manager_keywords.iter().any(|k| lower.contains(k.as_str())) {
        SeniorityLevel::Manager
    } else {
        SeniorityLevel::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchConfig, NormalizerConfig, TitleConfig};
    use crate::matching::MatchClassifier;
    use crate::models::{Address, FacilityStatus, FacilityType};

    fn target(name: &str, complete_addr: bool) -> TargetRecord {
        TargetRecord {
            external_id: format!("dhc-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            facility_type: FacilityType::Alf,
            bed_count: Some(24),
            website: String::new(),
            npi: None,
            status: FacilityStatus::Active,
            profile_link: None,
            address: if complete_addr {
                Address {
                    street: "5 Oak Ave".into(),
                    city: "Boise".into(),
                    state: "ID".into(),
                    zip: "83702".into(),
                }
            } else {
                Address::default()
            },
            phone: String::new(),
        }
    }

    fn exec(employer: &str, email: Option<&str>, phone: Option<&str>, title: &str) -> ExecutiveRecord {
        ExecutiveRecord {
            external_id: "exec-1".into(),
            first_name: "Pat".into(),
            last_name: "Lee".into(),
            title: title.into(),
            department: "Operations".into(),
            email: email.map(String::from),
            phone: phone.map(String::from),
            employer_name: employer.into(),
            firm_type: "Assisted Living Facility".into(),
        }
    }

    #[test]
    fn unmatched_target_with_complete_address_is_emitted_once() {
        let targets = vec![target("Sunny Meadows", true)];
        let (records, stats) =
            generate_new_facilities(&targets, &HashSet::new(), &HashSet::new());
        assert_eq!(records.len(), 1);
        assert_eq!(stats.emitted, 1);
        assert_eq!(stats.skipped(), 0);
    }

    #[test]
    fn matched_target_is_not_emitted() {
        let targets = vec![target("Sunny Meadows", true)];
        let matched = HashSet::from([0usize]);
        let (records, stats) = generate_new_facilities(&targets, &matched, &HashSet::new());
        assert!(records.is_empty());
        assert_eq!(stats.emitted, 0);
    }

    #[test]
    fn missing_address_is_skipped_and_counted() {
        let targets = vec![target("Sunny Meadows", false)];
        let (records, stats) =
            generate_new_facilities(&targets, &HashSet::new(), &HashSet::new());
        assert!(records.is_empty());
        assert_eq!(stats.skipped_quality, 1);
    }

    #[test]
    fn already_imported_facility_is_skipped() {
        let targets = vec![target("Sunny Meadows", true)];
        let existing = HashSet::from([targets[0].external_id.clone()]);
        let (records, stats) = generate_new_facilities(&targets, &HashSet::new(), &existing);
        assert!(records.is_empty());
        assert_eq!(stats.skipped_existing, 1);
    }

    fn contact_env() -> (NameNormalizer, MatchClassifier) {
        (
            NameNormalizer::new(&NormalizerConfig::default()),
            MatchClassifier::new(&MatchConfig::default()),
        )
    }

    #[test]
    fn executive_with_known_employer_and_email_is_emitted() {
        let targets = vec![target("Sunny Meadows", true)];
        let (normalizer, classifier) = contact_env();
        let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);
        let execs = vec![exec(
            "Sunny Meadows LLC",
            Some("pat.lee@example.com"),
            None,
            "Chief Executive Officer",
        )];
        let (records, stats) = generate_new_contacts(
            &execs,
            &resolver,
            &normalizer,
            &HashSet::new(),
            &TitleConfig::default(),
        );
        assert_eq!(stats.emitted, 1);
        assert_eq!(records[0].seniority, SeniorityLevel::CLevel);
        assert_eq!(records[0].email, "pat.lee@example.com");
    }

    #[test]
    fn executive_without_contact_info_is_skipped_and_counted() {
        let targets = vec![target("Sunny Meadows", true)];
        let (normalizer, classifier) = contact_env();
        let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);
        let execs = vec![exec("Sunny Meadows", None, None, "Administrator")];
        let (records, stats) = generate_new_contacts(
            &execs,
            &resolver,
            &normalizer,
            &HashSet::new(),
            &TitleConfig::default(),
        );
        assert!(records.is_empty());
        assert_eq!(stats.skipped_no_contact_info, 1);
    }

    #[test]
    fn executive_with_unknown_employer_is_skipped() {
        let targets = vec![target("Sunny Meadows", true)];
        let (normalizer, classifier) = contact_env();
        let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);
        let execs = vec![exec(
            "Elsewhere Manor",
            Some("pat.lee@example.com"),
            None,
            "Director of Nursing",
        )];
        let (_, stats) = generate_new_contacts(
            &execs,
            &resolver,
            &normalizer,
            &HashSet::new(),
            &TitleConfig::default(),
        );
        assert_eq!(stats.skipped_no_employer, 1);
    }

    #[test]
    fn known_email_is_deduplicated() {
        let targets = vec![target("Sunny Meadows", true)];
        let (normalizer, classifier) = contact_env();
        let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);
        let execs = vec![exec(
            "Sunny Meadows",
            Some("Pat.Lee@Example.com"),
            None,
            "Administrator",
        )];
        let existing = HashSet::from(["pat.lee@example.com".to_string()]);
        let (records, stats) = generate_new_contacts(
            &execs,
            &resolver,
            &normalizer,
            &existing,
            &TitleConfig::default(),
        );
        assert!(records.is_empty());
        assert_eq!(stats.skipped_existing, 1);
    }

    #[test]
    fn phone_only_contact_is_accepted_and_formatted() {
        let targets = vec![target("Sunny Meadows", true)];
        let (normalizer, classifier) = contact_env();
        let resolver = CandidateResolver::new(&targets, &normalizer, &classifier);
        let execs = vec![exec("Sunny Meadows", None, Some("2085551234"), "Billing Manager")];
        let (records, stats) = generate_new_contacts(
            &execs,
            &resolver,
            &normalizer,
            &HashSet::new(),
            &TitleConfig::default(),
        );
        assert_eq!(stats.emitted, 1);
        assert_eq!(records[0].phone, "(208) 555-1234");
        assert_eq!(records[0].seniority, SeniorityLevel::Manager);
    }

    #[test]
    fn seniority_keyword_lookup() {
        let cfg = TitleConfig::default();
        assert_eq!(seniority_from_title("Chief Financial Officer", &cfg), SeniorityLevel::CLevel);
        assert_eq!(seniority_from_title("Regional Director", &cfg), SeniorityLevel::Manager);
        assert_eq!(seniority_from_title("Staff Nurse", &cfg), SeniorityLevel::Other);
    }
}
