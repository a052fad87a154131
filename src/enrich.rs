//! Field enrichment for matched source companies.

use crate::matching::{MatchKind, MatchResult};
use crate::models::{DerivedFields, EnrichedRecord, SourceRecord, TargetRecord};

/// Merge a source company with its match outcome. Pure: counter updates are
/// the caller's job, driven by the returned match kind.
///
/// An unmatched source passes through untouched with no derived fields, so
/// downstream consumers read empty derived columns as "unmatched", never as
/// an error. A matched source receives the full derived-field set verbatim
/// from the target; source-original fields are never overwritten.
pub fn merge(source: SourceRecord, result: &MatchResult, targets: &[TargetRecord]) -> EnrichedRecord {
    let derived = match (result.kind, result.target_idx) {
        (MatchKind::None, _) | (_, None) => None,
        (_, Some(idx)) => Some(derive_from(&targets[idx])),
    };
    EnrichedRecord { source, derived }
}

fn derive_from(target: &TargetRecord) -> DerivedFields {
    DerivedFields {
        facility_id: target.external_id.clone(),
        facility_type: target.facility_type,
        bed_count: target.bed_count,
        website: target.website.clone(),
        profile_link: target.profile_link.clone().unwrap_or_default(),
        npi: target.npi.clone().unwrap_or_default(),
        status: target.status,
        facility_address: target.address.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, FacilityStatus, FacilityType};
    use std::collections::BTreeMap;

    fn source() -> SourceRecord {
        SourceRecord {
            record_id: Some(42),
            name: "Green Acres LLC".into(),
            address: Address {
                street: "9 Elm St".into(),
                city: "Hartford".into(),
                state: "CT".into(),
                zip: "06103".into(),
            },
            phone: "(555) 123-4567".into(),
            website: "greenacres.example".into(),
            extra: BTreeMap::from([("Owner".to_string(), "J. Smith".to_string())]),
        }
    }

    fn target() -> TargetRecord {
        TargetRecord {
            external_id: "778812".into(),
            name: "Green Acres".into(),
            facility_type: FacilityType::Snf,
            bed_count: Some(80),
            website: "greenacres-snf.example".into(),
            npi: Some("1234567890".into()),
            status: FacilityStatus::Active,
            profile_link: Some("https://feed.example/fac/778812".into()),
            address: Address {
                street: "1 Main St".into(),
                city: "Hartford".into(),
                state: "CT".into(),
                zip: "06103".into(),
            },
            phone: "(555) 999-0000".into(),
        }
    }

    #[test]
    fn none_match_passes_source_through_unchanged() {
        let src = source();
        let expected = src.clone();
        let enriched = merge(src, &MatchResult::none(), &[target()]);
        assert!(enriched.derived.is_none());
        assert_eq!(enriched.source, expected);
    }

    #[test]
    fn matched_record_carries_full_derived_set() {
        let targets = [target()];
        let result = MatchResult {
            kind: MatchKind::Exact,
            target_idx: Some(0),
            score: 100.0,
        };
        let enriched = merge(source(), &result, &targets);
        let derived = enriched.derived.expect("derived fields present");
        assert_eq!(derived.facility_id, "778812");
        assert_eq!(derived.facility_type, FacilityType::Snf);
        assert_eq!(derived.bed_count, Some(80));
        assert_eq!(derived.status, FacilityStatus::Active);
        assert_eq!(derived.npi, "1234567890");
        assert_eq!(derived.facility_address.street, "1 Main St");
        // Source fields are untouched by enrichment.
        assert_eq!(enriched.source.website, "greenacres.example");
        assert_eq!(enriched.source.address.street, "9 Elm St");
    }
}
