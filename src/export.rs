//! CSV output writers.
//!
//! Four files per run: enriched companies, new facilities, new contacts, and
//! the run summary. Column order is part of the import contract and must not
//! change between runs.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ExportError;
use crate::models::{EnrichedRecord, NewContactRecord, NewFacilityRecord};
use crate::summary::RunSummary;
use crate::util::full_address;

pub const ENRICHED_COMPANIES_FILE: &str = "enriched_companies.csv";
pub const NEW_FACILITIES_FILE: &str = "new_facilities.csv";
pub const NEW_CONTACTS_FILE: &str = "new_contacts.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.csv";

const SOURCE_HEADERS: &[&str] = &[
    "Record ID",
    "Company name",
    "Street Address",
    "City",
    "State/Region",
    "Postal Code",
    "Phone Number",
    "Website URL",
];

const DERIVED_HEADERS: &[&str] = &[
    "DHC ID",
    "Facility Type",
    "Total Beds",
    "Facility Website",
    "Profile Link",
    "NPI",
    "Company Status",
    "Facility Address",
];

fn open_writer(path: &Path) -> Result<Writer<BufWriter<File>>, ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let buf_writer = BufWriter::with_capacity(512 * 1024, file);
    Ok(WriterBuilder::new().from_writer(buf_writer))
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> ExportError + '_ {
    move |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Collect every extra column name seen across the input, sorted so the
/// output schema is stable regardless of row order.
fn collect_extra_columns(records: &[EnrichedRecord]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for rec in records {
        for key in rec.source.extra.keys() {
            names.insert(key.clone());
        }
    }
    names.into_iter().collect()
}

pub fn export_enriched_companies(
    records: &[EnrichedRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let extra_columns = collect_extra_columns(records);
    let mut w = open_writer(path)?;

    let mut headers: Vec<String> = SOURCE_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(extra_columns.iter().cloned());
    headers.extend(DERIVED_HEADERS.iter().map(|h| h.to_string()));
    w.write_record(&headers).map_err(csv_err(path))?;

    for rec in records {
        let src = &rec.source;
        let mut row: Vec<String> = vec![
            src.record_id.map(|id| id.to_string()).unwrap_or_default(),
            src.name.clone(),
            src.address.street.clone(),
            src.address.city.clone(),
            src.address.state.clone(),
            src.address.zip.clone(),
            src.phone.clone(),
            src.website.clone(),
        ];
        for column in &extra_columns {
            row.push(src.extra.get(column).cloned().unwrap_or_default());
        }
        match &rec.derived {
            Some(d) => {
                row.push(d.facility_id.clone());
                row.push(d.facility_type.to_string());
                row.push(d.bed_count.map(|b| b.to_string()).unwrap_or_default());
                row.push(d.website.clone());
                row.push(d.profile_link.clone());
                row.push(d.npi.clone());
                row.push(d.status.to_string());
                row.push(full_address(&d.facility_address));
            }
            None => row.extend(std::iter::repeat(String::new()).take(DERIVED_HEADERS.len())),
        }
        w.write_record(&row).map_err(csv_err(path))?;
    }
    w.flush().map_err(|e| ExportError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn export_new_facilities(
    records: &[NewFacilityRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let mut w = open_writer(path)?;
    w.write_record([
        "DHC ID",
        "Company name",
        "Facility Type",
        "Total Beds",
        "Website URL",
        "NPI",
        "Company Status",
        "Street Address",
        "City",
        "State/Region",
        "Postal Code",
        "Phone Number",
    ])
    .map_err(csv_err(path))?;
    for rec in records {
        let beds = rec.bed_count.map(|b| b.to_string()).unwrap_or_default();
        w.write_record([
            rec.external_id.as_str(),
            rec.name.as_str(),
            rec.facility_type.as_str(),
            beds.as_str(),
            rec.website.as_str(),
            rec.npi.as_str(),
            rec.status.as_str(),
            rec.address.street.as_str(),
            rec.address.city.as_str(),
            rec.address.state.as_str(),
            rec.address.zip.as_str(),
            rec.phone.as_str(),
        ])
        .map_err(csv_err(path))?;
    }
    w.flush().map_err(|e| ExportError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn export_new_contacts(records: &[NewContactRecord], path: &Path) -> Result<(), ExportError> {
    let mut w = open_writer(path)?;
    w.write_record([
        "Person ID",
        "First Name",
        "Last Name",
        "Job Title",
        "Department",
        "Email",
        "Phone Number",
        "Company name",
        "Seniority",
    ])
    .map_err(csv_err(path))?;
    for rec in records {
        w.write_record([
            rec.external_id.as_str(),
            rec.first_name.as_str(),
            rec.last_name.as_str(),
            rec.title.as_str(),
            rec.department.as_str(),
            rec.email.as_str(),
            rec.phone.as_str(),
            rec.employer_name.as_str(),
            rec.seniority.as_str(),
        ])
        .map_err(csv_err(path))?;
    }
    w.flush().map_err(|e| ExportError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn export_run_summary(summary: &RunSummary, path: &Path) -> Result<(), ExportError> {
    let mut w = open_writer(path)?;
    w.write_record(["Key", "Value"]).map_err(csv_err(path))?;
    for (key, value) in summary.as_rows() {
        w.write_record([key.as_str(), value.as_str()])
            .map_err(csv_err(path))?;
    }
    w.flush().map_err(|e| ExportError::Create {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Address, DerivedFields, FacilityStatus, FacilityType, SourceRecord,
    };
    use std::collections::BTreeMap;

    fn enriched(name: &str, derived: Option<DerivedFields>, extra: &[(&str, &str)]) -> EnrichedRecord {
        EnrichedRecord {
            source: SourceRecord {
                record_id: Some(7),
                name: name.into(),
                address: Address::default(),
                phone: String::new(),
                website: String::new(),
                extra: extra
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            },
            derived,
        }
    }

    fn derived() -> DerivedFields {
        DerivedFields {
            facility_id: "778812".into(),
            facility_type: FacilityType::Snf,
            bed_count: Some(80),
            website: "snf.example".into(),
            profile_link: String::new(),
            npi: "1234567890".into(),
            status: FacilityStatus::Active,
            facility_address: Address {
                street: "1 Main St".into(),
                city: "Hartford".into(),
                state: "CT".into(),
                zip: "06103".into(),
            },
        }
    }

    #[test]
    fn enriched_export_appends_derived_columns_after_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENRICHED_COMPANIES_FILE);
        let records = vec![
            enriched("Green Acres LLC", Some(derived()), &[("Owner Notes", "family owned")]),
            enriched("Sunny Meadows", None, &[]),
        ];
        export_enriched_companies(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Record ID,Company name"));
        assert!(header.contains("Owner Notes,DHC ID"));
        assert!(header.ends_with("Company Status,Facility Address"));

        let matched = lines.next().unwrap();
        assert!(matched.contains("778812"));
        assert!(matched.contains("\"1 Main St, Hartford, CT, 06103\""));

        // Unmatched rows carry the extra column and empty derived columns.
        let unmatched = lines.next().unwrap();
        assert!(unmatched.ends_with(",,,,,,,,"));
    }

    #[test]
    fn derived_columns_are_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENRICHED_COMPANIES_FILE);
        let records = vec![enriched("Sunny Meadows", None, &[])];
        export_enriched_companies(&records, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let row = content.lines().nth(1).unwrap();
        let trailing: Vec<&str> = row.split(',').rev().take(8).collect();
        assert!(trailing.iter().all(|v| v.is_empty()));
    }

    #[test]
    fn new_facility_export_headers_match_import_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(NEW_FACILITIES_FILE);
        let records = vec![NewFacilityRecord {
            external_id: "991".into(),
            name: "Sunny Meadows".into(),
            facility_type: FacilityType::Alf,
            bed_count: None,
            website: String::new(),
            npi: String::new(),
            status: FacilityStatus::Active,
            address: Address {
                street: "5 Oak Ave".into(),
                city: "Boise".into(),
                state: "ID".into(),
                zip: "83702".into(),
            },
            phone: "(208) 555-1234".into(),
        }];
        export_new_facilities(&records, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("DHC ID,Company name,Facility Type"));
        assert!(content.contains("991,Sunny Meadows,ALF,"));
    }
}
