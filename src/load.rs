//! CSV input loading with header validation.
//!
//! All inputs are loaded fully into memory before any matching begins. Any
//! failure here is fatal for the run; per-row data-quality decisions happen
//! later, in the generators.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, info};

use crate::config::ExecutiveFilterConfig;
use crate::error::LoadError;
use crate::models::{
    Address, ExecutiveRecord, FacilityStatus, FacilityType, SourceContact, SourceFacility,
    SourceRecord, TargetRecord,
};
use crate::util::{format_phone, format_zip};

pub const COMPANIES_FILE: &str = "companies.csv";
pub const CONTACTS_FILE: &str = "contacts.csv";
pub const FACILITIES_FILE: &str = "facilities.csv";
pub const ALF_FILE: &str = "alf_overview.csv";
pub const SNF_FILE: &str = "snf_overview.csv";
pub const EXECUTIVES_FILE: &str = "executives.csv";

/// Immutable snapshot of every input table for one run.
#[derive(Debug)]
pub struct Datasets {
    pub companies: Vec<SourceRecord>,
    pub contacts: Vec<SourceContact>,
    pub facilities: Vec<SourceFacility>,
    /// ALF rows first, then SNF rows, each in file order.
    pub targets: Vec<TargetRecord>,
    pub executives: Vec<ExecutiveRecord>,
    /// Executives dropped at load time for a firm type outside the
    /// long-term-care universe.
    pub executives_filtered_out: usize,
    /// Executive rows collapsed onto an earlier row with the same person id.
    pub executives_deduped: usize,
}

pub fn load_all(input_dir: &Path, filter: &ExecutiveFilterConfig) -> Result<Datasets, LoadError> {
    let companies = load_companies(&input_dir.join(COMPANIES_FILE))?;
    let contacts = load_contacts(&input_dir.join(CONTACTS_FILE))?;
    let facilities = load_facilities(&input_dir.join(FACILITIES_FILE))?;

    let mut targets = load_targets(&input_dir.join(ALF_FILE), FacilityType::Alf)?;
    targets.extend(load_targets(&input_dir.join(SNF_FILE), FacilityType::Snf)?);

    let (executives, executives_filtered_out, executives_deduped) =
        load_executives(&input_dir.join(EXECUTIVES_FILE), filter)?;

    info!(
        "loaded {} companies, {} contacts, {} facilities, {} targets, {} executives",
        companies.len(),
        contacts.len(),
        facilities.len(),
        targets.len(),
        executives.len()
    );

    Ok(Datasets {
        companies,
        contacts,
        facilities,
        targets,
        executives,
        executives_filtered_out,
        executives_deduped,
    })
}

/// Header lookup for one file, with required-column enforcement.
struct Header {
    path: PathBuf,
    index: HashMap<String, usize>,
}

impl Header {
    fn new(path: &Path, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self {
            path: path.to_path_buf(),
            index,
        }
    }

    fn required(&self, column: &'static str) -> Result<usize, LoadError> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column,
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn read_rows(path: &Path) -> Result<(Header, Vec<StringRecord>), LoadError> {
    let mut reader = open_reader(path)?;
    let header = {
        let headers = reader.headers().map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Header::new(path, headers)
    };
    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(rec) => rows.push(rec),
            Err(e) => {
                let line = e
                    .position()
                    .map(csv::Position::line)
                    .unwrap_or_default();
                return Err(LoadError::Row {
                    path: path.to_path_buf(),
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok((header, rows))
}

fn field(rec: &StringRecord, idx: usize) -> String {
    rec.get(idx).unwrap_or("").trim().to_string()
}

fn opt_field(rec: &StringRecord, idx: Option<usize>) -> String {
    idx.map(|i| field(rec, i)).unwrap_or_default()
}

/// CRM exports sometimes render integer ids as floats ("12345.0").
fn parse_record_id(raw: &str, path: &Path, line: u64) -> Result<Option<i64>, LoadError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = s.parse::<i64>() {
        return Ok(Some(v));
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
        _ => Err(LoadError::Row {
            path: path.to_path_buf(),
            line,
            reason: format!("unparseable record id {s:?}"),
        }),
    }
}

fn parse_beds(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as u32))
}

/// NPIs arrive as "1234567890.0" in some feeds; keep the integer digits only.
fn parse_npi(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return Some(s.to_string());
    }
    s.parse::<f64>().ok().map(|f| format!("{}", f as i64))
}

const COMPANY_STANDARD_COLUMNS: &[&str] = &[
    "Record ID",
    "Company name",
    "Street Address",
    "City",
    "State/Region",
    "Postal Code",
    "Phone Number",
    "Website URL",
];

fn load_companies(path: &Path) -> Result<Vec<SourceRecord>, LoadError> {
    let (header, rows) = read_rows(path)?;
    let id_idx = header.required("Record ID")?;
    let name_idx = header.required("Company name")?;
    let street = header.optional("Street Address");
    let city = header.optional("City");
    let state = header.optional("State/Region");
    let zip = header.optional("Postal Code");
    let phone = header.optional("Phone Number");
    let website = header.optional("Website URL");
    let standard: HashSet<&str> = COMPANY_STANDARD_COLUMNS.iter().copied().collect();
    let extra_cols: Vec<(String, usize)> = header
        .index
        .iter()
        .filter(|(name, _)| !standard.contains(name.as_str()))
        .map(|(name, idx)| (name.clone(), *idx))
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    for (row_no, rec) in rows.iter().enumerate() {
        let line = row_no as u64 + 2;
        let mut extra = std::collections::BTreeMap::new();
        for (name, idx) in &extra_cols {
            let value = field(rec, *idx);
            if !value.is_empty() {
                extra.insert(name.clone(), value);
            }
        }
        out.push(SourceRecord {
            record_id: parse_record_id(&field(rec, id_idx), path, line)?,
            name: field(rec, name_idx),
            address: Address {
                street: opt_field(rec, street),
                city: opt_field(rec, city),
                state: opt_field(rec, state),
                zip: opt_field(rec, zip),
            },
            phone: opt_field(rec, phone),
            website: opt_field(rec, website),
            extra,
        });
    }
    Ok(out)
}

fn load_contacts(path: &Path) -> Result<Vec<SourceContact>, LoadError> {
    let (header, rows) = read_rows(path)?;
    let first = header.required("First Name")?;
    let last = header.required("Last Name")?;
    let email = header.required("Email")?;
    let id = header.optional("Record ID");
    let title = header.optional("Job Title");

    let mut out = Vec::with_capacity(rows.len());
    for (row_no, rec) in rows.iter().enumerate() {
        let line = row_no as u64 + 2;
        let record_id = match id {
            Some(idx) => parse_record_id(&field(rec, idx), path, line)?,
            None => None,
        };
        out.push(SourceContact {
            record_id,
            first_name: field(rec, first),
            last_name: field(rec, last),
            email: field(rec, email),
            title: opt_field(rec, title),
        });
    }
    Ok(out)
}

fn load_facilities(path: &Path) -> Result<Vec<SourceFacility>, LoadError> {
    let (header, rows) = read_rows(path)?;
    let external = header.required("DHC ID")?;
    let id = header.optional("Record ID");
    let name = header.optional("Name of Facility");

    let mut out = Vec::with_capacity(rows.len());
    for (row_no, rec) in rows.iter().enumerate() {
        let line = row_no as u64 + 2;
        let record_id = match id {
            Some(idx) => parse_record_id(&field(rec, idx), path, line)?,
            None => None,
        };
        out.push(SourceFacility {
            record_id,
            external_id: field(rec, external),
            name: opt_field(rec, name),
        });
    }
    Ok(out)
}

fn load_targets(path: &Path, facility_type: FacilityType) -> Result<Vec<TargetRecord>, LoadError> {
    let (header, rows) = read_rows(path)?;
    let id = header.required("HOSPITAL_ID")?;
    let name = header.required("HOSPITAL_NAME")?;
    let status = header.optional("COMPANY_STATUS");
    let beds = header.optional("NUMBER_BEDS");
    let website = header.optional("WEBSITE");
    let npi = header.optional("NPI_NUMBER");
    let profile = header.optional("PROFILE_LINK");
    let street = header.optional("HQ_ADDRESS");
    let city = header.optional("HQ_CITY");
    let state = header.optional("HQ_STATE");
    let zip = header.optional("HQ_ZIP_CODE");
    let phone = header.optional("HQ_PHONE");

    let mut out = Vec::with_capacity(rows.len());
    for rec in &rows {
        let profile_link = opt_field(rec, profile);
        out.push(TargetRecord {
            external_id: field(rec, id),
            name: field(rec, name),
            facility_type,
            bed_count: parse_beds(&opt_field(rec, beds)),
            website: opt_field(rec, website),
            npi: parse_npi(&opt_field(rec, npi)),
            status: FacilityStatus::parse(&opt_field(rec, status)),
            profile_link: (!profile_link.is_empty()).then_some(profile_link),
            address: Address {
                street: opt_field(rec, street),
                city: opt_field(rec, city),
                state: opt_field(rec, state),
                zip: format_zip(&opt_field(rec, zip)),
            },
            phone: format_phone(&opt_field(rec, phone)),
        });
    }
    Ok(out)
}

fn load_executives(
    path: &Path,
    filter: &ExecutiveFilterConfig,
) -> Result<(Vec<ExecutiveRecord>, usize, usize), LoadError> {
    let (header, rows) = read_rows(path)?;
    let id = header.required("GLOBAL_PERSON_ID")?;
    let first = header.required("FIRST_NAME")?;
    let last = header.required("LAST_NAME")?;
    let employer = header.required("HOSPITAL_NAME")?;
    let title = header.optional("TITLE");
    let department = header.optional("DEPARTMENT");
    let email = header.optional("EMAIL");
    let phone = header.optional("PHONE");
    let firm_type = header.optional("FIRM_TYPE");

    let allowed: HashSet<&str> = filter
        .allowed_firm_types
        .iter()
        .map(String::as_str)
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut filtered = 0usize;
    let mut deduped = 0usize;
    for rec in &rows {
        let firm = opt_field(rec, firm_type);
        if firm_type.is_some() && !allowed.contains(firm.as_str()) {
            filtered += 1;
            continue;
        }
        let person_id = field(rec, id);
        if !person_id.is_empty() && !seen_ids.insert(person_id.clone()) {
            deduped += 1;
            continue;
        }
        let email_val = opt_field(rec, email);
        let phone_val = opt_field(rec, phone);
        out.push(ExecutiveRecord {
            external_id: person_id,
            first_name: field(rec, first),
            last_name: field(rec, last),
            title: opt_field(rec, title),
            department: opt_field(rec, department),
            email: (!email_val.is_empty()).then_some(email_val),
            phone: (!phone_val.is_empty()).then_some(phone_val),
            employer_name: field(rec, employer),
            firm_type: firm,
        });
    }
    if filtered > 0 {
        debug!("{path:?}: {filtered} executives outside allowed firm types");
    }
    Ok((out, filtered, deduped))
}
