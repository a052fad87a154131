use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Postal address shared by source and target records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    /// Complete means every component a mail piece needs is present.
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.state.trim().is_empty()
            && !self.zip.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.street.trim().is_empty()
            && self.city.trim().is_empty()
            && self.state.trim().is_empty()
            && self.zip.trim().is_empty()
    }
}

/// One CRM company row. `extra` holds columns beyond the standard schema,
/// preserved verbatim to the enriched output.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub record_id: Option<i64>,
    pub name: String,
    pub address: Address,
    pub phone: String,
    pub website: String,
    pub extra: BTreeMap<String, String>,
}

/// One CRM contact row, used only to recognize already-imported executives.
#[derive(Debug, Clone)]
pub struct SourceContact {
    pub record_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub title: String,
}

/// One CRM facility row, used only to recognize already-imported facilities.
#[derive(Debug, Clone)]
pub struct SourceFacility {
    pub record_id: Option<i64>,
    pub external_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityType {
    Alf,
    Snf,
}

impl FacilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alf => "ALF",
            Self::Snf => "SNF",
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityStatus {
    Active,
    Inactive,
}

impl FacilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// The feed spells status a few ways; anything not recognizably active
    /// is treated as inactive.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl std::fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One facility row from the third-party overview feed (ALF or SNF).
#[derive(Debug, Clone)]
pub struct TargetRecord {
    pub external_id: String,
    pub name: String,
    pub facility_type: FacilityType,
    pub bed_count: Option<u32>,
    pub website: String,
    pub npi: Option<String>,
    pub status: FacilityStatus,
    pub profile_link: Option<String>,
    pub address: Address,
    pub phone: String,
}

/// One row from the executive directory.
#[derive(Debug, Clone)]
pub struct ExecutiveRecord {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub department: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub employer_name: String,
    pub firm_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeniorityLevel {
    CLevel,
    Manager,
    Other,
}

impl SeniorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CLevel => "C-Level",
            Self::Manager => "Manager",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for SeniorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived fields copied from a matched target, all-or-nothing: either the
/// whole set is present on an enriched record or none of it is.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub facility_id: String,
    pub facility_type: FacilityType,
    pub bed_count: Option<u32>,
    pub website: String,
    pub profile_link: String,
    pub npi: String,
    pub status: FacilityStatus,
    pub facility_address: Address,
}

/// A source company plus the optional derived-field block.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub source: SourceRecord,
    pub derived: Option<DerivedFields>,
}

/// A target facility with no CRM counterpart, queued for creation.
#[derive(Debug, Clone)]
pub struct NewFacilityRecord {
    pub external_id: String,
    pub name: String,
    pub facility_type: FacilityType,
    pub bed_count: Option<u32>,
    pub website: String,
    pub npi: String,
    pub status: FacilityStatus,
    pub address: Address,
    pub phone: String,
}

/// An executive contact with no CRM counterpart, queued for creation.
#[derive(Debug, Clone)]
pub struct NewContactRecord {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    pub employer_name: String,
    pub seniority: SeniorityLevel,
}
