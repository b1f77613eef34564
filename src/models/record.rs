//! Organization record data structure.

use serde::{Deserialize, Serialize};

/// Column headers of the raw CSV output, in order.
pub const RAW_HEADERS: [&str; 8] = [
    "nom_ecole",
    "nom_personne",
    "prenom_personne",
    "adresse",
    "site_internet",
    "telephone",
    "email",
    "url_source",
];

/// Column headers of the cleaned CSV output, in order.
pub const CLEAN_HEADERS: [&str; 7] = [
    "nom_ecole",
    "nom_personne",
    "prenom_personne",
    "adresse",
    "site_internet",
    "telephone",
    "email",
];

/// Contact details extracted from one organization's detail page.
///
/// Every field except `source_url` is empty unless its extraction rule
/// matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizationRecord {
    /// Organization or school name
    #[serde(rename = "nom_ecole")]
    pub name: String,

    #[serde(rename = "nom_personne")]
    pub contact_last_name: String,

    #[serde(rename = "prenom_personne")]
    pub contact_first_name: String,

    /// Raw matched address text, not geocoded
    #[serde(rename = "adresse")]
    pub address: String,

    /// External website, never the source site or a social network
    #[serde(rename = "site_internet")]
    pub website: String,

    #[serde(rename = "telephone")]
    pub phone: String,

    pub email: String,

    /// Detail page the record was extracted from
    #[serde(rename = "url_source", default)]
    pub source_url: String,
}

impl OrganizationRecord {
    /// Create an empty record for a detail page.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    /// Row values in [`RAW_HEADERS`] order.
    pub fn raw_row(&self) -> [&str; 8] {
        [
            self.name.as_str(),
            self.contact_last_name.as_str(),
            self.contact_first_name.as_str(),
            self.address.as_str(),
            self.website.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
            self.source_url.as_str(),
        ]
    }

    /// Row values in [`CLEAN_HEADERS`] order.
    pub fn clean_row(&self) -> [&str; 7] {
        [
            self.name.as_str(),
            self.contact_last_name.as_str(),
            self.contact_first_name.as_str(),
            self.address.as_str(),
            self.website.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
        ]
    }

    /// Fields holding a value, labelled by CSV column. Used for progress output.
    pub fn filled_fields(&self) -> Vec<(&'static str, &str)> {
        CLEAN_HEADERS
            .iter()
            .copied()
            .zip(self.clean_row())
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}
