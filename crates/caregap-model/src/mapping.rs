use serde::{Deserialize, Serialize};

/// Per-insurer description of which source columns hold which logical fields.
///
/// Every field is optional; an absent entry means the source does not carry
/// that column. Exactly one naming scheme is expected per config, either
/// `Full Name` or the `First Name`/`Last Name` pair, but both being present
/// is tolerated (`Full Name` takes precedence downstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappingConfig {
    /// Display label, also the basis of the stored record ID.
    pub name: String,
    pub fields: FieldMap,
}

/// Logical column name → source column name, serialized with the spaced
/// key names the configuration records have always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(rename = "First Name", default)]
    pub first_name: Option<String>,
    #[serde(rename = "Last Name", default)]
    pub last_name: Option<String>,
    #[serde(rename = "Full Name", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Member ID", default)]
    pub member_id: Option<String>,
    #[serde(rename = "Care Gap", default)]
    pub care_gap: Option<String>,
    #[serde(rename = "DOB", default)]
    pub dob: Option<String>,
    /// Column name when the sheet carries insurance, otherwise the literal
    /// insurance value applied to every row (see `insurance_provided`).
    #[serde(rename = "Insurance", default)]
    pub insurance: Option<String>,
    #[serde(rename = "Insurance Provided", default)]
    pub insurance_provided: Option<InsuranceProvided>,
    #[serde(rename = "Doctor/Provider", default)]
    pub provider: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

/// Whether the source sheet itself carries an insurance column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsuranceProvided {
    Yes,
    No,
}

impl FieldMap {
    /// True only when the config explicitly says the sheet has no
    /// insurance column of its own.
    pub fn insurance_is_literal(&self) -> bool {
        self.insurance_provided == Some(InsuranceProvided::No)
    }

    /// Populated (logical name, source column) pairs, in logical order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let pairs = [
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Full Name", &self.full_name),
            ("Member ID", &self.member_id),
            ("Care Gap", &self.care_gap),
            ("DOB", &self.dob),
            ("Insurance", &self.insurance),
            ("Doctor/Provider", &self.provider),
            ("Notes", &self.notes),
        ];
        pairs
            .into_iter()
            .filter_map(|(logical, value)| value.as_deref().map(|v| (logical, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_spaced_keys() {
        let json = r#"{
            "name": "Acme Portal",
            "fields": {
                "Full Name": "Patient",
                "Member ID": "ID",
                "Care Gap": "Measure",
                "DOB": "Birth Date",
                "Insurance": "Acme",
                "Insurance Provided": "No"
            }
        }"#;
        let config: FieldMappingConfig = serde_json::from_str(json).expect("parse config");
        assert_eq!(config.name, "Acme Portal");
        assert_eq!(config.fields.full_name.as_deref(), Some("Patient"));
        assert!(config.fields.first_name.is_none());
        assert!(config.fields.insurance_is_literal());
    }

    #[test]
    fn absent_insurance_provided_means_column_backed() {
        let config: FieldMappingConfig =
            serde_json::from_str(r#"{"name": "Plain", "fields": {}}"#).expect("parse config");
        assert!(!config.fields.insurance_is_literal());
    }
}
