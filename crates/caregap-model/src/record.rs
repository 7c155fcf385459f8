use serde::{Deserialize, Serialize};

/// Canonical roster columns, in output order.
pub const ROSTER_COLUMNS: [&str; 8] = [
    "First Name",
    "Last Name",
    "Member ID",
    "Care Gap",
    "DOB",
    "Insurance",
    "Doctor/Provider",
    "Notes",
];

/// Member IDs are compared and stored as their leading characters only;
/// portals pad the same identifier with differing suffixes.
pub const MEMBER_ID_LEN: usize = 6;

/// Placeholder for optional fields a source did not provide.
pub const DEFAULT_VALUE: &str = "N/A";

/// Composite duplicate-identity key. Kept as a tuple rather than a joined
/// string: fields here are free text, and a separator character inside one
/// could make two distinct rows collide.
pub type DedupeKey = (String, String, String, String);

/// One row of the master roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub first_name: String,
    pub last_name: String,
    pub member_id: String,
    pub care_gap: String,
    pub dob: String,
    pub insurance: String,
    pub provider: String,
    pub notes: String,
}

impl MasterRecord {
    /// Field values in `ROSTER_COLUMNS` order.
    pub fn values(&self) -> [&str; 8] {
        [
            &self.first_name,
            &self.last_name,
            &self.member_id,
            &self.care_gap,
            &self.dob,
            &self.insurance,
            &self.provider,
            &self.notes,
        ]
    }

    /// Duplicate key over (Care Gap, First Name, Member ID, Last Name).
    pub fn member_key(&self) -> DedupeKey {
        key_tuple(
            &self.care_gap,
            &self.first_name,
            &self.member_id,
            &self.last_name,
        )
    }

    /// Duplicate key over (Care Gap, First Name, DOB, Last Name).
    pub fn dob_key(&self) -> DedupeKey {
        key_tuple(&self.care_gap, &self.first_name, &self.dob, &self.last_name)
    }
}

fn key_tuple(a: &str, b: &str, c: &str, d: &str) -> DedupeKey {
    (
        a.trim().to_string(),
        b.trim().to_string(),
        c.trim().to_string(),
        d.trim().to_string(),
    )
}

/// Truncate a member ID to its significant prefix. Idempotent.
pub fn normalize_member_id(raw: &str) -> String {
    raw.trim().chars().take(MEMBER_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_id_truncates_to_prefix() {
        assert_eq!(normalize_member_id("123456789"), "123456");
        assert_eq!(normalize_member_id("  123456789  "), "123456");
        assert_eq!(normalize_member_id("12345"), "12345");
    }

    #[test]
    fn member_id_normalization_is_idempotent() {
        let once = normalize_member_id("123456789");
        assert_eq!(normalize_member_id(&once), once);
    }

    fn record(first: &str, last: &str) -> MasterRecord {
        MasterRecord {
            first_name: first.to_string(),
            last_name: last.to_string(),
            member_id: "123456".to_string(),
            care_gap: "Diabetes".to_string(),
            dob: "1960-01-02".to_string(),
            insurance: "Acme".to_string(),
            provider: "N/A".to_string(),
            notes: "N/A".to_string(),
        }
    }

    #[test]
    fn duplicate_keys_cover_both_identities() {
        let record = record("John", "Smith");
        assert_eq!(
            record.member_key(),
            (
                "Diabetes".to_string(),
                "John".to_string(),
                "123456".to_string(),
                "Smith".to_string()
            )
        );
        assert_eq!(
            record.dob_key(),
            (
                "Diabetes".to_string(),
                "John".to_string(),
                "1960-01-02".to_string(),
                "Smith".to_string()
            )
        );
    }

    #[test]
    fn separator_characters_in_fields_do_not_collide() {
        // "a|b" + "c" must not share a key with "a" + "b|c".
        let left = record("a|b", "c");
        let right = record("a", "b|c");
        assert_ne!(left.member_key(), right.member_key());
        assert_ne!(left.dob_key(), right.dob_key());
    }
}
