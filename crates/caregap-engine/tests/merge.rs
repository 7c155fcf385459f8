use std::collections::HashMap;

use caregap_engine::{EngineError, merge_sheets};
use caregap_ingest::{UploadedFile, read_table};
use caregap_model::{
    ConfigSource, FieldMap, FieldMappingConfig, GapsTaxonomy, InsuranceProvided, StoreError, Table,
};

struct MemoryStore {
    mappings: HashMap<String, FieldMappingConfig>,
    taxonomy: Option<GapsTaxonomy>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            mappings: HashMap::new(),
            taxonomy: Some(sample_taxonomy()),
        }
    }

    fn with_mapping(mut self, id: &str, config: FieldMappingConfig) -> Self {
        self.mappings.insert(id.to_string(), config);
        self
    }
}

impl ConfigSource for MemoryStore {
    fn field_mapping(&self, id: &str) -> Result<Option<FieldMappingConfig>, StoreError> {
        Ok(self.mappings.get(id).cloned())
    }

    fn gaps_taxonomy(&self) -> Result<Option<GapsTaxonomy>, StoreError> {
        Ok(self.taxonomy.clone())
    }
}

fn sample_taxonomy() -> GapsTaxonomy {
    let mut table = Table::new(vec!["Diabetes".to_string(), "Mammogram".to_string()]);
    table.push_row(vec!["HbA1c Overdue".to_string(), "BCS".to_string()]);
    GapsTaxonomy::from_table(&table)
}

fn csv(name: &str, contents: &str) -> UploadedFile {
    UploadedFile::new(name, contents.as_bytes().to_vec())
}

fn acme_config() -> FieldMappingConfig {
    FieldMappingConfig {
        name: "Acme Portal".to_string(),
        fields: FieldMap {
            full_name: Some("Patient".to_string()),
            member_id: Some("ID".to_string()),
            care_gap: Some("Measure".to_string()),
            dob: Some("Birth Date".to_string()),
            insurance: Some("Acme".to_string()),
            insurance_provided: Some(InsuranceProvided::No),
            ..FieldMap::default()
        },
    }
}

fn output_table(workbook: &[u8]) -> Table {
    read_table(&UploadedFile::new("merged.xlsx", workbook.to_vec())).expect("read merged workbook")
}

#[test]
fn unusable_master_plus_one_source_keeps_only_mapped_rows() {
    let master = csv("master.csv", "Random,Columns\n1,2\n");
    let source = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date\n\
         \"Smith, John Q\",123456789,HbA1c Overdue,1960-01-02\n\
         \"Doe, Jane\",987654321,Not A Real Gap,1971-03-04\n",
    );
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    assert!(!outcome.summary.master_reused);
    assert_eq!(outcome.summary.unmapped_dropped, 1);
    assert_eq!(outcome.summary.rows_added, 1);

    let table = output_table(&outcome.workbook);
    assert_eq!(
        table.headers,
        vec![
            "First Name",
            "Last Name",
            "Member ID",
            "Care Gap",
            "DOB",
            "Insurance",
            "Doctor/Provider",
            "Notes"
        ]
    );
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.cell(0, 0), "John");
    assert_eq!(table.cell(0, 1), "Smith");
    // Member ID truncated, care gap canonicalized, literal insurance applied.
    assert_eq!(table.cell(0, 2), "123456");
    assert_eq!(table.cell(0, 3), "Diabetes");
    assert_eq!(table.cell(0, 5), "Acme");
    assert_eq!(table.cell(0, 6), "N/A");
}

#[test]
fn insurance_override_ignores_source_insurance_column() {
    let master = csv("master.csv", "Nope\n");
    let source = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date,Plan\n\
         \"Smith, John\",111111,HbA1c Overdue,1960-01-02,SomeOtherPlan\n",
    );
    // The config maps no Insurance column; its Insurance entry is a literal.
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    let table = output_table(&outcome.workbook);
    assert_eq!(table.cell(0, 5), "Acme");
}

#[test]
fn split_name_columns_and_column_backed_insurance() {
    let master = csv("master.csv", "Nope\n");
    let source = csv(
        "beta.csv",
        "first name,LAST NAME,member,gap,dob,plan\n\
         Jane,Doe,222222,BCS,1971-03-04,BlueCross\n",
    );
    let config = FieldMappingConfig {
        name: "Beta".to_string(),
        fields: FieldMap {
            first_name: Some("First Name".to_string()),
            last_name: Some("Last Name".to_string()),
            member_id: Some("Member".to_string()),
            care_gap: Some("Gap".to_string()),
            dob: Some("DOB".to_string()),
            insurance: Some("Plan".to_string()),
            insurance_provided: Some(InsuranceProvided::Yes),
            ..FieldMap::default()
        },
    };
    let store = MemoryStore::new().with_mapping("BETA", config);

    let outcome = merge_sheets(&master, &[(source, "BETA".to_string())], &store).expect("merge");
    let table = output_table(&outcome.workbook);
    assert_eq!(table.cell(0, 0), "Jane");
    assert_eq!(table.cell(0, 1), "Doe");
    assert_eq!(table.cell(0, 3), "Mammogram");
    assert_eq!(table.cell(0, 5), "BlueCross");
}

#[test]
fn master_rows_win_over_staged_duplicates() {
    let master = csv(
        "master.csv",
        "First Name,Last Name,Member ID,Care Gap,DOB,Insurance,Doctor/Provider,Notes\n\
         John,Smith,123456,Diabetes,1960-01-02,KeepMe,Dr. Who,original note\n",
    );
    let source = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date\n\
         \"Smith, John\",123456789,HbA1c Overdue,1960-01-02\n",
    );
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    assert!(outcome.summary.master_reused);
    assert_eq!(outcome.summary.master_rows, 1);
    assert_eq!(outcome.summary.rows_added, 0);
    assert_eq!(outcome.summary.duplicates_dropped, 1);

    let table = output_table(&outcome.workbook);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.cell(0, 5), "KeepMe");
}

#[test]
fn duplicated_master_rows_do_not_hide_added_rows() {
    let master = csv(
        "master.csv",
        "First Name,Last Name,Member ID,Care Gap,DOB,Insurance,Doctor/Provider,Notes\n\
         John,Smith,123456,Diabetes,1960-01-02,Acme,N/A,N/A\n\
         John,Smith,123456,Diabetes,1960-01-02,Acme,N/A,N/A\n",
    );
    let source = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date\n\"Doe, Jane\",987654321,HbA1c Overdue,1971-03-04\n",
    );
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    assert_eq!(outcome.summary.master_rows, 2);
    assert_eq!(outcome.summary.rows_added, 1);
    assert_eq!(outcome.summary.duplicates_dropped, 0);
    assert_eq!(outcome.summary.final_rows, 2);
    assert_eq!(output_table(&outcome.workbook).rows.len(), 2);
}

#[test]
fn suffixed_full_names_dedupe_against_clean_roster_rows() {
    let master = csv(
        "master.csv",
        "First Name,Last Name,Member ID,Care Gap,DOB,Insurance,Doctor/Provider,Notes\n\
         John,Smith,123456,Diabetes,1960-01-02,Acme,N/A,N/A\n",
    );
    let source = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date\n\"Smith, John, Jr\",123456789,HbA1c Overdue,1960-01-02\n",
    );
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    assert_eq!(outcome.summary.rows_added, 0);
    assert_eq!(outcome.summary.duplicates_dropped, 1);

    let table = output_table(&outcome.workbook);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.cell(0, 0), "John");
}

#[test]
fn missing_config_skips_source_but_call_succeeds() {
    let master = csv("master.csv", "Nope\n");
    let good = csv(
        "acme.csv",
        "Patient,ID,Measure,Birth Date\n\"Smith, John\",123456,HbA1c Overdue,1960-01-02\n",
    );
    let orphan = csv("orphan.csv", "A,B\n1,2\n");
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(
        &master,
        &[(good, "ACME".to_string()), (orphan, "GHOST".to_string())],
        &store,
    )
    .expect("merge");
    assert_eq!(outcome.summary.rows_added, 1);
    assert_eq!(outcome.summary.sources.len(), 2);
    assert_eq!(
        outcome.summary.sources[1].status,
        caregap_engine::SourceStatus::ConfigMissing
    );
}

#[test]
fn source_without_required_columns_contributes_nothing() {
    let master = csv("master.csv", "Nope\n");
    // Config maps DOB to a column the sheet does not have.
    let source = csv("acme.csv", "Patient,ID,Measure\n\"Smith, John\",1,HbA1c Overdue\n");
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let outcome = merge_sheets(&master, &[(source, "ACME".to_string())], &store).expect("merge");
    assert_eq!(outcome.summary.rows_added, 0);
    assert_eq!(
        outcome.summary.sources[0].status,
        caregap_engine::SourceStatus::RequiredColumnsMissing
    );
    assert_eq!(output_table(&outcome.workbook).rows.len(), 0);
}

#[test]
fn missing_taxonomy_is_fatal() {
    let master = csv("master.csv", "Nope\n");
    let store = MemoryStore {
        mappings: HashMap::new(),
        taxonomy: None,
    };
    let err = merge_sheets(&master, &[], &store).unwrap_err();
    assert!(matches!(err, EngineError::TaxonomyMissing));
}

#[test]
fn unreadable_source_fails_the_whole_call() {
    let master = csv("master.csv", "Nope\n");
    let broken = UploadedFile::new("broken.xlsx", b"definitely not a workbook".to_vec());
    let store = MemoryStore::new().with_mapping("ACME", acme_config());

    let err = merge_sheets(&master, &[(broken, "ACME".to_string())], &store).unwrap_err();
    assert!(matches!(err, EngineError::Ingest(_)));
}
