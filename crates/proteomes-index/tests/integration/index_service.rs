//! Integration tests for `IndexService` writes as seen through search.

use proteomes_core::{ModificationSite, PageRequest};
use proteomes_index::{create_search_index, Error, IndexConfig, PeptiForm, SearchService};

use crate::common::*;

#[tokio::test]
async fn test_save_then_find() {
    let harness = TestHarness::empty();
    let form = PeptiForm::builder()
        .sequence("hdcvmpdr")
        .taxid(TAXID_HUMAN)
        .species(SPECIES_HUMAN)
        .site(ModificationSite::new(5, 15))
        .build();

    harness.writer.save(&form).await.unwrap();

    let found = harness.search.find_by_id(PEPTIDE_1_FORM_2_ID).await.unwrap();
    assert_eq!(found, Some(form));
}

#[tokio::test]
async fn test_save_replaces_existing_id() {
    let harness = TestHarness::new().await;

    let mut updated = harness
        .search
        .find_by_id(PEPTIDE_2_FORM_1_ID)
        .await
        .unwrap()
        .unwrap();
    updated.proteins = vec!["Q11111".to_string()];
    updated.num_proteins = 1;
    harness.writer.save(&updated).await.unwrap();

    assert_eq!(harness.search.count_all().await.unwrap(), COUNT_TOTAL_DOCS);
    assert_eq!(harness.search.count_by_protein("Q11111").await.unwrap(), 1);
    let found = harness.search.find_by_id(PEPTIDE_2_FORM_1_ID).await.unwrap();
    assert_eq!(found.unwrap().num_proteins, 1);
}

#[tokio::test]
async fn test_save_rejects_inconsistent_counts() {
    let harness = TestHarness::empty();
    let mut form = PeptiForm::builder()
        .sequence(PEPTIDE_3_SEQUENCE)
        .taxid(TAXID_HUMAN)
        .proteins(PEPTIDE_3_PROTEINS)
        .build();
    form.num_up_groups = 2;

    let err = harness.writer.save(&form).await.unwrap_err();
    assert!(err.to_string().contains("num_up_groups"));
    assert_eq!(harness.search.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_save_rejects_id_of_another_peptiform() {
    let harness = TestHarness::empty();
    let form = PeptiForm::builder()
        .id(PEPTIDE_1_FORM_1_ID)
        .sequence(PEPTIDE_3_SEQUENCE)
        .taxid(TAXID_MOUSE)
        .build();

    let err = harness.writer.save(&form).await.unwrap_err();
    assert!(matches!(err, Error::InconsistentDocument { .. }));
    assert_eq!(harness.search.find_by_id(PEPTIDE_1_FORM_1_ID).await.unwrap(), None);
    assert_eq!(harness.search.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_save_all_rejects_non_canonical_id() {
    let harness = TestHarness::empty();
    let valid = PeptiForm::builder()
        .sequence(PEPTIDE_2_SEQUENCE)
        .taxid(TAXID_HUMAN)
        .build();
    let unsorted = PeptiForm::builder()
        .id("[EDAANNYAR|9606|(9,20)(1,20)(2,20)]")
        .sequence(PEPTIDE_4_SEQUENCE)
        .taxid(TAXID_HUMAN)
        .build();

    let err = harness.writer.save_all(&[valid, unsorted]).await.unwrap_err();
    assert!(err.to_string().contains(PEPTIDE_4_FORM_2_ID));
    assert_eq!(harness.search.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_and_delete_all() {
    let harness = TestHarness::new().await;

    harness.writer.delete(PEPTIDE_6_FORM_1_ID).await.unwrap();
    assert_eq!(harness.search.count_all().await.unwrap(), COUNT_TOTAL_DOCS - 1);
    assert_eq!(harness.search.count_by_taxid(TAXID_HBV).await.unwrap(), 0);

    // Deleting again is a no-op
    harness.writer.delete(PEPTIDE_6_FORM_1_ID).await.unwrap();
    assert_eq!(harness.index.num_docs(), COUNT_TOTAL_DOCS - 1);

    harness.writer.delete_all().await.unwrap();
    assert_eq!(harness.search.count_all().await.unwrap(), 0);
    let page = harness.search.find_all(PageRequest::default()).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_on_disk_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = IndexConfig {
        index_path: Some(dir.path().join("peptiforms").display().to_string()),
        ..Default::default()
    };

    {
        let index = create_search_index(&config).await.unwrap();
        index.insert_batch(&test_peptiforms()).await.unwrap();
    }

    let index = create_search_index(&config).await.unwrap();
    let search = SearchService::new(index);
    assert_eq!(search.count_all().await.unwrap(), COUNT_TOTAL_DOCS);
    assert_eq!(search.count_by_protein("P12345").await.unwrap(), 2);
}

#[tokio::test]
async fn test_config_rejects_unknown_backend() {
    let config = IndexConfig::from_toml_str(r#"backend = "elasticsearch""#).unwrap();
    let err = create_search_index(&config).await.err().unwrap();
    assert!(err.to_string().contains("elasticsearch"));
}
