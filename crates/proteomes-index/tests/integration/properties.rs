//! Property tests over the search and facet services.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use proptest::prelude::*;
use proteomes_core::PageRequest;
use proteomes_index::{FacetSort, PeptiForm};

use crate::common::*;

fn fixture() -> &'static TestHarness {
    static HARNESS: OnceLock<TestHarness> = OnceLock::new();
    HARNESS.get_or_init(|| tokio_test::block_on(TestHarness::new()))
}

const SEQUENCES: [&str; 6] = [
    PEPTIDE_1_SEQUENCE,
    PEPTIDE_2_SEQUENCE,
    PEPTIDE_3_SEQUENCE,
    PEPTIDE_4_SEQUENCE,
    PEPTIDE_5_SEQUENCE,
    PEPTIDE_6_SEQUENCE,
];

const TERMS: [&str; 8] = [
    "P12345", "human", "mouse", "oxidation", "edaannyar", "9606", "*ouse", "nothing",
];

fn mixed_case(sequence: &str, mask: &[bool]) -> String {
    sequence
        .chars()
        .zip(mask.iter().cycle())
        .map(|(c, lower)| if *lower { c.to_ascii_lowercase() } else { c })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sequence_lookup_ignores_case(
        index in 0..SEQUENCES.len(),
        mask in prop::collection::vec(any::<bool>(), 1..12),
    ) {
        let search = &fixture().search;
        let sequence = SEQUENCES[index];
        let variant = mixed_case(sequence, &mask);

        let page = PageRequest::default();

        let expected = tokio_test::block_on(search.find_by_sequence(sequence, page)).unwrap();
        let actual = tokio_test::block_on(search.find_by_sequence(&variant, page)).unwrap();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_count_matches_find_total(term in prop::sample::select(TERMS.to_vec())) {
        let search = &fixture().search;
        let single = PageRequest::single();

        let found = tokio_test::block_on(search.find_by_query(Some(term), single)).unwrap();
        let counted = tokio_test::block_on(search.count_by_query(Some(term))).unwrap();
        prop_assert_eq!(counted, found.total_elements());

        let found = tokio_test::block_on(search.find_by_query_not(Some(term), single)).unwrap();
        let counted = tokio_test::block_on(search.count_by_query_not(Some(term))).unwrap();
        prop_assert_eq!(counted, found.total_elements());

        let found = tokio_test::block_on(search.find_by_species(term, single)).unwrap();
        let counted = tokio_test::block_on(search.count_by_species(term)).unwrap();
        prop_assert_eq!(counted, found.total_elements());

        let taxids = [TAXID_MOUSE];
        let found = tokio_test::block_on(
            search.find_by_query_and_filter_taxid(Some(term), &taxids, single),
        )
        .unwrap();
        let counted = tokio_test::block_on(
            search.count_by_query_and_filter_taxid(Some(term), &taxids),
        )
        .unwrap();
        prop_assert_eq!(counted, found.total_elements());
    }

    #[test]
    fn prop_query_and_not_partition_index(term in prop::sample::select(TERMS.to_vec())) {
        let search = &fixture().search;
        let matched = tokio_test::block_on(search.count_by_query(Some(term))).unwrap();
        let unmatched = tokio_test::block_on(search.count_by_query_not(Some(term))).unwrap();
        prop_assert_eq!(matched + unmatched, COUNT_TOTAL_DOCS);
    }

    #[test]
    fn prop_blank_query_equals_find_all(page in 0usize..5, size in 1usize..6) {
        let search = &fixture().search;
        let request = PageRequest::new(page, size).unwrap();

        let all = tokio_test::block_on(search.find_all(request)).unwrap();
        for term in [None, Some(""), Some("*")] {
            let result = tokio_test::block_on(search.find_by_query(term, request)).unwrap();
            prop_assert_eq!(&result, &all);
        }
    }

    #[test]
    fn prop_empty_taxid_filter_is_noop(
        term in prop::sample::select(TERMS.to_vec()),
        page in 0usize..3,
        size in 1usize..5,
    ) {
        let search = &fixture().search;
        let request = PageRequest::new(page, size).unwrap();

        let filtered =
            tokio_test::block_on(search.find_by_query_and_filter_taxid(Some(term), &[], request))
                .unwrap();
        let general = tokio_test::block_on(search.find_by_query(Some(term), request)).unwrap();
        prop_assert_eq!(filtered, general);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_facet_total_is_distinct_value_count(
        assignments in prop::collection::vec(
            prop::collection::btree_set(0usize..8, 0..4),
            1..8,
        ),
    ) {
        let forms: Vec<PeptiForm> = assignments
            .iter()
            .enumerate()
            .map(|(i, proteins)| {
                PeptiForm::builder()
                    .sequence(format!("PEPTIDE{}", (b'A' + i as u8) as char))
                    .taxid(TAXID_HUMAN)
                    .proteins(proteins.iter().map(|p| format!("P{p:05}")))
                    .build()
            })
            .collect();

        let mut expected: BTreeMap<String, u64> = BTreeMap::new();
        for form in &forms {
            for protein in &form.proteins {
                *expected.entry(protein.clone()).or_default() += 1;
            }
        }
        let distinct: BTreeSet<&String> = expected.keys().collect();

        let harness = tokio_test::block_on(TestHarness::with_forms(&forms));
        let counts = tokio_test::block_on(
            harness.facets.protein_counts(PageRequest::new(0, 3).unwrap(), FacetSort::Index),
        )
        .unwrap();

        prop_assert_eq!(counts.total_elements(), distinct.len() as u64);
        prop_assert!(counts.number_of_elements() <= 3);
        for entry in counts.iter() {
            prop_assert_eq!(Some(&entry.count), expected.get(&entry.value));
        }
    }
}
