//! Common fixtures for the peptiform index integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use proteomes_index::{FacetService, IndexService, PeptiForm, SearchService, TantivyIndex};

pub const PEPTIDE_1_FORM_1_ID: &str = "[HDCVMPDR|9606|]";
pub const PEPTIDE_1_FORM_2_ID: &str = "[HDCVMPDR|9606|(5,15)]";
pub const PEPTIDE_1_SEQUENCE: &str = "HDCVMPDR";

pub const PEPTIDE_2_FORM_1_ID: &str = "[AAITSYEK|9606|]";
pub const PEPTIDE_2_FORM_2_ID: &str = "[AAITSYEK|9606|(6,4)]";
pub const PEPTIDE_2_SEQUENCE: &str = "AAITSYEK";

pub const PEPTIDE_3_FORM_1_ID: &str = "[ELGAVEK|9606|]";
pub const PEPTIDE_3_SEQUENCE: &str = "ELGAVEK";
pub const PEPTIDE_3_PROTEINS: [&str; 3] = ["P12345", "P12346", "P12347"];

pub const PEPTIDE_4_FORM_1_ID: &str = "[EDAANNYAR|9606|]";
pub const PEPTIDE_4_FORM_2_ID: &str = "[EDAANNYAR|9606|(1,20)(2,20)(9,20)]";
pub const PEPTIDE_4_FORM_3_ID: &str = "[EDAANNYAR|10090|]";
pub const PEPTIDE_4_SEQUENCE: &str = "EDAANNYAR";

pub const PEPTIDE_5_FORM_1_ID: &str = "[EDSQLASMQHK|10090|(8,15)]";
pub const PEPTIDE_5_SEQUENCE: &str = "EDSQLASMQHK";
pub const PEPTIDE_5_PROTEINS: [&str; 2] = ["P12345", "P12344"];

pub const PEPTIDE_6_FORM_1_ID: &str = "[TESTTEST|121225|(8,15)]";
pub const PEPTIDE_6_SEQUENCE: &str = "TESTTEST";
pub const PEPTIDE_6_PROTEINS: [&str; 1] = ["P98765"];

pub const TAXID_HUMAN: u32 = 9606;
pub const SPECIES_HUMAN: &str = "Homo sapiens (human)";
pub const TAXID_MOUSE: u32 = 10090;
pub const SPECIES_MOUSE: &str = "Mus musculus (mouse)";
pub const TAXID_HBV: u32 = 121225;
pub const SPECIES_HBV: &str = "Pediculus humanus (human louse)";

pub const HUMAN_RECORDS: u64 = 7;
pub const MOUSE_RECORDS: u64 = 2;
pub const HBV_RECORDS: u64 = 1;
pub const COUNT_TOTAL_DOCS: u64 = HUMAN_RECORDS + MOUSE_RECORDS + HBV_RECORDS;

pub const OXIDATION: &str = "Oxidation";
pub const PHOSPHO: &str = "Phospho";
pub const CARBAMIDOMETHYL: &str = "Carbamidomethyl";

fn form(id: &str, sequence: &str, taxid: u32, species: &str, proteins: &[&str]) -> PeptiForm {
    PeptiForm::builder()
        .id(id)
        .sequence(sequence)
        .taxid(taxid)
        .species(species)
        .proteins(proteins.iter().copied())
        .build()
}

/// The ten fixture peptiforms: seven human, two mouse, one louse.
pub fn test_peptiforms() -> Vec<PeptiForm> {
    let mut p1f2 = form(PEPTIDE_1_FORM_2_ID, PEPTIDE_1_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]);
    p1f2.mods = vec![OXIDATION.to_string()];
    let mut p2f2 = form(PEPTIDE_2_FORM_2_ID, PEPTIDE_2_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]);
    p2f2.mods = vec![CARBAMIDOMETHYL.to_string()];
    let mut p4f2 = form(PEPTIDE_4_FORM_2_ID, PEPTIDE_4_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]);
    p4f2.mods = vec![PHOSPHO.to_string()];

    let p3 = PeptiForm::builder()
        .id(PEPTIDE_3_FORM_1_ID)
        .sequence(PEPTIDE_3_SEQUENCE)
        .taxid(TAXID_HUMAN)
        .species(SPECIES_HUMAN)
        .proteins(PEPTIDE_3_PROTEINS)
        .up_groups(["UPG1"])
        .gene_groups(["GENE1", "GENE2"])
        .group_descriptions("Serum albumin family")
        .build();
    let p5 = PeptiForm::builder()
        .id(PEPTIDE_5_FORM_1_ID)
        .sequence(PEPTIDE_5_SEQUENCE)
        .taxid(TAXID_MOUSE)
        .species(SPECIES_MOUSE)
        .proteins(PEPTIDE_5_PROTEINS)
        .modification(OXIDATION)
        .up_groups(["UPG1"])
        .gene_groups(["GENE1"])
        .build();
    let p6 = PeptiForm::builder()
        .id(PEPTIDE_6_FORM_1_ID)
        .sequence(PEPTIDE_6_SEQUENCE)
        .taxid(TAXID_HBV)
        .species(SPECIES_HBV)
        .proteins(PEPTIDE_6_PROTEINS)
        .modification(OXIDATION)
        .up_groups(["UPG2"])
        .gene_groups(["GENE3"])
        .build();

    vec![
        form(PEPTIDE_1_FORM_1_ID, PEPTIDE_1_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]),
        p1f2,
        form(PEPTIDE_2_FORM_1_ID, PEPTIDE_2_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]),
        p2f2,
        p3,
        form(PEPTIDE_4_FORM_1_ID, PEPTIDE_4_SEQUENCE, TAXID_HUMAN, SPECIES_HUMAN, &[]),
        p4f2,
        form(PEPTIDE_4_FORM_3_ID, PEPTIDE_4_SEQUENCE, TAXID_MOUSE, SPECIES_MOUSE, &[]),
        p5,
        p6,
    ]
}

/// Services wired to one in-memory index.
pub struct TestHarness {
    pub index: Arc<TantivyIndex>,
    pub search: SearchService,
    pub facets: FacetService,
    pub writer: IndexService,
}

impl TestHarness {
    /// A harness over an empty index.
    pub fn empty() -> Self {
        let index = Arc::new(TantivyIndex::in_memory().expect("in-memory index"));
        Self {
            search: SearchService::new(index.clone()),
            facets: FacetService::new(index.clone()),
            writer: IndexService::new(index.clone()),
            index,
        }
    }

    /// A harness loaded with [`test_peptiforms`].
    pub async fn new() -> Self {
        Self::with_forms(&test_peptiforms()).await
    }

    /// A harness loaded with the given forms.
    pub async fn with_forms(forms: &[PeptiForm]) -> Self {
        let harness = Self::empty();
        harness
            .writer
            .save_all(forms)
            .await
            .expect("fixture documents are valid");
        harness
    }
}
