//! A small curated catalog for trying the review flow on an empty database.

use super::SqliteStore;
use crate::error::Result;
use crate::models::Case;
use log::info;

struct SampleCase {
    title: &'static str,
    modality: &'static str,
    body_part: &'static str,
    diagnosis: &'static str,
    difficulty: u8,
    clinical_history: &'static str,
}

const SAMPLE_CASES: &[SampleCase] = &[
    SampleCase {
        title: "Saddle Pulmonary Embolism",
        modality: "CT",
        body_part: "Chest",
        diagnosis: "Saddle Pulmonary Embolism",
        difficulty: 2,
        clinical_history: "Sudden dyspnea and pleuritic chest pain after a long-haul flight.",
    },
    SampleCase {
        title: "Tension Pneumothorax",
        modality: "XR",
        body_part: "Chest",
        diagnosis: "Tension Pneumothorax",
        difficulty: 1,
        clinical_history: "Motorcycle accident, hypotensive, absent breath sounds on the right.",
    },
    SampleCase {
        title: "Aortic Dissection (Type A)",
        modality: "CT",
        body_part: "Chest",
        diagnosis: "Stanford Type A Aortic Dissection",
        difficulty: 2,
        clinical_history: "Tearing chest pain radiating to the back, unequal arm pressures.",
    },
    SampleCase {
        title: "Acute Epidural Hematoma",
        modality: "CT",
        body_part: "Head",
        diagnosis: "Acute Epidural Hematoma",
        difficulty: 1,
        clinical_history: "Head strike with brief loss of consciousness, then a lucid interval.",
    },
    SampleCase {
        title: "Vestibular Schwannoma",
        modality: "MRI",
        body_part: "Head",
        diagnosis: "Vestibular Schwannoma (Acoustic Neuroma)",
        difficulty: 3,
        clinical_history: "Progressive unilateral hearing loss and tinnitus.",
    },
    SampleCase {
        title: "Small Bowel Obstruction",
        modality: "CT",
        body_part: "Abdomen",
        diagnosis: "Adhesive Small Bowel Obstruction with Transition Point",
        difficulty: 2,
        clinical_history: "Prior laparotomy, now vomiting and abdominal distension.",
    },
    SampleCase {
        title: "Osteosarcoma of Distal Femur",
        modality: "XR",
        body_part: "MSK",
        diagnosis: "Conventional Osteosarcoma",
        difficulty: 3,
        clinical_history: "Teenager with knee pain worse at night and a palpable mass.",
    },
];

/// Inserts the sample catalog and returns how many cases were added.
pub fn seed_sample_cases(store: &SqliteStore) -> Result<usize> {
    for sample in SAMPLE_CASES {
        let mut case = Case::new(sample.title);
        case.modality = Some(sample.modality.to_string());
        case.body_part = Some(sample.body_part.to_string());
        case.diagnosis = Some(sample.diagnosis.to_string());
        case.difficulty = sample.difficulty;
        case.clinical_history = Some(sample.clinical_history.to_string());
        store.insert_case(&case)?;
    }
    info!("Seeded {} sample cases", SAMPLE_CASES.len());
    Ok(SAMPLE_CASES.len())
}
