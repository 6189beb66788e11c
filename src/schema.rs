/// Column-name constants for the petpoint-core schema.
/// Single source of truth - exported to Python via PyO3.

// ── Canonical animal columns ────────────────────────────────────────────────
pub mod animal {
    pub const ANIMAL_ID: &str = "animal_id";
    pub const NAME: &str = "name";
    pub const SPECIES: &str = "species";
    pub const BREED: &str = "breed";
    pub const SEX: &str = "sex";
    pub const AGE: &str = "age";
    pub const STAGE: &str = "stage";
    pub const LOCATION: &str = "location";
    pub const SUB_LOCATION: &str = "sub_location";
    pub const INTAKE_DATETIME: &str = "intake_datetime";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const SPAYED_NEUTERED: &str = "spayed_neutered";
}

// ── Foster assignment columns ───────────────────────────────────────────────
pub mod foster {
    pub const CAREGIVER_ID: &str = "caregiver_id";
    pub const CAREGIVER_NAME: &str = "caregiver_name";
    pub const FOSTER_START_DATE: &str = "foster_start_date";
}

// ── Hold-stage date columns ─────────────────────────────────────────────────
pub mod hold {
    pub const HOLD_STAGE: &str = "hold_stage";
    pub const HOLD_START_DATE: &str = "hold_start_date";
}

// ── Intake / outcome event columns ──────────────────────────────────────────
pub mod event {
    pub const OUTCOME_TYPE: &str = "outcome_type";
    pub const OUTCOME_SUBTYPE: &str = "outcome_subtype";
    pub const OUTCOME_DATETIME: &str = "outcome_datetime";
    pub const INTAKE_TYPE: &str = "intake_type";
    pub const INTAKE_SUBTYPE: &str = "intake_subtype";
    pub const INTAKE_DATETIME: &str = "intake_datetime";
}

// ── Pathways for Care columns ───────────────────────────────────────────────
pub mod pathways {
    pub const WELFARE_NOTES: &str = "welfare_notes";
    pub const FOSTER_ATTEMPTED: &str = "foster_attempted";
}

// ── Derived dashboard columns ───────────────────────────────────────────────
pub mod dashboard {
    pub const CATEGORY: &str = "category";
    pub const LOS_DAYS: &str = "los_days";
    pub const COUNT: &str = "count";
}

// ── Join defaults ───────────────────────────────────────────────────────────
// Missing matches fill these instead of nulls so display code stays simple.
pub mod defaults {
    pub const NOT_IN_FOSTER: &str = "Not in Foster";
    pub const UNKNOWN: &str = "Unknown";
}

// ── Raw export headers ──────────────────────────────────────────────────────
// Header names exactly as PetPoint emits them, renamed at load time.
pub mod export {
    pub mod inventory {
        pub const ANIMAL_NUMBER: &str = "AnimalNumber";
        pub const ANIMAL_NAME: &str = "AnimalName";
        pub const SPECIES: &str = "Species";
        pub const PRIMARY_BREED: &str = "PrimaryBreed";
        pub const SEX: &str = "Sex";
        pub const AGE: &str = "Age";
        pub const STAGE: &str = "Stage";
        pub const LOCATION: &str = "Location";
        pub const SUB_LOCATION: &str = "SubLocation";
        pub const INTAKE_DATETIME: &str = "IntakeDateTime";
        pub const DATE_OF_BIRTH: &str = "DateOfBirth";
        pub const SPAYED_NEUTERED: &str = "SpayedNeutered";
    }

    // FosterCurrent is a report-builder export; its key columns carry
    // machine-generated "textboxN" headers.
    pub mod foster {
        pub const ANIMAL_ID: &str = "textbox9";
        pub const CAREGIVER_ID: &str = "textbox10";
        pub const CAREGIVER_NAME: &str = "textbox11";
        pub const START_STATUS_DATE: &str = "StartStatusDate";
        pub const STAGE: &str = "Stage";
    }

    pub mod outcome {
        pub const ANIMAL_NUMBER: &str = "AnimalNumber";
        pub const OUTCOME_TYPE: &str = "OutcomeType";
        pub const OUTCOME_SUBTYPE: &str = "OutcomeSubtype";
        pub const OUTCOME_DATETIME: &str = "OutcomeDateTime";
    }

    pub mod intake {
        pub const ANIMAL_NUMBER: &str = "AnimalNumber";
        pub const INTAKE_TYPE: &str = "IntakeType";
        pub const INTAKE_SUBTYPE: &str = "IntakeSubtype";
        pub const INTAKE_DATETIME: &str = "IntakeDateTime";
    }

    pub mod pathways {
        pub const AID: &str = "AID";
        pub const WELFARE_NOTES: &str = "Welfare Notes";
        pub const FOSTER_ATTEMPTED: &str = "Foster Attempted";
    }
}
