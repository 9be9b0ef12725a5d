//! Special-case rule kinds and the diagnosis codes they emit.
//!
//! A small set of question keys expands into multiple diagnosis entries or
//! selects between codes based on a sub-answer. Keeping these as a closed
//! enum gives the resolver one source of truth instead of ad hoc string
//! comparisons scattered across encoders.

/// Well-known question keys with special resolution behaviour.
pub const QK_DIABETES: &str = "diabetes";
/// Sub-answer carrying the diabetes type for [`QK_DIABETES`].
pub const QK_DIABETES_TYPE: &str = "diabetes_type";
/// Macular degeneration question key.
pub const QK_MACULAR_DEGENERATION: &str = "macular_degeneration";
/// Sub-answer carrying the wet/dry form for [`QK_MACULAR_DEGENERATION`].
pub const QK_MACULAR_DEGENERATION_TYPE: &str = "macular_degeneration_type";

/// Systemic code for type 1 diabetes with ocular involvement.
pub const CODE_DIABETES_TYPE_1: &str = "E10.30";
/// Systemic code for type 2 diabetes with ocular involvement.
pub const CODE_DIABETES_TYPE_2: &str = "E11.30";
/// Generic code when the diabetes type is absent or unrecognised.
pub const CODE_DIABETES_GENERIC: &str = "E14.90";
/// Retinal complication code shared by both diabetes types, emitted once per
/// eye.
pub const CODE_DIABETIC_RETINOPATHY: &str = "H36.0";
/// Wet (exudative) macular degeneration.
pub const CODE_AMD_WET: &str = "H35.31";
/// Dry macular degeneration.
pub const CODE_AMD_DRY: &str = "H35.30";

pub const DESC_DIABETES_TYPE_1: &str = "Diabetes mellitus, Typ 1";
pub const DESC_DIABETES_TYPE_2: &str = "Diabetes mellitus, Typ 2";
pub const DESC_DIABETES_GENERIC: &str = "Diabetes mellitus, nicht näher bezeichnet";
pub const DESC_DIABETIC_RETINOPATHY: &str = "Diabetische Retinopathie";
pub const DESC_AMD_WET: &str = "Feuchte Makuladegeneration";
pub const DESC_AMD_DRY: &str = "Trockene Makuladegeneration";

/// Closed set of special rule kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialRule {
    /// Type-specific systemic code plus a right/left retinopathy pair.
    Diabetes,
    /// Wet/dry sub-answer selects the code.
    MacularDegeneration,
}

impl SpecialRule {
    /// The special kind triggered by a question key, if any.
    pub fn for_question(question_key: &str) -> Option<Self> {
        match question_key {
            QK_DIABETES => Some(SpecialRule::Diabetes),
            QK_MACULAR_DEGENERATION => Some(SpecialRule::MacularDegeneration),
            _ => None,
        }
    }
}

/// Recognised diabetes type sub-answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiabetesType {
    Type1,
    Type2,
}

impl DiabetesType {
    /// Tolerant mapping of the type sub-answer token; `None` for anything
    /// not recognised as type 1 or 2.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "1" | "type_1" | "type1" | "typ_1" | "typ1" => Some(DiabetesType::Type1),
            "2" | "type_2" | "type2" | "typ_2" | "typ2" => Some(DiabetesType::Type2),
            _ => None,
        }
    }

    pub fn systemic_code(&self) -> &'static str {
        match self {
            DiabetesType::Type1 => CODE_DIABETES_TYPE_1,
            DiabetesType::Type2 => CODE_DIABETES_TYPE_2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiabetesType::Type1 => DESC_DIABETES_TYPE_1,
            DiabetesType::Type2 => DESC_DIABETES_TYPE_2,
        }
    }
}

/// Recognised macular degeneration forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmdForm {
    Wet,
    Dry,
}

impl AmdForm {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "wet" | "feucht" | "exudative" => Some(AmdForm::Wet),
            "dry" | "trocken" => Some(AmdForm::Dry),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AmdForm::Wet => CODE_AMD_WET,
            AmdForm::Dry => CODE_AMD_DRY,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AmdForm::Wet => DESC_AMD_WET,
            AmdForm::Dry => DESC_AMD_DRY,
        }
    }
}
