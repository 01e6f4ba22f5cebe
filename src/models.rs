use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============ Enumerated Inputs ============

/// Declares a closed set of form labels.
///
/// Each variant (de)serializes as its human-readable label, so anything
/// outside the list is rejected before it reaches feature assembly.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in the order the form offers them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown to (and submitted by) the form.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Parses a form label; exact match only.
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    /// How the customer was contacted.
    pub enum ContactType {
        SelfEnquiry => "Self Enquiry",
        CompanyInvited => "Company Invited",
    }
}

labelled_enum! {
    pub enum Occupation {
        Salaried => "Salaried",
        FreeLancer => "Free Lancer",
        SmallBusiness => "Small Business",
        LargeBusiness => "Large Business",
    }
}

labelled_enum! {
    pub enum Gender {
        Female => "Female",
        Male => "Male",
    }
}

labelled_enum! {
    pub enum MaritalStatus {
        Single => "Single",
        Divorced => "Divorced",
        Married => "Married",
        Unmarried => "Unmarried",
    }
}

labelled_enum! {
    /// Job level of the customer.
    pub enum Designation {
        Manager => "Manager",
        Executive => "Executive",
        SeniorManager => "Senior Manager",
        Avp => "AVP",
        Vp => "VP",
    }
}

labelled_enum! {
    /// Package the salesperson pitched.
    pub enum ProductPitched {
        Deluxe => "Deluxe",
        Basic => "Basic",
        Standard => "Standard",
        SuperDeluxe => "Super Deluxe",
        King => "King",
    }
}

labelled_enum! {
    /// City development tier; encoded as 1, 2 or 3 for the classifier.
    pub enum CityTier {
        Tier1 => "Tier 1",
        Tier2 => "Tier 2",
        Tier3 => "Tier 3",
    }
}

labelled_enum! {
    /// Yes/No radio selection.
    pub enum YesNo {
        Yes => "Yes",
        No => "No",
    }
}

// ============ Request Models ============

/// Raw values collected by the prediction form.
///
/// Enumerated fields are closed types; numeric fields are range-checked by
/// [`CustomerInput::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    // Personal Information
    pub age: u32,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub occupation: Occupation,
    pub designation: Designation,
    pub city_tier: CityTier,
    // Lifestyle & Financial
    pub monthly_income: u32,
    pub own_car: YesNo,
    pub passport: YesNo,
    // Travel Preferences
    pub product_pitched: ProductPitched,
    pub preferred_property_star: u32,
    // Family & Trips
    pub num_person_visiting: u32,
    pub num_children_visiting: u32,
    pub num_trips: u32,
    // Sales Interaction
    pub type_of_contact: ContactType,
    pub duration_of_pitch: u32,
    pub num_followups: u32,
    pub pitch_satisfaction_score: u32,
}

impl Default for CustomerInput {
    fn default() -> Self {
        Self {
            age: 30,
            gender: Gender::Female,
            marital_status: MaritalStatus::Single,
            occupation: Occupation::Salaried,
            designation: Designation::Manager,
            city_tier: CityTier::Tier1,
            monthly_income: 10_000,
            own_car: YesNo::Yes,
            passport: YesNo::Yes,
            product_pitched: ProductPitched::Deluxe,
            preferred_property_star: 3,
            num_person_visiting: 1,
            num_children_visiting: 0,
            num_trips: 3,
            type_of_contact: ContactType::SelfEnquiry,
            duration_of_pitch: 30,
            num_followups: 1,
            pitch_satisfaction_score: 3,
        }
    }
}

/// Inclusive bounds of a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBounds {
    pub field: &'static str,
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
}

impl FieldBounds {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const AGE: FieldBounds = FieldBounds {
    field: "age",
    label: "Age of Customer",
    min: 18,
    max: 100,
};
pub const MONTHLY_INCOME: FieldBounds = FieldBounds {
    field: "monthly_income",
    label: "Monthly Income",
    min: 100,
    max: 200_000,
};
pub const PROPERTY_STAR: FieldBounds = FieldBounds {
    field: "preferred_property_star",
    label: "Preferred Property Star",
    min: 3,
    max: 5,
};
pub const PERSONS_VISITING: FieldBounds = FieldBounds {
    field: "num_person_visiting",
    label: "Number of Persons Visiting",
    min: 1,
    max: 5,
};
pub const CHILDREN_VISITING: FieldBounds = FieldBounds {
    field: "num_children_visiting",
    label: "Number of Children Visiting",
    min: 0,
    max: 3,
};
pub const TRIPS: FieldBounds = FieldBounds {
    field: "num_trips",
    label: "Number of Trips",
    min: 1,
    max: 22,
};
pub const PITCH_DURATION: FieldBounds = FieldBounds {
    field: "duration_of_pitch",
    label: "Pitch Duration (minutes)",
    min: 0,
    max: 150,
};
pub const FOLLOWUPS: FieldBounds = FieldBounds {
    field: "num_followups",
    label: "Number of Followups",
    min: 1,
    max: 6,
};
pub const SATISFACTION_SCORE: FieldBounds = FieldBounds {
    field: "pitch_satisfaction_score",
    label: "Pitch Satisfaction Score",
    min: 1,
    max: 5,
};

impl CustomerInput {
    /// Pairs every numeric field with its bounds.
    pub fn numeric_fields(&self) -> [(FieldBounds, u32); 9] {
        [
            (AGE, self.age),
            (MONTHLY_INCOME, self.monthly_income),
            (PROPERTY_STAR, self.preferred_property_star),
            (PERSONS_VISITING, self.num_person_visiting),
            (CHILDREN_VISITING, self.num_children_visiting),
            (TRIPS, self.num_trips),
            (PITCH_DURATION, self.duration_of_pitch),
            (FOLLOWUPS, self.num_followups),
            (SATISFACTION_SCORE, self.pitch_satisfaction_score),
        ]
    }

    /// Checks every numeric field against its declared domain.
    ///
    /// # Returns
    ///
    /// * `Err(Vec<String>)` - One message per out-of-range field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let violations: Vec<String> = self
            .numeric_fields()
            .iter()
            .filter(|(bounds, value)| !bounds.contains(*value))
            .map(|(bounds, value)| {
                format!(
                    "{} must be between {} and {} (got {})",
                    bounds.label, bounds.min, bounds.max, value
                )
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

// ============ Feature Record ============

/// Column names in the exact order the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 18] = [
    "TypeofContact",
    "CityTier",
    "Occupation",
    "Gender",
    "ProductPitched",
    "PreferredPropertyStar",
    "MaritalStatus",
    "Designation",
    "NumberOfPersonVisiting",
    "NumberOfFollowups",
    "NumberOfTrips",
    "PitchSatisfactionScore",
    "NumberOfChildrenVisiting",
    "MonthlyIncome",
    "DurationOfPitch",
    "Age",
    "Passport",
    "OwnCar",
];

/// A single cell of the feature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(i64),
    Text(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Number(_) => None,
            FeatureValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

/// The single-row table submitted to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "TypeofContact")]
    pub type_of_contact: String,
    #[serde(rename = "CityTier")]
    pub city_tier: i64,
    #[serde(rename = "Occupation")]
    pub occupation: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "ProductPitched")]
    pub product_pitched: String,
    #[serde(rename = "PreferredPropertyStar")]
    pub preferred_property_star: i64,
    #[serde(rename = "MaritalStatus")]
    pub marital_status: String,
    #[serde(rename = "Designation")]
    pub designation: String,
    #[serde(rename = "NumberOfPersonVisiting")]
    pub number_of_person_visiting: i64,
    #[serde(rename = "NumberOfFollowups")]
    pub number_of_followups: i64,
    #[serde(rename = "NumberOfTrips")]
    pub number_of_trips: i64,
    #[serde(rename = "PitchSatisfactionScore")]
    pub pitch_satisfaction_score: i64,
    #[serde(rename = "NumberOfChildrenVisiting")]
    pub number_of_children_visiting: i64,
    #[serde(rename = "MonthlyIncome")]
    pub monthly_income: i64,
    #[serde(rename = "DurationOfPitch")]
    pub duration_of_pitch: i64,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Passport")]
    pub passport: i64,
    #[serde(rename = "OwnCar")]
    pub own_car: i64,
}

impl FeatureRecord {
    /// Looks up a cell by its classifier column name.
    pub fn value(&self, column: &str) -> Option<FeatureValue> {
        let text = |s: &String| Some(FeatureValue::Text(s.clone()));
        let number = |n: i64| Some(FeatureValue::Number(n));

        match column {
            "TypeofContact" => text(&self.type_of_contact),
            "CityTier" => number(self.city_tier),
            "Occupation" => text(&self.occupation),
            "Gender" => text(&self.gender),
            "ProductPitched" => text(&self.product_pitched),
            "PreferredPropertyStar" => number(self.preferred_property_star),
            "MaritalStatus" => text(&self.marital_status),
            "Designation" => text(&self.designation),
            "NumberOfPersonVisiting" => number(self.number_of_person_visiting),
            "NumberOfFollowups" => number(self.number_of_followups),
            "NumberOfTrips" => number(self.number_of_trips),
            "PitchSatisfactionScore" => number(self.pitch_satisfaction_score),
            "NumberOfChildrenVisiting" => number(self.number_of_children_visiting),
            "MonthlyIncome" => number(self.monthly_income),
            "DurationOfPitch" => number(self.duration_of_pitch),
            "Age" => number(self.age),
            "Passport" => number(self.passport),
            "OwnCar" => number(self.own_car),
            _ => None,
        }
    }

    /// All cells in column order, for the operator review table.
    pub fn entries(&self) -> Vec<(&'static str, FeatureValue)> {
        FEATURE_COLUMNS
            .iter()
            .filter_map(|column| self.value(column).map(|v| (*column, v)))
            .collect()
    }
}

// ============ Prediction Models ============

/// Thresholded class of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The customer is expected to buy the package (label 1).
    PackageOpted,
    PackageNotOpted,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::PackageOpted => "Package Opted",
            Outcome::PackageNotOpted => "Package Not Opted",
        }
    }

    /// Class index as used in the training data (`ProdTaken`).
    pub fn class(self) -> u8 {
        match self {
            Outcome::PackageOpted => 1,
            Outcome::PackageNotOpted => 0,
        }
    }
}

/// Scored prediction for one feature record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub outcome: Outcome,
    pub probability: f64,
    /// Probability as a percentage with two decimals, e.g. "50.00".
    pub confidence: String,
    pub threshold: f64,
}

/// Body returned by `POST /api/v1/predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub result: String,
    pub prediction: u8,
    pub probability: f64,
    pub confidence: String,
    pub threshold: f64,
    pub record: FeatureRecord,
    pub scored_at: DateTime<Utc>,
}

impl PredictionResponse {
    pub fn new(prediction: Prediction, record: FeatureRecord) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            result: prediction.outcome.label().to_string(),
            prediction: prediction.outcome.class(),
            probability: prediction.probability,
            confidence: prediction.confidence,
            threshold: prediction.threshold,
            record,
            scored_at: Utc::now(),
        }
    }
}
