//! Feature assembly: turns form values into the classifier's column layout.

use crate::errors::AppError;
use crate::models::{CityTier, CustomerInput, FeatureRecord, YesNo};

/// Integer code the classifier expects for a city tier.
pub fn city_tier_code(tier: CityTier) -> i64 {
    match tier {
        CityTier::Tier1 => 1,
        CityTier::Tier2 => 2,
        CityTier::Tier3 => 3,
    }
}

/// Maps a raw city tier label ("Tier 1".."Tier 3") to its code.
///
/// Any other label is rejected.
pub fn city_tier_code_from_label(label: &str) -> Result<i64, AppError> {
    CityTier::from_label(label)
        .map(city_tier_code)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown city tier '{}'", label)))
}

/// Yes → 1, No → 0.
pub fn yes_no_flag(value: YesNo) -> i64 {
    match value {
        YesNo::Yes => 1,
        YesNo::No => 0,
    }
}

/// Builds the single-row feature record from validated form input.
///
/// City tier and the two Yes/No radios are encoded; every other value
/// passes through unchanged.
///
/// # Returns
///
/// * `Result<FeatureRecord, AppError>` - `BadRequest` when a numeric field
///   is outside its declared range.
pub fn assemble(input: &CustomerInput) -> Result<FeatureRecord, AppError> {
    input
        .validate()
        .map_err(|violations| AppError::BadRequest(violations.join("; ")))?;

    Ok(FeatureRecord {
        type_of_contact: input.type_of_contact.label().to_string(),
        city_tier: city_tier_code(input.city_tier),
        occupation: input.occupation.label().to_string(),
        gender: input.gender.label().to_string(),
        product_pitched: input.product_pitched.label().to_string(),
        preferred_property_star: i64::from(input.preferred_property_star),
        marital_status: input.marital_status.label().to_string(),
        designation: input.designation.label().to_string(),
        number_of_person_visiting: i64::from(input.num_person_visiting),
        number_of_followups: i64::from(input.num_followups),
        number_of_trips: i64::from(input.num_trips),
        pitch_satisfaction_score: i64::from(input.pitch_satisfaction_score),
        number_of_children_visiting: i64::from(input.num_children_visiting),
        monthly_income: i64::from(input.monthly_income),
        duration_of_pitch: i64::from(input.duration_of_pitch),
        age: i64::from(input.age),
        passport: yes_no_flag(input.passport),
        own_car: yes_no_flag(input.own_car),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureValue, FEATURE_COLUMNS};

    #[test]
    fn test_city_tier_mapping_is_exact() {
        assert_eq!(city_tier_code_from_label("Tier 1").unwrap(), 1);
        assert_eq!(city_tier_code_from_label("Tier 2").unwrap(), 2);
        assert_eq!(city_tier_code_from_label("Tier 3").unwrap(), 3);

        for bad in ["Tier 0", "Tier 4", "tier 2", " Tier 2", "2", ""] {
            assert!(
                city_tier_code_from_label(bad).is_err(),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_assemble_encodes_tier_and_flags() {
        let input = CustomerInput {
            city_tier: CityTier::Tier2,
            passport: YesNo::Yes,
            own_car: YesNo::No,
            ..CustomerInput::default()
        };

        let record = assemble(&input).unwrap();
        assert_eq!(record.city_tier, 2);
        assert_eq!(record.passport, 1);
        assert_eq!(record.own_car, 0);
        assert_eq!(record.type_of_contact, "Self Enquiry");
        assert_eq!(record.monthly_income, 10_000);
        assert_eq!(record.age, 30);
    }

    #[test]
    fn test_assembled_record_has_exact_columns() {
        let record = assemble(&CustomerInput::default()).unwrap();
        let entries = record.entries();

        let names: Vec<&str> = entries.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 18);
        for column in FEATURE_COLUMNS {
            assert!(object.contains_key(column), "missing {}", column);
        }
    }

    #[test]
    fn test_assemble_rejects_out_of_range() {
        let input = CustomerInput {
            num_person_visiting: 0,
            ..CustomerInput::default()
        };
        let err = assemble(&input).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("Persons Visiting")));
    }

    #[test]
    fn test_categoricals_are_text_and_numerics_are_numbers() {
        let record = assemble(&CustomerInput::default()).unwrap();
        assert_eq!(
            record.value("Designation"),
            Some(FeatureValue::Text("Manager".to_string()))
        );
        assert_eq!(record.value("PreferredPropertyStar"), Some(FeatureValue::Number(3)));
        assert_eq!(record.value("ProdTaken"), None);
    }
}
