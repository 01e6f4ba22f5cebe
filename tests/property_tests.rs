/// Property-based tests using proptest
/// Tests invariants that should hold for all bounded inputs
use proptest::prelude::*;
use tourism_package_prediction::dataset_prep::{normalize_gender, train_test_indices, SplitConfig};
use tourism_package_prediction::features::assemble;
use tourism_package_prediction::models::*;
use tourism_package_prediction::prediction::{decide, evaluate, format_confidence};

fn pick<T: Copy + std::fmt::Debug + 'static>(options: &'static [T]) -> impl Strategy<Value = T> {
    prop::sample::select(options)
}

prop_compose! {
    fn profile()(
        age in 18u32..=100,
        gender in pick(Gender::ALL),
        marital_status in pick(MaritalStatus::ALL),
        occupation in pick(Occupation::ALL),
        designation in pick(Designation::ALL),
        city_tier in pick(CityTier::ALL),
        monthly_income in 100u32..=200_000,
        own_car in pick(YesNo::ALL),
        passport in pick(YesNo::ALL),
    ) -> CustomerInput {
        CustomerInput {
            age, gender, marital_status, occupation, designation, city_tier,
            monthly_income, own_car, passport,
            ..CustomerInput::default()
        }
    }
}

prop_compose! {
    fn valid_input()(
        base in profile(),
        product_pitched in pick(ProductPitched::ALL),
        preferred_property_star in 3u32..=5,
        num_person_visiting in 1u32..=5,
        num_children_visiting in 0u32..=3,
        num_trips in 1u32..=22,
        type_of_contact in pick(ContactType::ALL),
        duration_of_pitch in 0u32..=150,
        num_followups in 1u32..=6,
        pitch_satisfaction_score in 1u32..=5,
    ) -> CustomerInput {
        CustomerInput {
            product_pitched, preferred_property_star, num_person_visiting,
            num_children_visiting, num_trips, type_of_contact, duration_of_pitch,
            num_followups, pitch_satisfaction_score,
            ..base
        }
    }
}

// Property: every valid input assembles into an in-domain record
proptest! {
    #[test]
    fn valid_inputs_assemble_within_domains(input in valid_input()) {
        let record = assemble(&input).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        prop_assert_eq!(object.len(), FEATURE_COLUMNS.len());
        for column in FEATURE_COLUMNS {
            prop_assert!(object.contains_key(column));
        }

        prop_assert!((1..=3).contains(&record.city_tier));
        prop_assert!((3..=5).contains(&record.preferred_property_star));
        prop_assert!(record.passport == 0 || record.passport == 1);
        prop_assert!(record.own_car == 0 || record.own_car == 1);
        prop_assert_eq!(record.passport == 1, input.passport == YesNo::Yes);
        prop_assert_eq!(record.own_car == 1, input.own_car == YesNo::Yes);
        prop_assert_eq!(record.age, i64::from(input.age));
        prop_assert_eq!(record.monthly_income, i64::from(input.monthly_income));
        prop_assert_eq!(&record.designation, input.designation.label());
    }

    #[test]
    fn out_of_range_age_is_rejected(age in prop_oneof![0u32..18, 101u32..1000]) {
        let input = CustomerInput { age, ..CustomerInput::default() };
        prop_assert!(assemble(&input).is_err());
    }
}

// Property: the decision rule is a monotone step at 0.45
proptest! {
    #[test]
    fn decision_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(decide(low).class() <= decide(high).class());
    }

    #[test]
    fn decision_matches_threshold(p in 0.0f64..=1.0) {
        let prediction = evaluate(p).unwrap();
        prop_assert_eq!(prediction.outcome == Outcome::PackageOpted, p >= 0.45);
        prop_assert_eq!(evaluate(p).unwrap(), prediction);
    }

    #[test]
    fn confidence_has_two_decimals(p in 0.0f64..=1.0) {
        let confidence = format_confidence(p);
        let (whole, decimals) = confidence.split_once('.').unwrap();
        prop_assert_eq!(decimals.len(), 2);
        prop_assert!(whole.parse::<u32>().unwrap() <= 100);
        let parsed: f64 = confidence.parse().unwrap();
        prop_assert!((parsed - p * 100.0).abs() <= 0.005 + 1e-9);
    }
}

// Property: gender cleanup
proptest! {
    #[test]
    fn fe_male_always_becomes_female(
        left in "[ \t]{0,3}",
        right in "[ \t]{0,3}",
        upper in proptest::collection::vec(proptest::bool::ANY, 7)
    ) {
        let raw: String = "fe male"
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect();
        prop_assert_eq!(normalize_gender(&format!("{}{}{}", left, raw, right)), "Female");
    }

    #[test]
    fn normalization_is_idempotent(value in "[ a-zA-Z]{0,12}") {
        let once = normalize_gender(&value);
        prop_assert_eq!(normalize_gender(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }
}

// Property: the split is a reproducible partition of the right size
proptest! {
    #[test]
    fn split_partitions_rows(n in 5usize..2000) {
        let (train, test) = train_test_indices(n, SplitConfig::default()).unwrap();
        prop_assert_eq!(test.len(), (0.2 * n as f64).round() as usize);
        prop_assert_eq!(train.len() + test.len(), n);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..n).collect::<Vec<_>>());

        let again = train_test_indices(n, SplitConfig::default()).unwrap();
        prop_assert_eq!((train, test), again);
    }
}
