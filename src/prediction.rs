//! Threshold decision over classifier probabilities.

use crate::classifier::Classifier;
use crate::errors::AppError;
use crate::features;
use crate::models::{CustomerInput, FeatureRecord, Outcome, Prediction};

/// Decision cutoff chosen when the model was calibrated offline.
///
/// Must stay in lockstep with the trained model; it is not recomputed here.
pub const CLASSIFICATION_THRESHOLD: f64 = 0.45;

/// Positive iff `probability >= CLASSIFICATION_THRESHOLD`.
pub fn decide(probability: f64) -> Outcome {
    if probability >= CLASSIFICATION_THRESHOLD {
        Outcome::PackageOpted
    } else {
        Outcome::PackageNotOpted
    }
}

/// Probability as a percentage rounded to two decimals: 0.5 -> "50.00".
pub fn format_confidence(probability: f64) -> String {
    format!("{:.2}", probability * 100.0)
}

/// Turns a raw probability into a prediction, rejecting impossible values.
pub fn evaluate(probability: f64) -> Result<Prediction, AppError> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(AppError::InternalError(format!(
            "classifier returned probability {} outside [0, 1]",
            probability
        )));
    }

    Ok(Prediction {
        outcome: decide(probability),
        probability,
        confidence: format_confidence(probability),
        threshold: CLASSIFICATION_THRESHOLD,
    })
}

/// Scores an assembled record.
pub fn score(classifier: &dyn Classifier, record: &FeatureRecord) -> Result<Prediction, AppError> {
    let probability = classifier.predict_proba(record)?;
    let prediction = evaluate(probability)?;

    tracing::debug!(
        "Scored record: p={:.4} -> {}",
        prediction.probability,
        prediction.outcome.label()
    );
    Ok(prediction)
}

/// Assembles the feature record from form input and scores it.
///
/// # Returns
///
/// * `Result<(Prediction, FeatureRecord), AppError>` - The prediction and the
///   record that produced it, for operator review.
pub fn predict(
    classifier: &dyn Classifier,
    input: &CustomerInput,
) -> Result<(Prediction, FeatureRecord), AppError> {
    let record = features::assemble(input)?;
    let prediction = score(classifier, &record)?;
    Ok((prediction, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CityTier, YesNo};

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn predict_proba(&self, _record: &FeatureRecord) -> Result<f64, AppError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(decide(0.45), Outcome::PackageOpted);
        assert_eq!(decide(0.4499999), Outcome::PackageNotOpted);
        assert_eq!(decide(1.0), Outcome::PackageOpted);
        assert_eq!(decide(0.0), Outcome::PackageNotOpted);
    }

    #[test]
    fn test_confidence_formatting() {
        assert_eq!(format_confidence(0.5), "50.00");
        assert_eq!(format_confidence(0.44), "44.00");
        assert_eq!(format_confidence(0.123456), "12.35");
        assert_eq!(format_confidence(1.0), "100.00");
        assert_eq!(format_confidence(0.0), "0.00");
    }

    #[test]
    fn test_end_to_end_positive() {
        let input = CustomerInput {
            city_tier: CityTier::Tier2,
            passport: YesNo::Yes,
            own_car: YesNo::No,
            ..CustomerInput::default()
        };

        let (prediction, record) = predict(&Fixed(0.50), &input).unwrap();
        assert_eq!(record.city_tier, 2);
        assert_eq!(record.passport, 1);
        assert_eq!(record.own_car, 0);
        assert_eq!(prediction.outcome.label(), "Package Opted");
        assert_eq!(prediction.confidence, "50.00");
    }

    #[test]
    fn test_end_to_end_negative() {
        let input = CustomerInput {
            city_tier: CityTier::Tier2,
            passport: YesNo::Yes,
            own_car: YesNo::No,
            ..CustomerInput::default()
        };

        let (prediction, _) = predict(&Fixed(0.44), &input).unwrap();
        assert_eq!(prediction.outcome.label(), "Package Not Opted");
        assert_eq!(prediction.confidence, "44.00");
    }

    #[test]
    fn test_rejects_impossible_probabilities() {
        for p in [f64::NAN, -0.01, 1.01, f64::INFINITY] {
            assert!(matches!(evaluate(p), Err(AppError::InternalError(_))));
        }
    }

    #[test]
    fn test_classifier_errors_propagate() {
        struct Broken;
        impl Classifier for Broken {
            fn predict_proba(&self, _record: &FeatureRecord) -> Result<f64, AppError> {
                Err(AppError::SchemaMismatch("column Age missing".to_string()))
            }
        }

        let result = predict(&Broken, &CustomerInput::default());
        assert!(matches!(result, Err(AppError::SchemaMismatch(_))));
    }
}
