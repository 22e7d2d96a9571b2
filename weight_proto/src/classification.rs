use std::fmt;

/// Weight category derived from a predicted weight.
///
/// The bands are checked in order and anything that matches none of the
/// first three is `Obese`. Values in `[24.9, 25)` and `[29.9, ..)` therefore
/// land in `Obese`, as does NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightClass {
    Underweight,
    HealthyWeight,
    Overweight,
    Obese,
}

impl WeightClass {
    pub fn classify(predicted_weight: f64) -> Self {
        if predicted_weight < 18.5 {
            WeightClass::Underweight
        } else if (18.5..24.9).contains(&predicted_weight) {
            WeightClass::HealthyWeight
        } else if (25.0..29.9).contains(&predicted_weight) {
            WeightClass::Overweight
        } else {
            WeightClass::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightClass::Underweight => "Underweight",
            WeightClass::HealthyWeight => "Healthy Weight",
            WeightClass::Overweight => "Overweight",
            WeightClass::Obese => "Obese",
        }
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
