/// Kilograms per pound.
pub const POUNDS_TO_KG: f64 = 0.453592;

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * POUNDS_TO_KG
}

pub fn kg_to_pounds(kg: f64) -> f64 {
    kg / POUNDS_TO_KG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pounds_to_kg() {
        assert!((pounds_to_kg(150.0) - 68.0388).abs() < 1e-9);
        assert_eq!(pounds_to_kg(0.0), 0.0);
    }

    #[test]
    fn test_conversion_is_reversible() {
        for pounds in [0.0, 1.0, 99.5, 150.0, 200.0, 1234.5678] {
            let back = kg_to_pounds(pounds_to_kg(pounds));
            assert!((back - pounds).abs() < 1e-9, "{} -> {}", pounds, back);
        }
    }
}
