/// A fitted scalar regression, queried with a weight in kilograms.
pub trait ModelService: Send + Sync + 'static {
    fn predict(&self, weight_in_kg: f64) -> f64;
}
