use jiff::SignedDuration;

#[derive(Clone, Debug)]
pub struct GlsParams {
    /// Overall penalty scale in the biased-distance formula.
    pub lambda: f64,
    /// Secondary penalty multiplier, kept independent from `lambda`.
    pub alpha: f64,
    /// Wall-clock ceiling on the penalization loop.
    pub time_budget: SignedDuration,
    /// Shuffle budget for the first-fit construction before it gives up.
    pub max_construction_attempts: usize,
    /// Seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GlsParams {
    fn default() -> Self {
        Self {
            lambda: 0.3,
            alpha: 1.0,
            time_budget: SignedDuration::from_mins(5),
            max_construction_attempts: 1000,
            seed: None,
        }
    }
}
