/// Country marker payload shown in the hover tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub country: String,
    /// Population, already formatted for display.
    pub population: String,
}

impl Marker {
    pub fn new(country: impl Into<String>, population: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            population: population.into(),
        }
    }
}
