//! Fitted one-hot feature encoding.
//!
//! The encoder is an immutable configuration object: the category set and
//! its column order are fixed once at fit time and reused verbatim for
//! every inference call. It is never refitted per request, and a category
//! unseen at fit time contributes an all-zero block instead of an error.

/// One-hot encoder over the `device_state` categorical column, frozen at
/// fit time.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    /// Known categories in column order (sorted, deduplicated).
    categories: Vec<String>,
}

impl OneHotEncoder {
    /// Fit the category set from training values.
    ///
    /// Categories are sorted and deduplicated so the column order is a pure
    /// function of the training data, independent of row order.
    pub fn fit<S: AsRef<str>>(values: &[S]) -> Self {
        let mut categories: Vec<String> =
            values.iter().map(|v| v.as_ref().to_string()).collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    /// Known categories in column order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Total feature-vector width: two numeric columns plus the one-hot block.
    pub fn width(&self) -> usize {
        2 + self.categories.len()
    }

    /// Encode one observation as `[battery_temp, ambient_temp, onehot...]`.
    ///
    /// Numeric columns pass through unchanged, ahead of the one-hot block.
    /// An unknown `device_state` yields an all-zero block; a training
    /// category absent from this row stays 0 in its fixed column.
    pub fn encode(&self, device_state: &str, battery_temp: f64, ambient_temp: f64) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.width());
        features.push(battery_temp);
        features.push(ambient_temp);
        for category in &self.categories {
            features.push(if category == device_state { 1.0 } else { 0.0 });
        }
        features
    }
}
