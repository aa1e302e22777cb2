//! Postal address record.

use serde::{Deserialize, Serialize};

/// A shipping or billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Address {
    /// Single-line rendering, e.g. for order summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.zip_code, self.country
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line() {
        let address = Address {
            street: "1 Jura Forest Rd".to_string(),
            city: "Rimuru".to_string(),
            state: "JF".to_string(),
            zip_code: "12345".to_string(),
            country: "Tempest".to_string(),
        };
        assert_eq!(address.one_line(), "1 Jura Forest Rd, Rimuru, JF 12345, Tempest");
    }
}
