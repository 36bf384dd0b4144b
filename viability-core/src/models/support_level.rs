use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    /// Coordination of Supports.
    #[default]
    Level2,
    /// Specialist Support Coordination.
    Level3,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Level2 => "level2",
            Self::Level3 => "level3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Level2 => "Level 2: Coordination of Supports",
            Self::Level3 => "Level 3: Specialist Support Coordination",
        }
    }

    /// Accepts the code (`level2`), the bare digit (`2`), or the display label.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        match normalized.as_str() {
            "2" | "level2" | "l2" => Some(Self::Level2),
            "3" | "level3" | "l3" => Some(Self::Level3),
            _ if s.trim().eq_ignore_ascii_case(Self::Level2.label()) => Some(Self::Level2),
            _ if s.trim().eq_ignore_ascii_case(Self::Level3.label()) => Some(Self::Level3),
            _ => None,
        }
    }

    pub fn all() -> &'static [SupportLevel] {
        &[SupportLevel::Level2, SupportLevel::Level3]
    }
}

/// Default hourly billing rate per support level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub level2: Decimal,
    pub level3: Decimal,
}

impl RateTable {
    pub fn rate_for(&self, level: SupportLevel) -> Decimal {
        match level {
            SupportLevel::Level2 => self.level2,
            SupportLevel::Level3 => self.level3,
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            level2: Decimal::new(10014, 2),
            level3: Decimal::new(19041, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_accepts_codes_digits_and_labels() {
        assert_eq!(SupportLevel::parse("level2"), Some(SupportLevel::Level2));
        assert_eq!(SupportLevel::parse(" 3 "), Some(SupportLevel::Level3));
        assert_eq!(SupportLevel::parse("Level 3"), Some(SupportLevel::Level3));
        assert_eq!(
            SupportLevel::parse("Level 2: Coordination of Supports"),
            Some(SupportLevel::Level2)
        );
        assert_eq!(SupportLevel::parse("level4"), None);
        assert_eq!(SupportLevel::parse(""), None);
    }

    #[test]
    fn parse_round_trips_as_str() {
        for level in SupportLevel::all() {
            assert_eq!(SupportLevel::parse(level.as_str()), Some(*level));
        }
    }

    #[test]
    fn default_rate_table_matches_published_rates() {
        let rates = RateTable::default();

        assert_eq!(rates.rate_for(SupportLevel::Level2), dec!(100.14));
        assert_eq!(rates.rate_for(SupportLevel::Level3), dec!(190.41));
    }
}
