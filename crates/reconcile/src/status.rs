use serde::{Deserialize, Serialize};

/// Per-material fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Complete,
    Partial,
    Needed,
}

impl core::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(Status::Complete),
            "partial" => Ok(Status::Partial),
            "needed" => Ok(Status::Needed),
            other => Err(format!("unknown status '{other}' (expected complete, partial or needed)")),
        }
    }
}

/// `complete` when nothing is owed (`have >= required`, including 0/0),
/// `partial` when some is on hand, `needed` otherwise.
pub fn classify(have: u64, required: u64) -> Status {
    if have >= required {
        Status::Complete
    } else if have > 0 {
        Status::Partial
    } else {
        Status::Needed
    }
}

/// `min(100, round(100 * have / required))`, rounding halves up; 0 when nothing is required.
pub fn percentage(have: u64, required: u64) -> u8 {
    if required == 0 {
        return 0;
    }
    let (have, required) = (have as u128, required as u128);
    let pct = (200 * have + required) / (2 * required);
    pct.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_cases() {
        assert_eq!(classify(5, 5), Status::Complete);
        assert_eq!(classify(3, 5), Status::Partial);
        assert_eq!(classify(0, 5), Status::Needed);
        assert_eq!(classify(0, 0), Status::Complete);
        assert_eq!(classify(7, 0), Status::Complete);
    }

    #[test]
    fn percentage_cases() {
        assert_eq!(percentage(4, 5), 80);
        assert_eq!(percentage(10, 5), 100);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Partial".parse::<Status>(), Ok(Status::Partial));
        assert!("done".parse::<Status>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: percentage stays in 0..=100 and reaches 100 for complete materials.
        #[test]
        fn percentage_bounds(have in 0u64..10_000, required in 1u64..10_000) {
            let pct = percentage(have, required);
            prop_assert!(pct <= 100);
            if classify(have, required) == Status::Complete {
                prop_assert_eq!(pct, 100);
            }
            if have == 0 {
                prop_assert_eq!(pct, 0);
            }
        }
    }
}
