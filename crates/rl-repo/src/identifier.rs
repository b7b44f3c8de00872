use std::fmt;

/// What the user asked to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Decimal digits exactly as given on the command line.
    Change(String),
    Topic(String),
}

impl Identifier {
    /// Pure ASCII digits name a change, anything else a topic.
    pub fn parse(value: &str) -> Self {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            Identifier::Change(value.to_string())
        } else {
            Identifier::Topic(value.to_string())
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Change(number) => write!(f, "change {number}"),
            Identifier::Topic(topic) => write!(f, "topic {topic}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_changes() {
        assert_eq!(Identifier::parse("12345"), Identifier::Change("12345".to_string()));
        assert_eq!(Identifier::parse("007"), Identifier::Change("007".to_string()));
    }

    #[test]
    fn everything_else_is_a_topic() {
        for value in ["feature-x", "123abc", "12 34", "-5", "+5", "", "１２３"] {
            assert_eq!(Identifier::parse(value), Identifier::Topic(value.to_string()));
        }
    }

    #[test]
    fn overflowing_digits_stay_a_change() {
        let huge = "99999999999999999999999";
        assert_eq!(Identifier::parse(huge), Identifier::Change(huge.to_string()));
    }
}
