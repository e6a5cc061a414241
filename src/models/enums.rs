use serde::{Deserialize, Serialize};

use super::InvalidEnumValue;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(TurnRole {
    User => "user",
    Patient => "patient",
    System => "system",
});

str_enum!(ReportType {
    Feedback => "feedback",
    Detailed => "detailed",
});

str_enum!(Grade {
    Excellent => "excellent",
    Good => "good",
    Pass => "pass",
    Fail => "fail",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn turn_role_round_trip() {
        for (variant, s) in [
            (TurnRole::User, "user"),
            (TurnRole::Patient, "patient"),
            (TurnRole::System, "system"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TurnRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn report_type_round_trip() {
        for (variant, s) in [
            (ReportType::Feedback, "feedback"),
            (ReportType::Detailed, "detailed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ReportType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn grade_round_trip() {
        for (variant, s) in [
            (Grade::Excellent, "excellent"),
            (Grade::Good, "good"),
            (Grade::Pass, "pass"),
            (Grade::Fail, "fail"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Grade::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(TurnRole::from_str("doctor").is_err());
        assert!(ReportType::from_str("summary").is_err());
        assert!(Grade::from_str("").is_err());
    }

    #[test]
    fn grade_serializes_snake_case() {
        let json = serde_json::to_string(&Grade::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
    }
}
