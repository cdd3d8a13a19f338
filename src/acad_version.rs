use std::fmt;

use crate::{DxfError, DxfResult};

/// The file-level declared format revision.  Every version-conditional field in a
/// `RecordSchema` is gated by comparing against this ordinal; the value itself is supplied
/// by the document layer (e.g. from the `$ACADVER` header variable), never derived here.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum AcadVersion {
    R10,
    R11,
    R12,
    R13,
    R14,
    R2000,
    R2004,
    R2007,
    R2010,
    R2013,
    R2018,
}

impl AcadVersion {
    pub fn from(val: &str) -> DxfResult<AcadVersion> {
        match val {
            "AC1006" => Ok(AcadVersion::R10),
            "AC1009" => Ok(AcadVersion::R12),
            "AC1011" => Ok(AcadVersion::R13),
            "AC1012" => Ok(AcadVersion::R13),
            "AC1014" => Ok(AcadVersion::R14),
            "14" => Ok(AcadVersion::R14),
            "14.01" => Ok(AcadVersion::R14),
            "AC1015" => Ok(AcadVersion::R2000),
            "15.0" => Ok(AcadVersion::R2000),
            "15.05" => Ok(AcadVersion::R2000),
            "15.06" => Ok(AcadVersion::R2000),
            "AC1018" => Ok(AcadVersion::R2004),
            "16.0" => Ok(AcadVersion::R2004),
            "16.1" => Ok(AcadVersion::R2004),
            "16.2" => Ok(AcadVersion::R2004),
            "AC1021" => Ok(AcadVersion::R2007),
            "17.0" => Ok(AcadVersion::R2007),
            "17.1" => Ok(AcadVersion::R2007),
            "17.2" => Ok(AcadVersion::R2007),
            "AC1024" => Ok(AcadVersion::R2010),
            "18.0" => Ok(AcadVersion::R2010),
            "18.1" => Ok(AcadVersion::R2010),
            "18.2" => Ok(AcadVersion::R2010),
            "AC1027" => Ok(AcadVersion::R2013),
            "19.0" => Ok(AcadVersion::R2013),
            "19.1" => Ok(AcadVersion::R2013),
            "19.2" => Ok(AcadVersion::R2013),
            "19.3" => Ok(AcadVersion::R2013),
            "AC1032" => Ok(AcadVersion::R2018),
            _ => Err(DxfError::UnsupportedVersion(String::from(val))),
        }
    }
}

impl fmt::Display for AcadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_value = match self {
            AcadVersion::R10 => "AC1006",
            AcadVersion::R11 => "AC1009",
            AcadVersion::R12 => "AC1009",
            AcadVersion::R13 => "AC1012",
            AcadVersion::R14 => "AC1014",
            AcadVersion::R2000 => "AC1015",
            AcadVersion::R2004 => "AC1018",
            AcadVersion::R2007 => "AC1021",
            AcadVersion::R2010 => "AC1024",
            AcadVersion::R2013 => "AC1027",
            AcadVersion::R2018 => "AC1032",
        };
        write!(f, "{}", display_value)
    }
}

#[cfg(test)]
mod tests {
    use crate::AcadVersion;

    #[test]
    fn version_ordering_follows_release_order() {
        assert!(AcadVersion::R10 < AcadVersion::R12);
        assert!(AcadVersion::R12 < AcadVersion::R13);
        assert!(AcadVersion::R13 < AcadVersion::R2018);
    }

    #[test]
    fn version_from_string() {
        assert_eq!(AcadVersion::R12, AcadVersion::from("AC1009").unwrap());
        assert_eq!(AcadVersion::R13, AcadVersion::from("AC1012").unwrap());
        assert_eq!(AcadVersion::R2013, AcadVersion::from("19.1").unwrap());
        assert!(AcadVersion::from("not-a-version").is_err());
    }

    #[test]
    fn version_display_round_trips() {
        for &v in &[AcadVersion::R13, AcadVersion::R2000, AcadVersion::R2018] {
            assert_eq!(v, AcadVersion::from(&v.to_string()).unwrap());
        }
    }
}
