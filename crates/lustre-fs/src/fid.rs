//! Lustre file identifiers.
//!
//! A FID names a file independently of its path. The layout matches the
//! kernel's `struct lu_fid` so a [`Fid`] can be handed straight to the
//! client ioctls.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Sequence reserved for the `.lustre` directory.
pub const FID_SEQ_DOT_LUSTRE: u64 = 0x2_0000_0002;

/// Object id of `.lustre` within [`FID_SEQ_DOT_LUSTRE`].
pub const FID_OID_DOT_LUSTRE: u32 = 0x1;

/// A Lustre file identifier, printed as `[0xSEQ:0xOID:0xVER]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fid {
    /// Sequence number
    pub seq: u64,
    /// Object id within the sequence
    pub oid: u32,
    /// Version
    pub ver: u32,
}

impl Fid {
    /// Build a FID from its three fields.
    pub const fn new(seq: u64, oid: u32, ver: u32) -> Self {
        Self { seq, oid, ver }
    }

    /// The FID of the reserved `.lustre` directory at every mount root.
    pub const fn dot_lustre() -> Self {
        Self::new(FID_SEQ_DOT_LUSTRE, FID_OID_DOT_LUSTRE, 0)
    }

    /// Whether this FID names the `.lustre` directory.
    ///
    /// The version is ignored.
    pub const fn is_dot_lustre(&self) -> bool {
        self.seq == FID_SEQ_DOT_LUSTRE && self.oid == FID_OID_DOT_LUSTRE
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:x}:0x{:x}:0x{:x}]", self.seq, self.oid, self.ver)
    }
}

/// Error returned when a string is not a FID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FidParseError {
    /// Not three `:`-separated fields.
    #[error("invalid FID {0:?}: expected [seq:oid:ver]")]
    Format(String),

    /// A field is not a hexadecimal number of the right width.
    #[error("invalid FID {field} field {value:?}: {source}")]
    Field {
        /// Which field failed (`seq`, `oid` or `ver`)
        field: &'static str,
        /// The offending text
        value: String,
        /// Integer parse failure
        #[source]
        source: ParseIntError,
    },
}

fn parse_hex<T>(
    field: &'static str,
    value: &str,
    parse: fn(&str, u32) -> Result<T, ParseIntError>,
) -> Result<T, FidParseError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    parse(digits, 16).map_err(|source| FidParseError::Field {
        field,
        value: value.to_string(),
        source,
    })
}

impl FromStr for Fid {
    type Err = FidParseError;

    /// Accepts `[0x200000007:0x1:0x0]`, with or without the brackets and the
    /// `0x` prefixes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(trimmed);

        let mut fields = inner.split(':');
        let (Some(seq), Some(oid), Some(ver), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(FidParseError::Format(s.to_string()));
        };

        Ok(Fid {
            seq: parse_hex("seq", seq, u64::from_str_radix)?,
            oid: parse_hex("oid", oid, u32::from_str_radix)?,
            ver: parse_hex("ver", ver, u32::from_str_radix)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_lustre_predicate() {
        assert!(Fid::dot_lustre().is_dot_lustre());
        // Version does not matter
        assert!(Fid::new(FID_SEQ_DOT_LUSTRE, FID_OID_DOT_LUSTRE, 7).is_dot_lustre());
        // Lustre root directory FID
        assert!(!Fid::new(0x2_0000_0007, 0x1, 0).is_dot_lustre());
        // .lustre/fid lives in the same sequence with another oid
        assert!(!Fid::new(FID_SEQ_DOT_LUSTRE, 0x2, 0).is_dot_lustre());
    }

    #[test]
    fn test_display() {
        assert_eq!(Fid::new(0x2_0000_0007, 1, 0).to_string(), "[0x200000007:0x1:0x0]");
        assert_eq!(Fid::dot_lustre().to_string(), "[0x200000002:0x1:0x0]");
    }

    #[test]
    fn test_parse_forms() {
        let expected = Fid::new(0x2_0000_0400, 0x1f, 0x0);
        assert_eq!("[0x200000400:0x1f:0x0]".parse::<Fid>().unwrap(), expected);
        assert_eq!("0x200000400:0x1f:0x0".parse::<Fid>().unwrap(), expected);
        assert_eq!("200000400:1f:0".parse::<Fid>().unwrap(), expected);
        assert_eq!(" [0X200000400:0X1F:0x0]\n".parse::<Fid>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        assert!(matches!("".parse::<Fid>(), Err(FidParseError::Format(_))));
        assert!(matches!("[0x1:0x2]".parse::<Fid>(), Err(FidParseError::Format(_))));
        assert!(matches!("[0x1:0x2:0x3:0x4]".parse::<Fid>(), Err(FidParseError::Format(_))));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let err = "[0x1:0xzz:0x0]".parse::<Fid>().unwrap_err();
        assert!(matches!(err, FidParseError::Field { field: "oid", .. }));

        // oid is 32 bits wide
        let err = "[0x1:0x100000000:0x0]".parse::<Fid>().unwrap_err();
        assert!(matches!(err, FidParseError::Field { field: "oid", .. }));
    }

    #[test]
    fn test_layout_matches_lu_fid() {
        assert_eq!(size_of::<Fid>(), 16);
        assert_eq!(align_of::<Fid>(), 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_parses_back(seq: u64, oid: u32, ver: u32) {
                let fid = Fid::new(seq, oid, ver);
                prop_assert_eq!(fid.to_string().parse::<Fid>().unwrap(), fid);
            }

            #[test]
            fn parse_never_panics(s in "\\PC*") {
                let _ = s.parse::<Fid>();
            }
        }
    }
}
