// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Identifier extraction from LEAP resource references.

use crate::error::Error;

/// Get the numeric id from any kind of href.
///
/// LEAP resource references look like `/device/123`,
/// `/zone/5/status` or `/area/3/associatedzone`; the id is the numeric
/// second segment. Fails with [`Error::InvalidHref`] if the reference does
/// not have that shape.
pub fn id_from_href(href: &str) -> Result<&str, Error> {
    let invalid = || Error::InvalidHref(href.to_string());

    let rest = href.strip_prefix('/').ok_or_else(invalid)?;
    let mut segments = rest.split('/');

    let kind = segments.next().ok_or_else(invalid)?;
    if kind.is_empty() || kind.bytes().any(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let id = segments.next().ok_or_else(invalid)?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_ids() {
        assert_eq!(id_from_href("/device/123").unwrap(), "123");
        assert_eq!(id_from_href("/occupancygroup/2").unwrap(), "2");
    }

    #[test]
    fn extracts_ids_with_suffix() {
        assert_eq!(id_from_href("/zone/5/status").unwrap(), "5");
        assert_eq!(id_from_href("/button/101/status/event").unwrap(), "101");
        assert_eq!(id_from_href("/area/3/associatedzone").unwrap(), "3");
    }

    #[test]
    fn rejects_malformed_hrefs() {
        assert!(id_from_href("device/123").is_err());
        assert!(id_from_href("/device").is_err());
        assert!(id_from_href("/device/").is_err());
        assert!(id_from_href("/device/abc").is_err());
        assert!(id_from_href("//123").is_err());
        assert!(id_from_href("").is_err());
    }
}
