//! Maps servlet shorthand tokens to Luminate Online endpoint identifiers.
//!
//! Callers say `cons`; the API wants `SRConsAPI`. The accepted set is closed
//! and small, so the capitalization quirks are kept as literal substitutions
//! instead of a general rule.

use crate::error::MantleError;

/// Shorthand tokens accepted from callers.
pub const SHORTHANDS: [&str; 13] = [
    "addressbook",
    "advocacy",
    "connect",
    "cons",
    "content",
    "datasync",
    "donation",
    "event",
    "group",
    "orgevent",
    "recurring",
    "survey",
    "teamraiser",
];

/// Servlets served under the `CR` prefix, spelled as they look before the
/// mid-word fixups run.
const CR_SERVLETS: [&str; 5] = [
    "AddressbookAPI",
    "ContentAPI",
    "OrgeventAPI",
    "SurveyAPI",
    "TeamraiserAPI",
];

/// Mid-word capitalization the generic transform misses.
const FIXUPS: [(&str, &str); 3] = [
    ("Addressbook", "AddressBook"),
    ("Datasync", "DataSync"),
    ("Orgevent", "OrgEvent"),
];

/// Normalize a shorthand token (case-insensitive) into the endpoint
/// identifier expected by the remote API.
pub fn normalize(shorthand: &str) -> Result<String, MantleError> {
    let token = shorthand.to_lowercase();
    if !SHORTHANDS.contains(&token.as_str()) {
        return Err(MantleError::UnknownEndpoint(shorthand.to_string()));
    }

    let mut name = capitalize(&token);
    name.push_str("API");

    // CR membership is decided on the un-fixed spelling.
    let prefix = if CR_SERVLETS.contains(&name.as_str()) {
        "CR"
    } else {
        "SR"
    };
    let mut servlet = format!("{prefix}{name}");

    for (from, to) in FIXUPS {
        servlet = servlet.replace(from, to);
    }
    Ok(servlet)
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shorthand_maps_to_its_endpoint() {
        let expected = [
            ("addressbook", "CRAddressBookAPI"),
            ("advocacy", "SRAdvocacyAPI"),
            ("connect", "SRConnectAPI"),
            ("cons", "SRConsAPI"),
            ("content", "CRContentAPI"),
            ("datasync", "SRDataSyncAPI"),
            ("donation", "SRDonationAPI"),
            ("event", "SREventAPI"),
            ("group", "SRGroupAPI"),
            ("orgevent", "CROrgEventAPI"),
            ("recurring", "SRRecurringAPI"),
            ("survey", "CRSurveyAPI"),
            ("teamraiser", "CRTeamraiserAPI"),
        ];
        assert_eq!(expected.len(), SHORTHANDS.len());
        for (token, servlet) in expected {
            assert_eq!(normalize(token).unwrap(), servlet, "{token}");
        }
    }

    #[test]
    fn orgevent_gets_cr_prefix_from_unfixed_spelling() {
        assert_eq!(normalize("orgevent").unwrap(), "CROrgEventAPI");
    }

    #[test]
    fn datasync_stays_sr_after_fixup() {
        assert_eq!(normalize("datasync").unwrap(), "SRDataSyncAPI");
    }

    #[test]
    fn shorthand_is_case_insensitive() {
        assert_eq!(normalize("CONS").unwrap(), "SRConsAPI");
        assert_eq!(normalize("TeamRaiser").unwrap(), "CRTeamraiserAPI");
    }

    #[test]
    fn unknown_shorthand_is_rejected() {
        let err = normalize("bogus").unwrap_err();
        assert!(matches!(err, MantleError::UnknownEndpoint(ref t) if t == "bogus"));
    }

    #[test]
    fn empty_shorthand_is_rejected() {
        assert!(matches!(
            normalize("").unwrap_err(),
            MantleError::UnknownEndpoint(_)
        ));
    }

    #[test]
    fn full_identifier_is_not_a_shorthand() {
        assert!(normalize("SRConsAPI").is_err());
    }
}
