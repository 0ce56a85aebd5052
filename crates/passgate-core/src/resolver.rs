//! Search-term resolution against the vault directory.

use crate::entry::EntryIndex;
use crate::error::Error;

/// Exact match against the title or url of every index record, first match
/// in list order. No fuzzy logic here; interactive narrowing happens in the
/// external picker before this is called.
pub fn resolve<'a>(search_term: &str, entries: &'a [EntryIndex]) -> Result<&'a EntryIndex, Error> {
    entries
        .iter()
        .find(|entry| entry.title == search_term || entry.url == search_term)
        .ok_or_else(|| Error::Lookup(search_term.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, url: &str, uuid: &str) -> EntryIndex {
        EntryIndex {
            title: title.into(),
            url: url.into(),
            uuid: uuid.into(),
        }
    }

    fn sample_entries() -> Vec<EntryIndex> {
        vec![
            entry("mail", "https://mail.example.org", "uuid-mail"),
            entry("bank", "https://bank.example.org", "uuid-bank"),
            entry("bank", "https://other-bank.example.org", "uuid-bank-2"),
        ]
    }

    #[test]
    fn matches_by_title() {
        let entries = sample_entries();
        assert_eq!(resolve("mail", &entries).unwrap().uuid, "uuid-mail");
    }

    #[test]
    fn matches_by_url() {
        let entries = sample_entries();
        assert_eq!(
            resolve("https://bank.example.org", &entries).unwrap().uuid,
            "uuid-bank"
        );
    }

    #[test]
    fn duplicate_terms_resolve_to_first_in_list_order() {
        let entries = sample_entries();
        assert_eq!(resolve("bank", &entries).unwrap().uuid, "uuid-bank");
    }

    #[test]
    fn no_match_is_a_lookup_error() {
        let entries = sample_entries();
        let err = resolve("does-not-exist", &entries).unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
        assert_eq!(err.to_string(), "No such entry: does-not-exist");
    }

    #[test]
    fn substring_of_a_title_does_not_match() {
        let entries = sample_entries();
        assert!(resolve("mai", &entries).is_err());
        assert!(resolve("mail.example.org", &entries).is_err());
    }

    #[test]
    fn empty_term_against_empty_fields_does_not_panic() {
        let entries = vec![entry("", "", "uuid-blank")];
        // An all-empty entry technically matches the empty term; callers are
        // expected to obtain a term from the picker before resolving.
        assert_eq!(resolve("", &entries).unwrap().uuid, "uuid-blank");
    }
}
