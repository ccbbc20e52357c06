//! Property-based tests for extension name validation
//!
//! Uses proptest to check that every accepted name yields a version query the
//! SQLite parser treats as a single function call.

use extprobe::{DatabaseConfig, ExtDatabase, ExtensionName};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_identifiers_are_accepted(name in "[A-Za-z_][A-Za-z0-9_]{0,63}") {
        let parsed = ExtensionName::new(name.clone()).unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
        prop_assert_eq!(parsed.version_query(), format!("SELECT {}_version()", name));
    }

    #[test]
    fn prop_punctuation_is_rejected(
        prefix in "[a-z]{0,8}",
        bad in "[-. ;'\"()*/]",
        suffix in "[a-z]{0,8}"
    ) {
        let name = format!("{}{}{}", prefix, bad, suffix);
        prop_assert!(ExtensionName::new(name).is_err());
    }

    #[test]
    fn prop_leading_digit_is_rejected(digit in 0u8..10, rest in "[a-z_]{0,10}") {
        let name = format!("{}{}", digit, rest);
        prop_assert!(ExtensionName::new(name).is_err());
    }

    #[test]
    fn prop_version_query_prepares(name in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
        // sqlite_version() is built in
        prop_assume!(!name.eq_ignore_ascii_case("sqlite"));

        let db = ExtDatabase::open(&DatabaseConfig::in_memory()).unwrap();
        let name = ExtensionName::new(name).unwrap();
        let result = db.extension_version(&name);

        // Unregistered functions must fail as "no such function", never as a
        // syntax error.
        let message = result.unwrap_err().to_string();
        prop_assert!(message.contains("no such function"), "{}", message);
    }
}
