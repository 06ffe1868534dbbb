use std::collections::BTreeMap;

use crate::test_definition::TestDefinition;

/// Resolves a record's test abbreviation to the current catalog entry.
///
/// Records only hold the abbreviation, so every consumer that needs ranges or
/// turnaround times goes through this trait and sees the latest definition.
pub trait TestLookup {
    fn test(&self, abbr: &str) -> Option<&TestDefinition>;

    fn contains_test(&self, abbr: &str) -> bool {
        self.test(abbr).is_some()
    }
}

impl TestLookup for BTreeMap<String, TestDefinition> {
    fn test(&self, abbr: &str) -> Option<&TestDefinition> {
        self.get(abbr)
    }
}

impl<T: TestLookup + ?Sized> TestLookup for &T {
    fn test(&self, abbr: &str) -> Option<&TestDefinition> {
        (**self).test(abbr)
    }
}
