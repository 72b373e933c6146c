//! Category mapping service.
//!
//! Translates the publisher's category codes to local category ids.

use crate::models::CategoryMapping;

/// Resolves external category codes against the configured mapping table.
#[derive(Debug, Clone, Default)]
pub struct CategoryMapper {
    mappings: Vec<CategoryMapping>,
}

impl CategoryMapper {
    /// Create a mapper over the table in configuration order.
    pub fn new(mappings: Vec<CategoryMapping>) -> Self {
        Self { mappings }
    }

    /// Local category for `external_id`, or `None` when unmapped.
    ///
    /// Only the external code of each row is compared, and the first matching
    /// row wins when a code appears more than once.
    pub fn resolve(&self, external_id: &str) -> Option<u64> {
        self.mappings
            .iter()
            .find(|m| m.external_id == external_id)
            .map(|m| m.internal_id)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let mapper = CategoryMapper::new(vec![
            CategoryMapping::new("5", 12),
            CategoryMapping::new("5", 99),
        ]);
        assert_eq!(mapper.resolve("5"), Some(12));
    }

    #[test]
    fn test_unmapped_code_is_none() {
        let mapper = CategoryMapper::new(vec![CategoryMapping::new("5", 12)]);
        assert_eq!(mapper.resolve("999"), None);
        assert_eq!(CategoryMapper::default().resolve("5"), None);
    }

    #[test]
    fn test_internal_id_never_matches() {
        // "12" is an internal id of the first row, not an external code.
        let mapper = CategoryMapper::new(vec![
            CategoryMapping::new("5", 12),
            CategoryMapping::new("12", 40),
        ]);
        assert_eq!(mapper.resolve("12"), Some(40));

        let mapper = CategoryMapper::new(vec![CategoryMapping::new("5", 12)]);
        assert_eq!(mapper.resolve("12"), None);
    }

    #[test]
    fn test_exact_comparison() {
        let mapper = CategoryMapper::new(vec![CategoryMapping::new("05", 1)]);
        assert_eq!(mapper.resolve("5"), None);
        assert_eq!(mapper.resolve("05"), Some(1));
    }
}
