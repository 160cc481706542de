//! Column → generator-key dispatch.

pub mod category;
pub mod column;
pub mod naming;

use dataseed_core::{ColumnSchema, TableSchema};
use tracing::debug;

pub use category::{CATEGORY_RULES, CategoryRule};
pub use column::{EmailMatcher, SequenceMatcher, TYPE_MATCHERS, TypeMatcher};
pub use naming::{singularize, tokenize};

/// Generator key used when no matcher claims a column.
pub const DEFAULT_GENERATOR_KEY: &str = "default_string";

/// Decides whether a column should use the generator named by `key`.
///
/// Implementations must be pure: the same column and table always give the
/// same answer.
pub trait Matcher: Send + Sync {
    fn key(&self) -> &str;
    fn priority(&self) -> i32;
    fn matches(&self, column: &ColumnSchema, table: &TableSchema) -> bool;
}

/// Matchers ordered by descending priority.
pub struct MatcherChain {
    matchers: Vec<Box<dyn Matcher>>,
}

impl MatcherChain {
    /// Equal priorities keep their registration order.
    pub fn new(mut matchers: Vec<Box<dyn Matcher>>) -> Self {
        matchers.sort_by_key(|matcher| std::cmp::Reverse(matcher.priority()));
        Self { matchers }
    }

    /// Key of the first matcher that claims the column, else
    /// [`DEFAULT_GENERATOR_KEY`].
    pub fn find_generator_type_for(&self, column: &ColumnSchema, table: &TableSchema) -> &str {
        for matcher in &self.matchers {
            if matcher.matches(column, table) {
                debug!(
                    table = %table.id(),
                    column = %column.name,
                    generator = matcher.key(),
                    "column matched"
                );
                return matcher.key();
            }
        }
        DEFAULT_GENERATOR_KEY
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Matchers shipped with the crate, in registration order.
pub fn builtin_matchers() -> Vec<Box<dyn Matcher>> {
    let mut matchers: Vec<Box<dyn Matcher>> = vec![Box::new(SequenceMatcher), Box::new(EmailMatcher)];
    for rule in CATEGORY_RULES {
        matchers.push(Box::new(*rule));
    }
    for matcher in TYPE_MATCHERS {
        matchers.push(Box::new(*matcher));
    }
    matchers
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        key: &'static str,
        priority: i32,
        hit: bool,
    }

    impl Matcher for Fixed {
        fn key(&self) -> &str {
            self.key
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn matches(&self, _column: &ColumnSchema, _table: &TableSchema) -> bool {
            self.hit
        }
    }

    fn column(name: &str, data_type: &str) -> ColumnSchema {
        ColumnSchema {
            ordinal_position: 1,
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: Some(60),
            numeric_precision: None,
            numeric_scale: None,
            is_nullable: false,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: false,
            is_computed: false,
            default: None,
        }
    }

    fn table(schema: &str, name: &str) -> TableSchema {
        TableSchema {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    #[test]
    fn higher_priority_wins() {
        let chain = MatcherChain::new(vec![
            Box::new(Fixed { key: "low", priority: 5, hit: true }),
            Box::new(Fixed { key: "high", priority: 50, hit: true }),
        ]);
        let key = chain.find_generator_type_for(&column("a", "text"), &table("dbo", "t"));
        assert_eq!(key, "high");
    }

    #[test]
    fn ties_keep_registration_order() {
        let chain = MatcherChain::new(vec![
            Box::new(Fixed { key: "first", priority: 10, hit: true }),
            Box::new(Fixed { key: "second", priority: 10, hit: true }),
        ]);
        let key = chain.find_generator_type_for(&column("a", "text"), &table("dbo", "t"));
        assert_eq!(key, "first");
    }

    #[test]
    fn no_match_falls_back_to_default_key() {
        let chain = MatcherChain::new(vec![Box::new(Fixed { key: "never", priority: 10, hit: false })]);
        let key = chain.find_generator_type_for(&column("a", "text"), &table("dbo", "t"));
        assert_eq!(key, DEFAULT_GENERATOR_KEY);
    }

    #[test]
    fn builtin_dispatch() {
        let chain = MatcherChain::new(builtin_matchers());
        let customers = table("dbo", "Customers");
        assert_eq!(chain.find_generator_type_for(&column("FullName", "nvarchar"), &customers), "person_name");
        assert_eq!(chain.find_generator_type_for(&column("Email", "nvarchar"), &customers), "email");
        assert_eq!(chain.find_generator_type_for(&column("CreatedAt", "datetime2"), &customers), "timestamp");
        assert_eq!(
            chain.find_generator_type_for(&column("Notes", "text"), &table("dbo", "Invoices")),
            DEFAULT_GENERATOR_KEY
        );

        let mut id = column("Id", "int");
        id.is_primary_key = true;
        assert_eq!(chain.find_generator_type_for(&id, &customers), "sequence");

        let mut fk = column("CustomerId", "int");
        fk.is_foreign_key = true;
        assert_eq!(chain.find_generator_type_for(&fk, &customers), "integer");
    }

    #[test]
    fn product_category_prefers_product_rule() {
        let chain = MatcherChain::new(builtin_matchers());
        let key = chain.find_generator_type_for(&column("Name", "varchar"), &table("dbo", "ProductCategories"));
        assert_eq!(key, "product_name");
    }
}
