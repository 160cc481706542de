use std::collections::HashSet;

use dataseed_core::{ColumnSchema, TableSchema};

use crate::matchers::Matcher;
use crate::matchers::naming::singular_tokens;

/// Name-driven rule: a textual column of a table whose name carries one of
/// the rule's keywords gets that rule's generator.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub key: &'static str,
    pub priority: i32,
    /// Singular, lower-cased table-name words that trigger the rule.
    pub keywords: &'static [&'static str],
    /// Schema words (or raw schema names) that disqualify the rule.
    pub stop_words: &'static [&'static str],
    /// Columns must be longer than this to hold the generated values.
    pub min_length: Option<i32>,
}

pub const PERSON: CategoryRule = CategoryRule {
    key: "person_name",
    priority: 100,
    keywords: &[
        "person", "people", "customer", "employee", "user", "contact", "member", "client",
        "author", "staff", "student", "patient",
    ],
    stop_words: &["production", "purchasing"],
    min_length: None,
};

pub const PRODUCT: CategoryRule = CategoryRule {
    key: "product_name",
    priority: 90,
    keywords: &["product", "item", "article", "merchandise", "good"],
    stop_words: &["humanresources", "person"],
    min_length: None,
};

pub const STATUS: CategoryRule = CategoryRule {
    key: "status",
    priority: 85,
    keywords: &["status", "stage", "phase"],
    stop_words: &["humanresources"],
    min_length: None,
};

pub const CATEGORY: CategoryRule = CategoryRule {
    key: "category_name",
    priority: 80,
    keywords: &["category", "subcategory", "type", "kind", "genre", "class"],
    stop_words: &["humanresources"],
    min_length: None,
};

pub const CITY: CategoryRule = CategoryRule {
    key: "city_name",
    priority: 70,
    keywords: &["city", "town", "municipality"],
    stop_words: &[],
    min_length: Some(2),
};

pub const COUNTRY: CategoryRule = CategoryRule {
    key: "country_name",
    priority: 70,
    keywords: &["country", "nation"],
    stop_words: &[],
    min_length: Some(3),
};

pub const STATE: CategoryRule = CategoryRule {
    key: "state_name",
    priority: 65,
    keywords: &["state", "province"],
    stop_words: &[],
    min_length: Some(2),
};

pub const REGION: CategoryRule = CategoryRule {
    key: "region_name",
    priority: 60,
    keywords: &["region", "territory", "area", "zone"],
    stop_words: &[],
    min_length: Some(3),
};

/// Built-in category rules in registration order.
pub const CATEGORY_RULES: &[CategoryRule] =
    &[PERSON, PRODUCT, STATUS, CATEGORY, CITY, COUNTRY, STATE, REGION];

impl CategoryRule {
    fn schema_disqualifies(&self, schema: &str) -> bool {
        let raw = schema.to_lowercase().replace('_', "");
        if self.stop_words.contains(&raw.as_str()) {
            return true;
        }
        singular_tokens(schema)
            .iter()
            .any(|token| self.stop_words.contains(&token.as_str()))
    }

    fn column_fits(&self, column: &ColumnSchema) -> bool {
        if !column.is_textual()
            || column.is_primary_key
            || column.is_foreign_key
            || column.is_computed
        {
            return false;
        }
        match (self.min_length, column.max_length) {
            (Some(min), Some(len)) if len > 0 => len > min,
            _ => true,
        }
    }
}

impl Matcher for CategoryRule {
    fn key(&self) -> &str {
        self.key
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, column: &ColumnSchema, table: &TableSchema) -> bool {
        if !self.column_fits(column) || self.schema_disqualifies(&table.schema) {
            return false;
        }
        let words: HashSet<String> = singular_tokens(&table.name).into_iter().collect();
        self.keywords.iter().any(|keyword| words.contains(*keyword))
    }
}
