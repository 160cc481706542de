use fake::Fake;
use fake::faker::address::en::{CityName, CountryName, StateName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, Generator, GeneratorContext, fit_length};

const PRODUCT_ADJECTIVES: &[&str] = &[
    "Classic", "Compact", "Deluxe", "Ergonomic", "Portable", "Premium", "Rustic", "Sleek",
    "Smart", "Vintage", "Wireless", "Durable",
];
const PRODUCT_NOUNS: &[&str] = &[
    "Backpack", "Bottle", "Chair", "Desk Lamp", "Headphones", "Jacket", "Keyboard", "Mug",
    "Notebook", "Speaker", "Table", "Watch",
];
const STATUSES: &[&str] = &[
    "Active",
    "Inactive",
    "Pending",
    "Approved",
    "Rejected",
    "Cancelled",
    "Completed",
    "Archived",
];
const CATEGORIES: &[&str] = &[
    "Accessories",
    "Books",
    "Clothing",
    "Electronics",
    "Furniture",
    "Garden",
    "Groceries",
    "Health",
    "Sports",
    "Toys",
];
const REGIONS: &[&str] = &[
    "North", "South", "East", "West", "Central", "Northeast", "Northwest", "Southeast",
    "Southwest", "Midwest",
];

/// Built-in name-driven generators.
pub fn generators() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(FakeGenerator {
            id: "person_name",
            kind: FakeKind::PersonName,
        }),
        Box::new(FakeGenerator {
            id: "email",
            kind: FakeKind::Email,
        }),
        Box::new(FakeGenerator {
            id: "city_name",
            kind: FakeKind::City,
        }),
        Box::new(FakeGenerator {
            id: "country_name",
            kind: FakeKind::Country,
        }),
        Box::new(FakeGenerator {
            id: "state_name",
            kind: FakeKind::State,
        }),
        Box::new(ProductNameGenerator),
        Box::new(PickListGenerator {
            id: "status",
            values: STATUSES,
        }),
        Box::new(PickListGenerator {
            id: "category_name",
            values: CATEGORIES,
        }),
        Box::new(PickListGenerator {
            id: "region_name",
            values: REGIONS,
        }),
    ]
}

#[derive(Debug, Clone, Copy)]
enum FakeKind {
    PersonName,
    Email,
    City,
    Country,
    State,
}

/// Values from the `fake` catalog, driven by a generator derived from the
/// caller's RNG so runs stay reproducible.
struct FakeGenerator {
    id: &'static str,
    kind: FakeKind,
}

impl Generator for FakeGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let mut fake_rng = ChaCha8Rng::seed_from_u64(rng.next_u64());
        let value: String = match self.kind {
            FakeKind::PersonName => Name().fake_with_rng(&mut fake_rng),
            FakeKind::Email => SafeEmail().fake_with_rng(&mut fake_rng),
            FakeKind::City => CityName().fake_with_rng(&mut fake_rng),
            FakeKind::Country => CountryName().fake_with_rng(&mut fake_rng),
            FakeKind::State => StateName().fake_with_rng(&mut fake_rng),
        };
        Ok(GeneratedValue::Text(fit_length(value, ctx.column)))
    }
}

struct ProductNameGenerator;

impl Generator for ProductNameGenerator {
    fn id(&self) -> &'static str {
        "product_name"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let adjective = PRODUCT_ADJECTIVES.choose(rng).unwrap_or(&"Generic");
        let noun = PRODUCT_NOUNS.choose(rng).unwrap_or(&"Item");
        Ok(GeneratedValue::Text(fit_length(
            format!("{adjective} {noun}"),
            ctx.column,
        )))
    }
}

struct PickListGenerator {
    id: &'static str,
    values: &'static [&'static str],
}

impl Generator for PickListGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let value = self.values.choose(rng).copied().unwrap_or(self.id);
        Ok(GeneratedValue::Text(fit_length(value.to_string(), ctx.column)))
    }
}

#[cfg(test)]
mod tests {
    use dataseed_core::{ColumnSchema, TableSchema};

    use super::*;

    fn column(name: &str, max_length: Option<i32>) -> ColumnSchema {
        ColumnSchema {
            ordinal_position: 1,
            name: name.to_string(),
            data_type: "varchar".to_string(),
            max_length,
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

    fn generate(generator: &dyn Generator, column: &ColumnSchema, seed: u64) -> String {
        let table = TableSchema {
            schema: "dbo".to_string(),
            name: "Customers".to_string(),
            columns: Vec::new(),
        };
        let ctx = GeneratorContext {
            table: &table,
            column,
            row_index: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generator
            .generate(&ctx, &mut rng)
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    fn find(id: &str) -> Box<dyn Generator> {
        generators()
            .into_iter()
            .find(|generator| generator.id() == id)
            .unwrap()
    }

    #[test]
    fn same_seed_same_value() {
        let generator = find("person_name");
        let column = column("FullName", Some(100));
        assert_eq!(
            generate(generator.as_ref(), &column, 3),
            generate(generator.as_ref(), &column, 3)
        );
    }

    #[test]
    fn values_fit_declared_length() {
        for id in ["person_name", "email", "city_name", "product_name", "status"] {
            let generator = find(id);
            let column = column("Value", Some(4));
            let value = generate(generator.as_ref(), &column, 21);
            assert!(value.chars().count() <= 4, "{id} produced '{value}'");
        }
    }

    #[test]
    fn pick_lists_draw_from_their_values() {
        let generator = find("status");
        let column = column("Status", None);
        for seed in 0..20 {
            let value = generate(generator.as_ref(), &column, seed);
            assert!(STATUSES.contains(&value.as_str()));
        }
    }
}
