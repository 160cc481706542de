use std::collections::HashMap;

use rand::RngCore;

use dataseed_core::{ColumnSchema, TableSchema};

use crate::errors::GenerationError;
use crate::matchers::{DEFAULT_GENERATOR_KEY, Matcher, MatcherChain, builtin_matchers};
pub use crate::model::GeneratedValue;

pub mod primitives;
pub mod semantic;

/// Column being generated plus its position in the table.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub table: &'a TableSchema,
    pub column: &'a ColumnSchema,
    /// Zero-based index of the row being built.
    pub row_index: u64,
}

/// Produces values for one generator key.
pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError>;
}

/// Matcher chain plus the generators its keys resolve to.
///
/// A default generator is always present, so every key resolves.
pub struct GeneratorRegistry {
    chain: MatcherChain,
    generators: HashMap<&'static str, Box<dyn Generator>>,
    default: Box<dyn Generator>,
}

impl GeneratorRegistry {
    pub fn builder() -> GeneratorRegistryBuilder {
        GeneratorRegistryBuilder::default()
    }

    /// Registry with every built-in matcher and generator.
    pub fn with_builtins() -> Result<Self, GenerationError> {
        let mut builder = Self::builder()
            .matchers(builtin_matchers())
            .default_generator(Box::new(primitives::DefaultStringGenerator));
        for generator in primitives::generators()
            .into_iter()
            .chain(semantic::generators())
        {
            builder = builder.generator(generator);
        }
        builder.build()
    }

    /// Registered generator for `key`, or the default generator.
    pub fn get_generator_by_key(&self, key: &str) -> &dyn Generator {
        match self.generators.get(key) {
            Some(generator) => generator.as_ref(),
            None => self.default.as_ref(),
        }
    }

    pub fn find_generator_type_for(&self, column: &ColumnSchema, table: &TableSchema) -> &str {
        self.chain.find_generator_type_for(column, table)
    }

    pub fn generator_for(&self, column: &ColumnSchema, table: &TableSchema) -> &dyn Generator {
        let key = self.chain.find_generator_type_for(column, table);
        self.get_generator_by_key(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        key == DEFAULT_GENERATOR_KEY || self.generators.contains_key(key)
    }
}

/// Collects matchers and generators before a registry is sealed.
#[derive(Default)]
pub struct GeneratorRegistryBuilder {
    matchers: Vec<Box<dyn Matcher>>,
    generators: Vec<Box<dyn Generator>>,
    default: Option<Box<dyn Generator>>,
}

impl GeneratorRegistryBuilder {
    pub fn matcher(mut self, matcher: Box<dyn Matcher>) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn matchers(mut self, matchers: Vec<Box<dyn Matcher>>) -> Self {
        self.matchers.extend(matchers);
        self
    }

    pub fn generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.generators.push(generator);
        self
    }

    /// Generator used for [`DEFAULT_GENERATOR_KEY`] and for unknown keys.
    pub fn default_generator(mut self, generator: Box<dyn Generator>) -> Self {
        self.default = Some(generator);
        self
    }

    pub fn build(self) -> Result<GeneratorRegistry, GenerationError> {
        let default = self.default.ok_or(GenerationError::MissingDefaultGenerator)?;

        let mut generators: HashMap<&'static str, Box<dyn Generator>> = HashMap::new();
        for generator in self.generators {
            let id = generator.id();
            if id == DEFAULT_GENERATOR_KEY || generators.contains_key(id) {
                return Err(GenerationError::DuplicateGenerator(id.to_string()));
            }
            generators.insert(id, generator);
        }

        Ok(GeneratorRegistry {
            chain: MatcherChain::new(self.matchers),
            generators,
            default,
        })
    }
}

/// Truncate text to the column's declared length, on a char boundary.
pub(crate) fn fit_length(value: String, column: &ColumnSchema) -> String {
    match column.max_length {
        Some(max) if max > 0 && value.chars().count() > max as usize => {
            value.chars().take(max as usize).collect()
        }
        _ => value,
    }
}
