use dataseed_core::{
    ColumnPair, ColumnSchema, IndexConstraint, PrimaryKeyConstraint, RelationshipEdge,
};

use crate::options::IntrospectOptions;

use super::queries::{RawColumn, RawForeignKey, RawIndex, RawPrimaryKey};

pub fn filter_schemas(raw: Vec<String>, opts: &IntrospectOptions) -> Vec<String> {
    raw.into_iter()
        .filter(|schema| {
            let is_system = schema.starts_with("pg_") || schema == "information_schema";
            match &opts.schemas {
                Some(list) => list.iter().any(|item| item.eq_ignore_ascii_case(schema)),
                None => opts.include_system_schemas || !is_system,
            }
        })
        .collect()
}

/// Map raw columns, flagging key membership from the table's constraints.
pub fn map_columns(
    raw: Vec<RawColumn>,
    primary_key: Option<&PrimaryKeyConstraint>,
    foreign_keys: &[RelationshipEdge],
) -> Vec<ColumnSchema> {
    raw.into_iter()
        .map(|col| {
            let is_primary_key = primary_key
                .is_some_and(|pk| pk.columns.iter().any(|name| name == &col.name));
            let is_foreign_key = foreign_keys.iter().any(|edge| {
                edge.columns
                    .iter()
                    .any(|pair| pair.child_column == col.name)
            });
            ColumnSchema {
                ordinal_position: col.ordinal_position,
                name: col.name,
                data_type: col.data_type,
                max_length: col.character_max_length,
                numeric_precision: col.numeric_precision,
                numeric_scale: col.numeric_scale,
                is_nullable: col.is_nullable,
                is_primary_key,
                is_foreign_key,
                is_identity: col.is_identity,
                is_computed: col.is_generated,
                default: col.default,
            }
        })
        .collect()
}

pub fn map_primary_key(schema: &str, table: &str, raw: Option<RawPrimaryKey>) -> Option<PrimaryKeyConstraint> {
    raw.map(|pk| PrimaryKeyConstraint {
        schema: schema.to_string(),
        table: table.to_string(),
        name: Some(pk.name),
        columns: pk.columns,
    })
}

pub fn map_foreign_keys(schema: &str, table: &str, raw: Vec<RawForeignKey>) -> Vec<RelationshipEdge> {
    raw.into_iter()
        .map(|fk| RelationshipEdge {
            name: Some(fk.name),
            parent_schema: fk.referenced_schema,
            parent_table: fk.referenced_table,
            child_schema: schema.to_string(),
            child_table: table.to_string(),
            columns: fk
                .columns
                .into_iter()
                .zip(fk.referenced_columns)
                .map(|(child_column, parent_column)| ColumnPair {
                    child_column,
                    parent_column,
                })
                .collect(),
        })
        .collect()
}

pub fn map_indexes(schema: &str, table: &str, raw: Vec<RawIndex>) -> Vec<IndexConstraint> {
    raw.into_iter()
        .map(|index| IndexConstraint {
            schema: schema.to_string(),
            table: table.to_string(),
            name: index.name,
            columns: index.columns,
            is_unique: index.is_unique,
            is_primary_key: index.is_primary,
        })
        .collect()
}
