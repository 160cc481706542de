use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use rand::{Rng, RngCore};

use dataseed_core::ColumnSchema;

use crate::errors::GenerationError;
use crate::generators::{GeneratedValue, Generator, GeneratorContext};
use crate::matchers::DEFAULT_GENERATOR_KEY;

const DEFAULT_INT_MIN: i64 = 1;
const DEFAULT_INT_MAX: i64 = 100_000;
const DEFAULT_DECIMAL_MAX: f64 = 100_000.0;
const DEFAULT_SCALE: i32 = 2;
/// 2020-01-01T00:00:00Z
const BASE_EPOCH_SECONDS: i64 = 1_577_836_800;
const DATE_SPAN_DAYS: i64 = 5 * 365;
const SECONDS_PER_DAY: i64 = 86_400;
/// Printable ASCII range, space through tilde.
const PRINTABLE_FIRST: u8 = 0x20;
const PRINTABLE_LAST: u8 = 0x7e;
const PRINTABLE_COUNT: u64 = (PRINTABLE_LAST - PRINTABLE_FIRST + 1) as u64;

/// Built-in type-driven generators. The default generator is registered
/// separately.
pub fn generators() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(SequenceGenerator),
        Box::new(BoolGenerator),
        Box::new(IntegerGenerator),
        Box::new(DecimalGenerator),
        Box::new(UuidGenerator),
        Box::new(DateGenerator),
        Box::new(TimestampGenerator),
        Box::new(TimeGenerator),
        Box::new(BinaryGenerator),
    ]
}

/// Inclusive value range of an integer column type.
pub(crate) fn integer_bounds(column: &ColumnSchema) -> (i64, i64) {
    match column.base_type().as_str() {
        "tinyint" => (0, 255),
        "smallint" | "int2" | "smallserial" => (i16::MIN as i64, i16::MAX as i64),
        "bigint" | "int8" | "bigserial" => (i64::MIN, i64::MAX),
        _ => (i32::MIN as i64, i32::MAX as i64),
    }
}

/// Row counter that walks `1..=max`, then `0` down to `min`, then repeats,
/// so every value of the type is used once before any repeats.
pub(crate) fn sequence_value(row_index: u64, min: i64, max: i64) -> i64 {
    let span = (max as i128) - (min as i128) + 1;
    let position = (row_index as i128) % span;
    let value = if position < max as i128 {
        position + 1
    } else {
        max as i128 - position
    };
    value as i64
}

/// The `index`-th string of exactly `len` printable ASCII characters.
/// Wraps after all `95^len` strings have been produced.
pub(crate) fn printable_code(index: u64, len: u32) -> String {
    let mut rest = index % PRINTABLE_COUNT.pow(len);
    let mut chars = vec![' '; len as usize];
    for slot in chars.iter_mut().rev() {
        *slot = (PRINTABLE_FIRST + (rest % PRINTABLE_COUNT) as u8) as char;
        rest /= PRINTABLE_COUNT;
    }
    chars.into_iter().collect()
}

/// `{prefix}_{tag}` shortened to `max_length` characters.
///
/// The prefix is trimmed first, then the separator. The tag is cut only
/// when it alone exceeds the limit.
pub(crate) fn tagged_text(prefix: &str, tag: &str, max_length: Option<i32>) -> String {
    let limit = match max_length {
        Some(max) if max > 0 => max as usize,
        _ => return format!("{prefix}_{tag}"),
    };
    let tag_len = tag.chars().count();
    if tag_len >= limit {
        return tag.chars().take(limit).collect();
    }

    let room = limit - tag_len;
    let head: String = prefix.chars().take(room - 1).collect();
    if head.is_empty() {
        prefix.chars().take(room).chain(tag.chars()).collect()
    } else {
        format!("{head}_{tag}")
    }
}

struct SequenceGenerator;

impl Generator for SequenceGenerator {
    fn id(&self) -> &'static str {
        "sequence"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let (min, max) = integer_bounds(ctx.column);
        Ok(GeneratedValue::Int(sequence_value(ctx.row_index, min, max)))
    }
}

struct BoolGenerator;

impl Generator for BoolGenerator {
    fn id(&self) -> &'static str {
        "boolean"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        Ok(GeneratedValue::Bool(rng.random_bool(0.5)))
    }
}

struct IntegerGenerator;

impl Generator for IntegerGenerator {
    fn id(&self) -> &'static str {
        "integer"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let (type_min, type_max) = integer_bounds(ctx.column);
        let min = DEFAULT_INT_MIN.max(type_min);
        let max = DEFAULT_INT_MAX.min(type_max);
        Ok(GeneratedValue::Int(rng.random_range(min..=max)))
    }
}

struct DecimalGenerator;

impl Generator for DecimalGenerator {
    fn id(&self) -> &'static str {
        "decimal"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let scale = ctx.column.numeric_scale.unwrap_or(DEFAULT_SCALE).clamp(0, 6);
        let max = match ctx.column.numeric_precision {
            Some(precision) if precision > scale => {
                let digits = (precision - scale).min(9);
                (10f64.powi(digits) - 1.0).min(DEFAULT_DECIMAL_MAX)
            }
            Some(_) => 0.0,
            None => DEFAULT_DECIMAL_MAX,
        };
        let factor = 10f64.powi(scale);
        let raw = if max > 0.0 {
            rng.random_range(0.0..max)
        } else {
            rng.random_range(0.0..1.0)
        };
        Ok(GeneratedValue::Float((raw * factor).floor() / factor))
    }
}

struct UuidGenerator;

impl Generator for UuidGenerator {
    fn id(&self) -> &'static str {
        "uuid"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let value = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Ok(GeneratedValue::Uuid(value.to_string()))
    }
}

fn base_date() -> Result<NaiveDate, GenerationError> {
    DateTime::from_timestamp(BASE_EPOCH_SECONDS, 0)
        .map(|value| value.date_naive())
        .ok_or_else(|| GenerationError::Strategy("invalid base date".to_string()))
}

struct DateGenerator;

impl Generator for DateGenerator {
    fn id(&self) -> &'static str {
        "date"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let offset = rng.random_range(0..=DATE_SPAN_DAYS);
        Ok(GeneratedValue::Date(base_date()? + Duration::days(offset)))
    }
}

struct TimestampGenerator;

impl Generator for TimestampGenerator {
    fn id(&self) -> &'static str {
        "timestamp"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let offset = rng.random_range(0..DATE_SPAN_DAYS * SECONDS_PER_DAY);
        let value = DateTime::from_timestamp(BASE_EPOCH_SECONDS + offset, 0)
            .ok_or_else(|| GenerationError::Strategy("timestamp out of range".to_string()))?;
        Ok(GeneratedValue::Timestamp(value.naive_utc()))
    }
}

struct TimeGenerator;

impl Generator for TimeGenerator {
    fn id(&self) -> &'static str {
        "time"
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let seconds = rng.random_range(0..SECONDS_PER_DAY) as u32;
        let value = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .ok_or_else(|| GenerationError::Strategy("time out of range".to_string()))?;
        Ok(GeneratedValue::Time(value))
    }
}

struct BinaryGenerator;

impl Generator for BinaryGenerator {
    fn id(&self) -> &'static str {
        "binary"
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        let len = match ctx.column.max_length {
            Some(max) if max > 0 => (max as usize).min(16),
            _ => 16,
        };
        let mut bytes = vec![0u8; len];
        rng.fill_bytes(&mut bytes);
        Ok(GeneratedValue::Text(format!("\\x{}", hex::encode(bytes))))
    }
}

/// Fallback text generator.
///
/// Produces `{column}_{random hex}`; when the declared length is too short
/// the column name is trimmed so the random part survives. Columns of one or
/// two characters draw from the 95 printable ASCII characters.
pub struct DefaultStringGenerator;

impl Generator for DefaultStringGenerator {
    fn id(&self) -> &'static str {
        DEFAULT_GENERATOR_KEY
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedValue, GenerationError> {
        if let Some(len @ 1..=2) = ctx.column.max_length {
            let value: String = (0..len)
                .map(|_| rng.random_range(PRINTABLE_FIRST..=PRINTABLE_LAST) as char)
                .collect();
            return Ok(GeneratedValue::Text(value));
        }

        let tag = format!("{:08x}", rng.next_u32());
        Ok(GeneratedValue::Text(tagged_text(
            &ctx.column.name,
            &tag,
            ctx.column.max_length,
        )))
    }
}
