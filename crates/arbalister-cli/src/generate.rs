//! Random people records.

use std::sync::Arc;

use arbalister_core::Table;
use arrow::array::{ArrayRef, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Builder;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloe", "Dmitri", "Elena", "Farah", "Gustav", "Hana", "Ivan", "Julia",
    "Kenji", "Leila", "Marco", "Nadia", "Oscar", "Priya", "Quentin", "Rosa", "Samir", "Tessa",
    "Umar", "Vera", "Wendell", "Ximena", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Baptiste", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad",
    "Ito", "Jensen", "Kowalski", "Lambert", "Moreau", "Nakamura", "Okafor", "Petrov", "Quinn",
    "Rossi", "Schmidt", "Tanaka", "Ueda", "Varga", "Weber", "Yilmaz", "Zhang",
];

const STREETS: &[&str] = &[
    "Maple Avenue", "Oak Street", "Pine Road", "Cedar Lane", "Elm Drive", "Birch Court",
    "Willow Way", "Harbor Boulevard", "Mill Road", "Station Street",
];

const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Riverside", "CA"),
    ("Franklin", "TN"),
    ("Greenville", "SC"),
    ("Bristol", "CT"),
    ("Madison", "WI"),
    ("Salem", "OR"),
    ("Georgetown", "TX"),
    ("Clinton", "IA"),
    ("Fairview", "NJ"),
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn person_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: u32 = rng.random_range(1..=9999);
    let street = pick(rng, STREETS);
    let (city, state) = CITIES.choose(rng).copied().unwrap_or(("Springfield", "IL"));
    let zip: u32 = rng.random_range(1000..=99999);
    format!("{number} {street}, {city}, {state} {zip:05}")
}

/// Generate `num_rows` random people with columns `name`, `address`, `age`
/// and `id`.
pub fn generate_table(num_rows: usize) -> Result<Table, ArrowError> {
    generate_table_with(&mut rand::rng(), num_rows)
}

/// Same as [`generate_table`] with an explicit random source.
pub fn generate_table_with<R: Rng + ?Sized>(
    rng: &mut R,
    num_rows: usize,
) -> Result<Table, ArrowError> {
    let mut names = StringBuilder::new();
    let mut addresses = StringBuilder::new();
    let mut ages = Int64Builder::with_capacity(num_rows);
    let mut ids = StringBuilder::new();

    for _ in 0..num_rows {
        names.append_value(person_name(rng));
        addresses.append_value(address(rng));
        ages.append_value(rng.random_range(0..=99));
        ids.append_value(Builder::from_random_bytes(rng.random()).into_uuid().to_string());
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("address", DataType::Utf8, false),
        Field::new("age", DataType::Int64, false),
        Field::new("id", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(names.finish()),
        Arc::new(addresses.finish()),
        Arc::new(ages.finish()),
        Arc::new(ids.finish()),
    ];

    Ok(Table::from_batch(RecordBatch::try_new(schema, columns)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{AsArray, Int64Array};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn five_rows_with_expected_columns() -> TestResult {
        let table = generate_table(5)?;

        assert_eq!(table.num_rows(), 5);
        assert_eq!(table.column_names(), vec!["name", "address", "age", "id"]);
        Ok(())
    }

    #[test]
    fn values_are_well_formed() -> TestResult {
        let table = generate_table(200)?;
        let batch = table.to_single_batch()?;

        let ages = batch
            .column_by_name("age")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .ok_or("age column is not Int64")?;
        assert!(ages.iter().flatten().all(|age| (0..=99).contains(&age)));

        let ids = batch.column_by_name("id").ok_or("no id column")?.as_string::<i32>();
        for id in ids.iter().flatten() {
            let parsed = Uuid::parse_str(id)?;
            assert_eq!(parsed.get_version_num(), 4);
        }

        let addresses = batch
            .column_by_name("address")
            .ok_or("no address column")?
            .as_string::<i32>();
        assert!(addresses.iter().flatten().all(|a| !a.contains('\n')));

        let names = batch.column_by_name("name").ok_or("no name column")?.as_string::<i32>();
        assert!(names.iter().flatten().all(|n| n.split(' ').count() == 2));
        Ok(())
    }

    #[test]
    fn zero_rows_keeps_schema() -> TestResult {
        let table = generate_table(0)?;
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 4);
        Ok(())
    }

    #[test]
    fn seeded_source_is_reproducible() -> TestResult {
        let a = generate_table_with(&mut StdRng::seed_from_u64(7), 10)?;
        let b = generate_table_with(&mut StdRng::seed_from_u64(7), 10)?;
        assert_eq!(a.to_single_batch()?, b.to_single_batch()?);
        Ok(())
    }
}
