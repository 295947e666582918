use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const N_ROWS: usize = 506;
const OUTPUT_PATH: &str = "sample_housing.parquet";

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// One synthetic neighbourhood: 13 features and a price.
struct Row {
    crim: f64,
    zn: f64,
    indus: f64,
    chas: i64,
    nox: f64,
    rm: f64,
    age: f64,
    dis: f64,
    rad: f64,
    tax: f64,
    ptratio: f64,
    b: f64,
    lstat: f64,
    price: f64,
}

fn generate_row(rng: &mut ChaCha8Rng) -> Row {
    let crim = (gauss(rng, -1.0, 1.8)).exp().min(90.0);
    let zn = if rng.gen_bool(0.25) { rng.gen_range(12.5..100.0_f64).round() } else { 0.0 };
    let indus = rng.gen_range(0.5..28.0_f64);
    let chas = i64::from(rng.gen_bool(0.07));
    let nox = (0.38 + indus * 0.012 + gauss(rng, 0.0, 0.04)).clamp(0.38, 0.87);
    let rm = gauss(rng, 6.28, 0.7).clamp(3.5, 8.8);
    let age = rng.gen_range(3.0..100.0_f64);
    let dis = (12.0 - age * 0.1 + gauss(rng, 0.0, 1.0)).clamp(1.1, 12.1);
    let rad = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 24.0][rng.gen_range(0..9)];
    let tax = (190.0 + rad * 20.0 + gauss(rng, 80.0, 60.0)).clamp(187.0, 711.0);
    let ptratio = gauss(rng, 18.5, 2.1).clamp(12.6, 22.0);
    let b = (396.9 - gauss(rng, 0.0, 60.0).abs()).max(0.3);
    let lstat = (30.0 - (rm - 3.5) * 4.0 + gauss(rng, 0.0, 4.0)).clamp(1.7, 38.0);

    let price = 22.0 + 7.5 * (rm - 6.28) - 0.55 * (lstat - 12.6) - 0.9 * (ptratio - 18.5)
        - 18.0 * (nox - 0.55)
        - 0.08 * crim
        + 3.5 * chas as f64
        + 0.04 * (lstat - 12.6).powi(2)
        + gauss(rng, 0.0, 2.5);

    Row {
        crim,
        zn,
        indus,
        chas,
        nox,
        rm,
        age,
        dis,
        rad,
        tax,
        ptratio,
        b,
        lstat,
        price: price.clamp(5.0, 50.0),
    }
}

fn float_column(rows: &[Row], f: impl Fn(&Row) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
}

fn main() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let rows: Vec<Row> = (0..N_ROWS).map(|_| generate_row(&mut rng)).collect();

    let float_names = [
        "CRIM", "ZN", "INDUS", "NOX", "RM", "AGE", "DIS", "RAD", "TAX", "PTRATIO", "B", "LSTAT",
    ];
    let mut fields: Vec<Field> = Vec::with_capacity(14);
    for name in &float_names[..3] {
        fields.push(Field::new(*name, DataType::Float64, false));
    }
    fields.push(Field::new("CHAS", DataType::Int64, false));
    for name in &float_names[3..] {
        fields.push(Field::new(*name, DataType::Float64, false));
    }
    fields.push(Field::new("PRICE", DataType::Float64, false));
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<ArrayRef> = vec![
        float_column(&rows, |r| r.crim),
        float_column(&rows, |r| r.zn),
        float_column(&rows, |r| r.indus),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.chas).collect::<Vec<_>>())),
        float_column(&rows, |r| r.nox),
        float_column(&rows, |r| r.rm),
        float_column(&rows, |r| r.age),
        float_column(&rows, |r| r.dis),
        float_column(&rows, |r| r.rad),
        float_column(&rows, |r| r.tax),
        float_column(&rows, |r| r.ptratio),
        float_column(&rows, |r| r.b),
        float_column(&rows, |r| r.lstat),
        float_column(&rows, |r| r.price),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(OUTPUT_PATH).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    let n_river = rows.iter().filter(|r| r.chas == 1).count();
    println!("Wrote {N_ROWS} rows (13 features + PRICE, {n_river} with CHAS = 1) to {OUTPUT_PATH}");
    Ok(())
}
