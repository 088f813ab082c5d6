use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One practice in the published dataset's column layout.
#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Practice_code")]
    practice_code: String,
    #[serde(rename = "Practice_name")]
    practice_name: String,
    #[serde(rename = "Postcode")]
    postcode: String,
    #[serde(rename = "Address1")]
    address1: String,
    #[serde(rename = "Address2")]
    address2: String,
    #[serde(rename = "Address3")]
    address3: String,
    #[serde(rename = "TelNum")]
    tel_num: String,
    #[serde(rename = "Y")]
    lat: Option<f64>,
    #[serde(rename = "X")]
    lng: Option<f64>,
    #[serde(rename = "Achievement_2021_22")]
    achievement: Option<f64>,
    #[serde(rename = "Achievement_Score_2021_22")]
    achievement_score: Option<f64>,
    #[serde(rename = "COPD008_Patients_receiving_Intervention_percentage")]
    intervention: Option<f64>,
    #[serde(rename = "COPD010_Patients_receiving_Intervention_percentage")]
    review: Option<f64>,
    #[serde(rename = "Prevalence_2021_22")]
    prevalence: Option<f64>,
    #[serde(rename = "Register_2021_22")]
    register: Option<i64>,
    #[serde(rename = "List_size_2021_22")]
    list_size: Option<i64>,
    #[serde(rename = "PCA_Rate_2021_22")]
    pca_rate: Option<f64>,
    #[serde(rename = "Sub_ICB_Loc_name")]
    sub_icb: String,
    #[serde(rename = "NHSE Region Name")]
    region: String,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `Some(value)` except for roughly `missing` of the draws.
    fn sometimes<T>(&mut self, missing: f64, value: T) -> Option<T> {
        (self.next_f64() >= missing).then_some(value)
    }
}

struct Area {
    outward: &'static str,
    centre: (f64, f64),
    town: &'static str,
    sub_icb: &'static str,
    region: &'static str,
}

const AREAS: &[Area] = &[
    Area {
        outward: "EC1",
        centre: (51.5235, -0.0990),
        town: "london",
        sub_icb: "NHS North Central London ICB - 93C",
        region: "London",
    },
    Area {
        outward: "SW1",
        centre: (51.4975, -0.1357),
        town: "london",
        sub_icb: "NHS North West London ICB - W2U3Z",
        region: "London",
    },
    Area {
        outward: "M1",
        centre: (53.4794, -2.2382),
        town: "manchester",
        sub_icb: "NHS Greater Manchester ICB - 14L",
        region: "North West",
    },
    Area {
        outward: "LS1",
        centre: (53.7974, -1.5438),
        town: "leeds",
        sub_icb: "NHS West Yorkshire ICB - 15F",
        region: "North East and Yorkshire",
    },
];

const STREETS: &[&str] = &["high street", "city road", "church lane", "station road", "park view"];
const KINDS: &[&str] = &["medical centre", "surgery", "health centre", "practice"];

fn generate_rows(rng: &mut SimpleRng, per_area: usize) -> Vec<SampleRow> {
    let letters: &[u8] = b"ABDEFGHJLNPQRSTUWXYZ";
    let mut rows = Vec::new();

    for (a, area) in AREAS.iter().enumerate() {
        for i in 0..per_area {
            let n = rows.len();
            let street = rng.pick(STREETS);
            let kind = rng.pick(KINDS);
            let district = if area.outward.len() == 3 { "A" } else { "" };
            let unit = [rng.pick(letters) as char, rng.pick(letters) as char];
            let postcode = format!(
                "{}{district}{}{}{}",
                area.outward.to_lowercase(),
                i % 9 + 1,
                unit[0],
                unit[1]
            );

            let lat = area.centre.0 + rng.range(-0.01, 0.01);
            let lng = area.centre.1 + rng.range(-0.015, 0.015);
            let achievement = rng.range(55.0, 100.0);
            let intervention = rng.range(40.0, 95.0);
            let review = rng.range(50.0, 98.0);
            let pca_rate = rng.range(0.0, 12.0);
            let register = rng.range(40.0, 400.0) as i64;
            let list_size = register * rng.range(40.0, 90.0) as i64;

            rows.push(SampleRow {
                practice_code: format!("{}{:05}", (b'A' + a as u8) as char, 83000 + n),
                practice_name: format!("{street} {kind}"),
                postcode,
                address1: format!("{} {street}", 1 + rng.next_u64() % 200),
                address2: if i % 3 == 0 { "NA".to_string() } else { String::new() },
                address3: area.town.to_string(),
                tel_num: format!(" 0{} {:03} {:04} ", 20 + a, rng.next_u64() % 1000, rng.next_u64() % 10000),
                lat: rng.sometimes(0.08, lat),
                lng: rng.sometimes(0.04, lng),
                achievement: rng.sometimes(0.1, achievement),
                achievement_score: Some(achievement * 0.35),
                intervention: rng.sometimes(0.15, intervention),
                review: rng.sometimes(0.15, review),
                prevalence: Some(rng.range(0.6, 3.2)),
                register: rng.sometimes(0.05, register),
                list_size: Some(list_size),
                pca_rate: rng.sometimes(0.2, pca_rate),
                sub_icb: area.sub_icb.to_string(),
                region: area.region.to_string(),
            });
        }
    }
    rows
}

fn write_csv(rows: &[SampleRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &str) -> Result<()> {
    fn strings(rows: &[SampleRow], f: impl Fn(&SampleRow) -> &str) -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    }
    fn floats(rows: &[SampleRow], f: impl Fn(&SampleRow) -> Option<f64>) -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    }
    fn ints(rows: &[SampleRow], f: impl Fn(&SampleRow) -> Option<i64>) -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("Practice_code", strings(rows, |r| r.practice_code.as_str())),
        ("Practice_name", strings(rows, |r| r.practice_name.as_str())),
        ("Postcode", strings(rows, |r| r.postcode.as_str())),
        ("Address1", strings(rows, |r| r.address1.as_str())),
        ("Address2", strings(rows, |r| r.address2.as_str())),
        ("Address3", strings(rows, |r| r.address3.as_str())),
        ("TelNum", strings(rows, |r| r.tel_num.as_str())),
        ("Y", floats(rows, |r| r.lat)),
        ("X", floats(rows, |r| r.lng)),
        ("Achievement_2021_22", floats(rows, |r| r.achievement)),
        ("Achievement_Score_2021_22", floats(rows, |r| r.achievement_score)),
        ("COPD008_Patients_receiving_Intervention_percentage", floats(rows, |r| r.intervention)),
        ("COPD010_Patients_receiving_Intervention_percentage", floats(rows, |r| r.review)),
        ("Prevalence_2021_22", floats(rows, |r| r.prevalence)),
        ("Register_2021_22", ints(rows, |r| r.register)),
        ("List_size_2021_22", ints(rows, |r| r.list_size)),
        ("PCA_Rate_2021_22", floats(rows, |r| r.pca_rate)),
        ("Sub_ICB_Loc_name", strings(rows, |r| r.sub_icb.as_str())),
        ("NHSE Region Name", strings(rows, |r| r.region.as_str())),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| {
                let nullable = !matches!(array.data_type(), DataType::Utf8);
                Field::new(*name, array.data_type().clone(), nullable)
            })
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 12);

    let csv_path = "sample_full_data.csv";
    let parquet_path = "sample_full_data.parquet";
    write_csv(&rows, csv_path)?;
    write_parquet(&rows, parquet_path)?;

    let missing = rows.iter().filter(|r| r.lat.is_none() || r.lng.is_none()).count();
    log::info!("{missing} practices were generated without coordinates");
    println!(
        "Wrote {} practices across {} areas to {csv_path} and {parquet_path}",
        rows.len(),
        AREAS.len()
    );
    Ok(())
}
