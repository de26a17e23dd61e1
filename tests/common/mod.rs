//! Shared fixtures for integration tests

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "Survey_Date,Age,Gender,Region,Industry,Job_Role,Work_Arrangement,Hours_Per_Week,Mental_Health_Status,Burnout_Level,Work_Life_Balance_Score,Physical_Health_Issues,Social_Isolation_Score,Salary_Range";

pub const GENDERS: [&str; 4] = ["Female", "Male", "Non-binary", "Prefer not to say"];
pub const REGIONS: [&str; 4] = ["Asia", "Europe", "North America", "Oceania"];
pub const INDUSTRIES: [&str; 3] = ["Finance", "Healthcare", "Technology"];
pub const ROLES: [&str; 3] = ["Analyst", "Engineer", "Manager"];
pub const ARRANGEMENTS: [&str; 3] = ["Hybrid", "Onsite", "Remote"];
/// `None` and the empty cell both read as missing.
pub const MENTAL: [&str; 5] = ["Anxiety", "Burnout", "Depression", "None", ""];
pub const PHYSICAL: [&str; 4] = ["Back Pain", "Eye Strain", "None", ""];
pub const SALARIES: [&str; 3] = ["$40K-60K", "$60K-80K", "$80K-100K"];

/// Write a synthetic three-class survey dataset of `rows` rows.
///
/// Labels follow hours worked and work-life balance, so the classes are
/// learnable; every categorical vocabulary is fully covered.
pub fn write_dataset(dir: &Path, rows: usize) -> PathBuf {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut csv = String::new();
    writeln!(csv, "{}", HEADER).unwrap();

    for i in 0..rows {
        let age = rng.gen_range(22..=65);
        let hours = rng.gen_range(30..=70);
        let balance = rng.gen_range(1..=5);
        let isolation = rng.gen_range(1..=5);
        let label = if hours >= 55 && balance <= 3 {
            "High"
        } else if hours <= 40 && balance >= 3 {
            "Low"
        } else {
            "Medium"
        };
        writeln!(
            csv,
            "2024-03-{:02},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            i % 28 + 1,
            age,
            GENDERS[i % GENDERS.len()],
            REGIONS[i % REGIONS.len()],
            INDUSTRIES[i % INDUSTRIES.len()],
            ROLES[i % ROLES.len()],
            ARRANGEMENTS[i % ARRANGEMENTS.len()],
            hours,
            MENTAL[i % MENTAL.len()],
            label,
            balance,
            PHYSICAL[i % PHYSICAL.len()],
            isolation,
            SALARIES[i % SALARIES.len()],
        )
        .unwrap();
    }

    let path = dir.join("remote_work_health.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

/// A valid prediction request body.
pub fn sample_request() -> serde_json::Value {
    serde_json::json!({
        "Gender": "Female",
        "Region": "Europe",
        "Industry": "Technology",
        "Job_Role": "Engineer",
        "Work_Arrangement": "Remote",
        "Mental_Health_Status": "Anxiety",
        "Physical_Health_Issues": "Back Pain",
        "Salary_Range": "$60K-80K",
        "Age": 45,
        "Hours_Per_Week": 40,
        "Work_Life_Balance_Score": 3.0,
        "Social_Isolation_Score": 2.0
    })
}
