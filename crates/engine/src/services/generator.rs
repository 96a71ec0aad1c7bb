use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

const LOCAL_PART_LEN: usize = 10;

/// Produces a fresh address on `domain`. The local part is the first ten
/// characters of a v4 UUID's dash-free hex form, which is already
/// lowercase alphanumeric. No collision check against live addresses:
/// TTL churn keeps the collision probability operationally negligible.
pub fn generate_address(domain: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}@{}", &token[..LOCAL_PART_LEN], domain)
}

/// Uniformly random decimal code, zero-padded to `length` digits.
pub fn generate_otp(length: u32) -> String {
    let bound = 10u64.pow(length);
    let code = rand::thread_rng().gen_range(0..bound);
    format!("{:0width$}", code, width = length as usize)
}

/// Current time plus `minutes`, in the wire-comparable UTC form.
pub fn expiry_time(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}
