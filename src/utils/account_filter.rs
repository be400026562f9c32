use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected account count and false-positive rate.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

// Probabilistic "is this username taken" probe consulted before the
// authoritative DB check when admins provision accounts.
static ACCOUNT_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Check if a username might exist (false positives possible).
pub fn might_exist(username: &str) -> bool {
    let username = normalize(username);
    ACCOUNT_FILTER
        .read()
        .expect("account filter poisoned")
        .contains(&username)
}

pub fn insert(username: &str) {
    let username = normalize(username);
    ACCOUNT_FILTER
        .write()
        .expect("account filter poisoned")
        .add(&username);
}

pub fn remove(username: &str) {
    let username = normalize(username);
    ACCOUNT_FILTER
        .write()
        .expect("account filter poisoned")
        .remove(&username);
}

/// Warm up the filter from the users table using streaming + batching.
pub async fn warmup_account_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT username FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (username,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&username));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Account filter warmup complete: {} accounts", total);
    Ok(())
}

fn insert_batch(usernames: &[String]) {
    let mut filter = ACCOUNT_FILTER.write().expect("account filter poisoned");

    for username in usernames {
        filter.add(username);
    }
}
