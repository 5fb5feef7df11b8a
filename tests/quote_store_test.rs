use anyhow::Result;
use chrono::Utc;
use tempfile::TempDir;

use renoquote::domain::model::{PaymentMethod, Quote};
use renoquote::{LocalStorage, QuoteStore};

fn quote(area: f64) -> Quote {
    Quote {
        area_sqm: area,
        style_id: "std".to_string(),
        style_name: "Стандарт".to_string(),
        total_cost: area * 15_000.0,
        estimated_days: 42,
        payment_method: PaymentMethod::Full,
        installment_months: None,
        created_at: Utc::now(),
    }
}

/// The calculator saves, the financing flow loads, through a separate store
/// instance — the equivalent of navigating between pages.
#[tokio::test]
async fn last_quote_survives_across_store_instances() -> Result<()> {
    let dir = TempDir::new()?;

    let calculator_side = QuoteStore::new(LocalStorage::new(dir.path()));
    let q = quote(60.0);
    calculator_side.save_last_quote(&q).await?;

    let financing_side = QuoteStore::new(LocalStorage::new(dir.path()));
    let loaded = financing_side.load_last_quote().await.unwrap();
    assert_eq!(loaded.total_cost, q.total_cost);
    assert_eq!(loaded.estimated_days, q.estimated_days);
    assert_eq!(loaded.style_id, q.style_id);
    assert_eq!(loaded.payment_method, q.payment_method);
    Ok(())
}

#[tokio::test]
async fn history_is_bounded_and_newest_first_on_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let store = QuoteStore::new(LocalStorage::new(dir.path()));

    for i in 1..=11 {
        store.append_quote_history(&quote(i as f64)).await?;
    }

    let reopened = QuoteStore::new(LocalStorage::new(dir.path()));
    let history = reopened.load_quote_history().await;
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].quote.area_sqm, 11.0);
    assert_eq!(history[9].quote.area_sqm, 2.0);
    Ok(())
}

#[tokio::test]
async fn corrupt_file_on_disk_reads_as_absent() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("last_quote.json"), "{\"area_sqm\": oops")?;

    let store = QuoteStore::new(LocalStorage::new(dir.path()));
    assert!(store.load_last_quote().await.is_none());

    // A fresh save recovers the slot
    store.save_last_quote(&quote(25.0)).await?;
    assert!(store.load_last_quote().await.is_some());
    Ok(())
}

#[tokio::test]
async fn saving_last_quote_does_not_touch_history() -> Result<()> {
    let dir = TempDir::new()?;
    let store = QuoteStore::new(LocalStorage::new(dir.path()));

    store.save_last_quote(&quote(30.0)).await?;
    assert!(store.load_quote_history().await.is_empty());
    assert!(!dir.path().join("quote_history.json").exists());
    Ok(())
}
