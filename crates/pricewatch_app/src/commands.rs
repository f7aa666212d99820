//! One-shot commands against the tracker service: catalogue, settings and test scrapes.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{bail, Context, Result};
use pricewatch_core::{store_display_name, KNOWN_STORES};
use pricewatch_engine::{Product, ProductUpdate, Settings, TestOutcome, TrackerApi};
use pricewatch_logging::pw_info;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductStats {
    pub total: usize,
    pub active: usize,
    pub per_store: BTreeMap<String, usize>,
}

impl ProductStats {
    pub fn collect(products: &[Product]) -> Self {
        let mut stats = Self {
            total: products.len(),
            ..Self::default()
        };
        for product in products {
            if product.active {
                stats.active += 1;
            }
            *stats.per_store.entry(product.store.clone()).or_default() += 1;
        }
        stats
    }
}

/// Case-insensitive substring match on name, id or store.
pub fn filter_products<'a>(products: &'a [Product], search: Option<&str>) -> Vec<&'a Product> {
    let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
    products
        .iter()
        .filter(|product| {
            needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.id.to_lowercase().contains(&needle)
                || product.store.to_lowercase().contains(&needle)
        })
        .collect()
}

pub async fn list_products(api: &dyn TrackerApi, search: Option<&str>, out: &mut dyn Write) -> Result<()> {
    let products = api.list_products().await.context("Failed to load products")?;
    let shown = filter_products(&products, search);
    for product in &shown {
        let pack = product
            .pack_size
            .map(|size| format!(" (pack of {size})"))
            .unwrap_or_default();
        writeln!(
            out,
            "{} {:<12} {:<28} {}{}",
            if product.active { "*" } else { " " },
            store_display_name(&product.store),
            product.id,
            product.name,
            pack
        )?;
    }

    let stats = ProductStats::collect(&products);
    let per_store = stats
        .per_store
        .iter()
        .map(|(store, count)| format!("{}: {count}", store_display_name(store)))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(
        out,
        "{} shown, {} total, {} active{}{}",
        shown.len(),
        stats.total,
        stats.active,
        if per_store.is_empty() { "" } else { " | " },
        per_store
    )?;
    Ok(())
}

pub async fn add_product(api: &dyn TrackerApi, product: Product, out: &mut dyn Write) -> Result<()> {
    let created = api.create_product(&product).await.context("Failed to add product")?;
    pw_info!("Created product {}", created.id);
    writeln!(out, "Product added successfully: {}", created.id)?;
    Ok(())
}

pub async fn update_product(
    api: &dyn TrackerApi,
    id: &str,
    update: ProductUpdate,
    out: &mut dyn Write,
) -> Result<()> {
    if update.is_empty() {
        bail!("Nothing to update for product {id}");
    }
    let updated = api
        .update_product(id, &update)
        .await
        .with_context(|| format!("Failed to update product {id}"))?;
    writeln!(out, "Product updated successfully: {}", updated.id)?;
    Ok(())
}

pub async fn toggle_product(api: &dyn TrackerApi, id: &str, active: bool, out: &mut dyn Write) -> Result<()> {
    api.toggle_product(id, active)
        .await
        .with_context(|| format!("Failed to toggle product {id}"))?;
    writeln!(
        out,
        "Product {id} {}",
        if active { "activated" } else { "deactivated" }
    )?;
    Ok(())
}

pub async fn delete_product(api: &dyn TrackerApi, id: &str, out: &mut dyn Write) -> Result<()> {
    api.delete_product(id)
        .await
        .with_context(|| format!("Failed to delete product {id}"))?;
    writeln!(out, "Product deleted successfully: {id}")?;
    Ok(())
}

pub async fn show_settings(api: &dyn TrackerApi, out: &mut dyn Write) -> Result<()> {
    let settings = api.settings().await.context("Failed to load settings")?;
    write_settings(&settings, out)
}

/// Lower-cases and dedupes store keys, rejecting any the scraper has no support for.
pub fn validate_stores(stores: &[String]) -> Result<Vec<String>> {
    let mut valid: Vec<String> = Vec::with_capacity(stores.len());
    let mut unknown = Vec::new();
    for store in stores {
        let key = store.trim().to_lowercase();
        if !KNOWN_STORES.contains(&key.as_str()) {
            unknown.push(store.as_str());
        } else if !valid.contains(&key) {
            valid.push(key);
        }
    }
    if !unknown.is_empty() {
        bail!(
            "Unknown store(s): {}. Known stores: {}",
            unknown.join(", "),
            KNOWN_STORES.join(", ")
        );
    }
    Ok(valid)
}

pub async fn set_stores(api: &dyn TrackerApi, stores: Vec<String>, out: &mut dyn Write) -> Result<()> {
    let stores = validate_stores(&stores)?;
    let saved = api
        .save_settings(&Settings {
            enabled_stores: stores,
        })
        .await
        .context("Failed to save settings")?;
    writeln!(out, "Settings saved successfully")?;
    write_settings(&saved, out)
}

fn write_settings(settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let names = settings
        .enabled_stores
        .iter()
        .map(|store| store_display_name(store))
        .collect::<Vec<_>>();
    if names.is_empty() {
        writeln!(out, "Enabled stores: none")?;
    } else {
        writeln!(out, "Enabled stores: {}", names.join(", "))?;
    }
    Ok(())
}

/// Runs a one-off scrape of a product; with `save` the reading is stored as history.
pub async fn test_product(api: &dyn TrackerApi, id: &str, save: bool, out: &mut dyn Write) -> Result<()> {
    let outcome = api
        .test_product(id)
        .await
        .with_context(|| format!("Failed to test product {id}"))?;
    let data = match outcome {
        TestOutcome::Success { data } => data,
        TestOutcome::Error { error } => bail!("Test scrape failed: {error}"),
    };

    writeln!(out, "{} @ {}", data.product_name, store_display_name(&data.store))?;
    writeln!(out, "  price: {:.2} {}", data.extracted_price, data.currency)?;
    if let Some(raw) = &data.raw_weight {
        writeln!(out, "  weight: {raw}")?;
    }
    if let (Some(price), Some(unit)) = (data.unit_price, &data.standard_unit) {
        writeln!(out, "  unit price: {price:.2} / {unit}")?;
    }

    if save {
        api.save_reading(&data.into_reading())
            .await
            .context("Failed to save reading")?;
        writeln!(out, "Reading saved to history")?;
    }
    Ok(())
}
