use crate::commands::{render_company, render_customer, render_quote, render_summary};
use chrono::{Local, NaiveDate};
use ecotrack::error::AppError;
use ecotrack::lifecycle::pickup::status_counts;
use ecotrack::lifecycle::{
    classify, csv_template, summarize, BucketScheme, CompanyDashboardView,
    CustomerDashboardView, LifecycleBucket, LifecycleStatus, PickupRequest, PickupStatus,
    ProductImporter, ProductRecord, RewardPolicy,
};
use rust_decimal::Decimal;
use std::io::Cursor;

const DEMO_COMPANY: &str = "acme@example.com";
const DEMO_CUSTOMER: &str = "dana@example.com";

pub(crate) fn run_demo() -> Result<(), AppError> {
    let today = Local::now().date_naive();
    let policy = RewardPolicy::default();
    let products = sample_products(today);

    println!("EcoTrack demo ({} sample products)", products.len());

    for scheme in [BucketScheme::Company, BucketScheme::Customer] {
        println!("\n{scheme:?} view");
        render_summary(&summarize(&products, scheme, &policy));
    }

    let classification = classify(&products, BucketScheme::Company);
    println!("\nStill in transit for the issuer:");
    for product in classification.bucket(LifecycleBucket::InTransit) {
        println!("  - {} ({})", product.name, product.status_label());
    }

    println!("\nCustomer dashboard for {DEMO_CUSTOMER}");
    let owned: Vec<ProductRecord> = products
        .iter()
        .filter(|product| product.owner_email.as_deref() == Some(DEMO_CUSTOMER))
        .cloned()
        .collect();
    render_customer(&CustomerDashboardView::build(&owned, &policy));

    println!("\nCompany dashboard for {DEMO_COMPANY}, searching \"glass\"");
    let company = CompanyDashboardView::build(&products, &policy).with_search(&products, "glass");
    render_company(&company);

    if let Some(product) = products.iter().find(|product| product.is_claimable()) {
        println!("\nScanning {}", product.rfid);
        render_quote(&policy.estimate(product, today));
    }

    let report = ProductImporter::from_reader(Cursor::new(csv_template()), DEMO_COMPANY)?;
    println!(
        "\nCSV template parses into {} product draft(s) for {}",
        report.products.len(),
        DEMO_COMPANY
    );

    println!("\nPickups");
    for (status, count) in status_counts(&sample_pickups()) {
        println!("  - {}: {}", status.label(), count);
    }

    Ok(())
}

fn sample_products(today: NaiveDate) -> Vec<ProductRecord> {
    let made = today - chrono::Duration::days(150);
    let entries = [
        ("TAG-LAPTOP-01", "Laptop", "Metal", 75000, LifecycleStatus::Recycled, true),
        ("TAG-PHONE-02", "Phone", "Glass", 45000, LifecycleStatus::Collected, true),
        ("TAG-PHONE-03", "Phone", "Glass", 44000, LifecycleStatus::PendingPickup, true),
        ("TAG-MONITOR-04", "Monitor", "Plastic", 25000, LifecycleStatus::Active, false),
        (
            "TAG-TABLET-05",
            "Tablet",
            "Aluminium",
            30000,
            LifecycleStatus::Unrecognized("Refurbishing".into()),
            true,
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (rfid, name, material, price, status, owned))| {
            let mut product = ProductRecord::new(rfid)
                .with_price(Decimal::new(price, 0))
                .with_status(status);
            product.name = name.to_string();
            product.category = "Electronics".to_string();
            product.material = material.to_string();
            product.batch_number = format!("BATCH{:03}", index + 1);
            product.manufacture_date = Some(made);
            product.company_email = DEMO_COMPANY.to_string();
            if owned {
                product.owner_email = Some(DEMO_CUSTOMER.to_string());
                product.transaction_id = Some(format!("txn-{}", index + 1));
            }
            product
        })
        .collect()
}

fn sample_pickups() -> Vec<PickupRequest> {
    [
        ("p-1", PickupStatus::Completed),
        ("p-2", PickupStatus::Pending),
        ("p-3", PickupStatus::Pending),
    ]
    .into_iter()
    .map(|(id, status)| PickupRequest {
        id: id.to_string(),
        email: DEMO_CUSTOMER.to_string(),
        location: "Dock 4".to_string(),
        preferred_date: None,
        status,
    })
    .collect()
}
