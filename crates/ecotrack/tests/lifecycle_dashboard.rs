use chrono::NaiveDate;
use ecotrack::lifecycle::{
    classify, csv_template, summarize, BucketScheme, LifecycleBucket, LifecycleStatus,
    ProductImporter, ProductRecord, RewardPolicy,
};
use rust_decimal::Decimal;

fn product(rfid: &str, price: Option<&str>, status: Option<&str>) -> ProductRecord {
    let mut record = ProductRecord::new(rfid);
    record.price = price.map(|p| p.parse::<Decimal>().expect("valid decimal"));
    record.status = status.map(LifecycleStatus::parse);
    record
}

fn mixed_catalog() -> Vec<ProductRecord> {
    vec![
        product("r1", Some("75000"), Some("Recycled")),
        product("r2", Some("19.99"), Some("Active")),
        product("r3", None, Some("Processing")),
        product("r4", Some("0.125"), Some("Pending Pickup")),
        product("r5", Some("310.10"), Some("Collected")),
        product("r6", Some("42"), None),
        product("r7", Some("8.33"), Some("Returned To Sender")),
        product("r8", Some("1200"), Some("Registered")),
    ]
}

#[test]
fn buckets_are_disjoint_and_cover_the_input() {
    let products = mixed_catalog();
    for scheme in [BucketScheme::Company, BucketScheme::Customer] {
        let classification = classify(&products, scheme);
        assert_eq!(classification.len(), products.len());

        let mut seen: Vec<&str> = LifecycleBucket::ordered()
            .into_iter()
            .flat_map(|bucket| classification.bucket(bucket).iter().map(|p| p.rfid.as_str()))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), products.len());
    }
}

#[test]
fn company_scheme_matches_published_mapping() {
    let products = mixed_catalog();
    let classification = classify(&products, BucketScheme::Company);
    let ids = |bucket: LifecycleBucket| {
        classification
            .bucket(bucket)
            .iter()
            .map(|p| p.rfid.as_str())
            .collect::<Vec<_>>()
    };

    assert_eq!(ids(LifecycleBucket::Active), vec!["r2", "r6", "r7", "r8"]);
    assert_eq!(ids(LifecycleBucket::InTransit), vec!["r4", "r5"]);
    assert_eq!(ids(LifecycleBucket::Completed), vec!["r1", "r3"]);
}

#[test]
fn summary_is_order_invariant() {
    let policy = RewardPolicy::default();
    let products = mixed_catalog();
    let baseline = summarize(&products, BucketScheme::Company, &policy);

    let mut reversed = products.clone();
    reversed.reverse();
    let mut rotated = products.clone();
    rotated.rotate_left(3);

    for shuffled in [reversed, rotated] {
        let summary = summarize(&shuffled, BucketScheme::Company, &policy);
        assert_eq!(summary.earned_reward, baseline.earned_reward);
        assert_eq!(summary.pending_reward, baseline.pending_reward);
        assert_eq!(summary.total, baseline.total);
    }
    assert_eq!(
        baseline.total,
        baseline.active + baseline.in_transit + baseline.completed
    );
}

#[test]
fn rewards_follow_the_flat_rate() {
    let policy = RewardPolicy::default();
    let summary = summarize(&mixed_catalog(), BucketScheme::Company, &policy);
    // Completed: 75000 and an unpriced product.
    assert_eq!(summary.earned_reward, Decimal::new(900000, 2));
    // Pending: (19.99 + 0.125 + 310.10 + 42 + 8.33 + 1200) * 0.12 = 189.6654
    assert_eq!(summary.pending_reward, Decimal::new(18967, 2));

    let made = NaiveDate::from_ymd_opt(2020, 2, 29);
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    assert_eq!(
        policy.reward("Glass", Some(Decimal::new(75000, 0)), made, today),
        policy.reward("Plastic", Some(Decimal::new(75000, 0)), None, today)
    );
}

#[test]
fn template_rows_feed_the_dashboard() {
    let report = ProductImporter::from_reader(csv_template().as_bytes(), "acme@example.com")
        .expect("template parses");
    let products: Vec<ProductRecord> = report
        .products
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            let mut record = ProductRecord::new(format!("tag-{index}"));
            record.name = draft.name.clone();
            record.price = draft.price;
            record
        })
        .collect();

    let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
    assert_eq!(summary.active, 3);
    // (75000 + 45000 + 25000) * 0.12
    assert_eq!(summary.pending_reward, Decimal::new(17400, 0));
}

#[test]
fn extreme_prices_saturate_the_reward_totals() {
    let huge = "79000000000000000000000000000";
    let mut entries: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({ "rfid": format!("h{i}"), "price": huge, "currentStatus": "Recycled" })
        })
        .collect();
    entries.push(serde_json::json!({ "rfid": "live", "price": huge, "currentStatus": "Active" }));
    let products: Vec<ProductRecord> =
        serde_json::from_value(serde_json::Value::Array(entries)).expect("products decode");

    let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
    assert_eq!(summary.total, 11);
    assert_eq!(summary.completed, 10);
    assert_eq!(summary.earned_reward, Decimal::MAX);
    assert_eq!(
        summary.pending_reward,
        Decimal::from_str_exact("9480000000000000000000000000").expect("in range")
    );
    assert_eq!(summary.total_reward(), Decimal::MAX);

    let mut reversed = products.clone();
    reversed.reverse();
    assert_eq!(
        summarize(&reversed, BucketScheme::Company, &RewardPolicy::default()),
        summary
    );
}
