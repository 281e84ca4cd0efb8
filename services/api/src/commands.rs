use crate::infra::{parse_date, parse_decimal};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use ecotrack::backend::{HttpBackendClient, RewardRequest};
use ecotrack::config::AppConfig;
use ecotrack::error::AppError;
use ecotrack::lifecycle::dashboard::ProductCardView;
use ecotrack::lifecycle::{
    csv_template, summarize, BucketScheme, CompanyDashboardView, CustomerDashboardView,
    DashboardSummary, LifecycleService, ProductImporter, ProductRecord, RewardPolicy,
    RewardQuote,
};
use ecotrack::session::{Role, Session};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

fn parse_scheme(raw: &str) -> Result<BucketScheme, String> {
    BucketScheme::parse(raw).ok_or_else(|| format!("unknown scheme '{raw}' (company|customer)"))
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// JSON file holding a product list, bare or as `{"products": [...]}`
    #[arg(long)]
    pub(crate) products: PathBuf,
    /// Bucket scheme used to classify statuses
    #[arg(long, default_value = "company", value_parser = parse_scheme)]
    pub(crate) scheme: BucketScheme,
}

#[derive(Args, Debug)]
pub(crate) struct CustomerDashboardArgs {
    /// Owner email to load products for
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args, Debug)]
pub(crate) struct CompanyDashboardArgs {
    /// Issuing company email
    #[arg(long)]
    pub(crate) email: String,
    /// Only list products whose name, RFID, category, or material matches
    #[arg(long)]
    pub(crate) search: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RewardEstimateArgs {
    /// Product price
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) price: Decimal,
    #[arg(long, default_value = "")]
    pub(crate) material: String,
    /// Manufacture date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) manufacture_date: Option<NaiveDate>,
    /// Reference date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct RewardQuoteArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) price: Decimal,
    #[arg(long, default_value = "")]
    pub(crate) material: String,
    #[arg(long, value_parser = parse_date)]
    pub(crate) manufacture_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportValidateArgs {
    /// CSV file to validate
    pub(crate) path: PathBuf,
    /// Company the products would be registered for
    #[arg(long)]
    pub(crate) company_email: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductFile {
    Bare(Vec<ProductRecord>),
    Wrapped { products: Vec<ProductRecord> },
}

pub(crate) fn load_products(raw: &str) -> Result<Vec<ProductRecord>, AppError> {
    let file: ProductFile = serde_json::from_str(raw)?;
    Ok(match file {
        ProductFile::Bare(products) | ProductFile::Wrapped { products } => products,
    })
}

fn live_service(
    config: &AppConfig,
) -> Result<LifecycleService<HttpBackendClient>, AppError> {
    let client = HttpBackendClient::new(&config.backend)?;
    Ok(LifecycleService::new(
        Arc::new(client),
        RewardPolicy::from_config(&config.rewards),
    ))
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.products)?;
    let products = load_products(&raw)?;
    let summary = summarize(
        &products,
        args.scheme,
        &RewardPolicy::from_config(&config.rewards),
    );

    println!(
        "Lifecycle summary for {} ({:?} scheme)",
        args.products.display(),
        args.scheme
    );
    render_summary(&summary);
    Ok(())
}

pub(crate) async fn run_customer_dashboard(args: CustomerDashboardArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = live_service(&config)?;
    let session = Session::new(args.email, Role::Customer);
    let view = service.customer_dashboard(&session).await?;

    println!("Customer dashboard for {}", session.identity());
    render_customer(&view);
    Ok(())
}

pub(crate) async fn run_company_dashboard(args: CompanyDashboardArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = live_service(&config)?;
    let session = Session::new(args.email, Role::Company);
    let view = service
        .company_dashboard(&session, args.search.as_deref())
        .await?;

    println!("Company dashboard for {}", session.identity());
    render_company(&view);
    Ok(())
}

pub(crate) fn run_reward_estimate(args: RewardEstimateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = RewardPolicy::from_config(&config.rewards);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let mut product = ProductRecord::new("cli-estimate").with_price(args.price);
    product.material = args.material;
    product.manufacture_date = args.manufacture_date;

    render_quote(&policy.estimate(&product, today));
    Ok(())
}

pub(crate) async fn run_reward_quote(args: RewardQuoteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = live_service(&config)?;
    let request = RewardRequest {
        material: args.material,
        price: args.price,
        manufacture_date: args.manufacture_date,
        added_date: Utc::now(),
    };

    render_quote(&service.quote_reward(&request).await?);
    Ok(())
}

pub(crate) fn run_import_validate(args: ImportValidateArgs) -> Result<(), AppError> {
    let report = ProductImporter::from_path(&args.path, &args.company_email)?;

    println!(
        "{}: {} valid product(s), {} rejected row(s)",
        args.path.display(),
        report.products.len(),
        report.rejected.len()
    );
    for product in &report.products {
        let price = product
            .price
            .map(|price| price.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  + {} [{}] {} | batch {} | made {} | price {}",
            product.name,
            product.category,
            product.material,
            product.batch_number,
            product.manufacture_date,
            price
        );
    }
    for row in &report.rejected {
        println!("  ! line {}: {}", row.line, row.reason);
    }
    Ok(())
}

pub(crate) fn run_import_template() -> Result<(), AppError> {
    print!("{}", csv_template());
    Ok(())
}

pub(crate) fn render_summary(summary: &DashboardSummary) {
    println!("- {} product(s)", summary.total);
    for entry in summary.bucket_counts() {
        println!("  - {}: {}", entry.bucket_label, entry.count);
    }
    println!(
        "- Rewards: {} earned | {} pending | {} total",
        summary.earned_reward,
        summary.pending_reward,
        summary.total_reward()
    );
}

pub(crate) fn render_customer(view: &CustomerDashboardView) {
    println!(
        "- {} registered | {} pending pickup | {} collected",
        view.registered_products, view.pending_pickup, view.collected
    );
    println!(
        "- Rewards: {} earned | {} pending",
        view.earned_rewards, view.pending_rewards
    );
    render_cards("Products", &view.products);
}

pub(crate) fn render_company(view: &CompanyDashboardView) {
    println!(
        "- {} total | {} active | {} in market | {} collected | {} in lifecycle",
        view.total_products,
        view.active_products,
        view.in_market,
        view.collected,
        view.in_lifecycle
    );
    render_cards("Recent products", &view.recent_products);
    if view.matching_products.len() != view.total_products {
        render_cards("Search results", &view.matching_products);
    }
}

fn render_cards(title: &str, cards: &[ProductCardView]) {
    if cards.is_empty() {
        return;
    }
    println!("{title}:");
    for card in cards {
        println!(
            "  - {} ({}) | {} | {}",
            card.name, card.rfid, card.material, card.status_label
        );
    }
}

pub(crate) fn render_quote(quote: &RewardQuote) {
    let days = quote
        .days_difference
        .map(|days| format!(" | {days} day(s) since manufacture"))
        .unwrap_or_default();
    println!(
        "{} reward: {} points for {} at {}{}",
        quote.source.label(),
        quote.reward_points,
        if quote.material.is_empty() {
            "product"
        } else {
            quote.material.as_str()
        },
        quote.price,
        days
    );
}
