mod parser;

use super::domain::NewCompanyProduct;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use parser::ParsedRow;

/// Header and sample rows offered to companies as a starting point.
const TEMPLATE: &str = "product_name,category,material,size,batch_no,manufacture_date,price
Laptop,Electronics,Metal,15,BATCH001,2025-01-01,75000
Phone,Electronics,Glass,6.1,BATCH002,2025-01-05,45000
Monitor,Electronics,Plastic,24,BATCH003,2025-01-10,25000
";

pub fn csv_template() -> &'static str {
    TEMPLATE
}

#[derive(Debug, thiserror::Error)]
pub enum ProductImportError {
    #[error("failed to read product file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid product CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file '{0}': only .csv uploads are accepted")]
    UnsupportedFile(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

/// Outcome of a bulk import: every row either became a draft or was rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub products: Vec<NewCompanyProduct>,
    pub rejected: Vec<RowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct ProductImporter;

impl ProductImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        company_email: &str,
    ) -> Result<ImportReport, ProductImportError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(ProductImportError::UnsupportedFile(
                path.display().to_string(),
            ));
        }

        let file = std::fs::File::open(path)?;
        Self::from_reader(file, company_email)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        company_email: &str,
    ) -> Result<ImportReport, ProductImportError> {
        let mut report = ImportReport::default();

        for row in parser::parse_rows(reader, company_email)? {
            match row {
                ParsedRow::Valid(product) => report.products.push(product),
                ParsedRow::Invalid { line, reason } => {
                    report.rejected.push(RowError { line, reason })
                }
            }
        }

        Ok(report)
    }
}
