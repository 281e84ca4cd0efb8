use super::super::domain::{parse_calendar_date, parse_price, NewCompanyProduct};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedRow {
    Valid(NewCompanyProduct),
    Invalid { line: u64, reason: String },
}

pub(crate) fn parse_rows<R: Read>(
    reader: R,
    company_email: &str,
) -> Result<Vec<ParsedRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();

        match record.deserialize::<ProductRow>(Some(&headers)) {
            Ok(row) => rows.push(row.into_parsed(line, company_email)),
            Err(err) => rows.push(ParsedRow::Invalid {
                line,
                reason: err.to_string(),
            }),
        }
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    product_name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    material: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    batch_no: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    manufacture_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
}

impl ProductRow {
    fn into_parsed(self, line: u64, company_email: &str) -> ParsedRow {
        match self.validate(company_email) {
            Ok(product) => ParsedRow::Valid(product),
            Err(reason) => ParsedRow::Invalid { line, reason },
        }
    }

    fn validate(self, company_email: &str) -> Result<NewCompanyProduct, String> {
        if self.product_name.is_empty() {
            return Err("product_name is required".to_string());
        }

        let manufacture_date = match self.manufacture_date.as_deref() {
            Some(raw) => parse_calendar_date(raw)
                .ok_or_else(|| format!("manufacture_date '{raw}' is not a date"))?,
            None => return Err("manufacture_date is required".to_string()),
        };

        let price = match self.price.as_deref() {
            Some(raw) => parse_price(raw).map_err(|_| format!("price '{raw}' is not a number"))?,
            None => None,
        };

        Ok(NewCompanyProduct {
            company_email: company_email.to_string(),
            name: self.product_name,
            category: self.category,
            material: self.material,
            size: self.size,
            batch_number: self.batch_no,
            price,
            manufacture_date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
