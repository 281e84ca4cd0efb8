use super::domain::ProductRecord;

/// Products whose name, RFID, category, or material contains `query`, ignoring case.
///
/// A blank query matches every product.
pub fn search<'a>(products: &'a [ProductRecord], query: &str) -> Vec<&'a ProductRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }

    products
        .iter()
        .filter(|product| {
            [
                &product.name,
                &product.rfid,
                &product.category,
                &product.material,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
