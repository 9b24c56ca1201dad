use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use spendlens_core::{format_date, parse_amount, parse_date, Transaction};

/// Canonical fields and their header aliases, in mapping order. For each
/// canonical field the header row is scanned for an exact alias match first,
/// then for a containment match (header contains alias or alias contains
/// header); the first hit in list order wins, which is what breaks ties when
/// several headers could satisfy overlapping fields.
pub const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("date", &["date", "transaction date", "trans date", "posted date", "post date", "txn date", "created", "timestamp"]),
    ("vendor", &["vendor", "merchant", "payee", "description", "name", "merchant name", "store", "company", "from", "to"]),
    ("amount", &["amount", "total", "value", "sum", "price", "cost", "debit", "charge", "transaction amount"]),
    ("category", &["category", "type", "group", "classification", "expense type", "spending category"]),
    ("currency", &["currency", "curr", "ccy"]),
    ("description", &["description", "memo", "notes", "details", "reference", "note", "transaction description"]),
    ("institution", &["institution", "bank", "account", "source", "financial institution", "account name", "bank name", "card", "card name"]),
    ("credit", &["credit", "deposit", "income"]),
];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse delimited text with a header row into normalized transactions.
///
/// Malformed rows are logged and skipped, never fatal; a parse yielding zero
/// transactions is not an error. Rows whose amount resolves to zero are
/// dropped; rows with an unparsable date are kept as long as the amount is
/// non-zero.
pub fn parse(text: &str) -> Result<Vec<Transaction>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let header_map = map_headers(&headers);

    let mut transactions = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("skipping malformed CSV row: {e}");
                continue;
            }
        };
        if record.is_empty() {
            continue;
        }
        let txn = normalize_row(&record, &header_map);
        if txn.amount == Decimal::ZERO {
            tracing::debug!(raw = %txn.raw, "dropping zero-amount row");
            continue;
        }
        transactions.push(txn);
    }
    Ok(transactions)
}

/// Map canonical field names to column indexes against the normalized
/// (trimmed, lowercased) header row.
fn map_headers(headers: &[String]) -> HashMap<&'static str, usize> {
    let mut map = HashMap::new();
    for (canonical, aliases) in COLUMN_ALIASES {
        // Exact alias match first.
        let exact = headers
            .iter()
            .position(|h| aliases.contains(&h.as_str()));
        if let Some(idx) = exact {
            map.insert(*canonical, idx);
            continue;
        }
        // Containment fallback, headers outer / aliases inner.
        'headers: for (idx, header) in headers.iter().enumerate() {
            for alias in *aliases {
                if header.contains(alias) || alias.contains(header.as_str()) {
                    map.insert(*canonical, idx);
                    break 'headers;
                }
            }
        }
    }
    map
}

fn normalize_row(record: &csv::StringRecord, header_map: &HashMap<&'static str, usize>) -> Transaction {
    let get = |field: &str| -> &str {
        header_map
            .get(field)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .unwrap_or("")
    };

    // Prefer the signed amount column when it parses non-zero; otherwise a
    // separate credit column supplies the value as positive inflow.
    let mut amount = parse_amount(get("amount"));
    if amount == Decimal::ZERO {
        let credit = parse_amount(get("credit"));
        if credit != Decimal::ZERO {
            amount = credit;
        }
    }

    let date_source = get("date");
    let date = parse_date(date_source);

    let vendor = match (get("vendor"), get("description")) {
        ("", "") => "Unknown",
        ("", desc) => desc,
        (v, _) => v,
    };

    let institution = get("institution");
    let currency = get("currency");

    Transaction {
        date,
        date_str: date.map(format_date).unwrap_or_else(|| date_source.to_string()),
        vendor: vendor.to_string(),
        amount,
        category: None,
        source_category: get("category").to_string(),
        currency: if currency.is_empty() { "USD" } else { currency }.to_string(),
        description: get("description").to_string(),
        institution: if institution.is_empty() { "Unknown" } else { institution }.to_string(),
        raw: record.iter().collect::<Vec<_>>().join(","),
    }
}
