//! Daily currency/salary scrape feeding the rate-calculation worksheets.
//!
//! USD/EUR/BYN come from the central bank's daily XML feed; the average
//! salary figure comes from a market stats page. Both land in fixed columns
//! (G/H/I/J) of all six rate-calculation tabs, which the intake pipeline
//! then range-searches.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::sheets::store::fill_column;
use crate::sheets::{tabs, SheetsClient, SheetsError};
use crate::state::AppState;

const CBR_DAILY_URL: &str = "https://www.cbr.ru/scripts/XML_daily.asp";
const SALARY_PAGE_URL: &str = "https://myfin.by/info/srednyaya-zarplata";

/// Column layout of the rate-calculation worksheets.
const BYN_COLUMN: &str = "G";
const USD_COLUMN: &str = "H";
const EUR_COLUMN: &str = "I";
const SALARY_COLUMN: &str = "J";

const UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Pause between column writes to stay inside the Sheets write quota.
const WRITE_PACING: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum RateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected page shape: {0}")]
    Parse(String),

    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRates {
    pub usd: f64,
    pub eur: f64,
    pub byn: f64,
}

static VALUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<CharCode>([A-Z]{3})</CharCode>\s*<Nominal>(\d+)</Nominal>\s*<Name>[^<]*</Name>\s*<Value>([\d.,]+)</Value>",
    )
    .unwrap()
});

static SALARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3}(?:[\s\u{a0}]\d{3})+|\d{4,7})\s*(?:руб|BYN|Br)").unwrap()
});

/// Parses the central-bank daily XML into per-unit RUB rates.
pub fn parse_cbr_xml(xml: &str) -> Result<CurrencyRates, RateError> {
    let mut usd = None;
    let mut eur = None;
    let mut byn = None;

    for caps in VALUTE_RE.captures_iter(xml) {
        let nominal: f64 = caps[2]
            .parse()
            .map_err(|_| RateError::Parse("bad nominal".to_string()))?;
        let value: f64 = caps[3]
            .replace(',', ".")
            .parse()
            .map_err(|_| RateError::Parse(format!("bad value '{}'", &caps[3])))?;
        if nominal <= 0.0 {
            return Err(RateError::Parse("zero nominal".to_string()));
        }
        let per_unit = value / nominal;
        match &caps[1] {
            "USD" => usd = Some(per_unit),
            "EUR" => eur = Some(per_unit),
            "BYN" => byn = Some(per_unit),
            _ => {}
        }
    }

    match (usd, eur, byn) {
        (Some(usd), Some(eur), Some(byn)) => Ok(CurrencyRates { usd, eur, byn }),
        _ => Err(RateError::Parse(
            "feed is missing USD, EUR or BYN".to_string(),
        )),
    }
}

/// Pulls the first salary-looking figure (digits followed by a currency
/// marker) out of the stats page.
pub fn parse_average_salary(html: &str) -> Result<i64, RateError> {
    let caps = SALARY_RE
        .captures(html)
        .ok_or_else(|| RateError::Parse("no salary figure found".to_string()))?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits
        .parse()
        .map_err(|_| RateError::Parse(format!("bad salary '{}'", &caps[1])))
}

pub async fn fetch_currency_rates(http: &Client, url: &str) -> Result<CurrencyRates, RateError> {
    let xml = http.get(url).send().await?.error_for_status()?.text().await?;
    parse_cbr_xml(&xml)
}

pub async fn fetch_average_salary(http: &Client, url: &str) -> Result<i64, RateError> {
    let html = http.get(url).send().await?.error_for_status()?.text().await?;
    parse_average_salary(&html)
}

/// Formats a rate for a spreadsheet cell, trimming trailing zeros.
fn format_rate(value: f64) -> String {
    let formatted = format!("{value:.4}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Rewrites the fixed currency/salary columns of every rate-calculation tab.
pub async fn update_rate_sheets(
    sheets: &SheetsClient,
    rates: &CurrencyRates,
    salary: i64,
) -> Result<(), RateError> {
    let columns = [
        (BYN_COLUMN, format_rate(rates.byn)),
        (USD_COLUMN, format_rate(rates.usd)),
        (EUR_COLUMN, format_rate(rates.eur)),
        (SALARY_COLUMN, salary.to_string()),
    ];
    for tab in tabs::RATE_CALC_ALL {
        for (column, value) in &columns {
            fill_column(sheets, tab, column, value).await?;
            tokio::time::sleep(WRITE_PACING).await;
        }
        info!("rate columns updated on '{tab}'");
    }
    Ok(())
}

/// Background task: refresh the rate tables daily. Scrape or write failures
/// are logged and retried on the next cycle, never fatal.
pub async fn run_updater(state: Arc<AppState>) {
    let http = Client::new();
    loop {
        match update_cycle(&http, &state.sheets).await {
            Ok(()) => info!("currency rates updated"),
            Err(e) => warn!("currency update failed: {e}"),
        }
        tokio::time::sleep(UPDATE_INTERVAL).await;
    }
}

async fn update_cycle(http: &Client, sheets: &SheetsClient) -> Result<(), RateError> {
    let rates = fetch_currency_rates(http, CBR_DAILY_URL).await?;
    let salary = fetch_average_salary(http, SALARY_PAGE_URL).await?;
    update_rate_sheets(sheets, &rates, salary).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const CBR_FIXTURE: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
<ValCurs Date="02.08.2026" name="Foreign Currency Market">
  <Valute ID="R01090B">
    <NumCode>933</NumCode>
    <CharCode>BYN</CharCode>
    <Nominal>1</Nominal>
    <Name>Белорусский рубль</Name>
    <Value>27,5000</Value>
  </Valute>
  <Valute ID="R01235">
    <NumCode>840</NumCode>
    <CharCode>USD</CharCode>
    <Nominal>1</Nominal>
    <Name>Доллар США</Name>
    <Value>79,3827</Value>
  </Valute>
  <Valute ID="R01239">
    <NumCode>978</NumCode>
    <CharCode>EUR</CharCode>
    <Nominal>1</Nominal>
    <Name>Евро</Name>
    <Value>92,0134</Value>
  </Valute>
  <Valute ID="R01375">
    <NumCode>156</NumCode>
    <CharCode>CNY</CharCode>
    <Nominal>10</Nominal>
    <Name>Китайских юаней</Name>
    <Value>110,1200</Value>
  </Valute>
</ValCurs>"#;

    #[test]
    fn test_parse_cbr_xml() {
        let rates = parse_cbr_xml(CBR_FIXTURE).unwrap();
        assert!((rates.usd - 79.3827).abs() < 1e-9);
        assert!((rates.eur - 92.0134).abs() < 1e-9);
        assert!((rates.byn - 27.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_cbr_xml_missing_currency() {
        let err = parse_cbr_xml("<ValCurs></ValCurs>").unwrap_err();
        assert!(matches!(err, RateError::Parse(_)));
    }

    #[test]
    fn test_parse_average_salary_with_spaces() {
        let html = "<p>Средняя зарплата составила 2 350 руб. в июле</p>";
        assert_eq!(parse_average_salary(html).unwrap(), 2350);
    }

    #[test]
    fn test_parse_average_salary_plain_number() {
        assert_eq!(parse_average_salary("85000 руб").unwrap(), 85_000);
    }

    #[test]
    fn test_parse_average_salary_rejects_pages_without_figure() {
        assert!(parse_average_salary("<html>ничего</html>").is_err());
    }

    #[test]
    fn test_format_rate_trims_zeros() {
        assert_eq!(format_rate(79.3827), "79.3827");
        assert_eq!(format_rate(27.5), "27.5");
        assert_eq!(format_rate(80.0), "80");
    }
}
