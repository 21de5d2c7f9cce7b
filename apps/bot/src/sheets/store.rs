//! Domain operations over the candidate spreadsheet.
//!
//! Everything here reconciles data across worksheets by the resume id in
//! column A; the pure matching/lookup helpers are split out so they can be
//! tested without a live spreadsheet.

use rand::Rng;
use tracing::{info, warn};

use crate::sheets::{tabs, SheetsClient, SheetsError};

/// Half-width of the rate-table search window: the first row whose salary
/// cell is within ±40 of the candidate's expectation matches.
const RATE_SEARCH_WINDOW: i64 = 40;

/// Rate cells extracted from columns M/N/O/P of a rate-calculation row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateCells {
    pub rub: Option<String>,
    pub usd: Option<String>,
    pub eur: Option<String>,
    pub byn: Option<String>,
}

/// Generates a resume id: one lowercase letter, an underscore and five
/// digits, e.g. `k_52340`.
pub fn generate_resume_id() -> String {
    let mut rng = rand::thread_rng();
    let letter = (b'a' + rng.gen_range(0..26u8)) as char;
    let number: u32 = rng.gen_range(10_000..=99_999);
    format!("{letter}_{number}")
}

/// 0-based index of the data row whose first cell equals `resume_id`.
/// Row 0 is assumed to be the header row and is skipped.
pub fn find_row_by_id(rows: &[Vec<String>], resume_id: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.first().map(|c| c.trim()) == Some(resume_id))
        .map(|(i, _)| i)
}

/// 0-based column index whose header matches `name` case-insensitively.
pub fn header_column(headers: &[String], name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == wanted)
}

fn numeric_cell(cell: &str) -> Option<i64> {
    let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// 0-based index of the first data row whose cell in `search_col` is within
/// the search window of `amount`.
pub fn find_rate_row(rows: &[Vec<String>], search_col: usize, amount: i64) -> Option<usize> {
    rows.iter().enumerate().skip(1).find_map(|(i, row)| {
        let value = numeric_cell(row.get(search_col)?)?;
        ((value - amount).abs() <= RATE_SEARCH_WINDOW).then_some(i)
    })
}

/// Pulls the M/N/O/P cells (RUB/USD/EUR/BYN) out of one rate row, dropping
/// non-breaking spaces the spreadsheet formats in.
pub fn extract_rate_cells(row: &[String]) -> RateCells {
    let cell = |i: usize| -> Option<String> {
        let value = row.get(i)?.replace('\u{a0}', "").trim().to_string();
        (!value.is_empty()).then_some(value)
    };
    RateCells {
        rub: cell(12),
        usd: cell(13),
        eur: cell(14),
        byn: cell(15),
    }
}

/// Checks the summary worksheet for an existing candidate with the same
/// last and first name (columns B and C), case-insensitively.
pub async fn is_duplicate(
    client: &SheetsClient,
    last_name: &str,
    first_name: &str,
) -> Result<bool, SheetsError> {
    let rows = client.values(tabs::SUMMARY).await?;
    let last = last_name.trim().to_lowercase();
    let first = first_name.trim().to_lowercase();
    Ok(rows.iter().skip(1).any(|row| {
        row.get(1).map(|c| c.trim().to_lowercase()) == Some(last.clone())
            && row.get(2).map(|c| c.trim().to_lowercase()) == Some(first.clone())
    }))
}

/// Deletes every row carrying `resume_id` from every worksheet.
/// Returns the number of rows removed.
pub async fn delete_resume_everywhere(
    client: &SheetsClient,
    resume_id: &str,
) -> Result<usize, SheetsError> {
    let mut deleted = 0;
    for title in client.worksheet_titles().await? {
        let rows = match client.values(&title).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("skipping worksheet '{title}' during delete: {e}");
                continue;
            }
        };
        let matches: Vec<usize> = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| row.first().map(|c| c.trim()) == Some(resume_id))
            .map(|(i, _)| i + 1) // 1-based worksheet rows
            .collect();
        if matches.is_empty() {
            continue;
        }
        client.delete_rows(&title, &matches).await?;
        deleted += matches.len();
        info!("deleted {} row(s) from '{title}'", matches.len());
    }
    Ok(deleted)
}

/// Updates individual cells in the row of `resume_id`, addressing columns by
/// header name (case-insensitive). Unknown headers are skipped with a
/// warning. Returns the number of cells written.
pub async fn update_cells_by_header(
    client: &SheetsClient,
    tab: &str,
    resume_id: &str,
    updates: &[(String, String)],
) -> Result<usize, SheetsError> {
    let rows = client.values(tab).await?;
    let headers = rows.first().cloned().unwrap_or_default();
    let Some(row_index) = find_row_by_id(&rows, resume_id) else {
        warn!("resume {resume_id} not found in '{tab}'");
        return Ok(0);
    };

    let mut written = 0;
    for (header, value) in updates {
        match header_column(&headers, header) {
            Some(col) => {
                client
                    .update_cell(tab, row_index + 1, col + 1, value)
                    .await?;
                written += 1;
            }
            None => warn!("column '{header}' not found in '{tab}'"),
        }
    }
    Ok(written)
}

/// Updates one summary-worksheet cell by header name.
pub async fn update_summary_cell(
    client: &SheetsClient,
    resume_id: &str,
    header: &str,
    value: &str,
) -> Result<usize, SheetsError> {
    update_cells_by_header(
        client,
        tabs::SUMMARY,
        resume_id,
        &[(header.to_string(), value.to_string())],
    )
    .await
}

/// Range-searches one rate-calculation worksheet for the candidate's salary
/// and returns the matched row's rate cells.
pub async fn rate_lookup(
    client: &SheetsClient,
    tab: &str,
    search_col: usize,
    amount: i64,
) -> Result<Option<RateCells>, SheetsError> {
    let rows = client.values(tab).await?;
    Ok(find_rate_row(&rows, search_col, amount).map(|i| extract_rate_cells(&rows[i])))
}

/// Writes `value` into every data row of one column (used by the currency
/// updater for the fixed rate columns).
pub async fn fill_column(
    client: &SheetsClient,
    tab: &str,
    column: &str,
    value: &str,
) -> Result<(), SheetsError> {
    let rows = client.values(tab).await?;
    if rows.len() < 2 {
        return Ok(());
    }
    let last_row = rows.len();
    let values: Vec<Vec<String>> = (2..=last_row).map(|_| vec![value.to_string()]).collect();
    client
        .update_range(tab, &format!("{column}2:{column}{last_row}"), &values)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_generate_resume_id_shape() {
        for _ in 0..100 {
            let id = generate_resume_id();
            let (letter, number) = id.split_once('_').expect("id has an underscore");
            assert_eq!(letter.len(), 1);
            assert!(letter.chars().all(|c| c.is_ascii_lowercase()));
            assert_eq!(number.len(), 5);
            assert!(number.parse::<u32>().unwrap() >= 10_000);
        }
    }

    #[test]
    fn test_find_row_by_id_skips_header() {
        let rows = grid(&[
            &["k_11111", "header-looking id"],
            &["k_22222", "Иванов"],
            &["k_33333", "Петров"],
        ]);
        // A header cell that happens to equal the id must not match.
        assert_eq!(find_row_by_id(&rows, "k_11111"), None);
        assert_eq!(find_row_by_id(&rows, "k_33333"), Some(2));
        assert_eq!(find_row_by_id(&rows, "missing"), None);
    }

    #[test]
    fn test_header_column_case_insensitive() {
        let headers = vec!["ID кандидата".to_string(), " Фамилия ".to_string()];
        assert_eq!(header_column(&headers, "фамилия"), Some(1));
        assert_eq!(header_column(&headers, "id КАНДИДАТА"), Some(0));
        assert_eq!(header_column(&headers, "Имя"), None);
    }

    #[test]
    fn test_find_rate_row_exact_and_window() {
        let rows = grid(&[
            &["header", "Оклад"],
            &["r1", "100 000"],
            &["r2", "150000"],
            &["r3", "150030"],
        ]);
        // Exact match.
        assert_eq!(find_rate_row(&rows, 1, 150_000), Some(2));
        // Within ±40 of the first candidate row.
        assert_eq!(find_rate_row(&rows, 1, 100_020), Some(1));
        // Outside the window everywhere.
        assert_eq!(find_rate_row(&rows, 1, 120_000), None);
    }

    #[test]
    fn test_find_rate_row_takes_first_match() {
        let rows = grid(&[&["h", "x"], &["r1", "500"], &["r2", "510"]]);
        assert_eq!(find_rate_row(&rows, 1, 510), Some(1));
    }

    #[test]
    fn test_find_rate_row_ignores_non_numeric() {
        let rows = grid(&[&["h", "x"], &["r1", "—"], &["r2", "500"]]);
        assert_eq!(find_rate_row(&rows, 1, 500), Some(2));
    }

    #[test]
    fn test_extract_rate_cells() {
        let mut row = vec![String::new(); 16];
        row[12] = "3\u{a0}500".to_string();
        row[13] = "45".to_string();
        row[14] = String::new();
        row[15] = "120".to_string();
        let cells = extract_rate_cells(&row);
        assert_eq!(cells.rub.as_deref(), Some("3500"));
        assert_eq!(cells.usd.as_deref(), Some("45"));
        assert_eq!(cells.eur, None);
        assert_eq!(cells.byn.as_deref(), Some("120"));
    }

    #[test]
    fn test_extract_rate_cells_short_row() {
        let cells = extract_rate_cells(&["k_1".to_string()]);
        assert_eq!(cells, RateCells::default());
    }
}
