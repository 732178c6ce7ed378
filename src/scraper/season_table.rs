//! Extraction of career totals from the per-season receiving table.
//!
//! Everything that depends on the site's table layout lives here, described by
//! a [`SeasonTableSchema`]. When the site changes its markup the schema is the
//! one place to update, and a layout the schema cannot resolve is reported as
//! [`ScrapeError::SchemaMismatch`] instead of silently producing empty totals.

use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use tracing::{debug, trace};

use crate::error::{Result, ScrapeError};
use crate::model::CareerTotals;
use crate::scraper::{comments, element_text};
use crate::table::parse_float;

/// Revision of the layout described by [`SeasonTableSchema::v1`].
pub const SCHEMA_VERSION: u32 = 1;

/// Receiving yards at or above this mark make a thousand-yard season.
pub const THOUSAND_YARDS: f64 = 1000.0;

/// How to find one column: by `data-stat` attribute, header label, then position.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub data_stats: &'static [&'static str],
    /// Lower-case header labels. The first matching header wins.
    pub labels: &'static [&'static str],
    pub position: Option<usize>,
}

/// Layout of the season table the extractor understands.
#[derive(Debug, Clone, Copy)]
pub struct SeasonTableSchema {
    pub version: u32,
    pub table_ids: &'static [&'static str],
    pub season: ColumnSpec,
    pub approximate_value: ColumnSpec,
    pub games: ColumnSpec,
    pub receptions: ColumnSpec,
    pub receiving_yards: ColumnSpec,
    pub receiving_tds: ColumnSpec,
}

impl SeasonTableSchema {
    pub const fn v1() -> Self {
        Self {
            version: SCHEMA_VERSION,
            table_ids: &["receiving_and_rushing", "rushing_and_receiving"],
            season: ColumnSpec {
                data_stats: &["year_id", "season"],
                labels: &["season", "year"],
                position: Some(0),
            },
            approximate_value: ColumnSpec {
                data_stats: &["av"],
                labels: &["av", "approx val"],
                position: None,
            },
            games: ColumnSpec {
                data_stats: &["g", "games"],
                labels: &["g"],
                position: None,
            },
            receptions: ColumnSpec {
                data_stats: &["rec"],
                labels: &["rec"],
                position: None,
            },
            receiving_yards: ColumnSpec {
                data_stats: &["rec_yds"],
                labels: &[],
                position: Some(9),
            },
            receiving_tds: ColumnSpec {
                data_stats: &["rec_td"],
                labels: &[],
                position: Some(11),
            },
        }
    }
}

impl Default for SeasonTableSchema {
    fn default() -> Self {
        Self::v1()
    }
}

/// One table cell: its `data-stat` attribute, if any, and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub stat: Option<String>,
    pub text: String,
}

/// A season table lifted out of the page into owned rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonTable {
    /// Lower-cased labels of the last header row.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Column {
    Stat(&'static str),
    Index(usize),
}

impl ColumnSpec {
    fn resolve(&self, table: &SeasonTable) -> Option<Column> {
        if let Some(stat) = self.data_stats.iter().copied().find(|stat| {
            table
                .rows
                .iter()
                .flatten()
                .any(|cell| cell.stat.as_deref() == Some(*stat))
        }) {
            return Some(Column::Stat(stat));
        }

        if let Some(index) = table
            .headers
            .iter()
            .position(|h| self.labels.iter().any(|label| h.as_str() == *label))
        {
            return Some(Column::Index(index));
        }

        self.position
            .filter(|p| *p < table.headers.len() || table.rows.iter().any(|r| *p < r.len()))
            .map(Column::Index)
    }
}

impl Column {
    fn cell<'a>(&self, row: &'a [Cell]) -> Option<&'a str> {
        match self {
            Column::Stat(stat) => row
                .iter()
                .find(|cell| cell.stat.as_deref() == Some(*stat))
                .map(|cell| cell.text.as_str()),
            Column::Index(index) => row.get(*index).map(|cell| cell.text.as_str()),
        }
    }
}

impl SeasonTable {
    /// Lift a `<table>` element into owned rows.
    pub fn from_element(table: &ElementRef) -> Result<Self> {
        let header_row_selector = Selector::parse("thead tr")?;
        let body_row_selector = Selector::parse("tbody tr")?;
        let cell_selector = Selector::parse("th, td")?;

        let headers = table
            .select(&header_row_selector)
            .last()
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| element_text(&cell).to_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        let rows = table
            .select(&body_row_selector)
            .filter(|row| !row.value().classes().any(|c| c == "thead"))
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| Cell {
                        stat: cell.value().attr("data-stat").map(str::to_string),
                        text: element_text(&cell),
                    })
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Find the season table in `document`, looking inside HTML comments when
    /// it is not part of the live markup.
    pub fn find(document: &Html, schema: &SeasonTableSchema) -> Result<Option<Self>> {
        let selectors = schema
            .table_ids
            .iter()
            .map(|id| Selector::parse(&format!("table#{id}")).map_err(ScrapeError::from))
            .collect::<Result<Vec<_>>>()?;

        for selector in &selectors {
            if let Some(table) = document.select(selector).next() {
                return Self::from_element(&table).map(Some);
            }
        }

        for comment in comments(document) {
            if !schema.table_ids.iter().any(|id| comment.contains(id)) {
                continue;
            }
            let fragment = Html::parse_fragment(comment);
            for selector in &selectors {
                if let Some(table) = fragment.select(selector).next() {
                    debug!("season table found inside a comment");
                    return Self::from_element(&table).map(Some);
                }
            }
        }

        Ok(None)
    }

    /// Sum the season rows into career totals.
    ///
    /// Only rows whose season is a four digit year count, and each season
    /// counts once. A column whose every kept cell is non-numeric sums to
    /// `None`, not zero.
    pub fn career_totals(&self, schema: &SeasonTableSchema) -> Result<CareerTotals> {
        let season = schema
            .season
            .resolve(self)
            .ok_or_else(|| ScrapeError::SchemaMismatch {
                version: schema.version,
                detail: "season column not found".to_string(),
            })?;

        let seasons = self
            .rows
            .iter()
            .filter_map(|row| {
                let year = season_year(season.cell(row)?)?;
                Some((year, row.as_slice()))
            })
            .unique_by(|(year, _)| *year)
            .map(|(_, row)| row)
            .collect_vec();
        trace!(kept = seasons.len(), total = self.rows.len(), "filtered season rows");

        let sum = |spec: &ColumnSpec| -> Option<i64> {
            let column = spec.resolve(self)?;
            let values = seasons
                .iter()
                .filter_map(|row| column.cell(row).and_then(parse_float))
                .collect_vec();
            (!values.is_empty()).then(|| values.iter().sum::<f64>() as i64)
        };

        let thousand_yard_seasons = schema.receiving_yards.resolve(self).map(|column| {
            seasons
                .iter()
                .filter_map(|row| column.cell(row).and_then(parse_float))
                .filter(|yards| *yards >= THOUSAND_YARDS)
                .count() as u32
        });

        Ok(CareerTotals {
            career_av: sum(&schema.approximate_value),
            games_played: sum(&schema.games),
            receptions: sum(&schema.receptions),
            receiving_yards: sum(&schema.receiving_yards),
            receiving_tds: sum(&schema.receiving_tds),
            seasons_played: Some(seasons.len() as u32),
            thousand_yard_seasons,
        })
    }
}

/// Parse a season cell like `2019`, or `2019*+` with the site's honor markers.
fn season_year(text: &str) -> Option<u16> {
    let year = text.trim().trim_end_matches(['*', '+']);
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        year.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> String {
        let cells: String = cells
            .iter()
            .enumerate()
            .map(|(i, (stat, text))| {
                let tag = if i == 0 { "th" } else { "td" };
                format!(r#"<{tag} data-stat="{stat}">{text}</{tag}>"#)
            })
            .collect();
        format!("<tr>{cells}</tr>")
    }

    fn season(year: &str, av: &str, g: &str, rec: &str, yds: &str, td: &str) -> String {
        row(&[
            ("year_id", year),
            ("team", "HOU"),
            ("g", g),
            ("rec", rec),
            ("rec_yds", yds),
            ("rec_td", td),
            ("av", av),
        ])
    }

    fn table_html(body: &str) -> String {
        format!(
            r#"<table id="receiving_and_rushing">
                 <thead><tr><th>Season</th><th>Team</th><th>G</th><th>Rec</th><th>Yds</th><th>TD</th><th>AV</th></tr></thead>
                 <tbody>{body}</tbody>
                 <tfoot><tr><th data-stat="year_id">Career</th><td data-stat="g">999</td></tr></tfoot>
               </table>"#
        )
    }

    fn totals(html: &str) -> CareerTotals {
        let document = Html::parse_document(html);
        let schema = SeasonTableSchema::v1();
        SeasonTable::find(&document, &schema)
            .unwrap()
            .expect("table present")
            .career_totals(&schema)
            .unwrap()
    }

    #[test]
    fn test_sums_real_seasons_only() {
        let body = [
            season("2013", "5", "16", "52", "802", "2"),
            season("2014*", "9", "16", "76", "1210", "6"),
            season("Career", "14", "32", "128", "2012", "8"),
            season("2 yrs", "14", "32", "128", "2012", "8"),
        ]
        .concat();
        let totals = totals(&table_html(&body));

        assert_eq!(totals.career_av, Some(14));
        assert_eq!(totals.games_played, Some(32));
        assert_eq!(totals.receptions, Some(128));
        assert_eq!(totals.receiving_yards, Some(2012));
        assert_eq!(totals.receiving_tds, Some(8));
        assert_eq!(totals.seasons_played, Some(2));
        assert_eq!(totals.thousand_yard_seasons, Some(1));
    }

    #[test]
    fn test_duplicate_season_keeps_first() {
        let body = [
            season("2018", "6", "10", "40", "500", "3"),
            season("2018", "2", "6", "20", "250", "1"),
            season("2019", "4", "16", "60", "700", "4"),
        ]
        .concat();
        let totals = totals(&table_html(&body));

        assert_eq!(totals.games_played, Some(26));
        assert_eq!(totals.receptions, Some(100));
        assert_eq!(totals.seasons_played, Some(2));
    }

    #[test]
    fn test_all_missing_column_is_none_not_zero() {
        let body = [
            season("2020", "", "16", "40", "500", "3"),
            season("2021", "N/A", "16", "40", "500", "3"),
        ]
        .concat();
        let totals = totals(&table_html(&body));

        assert_eq!(totals.career_av, None);
        assert_eq!(totals.games_played, Some(32));
    }

    #[test]
    fn test_malformed_cells_are_skipped() {
        let body = [
            season("2020", "3", "16", "1,040", "x", "3"),
            season("2021", "4", "16", "10", "500", "--"),
        ]
        .concat();
        let totals = totals(&table_html(&body));

        assert_eq!(totals.receptions, Some(1050));
        assert_eq!(totals.receiving_yards, Some(500));
        assert_eq!(totals.receiving_tds, Some(3));
    }

    #[test]
    fn test_table_inside_comment() {
        let body = season("2016", "8", "16", "70", "900", "5");
        let html = format!(
            r#"<html><body><div id="all_receiving_and_rushing"><!-- {} --></div></body></html>"#,
            table_html(&body)
        );
        let totals = totals(&html);
        assert_eq!(totals.career_av, Some(8));
    }

    #[test]
    fn test_header_repeat_rows_are_dropped() {
        let body = format!(
            "{}<tr class=\"thead\"><th data-stat=\"year_id\">2018</th><td data-stat=\"g\">99</td></tr>",
            season("2017", "8", "16", "70", "900", "5")
        );
        let totals = totals(&table_html(&body));
        assert_eq!(totals.games_played, Some(16));
    }

    #[test]
    fn test_positional_fallback_without_data_stat() {
        // Season Age Tm Lg Pos G GS Tgt Rec Yds Y/R TD
        let html = r#"<table id="receiving_and_rushing">
            <thead><tr><th>Season</th><th>Age</th><th>Team</th><th>Lg</th><th>Pos</th><th>G</th>
            <th>GS</th><th>Tgt</th><th>Rec</th><th>Yds</th><th>Y/R</th><th>TD</th><th>Att</th><th>Yds</th><th>TD</th></tr></thead>
            <tbody>
            <tr><td>2015</td><td>23</td><td>HOU</td><td>NFL</td><td>WR</td><td>16</td>
            <td>16</td><td>192</td><td>111</td><td>1521</td><td>13.7</td><td>11</td><td>1</td><td>5</td><td>0</td></tr>
            </tbody></table>"#;
        let totals = totals(html);

        assert_eq!(totals.games_played, Some(16));
        assert_eq!(totals.receptions, Some(111));
        assert_eq!(totals.receiving_yards, Some(1521));
        assert_eq!(totals.receiving_tds, Some(11));
        assert_eq!(totals.career_av, None);
    }

    #[test]
    fn test_missing_table() {
        let document = Html::parse_document("<html><body><p>nothing</p></body></html>");
        let table = SeasonTable::find(&document, &SeasonTableSchema::v1()).unwrap();
        assert!(table.is_none());
    }

    #[test]
    fn test_unresolvable_season_column_is_schema_mismatch() {
        let table = SeasonTable {
            headers: vec![],
            rows: vec![],
        };
        let err = table.career_totals(&SeasonTableSchema::v1()).unwrap_err();
        assert!(matches!(err, ScrapeError::SchemaMismatch { version: 1, .. }));
    }

    #[test]
    fn test_season_year() {
        assert_eq!(season_year("2019"), Some(2019));
        assert_eq!(season_year(" 2019*+ "), Some(2019));
        assert_eq!(season_year("Career"), None);
        assert_eq!(season_year("20190"), None);
    }
}
