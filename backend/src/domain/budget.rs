//! Budget ledger: signed monetary entries with rolling totals.
//!
//! Every entry is a ledger record with a `Type` (`Revenue` or `Expense`),
//! a `Status` and a numeric `Value`. Two derived fields ride along on each
//! record and are never written to disk:
//!
//! - `Sign`: `1` for revenue, `-1` otherwise
//! - `Value_Signed`: `Sign * Value`
//!
//! Totals and summaries leave out `Prospected` and `Cancelled` entries.

use chrono::{Datelike, Duration, Local, NaiveDate};
use log::{debug, info};
use shared::{BudgetTotals, Fields, Metadata, Record, SummaryRow, TagCount};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::dataset::is_missing;
use crate::domain::record_table::{Ledger, LedgerSchema};
use crate::domain::running_time::parse_datetime;
use crate::error::{Result, ZenithError};

pub const TYPE_FIELD: &str = "Type";
pub const STATUS_FIELD: &str = "Status";
pub const CONTRACT_FIELD: &str = "Contract";
pub const NAME_FIELD: &str = "Name";
pub const VALUE_FIELD: &str = "Value";
pub const DATE_DUE_FIELD: &str = "Date_Due";
pub const DATE_EXE_FIELD: &str = "Date_Exe";
pub const TAGS_FIELD: &str = "Tags";
pub const METHOD_FIELD: &str = "Method";
pub const PROTOCOL_FIELD: &str = "Protocol";
pub const SIGN_FIELD: &str = "Sign";
pub const VALUE_SIGNED_FIELD: &str = "Value_Signed";
/// Added to each row produced by [`Budget::expand_annual`]
pub const DATE_FIELD: &str = "Date";

pub const TYPE_REVENUE: &str = "Revenue";
pub const TYPE_EXPENSE: &str = "Expense";

pub const STATUS_EXPECTED: &str = "Expected";
pub const STATUS_EXECUTED: &str = "Executed";
pub const STATUS_PROSPECTED: &str = "Prospected";
pub const STATUS_CANCELLED: &str = "Cancelled";

pub const METHOD_AUTOMATIC: &str = "Automatic";

pub const TOTAL_REVENUE: &str = "Total_Revenue";
pub const TOTAL_EXPENSES: &str = "Total_Expenses";
pub const TOTAL_NET: &str = "Total_Net";

/// Columns of a budget ledger
pub fn budget_schema() -> LedgerSchema {
    LedgerSchema::new(
        [TYPE_FIELD, STATUS_FIELD, CONTRACT_FIELD, NAME_FIELD, VALUE_FIELD],
        [
            DATE_DUE_FIELD,
            DATE_EXE_FIELD,
            TAGS_FIELD,
            METHOD_FIELD,
            PROTOCOL_FIELD,
        ],
        ["File_Receipt", "File_Invoice", "File_NF"],
    )
}

/// Parse a `Value` cell. Missing markers mean no value.
pub fn parse_value(raw: &str) -> Result<Option<f64>> {
    if is_missing(raw) {
        return Ok(None);
    }
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ZenithError::Parse(format!("Value is not a number: {}", raw)))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn sign_of(record: &Record) -> f64 {
    if record.field(TYPE_FIELD) == TYPE_REVENUE {
        1.0
    } else {
        -1.0
    }
}

/// `Sign * Value`, `None` when the entry has no value
pub fn signed_value(record: &Record) -> Option<f64> {
    parse_value(record.field(VALUE_FIELD))
        .ok()
        .flatten()
        .map(|v| sign_of(record) * v)
}

fn counts_in_totals(record: &Record) -> bool {
    !matches!(
        record.field(STATUS_FIELD),
        STATUS_PROSPECTED | STATUS_CANCELLED
    )
}

/// Automatic payments still `Expected` past their due date become `Executed`
pub fn update_status(records: &[Record]) -> Vec<String> {
    let now = Local::now().naive_local();
    records
        .iter()
        .map(|record| {
            let status = record.field(STATUS_FIELD);
            let due = parse_datetime(record.field(DATE_DUE_FIELD)).ok();
            let overdue = due.map(|d| d <= now).unwrap_or(false);
            if record.field(METHOD_FIELD) == METHOD_AUTOMATIC
                && status == STATUS_EXPECTED
                && overdue
            {
                STATUS_EXECUTED.to_string()
            } else {
                status.to_string()
            }
        })
        .collect()
}

/// Recurrence of a budget entry over a year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    /// Every seven days starting January 1st
    Weekly,
    MonthStart,
    YearStart,
}

impl Frequency {
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::MonthStart => "MS",
            Frequency::YearStart => "YS",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" => Ok(Frequency::Weekly),
            "MS" => Ok(Frequency::MonthStart),
            "YS" => Ok(Frequency::YearStart),
            other => Err(ZenithError::Parse(format!("Invalid frequency: {}", other))),
        }
    }

    /// Dates of `year` this frequency lands on
    pub fn dates(&self, year: i32) -> Result<Vec<NaiveDate>> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ZenithError::Parse(format!("Invalid year: {}", year)))?;

        let dates = match self {
            Frequency::Daily | Frequency::Weekly => {
                let step = if *self == Frequency::Daily { 1 } else { 7 };
                let mut dates = Vec::new();
                let mut current = start;
                while current.year() == year {
                    dates.push(current);
                    current += Duration::days(step);
                }
                dates
            }
            Frequency::MonthStart => (1..=12)
                .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1))
                .collect(),
            Frequency::YearStart => vec![start],
        };
        Ok(dates)
    }
}

impl FromStr for Frequency {
    type Err = ZenithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A ledger of revenues and expenses
#[derive(Debug, Clone)]
pub struct Budget {
    ledger: Ledger,
    totals: BudgetTotals,
    summary_ascending: bool,
}

impl Default for Budget {
    fn default() -> Self {
        Self::new("MyBudget", Some("Bud"))
    }
}

impl Budget {
    pub fn new(name: &str, alias: Option<&str>) -> Self {
        let ledger = Ledger::with_schema(name, alias, budget_schema())
            .with_operator(STATUS_FIELD, update_status);
        let mut budget = Self {
            ledger,
            totals: BudgetTotals::default(),
            summary_ascending: true,
        };
        budget.update();
        budget
    }

    /// Use an already configured ledger. Its values are checked first.
    pub fn from_ledger(ledger: Ledger) -> Result<Self> {
        check_values(&ledger)?;
        let mut budget = Self {
            ledger,
            totals: BudgetTotals::default(),
            summary_ascending: true,
        };
        budget.update();
        Ok(budget)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn name(&self) -> &str {
        self.ledger.name()
    }

    pub fn records(&self) -> &[Record] {
        self.ledger.records()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    pub fn totals(&self) -> BudgetTotals {
        self.totals
    }

    pub fn total_revenue(&self) -> f64 {
        self.totals.total_revenue
    }

    pub fn total_expenses(&self) -> f64 {
        self.totals.total_expenses
    }

    pub fn total_net(&self) -> f64 {
        self.totals.total_net
    }

    /// Summaries sort ascending when the budget is not in surplus
    pub fn summary_ascending(&self) -> bool {
        self.summary_ascending
    }

    /// Run a fallible ledger change on a copy and keep it only if every value checks out
    fn staged<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Ledger) -> Result<()>,
    {
        let mut staged = self.ledger.clone();
        change(&mut staged)?;
        check_values(&staged)?;
        self.ledger = staged;
        self.update();
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.staged(|ledger| ledger.load(path))
    }

    pub fn reload(&mut self, path: &Path) -> Result<()> {
        self.staged(|ledger| ledger.reload(path))
    }

    pub fn insert(&mut self, fields: &Fields) -> Result<String> {
        check_fields(fields)?;
        let id = self.ledger.insert(fields)?;
        self.update();
        Ok(id)
    }

    pub fn insert_strict(&mut self, fields: &Fields) -> Result<String> {
        check_fields(fields)?;
        let id = self.ledger.insert_strict(fields)?;
        self.update();
        Ok(id)
    }

    pub fn edit(&mut self, id: &str, fields: &Fields, filter: bool) -> Result<()> {
        check_fields(fields)?;
        self.ledger.edit(id, fields, filter)?;
        self.update();
        Ok(())
    }

    pub fn archive(&mut self, id: &str) -> Result<()> {
        self.ledger.archive(id)?;
        self.update();
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Record> {
        self.ledger.get(id)
    }

    pub fn record_sheet(&self, id: &str) -> Result<Metadata> {
        self.ledger.record_sheet(id)
    }

    pub fn export(
        &self,
        folder: Option<&Path>,
        filename: Option<&str>,
        filter_archived: bool,
    ) -> Result<PathBuf> {
        self.ledger.export(folder, filename, filter_archived)
    }

    pub fn save(&self) -> Result<PathBuf> {
        self.ledger.save()
    }

    pub fn export_record(
        &self,
        id: &str,
        folder: Option<&Path>,
        filename: Option<&str>,
    ) -> Result<PathBuf> {
        self.ledger.export_record(id, folder, filename)
    }

    pub fn load_record_data(&self, path: &Path) -> Result<Fields> {
        self.ledger.load_record_data(path)
    }

    /// Run the `Status` operator and recompute totals
    pub fn refresh(&mut self) -> Result<()> {
        self.ledger.refresh()?;
        self.update();
        Ok(())
    }

    pub fn rename(&mut self, name: &str) {
        self.ledger.rename(name);
    }

    pub fn metadata(&self) -> Metadata {
        self.ledger.metadata()
    }

    pub fn set(&mut self, values: &Metadata, load_data: bool) -> Result<()> {
        self.staged(|ledger| ledger.set(values, load_data))
    }

    pub fn boot(&mut self, path: &Path, load_data: bool) -> Result<()> {
        self.staged(|ledger| ledger.boot(path, load_data))
    }

    /// Re-derive signs, signed values and totals
    pub fn update(&mut self) {
        self.ledger.update();

        for record in self.ledger.records_mut() {
            let sign = sign_of(record);
            let signed = signed_value(record)
                .map(|v| v.to_string())
                .unwrap_or_default();
            record
                .fields
                .insert(SIGN_FIELD.to_string(), format!("{}", sign as i64));
            record.fields.insert(VALUE_SIGNED_FIELD.to_string(), signed);
        }

        let revenue = self.sum_by_type(TYPE_REVENUE);
        let expenses = self.sum_by_type(TYPE_EXPENSE);
        let net = round3(revenue + expenses);
        self.totals = BudgetTotals {
            total_revenue: revenue,
            total_expenses: expenses,
            total_net: net,
        };
        self.summary_ascending = net <= 0.0;
        debug!(
            "Budget {} totals: revenue {}, expenses {}, net {}",
            self.ledger.name(),
            revenue,
            expenses,
            net
        );
    }

    fn sum_by_type(&self, kind: &str) -> f64 {
        let sum: f64 = self
            .considered(true)
            .filter(|r| r.field(TYPE_FIELD) == kind)
            .filter_map(signed_value)
            .sum();
        round3(sum)
    }

    fn considered(&self, filter: bool) -> impl Iterator<Item = &Record> {
        self.ledger
            .records()
            .iter()
            .filter(move |r| !filter || counts_in_totals(r))
    }

    fn sort_rows(&self, rows: &mut [SummaryRow]) {
        if self.summary_ascending {
            rows.sort_by(|a, b| a.value.total_cmp(&b.value));
        } else {
            rows.sort_by(|a, b| b.value.total_cmp(&a.value));
        }
    }

    /// The three totals, ordered by [`Budget::summary_ascending`]
    pub fn summary_by_type(&self) -> Vec<SummaryRow> {
        let mut rows = vec![
            SummaryRow {
                key: TOTAL_EXPENSES.to_string(),
                value: self.totals.total_expenses,
            },
            SummaryRow {
                key: TOTAL_REVENUE.to_string(),
                value: self.totals.total_revenue,
            },
            SummaryRow {
                key: TOTAL_NET.to_string(),
                value: self.totals.total_net,
            },
        ];
        self.sort_rows(&mut rows);
        rows
    }

    /// Sum of signed values grouped by the raw cell of `column`.
    /// Entries with a blank cell belong to no group.
    pub fn summary_by(&self, column: &str, filter: bool) -> Vec<SummaryRow> {
        let mut groups: BTreeMap<String, f64> = BTreeMap::new();
        for record in self.considered(filter) {
            let key = record.field(column);
            if key.trim().is_empty() {
                continue;
            }
            if let Some(value) = signed_value(record) {
                *groups.entry(key.to_string()).or_default() += value;
            }
        }
        let mut rows: Vec<SummaryRow> = groups
            .into_iter()
            .map(|(key, value)| SummaryRow {
                key,
                value: round3(value),
            })
            .collect();
        self.sort_rows(&mut rows);
        rows
    }

    pub fn summary_by_status(&self, filter: bool) -> Vec<SummaryRow> {
        self.summary_by(STATUS_FIELD, filter)
    }

    pub fn summary_by_contract(&self, filter: bool) -> Vec<SummaryRow> {
        self.summary_by(CONTRACT_FIELD, filter)
    }

    /// Grouped by the whole `Tags` string
    pub fn summary_by_tags(&self, filter: bool) -> Vec<SummaryRow> {
        self.summary_by(TAGS_FIELD, filter)
    }

    /// Occurrences of each whitespace-separated tag, most frequent first
    pub fn tag_counts(&self, filter: bool) -> Vec<TagCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in self.considered(filter) {
            for tag in record.field(TAGS_FIELD).split_whitespace() {
                *counts.entry(tag).or_default() += 1;
            }
        }
        let mut counts: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        counts
    }

    /// Replicate every active entry at each date of `year` given by `frequency`.
    ///
    /// Copies carry a `Date` field (`YYYY-MM-DD`) and keep the source id.
    pub fn expand_annual(&self, year: i32, frequency: Frequency) -> Result<Vec<Record>> {
        let dates = frequency.dates(year)?;
        let expanded: Vec<Record> = self
            .ledger
            .active_records()
            .flat_map(|record| {
                dates.iter().map(move |date| {
                    let mut copy = record.clone();
                    copy.fields
                        .insert(DATE_FIELD.to_string(), date.format("%Y-%m-%d").to_string());
                    copy
                })
            })
            .collect();
        info!(
            "📅 Expanded {} entries of {} over {} ({})",
            self.ledger.active_records().count(),
            self.ledger.name(),
            year,
            frequency
        );
        Ok(expanded)
    }
}

fn check_fields(fields: &Fields) -> Result<()> {
    if let Some(raw) = fields.get(VALUE_FIELD) {
        parse_value(raw)?;
    }
    Ok(())
}

fn check_values(ledger: &Ledger) -> Result<()> {
    for record in ledger.records() {
        parse_value(record.field(VALUE_FIELD)).map_err(|e| match e {
            ZenithError::Parse(msg) => ZenithError::Parse(format!("{}: {}", record.id, msg)),
            other => other,
        })?;
    }
    Ok(())
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ledger)?;
        writeln!(f, "Totals:")?;
        for row in self.summary_by_type() {
            writeln!(f, "{};{}", row.key, row.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    fn entry(kind: &str, status: &str, value: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert(TYPE_FIELD.to_string(), kind.to_string());
        fields.insert(STATUS_FIELD.to_string(), status.to_string());
        fields.insert(VALUE_FIELD.to_string(), value.to_string());
        fields
    }

    fn with(mut fields: Fields, key: &str, value: &str) -> Fields {
        fields.insert(key.to_string(), value.to_string());
        fields
    }

    fn sample_budget() -> Budget {
        let mut budget = Budget::default();
        budget
            .insert(&with(entry("Revenue", "Executed", "100"), CONTRACT_FIELD, "A"))
            .unwrap();
        budget
            .insert(&with(entry("Expense", "Expected", "40"), CONTRACT_FIELD, "B"))
            .unwrap();
        budget
    }

    #[test]
    fn test_totals() {
        let budget = sample_budget();
        assert_eq!(budget.total_revenue(), 100.0);
        assert_eq!(budget.total_expenses(), -40.0);
        assert_eq!(budget.total_net(), 60.0);
        assert!(!budget.summary_ascending());

        let expense = budget.get("Rec0002").unwrap();
        assert_eq!(expense.field(SIGN_FIELD), "-1");
        assert_eq!(expense.field(VALUE_SIGNED_FIELD), "-40");
    }

    #[test]
    fn test_prospected_and_cancelled_are_excluded() {
        let mut budget = sample_budget();
        budget.insert(&entry("Revenue", "Prospected", "1000")).unwrap();
        budget.insert(&entry("Expense", "Cancelled", "500")).unwrap();
        assert_eq!(budget.total_revenue(), 100.0);
        assert_eq!(budget.total_expenses(), -40.0);
        assert_eq!(budget.total_net(), 60.0);
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let mut budget = sample_budget();
        let result = budget.insert(&entry("Expense", "Expected", "lots"));
        assert!(matches!(result, Err(ZenithError::Parse(_))));
        assert_eq!(budget.len(), 2);

        let result = budget.edit("Rec0001", &entry("Revenue", "Executed", "?"), true);
        assert!(matches!(result, Err(ZenithError::Parse(_))));
        assert_eq!(budget.get("Rec0001").unwrap().field(VALUE_FIELD), "100");
    }

    #[test]
    fn test_empty_value_is_skipped() {
        let mut budget = sample_budget();
        budget.insert(&entry("Expense", "Executed", "")).unwrap();
        assert_eq!(budget.total_expenses(), -40.0);
        assert_eq!(budget.get("Rec0003").unwrap().field(VALUE_SIGNED_FIELD), "");
    }

    #[test]
    fn test_totals_follow_edits_and_deficit_flips_order() {
        let mut budget = sample_budget();
        budget
            .edit("Rec0002", &entry("Expense", "Expected", "250.5"), true)
            .unwrap();
        assert_eq!(budget.total_net(), -150.5);
        assert!(budget.summary_ascending());

        let keys: Vec<String> = budget.summary_by_type().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![TOTAL_EXPENSES, TOTAL_NET, TOTAL_REVENUE]);
    }

    #[test]
    fn test_grouped_summaries() {
        let mut budget = sample_budget();
        budget
            .insert(&with(entry("Expense", "Executed", "10"), CONTRACT_FIELD, "A"))
            .unwrap();
        budget
            .insert(&with(entry("Expense", "Prospected", "999"), CONTRACT_FIELD, "A"))
            .unwrap();

        let by_contract = budget.summary_by_contract(true);
        assert_eq!(
            by_contract,
            vec![
                SummaryRow { key: "A".to_string(), value: 90.0 },
                SummaryRow { key: "B".to_string(), value: -40.0 },
            ]
        );

        let by_status = budget.summary_by_status(false);
        assert_eq!(by_status.len(), 3);
        assert_eq!(by_status[0].key, "Executed");
        assert_eq!(by_status[2].key, "Prospected");
    }

    #[test]
    fn test_blank_group_keys_are_left_out() {
        let mut budget = sample_budget();
        budget.insert(&entry("Expense", "Executed", "7")).unwrap();
        budget
            .insert(&with(entry("Expense", "Executed", "3"), TAGS_FIELD, "  "))
            .unwrap();

        let keys: Vec<String> = budget
            .summary_by_contract(true)
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert!(budget.summary_by_tags(true).is_empty());
        assert!(budget.tag_counts(true).is_empty());
        assert_eq!(budget.total_expenses(), -50.0);
    }

    #[test]
    fn test_tag_summaries() {
        let mut budget = Budget::default();
        budget
            .insert(&with(entry("Expense", "Executed", "10"), TAGS_FIELD, "food home"))
            .unwrap();
        budget
            .insert(&with(entry("Expense", "Executed", "5"), TAGS_FIELD, "food"))
            .unwrap();
        budget
            .insert(&with(entry("Revenue", "Executed", "30"), TAGS_FIELD, "salary"))
            .unwrap();

        let by_tags = budget.summary_by_tags(true);
        assert_eq!(by_tags[0], SummaryRow { key: "salary".to_string(), value: 30.0 });

        let counts = budget.tag_counts(true);
        assert_eq!(
            counts,
            vec![
                TagCount { tag: "food".to_string(), count: 2 },
                TagCount { tag: "home".to_string(), count: 1 },
                TagCount { tag: "salary".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_status_operator() {
        let mut budget = Budget::default();
        let overdue = with(
            with(entry("Expense", "Expected", "10"), METHOD_FIELD, "Automatic"),
            DATE_DUE_FIELD,
            "2000-01-01",
        );
        let future = with(
            with(entry("Expense", "Expected", "10"), METHOD_FIELD, "Automatic"),
            DATE_DUE_FIELD,
            "2999-01-01",
        );
        let manual = with(
            with(entry("Expense", "Expected", "10"), METHOD_FIELD, "Manual"),
            DATE_DUE_FIELD,
            "2000-01-01",
        );
        budget.insert(&overdue).unwrap();
        budget.insert(&future).unwrap();
        budget.insert(&manual).unwrap();

        budget.refresh().unwrap();

        let statuses: Vec<&str> = budget.records().iter().map(|r| r.field(STATUS_FIELD)).collect();
        assert_eq!(statuses, vec!["Executed", "Expected", "Expected"]);
    }

    #[test]
    fn test_load_rejects_non_numeric_without_partial_state() {
        let env = TestEnvironment::new().unwrap();
        let path = env.write_file("budget.csv", "Type;Status;Value\nRevenue;Executed;5\nExpense;Executed;abc\n");

        let mut budget = sample_budget();
        assert!(matches!(budget.load(&path), Err(ZenithError::Parse(_))));
        assert_eq!(budget.len(), 2);
        assert_eq!(budget.total_net(), 60.0);
    }

    #[test]
    fn test_export_omits_derived_fields() {
        let env = TestEnvironment::new().unwrap();
        let budget = sample_budget();
        let path = budget
            .export(Some(env.base_directory()), None, false)
            .unwrap();

        let mut fresh = Budget::default();
        fresh.load(&path).unwrap();
        assert!(!env.read_file("MyBudget.csv").contains(VALUE_SIGNED_FIELD));
        assert_eq!(fresh.totals(), budget.totals());
    }

    #[test]
    fn test_frequency_dates() {
        assert_eq!(Frequency::Daily.dates(2024).unwrap().len(), 366);
        assert_eq!(Frequency::Weekly.dates(2023).unwrap().len(), 53);
        assert_eq!(Frequency::MonthStart.dates(2024).unwrap().len(), 12);
        assert_eq!(
            Frequency::YearStart.dates(2024).unwrap(),
            vec![NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]
        );
        assert_eq!("ms".parse::<Frequency>().unwrap(), Frequency::MonthStart);
        assert!(Frequency::from_code("Q").is_err());
    }

    #[test]
    fn test_expand_annual_skips_archived() {
        let mut budget = sample_budget();
        budget.archive("Rec0002").unwrap();

        let expanded = budget.expand_annual(2024, Frequency::MonthStart).unwrap();
        assert_eq!(expanded.len(), 12);
        assert!(expanded.iter().all(|r| r.id == "Rec0001"));
        assert_eq!(expanded[0].field(DATE_FIELD), "2024-01-01");
        assert_eq!(expanded[11].field(DATE_FIELD), "2024-12-01");
    }
}
