//! # Report Aggregator
//!
//! Pure folds over recorded sales. The database layer fetches the sales for
//! a window; everything below is arithmetic.
//!
//! ## Sales Report
//! ```text
//! sales in [start, end]  ──fold──►  revenue, tax, discount, count
//!                                   daily buckets (ascending date)
//!                                   top-N products by revenue
//! ```
//!
//! Dates are UTC calendar dates. A range is inclusive at both ends, so
//! `[2024-03-01, 2024-03-01]` covers that whole day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::SaleWithItems;
use crate::validation::ValidationResult;

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive range of UTC calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::invalid_format(
                "date range",
                "start date is after end date",
            ));
        }
        Ok(DateRange { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    /// Half-open instant bounds `[start 00:00, (end + 1 day) 00:00)` for
    /// querying timestamp columns.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self.start.and_time(NaiveTime::MIN).and_utc();
        let to = self.end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);
        (from, to)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start <= day && day <= self.end
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while({
            let end = self.end;
            move |d| *d <= end
        })
    }
}

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_cents: i64,
    pub sale_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRevenue {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    /// Σ unit price × quantity, before tax and sale-level discount.
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub range: DateRange,
    /// Σ sale totals (tax included, discount applied).
    pub total_revenue_cents: i64,
    pub total_tax_cents: i64,
    pub total_discount_cents: i64,
    pub sale_count: i64,
    /// Only days that had sales, ascending.
    pub daily: Vec<DailyRevenue>,
    pub top_products: Vec<ProductRevenue>,
}

impl SalesReport {
    /// Folds `sales` into a report. Sales outside `range` are ignored, so the
    /// caller may pass a wider fetch.
    ///
    /// Top products are ranked by revenue; equal revenue keeps the order in
    /// which the products were first encountered in `sales`.
    pub fn build(range: DateRange, sales: &[SaleWithItems], top_n: usize) -> SalesReport {
        let mut report = SalesReport {
            range,
            total_revenue_cents: 0,
            total_tax_cents: 0,
            total_discount_cents: 0,
            sale_count: 0,
            daily: Vec::new(),
            top_products: Vec::new(),
        };
        let mut daily: BTreeMap<NaiveDate, DailyRevenue> = BTreeMap::new();
        let mut products: Vec<ProductRevenue> = Vec::new();

        for entry in sales.iter().filter(|s| range.contains(s.sale.created_at)) {
            let sale = &entry.sale;
            report.total_revenue_cents += sale.total_cents;
            report.total_tax_cents += sale.tax_cents;
            report.total_discount_cents += sale.discount_cents;
            report.sale_count += 1;

            let date = sale.created_at.date_naive();
            let bucket = daily.entry(date).or_insert(DailyRevenue {
                date,
                revenue_cents: 0,
                sale_count: 0,
            });
            bucket.revenue_cents += sale.total_cents;
            bucket.sale_count += 1;

            for item in &entry.items {
                let revenue = item.line_total().cents();
                match products.iter_mut().find(|p| p.product_id == item.product_id) {
                    Some(p) => {
                        p.quantity += item.quantity;
                        p.revenue_cents += revenue;
                    }
                    None => products.push(ProductRevenue {
                        product_id: item.product_id.clone(),
                        code: item.code_snapshot.clone(),
                        name: item.name_snapshot.clone(),
                        quantity: item.quantity,
                        revenue_cents: revenue,
                    }),
                }
            }
        }

        // stable: ties keep first-encountered order
        products.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
        products.truncate(top_n);

        report.daily = daily.into_values().collect();
        report.top_products = products;
        report
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSummary {
    #[ts(as = "String")]
    pub today: NaiveDate,
    pub today_revenue_cents: i64,
    pub today_sale_count: i64,
    pub month_revenue_cents: i64,
    /// Seven buckets ending today, ascending, zero-filled.
    pub last_7_days: Vec<DailyRevenue>,
}

impl DashboardSummary {
    /// The window of sales [`DashboardSummary::build`] needs: from the
    /// earlier of the first of the month and six days ago, through today.
    pub fn window(today: NaiveDate) -> DateRange {
        let month_start = today.with_day(1).unwrap_or(today);
        let week_start = today - Duration::days(6);
        DateRange {
            start: month_start.min(week_start),
            end: today,
        }
    }

    pub fn build(today: NaiveDate, sales: &[SaleWithItems]) -> DashboardSummary {
        let month = DateRange {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        };
        let week = DateRange {
            start: today - Duration::days(6),
            end: today,
        };

        let month_report = SalesReport::build(month, sales, 0);
        let week_report = SalesReport::build(week, sales, 0);

        let last_7_days = week
            .days()
            .map(|date| {
                week_report
                    .daily
                    .iter()
                    .find(|d| d.date == date)
                    .copied()
                    .unwrap_or(DailyRevenue {
                        date,
                        revenue_cents: 0,
                        sale_count: 0,
                    })
            })
            .collect::<Vec<_>>();

        let (today_revenue_cents, today_sale_count) = last_7_days
            .last()
            .map(|d| (d.revenue_cents, d.sale_count))
            .unwrap_or((0, 0));

        DashboardSummary {
            today,
            today_revenue_cents,
            today_sale_count,
            month_revenue_cents: month_report.total_revenue_cents,
            last_7_days,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, Sale, SaleItem};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale_at(
        id: &str,
        at: DateTime<Utc>,
        total: i64,
        items: &[(&str, i64, i64)],
    ) -> SaleWithItems {
        SaleWithItems {
            sale: Sale {
                id: id.to_string(),
                customer_id: None,
                user_id: "u".to_string(),
                subtotal_cents: total,
                tax_cents: 0,
                discount_cents: 0,
                total_cents: total,
                payment_method: PaymentMethod::Cash,
                created_at: at,
            },
            items: items
                .iter()
                .enumerate()
                .map(|(i, (product, qty, price))| SaleItem {
                    id: format!("{id}-{i}"),
                    sale_id: id.to_string(),
                    product_id: product.to_string(),
                    code_snapshot: product.to_uppercase(),
                    name_snapshot: format!("Product {product}"),
                    quantity: *qty,
                    unit_price_cents: *price,
                    created_at: at,
                })
                .collect(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_range_validation_and_bounds() {
        assert!(DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());

        let range = DateRange::single_day(date(2024, 3, 1));
        let (from, to) = range.bounds();
        assert_eq!(from, at(2024, 3, 1, 0));
        assert_eq!(to, at(2024, 3, 2, 0));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap()));
        assert!(!range.contains(at(2024, 3, 2, 0)));
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_empty_range_yields_zeros() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let report = SalesReport::build(range, &[], 5);
        assert_eq!(report.total_revenue_cents, 0);
        assert_eq!(report.sale_count, 0);
        assert!(report.daily.is_empty());
        assert!(report.top_products.is_empty());
    }

    #[test]
    fn test_report_sums_only_in_range() {
        let sales = vec![
            sale_at("s1", at(2024, 3, 1, 9), 1_000, &[("a", 1, 1_000)]),
            sale_at("s2", at(2024, 3, 2, 9), 2_000, &[("b", 2, 1_000)]),
            sale_at("s3", at(2024, 3, 3, 9), 4_000, &[("a", 4, 1_000)]),
        ];
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();
        let report = SalesReport::build(range, &sales, 5);

        assert_eq!(report.total_revenue_cents, 3_000);
        assert_eq!(report.sale_count, 2);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[0].date, date(2024, 3, 1));
        assert_eq!(report.daily[1].revenue_cents, 2_000);
    }

    #[test]
    fn test_daily_buckets_ascending() {
        let sales = vec![
            sale_at("late", at(2024, 3, 5, 9), 500, &[]),
            sale_at("early", at(2024, 3, 1, 9), 700, &[]),
            sale_at("early2", at(2024, 3, 1, 18), 300, &[]),
        ];
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let report = SalesReport::build(range, &sales, 5);

        let dates: Vec<_> = report.daily.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 5)]);
        assert_eq!(report.daily[0].revenue_cents, 1_000);
        assert_eq!(report.daily[0].sale_count, 2);
    }

    #[test]
    fn test_top_products_ranked_with_stable_ties() {
        let sales = vec![
            sale_at("s1", at(2024, 3, 1, 9), 0, &[("x", 1, 500), ("y", 1, 500)]),
            sale_at("s2", at(2024, 3, 1, 10), 0, &[("z", 3, 1_000), ("w", 1, 100)]),
        ];
        let range = DateRange::single_day(date(2024, 3, 1));
        let report = SalesReport::build(range, &sales, 3);

        let ids: Vec<_> = report
            .top_products
            .iter()
            .map(|p| p.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
        assert_eq!(report.top_products[0].quantity, 3);
        assert_eq!(report.top_products[0].revenue_cents, 3_000);
    }

    #[test]
    fn test_dashboard_zero_fills_week() {
        let today = date(2024, 3, 10);
        let sales = vec![
            sale_at("old", at(2024, 2, 28, 9), 9_999, &[]),
            sale_at("month", at(2024, 3, 2, 9), 1_000, &[]),
            sale_at("week", at(2024, 3, 6, 9), 2_000, &[]),
            sale_at("today", at(2024, 3, 10, 9), 3_000, &[]),
        ];
        let summary = DashboardSummary::build(today, &sales);

        assert_eq!(summary.today_revenue_cents, 3_000);
        assert_eq!(summary.today_sale_count, 1);
        assert_eq!(summary.month_revenue_cents, 6_000);
        assert_eq!(summary.last_7_days.len(), 7);
        assert_eq!(summary.last_7_days[0].date, date(2024, 3, 4));
        assert_eq!(summary.last_7_days[2].revenue_cents, 2_000);
        assert_eq!(summary.last_7_days[1].revenue_cents, 0);
    }

    #[test]
    fn test_dashboard_window_early_in_month() {
        let window = DashboardSummary::window(date(2024, 3, 2));
        assert_eq!(window.start, date(2024, 2, 25));
        assert_eq!(window.end, date(2024, 3, 2));

        let window = DashboardSummary::window(date(2024, 3, 20));
        assert_eq!(window.start, date(2024, 3, 1));
    }
}
