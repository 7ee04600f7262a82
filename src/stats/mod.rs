//! Read-only rollups for the dashboard and monthly billing
//!
//! Everything here is a pure function over the order and customer sets,
//! computed fresh per request. `now` is a parameter so the windows
//! (today, this month, this year, next 7 days) are testable.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Customer, Order, OrderStatus, PaymentMethod, PaymentStatus};

/// How many days ahead a deadline counts as "upcoming".
const DEADLINE_WINDOW_DAYS: i64 = 7;

/// How many orders the dashboard lists as recent.
const RECENT_ORDER_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// A recent or deadline-listed order with its customer display name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub total_gross: i64,
    pub order_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_orders: usize,
    pub in_production: usize,
    pub completed: usize,
    pub monthly_revenue: i64,
    pub yearly_revenue: i64,
    pub unpaid_amount: i64,
    pub today_orders: usize,
    pub recent_orders: Vec<OrderSummary>,
    pub upcoming_deadlines: Vec<OrderSummary>,
    pub orders_by_status: Vec<StatusCount>,
    pub orders_by_payment_status: Vec<StatusCount>,
}

fn customer_name(customers: &HashMap<Uuid, Customer>, id: &Uuid) -> String {
    customers
        .get(id)
        .map(|customer| customer.display_name().to_string())
        .unwrap_or_else(|| "Unknown customer".to_string())
}

fn summarize(order: &Order, customers: &HashMap<Uuid, Customer>) -> OrderSummary {
    OrderSummary {
        id: order.id,
        order_number: order.order_number.clone(),
        customer_name: customer_name(customers, &order.customer_id),
        total_gross: order.total_gross,
        order_status: order.order_status,
        deadline: order.deadline,
        created_at: order.created_at,
    }
}

/// Compute the dashboard rollup.
pub fn dashboard(
    orders: &[Order],
    customers: &HashMap<Uuid, Customer>,
    now: DateTime<Utc>,
) -> DashboardStats {
    let today = now.date_naive();
    let start_of_month = today.with_day(1).unwrap_or(today);
    let start_of_year = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let deadline_cutoff = today + Duration::days(DEADLINE_WINDOW_DAYS);

    let active_orders = orders
        .iter()
        .filter(|o| o.order_status != OrderStatus::Closed)
        .count();
    let in_production = orders
        .iter()
        .filter(|o| o.order_status == OrderStatus::InProduction)
        .count();
    let completed = orders
        .iter()
        .filter(|o| matches!(o.order_status, OrderStatus::Ready | OrderStatus::Shipped))
        .count();

    let paid_revenue = |since: NaiveDate| -> i64 {
        orders
            .iter()
            .filter(|o| o.payment_status == PaymentStatus::Paid)
            .filter(|o| o.created_at.date_naive() >= since)
            .map(|o| o.total_gross)
            .sum()
    };
    let monthly_revenue = paid_revenue(start_of_month);
    let yearly_revenue = paid_revenue(start_of_year);

    let unpaid_amount = orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Unpaid)
        .map(|o| o.total_gross)
        .sum();

    let today_orders = orders
        .iter()
        .filter(|o| o.created_at.date_naive() == today)
        .count();

    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent_orders = recent
        .iter()
        .take(RECENT_ORDER_LIMIT)
        .map(|o| summarize(o, customers))
        .collect();

    let mut deadlines: Vec<&Order> = orders
        .iter()
        .filter(|o| {
            !matches!(o.order_status, OrderStatus::Shipped | OrderStatus::Closed)
                && o.deadline
                    .map(|d| d >= today && d <= deadline_cutoff)
                    .unwrap_or(false)
        })
        .collect();
    deadlines.sort_by_key(|o| o.deadline);
    let upcoming_deadlines = deadlines.iter().map(|o| summarize(o, customers)).collect();

    let status_counts = |statuses: &[(String, usize)]| -> Vec<StatusCount> {
        statuses
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(status, count)| StatusCount {
                status: status.clone(),
                count: *count,
            })
            .collect()
    };

    let orders_by_status = status_counts(
        &[
            OrderStatus::New,
            OrderStatus::InProduction,
            OrderStatus::Ready,
            OrderStatus::Shipped,
            OrderStatus::Closed,
        ]
        .map(|status| {
            (
                status.as_str().to_string(),
                orders.iter().filter(|o| o.order_status == status).count(),
            )
        }),
    );

    let orders_by_payment_status = status_counts(
        &[
            PaymentStatus::Unpaid,
            PaymentStatus::PartiallyPaid,
            PaymentStatus::Paid,
        ]
        .map(|status| {
            (
                status.as_str().to_string(),
                orders
                    .iter()
                    .filter(|o| o.payment_status == status)
                    .count(),
            )
        }),
    );

    DashboardStats {
        active_orders,
        in_production,
        completed,
        monthly_revenue,
        yearly_revenue,
        unpaid_amount,
        today_orders,
        recent_orders,
        upcoming_deadlines,
        orders_by_status,
        orders_by_payment_status,
    }
}

/// Filters for the monthly billing report
#[derive(Debug, Clone, Copy, Default)]
pub struct BillingFilter {
    pub customer_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBillingSummary {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_count: usize,
    pub total_square_meters: f64,
    pub total_net: i64,
    pub total_vat: i64,
    pub total_gross: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub total_orders: usize,
    pub total_square_meters: f64,
    pub total_net: i64,
    pub total_vat: i64,
    pub total_gross: i64,
    pub by_customer: Vec<CustomerBillingSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingReport {
    pub orders: Vec<Order>,
    pub summary: BillingSummary,
}

/// Roll up monthly-billed orders, optionally filtered by customer and by
/// the calendar month the order was created in.
pub fn monthly_billing(
    orders: &[Order],
    customers: &HashMap<Uuid, Customer>,
    filter: BillingFilter,
) -> BillingReport {
    let mut selected: Vec<Order> = orders
        .iter()
        .filter(|o| o.payment_method == PaymentMethod::MonthlyBilling)
        .filter(|o| {
            filter
                .customer_id
                .map(|id| o.customer_id == id)
                .unwrap_or(true)
        })
        .filter(|o| match (filter.year, filter.month) {
            (Some(year), Some(month)) => {
                let created = o.created_at.date_naive();
                created.year() == year && created.month() == month
            }
            _ => true,
        })
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut by_customer: HashMap<Uuid, CustomerBillingSummary> = HashMap::new();
    for order in &selected {
        let entry = by_customer
            .entry(order.customer_id)
            .or_insert_with(|| CustomerBillingSummary {
                customer_id: order.customer_id,
                customer_name: customer_name(customers, &order.customer_id),
                order_count: 0,
                total_square_meters: 0.0,
                total_net: 0,
                total_vat: 0,
                total_gross: 0,
            });
        entry.order_count += 1;
        entry.total_square_meters += order.square_meters;
        entry.total_net += order.total_net;
        entry.total_vat += order.total_vat;
        entry.total_gross += order.total_gross;
    }
    let mut by_customer: Vec<CustomerBillingSummary> = by_customer.into_values().collect();
    by_customer.sort_by(|a, b| a.customer_name.cmp(&b.customer_name));

    let summary = BillingSummary {
        total_orders: selected.len(),
        total_square_meters: selected.iter().map(|o| o.square_meters).sum(),
        total_net: selected.iter().map(|o| o.total_net).sum(),
        total_vat: selected.iter().map(|o| o.total_vat).sum(),
        total_gross: selected.iter().map(|o| o.total_gross).sum(),
        by_customer,
    };

    BillingReport {
        orders: selected,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CustomerInput, NewOrder, OrderInput, PriceList, ShippingMethod, calculate_price,
    };

    fn customer(name: &str) -> Customer {
        Customer::new(CustomerInput {
            name: name.to_string(),
            email: "info@example.hu".to_string(),
            phone: "+36 30 000 0000".to_string(),
            billing_name: name.to_string(),
            billing_zip: "1111".to_string(),
            billing_city: "Budapest".to_string(),
            billing_address: "Utca 1.".to_string(),
            company_name: None,
            tax_number: None,
            shipping_name: None,
            shipping_zip: None,
            shipping_city: None,
            shipping_address: None,
            note: None,
        })
    }

    fn order(customer_id: Uuid, payment_method: PaymentMethod, n: u32) -> Order {
        let input = OrderInput {
            customer_id,
            length_mm: 1000,
            shipping_method: ShippingMethod::Pickup,
            payment_method,
            shipping_address: None,
            description: None,
            payment_date: None,
            deadline: None,
        };
        let prices = calculate_price(
            input.length_mm,
            input.shipping_method,
            input.payment_method,
            &PriceList::seed(),
        );
        NewOrder { input, prices }.into_order(format!("DTF-2025-{:04}", n))
    }

    #[test]
    fn dashboard_counts_statuses_and_revenue() {
        let customer = customer("Teszt Kft.");
        let mut customers = HashMap::new();
        customers.insert(customer.id, customer.clone());
        let now = Utc::now();

        let mut a = order(customer.id, PaymentMethod::Prepaid, 1);
        a.order_status = OrderStatus::InProduction;

        let mut b = order(customer.id, PaymentMethod::Prepaid, 2);
        b.order_status = OrderStatus::Closed;
        b.payment_status = PaymentStatus::Paid;

        let mut c = order(customer.id, PaymentMethod::Prepaid, 3);
        c.order_status = OrderStatus::Ready;

        let orders = vec![a, b.clone(), c];
        let stats = dashboard(&orders, &customers, now);

        assert_eq!(stats.active_orders, 2);
        assert_eq!(stats.in_production, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.today_orders, 3);
        assert_eq!(stats.monthly_revenue, b.total_gross);
        assert_eq!(stats.yearly_revenue, b.total_gross);
        // a and c are unpaid
        assert_eq!(stats.unpaid_amount, orders[0].total_gross + orders[2].total_gross);
        assert_eq!(stats.recent_orders.len(), 3);
        assert_eq!(stats.recent_orders[0].customer_name, "Teszt Kft.");
    }

    #[test]
    fn upcoming_deadlines_window_excludes_shipped_and_far_dates() {
        let customer = customer("Teszt Kft.");
        let mut customers = HashMap::new();
        customers.insert(customer.id, customer.clone());
        let now = Utc::now();
        let today = now.date_naive();

        let mut due = order(customer.id, PaymentMethod::Prepaid, 1);
        due.deadline = Some(today + Duration::days(3));

        let mut far = order(customer.id, PaymentMethod::Prepaid, 2);
        far.deadline = Some(today + Duration::days(30));

        let mut shipped = order(customer.id, PaymentMethod::Prepaid, 3);
        shipped.deadline = Some(today + Duration::days(2));
        shipped.order_status = OrderStatus::Shipped;

        let stats = dashboard(&[due.clone(), far, shipped], &customers, now);
        assert_eq!(stats.upcoming_deadlines.len(), 1);
        assert_eq!(stats.upcoming_deadlines[0].order_number, due.order_number);
    }

    #[test]
    fn status_groupings_skip_empty_buckets() {
        let customer = customer("Teszt Kft.");
        let mut customers = HashMap::new();
        customers.insert(customer.id, customer.clone());

        let orders = vec![order(customer.id, PaymentMethod::Prepaid, 1)];
        let stats = dashboard(&orders, &customers, Utc::now());

        assert_eq!(stats.orders_by_status.len(), 1);
        assert_eq!(stats.orders_by_status[0].status, "new");
        assert_eq!(stats.orders_by_payment_status[0].status, "unpaid");
    }

    #[test]
    fn monthly_billing_filters_and_groups() {
        let alpha = customer("Alpha Kft.");
        let beta = customer("Beta Bt.");
        let mut customers = HashMap::new();
        customers.insert(alpha.id, alpha.clone());
        customers.insert(beta.id, beta.clone());

        let orders = vec![
            order(alpha.id, PaymentMethod::MonthlyBilling, 1),
            order(alpha.id, PaymentMethod::MonthlyBilling, 2),
            order(beta.id, PaymentMethod::MonthlyBilling, 3),
            // Not monthly-billed, must be excluded
            order(beta.id, PaymentMethod::Prepaid, 4),
        ];

        let report = monthly_billing(&orders, &customers, BillingFilter::default());
        assert_eq!(report.summary.total_orders, 3);
        assert_eq!(report.summary.by_customer.len(), 2);
        assert_eq!(report.summary.by_customer[0].customer_name, "Alpha Kft.");
        assert_eq!(report.summary.by_customer[0].order_count, 2);

        let filtered = monthly_billing(
            &orders,
            &customers,
            BillingFilter {
                customer_id: Some(beta.id),
                ..Default::default()
            },
        );
        assert_eq!(filtered.summary.total_orders, 1);

        let created = orders[0].created_at.date_naive();
        let wrong_month = monthly_billing(
            &orders,
            &customers,
            BillingFilter {
                customer_id: None,
                year: Some(created.year()),
                month: Some(if created.month() == 1 { 2 } else { created.month() - 1 }),
            },
        );
        assert_eq!(wrong_month.summary.total_orders, 0);
    }
}
