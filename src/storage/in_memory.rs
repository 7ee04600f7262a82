//! In-memory store implementations
//!
//! Used in development and by the test suite. Thread safety comes from
//! `RwLock`; the order store derives the next order number while holding
//! the write lock, which is what makes numbering safe under concurrent
//! creation.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::{Customer, NewOrder, Order, PriceList, next_order_number};

use super::{CustomerStore, OrderStore, PriceListStore};

#[derive(Clone, Default)]
pub struct InMemoryCustomerStore {
    customers: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn create(&self, customer: Customer) -> Result<Customer> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        customers.insert(customer.id, customer.clone());

        Ok(customer)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Customer>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(customers.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Customer>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(customers.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, customer: Customer) -> Result<Customer> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        if !customers.contains_key(id) {
            return Err(anyhow!("customer not found"));
        }

        customers.insert(*id, customer.clone());

        Ok(customer)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        customers.remove(id);

        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, new_order: NewOrder) -> Result<Order> {
        // The number is derived and the order inserted under one write
        // lock: reserve-and-commit, not read-and-guess.
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let year = Utc::now().year();
        let number = next_order_number(
            orders.values().map(|order| order.order_number.as_str()),
            year,
        );

        let order = new_order.into_order(number);
        orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(orders.get(id).cloned())
    }

    async fn find_by_parcel_number(&self, parcel_number: &str) -> Result<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(orders
            .values()
            .find(|order| order.parcel_number.as_deref() == Some(parcel_number))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(orders.values().cloned().collect())
    }

    async fn count_by_customer(&self, customer_id: &Uuid) -> Result<usize> {
        let orders = self
            .orders
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(orders
            .values()
            .filter(|order| &order.customer_id == customer_id)
            .count())
    }

    async fn update(&self, id: &Uuid, order: Order) -> Result<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        if !orders.contains_key(id) {
            return Err(anyhow!("order not found"));
        }

        orders.insert(*id, order.clone());

        Ok(order)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        orders.remove(id);

        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPriceListStore {
    rows: Arc<RwLock<Vec<PriceList>>>,
}

impl InMemoryPriceListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceListStore for InMemoryPriceListStore {
    async fn append(&self, row: PriceList) -> Result<PriceList> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        rows.push(row.clone());

        Ok(row)
    }

    async fn current(&self, now: DateTime<Utc>) -> Result<Option<PriceList>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(rows
            .iter()
            .filter(|row| row.valid_from <= now)
            .max_by_key(|row| row.valid_from)
            .cloned())
    }

    async fn history(&self) -> Result<Vec<PriceList>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        let mut rows: Vec<PriceList> = rows.clone();
        rows.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        Ok(rows)
    }
}
