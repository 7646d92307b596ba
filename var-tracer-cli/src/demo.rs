//! Instrumented demo workload
//!
//! A small stock-keeping simulation with instrumentation calls at function
//! boundaries: a free function with loop-mutated locals and a struct whose
//! fields change across method calls, enough to give both renderers
//! realistic output.

use var_tracer::{runtime, snapshot, Inspect, InspectError, Value};

/// Stock item whose fields are exposed to the tracer
pub struct StockItem {
    name: String,
    quantity: i64,
    reserved: i64,
    _audit_token: u64,
}

impl Inspect for StockItem {
    fn type_name(&self) -> &str {
        "StockItem"
    }

    fn fields(&self) -> Result<Vec<(String, Value)>, InspectError> {
        Ok(vec![
            ("name".to_string(), Value::from(self.name.as_str())),
            ("quantity".to_string(), Value::from(self.quantity)),
            ("reserved".to_string(), Value::from(self.reserved)),
            ("_audit_token".to_string(), Value::from(self._audit_token as i64)),
        ])
    }
}

impl StockItem {
    pub fn new(name: &str, quantity: i64) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            reserved: 0,
            _audit_token: 0x5eed,
        }
    }

    /// Reserve part of the stock, reporting each step to the tracer
    pub fn reserve(&mut self, amount: i64) -> bool {
        runtime::on_call(
            module_path!(),
            file!(),
            "reserve",
            Some(&*self),
            snapshot! { amount = amount },
        );

        let available = self.quantity - self.reserved;
        let granted = available >= amount;
        if granted {
            self.reserved += amount;
        }

        runtime::on_return(
            module_path!(),
            file!(),
            "reserve",
            Some(&*self),
            snapshot! { amount = amount, available = available, granted = granted },
        );
        granted
    }
}

/// Accumulate a restock order, tracing the evolving totals
pub fn restock_order(units: &[i64]) -> i64 {
    runtime::on_call(module_path!(), file!(), "restock_order", None, snapshot! {});

    let mut total = 0i64;
    let mut batches = 0i64;
    for unit in units {
        total += unit;
        batches += 1;
        runtime::on_line(
            module_path!(),
            file!(),
            "restock_order",
            None,
            snapshot! { total = total, batches = batches },
        );
    }

    runtime::on_return(
        module_path!(),
        file!(),
        "restock_order",
        None,
        snapshot! { total = total, batches = batches },
    );
    total
}

/// Run the demo workload under the installed tracer
pub fn run() {
    let restocked = restock_order(&[5, 5, 12]);

    let mut item = StockItem::new("widget", restocked);
    let first = item.reserve(8);
    let second = item.reserve(40);

    log::info!(
        "Workload done: restocked {}, reservations granted: {}, {}",
        restocked,
        first,
        second
    );
}
