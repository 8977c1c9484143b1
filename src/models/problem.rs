//! Validated problem instance.

use std::collections::{HashMap, HashSet};

use super::{Machine, Operation, ProductionOrder, Worker};
use crate::error::HarmonyError;
use crate::index::DomainIndex;

/// The read-only facts of one optimization run plus their lookup tables.
///
/// Built once by [`Problem::new`], which rejects structurally invalid input.
/// Unsatisfiable requirements (no worker of a position, prerequisites that
/// never complete) are accepted and only lower the achievable fitness.
#[derive(Debug, Clone)]
pub struct Problem {
    workers: Vec<Worker>,
    machines: Vec<Machine>,
    operations: Vec<Operation>,
    orders: Vec<ProductionOrder>,
    index: DomainIndex,
}

impl Problem {
    /// Validates the collections and builds the domain index.
    ///
    /// # Errors
    /// - [`HarmonyError::DuplicateId`] when ids repeat within one collection
    /// - [`HarmonyError::UnknownOrder`] when an operation names a missing order
    /// - [`HarmonyError::UnknownOperation`] when an order lists a missing operation
    /// - [`HarmonyError::ForeignOperation`] when an order lists another order's operation
    /// - [`HarmonyError::RepeatedOperation`] when an order lists an operation twice
    /// - [`HarmonyError::UnlistedOperation`] when an operation is absent from its order's list
    pub fn new(
        workers: Vec<Worker>,
        machines: Vec<Machine>,
        operations: Vec<Operation>,
        orders: Vec<ProductionOrder>,
    ) -> Result<Self, HarmonyError> {
        ensure_unique("worker", workers.iter().map(|w| w.id.as_str()))?;
        ensure_unique("machine", machines.iter().map(|m| m.id.as_str()))?;
        ensure_unique("operation", operations.iter().map(|o| o.id.as_str()))?;
        ensure_unique("production order", orders.iter().map(|o| o.id.as_str()))?;

        let order_ids: HashSet<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        if let Some(op) = operations
            .iter()
            .find(|op| !order_ids.contains(op.order_id.as_str()))
        {
            return Err(HarmonyError::UnknownOrder {
                operation: op.id.clone(),
                order: op.order_id.clone(),
            });
        }

        let owners: HashMap<&str, &str> = operations
            .iter()
            .map(|o| (o.id.as_str(), o.order_id.as_str()))
            .collect();
        let mut listed = HashSet::new();
        for order in &orders {
            for id in &order.operations {
                let Some(&owner) = owners.get(id.as_str()) else {
                    return Err(HarmonyError::UnknownOperation {
                        order: order.id.clone(),
                        operation: id.clone(),
                    });
                };
                if owner != order.id {
                    return Err(HarmonyError::ForeignOperation {
                        order: order.id.clone(),
                        operation: id.clone(),
                        owner: owner.to_string(),
                    });
                }
                if !listed.insert(id.as_str()) {
                    return Err(HarmonyError::RepeatedOperation {
                        order: order.id.clone(),
                        operation: id.clone(),
                    });
                }
            }
        }
        if let Some(op) = operations.iter().find(|op| !listed.contains(op.id.as_str())) {
            return Err(HarmonyError::UnlistedOperation {
                operation: op.id.clone(),
                order: op.order_id.clone(),
            });
        }

        let index = DomainIndex::build(&workers, &machines, &operations, &orders);
        Ok(Self {
            workers,
            machines,
            operations,
            orders,
            index,
        })
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn orders(&self) -> &[ProductionOrder] {
        &self.orders
    }

    pub fn index(&self) -> &DomainIndex {
        &self.index
    }

    /// Total number of entities, used to scale search parameters.
    pub fn data_size(&self) -> usize {
        self.workers.len() + self.machines.len() + self.operations.len() + self.orders.len()
    }

    /// A deep copy of the operations with cleared KPI totals and logs.
    pub fn fresh_operations(&self) -> Vec<Operation> {
        self.operations
            .iter()
            .map(|op| {
                let mut op = op.clone();
                op.reset();
                op
            })
            .collect()
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), HarmonyError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(HarmonyError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
