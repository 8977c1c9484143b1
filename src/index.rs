//! Domain index: lookup tables over the plant data.
//!
//! All handles are positions in the owning [`Problem`](crate::models::Problem)
//! collections. The index is built once and never mutated.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{Machine, Operation, ProductionOrder, Worker};

/// Resolved prerequisites of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prerequisites {
    /// Indices of prerequisite operations.
    pub operations: BTreeSet<usize>,
    /// Prerequisite ids that match no operation. Such an operation can never
    /// become ready.
    pub dangling: usize,
}

/// Lookup tables derived from workers, machines, operations and orders.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    workers_by_position: HashMap<String, Vec<usize>>,
    machines_by_type: HashMap<String, Vec<usize>>,
    operations_by_requirement: HashMap<(String, String), Vec<usize>>,
    operations_by_position: HashMap<String, Vec<usize>>,
    operations_by_machine_type: HashMap<String, Vec<usize>>,
    prerequisites: Vec<Prerequisites>,
    dependents: Vec<usize>,
    operation_order: Vec<Option<usize>>,
    operation_ids: HashMap<String, usize>,
    // Per operation: its worker position group and machine type group.
    eligible_workers: Vec<Vec<usize>>,
    eligible_machines: Vec<Vec<usize>>,
}

impl DomainIndex {
    /// Builds every table. Total and deterministic.
    pub fn build(
        workers: &[Worker],
        machines: &[Machine],
        operations: &[Operation],
        orders: &[ProductionOrder],
    ) -> Self {
        let mut workers_by_position: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, w) in workers.iter().enumerate() {
            workers_by_position
                .entry(w.position.clone())
                .or_default()
                .push(i);
        }

        let mut machines_by_type: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, m) in machines.iter().enumerate() {
            machines_by_type
                .entry(m.machine_type.clone())
                .or_default()
                .push(i);
        }

        let mut operations_by_requirement: HashMap<(String, String), Vec<usize>> = HashMap::new();
        let mut operations_by_position: HashMap<String, Vec<usize>> = HashMap::new();
        let mut operations_by_machine_type: HashMap<String, Vec<usize>> = HashMap::new();
        let mut operation_ids = HashMap::with_capacity(operations.len());
        for (i, op) in operations.iter().enumerate() {
            operations_by_requirement
                .entry((op.required_position.clone(), op.required_machine_type.clone()))
                .or_default()
                .push(i);
            operations_by_position
                .entry(op.required_position.clone())
                .or_default()
                .push(i);
            operations_by_machine_type
                .entry(op.required_machine_type.clone())
                .or_default()
                .push(i);
            operation_ids.insert(op.id.clone(), i);
        }

        let mut dependents = vec![0usize; operations.len()];
        let prerequisites: Vec<Prerequisites> = operations
            .iter()
            .map(|op| {
                let mut resolved = Prerequisites::default();
                for id in &op.prerequisites {
                    match operation_ids.get(id) {
                        Some(&j) => {
                            resolved.operations.insert(j);
                        }
                        None => resolved.dangling += 1,
                    }
                }
                resolved
            })
            .collect();
        for prereqs in &prerequisites {
            for &j in &prereqs.operations {
                dependents[j] += 1;
            }
        }

        let order_ids: HashMap<&str, usize> = orders
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.as_str(), i))
            .collect();
        let operation_order = operations
            .iter()
            .map(|op| order_ids.get(op.order_id.as_str()).copied())
            .collect();

        let eligible_workers = operations
            .iter()
            .map(|op| {
                workers_by_position
                    .get(&op.required_position)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();
        let eligible_machines = operations
            .iter()
            .map(|op| {
                machines_by_type
                    .get(&op.required_machine_type)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        Self {
            workers_by_position,
            machines_by_type,
            operations_by_requirement,
            operations_by_position,
            operations_by_machine_type,
            prerequisites,
            dependents,
            operation_order,
            operation_ids,
            eligible_workers,
            eligible_machines,
        }
    }

    pub fn workers_for_position(&self, position: &str) -> &[usize] {
        self.workers_by_position
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn machines_for_type(&self, machine_type: &str) -> &[usize] {
        self.machines_by_type
            .get(machine_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Operations needing exactly this (position, machine type) pair.
    pub fn operations_with_requirement(&self, position: &str, machine_type: &str) -> &[usize] {
        self.operations_by_requirement
            .get(&(position.to_string(), machine_type.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Operations a worker of `position` can staff.
    pub fn operations_for_position(&self, position: &str) -> &[usize] {
        self.operations_by_position
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Operations a machine of `machine_type` can run.
    pub fn operations_for_machine_type(&self, machine_type: &str) -> &[usize] {
        self.operations_by_machine_type
            .get(machine_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Workers whose position matches the operation.
    pub fn eligible_workers(&self, op: usize) -> &[usize] {
        &self.eligible_workers[op]
    }

    /// Machines whose type matches the operation.
    pub fn eligible_machines(&self, op: usize) -> &[usize] {
        &self.eligible_machines[op]
    }

    pub fn prerequisites(&self, op: usize) -> &Prerequisites {
        &self.prerequisites[op]
    }

    /// Number of operations that list `op` as a prerequisite.
    pub fn dependent_count(&self, op: usize) -> usize {
        self.dependents[op]
    }

    /// Order index owning the operation.
    pub fn order_of(&self, op: usize) -> Option<usize> {
        self.operation_order[op]
    }

    pub fn operation_index(&self, id: &str) -> Option<usize> {
        self.operation_ids.get(id).copied()
    }

    /// Whether every prerequisite of `op` is marked in `completed`.
    ///
    /// Operations on a dependency cycle or with dangling prerequisites never
    /// become ready; no cycle detection is performed.
    pub fn is_ready(&self, op: usize, completed: &[bool]) -> bool {
        let prereqs = &self.prerequisites[op];
        prereqs.dangling == 0 && prereqs.operations.iter().all(|&j| completed[j])
    }

    /// Dependency map of one order: its operations and their in-order
    /// prerequisites.
    pub fn order_dependencies(&self, order: usize) -> BTreeMap<usize, BTreeSet<usize>> {
        (0..self.operation_order.len())
            .filter(|&op| self.operation_order[op] == Some(order))
            .map(|op| {
                let within = self.prerequisites[op]
                    .operations
                    .iter()
                    .copied()
                    .filter(|&j| self.operation_order[j] == Some(order))
                    .collect();
                (op, within)
            })
            .collect()
    }
}
