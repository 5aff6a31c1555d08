//! crates/hronir_engine/src/graph.rs
//! Graph invariants: the four checks a proposed `(position,
//! predecessor, current)` edge must pass before it is persisted, in order,
//! each surfacing a specific `InvalidEdgeReason`.

use std::collections::{HashSet, VecDeque};

use hronir_core::error::InvalidEdgeReason;
use hronir_store::dao;
use rusqlite::Connection;
use uuid::Uuid;

/// Validate a proposed edge against the current store state. Runs inside the
/// caller's write transaction so the check observes a consistent snapshot.
pub fn validate_edge(
    conn: &Connection,
    position: u64,
    predecessor: Uuid,
    current: Uuid,
) -> Result<(), InvalidEdgeReason> {
    // 1. `current` must reference an existing hrönir.
    if !dao::hronir_exists(conn, current).unwrap_or(false) {
        return Err(InvalidEdgeReason::CurrentMissing);
    }

    // 2/3. Predecessor rules depend on position.
    if position == 0 {
        if !predecessor.is_nil() {
            return Err(InvalidEdgeReason::PredecessorMismatch);
        }
    } else {
        if predecessor.is_nil() || !dao::hronir_exists(conn, predecessor).unwrap_or(false) {
            return Err(InvalidEdgeReason::PredecessorMissing);
        }
    }

    // 4. At most one path per (position, predecessor, current).
    if dao::find_path_by_triple(conn, position, predecessor, current)
        .unwrap_or(None)
        .is_some()
    {
        return Err(InvalidEdgeReason::DuplicateEdge);
    }

    // 5. Adding the edge must not make `predecessor` reachable from `current`
    //: a BFS over existing (predecessor -> current) edges,
    // starting at `current`, must never reach `predecessor`.
    if position != 0 && would_cycle(conn, predecessor, current) {
        return Err(InvalidEdgeReason::WouldCycle);
    }

    Ok(())
}

fn would_cycle(conn: &Connection, predecessor: Uuid, current: Uuid) -> bool {
    if predecessor == current {
        return true;
    }
    let edges = match dao::list_all_edges(conn) {
        Ok(e) => e,
        Err(_) => return false,
    };
    let mut adjacency: std::collections::HashMap<Uuid, Vec<Uuid>> = std::collections::HashMap::new();
    for (pred, cur) in edges {
        adjacency.entry(pred).or_default().push(cur);
    }

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut queue: VecDeque<Uuid> = VecDeque::new();
    queue.push_back(current);
    visited.insert(current);

    while let Some(node) = queue.pop_front() {
        if node == predecessor {
            return true;
        }
        if let Some(neighbors) = adjacency.get(&node) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use hronir_core::model::Hronir;
    use hronir_store::Store;

    fn mem_store_with_hronirs(ids: &[Uuid]) -> Store {
        let store = Store::open_in_memory().unwrap();
        let guard = store.lock();
        for &id in ids {
            dao::insert_hronir(
                &guard,
                &Hronir {
                    id,
                    text: format!("text-{id}\n"),
                    created_at: "2026-01-01T00:00:00Z".to_string(),
                },
            )
            .unwrap();
        }
        drop(guard);
        store
    }

    #[test]
    fn missing_current_is_rejected() {
        let store = mem_store_with_hronirs(&[]);
        let guard = store.lock();
        let err = validate_edge(&guard, 0, Uuid::nil(), Uuid::from_bytes([1; 16])).unwrap_err();
        assert_eq!(err, InvalidEdgeReason::CurrentMissing);
    }

    #[test]
    fn position_zero_requires_nil_predecessor() {
        let current = Uuid::from_bytes([1; 16]);
        let store = mem_store_with_hronirs(&[current]);
        let guard = store.lock();
        let err = validate_edge(&guard, 0, Uuid::from_bytes([2; 16]), current).unwrap_err();
        assert_eq!(err, InvalidEdgeReason::PredecessorMismatch);
    }

    #[test]
    fn nonzero_position_requires_existing_predecessor() {
        let current = Uuid::from_bytes([1; 16]);
        let store = mem_store_with_hronirs(&[current]);
        let guard = store.lock();
        let err = validate_edge(&guard, 1, Uuid::nil(), current).unwrap_err();
        assert_eq!(err, InvalidEdgeReason::PredecessorMissing);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let h = Uuid::from_bytes([1; 16]);
        let store = mem_store_with_hronirs(&[h]);
        let guard = store.lock();
        let err = validate_edge(&guard, 1, h, h).unwrap_err();
        assert_eq!(err, InvalidEdgeReason::WouldCycle);
    }

    #[test]
    fn valid_edge_passes() {
        let pred = Uuid::from_bytes([1; 16]);
        let cur = Uuid::from_bytes([2; 16]);
        let store = mem_store_with_hronirs(&[pred, cur]);
        let guard = store.lock();
        assert!(validate_edge(&guard, 1, pred, cur).is_ok());
    }
}
