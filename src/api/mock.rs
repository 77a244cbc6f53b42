//! Scripted in-memory megaverse for driver tests.
//!
//! Every call is recorded. Failures are queued per call: each matching call
//! pops one status and fails with it, and once the queue is empty the call
//! succeeds.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use reqwest::{Method, StatusCode};

use super::{Megaverse, RemoteError, Result};
use crate::goal::GoalMap;
use crate::model::{Color, Direction, GridObject, ObjectKind, Position};

/// One call made against the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Create(GridObject),
    Delete(ObjectKind, Position),
}

impl Call {
    pub fn delete(object: &GridObject) -> Self {
        Self::Delete(object.kind(), object.position())
    }
}

#[derive(Debug, Default)]
pub struct MockMegaverse {
    goal: GoalMap,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashMap<Call, VecDeque<StatusCode>>>,
}

impl MockMegaverse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_goal(goal: GoalMap) -> Self {
        Self {
            goal,
            ..Self::default()
        }
    }

    /// Queue failures for `call`, consumed one per matching call.
    pub fn failing(self, call: Call, statuses: &[StatusCode]) -> Self {
        self.failures
            .borrow_mut()
            .entry(call)
            .or_default()
            .extend(statuses.iter().copied());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);

        let next_failure = self
            .failures
            .borrow_mut()
            .get_mut(&call)
            .and_then(VecDeque::pop_front);

        match next_failure {
            Some(status) => {
                let (method, endpoint) = match call {
                    Call::Create(object) => (Method::POST, endpoint(object.kind())),
                    Call::Delete(kind, _) => (Method::DELETE, endpoint(kind)),
                };
                Err(RemoteError::Status {
                    method,
                    endpoint: endpoint.to_string(),
                    status,
                    body: String::new(),
                })
            }
            None => Ok(()),
        }
    }
}

fn endpoint(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Polyanet => "polyanets",
        ObjectKind::Soloon => "soloons",
        ObjectKind::Cometh => "comeths",
    }
}

impl Megaverse for MockMegaverse {
    fn fetch_goal(&self) -> Result<GoalMap> {
        Ok(self.goal.clone())
    }

    fn create_polyanet(&self, position: Position) -> Result<()> {
        self.record(Call::Create(GridObject::Polyanet { position }))
    }

    fn delete_polyanet(&self, position: Position) -> Result<()> {
        self.record(Call::Delete(ObjectKind::Polyanet, position))
    }

    fn create_soloon(&self, position: Position, color: Color) -> Result<()> {
        self.record(Call::Create(GridObject::Soloon { position, color }))
    }

    fn delete_soloon(&self, position: Position) -> Result<()> {
        self.record(Call::Delete(ObjectKind::Soloon, position))
    }

    fn create_cometh(&self, position: Position, direction: Direction) -> Result<()> {
        self.record(Call::Create(GridObject::Cometh {
            position,
            direction,
        }))
    }

    fn delete_cometh(&self, position: Position) -> Result<()> {
        self.record(Call::Delete(ObjectKind::Cometh, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_routes_by_kind() {
        let mock = MockMegaverse::new();
        let soloon = GridObject::Soloon {
            position: Position::new(1, 0),
            color: Color::Red,
        };

        mock.create(&soloon).unwrap();
        mock.delete(&soloon).unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                Call::Create(soloon),
                Call::Delete(ObjectKind::Soloon, Position::new(1, 0)),
            ]
        );
    }

    #[test]
    fn serves_the_configured_goal() {
        let goal = GoalMap::from_rows(&[&["SPACE", "POLYANET"]]);
        let mock = MockMegaverse::with_goal(goal.clone());
        assert_eq!(mock.fetch_goal().unwrap(), goal);
    }

    #[test]
    fn queued_failures_are_consumed_in_order() {
        let position = Position::new(0, 0);
        let call = Call::Delete(ObjectKind::Polyanet, position);
        let mock = MockMegaverse::new().failing(call, &[StatusCode::TOO_MANY_REQUESTS]);

        let err = mock.delete_polyanet(position).unwrap_err();
        assert!(err.is_rate_limited());
        assert!(mock.delete_polyanet(position).is_ok());
    }
}
