//! Rules as data
//!
//! A rule set is a slice of [`Condition`]s over one entity type. [`evaluate`]
//! interprets it: failed `must`s become errors, failed `should`s become warnings,
//! and a `could` only evaluates its nested conditions when its guard holds.

use crate::entities::EntityKind;
use crate::id::EntityId;

use super::result::{Finding, ValidationResult};

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

pub enum Condition<'a, T: ?Sized> {
    Must {
        check: Predicate<'a, T>,
        message: String,
    },
    Should {
        check: Predicate<'a, T>,
        message: String,
    },
    Could {
        guard: Predicate<'a, T>,
        nested: Vec<Condition<'a, T>>,
    },
}

/// Violation is an error
pub fn must<'a, T, F>(check: F, message: impl Into<String>) -> Condition<'a, T>
where
    T: ?Sized,
    F: Fn(&T) -> bool + 'a,
{
    Condition::Must {
        check: Box::new(check),
        message: message.into(),
    }
}

/// Violation is a warning
pub fn should<'a, T, F>(check: F, message: impl Into<String>) -> Condition<'a, T>
where
    T: ?Sized,
    F: Fn(&T) -> bool + 'a,
{
    Condition::Should {
        check: Box::new(check),
        message: message.into(),
    }
}

/// Evaluate `nested` only when `guard` holds
pub fn could<'a, T, F>(guard: F, nested: Vec<Condition<'a, T>>) -> Condition<'a, T>
where
    T: ?Sized,
    F: Fn(&T) -> bool + 'a,
{
    Condition::Could {
        guard: Box::new(guard),
        nested,
    }
}

/// Run `conditions` against `entity`, tagging every finding with `id` and `kind`.
pub fn evaluate<T: ?Sized>(
    id: &EntityId,
    kind: EntityKind,
    entity: &T,
    conditions: &[Condition<'_, T>],
) -> ValidationResult {
    let mut result = ValidationResult::new();
    evaluate_into(&mut result, id, kind, entity, conditions);
    result
}

fn evaluate_into<T: ?Sized>(
    result: &mut ValidationResult,
    id: &EntityId,
    kind: EntityKind,
    entity: &T,
    conditions: &[Condition<'_, T>],
) {
    for condition in conditions {
        match condition {
            Condition::Must { check, message } => {
                if !check(entity) {
                    result.push(Finding::error(id, kind, message.as_str()));
                }
            }
            Condition::Should { check, message } => {
                if !check(entity) {
                    result.push(Finding::warning(id, kind, message.as_str()));
                }
            }
            Condition::Could { guard, nested } => {
                if guard(entity) {
                    evaluate_into(result, id, kind, entity, nested);
                }
            }
        }
    }
}
