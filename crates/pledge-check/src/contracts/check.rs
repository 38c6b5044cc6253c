//! Contract checking logic: bind predicate arguments, evaluate, produce violations.
//!
//! Called by the dispatch wrapper before the body runs (preconditions) and
//! after it returns (postconditions), once for the callable's own conditions
//! and once per linked ancestor method.

use indexmap::IndexMap;

use pledge_core::{CallArgs, CallableId, Signature, Value};

use crate::contracts::predicate::{Bindings, Predicate};
use crate::contracts::{ContractKind, ContractViolation};

/// Parameter name a postcondition binds the return value to when its
/// predicate declares none.
pub const RESULT_PARAM: &str = "result";

/// A precondition attached to a callable.
#[derive(Debug, Clone)]
pub struct PreconditionCheck {
    predicate: Predicate,
}

impl PreconditionCheck {
    pub fn new(predicate: Predicate) -> Self {
        PreconditionCheck { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Binds the predicate's declared parameters against an actual call.
    ///
    /// Names are zipped against the positional view of the call (receiver
    /// removed, trailing parameters filled from keywords or defaults);
    /// names left over are looked up among the keyword arguments, and
    /// anything still missing binds to `Value::None`.
    pub fn bind(&self, signature: &Signature, args: &CallArgs) -> Bindings {
        let view = signature.positional_view(args);
        let params = self.predicate.params();

        let mut named: IndexMap<String, Value> = params
            .iter()
            .zip(&view)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for name in params.iter().skip(named.len()) {
            let value = args.keyword(name).cloned().unwrap_or_default();
            named.insert(name.clone(), value);
        }

        Bindings::new(named, view)
    }
}

/// A postcondition attached to a callable.
#[derive(Debug, Clone)]
pub struct PostconditionCheck {
    predicate: Predicate,
}

impl PostconditionCheck {
    pub fn new(predicate: Predicate) -> Self {
        PostconditionCheck { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Binds the return value to the predicate's single parameter.
    pub fn bind(&self, result: &Value) -> Bindings {
        let name = self
            .predicate
            .params()
            .first()
            .map_or(RESULT_PARAM, String::as_str);
        Bindings::single(name, result)
    }
}

/// Check all preconditions attached to one callable, in attachment order.
///
/// `signature` is the signature of the callable actually being invoked; for
/// inherited conditions that is the override, not the ancestor. The first
/// failing predicate aborts the call.
pub fn check_preconditions(
    owner: (&str, CallableId),
    checks: &[PreconditionCheck],
    signature: &Signature,
    args: &CallArgs,
) -> Result<(), ContractViolation> {
    for check in checks {
        let bindings = check.bind(signature, args);
        if !check.predicate.evaluate(&bindings) {
            return Err(ContractViolation {
                kind: ContractKind::Precondition,
                label: check.predicate.label().to_string(),
                callable: owner.0.to_string(),
                callable_id: owner.1,
                inputs: bindings.inputs(),
                actual_return: None,
            });
        }
    }
    Ok(())
}

/// Check all postconditions attached to one callable against the value the
/// call returned.
pub fn check_postconditions(
    owner: (&str, CallableId),
    checks: &[PostconditionCheck],
    result: &Value,
) -> Result<(), ContractViolation> {
    for check in checks {
        let bindings = check.bind(result);
        if !check.predicate.evaluate(&bindings) {
            return Err(ContractViolation {
                kind: ContractKind::Postcondition,
                label: check.predicate.label().to_string(),
                callable: owner.0.to_string(),
                callable_id: owner.1,
                inputs: bindings.inputs(),
                actual_return: Some(result.clone()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition;
    use pledge_core::Param;

    const OWNER: (&str, CallableId) = ("add", CallableId(0));

    fn add() -> Signature {
        Signature::of(["x", "y"]).unwrap()
    }

    #[test]
    fn binds_positionally() {
        let check = PreconditionCheck::new(condition!(|x, y| x > 0 && y > 0));
        let b = check.bind(&add(), &CallArgs::positional_from([10, 20]));
        assert_eq!(b["x"], Value::Int(10));
        assert_eq!(b["y"], Value::Int(20));
    }

    #[test]
    fn binds_keywords_and_mixed() {
        let check = PreconditionCheck::new(condition!(|x, y| x > 0 && y > 0));

        let b = check.bind(&add(), &CallArgs::new().kwarg("y", 2).kwarg("x", 1));
        assert_eq!(b["x"], Value::Int(1));
        assert_eq!(b["y"], Value::Int(2));

        let b = check.bind(&add(), &CallArgs::new().arg(1).kwarg("y", 2));
        assert_eq!(b["x"], Value::Int(1));
        assert_eq!(b["y"], Value::Int(2));
    }

    #[test]
    fn predicate_names_zip_by_position() {
        // The predicate may name its parameters differently from the target.
        let check = PreconditionCheck::new(condition!(|a, b| a == 1 && b == 2));
        let b = check.bind(&add(), &CallArgs::positional_from([1, 2]));
        assert_eq!(b["a"], Value::Int(1));
        assert_eq!(b["b"], Value::Int(2));
    }

    #[test]
    fn falsy_values_are_bound_positionally() {
        let check = PreconditionCheck::new(condition!(|x| x == 0));
        let b = check.bind(&add(), &CallArgs::positional_from([0, 1]));
        assert_eq!(b["x"], Value::Int(0));
    }

    #[test]
    fn missing_arguments_bind_to_none() {
        let check = PreconditionCheck::new(condition!(|x, y| x.is_none() && y.is_none()));
        let b = check.bind(&add(), &CallArgs::new());
        assert!(b["x"].is_none());
        assert!(b["y"].is_none());
    }

    #[test]
    fn defaults_are_backfilled() {
        let sig = Signature::new([Param::required("x"), Param::optional("y", 10)]).unwrap();
        let check = PreconditionCheck::new(condition!(|x, y| x > 0 && y == 10));
        let b = check.bind(&sig, &CallArgs::new().arg(1));
        assert_eq!(b["y"], Value::Int(10));
    }

    #[test]
    fn receiver_is_excluded() {
        let sig = Signature::of(["self", "x"]).unwrap();
        let check = PreconditionCheck::new(condition!(|x| x > 5));
        let args = CallArgs::new().arg(Value::from("receiver")).arg(6);
        assert_eq!(check.bind(&sig, &args)["x"], Value::Int(6));
    }

    #[test]
    fn first_failing_precondition_is_reported() {
        let checks = vec![
            PreconditionCheck::new(condition!(|x| x > 0)),
            PreconditionCheck::new(condition!(|_x, y| y > 0)),
        ];
        let args = CallArgs::positional_from([1, -1]);
        let err = check_preconditions(OWNER, &checks, &add(), &args).unwrap_err();
        assert_eq!(err.kind, ContractKind::Precondition);
        assert!(err.label.contains("y > 0"));
        assert_eq!(err.callable, "add");
        assert_eq!(err.actual_return, None);
        assert!(err.to_string().starts_with("precondition failure in add:"));
    }

    #[test]
    fn postconditions_see_return_value() {
        let checks = vec![PostconditionCheck::new(condition!(|rt| rt > 0))];
        assert!(check_postconditions(OWNER, &checks, &Value::Int(20)).is_ok());

        let err = check_postconditions(OWNER, &checks, &Value::Int(0)).unwrap_err();
        assert!(err.is_postcondition());
        assert_eq!(err.actual_return, Some(Value::Int(0)));
        assert_eq!(err.inputs, vec![("rt".to_string(), Value::Int(0))]);
    }
}
