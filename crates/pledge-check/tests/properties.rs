use pledge_check::{condition, CallArgs, ContractRegistry, Func, Signature, Value};
use proptest::prelude::*;

fn guarded_add(registry: &ContractRegistry) -> Func {
    let add = Func::new("add", Signature::of(["x", "y"]).unwrap(), |a| {
        Ok(Value::Int(a.int("x")?.wrapping_add(a.int("y")?)))
    });
    registry
        .precondition(condition!(|x, y| x > 0 && y > 0))
        .apply(add)
}

proptest! {
    #[test]
    fn precondition_holds_exactly_for_positive_pairs(x in -1000i64..1000, y in -1000i64..1000) {
        let registry = ContractRegistry::new();
        let add = guarded_add(&registry);
        let expect_ok = x > 0 && y > 0;

        for args in [
            CallArgs::new().arg(x).arg(y),
            CallArgs::new().arg(x).kwarg("y", y),
            CallArgs::new().kwarg("x", x).kwarg("y", y),
            CallArgs::new().kwarg("y", y).kwarg("x", x),
        ] {
            let result = add.call(&args);
            prop_assert_eq!(result.is_ok(), expect_ok);
            if let Err(err) = result {
                prop_assert!(err.is_precondition_failure());
            }
        }
    }

    #[test]
    fn postcondition_sees_the_return_value(x in any::<i32>(), y in any::<i32>()) {
        let registry = ContractRegistry::new();
        let add = Func::new("add", Signature::of(["x", "y"]).unwrap(), |a| {
            Ok(Value::Int(a.int("x")? + a.int("y")?))
        });
        let add = registry.postcondition(condition!(|rt| rt >= 0)).apply(add);
        let sum = i64::from(x) + i64::from(y);

        match add.call(&CallArgs::positional_from([x, y])) {
            Ok(value) => prop_assert_eq!(value, Value::Int(sum)),
            Err(err) => {
                prop_assert!(sum < 0);
                let violation = err.violation().unwrap();
                prop_assert_eq!(violation.actual_return.clone(), Some(Value::Int(sum)));
            }
        }
    }
}
