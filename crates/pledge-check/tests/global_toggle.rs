//! The process-wide enable flag. Kept in its own test binary because it
//! flips state every other test in the process would observe.

use pledge_check::{
    condition, enabled, ensure_checked, postcondition, precondition, registry, returns,
    set_enabled, takes, CallArgs, Func, Signature, Value, ValueKind,
};

fn add() -> Func {
    Func::new("add", Signature::of(["x", "y"]).unwrap(), |a| {
        Ok(Value::Int(a.int("x")? + a.int("y")?))
    })
}

#[test]
fn disabling_affects_only_later_decorations() {
    assert!(enabled());

    let guarded = precondition(condition!(|x, y| x > 0 && y > 0)).apply(add());
    assert!(guarded.is_checked());
    let before = registry().len();

    set_enabled(false);
    assert!(!enabled());

    let unguarded = precondition(condition!(|x, y| x > 0 && y > 0)).apply(add());
    let unguarded = postcondition(condition!(|rt| rt > 0)).apply(unguarded);
    let unguarded = takes([ValueKind::Int, ValueKind::Int]).apply(unguarded);
    let unguarded = returns(ValueKind::Str).apply(unguarded);
    let unguarded = ensure_checked(unguarded);

    assert!(!unguarded.is_checked());
    assert_eq!(registry().len(), before);
    assert_eq!(
        unguarded
            .call(&CallArgs::positional_from([-1, -1]))
            .unwrap(),
        Value::Int(-2)
    );

    // Wrapped while enabled, so still checked.
    assert!(guarded
        .call(&CallArgs::positional_from([-1, 10]))
        .unwrap_err()
        .is_precondition_failure());

    set_enabled(true);
    let rewrapped = precondition(condition!(|x| x > 0)).apply(unguarded);
    assert!(rewrapped.is_checked());
    assert!(rewrapped
        .call(&CallArgs::positional_from([-1, 1]))
        .is_err());
}
