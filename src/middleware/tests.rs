use super::{compose, handler, Handler, Next};
use crate::context::Context;
use crate::error::DispatchError;
use http::Method;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Handler that records `name` on the way in and out
fn wrapping(log: &Log, name: &'static str) -> Handler {
    let log = Arc::clone(log);
    handler(move |ctx, next| {
        log.lock().unwrap().push(format!("{name} in"));
        next.run(ctx)?;
        log.lock().unwrap().push(format!("{name} out"));
        Ok(())
    })
}

fn ctx() -> Context {
    Context::new(Method::GET, "/")
}

#[test]
fn test_onion_order() {
    let log = new_log();
    let chain = compose([wrapping(&log, "a"), wrapping(&log, "b"), wrapping(&log, "c")]);

    chain.run(&mut ctx()).unwrap();

    assert_eq!(
        entries(&log),
        ["a in", "b in", "c in", "c out", "b out", "a out"]
    );
}

#[test]
fn test_terminal_continuation_runs_after_last_handler() {
    let log = new_log();
    let inner = compose([wrapping(&log, "inner")]);
    let terminal_log = Arc::clone(&log);
    let outer = compose([
        inner.into_handler(),
        handler(move |_ctx, _next| {
            terminal_log.lock().unwrap().push("terminal".to_string());
            Ok(())
        }),
    ]);

    outer.run(&mut ctx()).unwrap();

    assert_eq!(entries(&log), ["inner in", "terminal", "inner out"]);
}

#[test]
fn test_short_circuit_skips_downstream_and_terminal() {
    let log = new_log();
    let stop_log = Arc::clone(&log);
    let inner = compose([
        handler(move |_ctx, _next| {
            stop_log.lock().unwrap().push("stop".to_string());
            Ok(())
        }),
        wrapping(&log, "unreached"),
    ]);
    let after = compose([inner.into_handler(), wrapping(&log, "after")]);

    after.run(&mut ctx()).unwrap();

    assert_eq!(entries(&log), ["stop"]);
}

#[test]
fn test_double_next_fails_with_reentrant_invocation() {
    let chain = compose([
        handler(|ctx, next| {
            let again = next.clone();
            next.run(ctx)?;
            again.run(ctx)
        }),
        handler(|_ctx, _next| Ok(())),
    ]);

    let err = chain.run(&mut ctx()).unwrap_err();
    assert!(matches!(err, DispatchError::ReentrantInvocation { index: 1 }));
}

#[test]
fn test_next_after_downstream_progress_is_rejected() {
    // An earlier continuation re-entered after a deeper one already ran
    let stash: Arc<Mutex<Option<usize>>> = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&stash);
    let chain = compose([
        handler(move |ctx, next| {
            let again = next.clone();
            next.run(ctx)?;
            *seen.lock().unwrap() = Some(1);
            again.run(ctx)
        }),
        handler(|ctx, next| next.run(ctx)),
        handler(|_ctx, _next| Ok(())),
    ]);

    let err = chain.run(&mut ctx()).unwrap_err();
    assert!(matches!(err, DispatchError::ReentrantInvocation { index: 1 }));
    assert_eq!(*stash.lock().unwrap(), Some(1));
}

#[test]
fn test_handler_error_propagates_unchanged() {
    let log = new_log();
    let chain = compose([
        wrapping(&log, "outer"),
        handler(|_ctx, _next| Err(anyhow::anyhow!("boom").into())),
    ]);

    let err = chain.run(&mut ctx()).unwrap_err();
    assert!(err.is_handler_error());
    assert_eq!(err.to_string(), "boom");
    // The failure unwinds through the outer handler's `?`
    assert_eq!(entries(&log), ["outer in"]);
}

#[test]
fn test_outer_failure_becomes_chain_result() {
    let outer = compose([
        compose([handler(|ctx, next| next.run(ctx))]).into_handler(),
        handler(|_ctx, _next| Err(anyhow::anyhow!("terminal failed").into())),
    ]);

    let err = outer.run(&mut ctx()).unwrap_err();
    assert_eq!(err.to_string(), "terminal failed");
}

#[test]
fn test_each_call_gets_fresh_cursor() {
    let log = new_log();
    let chain = compose([wrapping(&log, "a")]);

    chain.run(&mut ctx()).unwrap();
    chain.run(&mut ctx()).unwrap();

    assert_eq!(entries(&log), ["a in", "a out", "a in", "a out"]);
}

#[test]
fn test_empty_chain_calls_outer_next() {
    let log = new_log();
    let reached = Arc::clone(&log);
    let outer = compose([
        compose(Vec::new()).into_handler(),
        handler(move |_ctx, _next| {
            reached.lock().unwrap().push("reached".to_string());
            Ok(())
        }),
    ]);

    outer.run(&mut ctx()).unwrap();
    assert_eq!(entries(&log), ["reached"]);
}

#[test]
fn test_end_is_terminal() {
    let next = Next::end();
    assert!(next.is_end());
    assert!(next.run(&mut ctx()).is_ok());
}

#[test]
fn test_handlers_share_context_mutations() {
    let chain = compose([
        handler(|ctx, next| {
            ctx.status = 201;
            next.run(ctx)
        }),
        handler(|ctx, _next| {
            assert_eq!(ctx.status, 201);
            ctx.json(serde_json::json!({ "ok": true }));
            Ok(())
        }),
    ]);

    let mut ctx = ctx();
    chain.run(&mut ctx).unwrap();
    assert_eq!(ctx.status, 200);
    assert_eq!(ctx.body, Some(serde_json::json!({ "ok": true })));
}
