//! Integration Tests for Decorated Types
//!
//! Drives declared types through eligibility, planning, and cached calls using
//! only the public API.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use memo_decorator::{
    key_args, synthesize, synthesize_all, CacheAnnotation, Config, Decorated, DecoratorPlan,
    Diagnostic, DiagnosticCode, Dispatch, MemoError, MethodDecl, MethodIdentity, SourceLocation,
    TypeDecl,
};

// == Fixtures ==

trait Calculator {
    fn compute(&self, a: i32, b: i32) -> i32;
    fn tita_test(&self, a: i32, b: i32) -> i32;
    fn fixed(&self, a: i32, b: i32) -> i32;
    fn checked_div(&self, a: i32, b: i32) -> Result<i32, String>;
}

#[derive(Default)]
struct Minus {
    calls: AtomicU32,
}

impl Minus {
    fn count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Calculator for Minus {
    fn compute(&self, a: i32, b: i32) -> i32 {
        self.bump();
        a - b
    }

    fn tita_test(&self, a: i32, b: i32) -> i32 {
        self.bump();
        sleep(Duration::from_millis(200));
        a + b
    }

    fn fixed(&self, a: i32, b: i32) -> i32 {
        self.bump();
        a * b
    }

    fn checked_div(&self, a: i32, b: i32) -> Result<i32, String> {
        self.bump();
        if b == 0 {
            Err("division by zero".to_string())
        } else {
            Ok(a / b)
        }
    }
}

fn id(name: &str) -> MethodIdentity {
    MethodIdentity::new("Minus", name, &["i32", "i32"]).unwrap()
}

impl Calculator for Decorated<Minus> {
    fn compute(&self, a: i32, b: i32) -> i32 {
        self.invoke(&id("compute"), key_args![a, b], |m| m.compute(a, b))
    }

    fn tita_test(&self, a: i32, b: i32) -> i32 {
        self.invoke(&id("tita_test"), key_args![a, b], |m| m.tita_test(a, b))
    }

    fn fixed(&self, a: i32, b: i32) -> i32 {
        self.invoke(&id("fixed"), key_args![a, b], |m| m.fixed(a, b))
    }

    fn checked_div(&self, a: i32, b: i32) -> Result<i32, String> {
        self.try_invoke(&id("checked_div"), key_args![a, b], |m| m.checked_div(a, b))
    }
}

fn minus_decl(extensible: bool) -> TypeDecl {
    TypeDecl::new("Minus", extensible)
        .at(SourceLocation::new("minus.rs", 3, 1))
        .method(
            MethodDecl::new(id("compute"), Dispatch::Virtual).annotated(
                CacheAnnotation::new()
                    .absolute_seconds(0.3)
                    .sliding_seconds(0.1),
            ),
        )
        .method(
            MethodDecl::new(id("tita_test"), Dispatch::Override).annotated(CacheAnnotation::new()),
        )
        .method(
            MethodDecl::new(id("fixed"), Dispatch::Final)
                .annotated(CacheAnnotation::new())
                .at(SourceLocation::new("minus.rs", 21, 5)),
        )
        .method(
            MethodDecl::new(id("checked_div"), Dispatch::Virtual)
                .annotated(CacheAnnotation::new()),
        )
}

fn minus_plan() -> Arc<DecoratorPlan> {
    let mut sink: Vec<Diagnostic> = Vec::new();
    Arc::new(synthesize(&minus_decl(true), &mut sink).unwrap())
}

// == End-to-End Examples ==

#[test]
fn test_compute_with_absolute_and_sliding_ttl() {
    let d = Decorated::new(Minus::default(), minus_plan());

    assert_eq!(d.compute(2, 1), 1);
    assert_eq!(d.inner().count(), 1);

    // Within the sliding window
    sleep(Duration::from_millis(20));
    assert_eq!(d.compute(2, 1), 1);
    assert_eq!(d.inner().count(), 1);

    // Idle past both windows
    sleep(Duration::from_millis(400));
    assert_eq!(d.compute(2, 1), 1);
    assert_eq!(d.inner().count(), 2);
}

#[test]
fn test_slow_method_is_fast_on_hit() {
    let d = Decorated::new(Minus::default(), minus_plan());

    let start = Instant::now();
    assert_eq!(d.tita_test(2, 1), 3);
    assert!(start.elapsed() >= Duration::from_millis(200));

    let start = Instant::now();
    assert_eq!(d.tita_test(2, 1), 3);
    assert!(start.elapsed() < Duration::from_millis(100));
    assert_eq!(d.inner().count(), 1);
}

#[test]
fn test_joined_arguments_share_an_entry() {
    struct Joiner;
    let join_id = MethodIdentity::new("Joiner", "join", &["str..."]).unwrap();
    let ty = TypeDecl::new("Joiner", true).method(
        MethodDecl::new(join_id.clone(), Dispatch::Virtual).annotated(CacheAnnotation::new()),
    );
    let mut sink: Vec<Diagnostic> = Vec::new();
    let d = Decorated::new(Joiner, Arc::new(synthesize(&ty, &mut sink).unwrap()));

    assert_eq!(
        d.derive_key_default(&join_id, key_args!["a;b"]),
        d.derive_key_default(&join_id, key_args!["a", "b"])
    );

    let first = d.invoke(&join_id, key_args!["a;b"], |_| "one argument".to_string());
    let second = d.invoke(&join_id, key_args!["a", "b"], |_| "two arguments".to_string());
    assert_eq!(first, "one argument");
    assert_eq!(second, "one argument");
}

// == Eligibility and Planning ==

#[test]
fn test_final_method_passes_through_with_warning() {
    let mut sink: Vec<Diagnostic> = Vec::new();
    let plan = synthesize(&minus_decl(true), &mut sink).unwrap();

    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].code, DiagnosticCode::NonOverridable);
    assert_eq!(sink[0].subject, "fixed");
    assert_eq!(sink[0].location, SourceLocation::new("minus.rs", 21, 5));

    let d = Decorated::new(Minus::default(), Arc::new(plan));
    for _ in 0..3 {
        assert_eq!(d.fixed(2, 3), 6);
    }
    assert_eq!(d.inner().count(), 3);
    assert!(d.store().is_empty());
}

#[test]
fn test_sealed_owner_is_fatal() {
    let mut sink: Vec<Diagnostic> = Vec::new();
    let result = synthesize(&minus_decl(false), &mut sink);

    assert_eq!(result.unwrap_err(), MemoError::SealedOwner("Minus".to_string()));
    assert_eq!(sink.len(), 1);
    assert!(sink[0].is_error());
    assert_eq!(sink[0].location.line, 3);
}

#[test]
fn test_batch_planning_keeps_going_past_sealed_owner() {
    let sealed = TypeDecl::new("Vault", false).method(
        MethodDecl::new(
            MethodIdentity::new("Vault", "open", &[]).unwrap(),
            Dispatch::Virtual,
        )
        .annotated(CacheAnnotation::new()),
    );
    let mut sink: Vec<Diagnostic> = Vec::new();
    let report = synthesize_all(&[sealed, minus_decl(true)], &mut sink);

    assert!(report.plan_for("Minus").is_some());
    assert_eq!(report.failures, vec![MemoError::SealedOwner("Vault".to_string())]);
}

#[test]
fn test_recursive_method_is_flagged_and_still_cached() {
    struct Fib;
    let fib = MethodIdentity::new("Fib", "fib", &["u64"]).unwrap();
    let ty = TypeDecl::new("Fib", true).method(
        MethodDecl::new(fib.clone(), Dispatch::Virtual)
            .annotated(CacheAnnotation::new())
            .calls(fib.clone(), SourceLocation::new("fib.rs", 7, 20))
            .calls(fib.clone(), SourceLocation::new("fib.rs", 7, 37)),
    );
    let mut sink: Vec<Diagnostic> = Vec::new();
    let plan = synthesize(&ty, &mut sink).unwrap();

    let columns: Vec<u32> = sink.iter().map(|d| d.location.column).collect();
    assert_eq!(columns, vec![20, 37]);
    assert!(sink.iter().all(|d| d.code == DiagnosticCode::SelfRecursive));

    let runs = AtomicU32::new(0);
    let d = Decorated::new(Fib, Arc::new(plan));
    for _ in 0..2 {
        let value = d.invoke(&fib, key_args![10u64], |_| {
            runs.fetch_add(1, Ordering::SeqCst);
            55u64
        });
        assert_eq!(value, 55);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

// == Failure Propagation ==

#[test]
fn test_errors_propagate_and_are_not_cached() {
    let d = Decorated::new(Minus::default(), minus_plan());

    assert_eq!(d.checked_div(4, 0), Err("division by zero".to_string()));
    assert_eq!(d.checked_div(4, 0), Err("division by zero".to_string()));
    assert_eq!(d.inner().count(), 2);

    assert_eq!(d.checked_div(4, 2), Ok(2));
    assert_eq!(d.checked_div(4, 2), Ok(2));
    assert_eq!(d.inner().count(), 3);
}

#[test]
fn test_panic_propagates_and_is_not_cached() {
    let d = Decorated::new(Minus::default(), minus_plan());

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        d.invoke(&id("compute"), key_args![9i32, 9i32], |_| -> i32 {
            panic!("wrapped method failed")
        })
    }));
    assert!(outcome.is_err());
    assert!(d.store().is_empty());

    assert_eq!(d.compute(9, 9), 0);
    assert_eq!(d.inner().count(), 1);
}

// == Sharing and Concurrency ==

#[test]
fn test_each_decorator_owns_its_store() {
    let plan = minus_plan();
    let first = Decorated::new(Minus::default(), Arc::clone(&plan));
    let second = Decorated::new(Minus::default(), plan);

    first.tita_test(5, 5);
    second.tita_test(5, 5);

    assert_eq!(first.inner().count(), 1);
    assert_eq!(second.inner().count(), 1);
    assert_eq!(first.store().len(), 1);
    assert_eq!(second.store().len(), 1);
}

#[test]
fn test_racing_misses_both_run_and_last_write_wins() {
    let d = Arc::new(Decorated::new(Minus::default(), minus_plan()));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [(10, 0u64), (20, 80u64)]
        .into_iter()
        .map(|(result, delay_ms)| {
            let d = Arc::clone(&d);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                d.invoke(&id("tita_test"), key_args![7i32, 7i32], |m| {
                    m.bump();
                    // Both callers are past their lookup before either stores
                    barrier.wait();
                    sleep(Duration::from_millis(delay_ms));
                    result
                })
            })
        })
        .collect();

    let mut results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort();
    assert_eq!(results, vec![10, 20]);
    assert_eq!(d.inner().count(), 2);

    assert_eq!(d.tita_test(7, 7), 20);
    assert_eq!(d.inner().count(), 2);
}

#[test]
fn test_concurrent_distinct_keys() {
    let d = Arc::new(Decorated::new(Minus::default(), minus_plan()));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let d = Arc::clone(&d);
            thread::spawn(move || {
                for _ in 0..20 {
                    assert_eq!(d.checked_div(100, n + 1), Ok(100 / (n + 1)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(d.store().len(), 8);
}

// == Configuration ==

#[test]
fn test_bounded_store_from_config() {
    let config = Config {
        max_entries: 2,
        ..Config::default()
    };
    let d = Decorated::from_config(Minus::default(), minus_plan(), &config);

    assert_eq!(d.checked_div(10, 1), Ok(10));
    assert_eq!(d.checked_div(10, 2), Ok(5));
    assert_eq!(d.checked_div(10, 5), Ok(2));

    assert_eq!(d.store().len(), 2);
    assert_eq!(d.store_stats().evictions, 1);
}

#[test]
fn test_annotation_from_json() {
    let annotation = CacheAnnotation::from_json(
        r#"{"absoluteExpirationRelativeToNowSeconds": -1, "slidingExpirationSeconds": 0, "hashingMethod": "sha512"}"#,
    )
    .unwrap();
    let ty = TypeDecl::new("Minus", true)
        .method(MethodDecl::new(id("compute"), Dispatch::Virtual).annotated(annotation));
    let mut sink: Vec<Diagnostic> = Vec::new();
    let d = Decorated::new(Minus::default(), Arc::new(synthesize(&ty, &mut sink).unwrap()));

    // Zero sliding TTL expires on the next lookup; negative absolute is unset
    d.compute(2, 1);
    d.compute(2, 1);
    assert_eq!(d.inner().count(), 2);

    assert!(matches!(
        CacheAnnotation::from_json("{not json"),
        Err(MemoError::InvalidAnnotation(_))
    ));
}
