//! Orchestrator tests: end-to-end runs, failure propagation, exclusivity, cancellation.

use sigflow::engine::{ExclusiveToken, HashPrimitives, Signers, crc32_decimal, md5_hex};
use sigflow::pipeline::{
    Cancel, HashError, Inbox, ItemError, ItemFailure, Outbox, Pipeline, PipelineError, Stage,
};
use sigflow::stages::{CombineResults, Generate, MultiHash, SingleHash};
use sigflow::{Concurrency, HashLatency, Item, ItemKind, SignOpts, build_signer_pipeline};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const FIXTURE_0_1: &str = "29568666068035183841425683795340791879727309630931025356555_4958044192186797981418233587017209679042592862002427381542";

/// Records how many `expensive` calls overlap. Fails `expensive` for the text "bad".
#[derive(Default)]
struct Instrumented {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    hold: Duration,
}

impl Instrumented {
    fn holding(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }
}

impl HashPrimitives for Instrumented {
    fn cheap(&self, text: &str) -> String {
        crc32_decimal(text)
    }

    fn expensive(&self, text: &str) -> Result<String, HashError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.hold);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text == "bad" {
            return Err(HashError::Failed("digest backend rejected input".to_string()));
        }
        Ok(md5_hex(text))
    }
}

fn signer_pipeline(primitives: Arc<dyn HashPrimitives>, concurrency: Concurrency) -> Pipeline {
    let opts = SignOpts {
        concurrency,
        ..SignOpts::default()
    };
    build_signer_pipeline(&opts, primitives, Arc::new(ExclusiveToken::new())).unwrap()
}

fn single_text(items: Vec<Item>) -> String {
    assert_eq!(items.len(), 1, "collector must emit exactly one item");
    items.into_iter().next().and_then(Item::into_text).unwrap()
}

fn ints(range: std::ops::Range<i64>) -> Vec<Item> {
    range.map(Item::Int).collect()
}

// --- end-to-end ---

#[test]
fn test_run_reproduces_fixture_every_time() {
    for _ in 0..5 {
        let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
        let out = p.run(vec![Item::Int(0), Item::Int(1)]).unwrap();
        assert_eq!(single_text(out), FIXTURE_0_1);
    }
}

#[test]
fn test_generator_source_stage() {
    let primitives: Arc<dyn HashPrimitives> = Arc::new(Signers::default());
    let p = Pipeline::new(vec![
        Box::new(Generate::new([Item::Int(0), Item::Int(1)])),
        Box::new(SingleHash::new(Arc::clone(&primitives), Arc::new(ExclusiveToken::new()))),
        Box::new(MultiHash::new(primitives)),
        Box::new(CombineResults::default()),
    ])
    .unwrap();
    let out = p.run(Vec::new()).unwrap();
    assert_eq!(single_text(out), FIXTURE_0_1);
}

#[test]
fn test_count_preserved_through_collector() {
    let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
    let out = single_text(p.run(ints(0..25)).unwrap());
    assert_eq!(out.split('_').count(), 25);
}

#[test]
fn test_duplicates_are_not_deduplicated() {
    let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
    let out = single_text(p.run(vec![Item::Int(1), Item::Int(1)]).unwrap());
    let parts: Vec<&str> = out.split('_').collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], parts[1]);
}

#[test]
fn test_bounded_workers_match_per_item() {
    let unbounded = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem)
        .run(ints(0..12))
        .unwrap();
    let bounded = signer_pipeline(Arc::new(Signers::default()), Concurrency::Workers(3))
        .run(ints(0..12))
        .unwrap();
    assert_eq!(unbounded, bounded);
}

#[test]
fn test_fan_out_runs_items_concurrently() {
    let latency = HashLatency {
        cheap: Duration::from_millis(100),
        expensive: Duration::from_millis(5),
    };
    let p = signer_pipeline(Arc::new(Signers::new(latency)), Concurrency::PerItem);
    let start = Instant::now();
    let out = p.run(ints(0..6)).unwrap();
    // Serially this is 6 * (2 + 6) checksums = 4.8 s.
    assert!(start.elapsed() < Duration::from_millis(1500), "{:?}", start.elapsed());
    assert_eq!(single_text(out).split('_').count(), 6);
}

// --- collector barrier ---

#[test]
fn test_collector_alone_is_order_independent() {
    let run = |v: &[&str]| {
        Pipeline::new(vec![Box::new(CombineResults::default())])
            .unwrap()
            .run(v.iter().map(|s| Item::from(*s)).collect::<Vec<_>>())
            .unwrap()
    };
    assert_eq!(run(&["b", "a", "c"]), vec![Item::from("a_b_c")]);
    assert_eq!(run(&["c", "b", "a"]), vec![Item::from("a_b_c")]);
}

#[test]
fn test_collector_empty_input_emits_empty_string() {
    let out = Pipeline::new(vec![Box::new(CombineResults::default())])
        .unwrap()
        .run(Vec::new())
        .unwrap();
    assert_eq!(out, vec![Item::from("")]);
}

// --- exclusivity ---

#[test]
fn test_expensive_never_overlaps() {
    let prim = Arc::new(Instrumented::holding(Duration::from_millis(3)));
    let p = signer_pipeline(prim.clone(), Concurrency::PerItem);
    let out = p.run(ints(0..16)).unwrap();
    assert_eq!(single_text(out).split('_').count(), 16);
    assert_eq!(prim.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(prim.calls.load(Ordering::SeqCst), 16);
}

#[test]
fn test_token_shared_across_stages() {
    let prim = Arc::new(Instrumented::holding(Duration::from_millis(2)));
    let primitives: Arc<dyn HashPrimitives> = prim.clone();
    let token = Arc::new(ExclusiveToken::new());
    let p = Pipeline::new(vec![
        Box::new(SingleHash::new(Arc::clone(&primitives), Arc::clone(&token))),
        Box::new(SingleHash::new(Arc::clone(&primitives), token)),
        Box::new(CombineResults::default()),
    ])
    .unwrap();
    p.run(ints(0..10)).unwrap();
    assert_eq!(prim.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(prim.calls.load(Ordering::SeqCst), 20);
}

#[test]
fn test_default_signers_never_overheat_under_load() {
    let latency = HashLatency {
        cheap: Duration::ZERO,
        expensive: Duration::from_millis(2),
    };
    let p = signer_pipeline(Arc::new(Signers::new(latency)), Concurrency::PerItem);
    assert!(p.run(ints(0..20)).is_ok());
}

// --- construction ---

#[test]
fn test_empty_pipeline_rejected() {
    assert!(matches!(Pipeline::new(Vec::new()), Err(PipelineError::Empty)));
}

#[test]
fn test_incompatible_chain_rejected_at_construction() {
    let err = Pipeline::new(vec![
        Box::new(Generate::new([Item::Int(0), Item::Bytes(vec![0])])),
        Box::new(SingleHash::new(
            Arc::new(Signers::default()),
            Arc::new(ExclusiveToken::new()),
        )),
    ])
    .unwrap_err();
    match err {
        PipelineError::Incompatible {
            stage, name, emits, ..
        } => {
            assert_eq!(stage, 1);
            assert_eq!(name, "single_hash");
            assert_eq!(emits, ItemKind::Bytes);
        }
        other => panic!("unexpected: {other}"),
    }
}

// --- failures ---

#[test]
fn test_bytes_seed_fails_stage_a() {
    let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
    let err = p
        .run(vec![Item::Int(0), Item::Bytes(vec![9]), Item::Int(1)])
        .unwrap_err();
    match err {
        PipelineError::Item {
            stage,
            name,
            index,
            source: ItemError::UnexpectedKind { found, .. },
        } => {
            assert_eq!(stage, 0);
            assert_eq!(name, "single_hash");
            assert_eq!(index, 1);
            assert_eq!(found, ItemKind::Bytes);
        }
        other => panic!("unexpected: {other}"),
    }
}

#[test]
fn test_int_item_fails_stage_b() {
    let p = Pipeline::new(vec![
        Box::new(MultiHash::new(Arc::new(Signers::default()))),
        Box::new(CombineResults::default()),
    ])
    .unwrap();
    let err = p.run(vec![Item::Int(3)]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Item {
            stage: 0,
            name: "multi_hash",
            index: 0,
            source: ItemError::UnexpectedKind {
                found: ItemKind::Int,
                ..
            },
        }
    ));
}

#[test]
fn test_expensive_failure_is_terminal() {
    let prim = Arc::new(Instrumented::default());
    let p = signer_pipeline(prim, Concurrency::Workers(1));
    let err = p
        .run(vec![Item::Int(0), Item::from("bad"), Item::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Item {
            stage: 0,
            index: 1,
            source: ItemError::Hash(HashError::Failed(_)),
            ..
        }
    ));
    assert_eq!(err.stage(), Some(0));
}

struct Exploding;

impl Stage for Exploding {
    fn name(&self) -> &'static str {
        "exploding"
    }

    fn accepts(&self) -> &'static [ItemKind] {
        &[ItemKind::Text]
    }

    fn emits(&self) -> &'static [ItemKind] {
        &[ItemKind::Text]
    }

    fn process(&self, input: &mut Inbox, _output: &Outbox) -> Result<(), ItemFailure> {
        if input.next().is_some() {
            panic!("boom");
        }
        Ok(())
    }
}

#[test]
fn test_panicking_stage_reported() {
    let p = Pipeline::new(vec![
        Box::new(Exploding),
        Box::new(CombineResults::default()),
    ])
    .unwrap();
    let err = p.run(vec![Item::from("x")]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Panicked {
            stage: 0,
            name: "exploding"
        }
    ));
}

// --- streaming + cancellation ---

#[test]
fn test_spawn_streaming_interface() {
    let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
    let mut running = p.spawn().unwrap();
    assert!(running.send(Item::Int(1)));
    assert!(running.send(Item::Int(0)));
    running.close_input();
    assert!(!running.send(Item::Int(2)));
    let out: Vec<Item> = running.output().iter().collect();
    running.wait().unwrap();
    assert_eq!(single_text(out), FIXTURE_0_1);
}

#[test]
fn test_cancelled_before_start() {
    let cancel = Cancel::new();
    cancel.cancel();
    let p = signer_pipeline(Arc::new(Signers::default()), Concurrency::PerItem);
    let err = p.run_with_cancel(ints(0..4), cancel).unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

#[test]
fn test_cancel_mid_run_yields_no_result() {
    let latency = HashLatency {
        cheap: Duration::from_millis(200),
        expensive: Duration::ZERO,
    };
    let p = signer_pipeline(Arc::new(Signers::new(latency)), Concurrency::PerItem);
    let running = p.spawn().unwrap();
    for i in 0..4 {
        running.send(Item::Int(i));
    }
    thread::sleep(Duration::from_millis(50));
    running.cancel();
    let output = running.output().clone();
    assert!(matches!(running.wait(), Err(PipelineError::Cancelled)));
    assert!(output.try_recv().is_err());
}
