use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use powser::{
    Coefficient, Config, Event, EventKind, PowerSeries, RuntimeError, SeriesError, Session,
    Subscribe, add, multiply,
};

fn q(n: i64, d: i64) -> Coefficient {
    Coefficient::new(n, d)
}

fn ints(v: &[i64]) -> Vec<Coefficient> {
    v.iter().map(|&n| q(n, 1)).collect()
}

fn session() -> Session {
    Session::new(Config {
        grace: Duration::from_secs(2),
        ..Config::default()
    })
}

#[tokio::test]
async fn finite_round_trip() {
    let s = session();
    let terms = vec![q(1, 1), q(1, 2), q(1, 3), q(1, 4), q(1, 5)];
    let mut p = s.polynomial(terms.clone());

    assert_eq!(p.pull_all().await.unwrap(), terms);
    assert_eq!(p.pull().await, Ok(None));
}

#[tokio::test]
async fn add_ones_and_twos() {
    let s = session();
    let mut sum = add(s.ones(), s.twos());
    assert_eq!(sum.pull_n(5).await.unwrap(), ints(&[3, 3, 3, 3, 3]));
}

#[tokio::test]
async fn times_ones_ones() {
    let s = session();
    let mut p = s.ones().times([s.ones()]);
    assert_eq!(p.pull_n(5).await.unwrap(), ints(&[1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn integral_inverts_derivative() {
    let s = session();
    let p = vec![q(3, 1), q(-1, 2), q(2, 3), q(5, 1), q(-7, 4)];
    for k in 0..=p.len() {
        let mut back = s
            .polynomial(p.clone())
            .derivative()
            .integral(p[0].clone());
        let mut direct = s.polynomial(p.clone());
        assert_eq!(
            back.pull_n(k).await.unwrap(),
            direct.pull_n(k).await.unwrap()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn times_reciprocal_is_one() {
    let s = session();
    let sources: Vec<fn(&Session) -> PowerSeries> = vec![
        |s| s.ones(),
        |s| s.factorials(),
        |s| s.polynomial(ints(&[2, -3, 1])),
        |s| s.cos(),
    ];
    for make in sources {
        let (a, b) = make(&s).split();
        let mut one = multiply(a, b.reciprocal());
        let mut expected = vec![Coefficient::zero(); 10];
        expected[0] = Coefficient::one();
        assert_eq!(one.pull_n(10).await.unwrap(), expected);
    }
}

#[tokio::test]
async fn split_fidelity_under_skewed_schedules() {
    let s = session();
    let direct = s.harmonics().pull_n(12).await.unwrap();

    // all of A before any of B
    let (mut a, mut b) = s.harmonics().split();
    assert_eq!(a.pull_n(12).await.unwrap(), direct);
    assert_eq!(b.pull_n(12).await.unwrap(), direct);

    // interleaved with changing leaders
    let (mut a, mut b) = s.harmonics().split();
    let mut got_a = Vec::new();
    let mut got_b = Vec::new();
    for (na, nb) in [(1, 3), (4, 0), (0, 5), (7, 4)] {
        got_a.extend(a.pull_n(na).await.unwrap());
        got_b.extend(b.pull_n(nb).await.unwrap());
    }
    assert_eq!(got_a, direct);
    assert_eq!(got_b, direct);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn split_fidelity_with_concurrent_readers() {
    let s = session();
    let direct = s.fibonaccis().pull_n(64).await.unwrap();

    let (mut a, mut b) = s.fibonaccis().split();
    let ra = tokio::spawn(async move {
        let mut out = Vec::new();
        for _ in 0..64 {
            out.push(a.pull().await.unwrap().unwrap());
            tokio::task::yield_now().await;
        }
        out
    });
    let rb = tokio::spawn(async move { b.pull_n(64).await.unwrap() });

    assert_eq!(ra.await.unwrap(), direct);
    assert_eq!(rb.await.unwrap(), direct);
}

#[tokio::test]
async fn split_chain_grows_with_lag_and_shrinks_on_catch_up() {
    let s = session();
    let (mut a, mut b) = s.ones().split();

    // every link up to the lead holds its term until the slow fork reads it
    a.pull_n(200).await.unwrap();
    assert!(s.task_count() >= 200, "lagged: {}", s.task_count());

    b.pull_n(200).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), async {
        while s.task_count() > 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("caught-up chain keeps only the generator and the head link");

    // the forks still agree after the chain collapsed
    assert_eq!(a.pull().await, Ok(Some(Coefficient::one())));
    assert_eq!(b.pull().await, Ok(Some(Coefficient::one())));
}

#[cfg(feature = "logging")]
#[tokio::test]
async fn log_writer_follows_a_session() {
    let log: Arc<dyn Subscribe> = Arc::new(powser::LogWriter::new());
    let s = Session::builder(Config::default())
        .with_subscribers(vec![log])
        .build();
    let mut e = s.ones().exponential();
    e.pull_n(3).await.unwrap();
    s.shutdown().await.unwrap();
}

#[tokio::test]
async fn no_leak_after_dropping_a_fork() {
    let s = session();
    let (a, mut b) = s.polynomial(ints(&[1, 2, 3, 4, 5, 6, 7, 8])).split();
    drop(a);

    let drained = tokio::time::timeout(Duration::from_secs(2), b.pull_all())
        .await
        .expect("draining the surviving fork must not block")
        .unwrap();
    assert_eq!(drained, ints(&[1, 2, 3, 4, 5, 6, 7, 8]));
    drop(b);

    s.join_idle().await.unwrap();
    assert!(s.live_tasks().await.is_empty());
}

#[tokio::test]
async fn no_leak_after_abandoning_a_self_referential_series() {
    let s = session();
    let mut e = s.ones().exponential();
    e.pull_n(6).await.unwrap();
    drop(e);

    s.join_idle().await.unwrap();
    assert_eq!(s.task_count(), 0);
}

#[tokio::test]
async fn exponential_of_ones() {
    let s = session();
    let mut e = s.ones().exponential();
    assert_eq!(
        e.pull_n(5).await.unwrap(),
        vec![q(1, 1), q(1, 1), q(3, 2), q(13, 6), q(73, 24)]
    );
}

#[tokio::test]
async fn arctangent_from_monomial_substitution() {
    let s = session();
    let mut atan = s
        .ones()
        .monomial_substitute(Coefficient::minus_one(), 2)
        .integral(Coefficient::zero());
    assert_eq!(
        atan.pull_n(8).await.unwrap(),
        vec![
            q(0, 1),
            q(1, 1),
            q(0, 1),
            q(-1, 3),
            q(0, 1),
            q(1, 5),
            q(0, 1),
            q(-1, 7)
        ]
    );
}

#[tokio::test]
async fn sin_squared_plus_cos_squared() {
    let s = session();
    let (sin_a, sin_b) = s.sin().split();
    let (cos_a, cos_b) = s.cos().split();
    let mut one = sin_a * sin_b + cos_a * cos_b;

    let mut expected = vec![Coefficient::zero(); 8];
    expected[0] = Coefficient::one();
    assert_eq!(one.pull_n(8).await.unwrap(), expected);
}

#[tokio::test]
async fn division_by_zero_is_reported_to_the_caller_only() {
    let s = session();
    let mut bad = s.polynomial(ints(&[0, 1])).reciprocal();
    let mut unrelated = s.twos();

    assert_eq!(bad.pull().await, Err(SeriesError::DivisionByZero));
    assert_eq!(bad.pull().await, Ok(None));
    assert_eq!(unrelated.pull_n(2).await.unwrap(), ints(&[2, 2]));
}

#[tokio::test]
async fn faults_travel_downstream() {
    let s = session();
    let bad = s.polynomial(ints(&[0])).reciprocal();
    let mut sum = add(s.ones(), bad).scale(q(2, 1));
    assert_eq!(sum.pull().await, Err(SeriesError::DivisionByZero));
}

#[tokio::test]
async fn shutdown_closes_live_series() {
    let s = session();
    let mut e = s.ones().exponential();
    e.pull_n(3).await.unwrap();

    s.shutdown().await.unwrap();
    assert_eq!(e.pull().await, Ok(None));
    assert_eq!(s.task_count(), 0);
}

#[tokio::test]
async fn join_idle_names_tasks_kept_alive_by_a_consumer() {
    let s = Session::new(Config {
        grace: Duration::from_millis(100),
        ..Config::default()
    });
    let mut ones = s.ones();
    ones.pull().await.unwrap();

    match s.join_idle().await {
        Err(RuntimeError::GraceExceeded { stuck, .. }) => {
            assert_eq!(stuck.len(), 1);
            assert!(stuck[0].starts_with("ad_infinitum#"));
        }
        other => panic!("expected GraceExceeded, got {other:?}"),
    }
    drop(ones);
    s.join_idle().await.unwrap();
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.0.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn subscribers_observe_operator_lifecycle() {
    let rec = Arc::new(Recorder::default());
    let s = Session::builder(Config::default())
        .with_subscribers(vec![rec.clone()])
        .build();

    let mut p = s.polynomial(ints(&[1, 2]));
    p.pull_all().await.unwrap();
    drop(p);
    s.join_idle().await.unwrap();

    // subscriber delivery is asynchronous
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let seen: Vec<EventKind> = rec.0.lock().unwrap().iter().map(|e| e.kind).collect();
            if seen.contains(&EventKind::AllStoppedWithin) {
                assert!(seen.contains(&EventKind::OperatorStarted));
                assert!(seen.contains(&EventKind::OperatorStopped));
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}
