use std::future::Future;
use std::ops::Range;
use std::pin::Pin;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::time::sleep;

use cancelgroup::{Error, Signal};

const BASE: Duration = Duration::from_millis(500);
const MISS: Duration = Duration::from_millis(50);
const STAT: Duration = Duration::from_millis(0);

fn time_base(
    range: Range<Duration>,
    stuff: impl Future<Output = ()> + Send + 'static,
) -> Pin<Box<dyn Future<Output = ()>>> {
    async move {
        let begin = Instant::now();
        let result = stuff.await;
        let cost = begin.elapsed();
        assert!(
            range.contains(&cost),
            "expect: {:?}, actual: {:?}",
            range,
            cost
        );
        result
    }
    .boxed()
}

async fn multi_waiter() {
    let root = Signal::new();
    let child = root.child();

    tokio::spawn(async move {
        sleep(BASE).await;
        root.cancel()
    });

    let tasks = (1..=5).map(|_| child.wait());
    futures::future::join_all(tasks).await;
    assert!(matches!(child.cause(), Some(Error::ParentCanceled)));
}

async fn multi_layer() {
    let root = Signal::new();
    let child = root.child();
    let grandchild = child.child();
    tokio::spawn(async move {
        sleep(BASE).await;
        root.cancel();
    });
    grandchild.wait().await;
    assert!(matches!(grandchild.cause(), Some(Error::ParentCanceled)));
}

async fn wait_after_cancel() {
    let root = Signal::new();
    root.cancel();
    root.wait().await;
    assert!(matches!(root.cause(), Some(Error::Canceled)));
}

async fn child_after_cancel() {
    let root = Signal::new();
    root.cancel();
    let child = root.child();
    child.wait().await;
    assert!(matches!(child.cause(), Some(Error::ParentCanceled)));
}

#[tokio::test]
async fn test_main() {
    futures::future::join_all(vec![
        time_base(BASE..BASE + MISS, multi_waiter()),
        time_base(BASE..BASE + MISS, multi_layer()),
        time_base(STAT..MISS, wait_after_cancel()),
        time_base(STAT..MISS, child_after_cancel()),
    ])
    .await;
}
