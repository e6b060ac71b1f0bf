use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use hefty::codec::digest::{attribute_digest, body_digest};
use hefty::codec::payload::{deserialize, serialize};
use hefty::config::HeftyConfig;
use hefty::domains::message::{
    AttributeValue, DeleteMessageRequest, Message, ReceiveMessageRequest, SendMessageRequest,
};
use hefty::providers::memory::{InMemoryBlobStore, InMemoryQueue};
use hefty::services::queue::HeftyQueueClient;

const QUEUE_URL: &str = "https://sqs.us-west-2.amazonaws.com/765908583888/BenchQueue";
const BUCKET: &str = "hefty-benchmark";

fn message(body_len: usize) -> Message {
    let mut message = Message::new(vec![b'x'; body_len]);
    for i in 0..10 {
        message = message.with_attribute(
            format!("attr-{i}"),
            AttributeValue::string(format!("value-{i}")),
        );
    }
    message
}

fn bench_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload");
    for size in [300_000usize, 5_000_000, 25_000_000] {
        let msg = message(size);
        let blob = serialize(&msg).unwrap().blob;
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("serialize", size), &msg, |b, msg| {
            b.iter(|| serialize(msg).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("deserialize", size), &blob, |b, blob| {
            b.iter(|| deserialize(blob).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("digests", size), &msg, |b, msg| {
            b.iter(|| {
                (
                    body_digest(&msg.body),
                    attribute_digest(&msg.attributes).unwrap(),
                )
            })
        });
    }
    group.finish();
}

fn bench_send_receive(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let client = rt.block_on(async {
        let queue = Arc::new(InMemoryQueue::new());
        queue.create_queue(QUEUE_URL).await;
        let store = Arc::new(InMemoryBlobStore::new());
        store.create_container(BUCKET).await;
        HeftyQueueClient::new(queue, store, HeftyConfig::new(BUCKET, "us-west-2"))
            .await
            .unwrap()
    });
    let msg = message(1_000_000);

    let mut group = c.benchmark_group("offload");
    group.sample_size(20);
    group.bench_function("send_receive_1mb", |b| {
        b.iter(|| {
            rt.block_on(async {
                client
                    .send_message(SendMessageRequest::new(QUEUE_URL, msg.clone()))
                    .await
                    .unwrap();
                let received = client
                    .receive_message(ReceiveMessageRequest::new(QUEUE_URL))
                    .await
                    .unwrap();
                for m in received.messages {
                    client
                        .delete_message(DeleteMessageRequest {
                            queue_url: QUEUE_URL.to_string(),
                            receipt_handle: m.receipt_handle,
                        })
                        .await
                        .unwrap();
                }
            })
        })
    });
    group.finish();
}

criterion_group!(benches, bench_payload, bench_send_receive);
criterion_main!(benches);
