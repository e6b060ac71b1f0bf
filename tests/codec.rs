use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

use hefty::codec::digest::{attribute_digest, body_digest};
use hefty::codec::payload::{deserialize, serialize};
use hefty::codec::receipt_handle::{unwrap, wrap, ReceiptHandle};
use hefty::codec::reference::{is_reference_message, ReferenceMessage};
use hefty::codec::size::message_size;
use hefty::codec::threshold::{Classification, Thresholds};
use hefty::domains::message::{AttributeValue, Message, MessageAttributes};
use hefty::error::HeftyError;

fn attribute_value() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        ".{0,24}".prop_map(AttributeValue::string),
        "-?[0-9]{1,12}".prop_map(AttributeValue::number),
        vec(any::<u8>(), 0..48).prop_map(AttributeValue::binary),
        (".{0,8}", "[a-z]{1,6}")
            .prop_map(|(v, custom)| AttributeValue::string(v).with_custom_type(&custom)),
    ]
}

fn message() -> impl Strategy<Value = Message> {
    (
        vec(any::<u8>(), 0..2048),
        btree_map("[A-Za-z0-9_.-]{1,16}", attribute_value(), 0..6),
    )
        .prop_map(|(body, attributes)| Message { body, attributes })
}

proptest! {
    #[test]
    fn payload_round_trips(m in message()) {
        let payload = serialize(&m).unwrap();
        prop_assert!(payload.body_offset <= payload.attribute_offset);
        prop_assert!(payload.attribute_offset <= payload.blob.len());
        prop_assert_eq!(payload.body_digest(), body_digest(&m.body));
        prop_assert_eq!(payload.attribute_digest(), attribute_digest(&m.attributes).unwrap());
        prop_assert_eq!(deserialize(&payload.blob).unwrap(), m);
    }

    #[test]
    fn wrapped_handles_round_trip(
        handle in "[A-Za-z0-9+/=]{1,64}",
        bucket in "[a-z0-9.-]{3,63}",
        key in "[A-Za-z0-9/_-]{1,80}",
    ) {
        let wrapped = wrap(&handle, &bucket, &key).unwrap();
        prop_assert_eq!(
            unwrap(&wrapped).unwrap(),
            ReceiptHandle::Offloaded {
                native_handle: handle,
                store_container: bucket,
                store_key: key,
            }
        );
    }

    #[test]
    fn classification_law(size in 0usize..40_000_000) {
        let t = Thresholds::default();
        let c = t.classify(size);
        prop_assert_eq!(c == Classification::SendInline, size <= t.inline_limit);
        prop_assert_eq!(c == Classification::Reject, size > t.max_limit);
    }
}

#[test]
fn scenario_inline_size() {
    let mut attributes = MessageAttributes::new();
    attributes.insert("k".to_string(), AttributeValue::string("v"));
    let size = message_size(b"hi", &attributes).unwrap();
    assert_eq!(size, 10);
    assert_eq!(Thresholds::default().classify(size), Classification::SendInline);
}

#[test]
fn scenario_offload_and_reject_sizes() {
    let t = Thresholds::default();
    let body = vec![0u8; 300_000];
    let size = message_size(&body, &MessageAttributes::new()).unwrap();
    assert_eq!(t.classify(size), Classification::SendOffloaded);
    assert_eq!(t.classify(30_000_000), Classification::Reject);

    let payload = serialize(&Message::new(body.clone())).unwrap();
    assert_eq!(payload.body_digest(), body_digest(&body));
}

#[test]
fn scenario_handle_decode() {
    let wrapped = wrap("rh1", "bucketX", "key/123").unwrap();
    let decoded = unwrap(&wrapped).unwrap();
    assert!(decoded.is_offloaded());
    assert_eq!(decoded.native_handle(), "rh1");
    assert_eq!(
        decoded,
        ReceiptHandle::Offloaded {
            native_handle: "rh1".to_string(),
            store_container: "bucketX".to_string(),
            store_key: "key/123".to_string(),
        }
    );

    let native = "AQEBzbVv5w6F/native";
    assert_eq!(unwrap(native).unwrap(), ReceiptHandle::Native(native.to_string()));
}

#[test]
fn reference_detection_is_prefix_based() {
    let json = ReferenceMessage::new("r", "b", "k", "x", "y").to_json().unwrap();
    assert!(is_reference_message(&json));
    assert_eq!(ReferenceMessage::from_json(&json).unwrap().to_json().unwrap(), json);

    // same fields, different key order: still parses, but is not canonical
    let reordered = "{\"s3_region\":\"r\",\"identifier\":\"d3131a62e0224688b77a506fd333dac4\",\
                     \"s3_bucket\":\"b\",\"s3_key\":\"k\",\"md5_digest_msg_body\":\"x\",\
                     \"md5_digest_msg_attr\":\"y\"}";
    assert!(!is_reference_message(reordered));
    assert_eq!(ReferenceMessage::from_json(reordered).unwrap().to_json().unwrap(), json);

    assert!(matches!(
        ReferenceMessage::from_json("{\"identifier\":\"d3131a62e0224688b77a506fd333dac4\","),
        Err(HeftyError::MalformedReferenceMessage(_))
    ));
}
