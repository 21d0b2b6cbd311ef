//! A mapper can be obtained from the process-global registry once one is
//! installed. Lives in its own test binary so the global starts empty.

mod common;

use common::{full_order, registry, Order};
use protojson_codec::ProtoJsonMapper;

#[test]
fn from_global_follows_installation() {
    assert!(ProtoJsonMapper::from_global().is_none());

    protojson_registry::install_global(registry()).unwrap();
    let mapper = ProtoJsonMapper::from_global().unwrap();
    assert!(mapper.registry().lookup_message_type("shop.Order").is_some());

    let order = full_order();
    let json = mapper.encode_native(&order).unwrap();
    let back: Order = mapper.decode_native(&json).unwrap();
    assert_eq!(back, order);
}
