pub mod server;

/// Stubs generated from `proto/order/v1/order.proto`; regenerate with
/// `tonic-prost-build` when the proto changes.
#[allow(clippy::all, missing_docs)]
pub mod proto {
    pub mod order {
        pub mod v1 {
            include!("proto/order.v1.rs");
        }
    }
}
