//! Response compression layer.

use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;

/// Gzip for responses worth compressing; ingestion acks are tiny.
pub fn build_compression_layer() -> CompressionLayer<SizeAbove> {
    CompressionLayer::new()
        .gzip(true)
        .compress_when(SizeAbove::new(512))
}
