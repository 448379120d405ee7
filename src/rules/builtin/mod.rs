mod banner_disclosure;
mod dangerous_port;
mod missing_header;
mod plaintext_service;
mod public_bucket;

use super::Rule;

/// Returns all built-in rules, in registration order.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(dangerous_port::DangerousPortRule),
        Box::new(plaintext_service::PlaintextServiceRule),
        Box::new(banner_disclosure::BannerDisclosureRule),
        Box::new(missing_header::MissingHeaderRule),
        Box::new(public_bucket::PublicBucketRule),
    ]
}
