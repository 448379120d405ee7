use crate::error::Result;
use crate::fact::{Fact, FactKind};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};

/// SENTINEL-005: Public Storage Bucket
pub struct PublicBucketRule;

impl Rule for PublicBucketRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "SENTINEL-005".into(),
            name: "Public Storage Bucket".into(),
            description: "Storage bucket ACL grants public access".into(),
            severity: Severity::Critical,
            category: Category::Cloud,
        }
    }

    fn applies_to(&self) -> &[FactKind] {
        &[FactKind::BucketAcl]
    }

    fn check(&self, fact: &Fact, _bundle: &[Fact]) -> Result<Vec<Finding>> {
        let Fact::BucketAcl { bucket, public } = fact else {
            return Ok(vec![]);
        };
        if !public {
            return Ok(vec![]);
        }
        Ok(vec![Finding {
            rule_id: "SENTINEL-005".into(),
            rule_name: "Public Storage Bucket".into(),
            severity: Severity::Critical,
            category: Category::Cloud,
            message: format!("Bucket '{bucket}' is publicly accessible"),
            evidence: vec![fact.clone()],
            remediation: Some(
                "Block public access on the bucket and grant reads through \
                 scoped policies or signed URLs."
                    .into(),
            ),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_public_bucket() {
        let fact = Fact::BucketAcl {
            bucket: "finance".into(),
            public: true,
        };
        let findings = PublicBucketRule.check(&fact, &[fact.clone()]).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("finance"));
    }

    #[test]
    fn passes_private_bucket() {
        let fact = Fact::BucketAcl {
            bucket: "internal".into(),
            public: false,
        };
        let findings = PublicBucketRule.check(&fact, &[fact.clone()]).unwrap();
        assert!(findings.is_empty());
    }
}
