//! Composition tests: options, configuration documents and pre-flight validation.

use aspectly::prelude::*;
use aspectly::{MarkerCatalog, ValidationIssue};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

struct Inventory {
    reservations: AtomicU32,
}

impl Inventory {
    async fn reserve(&self, sku: &'static str) -> anyhow::Result<u32> {
        let attempt = self.reservations.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < 3 {
            anyhow::bail!("warehouse busy while reserving {sku}");
        }
        Ok(attempt)
    }

    async fn audit(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn metadata() -> Arc<StaticMetadata> {
    let retry = MarkerInstance::new(Retry::KIND)
        .with_field("attempts", 5)
        .with_field("backoff_ms", 1);

    Arc::new(
        StaticMetadata::new()
            .with_marker_kind("retry")
            .with_marker_kind("logged")
            .with_marker_kind("audited")
            .with_aspect_kind("retrying")
            .with_aspect_kind("logging")
            .with_aspect_kind("auditing")
            .with_method("Inventory", "reserve", vec![MarkerInstance::new(Logged::KIND), retry])
            .with_method("Inventory", "audit", vec![MarkerInstance::new("audited")])
            .with_method("Pricing", "quote", vec![])
            .with_type("Shipping"),
    )
}

fn resolver() -> Arc<AspectContainer> {
    Arc::new(
        AspectContainer::new()
            .transient_kind("logging", || Arc::new(LoggingAspect) as Arc<dyn Aspect>)
            .singleton_kind("retrying", Arc::new(RetryAspect)),
    )
}

fn candidates() -> Vec<TypeKey> {
    vec!["Inventory".into(), "Pricing".into(), "Shipping".into()]
}

const CONFIG: &str = r#"
{
    "triggers": [
        { "marker": "logged", "aspect": "logging" },
        { "marker": "retry", "aspect": "retrying" }
    ]
}
"#;

#[tokio::test]
async fn test_json_configured_retry_recovers() {
    let options = AspectOptions::from_json(CONFIG).unwrap();
    let weaver = Weaver::compose(&options, metadata(), resolver(), &candidates()).unwrap();

    assert_eq!(weaver.proxied_types(), &[TypeKey::from("Inventory")]);
    assert!(weaver.validate().is_safe());

    let inventory = weaver.proxy_as(
        Inventory {
            reservations: AtomicU32::new(0),
        },
        "Inventory",
    );
    let attempt = inventory
        .call_returning("reserve", |inv| inv.reserve("sku-1"))
        .await
        .unwrap();

    assert_eq!(attempt, 3);
}

#[tokio::test]
async fn test_unmapped_marker_is_a_plain_call() {
    let options = AspectOptions::from_json(CONFIG).unwrap();
    let weaver = Weaver::compose(&options, metadata(), resolver(), &candidates()).unwrap();

    let inventory = weaver.proxy_as(
        Inventory {
            reservations: AtomicU32::new(0),
        },
        "Inventory",
    );
    inventory.call("audit", |inv| inv.audit()).await.unwrap();
    assert!(
        weaver
            .registry()
            .lookup(&inventory.method("audit"))
            .is_none()
    );
}

#[test]
fn test_config_merges_with_builder_registrations() {
    let options = AspectOptions::from_json(CONFIG)
        .unwrap()
        .merge(AspectOptions::new().register_kinds("audited", "auditing"));

    let weaver = Weaver::compose(&options, metadata(), resolver(), &candidates()).unwrap();
    let markers: Vec<_> = weaver
        .catalog()
        .marker_kinds()
        .map(|k| k.as_str().to_string())
        .collect();
    assert_eq!(markers, vec!["logged", "retry", "audited"]);

    let result = weaver.validate();
    assert!(!result.is_safe());
    assert_eq!(
        result.errors().collect::<Vec<_>>(),
        vec!["Aspect 'auditing' is registered but the resolver cannot produce it."]
    );
}

#[tokio::test]
async fn test_unresolvable_aspect_fails_the_call() {
    let options = AspectOptions::new().register_kinds("audited", "auditing");
    let weaver = Weaver::compose(&options, metadata(), resolver(), &candidates()).unwrap();
    let inventory = weaver.proxy_as(
        Inventory {
            reservations: AtomicU32::new(0),
        },
        "Inventory",
    );

    let err = inventory.call("audit", |inv| inv.audit()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AspectError>(),
        Some(AspectError::AspectResolutionFailure { kind, .. }) if kind.as_str() == "auditing"
    ));
}

#[test]
fn test_invalid_kinds_are_rejected() {
    let bad_marker = AspectOptions::new().register_kinds("loud", "logging");
    assert!(matches!(
        Weaver::compose(&bad_marker, metadata(), resolver(), &candidates()).err(),
        Some(AspectError::InvalidMarkerKind(kind)) if kind.as_str() == "loud"
    ));

    let bad_aspect = AspectOptions::new().register_kinds("logged", "Printer");
    assert!(matches!(
        Weaver::compose(&bad_aspect, metadata(), resolver(), &candidates()).err(),
        Some(AspectError::InvalidAspectKind(kind)) if kind.as_str() == "Printer"
    ));
}

#[test]
fn test_failed_registration_leaves_catalog_unchanged() {
    let mut catalog = MarkerCatalog::new(metadata());
    catalog.register("logged", "logging").unwrap();

    assert!(catalog.register("loud", "logging").is_err());
    assert!(catalog.register("logged", "Printer").is_err());

    assert_eq!(catalog.mappings().len(), 1);
}

#[test]
fn test_malformed_config_is_reported() {
    let document = json!({ "triggers": { "marker": "logged" } }).to_string();
    assert!(matches!(
        AspectOptions::from_json(&document),
        Err(AspectError::Config(_))
    ));
}

#[test]
fn test_fan_out_is_warned_about() {
    let options = AspectOptions::new()
        .register_kinds("logged", "logging")
        .register_kinds("logged", "retrying");
    let weaver = Weaver::compose(&options, metadata(), resolver(), &candidates()).unwrap();

    let result = weaver.validate();
    assert!(result.is_safe());
    assert_eq!(
        result.issues,
        vec![ValidationIssue::Warning(
            "Marker 'logged' triggers 2 aspects (logging, retrying); all of them run, in registration order."
                .into()
        )]
    );
}
