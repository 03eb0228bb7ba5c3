//! A complete example showing how to wrap a service with aspects.
//!
//! This example demonstrates:
//! - Declaring a custom marker and the aspect it triggers
//! - Using the built-in `Logged` and `Retry` markers
//! - Composing a weaver and validating it before serving traffic
//! - Writing a hand-written proxy that forwards a service contract
//! - Collecting invocation traces

use aspectly::prelude::*;
use aspectly::MemoryTelemetry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// Step 1: A custom marker and its aspect
// ============================================================================

/// Marks a method whose calls must land in the audit trail.
#[derive(Serialize, Deserialize)]
struct Audit {
    action: String,
}

impl Marker for Audit {
    const KIND: &'static str = "audit";
}

/// Appends one line before and one after every audited call.
struct AuditAspect {
    trail: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Aspect for AuditAspect {
    async fn invoke(&self, context: AspectContext<'_>, next: Next<'_>) -> anyhow::Result<()> {
        let audit: Audit = context.decode_marker()?;
        self.trail
            .lock()
            .push(format!("begin {} ({})", audit.action, context.method()));

        // Record failures too, then hand them back unchanged
        let result = next.proceed().await;
        let status = if result.is_ok() { "ok" } else { "failed" };
        self.trail
            .lock()
            .push(format!("end {} [{}]", audit.action, status));
        result
    }
}

// ============================================================================
// Step 2: The service contract, its implementation and its proxy
// ============================================================================

#[async_trait]
trait Accounts: Send + Sync {
    async fn open(&self, owner: String) -> anyhow::Result<u32>;
    async fn sync_ledger(&self) -> anyhow::Result<()>;
}

struct AccountService {
    next_id: AtomicU32,
    ledger_failures: AtomicU32,
}

#[async_trait]
impl Accounts for AccountService {
    async fn open(&self, owner: String) -> anyhow::Result<u32> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  opening account #{} for {}", id, owner);
        Ok(id)
    }

    async fn sync_ledger(&self) -> anyhow::Result<()> {
        // The ledger is flaky: the first two attempts fail
        if self.ledger_failures.fetch_add(1, Ordering::SeqCst) < 2 {
            anyhow::bail!("ledger unavailable");
        }
        println!("  ledger synchronised");
        Ok(())
    }
}

struct AccountsProxy(Proxy<AccountService>);

#[async_trait]
impl Accounts for AccountsProxy {
    async fn open(&self, owner: String) -> anyhow::Result<u32> {
        self.0
            .call_returning("open", |svc| svc.open(owner.clone()))
            .await
    }

    async fn sync_ledger(&self) -> anyhow::Result<()> {
        self.0.call("sync_ledger", |svc| svc.sync_ledger()).await
    }
}

// ============================================================================
// Step 3: Compose and run
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Audited service ===");

    let service_type = TypeKey::of::<AccountService>();
    let audit = |action: &str| {
        MarkerInstance::from_marker(&Audit {
            action: action.to_string(),
        })
    };

    // What a derive macro would otherwise declare
    let metadata = StaticMetadata::new()
        .with_marker::<Audit>()
        .with_marker::<Logged>()
        .with_marker::<Retry>()
        .with_aspect::<AuditAspect>()
        .with_aspect::<LoggingAspect>()
        .with_aspect::<RetryAspect>()
        .with_method(
            service_type.clone(),
            "open",
            vec![MarkerInstance::from_marker(&Logged::default())?, audit("open-account")?],
        )
        .with_method(
            service_type.clone(),
            "sync_ledger",
            vec![
                audit("sync-ledger")?,
                MarkerInstance::from_marker(&Retry {
                    attempts: 3,
                    backoff_ms: 10,
                })?,
            ],
        );

    let options = AspectOptions::new()
        .register::<Audit, AuditAspect>()
        .register::<Logged, LoggingAspect>()
        .register::<Retry, RetryAspect>();

    let trail = Arc::new(Mutex::new(Vec::new()));
    let audit_trail = trail.clone();
    let resolver = AspectContainer::new()
        .transient(move || AuditAspect {
            trail: audit_trail.clone(),
        })
        .transient(|| LoggingAspect)
        .singleton(RetryAspect);

    let telemetry = Arc::new(MemoryTelemetry::new());
    let weaver = Weaver::compose(
        &options,
        Arc::new(metadata),
        Arc::new(resolver),
        std::slice::from_ref(&service_type),
    )?
    .with_telemetry(telemetry.clone());

    weaver.validate().print_summary();

    let accounts: Arc<dyn Accounts> = Arc::new(AccountsProxy(weaver.proxy(AccountService {
        next_id: AtomicU32::new(0),
        ledger_failures: AtomicU32::new(0),
    })));

    println!("\n--- Calls ---");
    let id = accounts.open("Alice".to_string()).await?;
    accounts.sync_ledger().await?;
    println!("  account #{} ready", id);

    println!("\n--- Audit trail ---");
    for line in trail.lock().iter() {
        println!("  {}", line);
    }

    println!("\n--- Traces ---");
    for trace in telemetry.get_traces() {
        println!("  {}", serde_json::to_string(&trace)?);
    }

    weaver.flush();
    println!("\n=== Done ===");
    Ok(())
}
