//! Common test utilities for document-engine integration tests.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex, Once};

use rust_decimal::Decimal;
use uuid::Uuid;

use document_engine::services::{
    Actor, CapabilityCheck, DocumentEngine, InMemoryRepository, InMemorySequences, StatusChanged,
    StatusObserver,
};
use document_engine::{
    Amount, CompanyRef, CreateLine, CustomerRef, Document, DocumentKind, NewDocument, PhaseRef,
    ProjectRef, RoundingMode, TaxRate, UpdateDocument,
};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,document_engine=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Observer that records every status change event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StatusChanged>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<StatusChanged> {
        self.events.lock().expect("observer lock").clone()
    }
}

impl StatusObserver for RecordingObserver {
    fn status_changed(&self, event: &StatusChanged) {
        self.events.lock().expect("observer lock").push(event.clone());
    }
}

/// Capability check that denies everything.
#[derive(Debug, Default)]
pub struct DenyAll;

impl CapabilityCheck for DenyAll {
    fn may(&self, _actor: &Actor, _action: &str, _document: &Document) -> bool {
        false
    }
}

pub struct TestContext {
    pub engine: DocumentEngine<InMemoryRepository>,
    pub observer: Arc<RecordingObserver>,
    pub company: CompanyRef,
    pub customer: CustomerRef,
    pub project: ProjectRef,
    pub phase: PhaseRef,
}

impl TestContext {
    /// Engine wired to in-memory collaborators with every capability
    /// granted.
    pub fn new() -> Self {
        Self::with_capabilities(Arc::new(document_engine::services::AllowAll))
    }

    /// Engine with a custom capability check.
    pub fn with_capabilities(capabilities: Arc<dyn CapabilityCheck>) -> Self {
        init_tracing();
        let observer = Arc::new(RecordingObserver::default());
        let engine = DocumentEngine::new(
            InMemoryRepository::new(),
            Arc::new(InMemorySequences::new()),
            capabilities,
            observer.clone(),
        );
        TestContext {
            engine,
            observer,
            company: CompanyRef {
                company_id: Uuid::new_v4(),
                code: "ACME".to_string(),
            },
            customer: CustomerRef {
                customer_id: Uuid::new_v4(),
                code: "CUST01".to_string(),
                full_address: "1 Test Street\n12345 Test City".to_string(),
            },
            project: ProjectRef {
                project_id: Uuid::new_v4(),
                code: "PRJ".to_string(),
            },
            phase: PhaseRef {
                phase_id: Uuid::new_v4(),
                name: "Default phase".to_string(),
            },
        }
    }

    /// Create a draft document of the given kind.
    pub fn create_document(&self, kind: DocumentKind, actor: &Actor) -> Document {
        self.engine
            .create(
                NewDocument {
                    kind,
                    company: &self.company,
                    customer: &self.customer,
                    project: &self.project,
                    phase: &self.phase,
                    date: None,
                },
                actor,
            )
            .expect("Failed to create document")
    }

    /// Create a draft with the required free-text fields filled in, so it
    /// passes the well-formedness guard once it holds a line.
    pub fn create_filled_document(&self, kind: DocumentKind, actor: &Actor) -> Document {
        let document = self.create_document(kind, actor);
        self.engine
            .update_details(
                document.document_id,
                UpdateDocument {
                    description: Some("Consulting services".to_string()),
                    payment_conditions: Some("30 days".to_string()),
                    ..Default::default()
                },
            )
            .expect("Failed to fill document details")
    }
}

pub fn actor() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        label: "test.user".to_string(),
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub fn amount(value: &str) -> Amount {
    Amount::from_decimal(dec(value), RoundingMode::Standard)
}

pub fn rate(value: &str) -> TaxRate {
    TaxRate::from_decimal(dec(value))
}

/// Line input: cost, quantity and tax percentage as decimal strings.
pub fn line(cost: &str, quantity: &str, tax_rate: &str) -> CreateLine {
    CreateLine {
        description: "Test prestation".to_string(),
        cost: amount(cost),
        quantity: dec(quantity),
        tax_rate: rate(tax_rate),
        unit: None,
        product_id: None,
    }
}
